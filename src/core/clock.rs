//! # Frame clock.
//!
//! The host owns the timing source; it reports each frame's delta through
//! [`Director::tick`](crate::Director::tick). The [`Clock`] accumulates two
//! timelines from those deltas:
//! - **unscaled** (realtime) time, the sum of raw deltas;
//! - **scaled** time, the sum of deltas multiplied by the current time scale.
//!
//! Frame `0` is the state before the first tick.

use std::time::Duration;

/// Frame counter plus scaled and unscaled elapsed time.
#[derive(Clone, Debug)]
pub struct Clock {
    frame: u64,
    time: Duration,
    unscaled_time: Duration,
    delta: Duration,
    unscaled_delta: Duration,
    time_scale: f64,
}

impl Clock {
    /// Creates a clock at frame 0 with the given time scale.
    pub(crate) fn new(time_scale: f64) -> Self {
        Self {
            frame: 0,
            time: Duration::ZERO,
            unscaled_time: Duration::ZERO,
            delta: Duration::ZERO,
            unscaled_delta: Duration::ZERO,
            time_scale,
        }
    }

    /// Moves to the next frame.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.frame += 1;
        self.unscaled_delta = dt;
        self.delta = dt.mul_f64(self.time_scale);
        self.unscaled_time += self.unscaled_delta;
        self.time += self.delta;
    }

    pub(crate) fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    /// Number of ticks delivered so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Scaled time since the clock started.
    #[inline]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Realtime since the clock started.
    #[inline]
    pub fn unscaled_time(&self) -> Duration {
        self.unscaled_time
    }

    /// Scaled delta of the last frame.
    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Raw delta of the last frame.
    #[inline]
    pub fn unscaled_delta(&self) -> Duration {
        self.unscaled_delta
    }

    /// Current time scale.
    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_both_timelines() {
        let mut clock = Clock::new(0.5);
        clock.advance(Duration::from_millis(100));
        clock.advance(Duration::from_millis(100));

        assert_eq!(clock.frame(), 2);
        assert_eq!(clock.unscaled_time(), Duration::from_millis(200));
        assert_eq!(clock.time(), Duration::from_millis(100));
        assert_eq!(clock.delta(), Duration::from_millis(50));
        assert_eq!(clock.unscaled_delta(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_scale_freezes_scaled_time() {
        let mut clock = Clock::default();
        clock.advance(Duration::from_secs(1));
        clock.set_time_scale(0.0);
        clock.advance(Duration::from_secs(1));

        assert_eq!(clock.time(), Duration::from_secs(1));
        assert_eq!(clock.unscaled_time(), Duration::from_secs(2));
    }
}
