//! # Utility tasks.
//!
//! Small building blocks for task lists:
//! - [`Delay`] polls unscaled time until a duration has elapsed;
//! - [`ScaledDelay`] same, against scaled time;
//! - [`MainThreadCallback`] yields one tick, then runs a callback on the tick thread;
//! - [`NonBlockingLaunch`] starts another task as an independent unit and moves on.
//!
//! ## Rules
//! - None of these touch the instance's active-task counter; the runner that
//!   executes them owns it.
//! - Delays anchor on their **first step**, not on construction, so a task
//!   list built ahead of time still measures from the moment the delay runs.
//! - A zero duration completes on the first step.

use std::fmt;
use std::time::Duration;

use crate::tasks::task::{Step, StepContext, Task, TaskRef};

/// Waits for a realtime duration, one tick at a time.
#[derive(Debug, Clone)]
pub struct Delay {
    duration: Duration,
    start: Option<Duration>,
}

impl Delay {
    /// Creates a delay of `duration` unscaled time.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            start: None,
        }
    }

    /// Delay of `secs` seconds; NaN or `<= 0` finishes on the first step.
    pub fn secs(secs: f64) -> Self {
        Self::new(secs_to_duration(secs))
    }
}

impl Task for Delay {
    fn name(&self) -> &str {
        "delay"
    }

    fn step(&mut self, cx: &mut StepContext<'_>) -> Step {
        let now = cx.clock().unscaled_time();
        let start = *self.start.get_or_insert(now);
        if now.saturating_sub(start) < self.duration {
            Step::Next
        } else {
            Step::Done
        }
    }
}

/// Waits for a scaled-time duration, one tick at a time.
#[derive(Debug, Clone)]
pub struct ScaledDelay {
    duration: Duration,
    start: Option<Duration>,
}

impl ScaledDelay {
    /// Creates a delay of `duration` scaled time.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            start: None,
        }
    }

    /// Same clamping as [`Delay::secs`].
    pub fn secs(secs: f64) -> Self {
        Self::new(secs_to_duration(secs))
    }
}

impl Task for ScaledDelay {
    fn name(&self) -> &str {
        "scaled_delay"
    }

    fn step(&mut self, cx: &mut StepContext<'_>) -> Step {
        let now = cx.clock().time();
        let start = *self.start.get_or_insert(now);
        if now.saturating_sub(start) < self.duration {
            Step::Next
        } else {
            Step::Done
        }
    }
}

/// Runs a callback on the tick after the task first steps.
pub struct MainThreadCallback {
    action: Option<Box<dyn FnOnce() + Send>>,
    yielded: bool,
}

impl MainThreadCallback {
    /// Wraps the callback.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Some(Box::new(action)),
            yielded: false,
        }
    }
}

impl Task for MainThreadCallback {
    fn name(&self) -> &str {
        "main_thread"
    }

    fn step(&mut self, _cx: &mut StepContext<'_>) -> Step {
        if !self.yielded {
            self.yielded = true;
            return Step::Next;
        }
        if let Some(action) = self.action.take() {
            action();
        }
        Step::Done
    }
}

impl fmt::Debug for MainThreadCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThreadCallback")
            .field("pending", &self.action.is_some())
            .field("yielded", &self.yielded)
            .finish()
    }
}

/// Launches a task as an independent unit, yields once, then finishes.
pub struct NonBlockingLaunch {
    task: Option<TaskRef>,
}

impl NonBlockingLaunch {
    /// Wraps the task to launch.
    pub fn new<T: Task>(task: T) -> Self {
        Self::from_ref(Box::new(task))
    }

    /// Wraps an already boxed task.
    pub fn from_ref(task: TaskRef) -> Self {
        Self { task: Some(task) }
    }
}

impl Task for NonBlockingLaunch {
    fn name(&self) -> &str {
        "non_block"
    }

    fn step(&mut self, cx: &mut StepContext<'_>) -> Step {
        match self.task.take() {
            Some(task) => {
                cx.launch(task);
                Step::Next
            }
            None => Step::Done,
        }
    }
}

impl fmt::Debug for NonBlockingLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonBlockingLaunch")
            .field("task", &self.task.as_ref().map(|t| t.name().to_owned()))
            .finish()
    }
}

/// NaN and non-positive values clamp to zero, overflow (`+inf`) to `Duration::MAX`.
fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Boxed [`Delay`].
pub fn delay(duration: Duration) -> TaskRef {
    Box::new(Delay::new(duration))
}

/// Boxed [`ScaledDelay`].
pub fn scaled_delay(duration: Duration) -> TaskRef {
    Box::new(ScaledDelay::new(duration))
}

/// Boxed [`MainThreadCallback`].
pub fn main_thread<F>(action: F) -> TaskRef
where
    F: FnOnce() + Send + 'static,
{
    Box::new(MainThreadCallback::new(action))
}

/// Boxed [`NonBlockingLaunch`].
pub fn non_blocking<T: Task>(task: T) -> TaskRef {
    Box::new(NonBlockingLaunch::new(task))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::core::{Clock, Control, InstanceId};

    /// Steps `task` once against `clock`, returning the step and any launched tasks.
    fn step_once(task: &mut dyn Task, clock: &Clock) -> (Step, Vec<TaskRef>) {
        let token = CancellationToken::new();
        let mut launched = Vec::new();
        let mut control = Control::new(InstanceId::from_raw(1));
        let mut cx = StepContext::new(clock, InstanceId::from_raw(1), &token, &mut launched, &mut control);
        let step = task.step(&mut cx);
        (step, launched)
    }

    #[test]
    fn test_delay_measures_from_first_step() {
        let mut clock = Clock::default();
        clock.advance(Duration::from_secs(10));

        let mut d = Delay::new(Duration::from_secs(1));
        assert!(matches!(step_once(&mut d, &clock).0, Step::Next));

        clock.advance(Duration::from_millis(600));
        assert!(matches!(step_once(&mut d, &clock).0, Step::Next));

        clock.advance(Duration::from_millis(400));
        assert!(matches!(step_once(&mut d, &clock).0, Step::Done));
    }

    #[test]
    fn test_zero_delay_finishes_immediately() {
        let clock = Clock::default();
        let mut d = Delay::new(Duration::ZERO);
        assert!(matches!(step_once(&mut d, &clock).0, Step::Done));
    }

    #[test]
    fn test_out_of_range_seconds_are_clamped() {
        let mut clock = Clock::default();
        clock.advance(Duration::from_secs(1));

        for secs in [-0.5, 0.0, f64::NAN, f64::NEG_INFINITY] {
            let mut d = Delay::secs(secs);
            assert!(matches!(step_once(&mut d, &clock).0, Step::Done), "secs = {secs}");
        }

        let mut forever = ScaledDelay::secs(f64::INFINITY);
        assert!(matches!(step_once(&mut forever, &clock).0, Step::Next));
        clock.advance(Duration::from_secs(86_400));
        assert!(matches!(step_once(&mut forever, &clock).0, Step::Next));
    }

    #[test]
    fn test_scaled_delay_stalls_at_zero_scale() {
        let mut clock = Clock::new(0.0);
        let mut d = ScaledDelay::secs(0.5);
        assert!(matches!(step_once(&mut d, &clock).0, Step::Next));

        clock.advance(Duration::from_secs(5));
        assert!(matches!(step_once(&mut d, &clock).0, Step::Next));

        clock.set_time_scale(1.0);
        clock.advance(Duration::from_millis(500));
        assert!(matches!(step_once(&mut d, &clock).0, Step::Done));
    }

    #[test]
    fn test_main_thread_runs_on_second_step() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let mut cb = MainThreadCallback::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let clock = Clock::default();

        assert!(matches!(step_once(&mut cb, &clock).0, Step::Next));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert!(matches!(step_once(&mut cb, &clock).0, Step::Done));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_blocking_launches_then_finishes() {
        let clock = Clock::default();
        let mut nb = NonBlockingLaunch::new(Delay::secs(3.0));

        let (step, launched) = step_once(&mut nb, &clock);
        assert!(matches!(step, Step::Next));
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].name(), "delay");

        let (step, launched) = step_once(&mut nb, &clock);
        assert!(matches!(step, Step::Done));
        assert!(launched.is_empty());
    }
}
