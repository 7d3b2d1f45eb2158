//! # Lifecycle signals emitted by sequence instances.
//!
//! The [`EventKind`] enum classifies the five lifecycle transitions an
//! instance can go through. The [`Event`] struct carries the metadata
//! delivered to observers: which instance, which run, and when.
//!
//! ## Delivery order
//! For every transition the director notifies the instance-scoped observers
//! first, then the global (cross-instance) observers, each list in
//! subscription order.
//!
//! ## Ordering guarantees
//! Each event has a director-wide sequence number (`seq`) that increases
//! monotonically, so recorded events can be totally ordered.
//!
//! ## Example
//! ```rust
//! use stagehand::{Event, EventKind, InstanceId};
//!
//! let ev = Event::new(7, EventKind::Paused, InstanceId::from_raw(3))
//!     .with_name("intro")
//!     .with_generation(2);
//!
//! assert_eq!(ev.kind, EventKind::Paused);
//! assert_eq!(ev.name.as_ref(), "intro");
//! assert_eq!(ev.generation, 2);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Clock, InstanceId};

/// Classification of lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Instance went `Inactive → Active` and rebuilt its task queue.
    Started,
    /// Instance went `Active → Paused`.
    Paused,
    /// Instance went `Paused → Active`.
    Resumed,
    /// Instance was forced `Active → Inactive`; its in-flight work was cancelled.
    Halted,
    /// Instance ran its whole task queue and went back to `Inactive`.
    Completed,
}

impl EventKind {
    /// All kinds, in lifecycle order.
    pub const ALL: [EventKind; 5] = [
        EventKind::Started,
        EventKind::Paused,
        EventKind::Resumed,
        EventKind::Halted,
        EventKind::Completed,
    ];

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Paused => "paused",
            EventKind::Resumed => "resumed",
            EventKind::Halted => "halted",
            EventKind::Completed => "completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Lifecycle signal with metadata.
///
/// - `seq`: monotonic director-wide sequence for ordering
/// - `generation`: run id of the instance at the time of the transition
/// - `frame` / `time`: clock position (unscaled time) when the signal fired
#[derive(Clone, Debug)]
pub struct Event {
    /// Director-wide, monotonically increasing sequence number.
    pub seq: u64,
    /// Event classification.
    pub kind: EventKind,
    /// Instance the transition happened on.
    pub instance: InstanceId,
    /// Display name of the instance.
    pub name: Arc<str>,
    /// Run generation of the instance.
    pub generation: u64,
    /// Frame the event fired on.
    pub frame: u64,
    /// Unscaled time the event fired at.
    pub time: Duration,
}

impl Event {
    /// Creates a new event; metadata fields start empty/zero.
    pub fn new(seq: u64, kind: EventKind, instance: InstanceId) -> Self {
        Self {
            seq,
            kind,
            instance,
            name: Arc::from(""),
            generation: 0,
            frame: 0,
            time: Duration::ZERO,
        }
    }

    /// Attaches the instance name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Attaches the run generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Stamps the event with the clock position.
    #[inline]
    pub fn at(mut self, clock: &Clock) -> Self {
        self.frame = clock.frame();
        self.time = clock.unscaled_time();
        self
    }

    /// True for `Halted` and `Completed`, the two signals that end a run.
    #[inline]
    pub fn ends_run(&self) -> bool {
        matches!(self.kind, EventKind::Halted | EventKind::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let mut clock = Clock::default();
        clock.advance(Duration::from_millis(16));

        let ev = Event::new(1, EventKind::Halted, InstanceId::from_raw(9))
            .with_name("door")
            .with_generation(4)
            .at(&clock);

        assert_eq!(ev.seq, 1);
        assert_eq!(ev.instance, InstanceId::from_raw(9));
        assert_eq!(ev.frame, 1);
        assert_eq!(ev.time, Duration::from_millis(16));
        assert!(ev.ends_run());
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = EventKind::ALL.iter().map(|k| k.as_label()).collect();
        assert_eq!(labels, ["started", "paused", "resumed", "halted", "completed"]);
        assert_eq!(EventKind::Resumed.to_string(), "resumed");
    }
}
