//! # Wait instructions.
//!
//! A task that returns [`Step::Wait`](crate::Step::Wait) hands the runner a
//! structured suspension request instead of a plain one-tick yield. The
//! runner converts it into a [`WaitState`] and re-checks it on every later
//! tick; the task is stepped again on the first tick the wait is satisfied.
//!
//! | Instruction             | Resumes when                                   |
//! |-------------------------|------------------------------------------------|
//! | `Seconds(d)`            | scaled time advanced by at least `d`           |
//! | `SecondsRealtime(d)`    | unscaled time advanced by at least `d`         |
//! | `Frames(n)`             | `n` more ticks were delivered (min 1)          |
//! | `Until(pred)`           | `pred` returns `true`                          |
//! | `While(pred)`           | `pred` returns `false`                         |
//! | `Task(task)`            | the nested task reported `Done`                |

use std::fmt;
use std::time::Duration;

use crate::core::Clock;
use crate::tasks::task::{Task, TaskRef};

/// Predicate evaluated once per tick against the frame clock.
pub type Predicate = Box<dyn FnMut(&Clock) -> bool + Send>;

/// Structured suspension request.
pub enum Wait {
    /// Scaled-time delay.
    Seconds(Duration),
    /// Unscaled-time delay.
    SecondsRealtime(Duration),
    /// Tick-count delay.
    Frames(u32),
    /// Resume once the predicate holds.
    Until(Predicate),
    /// Resume once the predicate stops holding.
    While(Predicate),
    /// Run a nested task to completion inside the same runner.
    Task(TaskRef),
}

impl Wait {
    /// `Wait::Until` from a closure.
    pub fn until<F>(pred: F) -> Self
    where
        F: FnMut(&Clock) -> bool + Send + 'static,
    {
        Wait::Until(Box::new(pred))
    }

    /// `Wait::While` from a closure.
    pub fn while_holds<F>(pred: F) -> Self
    where
        F: FnMut(&Clock) -> bool + Send + 'static,
    {
        Wait::While(Box::new(pred))
    }

    /// `Wait::Task` from any task.
    pub fn task<T: Task>(task: T) -> Self {
        Wait::Task(Box::new(task))
    }
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wait::Seconds(d) => f.debug_tuple("Seconds").field(d).finish(),
            Wait::SecondsRealtime(d) => f.debug_tuple("SecondsRealtime").field(d).finish(),
            Wait::Frames(n) => f.debug_tuple("Frames").field(n).finish(),
            Wait::Until(_) => f.write_str("Until(..)"),
            Wait::While(_) => f.write_str("While(..)"),
            Wait::Task(t) => f.debug_tuple("Task").field(&t.name()).finish(),
        }
    }
}

/// A wait in progress, anchored to the clock position it started at.
pub(crate) enum WaitState {
    Scaled { deadline: Duration },
    Realtime { deadline: Duration },
    Frames { until: u64 },
    Until(Predicate),
    While(Predicate),
}

impl WaitState {
    /// Anchors a time/frame/predicate wait. Nested tasks are handled by the runner.
    pub(crate) fn begin(wait: Wait, clock: &Clock) -> Result<Self, TaskRef> {
        Ok(match wait {
            Wait::Seconds(d) => WaitState::Scaled {
                deadline: clock.time().saturating_add(d),
            },
            Wait::SecondsRealtime(d) => WaitState::Realtime {
                deadline: clock.unscaled_time().saturating_add(d),
            },
            Wait::Frames(n) => WaitState::Frames {
                until: clock.frame() + u64::from(n.max(1)),
            },
            Wait::Until(pred) => WaitState::Until(pred),
            Wait::While(pred) => WaitState::While(pred),
            Wait::Task(task) => return Err(task),
        })
    }

    /// True once the wait is satisfied.
    pub(crate) fn ready(&mut self, clock: &Clock) -> bool {
        match self {
            WaitState::Scaled { deadline } => clock.time() >= *deadline,
            WaitState::Realtime { deadline } => clock.unscaled_time() >= *deadline,
            WaitState::Frames { until } => clock.frame() >= *until,
            WaitState::Until(pred) => pred(clock),
            WaitState::While(pred) => !pred(clock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(wait: Wait, clock: &Clock) -> WaitState {
        match WaitState::begin(wait, clock) {
            Ok(state) => state,
            Err(_) => panic!("nested task is not a wait state"),
        }
    }

    #[test]
    fn test_scaled_wait_follows_time_scale() {
        let mut clock = Clock::new(0.5);
        let mut w = state(Wait::Seconds(Duration::from_secs(1)), &clock);

        clock.advance(Duration::from_secs(1));
        assert!(!w.ready(&clock));
        clock.advance(Duration::from_secs(1));
        assert!(w.ready(&clock));
    }

    #[test]
    fn test_realtime_wait_ignores_time_scale() {
        let mut clock = Clock::new(0.0);
        let mut w = state(Wait::SecondsRealtime(Duration::from_millis(500)), &clock);

        clock.advance(Duration::from_millis(250));
        assert!(!w.ready(&clock));
        clock.advance(Duration::from_millis(250));
        assert!(w.ready(&clock));
    }

    #[test]
    fn test_unbounded_wait_never_overflows() {
        let mut clock = Clock::default();
        clock.advance(Duration::from_secs(3));

        let mut scaled = state(Wait::Seconds(Duration::MAX), &clock);
        let mut real = state(Wait::SecondsRealtime(Duration::MAX), &clock);
        for _ in 0..5 {
            clock.advance(Duration::from_secs(3600));
            assert!(!scaled.ready(&clock));
            assert!(!real.ready(&clock));
        }
    }

    #[test]
    fn test_frames_wait_is_at_least_one_tick() {
        let mut clock = Clock::default();
        let mut zero = state(Wait::Frames(0), &clock);
        let mut three = state(Wait::Frames(3), &clock);

        assert!(!zero.ready(&clock));
        clock.advance(Duration::ZERO);
        assert!(zero.ready(&clock));
        assert!(!three.ready(&clock));
        clock.advance(Duration::ZERO);
        clock.advance(Duration::ZERO);
        assert!(three.ready(&clock));
    }

    #[test]
    fn test_until_and_while_predicates() {
        let mut clock = Clock::default();
        let mut until = state(Wait::until(|c: &Clock| c.frame() >= 2), &clock);
        let mut during = state(Wait::while_holds(|c: &Clock| c.frame() < 2), &clock);

        clock.advance(Duration::ZERO);
        assert!(!until.ready(&clock));
        assert!(!during.ready(&clock));
        clock.advance(Duration::ZERO);
        assert!(until.ready(&clock));
        assert!(during.ready(&clock));
    }

    #[test]
    fn test_nested_task_is_returned() {
        struct Noop;
        impl Task for Noop {
            fn step(&mut self, _cx: &mut crate::StepContext<'_>) -> crate::Step {
                crate::Step::Done
            }
        }

        let clock = Clock::default();
        let wait = Wait::task(Noop);
        assert!(format!("{wait:?}").starts_with("Task("));
        assert!(WaitState::begin(wait, &clock).is_err());
    }
}
