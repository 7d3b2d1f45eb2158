//! # Sequence contract.
//!
//! A [`Sequence`] is the behaviour behind one instance: it builds the ordered
//! task list for every run and may decide when the instance starts on its own.
//!
//! ## Rules
//! - [`Sequence::tasks`] is called on every reset (execute, halt, complete);
//!   each call must return **fresh** tasks. Nothing carries over between runs.
//! - List order is execution order.
//! - [`Sequence::trigger`] is polled once per tick while the instance is
//!   `Inactive`; returning `true` executes it. The default never triggers.

use std::borrow::Cow;
use std::fmt;

use crate::core::Clock;
use crate::tasks::task::TaskRef;

/// Behaviour of one sequencing instance.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use stagehand::{Delay, Sequence, TaskRef};
///
/// #[derive(Default)]
/// struct Intro;
///
/// impl Sequence for Intro {
///     fn tasks(&mut self) -> Vec<TaskRef> {
///         vec![
///             Box::new(Delay::new(Duration::from_secs(1))),
///             Box::new(Delay::new(Duration::from_secs(2))),
///         ]
///     }
/// }
/// ```
pub trait Sequence: Send + 'static {
    /// Returns a human-readable name; used as the instance name.
    ///
    /// The default is the last path segment of the type name.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }

    /// Builds the ordered task list for a new run.
    fn tasks(&mut self) -> Vec<TaskRef>;

    /// Automatic start condition, polled while `Inactive`.
    fn trigger(&mut self, clock: &Clock) -> bool {
        let _ = clock;
        false
    }
}

/// Closure-backed sequence.
///
/// # Example
/// ```
/// use stagehand::{Delay, SequenceFn, TaskRef};
///
/// let seq = SequenceFn::new("pulse", || vec![Box::new(Delay::secs(0.5)) as TaskRef])
///     .with_trigger(|clock| clock.frame() == 10);
/// ```
pub struct SequenceFn<F> {
    name: Cow<'static, str>,
    factory: F,
    trigger: Option<Box<dyn FnMut(&Clock) -> bool + Send>>,
}

impl<F> SequenceFn<F>
where
    F: FnMut() -> Vec<TaskRef> + Send + 'static,
{
    /// Creates a sequence from a task-list factory.
    pub fn new(name: impl Into<Cow<'static, str>>, factory: F) -> Self {
        Self {
            name: name.into(),
            factory,
            trigger: None,
        }
    }

    /// Sets the automatic start condition.
    pub fn with_trigger<P>(mut self, trigger: P) -> Self
    where
        P: FnMut(&Clock) -> bool + Send + 'static,
    {
        self.trigger = Some(Box::new(trigger));
        self
    }
}

impl<F> Sequence for SequenceFn<F>
where
    F: FnMut() -> Vec<TaskRef> + Send + 'static,
{
    fn name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    fn tasks(&mut self) -> Vec<TaskRef> {
        (self.factory)()
    }

    fn trigger(&mut self, clock: &Clock) -> bool {
        self.trigger.as_mut().map_or(false, |t| t(clock))
    }
}

impl<F> fmt::Debug for SequenceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceFn")
            .field("name", &self.name)
            .field("trigger", &self.trigger.is_some())
            .finish()
    }
}

/// `a::b::Thing<x::Y>` → `Thing<x::Y>`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Delay;

    #[derive(Default)]
    struct Cutscene;

    impl Sequence for Cutscene {
        fn tasks(&mut self) -> Vec<TaskRef> {
            vec![Box::new(Delay::secs(1.0))]
        }
    }

    #[test]
    fn test_default_name_is_short_type_name() {
        assert_eq!(Cutscene.name(), "Cutscene");
        assert_eq!(short_type_name::<Vec<std::string::String>>(), "Vec<alloc::string::String>");
    }

    #[test]
    fn test_default_trigger_never_fires() {
        let clock = Clock::default();
        assert!(!Cutscene.trigger(&clock));
    }

    #[test]
    fn test_sequence_fn_builds_fresh_lists() {
        let mut built = 0;
        let mut seq = SequenceFn::new("counted", move || {
            built += 1;
            (0..built).map(|_| Box::new(Delay::secs(0.1)) as TaskRef).collect()
        });

        assert_eq!(seq.tasks().len(), 1);
        assert_eq!(seq.tasks().len(), 2);
        assert_eq!(seq.name(), "counted");
    }

    #[test]
    fn test_sequence_fn_trigger() {
        let mut seq = SequenceFn::new("t", Vec::new).with_trigger(|c: &Clock| c.frame() > 0);
        let mut clock = Clock::default();
        assert!(!seq.trigger(&clock));
        clock.advance(std::time::Duration::ZERO);
        assert!(seq.trigger(&clock));
    }
}
