//! # Task abstraction.
//!
//! A [`Task`] is a resumable piece of work driven one logical step per tick.
//! Each call to [`Task::step`] advances it and reports a [`Step`]:
//! - [`Step::Next`] more steps remain, resume on the next tick;
//! - [`Step::Wait`] more steps remain, resume once the [`Wait`] instruction is satisfied;
//! - [`Step::Done`] no further steps.
//!
//! The common handle type is [`TaskRef`], a boxed `dyn Task` owned by the
//! runner that executes it.

use tokio_util::sync::CancellationToken;

use crate::core::{Clock, Control, InstanceId};
use crate::tasks::wait::Wait;

/// Outcome of one task step.
#[derive(Debug)]
pub enum Step {
    /// Yield to the scheduler; resume on the next tick.
    Next,
    /// Yield until the wait instruction is satisfied.
    Wait(Wait),
    /// The task has no further steps.
    Done,
}

/// Owned, type-erased task.
pub type TaskRef = Box<dyn Task>;

/// # Resumable, step-wise unit of work.
///
/// Implementors keep their own progress in `self`; the runner calls
/// [`step`](Task::step) once per tick (or once a wait is satisfied) until it
/// returns [`Step::Done`] or the owning instance is halted.
///
/// # Example
/// ```
/// use stagehand::{Step, StepContext, Task};
///
/// struct Countdown(u32);
///
/// impl Task for Countdown {
///     fn name(&self) -> &str { "countdown" }
///
///     fn step(&mut self, _cx: &mut StepContext<'_>) -> Step {
///         if self.0 == 0 {
///             return Step::Done;
///         }
///         self.0 -= 1;
///         Step::Next
///     }
/// }
/// ```
pub trait Task: Send + 'static {
    /// Returns a human-readable task name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Advances the task by one logical step.
    fn step(&mut self, cx: &mut StepContext<'_>) -> Step;
}

/// Everything a task step may look at or ask for.
pub struct StepContext<'a> {
    clock: &'a Clock,
    instance: InstanceId,
    token: &'a CancellationToken,
    launched: &'a mut Vec<TaskRef>,
    control: &'a mut Control,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(
        clock: &'a Clock,
        instance: InstanceId,
        token: &'a CancellationToken,
        launched: &'a mut Vec<TaskRef>,
        control: &'a mut Control,
    ) -> Self {
        Self {
            clock,
            instance,
            token,
            launched,
            control,
        }
    }

    /// Frame clock of the director.
    #[inline]
    pub fn clock(&self) -> &Clock {
        self.clock
    }

    /// Instance this step runs for.
    #[inline]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Cancellation token of the unit running this task.
    ///
    /// For a queue task it is cancelled when the run ends (halt, completion,
    /// finalize). A unit started with [`launch`](Self::launch) gets a token that
    /// survives completion and is only cancelled by halt or finalize. Hand a
    /// clone to any out-of-band work the task starts so it can stop with it.
    #[inline]
    pub fn cancellation(&self) -> &CancellationToken {
        self.token
    }

    /// Starts `task` as an independent unit of the same instance.
    ///
    /// The unit takes its first step once the current step returns; the
    /// caller does not wait for it and it does not count as an active task.
    pub fn launch(&mut self, task: TaskRef) {
        self.launched.push(task);
    }

    /// Command buffer for lifecycle requests.
    #[inline]
    pub fn control(&mut self) -> &mut Control {
        self.control
    }
}
