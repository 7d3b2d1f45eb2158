//! # Task abstractions and building blocks.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for step-wise, resumable units of work
//! - [`Step`] / [`Wait`] - what a step reports back to the runner
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - owned task handle (`Box<dyn Task>`)
//! - [`Sequence`] / [`SequenceFn`] - the per-instance task-list factory
//! - [`Delay`], [`ScaledDelay`], [`MainThreadCallback`], [`NonBlockingLaunch`] - utility tasks

mod delay;
mod sequence;
mod task;
mod task_fn;
mod wait;

pub use delay::{
    delay, main_thread, non_blocking, scaled_delay, Delay, MainThreadCallback, NonBlockingLaunch,
    ScaledDelay,
};
pub(crate) use sequence::short_type_name;
pub use sequence::{Sequence, SequenceFn};
pub use task::{Step, StepContext, Task, TaskRef};
pub use task_fn::TaskFn;
pub(crate) use wait::WaitState;
pub use wait::{Predicate, Wait};
