//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnMut(&mut StepContext) -> Step`. The closure
//! is the task's step function; whatever it captures is the task's state.
//!
//! ## Example
//! ```rust
//! use stagehand::{Step, TaskFn, TaskRef};
//!
//! let mut remaining = 3;
//! let t: TaskRef = TaskFn::boxed("blink", move |_cx| {
//!     if remaining == 0 {
//!         return Step::Done;
//!     }
//!     remaining -= 1;
//!     Step::Next
//! });
//!
//! assert_eq!(t.name(), "blink");
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::tasks::task::{Step, StepContext, Task, TaskRef};

/// Function-backed task implementation.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F>
where
    F: FnMut(&mut StepContext<'_>) -> Step + Send + 'static,
{
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::boxed`] when you immediately need a [`TaskRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as an owned handle (`Box<dyn Task>`).
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef {
        Box::new(Self::new(name, f))
    }
}

impl<F> Task for TaskFn<F>
where
    F: FnMut(&mut StepContext<'_>) -> Step + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, cx: &mut StepContext<'_>) -> Step {
        (self.f)(cx)
    }
}

impl<F> fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn").field("name", &self.name).finish()
    }
}
