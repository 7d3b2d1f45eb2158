//! # Unit runner: drives one scheduled piece of work, one step per tick.
//!
//! A [`Unit`] is everything an instance has scheduled: either the runner of
//! a queued task ([`UnitKind::Runner`]) or a fire-and-forget unit started via
//! [`StepContext::launch`](crate::StepContext::launch) ([`UnitKind::Detached`]).
//!
//! ## Step flow
//! ```text
//! advance()
//!   ├─► wait pending and not ready ─────────► Pending
//!   ├─► top.step(cx)
//!   │     ├─ Next               ─► Pending (resume next tick)
//!   │     ├─ Wait(Task(t))      ─► push t, Pending (nested task runs next tick)
//!   │     ├─ Wait(w)            ─► anchor WaitState, Pending
//!   │     └─ Done               ─► pop; empty stack ─► Finished
//!   │                                   otherwise ─► Pending (parent resumes next tick)
//! ```
//!
//! ## Rules
//! - A unit is stepped at most once per tick.
//! - Cancellation is observed before every step: a unit whose token is
//!   cancelled never steps again.
//! - The unit does not touch the instance's active-task counter; the instance
//!   increments it on launch and decrements it when the runner exits.

use tokio_util::sync::CancellationToken;

use crate::core::{Clock, Control, InstanceId};
use crate::tasks::{Step, StepContext, TaskRef, WaitState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitKind {
    /// Runs one task from the instance's queue; counted in `active_tasks`.
    Runner,
    /// Fire-and-forget unit; not counted, survives completion.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    Pending,
    Finished,
}

pub(crate) struct Unit {
    kind: UnitKind,
    generation: u64,
    token: CancellationToken,
    stack: Vec<TaskRef>,
    wait: Option<WaitState>,
    launched_frame: u64,
}

impl Unit {
    pub(crate) fn runner(
        task: TaskRef,
        generation: u64,
        token: CancellationToken,
        frame: u64,
    ) -> Self {
        Self::new(UnitKind::Runner, task, generation, token, frame)
    }

    pub(crate) fn detached(
        task: TaskRef,
        generation: u64,
        token: CancellationToken,
        frame: u64,
    ) -> Self {
        Self::new(UnitKind::Detached, task, generation, token, frame)
    }

    fn new(
        kind: UnitKind,
        task: TaskRef,
        generation: u64,
        token: CancellationToken,
        frame: u64,
    ) -> Self {
        Self {
            kind,
            generation,
            token,
            stack: vec![task],
            wait: None,
            launched_frame: frame,
        }
    }

    #[inline]
    pub(crate) fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Run generation captured at launch.
    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[inline]
    pub(crate) fn launched_frame(&self) -> u64 {
        self.launched_frame
    }

    /// Name of the innermost task.
    pub(crate) fn label(&self) -> &str {
        self.stack.last().map_or("<finished>", |t| t.name())
    }

    /// Nesting depth (1 for a plain task).
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Advances the unit by one logical step, unless a wait is still pending.
    ///
    /// Tasks started through `StepContext::launch` are appended to `launched`.
    pub(crate) fn advance(
        &mut self,
        clock: &Clock,
        instance: InstanceId,
        launched: &mut Vec<TaskRef>,
        control: &mut Control,
    ) -> Progress {
        if self.token.is_cancelled() {
            return Progress::Finished;
        }
        if let Some(wait) = self.wait.as_mut() {
            if !wait.ready(clock) {
                return Progress::Pending;
            }
            self.wait = None;
        }

        let Some(top) = self.stack.last_mut() else {
            return Progress::Finished;
        };
        let step = {
            let mut cx = StepContext::new(clock, instance, &self.token, launched, control);
            top.step(&mut cx)
        };

        match step {
            Step::Next => Progress::Pending,
            Step::Wait(wait) => {
                match WaitState::begin(wait, clock) {
                    Ok(state) => self.wait = Some(state),
                    Err(nested) => self.stack.push(nested),
                }
                Progress::Pending
            }
            Step::Done => {
                self.stack.pop();
                if self.stack.is_empty() {
                    Progress::Finished
                } else {
                    Progress::Pending
                }
            }
        }
    }
}
