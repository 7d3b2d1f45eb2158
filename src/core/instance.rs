//! # Instance: lifecycle state machine and task-queue driver.
//!
//! One [`Instance`] per spawned sequence. It owns the run state (task queue,
//! active-task counter, scheduled units) and enforces the lifecycle guards:
//!
//! ```text
//!             execute                pause
//!  Inactive ───────────► Active ───────────► Paused
//!     ▲                  │  ▲                  │
//!     │   halt/complete  │  └──────────────────┘
//!     └──────────────────┘        resume
//! ```
//!
//! Every transition method returns `false` (and changes nothing) when called
//! from the wrong state. Signal firing is the director's job.
//!
//! ## Queue driver (once per tick, frames after the one Execute ran in)
//! ```text
//! queue empty && active_tasks == 0     ─► Complete
//! active_tasks == 0 && status == Active ─► launch next task (first step runs now)
//! otherwise                             ─► wait
//! ```
//!
//! ## Cancellation scopes
//! ```text
//! scope (instance lifetime, cancelled on doom/finalize)
//!   ├─► run       (replaced on every reset)  ─► one child per task runner
//!   └─► detached  (replaced on halt)         ─► one child per launched unit
//! ```
//! On top of the tokens, runners capture the run generation; a runner whose
//! generation is stale exits without touching the counter.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::core::config::SequenceConfig;
use crate::core::runner::{Progress, Unit, UnitKind};
use crate::core::{Clock, Control, InstanceId};
use crate::events::ObserverList;
use crate::tasks::{Sequence, TaskRef};

/// Lifecycle status of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not running; waiting for Execute or its trigger.
    #[default]
    Inactive,
    /// Running its task queue.
    Active,
    /// Running task continues, next task is held back.
    Paused,
}

/// What the queue driver did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Drive {
    Idle,
    Launched,
    Complete,
}

pub(crate) struct Instance {
    id: InstanceId,
    name: Arc<str>,
    sequence: Box<dyn Sequence>,
    config: SequenceConfig,

    status: Status,
    active_tasks: usize,
    queue: VecDeque<TaskRef>,
    run_len: usize,
    /// Frame Execute ran in, while the driver is live.
    armed_at: Option<u64>,
    generation: u64,

    scope: CancellationToken,
    run: CancellationToken,
    detached: CancellationToken,
    units: Vec<Unit>,

    pub(crate) observers: ObserverList,
    /// `execute_on_start` not yet honoured; consumed by the first tick.
    start_pending: bool,
    doomed: bool,
}

impl Instance {
    pub(crate) fn new(
        id: InstanceId,
        name: Arc<str>,
        sequence: Box<dyn Sequence>,
        config: SequenceConfig,
    ) -> Self {
        let scope = CancellationToken::new();
        let run = scope.child_token();
        let detached = scope.child_token();
        Self {
            id,
            name,
            sequence,
            config,
            status: Status::Inactive,
            active_tasks: 0,
            queue: VecDeque::new(),
            run_len: 0,
            armed_at: None,
            generation: 0,
            scope,
            run,
            detached,
            units: Vec::new(),
            observers: ObserverList::new(),
            start_pending: config.execute_on_start,
            doomed: false,
        }
    }

    // ---- Queries ----

    #[inline]
    pub(crate) fn id(&self) -> InstanceId {
        self.id
    }

    #[inline]
    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub(crate) fn config(&self) -> SequenceConfig {
        self.config
    }

    #[inline]
    pub(crate) fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub(crate) fn active_tasks(&self) -> usize {
        self.active_tasks
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Tasks of the current run not launched yet.
    #[inline]
    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Scheduled units (runners and detached), excluding finished ones.
    #[inline]
    pub(crate) fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Destruction was requested; the instance is frozen.
    #[inline]
    pub(crate) fn is_doomed(&self) -> bool {
        self.doomed
    }

    // ---- Lifecycle transitions ----

    /// Consumes the deferred `execute_on_start` request. True at most once.
    pub(crate) fn take_pending_start(&mut self) -> bool {
        std::mem::take(&mut self.start_pending) && !self.doomed
    }

    /// Polls the trigger hook. Only consulted while `Inactive`.
    pub(crate) fn poll_trigger(&mut self, clock: &Clock) -> bool {
        !self.doomed && self.status == Status::Inactive && self.sequence.trigger(clock)
    }

    /// `Inactive → Active`; rebuilds the queue and arms the driver.
    pub(crate) fn execute(&mut self, frame: u64) -> bool {
        if self.doomed || self.status != Status::Inactive {
            return false;
        }
        self.reset();
        self.status = Status::Active;
        self.armed_at = Some(frame);
        true
    }

    /// `Active → Paused`.
    pub(crate) fn pause(&mut self) -> bool {
        if self.doomed || self.status != Status::Active {
            return false;
        }
        self.status = Status::Paused;
        true
    }

    /// `Paused → Active`.
    pub(crate) fn resume(&mut self) -> bool {
        if self.doomed || self.status != Status::Paused {
            return false;
        }
        self.status = Status::Active;
        true
    }

    /// `Active → Inactive`; cancels every scheduled unit, detached ones included.
    pub(crate) fn halt(&mut self) -> bool {
        if self.doomed || self.status != Status::Active {
            return false;
        }
        self.detached.cancel();
        self.detached = self.scope.child_token();
        self.units.clear();
        self.reset();
        self.status = Status::Inactive;
        true
    }

    /// Driver-invoked end of run: `→ Inactive`. Detached units keep running.
    pub(crate) fn complete(&mut self) {
        self.reset();
        self.status = Status::Inactive;
    }

    /// Freezes the instance ahead of destruction. Returns `false` if already frozen.
    pub(crate) fn doom(&mut self) -> bool {
        if self.doomed {
            return false;
        }
        self.doomed = true;
        self.scope.cancel();
        self.units.clear();
        self.queue.clear();
        self.active_tasks = 0;
        self.armed_at = None;
        self.status = Status::Inactive;
        true
    }

    /// Final teardown when the host destroys the object.
    pub(crate) fn finalize(&mut self) {
        self.scope.cancel();
        self.units.clear();
        self.queue.clear();
        self.active_tasks = 0;
    }

    /// Fresh run state: new generation, new run token, rebuilt queue.
    fn reset(&mut self) {
        self.run.cancel();
        self.run = self.scope.child_token();
        self.generation += 1;
        self.units
            .retain(|u| u.kind() == UnitKind::Detached && !u.is_cancelled());
        self.active_tasks = 0;
        self.queue = self.sequence.tasks().into();
        self.run_len = self.queue.len();
        self.armed_at = None;
    }

    // ---- Scheduling ----

    /// One queue-driver check.
    pub(crate) fn drive(&mut self, clock: &Clock, control: &mut Control) -> Drive {
        let Some(armed) = self.armed_at else {
            return Drive::Idle;
        };
        if self.doomed || clock.frame() <= armed {
            return Drive::Idle;
        }
        if self.queue.is_empty() && self.active_tasks == 0 {
            return Drive::Complete;
        }
        if self.active_tasks == 0 && self.status == Status::Active {
            if let Some(task) = self.queue.pop_front() {
                self.launch(task, clock, control);
                return Drive::Launched;
            }
        }
        Drive::Idle
    }

    /// Starts a runner for `task` and takes its first step immediately.
    fn launch(&mut self, task: TaskRef, clock: &Clock, control: &mut Control) {
        let index = self.run_len - self.queue.len();
        self.active_tasks += 1;

        let mut unit = Unit::runner(task, self.generation, self.run.child_token(), clock.frame());
        trace!(
            instance = %self.id,
            task = unit.label(),
            index,
            of = self.run_len,
            run = self.generation,
            "task launched"
        );

        let mut launched = Vec::new();
        let progress = unit.advance(clock, self.id, &mut launched, control);
        if progress == Progress::Finished || self.status == Status::Inactive {
            self.exit_runner(&unit);
        } else {
            self.units.push(unit);
        }
        self.start_detached(launched, clock, control);
    }

    /// Steps every unit that did not start this frame.
    pub(crate) fn advance_units(&mut self, clock: &Clock, control: &mut Control) {
        if self.units.is_empty() {
            return;
        }
        let mut units = std::mem::take(&mut self.units);
        let mut launched = Vec::new();

        units.retain_mut(|unit| {
            if unit.is_cancelled() {
                return false;
            }
            if unit.launched_frame() == clock.frame() {
                return true;
            }
            if unit.kind() == UnitKind::Runner && unit.generation() != self.generation {
                trace!(instance = %self.id, task = unit.label(), "stale runner dropped");
                return false;
            }

            let progress = unit.advance(clock, self.id, &mut launched, control);
            match unit.kind() {
                UnitKind::Runner
                    if progress == Progress::Finished || self.status == Status::Inactive =>
                {
                    self.exit_runner(unit);
                    false
                }
                UnitKind::Detached if progress == Progress::Finished => {
                    trace!(instance = %self.id, "detached unit finished");
                    false
                }
                _ => true,
            }
        });

        units.append(&mut self.units);
        self.units = units;
        self.start_detached(launched, clock, control);
    }

    /// Starts fire-and-forget units; each takes its first step immediately.
    fn start_detached(&mut self, tasks: Vec<TaskRef>, clock: &Clock, control: &mut Control) {
        let mut pending: VecDeque<TaskRef> = tasks.into();
        while let Some(task) = pending.pop_front() {
            let mut unit = Unit::detached(
                task,
                self.generation,
                self.detached.child_token(),
                clock.frame(),
            );
            trace!(instance = %self.id, task = unit.label(), "detached unit launched");

            let mut more = Vec::new();
            if unit.advance(clock, self.id, &mut more, control) == Progress::Pending {
                self.units.push(unit);
            }
            pending.extend(more);
        }
    }

    /// Pairs the launch-time increment of `active_tasks`.
    fn exit_runner(&mut self, unit: &Unit) {
        debug_assert!(self.active_tasks > 0, "runner exit without matching launch");
        self.active_tasks = self.active_tasks.saturating_sub(1);
        trace!(
            instance = %self.id,
            depth = unit.depth(),
            run = unit.generation(),
            active = self.active_tasks,
            "task exited"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::tasks::{Delay, SequenceFn, Step, TaskFn};

    fn make(factory: impl FnMut() -> Vec<TaskRef> + Send + 'static) -> Instance {
        Instance::new(
            InstanceId::from_raw(1),
            Arc::from("test"),
            Box::new(SequenceFn::new("test", factory)),
            SequenceConfig::default(),
        )
    }

    fn tick(inst: &mut Instance, clock: &mut Clock, dt: Duration) -> Drive {
        clock.advance(dt);
        let mut ctl = Control::new(inst.id());
        let drive = inst.drive(clock, &mut ctl);
        inst.advance_units(clock, &mut ctl);
        drive
    }

    #[test]
    fn test_guards_reject_illegal_transitions() {
        let mut inst = make(Vec::new);
        assert!(!inst.pause());
        assert!(!inst.resume());
        assert!(!inst.halt());
        assert_eq!(inst.status(), Status::Inactive);
        assert_eq!(inst.generation(), 0);

        assert!(inst.execute(0));
        assert!(!inst.execute(0));
        assert!(!inst.resume());
        assert!(inst.pause());
        assert!(!inst.pause());
        assert!(!inst.halt());
        assert!(inst.resume());
        assert!(inst.halt());
        assert_eq!(inst.status(), Status::Inactive);
    }

    #[test]
    fn test_guards_keep_counters_while_task_runs() {
        let mut clock = Clock::default();
        let mut inst = make(|| {
            vec![Box::new(Delay::secs(5.0)) as TaskRef, Box::new(Delay::secs(5.0))]
        });
        inst.execute(0);
        tick(&mut inst, &mut clock, Duration::from_millis(100));
        let counters = |i: &Instance| (i.active_tasks(), i.generation(), i.queued(), i.unit_count());
        let before = counters(&inst);
        assert_eq!(before, (1, 1, 1, 1));

        assert!(!inst.execute(clock.frame()));
        assert!(!inst.resume());
        assert_eq!(counters(&inst), before);
        assert_eq!(inst.status(), Status::Active);

        assert!(inst.pause());
        assert!(!inst.halt());
        assert!(!inst.execute(clock.frame()));
        assert_eq!(counters(&inst), before);
        assert_eq!(inst.status(), Status::Paused);
    }

    #[test]
    fn test_pending_start_is_taken_once() {
        let mut inst = Instance::new(
            InstanceId::from_raw(1),
            Arc::from("test"),
            Box::new(SequenceFn::new("test", Vec::new)),
            SequenceConfig::default().with_execute_on_start(true),
        );
        assert!(inst.take_pending_start());
        assert!(!inst.take_pending_start());
        assert!(!make(Vec::new).take_pending_start());
    }

    #[test]
    fn test_execute_rebuilds_queue_each_run() {
        let builds = Arc::new(Mutex::new(0));
        let b = Arc::clone(&builds);
        let mut inst = make(move || {
            *b.lock().unwrap() += 1;
            vec![Box::new(Delay::secs(1.0)) as TaskRef, Box::new(Delay::secs(1.0))]
        });

        assert!(inst.execute(0));
        assert_eq!(inst.queued(), 2);
        assert_eq!(inst.generation(), 1);

        assert!(inst.halt());
        assert!(inst.execute(0));
        assert_eq!(inst.queued(), 2);
        assert_eq!(inst.generation(), 3);
        assert_eq!(*builds.lock().unwrap(), 3);
    }

    #[test]
    fn test_driver_waits_one_frame_after_execute() {
        let mut clock = Clock::default();
        let mut inst = make(|| vec![Box::new(Delay::secs(1.0)) as TaskRef]);

        assert!(inst.execute(clock.frame()));
        let mut ctl = Control::new(inst.id());
        assert_eq!(inst.drive(&clock, &mut ctl), Drive::Idle);
        assert_eq!(inst.active_tasks(), 0);

        assert_eq!(tick(&mut inst, &mut clock, Duration::from_millis(100)), Drive::Launched);
        assert_eq!(inst.active_tasks(), 1);
    }

    #[test]
    fn test_tasks_never_overlap() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let mut inst = make(move || {
            ["a", "b"]
                .into_iter()
                .map(|tag| {
                    let log = Arc::clone(&l);
                    let mut steps = 0;
                    TaskFn::boxed(tag, move |_cx| {
                        steps += 1;
                        log.lock().unwrap().push(format!("{tag}{steps}"));
                        if steps == 2 {
                            Step::Done
                        } else {
                            Step::Next
                        }
                    })
                })
                .collect()
        });
        let mut clock = Clock::default();
        inst.execute(0);

        let mut drives = Vec::new();
        for _ in 0..5 {
            drives.push(tick(&mut inst, &mut clock, Duration::from_millis(16)));
        }

        assert_eq!(*log.lock().unwrap(), ["a1", "a2", "b1", "b2"]);
        assert_eq!(
            drives,
            [Drive::Launched, Drive::Idle, Drive::Launched, Drive::Idle, Drive::Complete]
        );
    }

    #[test]
    fn test_pause_holds_next_task_but_not_current() {
        let mut clock = Clock::default();
        let mut inst = make(|| {
            vec![
                Box::new(Delay::new(Duration::from_millis(20))) as TaskRef,
                Box::new(Delay::new(Duration::from_millis(20))),
            ]
        });
        inst.execute(0);
        tick(&mut inst, &mut clock, Duration::from_millis(10));
        assert!(inst.pause());

        // first delay finishes while paused
        for _ in 0..4 {
            tick(&mut inst, &mut clock, Duration::from_millis(10));
        }
        assert_eq!(inst.active_tasks(), 0);
        assert_eq!(inst.queued(), 1);

        assert!(inst.resume());
        assert_eq!(tick(&mut inst, &mut clock, Duration::from_millis(10)), Drive::Launched);
        assert_eq!(inst.queued(), 0);
    }

    #[test]
    fn test_halt_cancels_detached_units() {
        let mut clock = Clock::default();
        let mut inst = make(|| {
            vec![TaskFn::boxed("spawner", |cx| {
                cx.launch(Box::new(Delay::secs(60.0)));
                Step::Next
            })]
        });
        inst.execute(0);
        tick(&mut inst, &mut clock, Duration::from_millis(10));
        assert_eq!(inst.unit_count(), 2);

        assert!(inst.halt());
        assert_eq!(inst.unit_count(), 0);
        assert_eq!(inst.active_tasks(), 0);
    }

    #[test]
    fn test_complete_keeps_detached_units() {
        let mut clock = Clock::default();
        let mut inst = make(|| {
            vec![TaskFn::boxed("spawner", |cx| {
                cx.launch(Box::new(Delay::secs(60.0)));
                Step::Done
            })]
        });
        inst.execute(0);
        tick(&mut inst, &mut clock, Duration::from_millis(10));
        assert_eq!(inst.active_tasks(), 0);
        assert_eq!(tick(&mut inst, &mut clock, Duration::from_millis(10)), Drive::Complete);

        inst.complete();
        assert_eq!(inst.status(), Status::Inactive);
        assert_eq!(inst.unit_count(), 1);
    }

    #[test]
    fn test_doom_freezes_everything() {
        let mut inst = make(|| vec![Box::new(Delay::secs(1.0)) as TaskRef]);
        inst.execute(0);

        assert!(inst.doom());
        assert!(!inst.doom());
        assert!(inst.is_doomed());
        assert_eq!(inst.status(), Status::Inactive);
        assert!(!inst.execute(0));
        assert!(!inst.poll_trigger(&Clock::default()));
    }
}
