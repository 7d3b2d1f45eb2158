//! # Director: registry, frame driver and lifecycle control surface.
//!
//! The [`Director`] is the one object the host talks to. It is constructed at
//! host startup and passed by reference to whatever drives frames or issues
//! batch operations; there is no process-wide state.
//!
//! ## Key responsibilities
//! - keep the registry of live instances (registration order)
//! - deliver one [`tick`](Director::tick) per frame to every live instance
//! - apply lifecycle operations and fire signals (instance observers, then global)
//! - apply commands queued by observers and tasks through their [`Control`]
//! - collect destruction requests for the host object model
//!
//! ## Tick flow (per instance, registration order)
//! ```text
//! tick(dt)
//!   └─► clock.advance(dt)
//!   └─► for id in registry:
//!         ├─► frozen (destroy requested)?       ─► skip
//!         ├─► first tick && execute_on_start    ─► execute(id)
//!         ├─► Inactive && sequence.trigger()    ─► execute(id)
//!         ├─► queue driver
//!         │     ├─ Complete ─► complete(id)
//!         │     └─ Launched ─► new runner took its first step
//!         ├─► step every older unit once
//!         └─► apply queued commands
//! ```
//!
//! ## Transition flow
//! ```text
//! guard (silent no-op on wrong state)
//!   └─► state change
//!   └─► fire instance observers ─► fire global observers
//!   └─► apply commands queued by those observers
//!   └─► follow-up (halt: loop if obey_loop; complete: destroy or loop)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use stagehand::{Delay, Director, EventKind, SequenceConfig, SequenceFn, Status, TaskRef};
//!
//! let mut director = Director::default();
//! let intro = director.spawn(
//!     SequenceFn::new("intro", || vec![Box::new(Delay::secs(0.5)) as TaskRef]),
//!     SequenceConfig::default().with_execute_on_start(true),
//! );
//! director.on_any(EventKind::Completed, |ev, _ctl| println!("{} done", ev.name));
//!
//! for _ in 0..60 {
//!     director.tick(Duration::from_millis(16));
//! }
//! assert_eq!(director.status(intro), Some(Status::Inactive));
//! ```

use std::any::type_name;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::core::config::{validate_time_scale, DirectorConfig, SequenceConfig};
use crate::core::control::Command;
use crate::core::instance::{Drive, Instance, Status};
use crate::core::registry::{InstanceId, Registry};
use crate::core::{Clock, Control};
use crate::error::ConfigError;
use crate::events::{Event, EventKind, ObserverList, SubscriptionId};
use crate::subscribers::{FnSubscriber, Subscribe};
use crate::tasks::{short_type_name, Sequence};

/// Owns every live instance and drives them frame by frame.
pub struct Director {
    cfg: DirectorConfig,
    clock: Clock,
    registry: Registry,
    global: ObserverList,
    last_seq: u64,
    last_subscription: u64,
    destroy_requests: Vec<InstanceId>,
}

impl Director {
    /// Creates a director with the given configuration.
    pub fn new(cfg: DirectorConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            clock: Clock::new(cfg.time_scale),
            cfg,
            registry: Registry::new(),
            global: ObserverList::new(),
            last_seq: 0,
            last_subscription: 0,
            destroy_requests: Vec::new(),
        })
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a new instance.
    ///
    /// With `execute_on_start`, Execute runs at the start of the next tick,
    /// so observers attached right after `spawn` see the first `Started`.
    pub fn spawn<S: Sequence>(&mut self, sequence: S, cfg: SequenceConfig) -> InstanceId {
        let name = sequence.name();
        self.spawn_named(name, Box::new(sequence), cfg)
    }

    /// Like [`spawn`](Self::spawn) for an already boxed sequence.
    pub fn spawn_boxed(&mut self, sequence: Box<dyn Sequence>, cfg: SequenceConfig) -> InstanceId {
        let name = sequence.name();
        self.spawn_named(name, sequence, cfg)
    }

    fn spawn_named(
        &mut self,
        name: Cow<'static, str>,
        sequence: Box<dyn Sequence>,
        cfg: SequenceConfig,
    ) -> InstanceId {
        let id = self.registry.next_id();
        let name: Arc<str> = Arc::from(name.as_ref());
        debug!(instance = %id, name = %name, ?cfg, "instance registered");

        self.registry.register(Instance::new(id, name, sequence, cfg));
        id
    }

    /// Creates a fresh `T` on its own host object.
    ///
    /// The instance is named `"[<uuid>] <TypeName>"` and both its `Halted`
    /// and `Completed` signals request destruction of the host object when
    /// `destroy_on_complete` is set. Requests are deduplicated, so the host
    /// sees exactly one per instance.
    pub fn create<T>(&mut self, destroy_on_complete: bool) -> InstanceId
    where
        T: Sequence + Default,
    {
        let name = format!("[{}] {}", Uuid::new_v4(), short_type_name::<T>());
        let cfg = SequenceConfig::default().with_destroy_on_complete(destroy_on_complete);
        let id = self.spawn_named(Cow::Owned(name), Box::new(T::default()), cfg);

        for kind in [EventKind::Halted, EventKind::Completed] {
            self.on(id, kind, move |_ev, ctl| {
                if destroy_on_complete {
                    ctl.destroy();
                }
            });
        }
        debug!(instance = %id, ty = type_name::<T>(), destroy_on_complete, "instance created");
        id
    }

    /// Host notification that the owning object is gone; deregisters the instance.
    ///
    /// Returns `true` the first time, `false` for unknown or already finalized ids.
    pub fn finalize(&mut self, id: InstanceId) -> bool {
        match self.registry.deregister(id) {
            Some(mut instance) => {
                instance.finalize();
                debug!(instance = %id, "instance finalized");
                true
            }
            None => false,
        }
    }

    /// Takes the destruction requests issued since the last call, in request order.
    pub fn drain_destroy_requests(&mut self) -> Vec<InstanceId> {
        std::mem::take(&mut self.destroy_requests)
    }

    // ---------------------------
    // Frame driving
    // ---------------------------

    /// Delivers one frame of `dt` to every live instance.
    pub fn tick(&mut self, dt: Duration) {
        self.clock.advance(dt);
        for id in self.registry.ids() {
            self.update(id);
        }
    }

    fn update(&mut self, id: InstanceId) {
        let start = match self.registry.get_mut(id) {
            Some(instance) => instance.take_pending_start(),
            None => return,
        };
        if start {
            debug!(instance = %id, frame = self.clock.frame(), "execute on start");
            self.execute(id);
        }

        let triggered = match self.registry.get_mut(id) {
            Some(instance) if !instance.is_doomed() => instance.poll_trigger(&self.clock),
            _ => return,
        };
        if triggered {
            debug!(instance = %id, frame = self.clock.frame(), "trigger fired");
            self.execute(id);
        }

        let mut control = Control::new(id);
        let drive = match self.registry.get_mut(id) {
            Some(instance) if !instance.is_doomed() => instance.drive(&self.clock, &mut control),
            _ => return,
        };
        if drive == Drive::Complete {
            self.complete(id);
        }

        if let Some(instance) = self.registry.get_mut(id) {
            if !instance.is_doomed() {
                instance.advance_units(&self.clock, &mut control);
            }
        }
        self.apply(control);
    }

    // ---------------------------
    // Lifecycle operations
    // ---------------------------

    /// `Inactive → Active`: rebuilds the task list, fires `Started`; task 0
    /// launches on the next tick. No-op from any other state.
    pub fn execute(&mut self, id: InstanceId) {
        let frame = self.clock.frame();
        let Some(instance) = self.registry.get_mut(id) else {
            debug!(instance = %id, "execute: unknown instance");
            return;
        };
        if !instance.execute(frame) {
            return;
        }
        debug!(instance = %id, run = instance.generation(), tasks = instance.queued(), "executed");
        self.signal(id, EventKind::Started);
    }

    /// `Active → Paused`: the running task continues, the next one is held back.
    pub fn pause(&mut self, id: InstanceId) {
        if self.registry.get_mut(id).is_some_and(Instance::pause) {
            debug!(instance = %id, "paused");
            self.signal(id, EventKind::Paused);
        }
    }

    /// `Paused → Active`.
    pub fn resume(&mut self, id: InstanceId) {
        if self.registry.get_mut(id).is_some_and(Instance::resume) {
            debug!(instance = %id, "resumed");
            self.signal(id, EventKind::Resumed);
        }
    }

    /// `Active → Inactive`: cancels all scheduled work and fires `Halted`.
    ///
    /// With `obey_loop` and a looping instance, executes again right away.
    pub fn halt(&mut self, id: InstanceId, obey_loop: bool) {
        let Some(instance) = self.registry.get_mut(id) else {
            return;
        };
        if !instance.halt() {
            return;
        }
        let looping = instance.config().loop_on_complete;
        debug!(instance = %id, obey_loop, looping, "halted");

        self.signal(id, EventKind::Halted);
        if obey_loop && looping {
            self.execute(id);
        }
    }

    /// Driver-invoked end of a run.
    fn complete(&mut self, id: InstanceId) {
        let Some(instance) = self.registry.get_mut(id) else {
            return;
        };
        instance.complete();
        let cfg = instance.config();
        debug!(instance = %id, frame = self.clock.frame(), "completed");

        self.signal(id, EventKind::Completed);
        if cfg.destroy_on_complete {
            self.request_destroy(id);
        } else if cfg.loop_on_complete {
            self.execute(id);
        }
    }

    /// Freezes the instance and queues it for the host to destroy (once).
    fn request_destroy(&mut self, id: InstanceId) {
        let Some(instance) = self.registry.get_mut(id) else {
            return;
        };
        if !instance.doom() {
            return;
        }
        debug!(instance = %id, "destruction requested");
        self.destroy_requests.push(id);
        if self.cfg.auto_finalize {
            self.finalize(id);
        }
    }

    // ---------------------------
    // Batch operations
    // ---------------------------

    /// Executes every registered instance (registration order).
    pub fn execute_all(&mut self) {
        for id in self.registry.ids() {
            self.execute(id);
        }
    }

    /// Pauses every registered instance (registration order).
    pub fn pause_all(&mut self) {
        for id in self.registry.ids() {
            self.pause(id);
        }
    }

    /// Resumes every registered instance (registration order).
    pub fn resume_all(&mut self) {
        for id in self.registry.ids() {
            self.resume(id);
        }
    }

    /// Halts every registered instance (registration order), ignoring loop flags.
    pub fn halt_all(&mut self) {
        for id in self.registry.ids() {
            self.halt(id, false);
        }
    }

    // ---------------------------
    // Signals
    // ---------------------------

    /// Subscribes to one signal of one instance.
    ///
    /// Returns `None` if the instance is not registered.
    pub fn on<F>(&mut self, id: InstanceId, kind: EventKind, f: F) -> Option<SubscriptionId>
    where
        F: FnMut(&Event, &mut Control) + Send + 'static,
    {
        let sub = self.next_subscription();
        let instance = self.registry.get_mut(id)?;
        instance
            .observers
            .insert(sub, Some(kind), Box::new(FnSubscriber::new(f)));
        Some(sub)
    }

    /// Removes an instance-scoped subscription.
    pub fn off(&mut self, id: InstanceId, sub: SubscriptionId) -> bool {
        self.registry
            .get_mut(id)
            .is_some_and(|instance| instance.observers.remove(sub))
    }

    /// Subscribes to one signal of every instance.
    pub fn on_any<F>(&mut self, kind: EventKind, f: F) -> SubscriptionId
    where
        F: FnMut(&Event, &mut Control) + Send + 'static,
    {
        let sub = self.next_subscription();
        self.global
            .insert(sub, Some(kind), Box::new(FnSubscriber::new(f)));
        sub
    }

    /// Adds a global subscriber that receives every signal of every instance.
    pub fn subscribe<S: Subscribe>(&mut self, subscriber: S) -> SubscriptionId {
        let sub = self.next_subscription();
        let name = subscriber.name();
        self.global.insert(sub, None, Box::new(subscriber));
        debug!(subscription = %sub, subscriber = name, total = self.global.len(), "global subscriber added");
        sub
    }

    /// Removes a global subscription.
    pub fn off_any(&mut self, sub: SubscriptionId) -> bool {
        self.global.remove(sub)
    }

    /// Fires `kind` for `id`, then applies the commands its observers queued.
    fn signal(&mut self, id: InstanceId, kind: EventKind) {
        self.last_seq += 1;
        let seq = self.last_seq;

        let mut control = Control::new(id);
        let Some(instance) = self.registry.get_mut(id) else {
            return;
        };
        let event = Event::new(seq, kind, id)
            .with_name(Arc::clone(instance.name()))
            .with_generation(instance.generation())
            .at(&self.clock);

        instance.observers.emit(&event, &mut control);
        if !self.global.is_empty() {
            self.global.emit(&event, &mut control);
        }
        self.apply(control);
    }

    /// Applies queued commands in order; each goes through the usual guards.
    fn apply(&mut self, control: Control) {
        for (target, command) in control.into_commands() {
            match command {
                Command::Execute => self.execute(target),
                Command::Pause => self.pause(target),
                Command::Resume => self.resume(target),
                Command::Halt { obey_loop } => self.halt(target, obey_loop),
                Command::Destroy => self.request_destroy(target),
            }
        }
    }

    fn next_subscription(&mut self) -> SubscriptionId {
        self.last_subscription += 1;
        SubscriptionId::from_raw(self.last_subscription)
    }

    // ---------------------------
    // Configuration & queries
    // ---------------------------

    /// Changes the scale applied to scaled time from the next tick on.
    pub fn set_time_scale(&mut self, scale: f64) -> Result<(), ConfigError> {
        validate_time_scale(scale)?;
        self.cfg.time_scale = scale;
        self.clock.set_time_scale(scale);
        Ok(())
    }

    /// Director configuration.
    pub fn config(&self) -> &DirectorConfig {
        &self.cfg
    }

    /// Frame clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Lifecycle status, `None` for unknown ids.
    pub fn status(&self, id: InstanceId) -> Option<Status> {
        self.registry.get(id).map(Instance::status)
    }

    /// Number of queue tasks currently running.
    pub fn active_tasks(&self, id: InstanceId) -> Option<usize> {
        self.registry.get(id).map(Instance::active_tasks)
    }

    /// `active_tasks > 0`.
    pub fn doing_task(&self, id: InstanceId) -> bool {
        self.active_tasks(id).is_some_and(|n| n > 0)
    }

    /// Run generation; bumped on every reset.
    pub fn generation(&self, id: InstanceId) -> Option<u64> {
        self.registry.get(id).map(Instance::generation)
    }

    /// Tasks of the current run not launched yet.
    pub fn queued_tasks(&self, id: InstanceId) -> Option<usize> {
        self.registry.get(id).map(Instance::queued)
    }

    /// Scheduled units: running queue tasks plus fire-and-forget units.
    pub fn scheduled_units(&self, id: InstanceId) -> Option<usize> {
        self.registry.get(id).map(Instance::unit_count)
    }

    /// Flags the instance was spawned with.
    pub fn sequence_config(&self, id: InstanceId) -> Option<SequenceConfig> {
        self.registry.get(id).map(Instance::config)
    }

    /// Instance name.
    pub fn name(&self, id: InstanceId) -> Option<&str> {
        self.registry.get(id).map(|i| &**i.name())
    }

    /// True once destruction was requested (until the instance is finalized).
    pub fn is_destroy_requested(&self, id: InstanceId) -> bool {
        self.registry.get(id).is_some_and(Instance::is_doomed)
    }

    /// True while the id is registered.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.registry.get(id).is_some()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<InstanceId> {
        self.registry.ids()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for Director {
    fn default() -> Self {
        Self {
            cfg: DirectorConfig::default(),
            clock: Clock::default(),
            registry: Registry::new(),
            global: ObserverList::new(),
            last_seq: 0,
            last_subscription: 0,
            destroy_requests: Vec::new(),
        }
    }
}
