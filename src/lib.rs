//! # stagehand
//!
//! **Stagehand** runs ordered lists of resumable tasks on behalf of host
//! objects (game objects, scene nodes, UI widgets) inside a single-threaded,
//! frame-driven loop.
//!
//! Each registered *instance* owns a lifecycle state machine, a task queue
//! rebuilt from its [`Sequence`] at the start of every run, and lifecycle
//! signals that observers can hook. A single [`Director`] drives every
//! instance one [`tick`](Director::tick) per frame.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Sequence   │   │   Sequence   │   │   Sequence   │
//!     │ (cutscene)   │   │ (door open)  │   │ (spawn wave) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Director (host-owned, passed by reference)                       │
//! │  - Clock (frame, scaled & unscaled time)                          │
//! │  - Registry (instances in registration order)                     │
//! │  - global observers (on_any / subscribe)                          │
//! │  - destroy requests (drained by the host)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Instance   │   │   Instance   │   │   Instance   │
//!     │ status+queue │   │ status+queue │   │ status+queue │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ units:           │                  │
//!      │ - queue runner (at most one at a time)
//!      │ - detached units (NonBlockingLaunch)
//!      ▼
//!   Task::step(cx) ─► Next | Wait(..) | Done
//! ```
//!
//! ### Lifecycle
//! ```text
//!              execute                    pause
//!  Inactive ─────────────► Active ───────────────► Paused
//!     ▲                    │   ▲ ◄─────────────────┘
//!     │   halt / complete  │   │       resume
//!     └────────────────────┘   │
//!                              └── loop: complete/halt(obey_loop) re-executes
//! ```
//!
//! ## Rules
//! - Every lifecycle operation is a silent no-op in the wrong state.
//! - Each run starts from a freshly built task list; nothing carries over.
//! - Tasks run strictly one after another; the first one launches on the tick
//!   after `execute`.
//! - Observers and tasks never get `&mut Director`; they queue commands in a
//!   [`Control`] that the director applies once the current signal or step
//!   has finished.
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                              |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Director**      | Registry, frame driving, lifecycle and batch operations.      | [`Director`], [`InstanceId`], [`Status`]        |
//! | **Tasks**         | Step-wise resumable work and wait instructions.               | [`Task`], [`TaskFn`], [`Step`], [`Wait`]        |
//! | **Utilities**     | Delays, next-tick callbacks, fire-and-forget launches.        | [`Delay`], [`ScaledDelay`], [`NonBlockingLaunch`] |
//! | **Signals**       | Per-instance and global lifecycle observers.                  | [`Event`], [`EventKind`], [`Subscribe`]         |
//! | **Configuration** | Director settings and per-instance flags (serde/JSON).        | [`DirectorConfig`], [`SequenceConfig`]          |
//! | **Errors**        | Typed configuration errors.                                   | [`ConfigError`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use stagehand::{
//!     main_thread, Delay, Director, DirectorConfig, EventKind, SequenceConfig, SequenceFn,
//!     Status, TaskRef,
//! };
//!
//! let mut director = Director::new(DirectorConfig::default()).expect("valid config");
//!
//! let door = director.spawn(
//!     SequenceFn::new("door", || {
//!         vec![
//!             Box::new(Delay::secs(0.25)) as TaskRef,
//!             main_thread(|| println!("door opened")),
//!         ]
//!     }),
//!     SequenceConfig::default(),
//! );
//! director.on(door, EventKind::Completed, |ev, _ctl| println!("{} finished", ev.name));
//!
//! director.execute(door);
//! assert_eq!(director.status(door), Some(Status::Active));
//!
//! for _ in 0..30 {
//!     director.tick(Duration::from_millis(16));
//! }
//! assert_eq!(director.status(door), Some(Status::Inactive));
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Clock, Command, Control, Director, DirectorConfig, InstanceId, SequenceConfig, Status,
};
pub use error::ConfigError;
pub use events::{Event, EventKind, SubscriptionId};
pub use subscribers::{FnSubscriber, Subscribe};
pub use tasks::{
    delay, main_thread, non_blocking, scaled_delay, Delay, MainThreadCallback, NonBlockingLaunch,
    Predicate, ScaledDelay, Sequence, SequenceFn, Step, StepContext, Task, TaskFn, TaskRef, Wait,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
