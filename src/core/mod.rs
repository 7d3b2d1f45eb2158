//! Runtime core: registry, lifecycle state machine and frame driving.
//!
//! The only entry point the host needs is [`Director`]; the rest of the
//! public surface here is the vocabulary it speaks ([`InstanceId`],
//! [`Status`], [`Clock`], [`Control`] and the two configuration structs).
//!
//! Internal modules:
//! - [`director`]: host-facing control surface, signal dispatch, batch operations;
//! - [`instance`]: per-instance state machine and queue driver;
//! - [`runner`]: steps one scheduled unit (queue runner or detached unit);
//! - [`registry`]: registration-ordered set of live instances;
//! - [`control`]: deferred command buffer handed to observers and tasks;
//! - [`clock`]: frame counter and scaled/unscaled time;
//! - [`config`]: director and per-instance configuration.

mod clock;
mod config;
mod control;
mod director;
mod instance;
mod registry;
mod runner;

pub use clock::Clock;
pub use config::{DirectorConfig, SequenceConfig};
pub use control::{Command, Control};
pub use director::Director;
pub use instance::Status;
pub use registry::InstanceId;
