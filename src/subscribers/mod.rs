//! # Lifecycle subscribers.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling lifecycle signals fired by the [`Director`](crate::Director).
//!
//! ## Architecture
//! ```text
//! Signal flow:
//!   Director ── transition ──► instance ObserverList ──► global ObserverList
//!                                   │                          │
//!                                   ▼                          ▼
//!                        Subscribe::on_event(&Event, &mut Control)
//!                                   │
//!                                   └──► queued commands applied after firing
//! ```
//!
//! ## Subscriber types
//! - **Closures** wrapped in [`FnSubscriber`] (what `Director::on` / `on_any` build)
//! - **Stateful subscribers** implementing [`Subscribe`] directly
//! - [`LogWriter`] (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::{FnSubscriber, Subscribe};
