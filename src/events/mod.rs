//! Lifecycle events: types and observer lists.
//!
//! This module groups the event **data model** and the **observer lists**
//! used to deliver lifecycle signals emitted by the director.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] signal classification and payload metadata
//! - [`ObserverList`] ordered, subscription-id keyed fan-out
//!
//! ## Quick reference
//! - **Publisher**: `Director` (on every lifecycle transition).
//! - **Consumers**: per-instance observer lists, then the director's global list.

mod event;
mod observers;

pub use event::{Event, EventKind};
pub(crate) use observers::ObserverList;
pub use observers::SubscriptionId;
