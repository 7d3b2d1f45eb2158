//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom lifecycle
//! handlers into the director, and [`FnSubscriber`] which adapts a closure.
//!
//! ## Rules
//! - Subscribers run synchronously on the thread that drives the director.
//! - A subscriber never receives the director itself; it gets a [`Control`]
//!   buffer and may queue lifecycle commands there. Commands are applied
//!   after every observer of the current signal has run.
//! - Handlers should be cheap; they run inside `tick` and the control calls.
//!
//! ## Example
//! ```rust
//! use stagehand::{Control, Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct Counter {
//!     completed: usize,
//! }
//!
//! impl Subscribe for Counter {
//!     fn on_event(&mut self, ev: &Event, _control: &mut Control) {
//!         if ev.kind == EventKind::Completed {
//!             self.completed += 1;
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "counter" }
//! }
//! ```

use crate::core::Control;
use crate::events::Event;

/// Lifecycle signal subscriber.
pub trait Subscribe: Send + 'static {
    /// Processes a single event.
    ///
    /// Called synchronously in the publisher context. Use `control` to
    /// request lifecycle changes; they are applied once all observers of
    /// this event have returned.
    fn on_event(&mut self, event: &Event, control: &mut Control);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed subscriber.
pub struct FnSubscriber<F> {
    f: F,
}

impl<F> FnSubscriber<F>
where
    F: FnMut(&Event, &mut Control) + Send + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Subscribe for FnSubscriber<F>
where
    F: FnMut(&Event, &mut Control) + Send + 'static,
{
    fn on_event(&mut self, event: &Event, control: &mut Control) {
        (self.f)(event, control)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
