//! # Observer lists for lifecycle signals.
//!
//! [`ObserverList`] is an ordered map from [`SubscriptionId`] to subscriber.
//! Every instance owns one list, and the director owns one more for global
//! observers.
//!
//! ## Rules
//! - **Firing order**: subscription order (insertion order of the map).
//! - **Removal** keeps the relative order of the remaining observers.
//! - **Filters**: an entry may be bound to one [`EventKind`] or to all of them.
//! - **No re-entrancy**: observers receive a [`Control`] buffer instead of the
//!   director, so the list is never mutated while it is being fired.

use std::fmt;

use indexmap::IndexMap;

use crate::core::Control;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Handle returned by every subscription call; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Entry {
    filter: Option<EventKind>,
    subscriber: Box<dyn Subscribe>,
}

/// Ordered observer list.
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: IndexMap<SubscriptionId, Entry>,
}

impl ObserverList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber; `filter = None` receives every kind.
    pub(crate) fn insert(
        &mut self,
        id: SubscriptionId,
        filter: Option<EventKind>,
        subscriber: Box<dyn Subscribe>,
    ) {
        self.entries.insert(id, Entry { filter, subscriber });
    }

    /// Removes a subscriber. Returns `false` if the id is not in this list.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    /// Delivers `event` to every matching subscriber, in subscription order.
    pub(crate) fn emit(&mut self, event: &Event, control: &mut Control) {
        for entry in self.entries.values_mut() {
            if entry.filter.map_or(true, |kind| kind == event.kind) {
                entry.subscriber.on_event(event, control);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(id, e)| (id, (e.filter, e.subscriber.name()))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::InstanceId;
    use crate::subscribers::FnSubscriber;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Box<dyn Subscribe> {
        let log = Arc::clone(log);
        Box::new(FnSubscriber::new(move |_ev: &Event, _ctl: &mut Control| {
            log.lock().unwrap().push(tag);
        }))
    }

    fn event(kind: EventKind) -> Event {
        Event::new(0, kind, InstanceId::from_raw(1))
    }

    #[test]
    fn test_fires_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.insert(SubscriptionId(2), None, recorder(&log, "b"));
        list.insert(SubscriptionId(1), None, recorder(&log, "a"));

        let mut ctl = Control::new(InstanceId::from_raw(1));
        list.emit(&event(EventKind::Started), &mut ctl);

        assert_eq!(*log.lock().unwrap(), ["b", "a"]);
    }

    #[test]
    fn test_filter_skips_other_kinds() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.insert(SubscriptionId(1), Some(EventKind::Paused), recorder(&log, "paused"));
        list.insert(SubscriptionId(2), None, recorder(&log, "any"));

        let mut ctl = Control::new(InstanceId::from_raw(1));
        list.emit(&event(EventKind::Resumed), &mut ctl);
        list.emit(&event(EventKind::Paused), &mut ctl);

        assert_eq!(*log.lock().unwrap(), ["any", "paused", "any"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.insert(SubscriptionId(1), None, recorder(&log, "a"));
        list.insert(SubscriptionId(2), None, recorder(&log, "b"));
        list.insert(SubscriptionId(3), None, recorder(&log, "c"));

        assert!(list.remove(SubscriptionId(2)));
        assert!(!list.remove(SubscriptionId(2)));
        assert_eq!(list.len(), 2);

        let mut ctl = Control::new(InstanceId::from_raw(1));
        list.emit(&event(EventKind::Completed), &mut ctl);
        assert_eq!(*log.lock().unwrap(), ["a", "c"]);
    }

    #[test]
    fn test_empty_list_is_a_no_op() {
        let mut list = ObserverList::new();
        let mut ctl = Control::new(InstanceId::from_raw(1));
        list.emit(&event(EventKind::Halted), &mut ctl);
        assert!(list.is_empty());
        assert!(ctl.is_empty());
    }
}
