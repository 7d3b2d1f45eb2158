//! # Instance registry.
//!
//! The registry is the set of live instances, kept in **registration order**
//! so batch operations and ticks visit instances deterministically.
//!
//! ## Rules
//! - An instance is registered when it is spawned and deregistered exactly
//!   once, when the host finalizes it.
//! - Removal preserves the relative order of the remaining instances.
//! - Ids are never reused within one registry.
//! - The registry stores instance state only; the host object an instance
//!   belongs to lives (and dies) on the host side.

use std::fmt;

use indexmap::IndexMap;

use crate::core::instance::Instance;

/// Opaque handle of a registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Builds an id from its raw value (useful in tests and host-side maps).
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registration-ordered map of live instances.
#[derive(Default)]
pub(crate) struct Registry {
    instances: IndexMap<InstanceId, Instance>,
    last_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id.
    pub(crate) fn next_id(&mut self) -> InstanceId {
        self.last_id += 1;
        InstanceId(self.last_id)
    }

    /// Adds an instance at the end of the registration order.
    pub(crate) fn register(&mut self, instance: Instance) {
        self.instances.insert(instance.id(), instance);
    }

    /// Removes an instance. Returns `None` if it was never registered or already removed.
    pub(crate) fn deregister(&mut self, id: InstanceId) -> Option<Instance> {
        self.instances.shift_remove(&id)
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    /// Snapshot of the ids in registration order.
    pub(crate) fn ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SequenceConfig;
    use crate::tasks::SequenceFn;

    fn instance(reg: &mut Registry, name: &'static str) -> InstanceId {
        let id = reg.next_id();
        reg.register(Instance::new(
            id,
            name.into(),
            Box::new(SequenceFn::new(name, Vec::new)),
            SequenceConfig::default(),
        ));
        id
    }

    #[test]
    fn test_registration_order_survives_removal() {
        let mut reg = Registry::new();
        let a = instance(&mut reg, "a");
        let b = instance(&mut reg, "b");
        let c = instance(&mut reg, "c");

        assert_eq!(reg.ids(), vec![a, b, c]);
        assert!(reg.deregister(b).is_some());
        assert_eq!(reg.ids(), vec![a, c]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_deregister_is_exactly_once() {
        let mut reg = Registry::new();
        let a = instance(&mut reg, "a");

        assert!(reg.deregister(a).is_some());
        assert!(reg.deregister(a).is_none());
        assert!(reg.get(a).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut reg = Registry::new();
        let a = instance(&mut reg, "a");
        reg.deregister(a);
        let b = instance(&mut reg, "b");

        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(b.to_string(), format!("#{}", b.as_raw()));
    }
}
