//! # Deferred lifecycle commands.
//!
//! Observers and task steps run while the director is in the middle of a
//! transition or a tick, so they never get mutable access to it. Instead they
//! receive a [`Control`] buffer and queue [`Command`]s on it. The director
//! applies the queue, in order, once the current firing or step returns; every
//! command goes through the same state guards as a direct call.
//!
//! This is also the re-entrancy rule: a `halt` queued from a `Halted`
//! handler is applied after the first halt finished and is therefore a no-op.

use crate::core::InstanceId;

/// A lifecycle operation queued for later application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `Director::execute`.
    Execute,
    /// `Director::pause`.
    Pause,
    /// `Director::resume`.
    Resume,
    /// `Director::halt`.
    Halt {
        /// Re-execute afterwards if the instance loops.
        obey_loop: bool,
    },
    /// Request destruction of the owning object.
    Destroy,
}

/// Command buffer handed to observers and task steps.
#[derive(Debug)]
pub struct Control {
    origin: InstanceId,
    pending: Vec<(InstanceId, Command)>,
}

impl Control {
    pub(crate) fn new(origin: InstanceId) -> Self {
        Self {
            origin,
            pending: Vec::new(),
        }
    }

    /// Instance the current signal or step belongs to.
    #[inline]
    pub fn instance(&self) -> InstanceId {
        self.origin
    }

    /// Queues `Execute` on the current instance.
    pub fn execute(&mut self) {
        self.send(self.origin, Command::Execute);
    }

    /// Queues `Pause` on the current instance.
    pub fn pause(&mut self) {
        self.send(self.origin, Command::Pause);
    }

    /// Queues `Resume` on the current instance.
    pub fn resume(&mut self) {
        self.send(self.origin, Command::Resume);
    }

    /// Queues `Halt` on the current instance.
    pub fn halt(&mut self, obey_loop: bool) {
        self.send(self.origin, Command::Halt { obey_loop });
    }

    /// Queues a destruction request for the current instance.
    pub fn destroy(&mut self) {
        self.send(self.origin, Command::Destroy);
    }

    /// Queues a command for any instance.
    pub fn send(&mut self, target: InstanceId, command: Command) {
        self.pending.push((target, command));
    }

    /// True when nothing has been queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of queued commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn into_commands(self) -> Vec<(InstanceId, Command)> {
        self.pending
    }
}
