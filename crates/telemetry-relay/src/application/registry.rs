//! RelayRegistry: the live set of connections eligible to receive broadcasts.
//!
//! The registry is mutated by two kinds of flow:
//!
//! - the acceptor, when a handshake completes (`add`),
//! - each session, when its connection closes or errors (`remove`).
//!
//! Every session's reader concurrently iterates it to broadcast.  Iteration
//! therefore works on a snapshot: the read lock is held only long enough to
//! clone the member handles, and never while a recipient's `send` runs.  A
//! peer closing mid-broadcast cannot crash the broadcast, and a peer added
//! after the snapshot simply does not receive that frame.
//!
//! # HashMap choice
//!
//! A `HashMap<ConnectionId, _>` gives O(1) add/remove.  Iteration order is
//! unspecified and nothing in the relay depends on it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::connection::{ConnectionId, Recipient};

/// Shared handle to a registered recipient.
pub type SharedRecipient = Arc<dyn Recipient>;

/// In-memory registry of open connections.
///
/// Built by the composition root (`RelayServer`) and shared via `Arc`.
#[derive(Default)]
pub struct RelayRegistry {
    members: RwLock<HashMap<ConnectionId, SharedRecipient>>,
}

impl RelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recipient.  Returns `false` if the id was already present
    /// (the existing entry is kept).
    pub fn add(&self, recipient: SharedRecipient) -> bool {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let id = recipient.id();
        if members.contains_key(&id) {
            return false;
        }
        members.insert(id, recipient);
        true
    }

    /// Removes a recipient.  Removing an absent id is a no-op that returns
    /// `false`.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// True if `id` is currently registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Number of registered recipients.
    pub fn len(&self) -> usize {
        self.members.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every member except `excluded`, taken under one read lock.
    pub fn snapshot_except(&self, excluded: ConnectionId) -> Vec<SharedRecipient> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, _)| **id != excluded)
            .map(|(_, recipient)| Arc::clone(recipient))
            .collect()
    }

    /// Calls `f` for every member except `excluded`.
    ///
    /// `f` runs on a snapshot with no lock held, so it may freely call back
    /// into the registry.
    pub fn for_each_except<F>(&self, excluded: ConnectionId, mut f: F)
    where
        F: FnMut(&dyn Recipient),
    {
        for recipient in self.snapshot_except(excluded) {
            f(recipient.as_ref());
        }
    }
}
