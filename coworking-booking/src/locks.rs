//! Per-entity exclusion locks.
//!
//! Every check-then-write sequence runs under a lock keyed by the entity it
//! depends on: availability checks and reservation writes by workspace,
//! dependent checks and deletes by coworking or user, unique-value checks
//! and saves by entity kind. Different keys never block each other.
//!
//! Locks are always taken in this order, never the reverse:
//! coworking, workspace, user, unique values.
//!
//! Registry entries exist only while a lock is held or awaited, so ids that
//! never resolve to an entity leave nothing behind.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use coworking_core::{CoworkingId, EntityType, UserId, WorkspaceId};
use dashmap::DashMap;

type Registry<K> = DashMap<K, Arc<Mutex<()>>>;

/// One mutex per key, created on first use and dropped after last use.
pub struct KeyedLocks<K: Eq + Hash> {
    locks: Registry<K>,
}

/// Drops the registry entry once no other caller holds a handle to it.
struct Prune<'a, K: Eq + Hash> {
    locks: &'a Registry<K>,
    key: K,
}

impl<K: Eq + Hash> Drop for Prune<'_, K> {
    fn drop(&mut self) {
        // Handles are cloned under the shard lock, so the count cannot grow
        // while `remove_if` inspects it.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    fn handle(&self, key: &K) -> Arc<Mutex<()>> {
        // Shard guard drops here; never held while waiting on the mutex.
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// The mutex guards no data, so a poisoned guard is recovered.
    pub fn with_lock<T>(&self, key: K, f: impl FnOnce() -> T) -> T {
        // Declared first so it runs after the guard and the handle are
        // released, including on unwind.
        let prune = Prune {
            locks: &self.locks,
            key,
        };
        let handle = self.handle(&prune.key);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> fmt::Debug for KeyedLocks<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLocks")
            .field("held", &self.locks.len())
            .finish()
    }
}

/// Lock registries shared by all entity services.
#[derive(Debug, Default)]
pub struct EntityLocks {
    coworkings: KeyedLocks<CoworkingId>,
    workspaces: KeyedLocks<WorkspaceId>,
    users: KeyedLocks<UserId>,
    unique_values: KeyedLocks<EntityType>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes workspace creation and coworking deletion.
    pub fn with_coworking<T>(&self, id: CoworkingId, f: impl FnOnce() -> T) -> T {
        self.coworkings.with_lock(id, f)
    }

    /// Serializes availability decisions with the writes that follow them.
    pub fn with_workspace<T>(&self, id: WorkspaceId, f: impl FnOnce() -> T) -> T {
        self.workspaces.with_lock(id, f)
    }

    /// Serializes reservation creation and user deletion.
    pub fn with_user<T>(&self, id: UserId, f: impl FnOnce() -> T) -> T {
        self.users.with_lock(id, f)
    }

    /// Serializes uniqueness checks with the save that follows them.
    pub fn with_unique_values<T>(&self, entity_type: EntityType, f: impl FnOnce() -> T) -> T {
        self.unique_values.with_lock(entity_type, f)
    }

    /// Whether no lock of any kind is held or awaited.
    pub fn is_empty(&self) -> bool {
        self.coworkings.is_empty()
            && self.workspaces.is_empty()
            && self.users.is_empty()
            && self.unique_values.is_empty()
    }
}
