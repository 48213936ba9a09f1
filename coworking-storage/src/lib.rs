//! Coworking Storage - Storage Trait, Mock Implementation and Cache Layer
//!
//! Defines the persistence contract the booking services rely on, an
//! in-memory implementation with call counters for tests, and the LFU
//! cache-aside layer placed in front of it.

pub mod cache;

pub use cache::{CacheStats, CacheableEntity, LfuCache, ReadThroughCache, StorageFetcher};

use coworking_core::{
    Coworking, CoworkingId, CoworkingResult, DateRange, EntityIdType, EntityType, Reservation,
    ReservationId, StorageError, User, UserId, Workspace, WorkspaceId,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for coworking entities.
///
/// `*_save` is an upsert returning the stored copy. `*_delete` fails with
/// `NotFound` when the id is unknown. Overlap queries use inclusive
/// semantics: a stored `[s, e]` matches `[start, end]` iff
/// `s <= end && e >= start`.
pub trait StorageTrait: Send + Sync {
    // === Coworking Operations ===

    /// Get a coworking by ID.
    fn coworking_get(&self, id: CoworkingId) -> CoworkingResult<Option<Coworking>>;

    /// Insert or replace a coworking.
    fn coworking_save(&self, c: &Coworking) -> CoworkingResult<Coworking>;

    /// Delete a coworking.
    fn coworking_delete(&self, id: CoworkingId) -> CoworkingResult<()>;

    /// Check whether a coworking exists.
    fn coworking_exists(&self, id: CoworkingId) -> CoworkingResult<bool>;

    /// List all coworkings.
    fn coworking_list(&self) -> CoworkingResult<Vec<Coworking>>;

    /// Check whether any coworking uses `name`.
    fn coworking_exists_by_name(&self, name: &str) -> CoworkingResult<bool>;

    /// Check whether any coworking uses `address`.
    fn coworking_exists_by_address(&self, address: &str) -> CoworkingResult<bool>;

    // === Workspace Operations ===

    /// Get a workspace by ID.
    fn workspace_get(&self, id: WorkspaceId) -> CoworkingResult<Option<Workspace>>;

    /// Insert or replace a workspace.
    fn workspace_save(&self, w: &Workspace) -> CoworkingResult<Workspace>;

    /// Delete a workspace.
    fn workspace_delete(&self, id: WorkspaceId) -> CoworkingResult<()>;

    /// Check whether a workspace exists.
    fn workspace_exists(&self, id: WorkspaceId) -> CoworkingResult<bool>;

    /// List all workspaces.
    fn workspace_list(&self) -> CoworkingResult<Vec<Workspace>>;

    /// List the workspaces of one coworking.
    fn workspace_list_by_coworking(
        &self,
        coworking_id: CoworkingId,
    ) -> CoworkingResult<Vec<Workspace>>;

    /// Check whether `name` is taken inside a coworking.
    fn workspace_exists_by_name_in_coworking(
        &self,
        coworking_id: CoworkingId,
        name: &str,
    ) -> CoworkingResult<bool>;

    // === User Operations ===

    /// Get a user by ID.
    fn user_get(&self, id: UserId) -> CoworkingResult<Option<User>>;

    /// Insert or replace a user.
    fn user_save(&self, u: &User) -> CoworkingResult<User>;

    /// Delete a user.
    fn user_delete(&self, id: UserId) -> CoworkingResult<()>;

    /// Check whether a user exists.
    fn user_exists(&self, id: UserId) -> CoworkingResult<bool>;

    /// List all users.
    fn user_list(&self) -> CoworkingResult<Vec<User>>;

    /// Check whether any user has `email`.
    fn user_exists_by_email(&self, email: &str) -> CoworkingResult<bool>;

    /// Get a user by email.
    fn user_get_by_email(&self, email: &str) -> CoworkingResult<Option<User>>;

    // === Reservation Operations ===

    /// Get a reservation by ID.
    fn reservation_get(&self, id: ReservationId) -> CoworkingResult<Option<Reservation>>;

    /// Insert or replace a reservation.
    fn reservation_save(&self, r: &Reservation) -> CoworkingResult<Reservation>;

    /// Delete a reservation.
    fn reservation_delete(&self, id: ReservationId) -> CoworkingResult<()>;

    /// Check whether a reservation exists.
    fn reservation_exists(&self, id: ReservationId) -> CoworkingResult<bool>;

    /// List all reservations.
    fn reservation_list(&self) -> CoworkingResult<Vec<Reservation>>;

    /// List the reservations held by a user.
    fn reservation_list_by_user(&self, user_id: UserId) -> CoworkingResult<Vec<Reservation>>;

    /// List the reservations on a workspace.
    fn reservation_list_by_workspace(
        &self,
        workspace_id: WorkspaceId,
    ) -> CoworkingResult<Vec<Reservation>>;

    /// Reservations on `workspace_id` overlapping `range`.
    fn reservation_find_overlapping(
        &self,
        workspace_id: WorkspaceId,
        range: &DateRange,
    ) -> CoworkingResult<Vec<Reservation>>;

    /// Reservations on any workspace of `coworking_id` overlapping `range`.
    fn reservation_find_by_period_in_coworking(
        &self,
        coworking_id: CoworkingId,
        range: &DateRange,
    ) -> CoworkingResult<Vec<Reservation>>;
}

// ============================================================================
// CACHE FETCHERS
// ============================================================================

impl<S: StorageTrait + ?Sized> StorageFetcher<Coworking> for S {
    fn fetch(&self, id: CoworkingId) -> CoworkingResult<Option<Coworking>> {
        self.coworking_get(id)
    }
}

impl<S: StorageTrait + ?Sized> StorageFetcher<Workspace> for S {
    fn fetch(&self, id: WorkspaceId) -> CoworkingResult<Option<Workspace>> {
        self.workspace_get(id)
    }
}

impl<S: StorageTrait + ?Sized> StorageFetcher<User> for S {
    fn fetch(&self, id: UserId) -> CoworkingResult<Option<User>> {
        self.user_get(id)
    }
}

impl<S: StorageTrait + ?Sized> StorageFetcher<Reservation> for S {
    fn fetch(&self, id: ReservationId) -> CoworkingResult<Option<Reservation>> {
        self.reservation_get(id)
    }
}

// ============================================================================
// MOCK STORAGE
// ============================================================================

/// Snapshot of the calls made against one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Lookups by id.
    pub gets: u64,
    /// Inserts and replacements.
    pub saves: u64,
    /// Deletes.
    pub deletes: u64,
    /// Existence checks, listings and overlap queries.
    pub queries: u64,
}

#[derive(Debug, Default)]
struct CallCounters {
    gets: AtomicU64,
    saves: AtomicU64,
    deletes: AtomicU64,
    queries: AtomicU64,
}

impl CallCounters {
    fn snapshot(&self) -> CallCounts {
        CallCounts {
            gets: self.gets.load(Ordering::SeqCst),
            saves: self.saves.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
            queries: self.queries.load(Ordering::SeqCst),
        }
    }

    fn reset(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.saves.store(0, Ordering::SeqCst);
        self.deletes.store(0, Ordering::SeqCst);
        self.queries.store(0, Ordering::SeqCst);
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::SeqCst);
}

fn read<T>(lock: &RwLock<T>) -> CoworkingResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StorageError::LockPoisoned.into())
}

fn write<T>(lock: &RwLock<T>) -> CoworkingResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StorageError::LockPoisoned.into())
}

fn sorted<K: Ord + Copy + Hash, V: Clone>(
    map: &HashMap<K, V>,
    keep: impl Fn(&V) -> bool,
) -> Vec<V> {
    let mut ids: Vec<K> = map
        .iter()
        .filter(|(_, v)| keep(v))
        .map(|(k, _)| *k)
        .collect();
    ids.sort();
    ids.iter().filter_map(|id| map.get(id).cloned()).collect()
}

/// In-memory mock storage for testing.
///
/// Counts every call per entity kind so tests can assert that cached reads
/// never reach the store, and can be switched to fail every call with
/// [`StorageError::Unavailable`].
#[derive(Debug, Default)]
pub struct MockStorage {
    coworkings: Arc<RwLock<HashMap<CoworkingId, Coworking>>>,
    workspaces: Arc<RwLock<HashMap<WorkspaceId, Workspace>>>,
    users: Arc<RwLock<HashMap<UserId, User>>>,
    reservations: Arc<RwLock<HashMap<ReservationId, Reservation>>>,
    coworking_calls: CallCounters,
    workspace_calls: CallCounters,
    user_calls: CallCounters,
    reservation_calls: CallCounters,
    unavailable: AtomicBool,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> CoworkingResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "mock storage switched off".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn counters(&self, entity_type: EntityType) -> &CallCounters {
        match entity_type {
            EntityType::Coworking => &self.coworking_calls,
            EntityType::Workspace => &self.workspace_calls,
            EntityType::User => &self.user_calls,
            EntityType::Reservation => &self.reservation_calls,
        }
    }

    /// Calls made so far against one entity kind.
    pub fn calls(&self, entity_type: EntityType) -> CallCounts {
        self.counters(entity_type).snapshot()
    }

    /// Zero all call counters.
    pub fn reset_calls(&self) {
        for entity_type in [
            EntityType::Coworking,
            EntityType::Workspace,
            EntityType::User,
            EntityType::Reservation,
        ] {
            self.counters(entity_type).reset();
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) -> CoworkingResult<()> {
        write(&self.coworkings)?.clear();
        write(&self.workspaces)?.clear();
        write(&self.users)?.clear();
        write(&self.reservations)?.clear();
        Ok(())
    }

    /// Get count of stored coworkings.
    pub fn coworking_count(&self) -> CoworkingResult<usize> {
        Ok(read(&self.coworkings)?.len())
    }

    /// Get count of stored workspaces.
    pub fn workspace_count(&self) -> CoworkingResult<usize> {
        Ok(read(&self.workspaces)?.len())
    }

    /// Get count of stored users.
    pub fn user_count(&self) -> CoworkingResult<usize> {
        Ok(read(&self.users)?.len())
    }

    /// Get count of stored reservations.
    pub fn reservation_count(&self) -> CoworkingResult<usize> {
        Ok(read(&self.reservations)?.len())
    }

    fn get_in<K: Eq + Hash, V: Clone>(
        &self,
        entity_type: EntityType,
        map: &RwLock<HashMap<K, V>>,
        id: &K,
    ) -> CoworkingResult<Option<V>> {
        bump(&self.counters(entity_type).gets);
        self.ensure_available()?;
        Ok(read(map)?.get(id).cloned())
    }

    fn save_in<K: Eq + Hash, V: Clone>(
        &self,
        entity_type: EntityType,
        map: &RwLock<HashMap<K, V>>,
        id: K,
        value: &V,
    ) -> CoworkingResult<V> {
        bump(&self.counters(entity_type).saves);
        self.ensure_available()?;
        write(map)?.insert(id, value.clone());
        Ok(value.clone())
    }

    fn delete_in<K: EntityIdType, V>(
        &self,
        entity_type: EntityType,
        map: &RwLock<HashMap<K, V>>,
        id: K,
    ) -> CoworkingResult<()> {
        bump(&self.counters(entity_type).deletes);
        self.ensure_available()?;
        match write(map)?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound {
                entity_type,
                id: id.as_uuid(),
            }
            .into()),
        }
    }

    fn query_in<K: Ord + Copy + Hash, V: Clone>(
        &self,
        entity_type: EntityType,
        map: &RwLock<HashMap<K, V>>,
        keep: impl Fn(&V) -> bool,
    ) -> CoworkingResult<Vec<V>> {
        bump(&self.counters(entity_type).queries);
        self.ensure_available()?;
        Ok(sorted(&*read(map)?, keep))
    }

    fn any_in<K, V>(
        &self,
        entity_type: EntityType,
        map: &RwLock<HashMap<K, V>>,
        pred: impl Fn(&V) -> bool,
    ) -> CoworkingResult<bool> {
        bump(&self.counters(entity_type).queries);
        self.ensure_available()?;
        Ok(read(map)?.values().any(pred))
    }
}

impl StorageTrait for MockStorage {
    // === Coworking Operations ===

    fn coworking_get(&self, id: CoworkingId) -> CoworkingResult<Option<Coworking>> {
        self.get_in(EntityType::Coworking, &self.coworkings, &id)
    }

    fn coworking_save(&self, c: &Coworking) -> CoworkingResult<Coworking> {
        self.save_in(EntityType::Coworking, &self.coworkings, c.coworking_id, c)
    }

    fn coworking_delete(&self, id: CoworkingId) -> CoworkingResult<()> {
        self.delete_in(EntityType::Coworking, &self.coworkings, id)
    }

    fn coworking_exists(&self, id: CoworkingId) -> CoworkingResult<bool> {
        self.any_in(EntityType::Coworking, &self.coworkings, |c| {
            c.coworking_id == id
        })
    }

    fn coworking_list(&self) -> CoworkingResult<Vec<Coworking>> {
        self.query_in(EntityType::Coworking, &self.coworkings, |_| true)
    }

    fn coworking_exists_by_name(&self, name: &str) -> CoworkingResult<bool> {
        self.any_in(EntityType::Coworking, &self.coworkings, |c| c.name == name)
    }

    fn coworking_exists_by_address(&self, address: &str) -> CoworkingResult<bool> {
        self.any_in(EntityType::Coworking, &self.coworkings, |c| {
            c.address == address
        })
    }

    // === Workspace Operations ===

    fn workspace_get(&self, id: WorkspaceId) -> CoworkingResult<Option<Workspace>> {
        self.get_in(EntityType::Workspace, &self.workspaces, &id)
    }

    fn workspace_save(&self, w: &Workspace) -> CoworkingResult<Workspace> {
        self.save_in(EntityType::Workspace, &self.workspaces, w.workspace_id, w)
    }

    fn workspace_delete(&self, id: WorkspaceId) -> CoworkingResult<()> {
        self.delete_in(EntityType::Workspace, &self.workspaces, id)
    }

    fn workspace_exists(&self, id: WorkspaceId) -> CoworkingResult<bool> {
        self.any_in(EntityType::Workspace, &self.workspaces, |w| {
            w.workspace_id == id
        })
    }

    fn workspace_list(&self) -> CoworkingResult<Vec<Workspace>> {
        self.query_in(EntityType::Workspace, &self.workspaces, |_| true)
    }

    fn workspace_list_by_coworking(
        &self,
        coworking_id: CoworkingId,
    ) -> CoworkingResult<Vec<Workspace>> {
        self.query_in(EntityType::Workspace, &self.workspaces, |w| {
            w.coworking_id == coworking_id
        })
    }

    fn workspace_exists_by_name_in_coworking(
        &self,
        coworking_id: CoworkingId,
        name: &str,
    ) -> CoworkingResult<bool> {
        self.any_in(EntityType::Workspace, &self.workspaces, |w| {
            w.coworking_id == coworking_id && w.name == name
        })
    }

    // === User Operations ===

    fn user_get(&self, id: UserId) -> CoworkingResult<Option<User>> {
        self.get_in(EntityType::User, &self.users, &id)
    }

    fn user_save(&self, u: &User) -> CoworkingResult<User> {
        self.save_in(EntityType::User, &self.users, u.user_id, u)
    }

    fn user_delete(&self, id: UserId) -> CoworkingResult<()> {
        self.delete_in(EntityType::User, &self.users, id)
    }

    fn user_exists(&self, id: UserId) -> CoworkingResult<bool> {
        self.any_in(EntityType::User, &self.users, |u| u.user_id == id)
    }

    fn user_list(&self) -> CoworkingResult<Vec<User>> {
        self.query_in(EntityType::User, &self.users, |_| true)
    }

    fn user_exists_by_email(&self, email: &str) -> CoworkingResult<bool> {
        self.any_in(EntityType::User, &self.users, |u| u.email == email)
    }

    fn user_get_by_email(&self, email: &str) -> CoworkingResult<Option<User>> {
        Ok(self
            .query_in(EntityType::User, &self.users, |u| u.email == email)?
            .into_iter()
            .next())
    }

    // === Reservation Operations ===

    fn reservation_get(&self, id: ReservationId) -> CoworkingResult<Option<Reservation>> {
        self.get_in(EntityType::Reservation, &self.reservations, &id)
    }

    fn reservation_save(&self, r: &Reservation) -> CoworkingResult<Reservation> {
        self.save_in(EntityType::Reservation, &self.reservations, r.reservation_id, r)
    }

    fn reservation_delete(&self, id: ReservationId) -> CoworkingResult<()> {
        self.delete_in(EntityType::Reservation, &self.reservations, id)
    }

    fn reservation_exists(&self, id: ReservationId) -> CoworkingResult<bool> {
        self.any_in(EntityType::Reservation, &self.reservations, |r| {
            r.reservation_id == id
        })
    }

    fn reservation_list(&self) -> CoworkingResult<Vec<Reservation>> {
        self.query_in(EntityType::Reservation, &self.reservations, |_| true)
    }

    fn reservation_list_by_user(&self, user_id: UserId) -> CoworkingResult<Vec<Reservation>> {
        self.query_in(EntityType::Reservation, &self.reservations, |r| {
            r.user_id == user_id
        })
    }

    fn reservation_list_by_workspace(
        &self,
        workspace_id: WorkspaceId,
    ) -> CoworkingResult<Vec<Reservation>> {
        self.query_in(EntityType::Reservation, &self.reservations, |r| {
            r.workspace_id == workspace_id
        })
    }

    fn reservation_find_overlapping(
        &self,
        workspace_id: WorkspaceId,
        range: &DateRange,
    ) -> CoworkingResult<Vec<Reservation>> {
        self.query_in(EntityType::Reservation, &self.reservations, |r| {
            r.workspace_id == workspace_id && r.period.overlaps(range)
        })
    }

    fn reservation_find_by_period_in_coworking(
        &self,
        coworking_id: CoworkingId,
        range: &DateRange,
    ) -> CoworkingResult<Vec<Reservation>> {
        let workspace_ids: Vec<WorkspaceId> = read(&self.workspaces)?
            .values()
            .filter(|w| w.coworking_id == coworking_id)
            .map(|w| w.workspace_id)
            .collect();
        self.query_in(EntityType::Reservation, &self.reservations, |r| {
            workspace_ids.contains(&r.workspace_id) && r.period.overlaps(range)
        })
    }
}
