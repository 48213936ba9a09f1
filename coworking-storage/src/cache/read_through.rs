//! Cache-aside reads over an [`LfuCache`].
//!
//! Reads check the cache first and fall back to storage on miss, populating
//! the cache with what storage returned. Writers keep the cache current by
//! calling [`ReadThroughCache::put`] after a successful save and
//! [`ReadThroughCache::invalidate`] after a delete.

use coworking_core::{CoworkingError, CoworkingResult, EntityIdType};

use super::lfu::LfuCache;
use super::traits::{CacheStats, CacheableEntity};

/// Storage fetcher trait for retrieving entities from the underlying storage.
///
/// Implemented for every [`crate::StorageTrait`] so the cache works with any
/// storage backend.
pub trait StorageFetcher<T: CacheableEntity> {
    /// Fetch an entity from storage by ID.
    fn fetch(&self, id: T::Id) -> CoworkingResult<Option<T>>;
}

/// Cache-aside wrapper owning one LFU cache for a single entity kind.
///
/// Each service constructs its own instance; nothing is shared between
/// entity kinds.
pub struct ReadThroughCache<T: CacheableEntity> {
    cache: LfuCache<T::Id, T>,
}

impl<T: CacheableEntity> ReadThroughCache<T> {
    /// Create a cache holding at most `capacity` entities.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LfuCache::new(capacity),
        }
    }

    /// Get an entity from the cache, falling back to storage on miss.
    ///
    /// Returns `Ok(None)` when storage has no such entity; nothing is cached
    /// in that case.
    pub fn get<S>(&self, id: T::Id, storage: &S) -> CoworkingResult<Option<T>>
    where
        S: StorageFetcher<T> + ?Sized,
    {
        if let Some(entity) = self.cache.get(&id) {
            tracing::debug!(entity_type = %T::entity_type(), %id, "cache hit");
            return Ok(Some(entity));
        }

        tracing::debug!(entity_type = %T::entity_type(), %id, "cache miss");
        match storage.fetch(id)? {
            Some(entity) => {
                self.cache.put(id, entity.clone());
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Like [`Self::get`], but a missing entity is a `NotFound` error.
    pub fn get_required<S>(&self, id: T::Id, storage: &S) -> CoworkingResult<T>
    where
        S: StorageFetcher<T> + ?Sized,
    {
        self.get(id, storage)?
            .ok_or_else(|| CoworkingError::not_found(T::entity_type(), id.as_uuid()))
    }

    /// Put an entity into the cache.
    ///
    /// Called after a write so the next read is served from memory.
    pub fn put(&self, entity: &T) {
        self.cache.put(entity.entity_id(), entity.clone());
    }

    /// Invalidate a single entity.
    pub fn invalidate(&self, id: T::Id) {
        self.cache.remove(&id);
    }

    /// Probe the cache only, counting a use on hit. Never touches storage.
    pub fn peek(&self, id: T::Id) -> Option<T> {
        self.cache.get(&id)
    }

    /// Get a reference to the underlying LFU cache.
    pub fn backend(&self) -> &LfuCache<T::Id, T> {
        &self.cache
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
