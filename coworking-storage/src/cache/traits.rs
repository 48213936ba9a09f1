//! Cacheable entity marker and cache statistics.

use coworking_core::{
    Coworking, EntityIdType, EntityType, Reservation, ReservationId, User, UserId, Workspace,
    WorkspaceId, CoworkingId,
};

/// Marker trait for types that can be cached.
///
/// Types implementing this trait expose the typed id used as their cache
/// key, and through it the entity type used in errors and logs.
pub trait CacheableEntity: Clone + Send + Sync + 'static {
    /// Typed identifier keying this entity.
    type Id: EntityIdType;

    /// Get the entity type for this cacheable.
    fn entity_type() -> EntityType {
        <Self::Id as EntityIdType>::ENTITY_TYPE
    }

    /// Get the unique identifier for this entity.
    fn entity_id(&self) -> Self::Id;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// IMPLEMENTATIONS FOR COWORKING ENTITIES
// ============================================================================

impl CacheableEntity for Coworking {
    type Id = CoworkingId;

    fn entity_id(&self) -> CoworkingId {
        self.coworking_id
    }
}

impl CacheableEntity for Workspace {
    type Id = WorkspaceId;

    fn entity_id(&self) -> WorkspaceId {
        self.workspace_id
    }
}

impl CacheableEntity for User {
    type Id = UserId;

    fn entity_id(&self) -> UserId {
        self.user_id
    }
}

impl CacheableEntity for Reservation {
    type Id = ReservationId;

    fn entity_id(&self) -> ReservationId {
        self.reservation_id
    }
}
