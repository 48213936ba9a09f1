//! Entity Services
//!
//! One service per entity kind. Each owns a private cache-aside
//! [`ReadThroughCache`](coworking_storage::ReadThroughCache) and the shared
//! storage handle. Reads go cache first; writes persist, then refresh or
//! evict the cached copy.

pub mod coworking_service;
pub mod reservation_service;
pub mod user_service;
pub mod workspace_service;

pub use coworking_service::CoworkingService;
pub use reservation_service::ReservationService;
pub use user_service::UserService;
pub use workspace_service::WorkspaceService;

use coworking_core::{ConflictError, EntityType};

/// `AlreadyExists` error for a duplicated unique field.
pub(crate) fn duplicate(entity_type: EntityType, field: &str, value: &str) -> ConflictError {
    ConflictError::DuplicateValue {
        entity_type,
        field: field.to_string(),
        value: value.to_string(),
    }
}
