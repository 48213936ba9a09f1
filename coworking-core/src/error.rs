//! Error types for coworking operations

use crate::EntityType;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Entity not found: {entity_type:?} with {field} '{value}'")]
    NotFoundBy {
        entity_type: EntityType,
        field: String,
        value: String,
    },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Caller input errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("End date must be same or after start date (start {start}, end {end})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Minimum stay violation: at least {required_days} days required, got {actual_days}")]
    MinimumStayViolation { required_days: i64, actual_days: i64 },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{entity_type:?} {id} still has {dependents}")]
    HasDependents {
        entity_type: EntityType,
        id: Uuid,
        dependents: String,
    },
}

/// Conflicts with existing state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Open space capacity exceeded for workspace {workspace_id} (capacity {capacity})")]
    CapacityExceeded { workspace_id: Uuid, capacity: u32 },

    #[error("Workspace {workspace_id} is already reserved for the selected period")]
    AlreadyReserved { workspace_id: Uuid },

    #[error("{entity_type:?} with {field} '{value}' already exists")]
    DuplicateValue {
        entity_type: EntityType,
        field: String,
        value: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Error category surfaced to callers, independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced id does not exist.
    NotFound,
    /// The caller supplied an invalid range, stay or value.
    InvalidArgument,
    /// The request conflicts with an existing booking or unique value.
    AlreadyExists,
    /// Anything else, e.g. the store is unavailable.
    Internal,
}

/// Master error type for all coworking errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoworkingError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CoworkingError {
    /// Shorthand for a storage `NotFound`.
    pub fn not_found(entity_type: EntityType, id: impl Into<Uuid>) -> Self {
        CoworkingError::Storage(StorageError::NotFound {
            entity_type,
            id: id.into(),
        })
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoworkingError::Storage(StorageError::NotFound { .. })
            | CoworkingError::Storage(StorageError::NotFoundBy { .. }) => ErrorKind::NotFound,
            CoworkingError::Storage(_) => ErrorKind::Internal,
            CoworkingError::Validation(_) => ErrorKind::InvalidArgument,
            CoworkingError::Conflict(_) => ErrorKind::AlreadyExists,
            CoworkingError::Config(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for coworking operations.
pub type CoworkingResult<T> = Result<T, CoworkingError>;

// =============================================================================
// TESTS
// =============================================================================
