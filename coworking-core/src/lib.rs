//! Coworking Core - Entity Types
//!
//! Pure data structures with no storage or caching behavior. All other
//! crates depend on this. Booking rules live in `coworking-booking`.

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod range;

pub use config::BookingConfig;
pub use entities::{
    Coworking, CoworkingUpdate, NewCoworking, NewReservation, NewUser, NewWorkspace,
    Reservation, ReservationUpdate, User, UserUpdate, Workspace, WorkspaceUpdate,
};
pub use enums::{EntityType, UserRole, WorkspaceType, WorkspaceTypeParseError};
pub use error::{
    ConfigError, ConflictError, CoworkingError, CoworkingResult, ErrorKind, StorageError,
    ValidationError,
};
pub use identity::{
    new_entity_id, CoworkingId, EntityId, EntityIdType, ReservationId, Timestamp, UserId,
    WorkspaceId,
};
pub use range::DateRange;
