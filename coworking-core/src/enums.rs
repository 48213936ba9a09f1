//! Enum types for coworking entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// Entity type discriminator for errors, cache keys and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Coworking,
    Workspace,
    User,
    Reservation,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Coworking => "Coworking",
            EntityType::Workspace => "Workspace",
            EntityType::User => "User",
            EntityType::Reservation => "Reservation",
        };
        f.write_str(name)
    }
}

/// Kind of bookable space.
///
/// Only [`WorkspaceType::OpenSpace`] uses the stored capacity; every other
/// type holds one reservation at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceType {
    /// Shared hall, capacity is meaningful
    OpenSpace,
    /// Meeting room
    MeetingRoom,
    /// Desk assigned to one person
    FixedDesk,
    /// Private office, minimum stay applies
    Office,
}

impl WorkspaceType {
    /// All workspace types, in declaration order.
    pub const ALL: [WorkspaceType; 4] = [
        WorkspaceType::OpenSpace,
        WorkspaceType::MeetingRoom,
        WorkspaceType::FixedDesk,
        WorkspaceType::Office,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            WorkspaceType::OpenSpace => "OPEN_SPACE",
            WorkspaceType::MeetingRoom => "MEETING_ROOM",
            WorkspaceType::FixedDesk => "FIXED_DESK",
            WorkspaceType::Office => "OFFICE",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, WorkspaceTypeParseError> {
        match s.to_uppercase().as_str() {
            "OPEN_SPACE" => Ok(WorkspaceType::OpenSpace),
            "MEETING_ROOM" => Ok(WorkspaceType::MeetingRoom),
            "FIXED_DESK" => Ok(WorkspaceType::FixedDesk),
            "OFFICE" => Ok(WorkspaceType::Office),
            _ => Err(WorkspaceTypeParseError(s.to_string())),
        }
    }

    /// Maximum number of simultaneous reservations for a workspace of this
    /// type holding `stored_capacity`.
    pub fn effective_capacity(&self, stored_capacity: u32) -> u32 {
        match self {
            WorkspaceType::OpenSpace => stored_capacity,
            WorkspaceType::MeetingRoom | WorkspaceType::FixedDesk | WorkspaceType::Office => 1,
        }
    }
}

impl fmt::Display for WorkspaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for WorkspaceType {
    type Err = WorkspaceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid workspace type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceTypeParseError(pub String);

impl fmt::Display for WorkspaceTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid workspace type: {}", self.0)
    }
}

impl std::error::Error for WorkspaceTypeParseError {}

/// Role carried by a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}
