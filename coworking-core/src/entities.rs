//! Core entity structures

use crate::{
    CoworkingId, DateRange, EntityIdType, ReservationId, Timestamp, UserId, UserRole,
    WorkspaceId, WorkspaceType,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// COWORKING
// ============================================================================

/// Coworking - a physical site that holds workspaces.
/// Name and address are unique across all coworkings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coworking {
    pub coworking_id: CoworkingId,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields supplied when creating a coworking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoworking {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub description: Option<String>,
}

/// Replacement values for a coworking update.
pub type CoworkingUpdate = NewCoworking;

impl Coworking {
    /// Build a coworking from a draft, allocating a fresh id.
    pub fn create(draft: NewCoworking) -> Self {
        let now = Utc::now();
        Self {
            coworking_id: CoworkingId::now_v7(),
            name: draft.name,
            address: draft.address,
            email: draft.email,
            phone_number: draft.phone_number,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields.
    pub fn apply(&mut self, update: CoworkingUpdate) {
        self.name = update.name;
        self.address = update.address;
        self.email = update.email;
        self.phone_number = update.phone_number;
        self.description = update.description;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// WORKSPACE
// ============================================================================

/// Workspace - a bookable space inside a coworking.
///
/// `capacity` is at least 1 and only matters for [`WorkspaceType::OpenSpace`].
/// The owning coworking never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub workspace_id: WorkspaceId,
    pub coworking_id: CoworkingId,
    pub name: String,
    pub workspace_type: WorkspaceType,
    pub capacity: u32,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields supplied when creating a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkspace {
    pub name: String,
    pub workspace_type: WorkspaceType,
    pub capacity: u32,
    pub description: Option<String>,
}

/// Replacement values for a workspace update.
pub type WorkspaceUpdate = NewWorkspace;

impl Workspace {
    /// Build a workspace under `coworking_id`, allocating a fresh id.
    pub fn create(coworking_id: CoworkingId, draft: NewWorkspace) -> Self {
        let now = Utc::now();
        Self {
            workspace_id: WorkspaceId::now_v7(),
            coworking_id,
            name: draft.name,
            workspace_type: draft.workspace_type,
            capacity: draft.capacity,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields. The coworking reference is kept.
    pub fn apply(&mut self, update: WorkspaceUpdate) {
        self.name = update.name;
        self.workspace_type = update.workspace_type;
        self.capacity = update.capacity;
        self.description = update.description;
        self.updated_at = Utc::now();
    }

    /// Simultaneous reservations this workspace can hold.
    pub fn effective_capacity(&self) -> u32 {
        self.workspace_type.effective_capacity(self.capacity)
    }
}

// ============================================================================
// USER
// ============================================================================

/// User - a person who books workspaces. Email is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Opaque credential hash; never interpreted here.
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields supplied when creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Replacement values for a user update.
pub type UserUpdate = NewUser;

impl User {
    /// Build a user from a draft, allocating a fresh id.
    pub fn create(draft: NewUser) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::now_v7(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            password_hash: draft.password_hash,
            role: draft.role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields.
    pub fn apply(&mut self, update: UserUpdate) {
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.email = update.email;
        self.password_hash = update.password_hash;
        self.role = update.role;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// RESERVATION
// ============================================================================

/// Reservation - one user occupying one workspace for an inclusive date range.
///
/// The workspace and user references are fixed at creation; only the period
/// and comment change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub period: DateRange,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Requested dates for a new reservation.
///
/// Dates are kept raw so the availability check can reject `end < start`
/// with a proper reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub comment: Option<String>,
}

/// Replacement dates and comment for a reservation update.
pub type ReservationUpdate = NewReservation;

impl Reservation {
    /// Build a reservation for an already validated period.
    pub fn create(
        workspace_id: WorkspaceId,
        user_id: UserId,
        period: DateRange,
        comment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            reservation_id: ReservationId::now_v7(),
            workspace_id,
            user_id,
            period,
            comment,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the reservation to a new period and replace its comment.
    pub fn reschedule(&mut self, period: DateRange, comment: Option<String>) {
        self.period = period;
        self.comment = comment;
        self.updated_at = Utc::now();
    }

    pub fn start_date(&self) -> NaiveDate {
        self.period.start()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.period.end()
    }
}
