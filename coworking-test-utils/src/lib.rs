//! Coworking Test Utilities
//!
//! Shared test infrastructure for the coworking workspace:
//! - Proptest generators for ids, dates, ranges and entities
//! - Fixtures that seed a [`MockStorage`] with ready-made entities
//! - Assertions on the error taxonomy

// Re-export mock storage from its source crate
pub use coworking_storage::{CallCounts, MockStorage, StorageTrait};

// Re-export core types for convenience
pub use coworking_core::{
    BookingConfig, Coworking, CoworkingError, CoworkingId, CoworkingResult, DateRange,
    EntityIdType, EntityType, ErrorKind, NewCoworking, NewReservation, NewUser, NewWorkspace,
    Reservation, ReservationId, Timestamp, User, UserId, UserRole, Workspace, WorkspaceId,
    WorkspaceType,
};

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

/// First day of the calendar used by fixtures and generators.
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// `base_date() + offset` days.
pub fn day(offset: i64) -> NaiveDate {
    base_date() + Duration::days(offset)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating coworking entity types.

    use super::*;
    use proptest::prelude::*;

    // === Identity Type Generators ===

    /// Generate a random UUID (for generic ID generation).
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_coworking_id() -> impl Strategy<Value = CoworkingId> {
        arb_uuid().prop_map(CoworkingId::new)
    }

    pub fn arb_workspace_id() -> impl Strategy<Value = WorkspaceId> {
        arb_uuid().prop_map(WorkspaceId::new)
    }

    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        arb_uuid().prop_map(UserId::new)
    }

    pub fn arb_reservation_id() -> impl Strategy<Value = ReservationId> {
        arb_uuid().prop_map(ReservationId::new)
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // Generate timestamps within a reasonable range (2020-2030)
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    // === Calendar Generators ===

    /// A day within the first `span` days after [`base_date`].
    pub fn arb_day(span: i64) -> impl Strategy<Value = NaiveDate> {
        (0..span).prop_map(day)
    }

    /// A valid inclusive range starting within `span` days, lasting up to
    /// `max_len` days.
    pub fn arb_date_range(span: i64, max_len: i64) -> impl Strategy<Value = DateRange> {
        (0..span, 1..=max_len).prop_map(|(offset, len)| {
            let start = day(offset);
            DateRange::new(start, start + Duration::days(len - 1))
                .unwrap_or_else(|_| DateRange::single_day(start))
        })
    }

    /// A raw `(start, end)` pair that may be inverted.
    pub fn arb_raw_dates(span: i64) -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
        (arb_day(span), arb_day(span))
    }

    // === Enum Generators ===

    pub fn arb_workspace_type() -> impl Strategy<Value = WorkspaceType> {
        prop_oneof![
            Just(WorkspaceType::OpenSpace),
            Just(WorkspaceType::MeetingRoom),
            Just(WorkspaceType::FixedDesk),
            Just(WorkspaceType::Office),
        ]
    }

    /// Every type except `OPEN_SPACE`.
    pub fn arb_single_occupancy_type() -> impl Strategy<Value = WorkspaceType> {
        prop_oneof![
            Just(WorkspaceType::MeetingRoom),
            Just(WorkspaceType::FixedDesk),
            Just(WorkspaceType::Office),
        ]
    }

    pub fn arb_user_role() -> impl Strategy<Value = UserRole> {
        prop_oneof![Just(UserRole::User), Just(UserRole::Admin)]
    }

    // === Draft Generators ===

    pub fn arb_new_workspace() -> impl Strategy<Value = NewWorkspace> {
        ("[A-Z][a-z]{2,10}", arb_workspace_type(), 1u32..20).prop_map(
            |(name, workspace_type, capacity)| NewWorkspace {
                name,
                workspace_type,
                capacity,
                description: None,
            },
        )
    }

    pub fn arb_new_user() -> impl Strategy<Value = NewUser> {
        ("[a-z]{3,10}", "[a-z]{3,10}", arb_user_role()).prop_map(|(first, last, role)| NewUser {
            email: format!("{first}.{last}@example.com"),
            first_name: first,
            last_name: last,
            password_hash: "hash".to_string(),
            role,
        })
    }

    pub fn arb_new_reservation(span: i64, max_len: i64) -> impl Strategy<Value = NewReservation> {
        arb_date_range(span, max_len).prop_map(|range| NewReservation {
            start_date: range.start(),
            end_date: range.end(),
            comment: None,
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// Config with a small cache so eviction shows up in tests.
    pub fn small_cache_config(capacity: usize) -> BookingConfig {
        BookingConfig::new().with_cache_capacity(capacity)
    }

    pub fn new_coworking(name: &str) -> NewCoworking {
        NewCoworking {
            name: name.to_string(),
            address: format!("{name}, 1 Market Square"),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', "-")),
            phone_number: "+1 555 0100".to_string(),
            description: Some(format!("{name} test site")),
        }
    }

    pub fn new_workspace(name: &str, workspace_type: WorkspaceType, capacity: u32) -> NewWorkspace {
        NewWorkspace {
            name: name.to_string(),
            workspace_type,
            capacity,
            description: None,
        }
    }

    pub fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
        }
    }

    /// Reservation request for `[day(start), day(end)]`.
    pub fn new_reservation(start: i64, end: i64) -> NewReservation {
        NewReservation {
            start_date: day(start),
            end_date: day(end),
            comment: None,
        }
    }

    /// A coworking with one workspace and one user, stored directly.
    #[derive(Debug, Clone)]
    pub struct Seeded {
        pub coworking: Coworking,
        pub workspace: Workspace,
        pub user: User,
    }

    /// Store a coworking, one workspace of the given type and a user.
    pub fn seed(
        storage: &MockStorage,
        workspace_type: WorkspaceType,
        capacity: u32,
    ) -> CoworkingResult<Seeded> {
        let coworking = storage.coworking_save(&Coworking::create(new_coworking("Seed Hub")))?;
        let workspace = storage.workspace_save(&Workspace::create(
            coworking.coworking_id,
            new_workspace("Seed Space", workspace_type, capacity),
        ))?;
        let user = storage.user_save(&User::create(new_user("seed@example.com")))?;
        Ok(Seeded {
            coworking,
            workspace,
            user,
        })
    }

    /// Store an extra user.
    pub fn seed_user(storage: &MockStorage, email: &str) -> CoworkingResult<User> {
        storage.user_save(&User::create(new_user(email)))
    }

    /// Store a reservation without consulting availability rules.
    pub fn seed_reservation(
        storage: &MockStorage,
        workspace_id: WorkspaceId,
        user_id: UserId,
        start: i64,
        end: i64,
    ) -> CoworkingResult<Reservation> {
        let period = DateRange::new(day(start), day(end))?;
        storage.reservation_save(&Reservation::create(workspace_id, user_id, period, None))
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on the coworking error taxonomy.

    use super::*;

    /// Assert that a result is an error of the given kind.
    pub fn assert_kind<T: std::fmt::Debug>(result: &CoworkingResult<T>, kind: ErrorKind) {
        match result {
            Err(e) => assert_eq!(e.kind(), kind, "Wrong error kind for {e}"),
            Ok(v) => panic!("Expected {kind:?} error, got Ok({v:?})"),
        }
    }

    pub fn assert_not_found<T: std::fmt::Debug>(result: &CoworkingResult<T>) {
        assert_kind(result, ErrorKind::NotFound);
    }

    pub fn assert_invalid_argument<T: std::fmt::Debug>(result: &CoworkingResult<T>) {
        assert_kind(result, ErrorKind::InvalidArgument);
    }

    pub fn assert_already_exists<T: std::fmt::Debug>(result: &CoworkingResult<T>) {
        assert_kind(result, ErrorKind::AlreadyExists);
    }

    pub fn assert_internal<T: std::fmt::Debug>(result: &CoworkingResult<T>) {
        assert_kind(result, ErrorKind::Internal);
    }
}
