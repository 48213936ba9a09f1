//! Availability Engine
//!
//! Decides whether a workspace may take a reservation for a date range.
//! Rules are evaluated in order and the first failing rule wins:
//!
//! 1. `end < start` is an invalid range.
//! 2. An `OFFICE` stay shorter than the minimum (7 inclusive days by default)
//!    is rejected.
//! 3. Reservations on the workspace overlapping `[start, end]` are loaded,
//!    minus the reservation being updated.
//! 4. `OPEN_SPACE` rejects when the overlap count reaches its capacity.
//!    Every other type rejects on any overlap.
//!
//! The engine only reads. Callers must hold the workspace lock across the
//! check and the write that follows it.

use chrono::NaiveDate;
use coworking_core::config::DEFAULT_OFFICE_MIN_STAY_DAYS;
use coworking_core::{
    ConflictError, CoworkingError, CoworkingResult, DateRange, EntityIdType, ReservationId,
    ValidationError, Workspace, WorkspaceType,
};
use coworking_storage::StorageTrait;

/// Why a booking was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// End date precedes start date.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Office booked for fewer days than required.
    MinimumStay { required_days: i64, actual_days: i64 },
    /// Open space already holds `capacity` overlapping reservations.
    CapacityExceeded { capacity: u32 },
    /// Single-occupancy workspace already booked for part of the period.
    AlreadyReserved,
}

impl RejectReason {
    /// Convert into the error surfaced to callers.
    pub fn into_error(self, workspace: &Workspace) -> CoworkingError {
        let workspace_id = workspace.workspace_id.as_uuid();
        match self {
            RejectReason::InvalidRange { start, end } => {
                ValidationError::InvalidRange { start, end }.into()
            }
            RejectReason::MinimumStay {
                required_days,
                actual_days,
            } => ValidationError::MinimumStayViolation {
                required_days,
                actual_days,
            }
            .into(),
            RejectReason::CapacityExceeded { capacity } => ConflictError::CapacityExceeded {
                workspace_id,
                capacity,
            }
            .into(),
            RejectReason::AlreadyReserved => ConflictError::AlreadyReserved { workspace_id }.into(),
        }
    }
}

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityDecision {
    /// The booking may proceed for this validated period.
    Accept(DateRange),
    /// The booking must not be written.
    Reject(RejectReason),
}

impl AvailabilityDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AvailabilityDecision::Accept(_))
    }

    /// The accepted period, or the rejection as an error.
    pub fn into_result(self, workspace: &Workspace) -> CoworkingResult<DateRange> {
        match self {
            AvailabilityDecision::Accept(period) => Ok(period),
            AvailabilityDecision::Reject(reason) => Err(reason.into_error(workspace)),
        }
    }
}

/// Booking legality rules for every workspace type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityEngine {
    office_min_stay_days: i64,
}

impl Default for AvailabilityEngine {
    fn default() -> Self {
        Self::new(DEFAULT_OFFICE_MIN_STAY_DAYS)
    }
}

impl AvailabilityEngine {
    pub fn new(office_min_stay_days: u32) -> Self {
        Self {
            office_min_stay_days: i64::from(office_min_stay_days),
        }
    }

    /// Minimum inclusive length of an office booking.
    pub fn office_min_stay_days(&self) -> i64 {
        self.office_min_stay_days
    }

    /// Check whether `workspace` can take `[start, end]`.
    ///
    /// `exclude` names the reservation being updated so it never conflicts
    /// with itself. Store failures are returned as errors, never as a
    /// decision.
    pub fn check<S>(
        &self,
        storage: &S,
        workspace: &Workspace,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> CoworkingResult<AvailabilityDecision>
    where
        S: StorageTrait + ?Sized,
    {
        let period = match DateRange::new(start, end) {
            Ok(period) => period,
            Err(_) => {
                return Ok(AvailabilityDecision::Reject(RejectReason::InvalidRange {
                    start,
                    end,
                }))
            }
        };

        let days = period.days_inclusive();
        if workspace.workspace_type == WorkspaceType::Office && days < self.office_min_stay_days {
            return Ok(AvailabilityDecision::Reject(RejectReason::MinimumStay {
                required_days: self.office_min_stay_days,
                actual_days: days,
            }));
        }

        let overlapping = storage
            .reservation_find_overlapping(workspace.workspace_id, &period)?
            .into_iter()
            .filter(|r| Some(r.reservation_id) != exclude)
            .count();

        let decision = match workspace.workspace_type {
            WorkspaceType::OpenSpace if overlapping >= workspace.capacity as usize => {
                AvailabilityDecision::Reject(RejectReason::CapacityExceeded {
                    capacity: workspace.capacity,
                })
            }
            WorkspaceType::OpenSpace => AvailabilityDecision::Accept(period),
            _ if overlapping > 0 => AvailabilityDecision::Reject(RejectReason::AlreadyReserved),
            _ => AvailabilityDecision::Accept(period),
        };

        tracing::debug!(
            workspace_id = %workspace.workspace_id,
            workspace_type = %workspace.workspace_type,
            %period,
            overlapping,
            accepted = decision.is_accepted(),
            "availability checked"
        );

        Ok(decision)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use chrono::Duration;
    use coworking_core::{CoworkingId, NewWorkspace, Reservation, UserId};
    use coworking_storage::MockStorage;
    use proptest::prelude::*;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn arb_range() -> impl Strategy<Value = (i64, i64)> {
        (0i64..30, 0i64..10)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An open space accepts exactly when fewer than `capacity` stored
        /// reservations share a day with the candidate.
        #[test]
        fn prop_open_space_accepts_below_capacity(
            capacity in 1u32..5,
            stored in prop::collection::vec(arb_range(), 0..8),
            candidate in arb_range(),
        ) {
            let storage = MockStorage::new();
            let ws = Workspace::create(CoworkingId::now_v7(), NewWorkspace {
                name: "Floor".to_string(),
                workspace_type: WorkspaceType::OpenSpace,
                capacity,
                description: None,
            });
            let to_range = |(offset, len): (i64, i64)| {
                let start = base() + Duration::days(offset);
                DateRange::new(start, start + Duration::days(len)).unwrap()
            };
            for r in &stored {
                storage
                    .reservation_save(&Reservation::create(ws.workspace_id, UserId::now_v7(), to_range(*r), None))
                    .unwrap();
            }
            let candidate = to_range(candidate);
            let overlapping = stored.iter().filter(|r| to_range(**r).overlaps(&candidate)).count();

            let decision = AvailabilityEngine::default()
                .check(&storage, &ws, candidate.start(), candidate.end(), None)
                .unwrap();

            prop_assert_eq!(decision.is_accepted(), overlapping < capacity as usize);
        }
    }
}
