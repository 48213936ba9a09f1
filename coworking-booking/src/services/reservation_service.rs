//! Reservation Service
//!
//! Reservation lifecycle: create, read, update, delete. Every write that
//! depends on an availability decision runs the decision and the write under
//! the workspace lock, so two requests cannot both claim the last slot.
//! A rejected decision leaves the store and the cache untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use coworking_core::{
    CoworkingError, CoworkingId, CoworkingResult, DateRange, EntityType, NewReservation,
    Reservation, ReservationId, ReservationUpdate, StorageError, UserId, Workspace, WorkspaceId,
};
use coworking_storage::{CacheStats, ReadThroughCache, StorageTrait};

use crate::availability::{AvailabilityDecision, AvailabilityEngine};
use crate::locks::EntityLocks;

/// Reservation lookups and writes with a private LFU cache.
pub struct ReservationService<S: ?Sized> {
    storage: Arc<S>,
    cache: ReadThroughCache<Reservation>,
    engine: AvailabilityEngine,
    locks: Arc<EntityLocks>,
}

impl<S: StorageTrait + ?Sized> ReservationService<S> {
    pub fn new(
        storage: Arc<S>,
        cache_capacity: usize,
        engine: AvailabilityEngine,
        locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            storage,
            cache: ReadThroughCache::new(cache_capacity),
            engine,
            locks,
        }
    }

    /// Get a reservation by ID, cache first.
    pub fn get(&self, id: ReservationId) -> CoworkingResult<Reservation> {
        self.cache.get_required(id, self.storage.as_ref())
    }

    pub fn list(&self) -> CoworkingResult<Vec<Reservation>> {
        self.storage.reservation_list()
    }

    /// Reservations held by the user with `email`.
    ///
    /// # Errors
    /// `NotFound` when no user has that email.
    pub fn list_by_user_email(&self, email: &str) -> CoworkingResult<Vec<Reservation>> {
        let user = self
            .storage
            .user_get_by_email(email)?
            .ok_or_else(|| StorageError::NotFoundBy {
                entity_type: EntityType::User,
                field: "email".to_string(),
                value: email.to_string(),
            })?;
        self.storage.reservation_list_by_user(user.user_id)
    }

    /// Reservations on any workspace of `coworking_id` sharing at least one
    /// day with `[start, end]`.
    pub fn list_by_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        coworking_id: CoworkingId,
    ) -> CoworkingResult<Vec<Reservation>> {
        let period = DateRange::new(start, end)?;
        self.storage
            .reservation_find_by_period_in_coworking(coworking_id, &period)
    }

    /// Read a reservation from the store, dropping any cached copy of an
    /// id the store no longer has.
    fn load(&self, id: ReservationId) -> CoworkingResult<Reservation> {
        match self.storage.reservation_get(id)? {
            Some(reservation) => Ok(reservation),
            None => {
                self.cache.invalidate(id);
                Err(CoworkingError::not_found(EntityType::Reservation, id))
            }
        }
    }

    fn load_workspace(&self, id: WorkspaceId) -> CoworkingResult<Workspace> {
        self.storage
            .workspace_get(id)?
            .ok_or_else(|| CoworkingError::not_found(EntityType::Workspace, id))
    }

    fn decide(
        &self,
        workspace: &Workspace,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<ReservationId>,
    ) -> CoworkingResult<DateRange> {
        let decision = self
            .engine
            .check(self.storage.as_ref(), workspace, start, end, exclude)?;
        if let AvailabilityDecision::Reject(reason) = &decision {
            tracing::warn!(
                workspace_id = %workspace.workspace_id,
                %start,
                %end,
                ?reason,
                "booking rejected"
            );
        }
        decision.into_result(workspace)
    }

    /// Book `workspace_id` for `user_id`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown workspace or user
    /// - `InvalidArgument` for `end < start` or a short office stay
    /// - `AlreadyExists` when the workspace has no room for the period
    pub fn create(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        request: NewReservation,
    ) -> CoworkingResult<Reservation> {
        self.locks.with_workspace(workspace_id, || -> CoworkingResult<Reservation> {
            let workspace = self.load_workspace(workspace_id)?;
            // The user lock keeps a concurrent user delete from passing its
            // no-reservations check before this save lands.
            self.locks.with_user(user_id, || -> CoworkingResult<Reservation> {
                if !self.storage.user_exists(user_id)? {
                    return Err(CoworkingError::not_found(EntityType::User, user_id));
                }

                let period =
                    self.decide(&workspace, request.start_date, request.end_date, None)?;
                let saved = self.storage.reservation_save(&Reservation::create(
                    workspace_id,
                    user_id,
                    period,
                    request.comment,
                ))?;
                self.cache.put(&saved);
                tracing::info!(
                    reservation_id = %saved.reservation_id,
                    %workspace_id,
                    %user_id,
                    %period,
                    "reservation created"
                );
                Ok(saved)
            })
        })
    }

    /// Move a reservation to new dates on its own workspace.
    ///
    /// The reservation never conflicts with itself.
    pub fn update(
        &self,
        id: ReservationId,
        update: ReservationUpdate,
    ) -> CoworkingResult<Reservation> {
        let workspace_id = self.load(id)?.workspace_id;
        self.locks.with_workspace(workspace_id, || -> CoworkingResult<Reservation> {
            let mut reservation = self.load(id)?;
            let workspace = self.load_workspace(workspace_id)?;

            let period = self.decide(&workspace, update.start_date, update.end_date, Some(id))?;
            reservation.reschedule(period, update.comment);
            let saved = self.storage.reservation_save(&reservation)?;
            self.cache.put(&saved);
            tracing::info!(reservation_id = %id, %period, "reservation updated");
            Ok(saved)
        })
    }

    pub fn delete(&self, id: ReservationId) -> CoworkingResult<()> {
        let workspace_id = self.load(id)?.workspace_id;
        self.locks.with_workspace(workspace_id, || -> CoworkingResult<()> {
            self.load(id)?;
            self.storage.reservation_delete(id)?;
            self.cache.invalidate(id);
            tracing::info!(reservation_id = %id, "reservation deleted");
            Ok(())
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coworking_core::{
        Coworking, EntityIdType, ErrorKind, NewCoworking, NewUser, NewWorkspace, User, UserRole,
        WorkspaceType,
    };
    use coworking_storage::MockStorage;

    struct Fixture {
        storage: Arc<MockStorage>,
        service: ReservationService<MockStorage>,
        user: User,
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MockStorage::new());
        let user = storage
            .user_save(&User::create(NewUser {
                first_name: "Lin".to_string(),
                last_name: "Ko".to_string(),
                email: "lin@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::User,
            }))
            .unwrap();
        let service = ReservationService::new(
            Arc::clone(&storage),
            100,
            AvailabilityEngine::default(),
            Arc::new(EntityLocks::new()),
        );
        Fixture {
            storage,
            service,
            user,
        }
    }

    fn add_workspace(
        storage: &MockStorage,
        workspace_type: WorkspaceType,
        capacity: u32,
    ) -> Workspace {
        let coworking = storage
            .coworking_save(&Coworking::create(NewCoworking {
                name: format!("Site {}", storage.coworking_count().unwrap()),
                address: "somewhere".to_string(),
                email: "site@example.com".to_string(),
                phone_number: "+1 555 0199".to_string(),
                description: None,
            }))
            .unwrap();
        storage
            .workspace_save(&Workspace::create(
                coworking.coworking_id,
                NewWorkspace {
                    name: "Space".to_string(),
                    workspace_type,
                    capacity,
                    description: None,
                },
            ))
            .unwrap()
    }

    fn request(s: u32, e: u32) -> NewReservation {
        NewReservation {
            start_date: day(s),
            end_date: day(e),
            comment: None,
        }
    }

    #[test]
    fn test_create_unknown_workspace_or_user() {
        let f = fixture();
        let err = f
            .service
            .create(WorkspaceId::now_v7(), f.user.user_id, request(1, 2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let room = add_workspace(&f.storage, WorkspaceType::MeetingRoom, 1);
        let err = f
            .service
            .create(room.workspace_id, UserId::now_v7(), request(1, 2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_rejected_create_writes_nothing() {
        let f = fixture();
        let room = add_workspace(&f.storage, WorkspaceType::MeetingRoom, 1);
        f.service
            .create(room.workspace_id, f.user.user_id, request(1, 3))
            .unwrap();
        f.storage.reset_calls();

        let err = f
            .service
            .create(room.workspace_id, f.user.user_id, request(3, 4))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(f.storage.calls(EntityType::Reservation).saves, 0);
        assert_eq!(f.storage.reservation_count().unwrap(), 1);
        assert_eq!(f.service.cache_stats().entry_count, 1);
    }

    #[test]
    fn test_update_own_dates_succeeds() {
        let f = fixture();
        let desk = add_workspace(&f.storage, WorkspaceType::FixedDesk, 1);
        let booked = f
            .service
            .create(desk.workspace_id, f.user.user_id, request(1, 5))
            .unwrap();

        let moved = f
            .service
            .update(
                booked.reservation_id,
                NewReservation {
                    start_date: day(2),
                    end_date: day(6),
                    comment: Some("shifted".to_string()),
                },
            )
            .unwrap();

        assert_eq!(moved.reservation_id, booked.reservation_id);
        assert_eq!(moved.workspace_id, desk.workspace_id);
        assert_eq!(moved.period, DateRange::new(day(2), day(6)).unwrap());
        assert_eq!(moved.comment.as_deref(), Some("shifted"));
    }

    #[test]
    fn test_update_into_other_booking_rejected_and_unchanged() {
        let f = fixture();
        let desk = add_workspace(&f.storage, WorkspaceType::FixedDesk, 1);
        let first = f
            .service
            .create(desk.workspace_id, f.user.user_id, request(1, 2))
            .unwrap();
        f.service
            .create(desk.workspace_id, f.user.user_id, request(5, 6))
            .unwrap();

        let err = f
            .service
            .update(first.reservation_id, request(2, 5))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(f.service.get(first.reservation_id).unwrap(), first);
    }

    #[test]
    fn test_delete_evicts_and_frees_slot() {
        let f = fixture();
        let room = add_workspace(&f.storage, WorkspaceType::MeetingRoom, 1);
        let booked = f
            .service
            .create(room.workspace_id, f.user.user_id, request(1, 1))
            .unwrap();

        f.service.delete(booked.reservation_id).unwrap();

        assert_eq!(
            f.service.get(booked.reservation_id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(f
            .service
            .create(room.workspace_id, f.user.user_id, request(1, 1))
            .is_ok());
    }

    #[test]
    fn test_stale_cache_entry_cannot_revive_deleted_reservation() {
        let f = fixture();
        let room = add_workspace(&f.storage, WorkspaceType::MeetingRoom, 1);
        let booked = f
            .service
            .create(room.workspace_id, f.user.user_id, request(1, 1))
            .unwrap();
        f.service.delete(booked.reservation_id).unwrap();

        // A reader that loaded the row before the delete puts it back.
        f.service.cache.put(&booked);

        let err = f
            .service
            .update(booked.reservation_id, request(3, 4))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(f.storage.reservation_count().unwrap(), 0);
        assert!(f.service.cache.peek(booked.reservation_id).is_none());

        f.service.cache.put(&booked);
        let err = f.service.delete(booked.reservation_id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(f.service.cache.peek(booked.reservation_id).is_none());
    }

    #[test]
    fn test_lookups_of_unknown_ids_leave_no_lock_entries() {
        let f = fixture();
        for _ in 0..200 {
            let err = f
                .service
                .create(WorkspaceId::now_v7(), f.user.user_id, request(1, 2))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
        let room = add_workspace(&f.storage, WorkspaceType::MeetingRoom, 1);
        f.service
            .create(room.workspace_id, f.user.user_id, request(1, 2))
            .unwrap();

        assert!(f.service.locks.is_empty());
    }

    #[test]
    fn test_list_by_user_email() {
        let f = fixture();
        let room = add_workspace(&f.storage, WorkspaceType::OpenSpace, 3);
        f.service
            .create(room.workspace_id, f.user.user_id, request(1, 1))
            .unwrap();

        assert_eq!(f.service.list_by_user_email("lin@example.com").unwrap().len(), 1);
        let err = f.service.list_by_user_email("ghost@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list_by_period_validates_range() {
        let f = fixture();
        let room = add_workspace(&f.storage, WorkspaceType::OpenSpace, 3);
        f.service
            .create(room.workspace_id, f.user.user_id, request(10, 12))
            .unwrap();

        let err = f
            .service
            .list_by_period(day(5), day(4), room.coworking_id)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let hits = f
            .service
            .list_by_period(day(12), day(20), room.coworking_id)
            .unwrap();
        assert_eq!(hits.len(), 1);
        let misses = f
            .service
            .list_by_period(day(13), day(20), room.coworking_id)
            .unwrap();
        assert!(misses.is_empty());
    }
}
