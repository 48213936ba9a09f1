//! Coworking Booking - Availability Engine and Entity Services
//!
//! Wires the storage contract and the LFU cache layer into four services.
//! [`BookingSystem`] is the composition root: it owns one cache per entity
//! kind and the entity lock registry shared by all services. Nothing is global.
//!
//! ```ignore
//! let storage = Arc::new(MockStorage::new());
//! let system = BookingSystem::new(storage, &BookingConfig::from_env())?;
//! let reservation = system.reservations().create(workspace_id, user_id, request)?;
//! ```

pub mod availability;
pub mod locks;
pub mod services;
pub mod telemetry;

pub use availability::{AvailabilityDecision, AvailabilityEngine, RejectReason};
pub use locks::{EntityLocks, KeyedLocks};
pub use services::{CoworkingService, ReservationService, UserService, WorkspaceService};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};

use std::sync::Arc;

use coworking_core::{BookingConfig, CoworkingResult};
use coworking_storage::StorageTrait;

/// All entity services over one storage backend.
pub struct BookingSystem<S: ?Sized> {
    storage: Arc<S>,
    coworkings: CoworkingService<S>,
    workspaces: WorkspaceService<S>,
    users: UserService<S>,
    reservations: ReservationService<S>,
    locks: Arc<EntityLocks>,
}

impl<S: StorageTrait + ?Sized> BookingSystem<S> {
    /// Build the services after validating `config`.
    ///
    /// Each service gets its own cache of `config.cache_capacity` entries.
    pub fn new(storage: Arc<S>, config: &BookingConfig) -> CoworkingResult<Self> {
        config.validate()?;

        let locks = Arc::new(EntityLocks::new());
        let capacity = config.cache_capacity;

        tracing::info!(
            cache_capacity = capacity,
            office_min_stay_days = config.office_min_stay_days,
            "booking system initialized"
        );

        Ok(Self {
            coworkings: CoworkingService::new(Arc::clone(&storage), capacity, Arc::clone(&locks)),
            workspaces: WorkspaceService::new(Arc::clone(&storage), capacity, Arc::clone(&locks)),
            users: UserService::new(Arc::clone(&storage), capacity, Arc::clone(&locks)),
            reservations: ReservationService::new(
                Arc::clone(&storage),
                capacity,
                AvailabilityEngine::new(config.office_min_stay_days),
                Arc::clone(&locks),
            ),
            storage,
            locks,
        })
    }

    pub fn coworkings(&self) -> &CoworkingService<S> {
        &self.coworkings
    }

    pub fn workspaces(&self) -> &WorkspaceService<S> {
        &self.workspaces
    }

    pub fn users(&self) -> &UserService<S> {
        &self.users
    }

    pub fn reservations(&self) -> &ReservationService<S> {
        &self.reservations
    }

    /// The lock registry shared by the services.
    pub fn locks(&self) -> &EntityLocks {
        &self.locks
    }

    /// The underlying storage handle.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
