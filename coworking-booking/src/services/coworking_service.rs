//! Coworking Service
//!
//! CRUD over coworkings. Name and address are unique; a coworking that still
//! holds workspaces cannot be deleted. Deletes hold the coworking lock,
//! which workspace creation also takes.

use std::sync::Arc;

use coworking_core::{
    Coworking, CoworkingError, CoworkingId, CoworkingResult, CoworkingUpdate, EntityIdType,
    EntityType, NewCoworking, ValidationError,
};
use coworking_storage::{CacheStats, ReadThroughCache, StorageTrait};

use super::duplicate;
use crate::locks::EntityLocks;

/// Coworking lookups and writes with a private LFU cache.
pub struct CoworkingService<S: ?Sized> {
    storage: Arc<S>,
    cache: ReadThroughCache<Coworking>,
    locks: Arc<EntityLocks>,
}

impl<S: StorageTrait + ?Sized> CoworkingService<S> {
    pub fn new(storage: Arc<S>, cache_capacity: usize, locks: Arc<EntityLocks>) -> Self {
        Self {
            storage,
            cache: ReadThroughCache::new(cache_capacity),
            locks,
        }
    }

    /// Get a coworking by ID, cache first.
    pub fn get(&self, id: CoworkingId) -> CoworkingResult<Coworking> {
        self.cache.get_required(id, self.storage.as_ref())
    }

    /// Read a coworking from the store, dropping any cached copy of an id
    /// the store no longer has.
    fn load(&self, id: CoworkingId) -> CoworkingResult<Coworking> {
        match self.storage.coworking_get(id)? {
            Some(coworking) => Ok(coworking),
            None => {
                self.cache.invalidate(id);
                Err(CoworkingError::not_found(EntityType::Coworking, id))
            }
        }
    }

    /// List all coworkings straight from storage.
    pub fn list(&self) -> CoworkingResult<Vec<Coworking>> {
        self.storage.coworking_list()
    }

    /// Create a coworking.
    ///
    /// # Errors
    /// `AlreadyExists` when the name or the address is taken.
    pub fn create(&self, draft: NewCoworking) -> CoworkingResult<Coworking> {
        self.locks
            .with_unique_values(EntityType::Coworking, || -> CoworkingResult<Coworking> {
                if self.storage.coworking_exists_by_name(&draft.name)? {
                    return Err(duplicate(EntityType::Coworking, "name", &draft.name).into());
                }
                if self.storage.coworking_exists_by_address(&draft.address)? {
                    return Err(
                        duplicate(EntityType::Coworking, "address", &draft.address).into(),
                    );
                }

                let saved = self.storage.coworking_save(&Coworking::create(draft))?;
                self.cache.put(&saved);
                tracing::info!(
                    coworking_id = %saved.coworking_id,
                    name = %saved.name,
                    "coworking created"
                );
                Ok(saved)
            })
    }

    /// Replace a coworking's fields.
    ///
    /// Keeping the current name or address is allowed; taking another
    /// coworking's is not.
    pub fn update(&self, id: CoworkingId, update: CoworkingUpdate) -> CoworkingResult<Coworking> {
        self.locks.with_coworking(id, || -> CoworkingResult<Coworking> {
            let mut coworking = self.load(id)?;
            self.locks
                .with_unique_values(EntityType::Coworking, || -> CoworkingResult<Coworking> {
                    if update.name != coworking.name
                        && self.storage.coworking_exists_by_name(&update.name)?
                    {
                        return Err(duplicate(EntityType::Coworking, "name", &update.name).into());
                    }
                    if update.address != coworking.address
                        && self.storage.coworking_exists_by_address(&update.address)?
                    {
                        return Err(
                            duplicate(EntityType::Coworking, "address", &update.address).into(),
                        );
                    }

                    coworking.apply(update);
                    let saved = self.storage.coworking_save(&coworking)?;
                    self.cache.put(&saved);
                    tracing::info!(coworking_id = %id, "coworking updated");
                    Ok(saved)
                })
        })
    }

    /// Delete a coworking without workspaces.
    pub fn delete(&self, id: CoworkingId) -> CoworkingResult<()> {
        self.locks.with_coworking(id, || -> CoworkingResult<()> {
            self.load(id)?;

            let workspaces = self.storage.workspace_list_by_coworking(id)?;
            if !workspaces.is_empty() {
                return Err(ValidationError::HasDependents {
                    entity_type: EntityType::Coworking,
                    id: id.as_uuid(),
                    dependents: format!("{} workspace(s)", workspaces.len()),
                }
                .into());
            }

            self.storage.coworking_delete(id)?;
            self.cache.invalidate(id);
            tracing::info!(coworking_id = %id, "coworking deleted");
            Ok(())
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
