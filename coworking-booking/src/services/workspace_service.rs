//! Workspace Service
//!
//! Workspaces belong to one coworking for life. Names are unique within a
//! coworking and capacity is at least 1. Creates and renames hold the
//! coworking lock so name checks and coworking deletes see each other.
//! Updates and deletes hold the workspace lock so they never interleave with
//! a booking decision on the same workspace.

use std::sync::Arc;

use coworking_core::{
    CoworkingError, CoworkingId, CoworkingResult, EntityIdType, EntityType, NewWorkspace,
    ValidationError, Workspace, WorkspaceId, WorkspaceUpdate,
};
use coworking_storage::{CacheStats, ReadThroughCache, StorageTrait};

use super::duplicate;
use crate::locks::EntityLocks;

fn require_capacity(capacity: u32) -> CoworkingResult<()> {
    if capacity < 1 {
        return Err(ValidationError::InvalidValue {
            field: "capacity".to_string(),
            reason: "must be at least 1".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Workspace lookups and writes with a private LFU cache.
pub struct WorkspaceService<S: ?Sized> {
    storage: Arc<S>,
    cache: ReadThroughCache<Workspace>,
    locks: Arc<EntityLocks>,
}

impl<S: StorageTrait + ?Sized> WorkspaceService<S> {
    pub fn new(storage: Arc<S>, cache_capacity: usize, locks: Arc<EntityLocks>) -> Self {
        Self {
            storage,
            cache: ReadThroughCache::new(cache_capacity),
            locks,
        }
    }

    pub fn get(&self, id: WorkspaceId) -> CoworkingResult<Workspace> {
        self.cache.get_required(id, self.storage.as_ref())
    }

    /// Read a workspace from the store, dropping any cached copy of an id
    /// the store no longer has.
    fn load(&self, id: WorkspaceId) -> CoworkingResult<Workspace> {
        match self.storage.workspace_get(id)? {
            Some(workspace) => Ok(workspace),
            None => {
                self.cache.invalidate(id);
                Err(CoworkingError::not_found(EntityType::Workspace, id))
            }
        }
    }

    pub fn list(&self) -> CoworkingResult<Vec<Workspace>> {
        self.storage.workspace_list()
    }

    /// List the workspaces of a coworking.
    ///
    /// # Errors
    /// `NotFound` when the coworking does not exist.
    pub fn list_by_coworking(&self, coworking_id: CoworkingId) -> CoworkingResult<Vec<Workspace>> {
        if !self.storage.coworking_exists(coworking_id)? {
            return Err(CoworkingError::not_found(EntityType::Coworking, coworking_id));
        }
        self.storage.workspace_list_by_coworking(coworking_id)
    }

    /// Create a workspace inside an existing coworking.
    pub fn create(
        &self,
        coworking_id: CoworkingId,
        draft: NewWorkspace,
    ) -> CoworkingResult<Workspace> {
        require_capacity(draft.capacity)?;
        self.locks.with_coworking(coworking_id, || -> CoworkingResult<Workspace> {
            if !self.storage.coworking_exists(coworking_id)? {
                return Err(CoworkingError::not_found(EntityType::Coworking, coworking_id));
            }
            if self
                .storage
                .workspace_exists_by_name_in_coworking(coworking_id, &draft.name)?
            {
                return Err(duplicate(EntityType::Workspace, "name", &draft.name).into());
            }

            let saved = self
                .storage
                .workspace_save(&Workspace::create(coworking_id, draft))?;
            self.cache.put(&saved);
            tracing::info!(
                workspace_id = %saved.workspace_id,
                %coworking_id,
                workspace_type = %saved.workspace_type,
                capacity = saved.capacity,
                "workspace created"
            );
            Ok(saved)
        })
    }

    /// Create several workspaces in order, stopping at the first failure.
    ///
    /// Workspaces created before the failure are kept.
    pub fn create_bulk(
        &self,
        coworking_id: CoworkingId,
        drafts: Vec<NewWorkspace>,
    ) -> CoworkingResult<Vec<Workspace>> {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(self.create(coworking_id, draft)?);
        }
        Ok(created)
    }

    /// Replace a workspace's fields. The owning coworking never changes.
    pub fn update(&self, id: WorkspaceId, update: WorkspaceUpdate) -> CoworkingResult<Workspace> {
        require_capacity(update.capacity)?;
        let coworking_id = self.load(id)?.coworking_id;
        self.locks.with_coworking(coworking_id, || {
            self.locks.with_workspace(id, || -> CoworkingResult<Workspace> {
                let mut workspace = self.load(id)?;
                if update.name != workspace.name
                    && self
                        .storage
                        .workspace_exists_by_name_in_coworking(coworking_id, &update.name)?
                {
                    return Err(duplicate(EntityType::Workspace, "name", &update.name).into());
                }

                workspace.apply(update);
                let saved = self.storage.workspace_save(&workspace)?;
                self.cache.put(&saved);
                tracing::info!(workspace_id = %id, "workspace updated");
                Ok(saved)
            })
        })
    }

    /// Delete a workspace without reservations.
    pub fn delete(&self, id: WorkspaceId) -> CoworkingResult<()> {
        self.locks.with_workspace(id, || -> CoworkingResult<()> {
            self.load(id)?;
            let reservations = self.storage.reservation_list_by_workspace(id)?;
            if !reservations.is_empty() {
                return Err(ValidationError::HasDependents {
                    entity_type: EntityType::Workspace,
                    id: id.as_uuid(),
                    dependents: format!("{} reservation(s)", reservations.len()),
                }
                .into());
            }

            self.storage.workspace_delete(id)?;
            self.cache.invalidate(id);
            tracing::info!(workspace_id = %id, "workspace deleted");
            Ok(())
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
