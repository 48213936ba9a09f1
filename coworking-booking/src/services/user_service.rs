//! User Service

use std::sync::Arc;

use coworking_core::{
    CoworkingError, CoworkingResult, EntityIdType, EntityType, NewUser, User, UserId,
    UserUpdate, ValidationError,
};
use coworking_storage::{CacheStats, ReadThroughCache, StorageTrait};

use super::duplicate;
use crate::locks::EntityLocks;

/// User lookups and writes with a private LFU cache. Emails are unique.
pub struct UserService<S: ?Sized> {
    storage: Arc<S>,
    cache: ReadThroughCache<User>,
    locks: Arc<EntityLocks>,
}

impl<S: StorageTrait + ?Sized> UserService<S> {
    pub fn new(storage: Arc<S>, cache_capacity: usize, locks: Arc<EntityLocks>) -> Self {
        Self {
            storage,
            cache: ReadThroughCache::new(cache_capacity),
            locks,
        }
    }

    pub fn get(&self, id: UserId) -> CoworkingResult<User> {
        self.cache.get_required(id, self.storage.as_ref())
    }

    fn load(&self, id: UserId) -> CoworkingResult<User> {
        match self.storage.user_get(id)? {
            Some(user) => Ok(user),
            None => {
                self.cache.invalidate(id);
                Err(CoworkingError::not_found(EntityType::User, id))
            }
        }
    }

    pub fn list(&self) -> CoworkingResult<Vec<User>> {
        self.storage.user_list()
    }

    pub fn create(&self, draft: NewUser) -> CoworkingResult<User> {
        self.locks
            .with_unique_values(EntityType::User, || -> CoworkingResult<User> {
                if self.storage.user_exists_by_email(&draft.email)? {
                    return Err(duplicate(EntityType::User, "email", &draft.email).into());
                }

                let saved = self.storage.user_save(&User::create(draft))?;
                self.cache.put(&saved);
                tracing::info!(user_id = %saved.user_id, "user created");
                Ok(saved)
            })
    }

    pub fn update(&self, id: UserId, update: UserUpdate) -> CoworkingResult<User> {
        self.locks.with_user(id, || -> CoworkingResult<User> {
            let mut user = self.load(id)?;
            self.locks
                .with_unique_values(EntityType::User, || -> CoworkingResult<User> {
                    if update.email != user.email
                        && self.storage.user_exists_by_email(&update.email)?
                    {
                        return Err(duplicate(EntityType::User, "email", &update.email).into());
                    }

                    user.apply(update);
                    let saved = self.storage.user_save(&user)?;
                    self.cache.put(&saved);
                    tracing::info!(user_id = %id, "user updated");
                    Ok(saved)
                })
        })
    }

    /// Delete a user who holds no reservations.
    ///
    /// Holds the user lock, which reservation creation also takes, so no
    /// booking can land between the check and the delete.
    pub fn delete(&self, id: UserId) -> CoworkingResult<()> {
        self.locks.with_user(id, || -> CoworkingResult<()> {
            self.load(id)?;

            let reservations = self.storage.reservation_list_by_user(id)?;
            if !reservations.is_empty() {
                return Err(ValidationError::HasDependents {
                    entity_type: EntityType::User,
                    id: id.as_uuid(),
                    dependents: format!("{} reservation(s)", reservations.len()),
                }
                .into());
            }

            self.storage.user_delete(id)?;
            self.cache.invalidate(id);
            tracing::info!(user_id = %id, "user deleted");
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
    use chrono::NaiveDate;
    use coworking_core::{DateRange, ErrorKind, Reservation, UserRole, WorkspaceId};
    use coworking_storage::MockStorage;

    fn service(storage: Arc<MockStorage>) -> UserService<MockStorage> {
        UserService::new(storage, 100, Arc::new(EntityLocks::new()))
    }

    fn draft(email: &str) -> NewUser {
        NewUser {
            first_name: "Alan".to_string(),
            last_name: "Turing".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: UserRole::User,
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let service = service(Arc::new(MockStorage::new()));
        service.create(draft("alan@example.com")).unwrap();

        let err = service.create(draft("alan@example.com")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_update_email_uniqueness_excludes_self() {
        let service = service(Arc::new(MockStorage::new()));
        let alan = service.create(draft("alan@example.com")).unwrap();
        service.create(draft("ada@example.com")).unwrap();

        let mut renamed = draft("alan@example.com");
        renamed.role = UserRole::Admin;
        assert_eq!(service.update(alan.user_id, renamed).unwrap().role, UserRole::Admin);

        let err = service
            .update(alan.user_id, draft("ada@example.com"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_delete_with_reservations_rejected() {
        let storage = Arc::new(MockStorage::new());
        let service = service(Arc::clone(&storage));
        let alan = service.create(draft("alan@example.com")).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        storage
            .reservation_save(&Reservation::create(
                WorkspaceId::now_v7(),
                alan.user_id,
                DateRange::single_day(day),
                None,
            ))
            .unwrap();

        let err = service.delete(alan.user_id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_delete_then_get_not_found() {
        let service = service(Arc::new(MockStorage::new()));
        let alan = service.create(draft("alan@example.com")).unwrap();

        service.delete(alan.user_id).unwrap();
        assert_eq!(
            service.get(alan.user_id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_stale_cache_entry_cannot_revive_deleted_user() {
        let storage = Arc::new(MockStorage::new());
        let service = service(Arc::clone(&storage));
        let alan = service.create(draft("alan@example.com")).unwrap();
        service.delete(alan.user_id).unwrap();
        service.cache.put(&alan);

        let err = service
            .update(alan.user_id, draft("turing@example.com"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(storage.user_count().unwrap(), 0);
        assert!(service.cache.peek(alan.user_id).is_none());

        service.cache.put(&alan);
        assert_eq!(service.delete(alan.user_id).unwrap_err().kind(), ErrorKind::NotFound);
        assert!(!storage.user_exists_by_email("alan@example.com").unwrap());
    }
}
