//! Cache-Aside Consistency Tests
//!
//! After a successful write, a read by id must return the written value
//! without reaching the store. Verified with `MockStorage` call counters.

use std::sync::Arc;

use coworking_booking::BookingSystem;
use coworking_test_utils::assertions::{assert_internal, assert_not_found};
use coworking_test_utils::fixtures::{
    new_coworking, new_reservation, new_user, new_workspace, seed, small_cache_config,
};
use coworking_test_utils::{BookingConfig, EntityType, MockStorage, WorkspaceType};

fn system_with(config: &BookingConfig) -> (Arc<MockStorage>, BookingSystem<MockStorage>) {
    let storage = Arc::new(MockStorage::new());
    let system = BookingSystem::new(Arc::clone(&storage), config)
        .unwrap_or_else(|e| panic!("config must be valid: {e}"));
    (storage, system)
}

#[test]
fn reservation_read_after_create_skips_store() {
    let (storage, system) = system_with(&BookingConfig::default());
    let seeded = seed(&storage, WorkspaceType::MeetingRoom, 1).unwrap();

    let created = system
        .reservations()
        .create(
            seeded.workspace.workspace_id,
            seeded.user.user_id,
            new_reservation(1, 2),
        )
        .unwrap();
    storage.reset_calls();

    assert_eq!(system.reservations().get(created.reservation_id).unwrap(), created);
    assert_eq!(storage.calls(EntityType::Reservation).gets, 0);
}

#[test]
fn reservation_read_after_update_returns_fresh_value() {
    let (storage, system) = system_with(&BookingConfig::default());
    let seeded = seed(&storage, WorkspaceType::FixedDesk, 1).unwrap();
    let reservations = system.reservations();
    let created = reservations
        .create(
            seeded.workspace.workspace_id,
            seeded.user.user_id,
            new_reservation(1, 2),
        )
        .unwrap();

    let updated = reservations
        .update(created.reservation_id, new_reservation(4, 9))
        .unwrap();
    storage.reset_calls();

    let read = reservations.get(created.reservation_id).unwrap();
    assert_eq!(read, updated);
    assert_eq!(read.period, updated.period);
    assert_eq!(storage.calls(EntityType::Reservation).gets, 0);
}

#[test]
fn entity_reads_after_writes_skip_store() {
    let (storage, system) = system_with(&BookingConfig::default());

    let coworking = system.coworkings().create(new_coworking("Harbor")).unwrap();
    let workspace = system
        .workspaces()
        .create(
            coworking.coworking_id,
            new_workspace("Deck", WorkspaceType::OpenSpace, 12),
        )
        .unwrap();
    let user = system.users().create(new_user("mia@example.com")).unwrap();
    storage.reset_calls();

    assert_eq!(system.coworkings().get(coworking.coworking_id).unwrap(), coworking);
    assert_eq!(system.workspaces().get(workspace.workspace_id).unwrap(), workspace);
    assert_eq!(system.users().get(user.user_id).unwrap(), user);

    for entity_type in [EntityType::Coworking, EntityType::Workspace, EntityType::User] {
        assert_eq!(storage.calls(entity_type).gets, 0, "{entity_type} hit the store");
    }
}

#[test]
fn miss_loads_once_then_hits() {
    let (storage, system) = system_with(&BookingConfig::default());
    let seeded = seed(&storage, WorkspaceType::OpenSpace, 4).unwrap();
    storage.reset_calls();

    let users = system.users();
    users.get(seeded.user.user_id).unwrap();
    users.get(seeded.user.user_id).unwrap();
    users.get(seeded.user.user_id).unwrap();

    assert_eq!(storage.calls(EntityType::User).gets, 1);
    let stats = users.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
}

#[test]
fn eviction_forces_refetch() {
    let (storage, system) = system_with(&small_cache_config(2));
    let users = system.users();

    let a = users.create(new_user("a@example.com")).unwrap();
    let b = users.create(new_user("b@example.com")).unwrap();
    // a now has frequency 2, b has 1
    users.get(a.user_id).unwrap();
    let c = users.create(new_user("c@example.com")).unwrap();
    storage.reset_calls();

    users.get(a.user_id).unwrap();
    users.get(c.user_id).unwrap();
    assert_eq!(storage.calls(EntityType::User).gets, 0);

    assert_eq!(users.get(b.user_id).unwrap(), b);
    assert_eq!(storage.calls(EntityType::User).gets, 1);
    assert_eq!(users.cache_stats().entry_count, 2);
}

#[test]
fn deleted_reservation_not_served_from_cache() {
    let (storage, system) = system_with(&BookingConfig::default());
    let seeded = seed(&storage, WorkspaceType::MeetingRoom, 1).unwrap();
    let reservations = system.reservations();
    let created = reservations
        .create(
            seeded.workspace.workspace_id,
            seeded.user.user_id,
            new_reservation(1, 1),
        )
        .unwrap();

    reservations.delete(created.reservation_id).unwrap();

    assert_not_found(&reservations.get(created.reservation_id));
    assert_eq!(storage.reservation_count().unwrap(), 0);
}

#[test]
fn store_failure_surfaces_internal_without_side_effects() {
    let (storage, system) = system_with(&BookingConfig::default());
    let seeded = seed(&storage, WorkspaceType::OpenSpace, 5).unwrap();
    storage.set_unavailable(true);

    let result = system.reservations().create(
        seeded.workspace.workspace_id,
        seeded.user.user_id,
        new_reservation(1, 2),
    );
    assert_internal(&result);
    assert_internal(&system.users().get(seeded.user.user_id));

    storage.set_unavailable(false);
    assert_eq!(storage.reservation_count().unwrap(), 0);
    assert_eq!(system.reservations().cache_stats().entry_count, 0);
    assert_eq!(system.users().cache_stats().entry_count, 0);
}
