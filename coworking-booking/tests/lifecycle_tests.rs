//! Entity Lifecycle Tests
//!
//! Full create/read/update/delete flows through [`BookingSystem`], including
//! uniqueness, dependent-entity guards and period queries.

use std::sync::Arc;

use coworking_booking::BookingSystem;
use coworking_test_utils::assertions::{
    assert_already_exists, assert_invalid_argument, assert_not_found,
};
use coworking_test_utils::fixtures::{new_coworking, new_reservation, new_user, new_workspace};
use coworking_test_utils::{day, BookingConfig, CoworkingId, EntityIdType, MockStorage, WorkspaceType};

fn system() -> (Arc<MockStorage>, BookingSystem<MockStorage>) {
    let storage = Arc::new(MockStorage::new());
    let system = BookingSystem::new(Arc::clone(&storage), &BookingConfig::default())
        .unwrap_or_else(|e| panic!("default config must be valid: {e}"));
    (storage, system)
}

#[test]
fn full_booking_lifecycle() {
    let (storage, system) = system();

    let coworking = system.coworkings().create(new_coworking("Foundry")).unwrap();
    let desks = system
        .workspaces()
        .create_bulk(
            coworking.coworking_id,
            vec![
                new_workspace("Desk 1", WorkspaceType::FixedDesk, 1),
                new_workspace("Hall", WorkspaceType::OpenSpace, 30),
            ],
        )
        .unwrap();
    assert_eq!(desks.len(), 2);
    assert_eq!(
        system
            .workspaces()
            .list_by_coworking(coworking.coworking_id)
            .unwrap()
            .len(),
        2
    );

    let user = system.users().create(new_user("lena@example.com")).unwrap();
    let booking = system
        .reservations()
        .create(desks[0].workspace_id, user.user_id, new_reservation(2, 4))
        .unwrap();
    assert_eq!(booking.period.start(), day(2));
    assert_eq!(booking.period.end(), day(4));

    let mine = system
        .reservations()
        .list_by_user_email("lena@example.com")
        .unwrap();
    assert_eq!(mine, vec![booking.clone()]);

    // Dependents block deletion until the reservation is gone.
    assert_invalid_argument(&system.users().delete(user.user_id));
    assert_invalid_argument(&system.workspaces().delete(desks[0].workspace_id));
    assert_invalid_argument(&system.coworkings().delete(coworking.coworking_id));

    system.reservations().delete(booking.reservation_id).unwrap();
    system.workspaces().delete(desks[0].workspace_id).unwrap();
    system.workspaces().delete(desks[1].workspace_id).unwrap();
    system.coworkings().delete(coworking.coworking_id).unwrap();
    system.users().delete(user.user_id).unwrap();

    assert_eq!(storage.coworking_count().unwrap(), 0);
    assert_eq!(storage.workspace_count().unwrap(), 0);
    assert_eq!(storage.user_count().unwrap(), 0);
    assert_eq!(storage.reservation_count().unwrap(), 0);
    assert_not_found(&system.coworkings().get(coworking.coworking_id));
}

#[test]
fn coworking_name_and_address_unique() {
    let (_storage, system) = system();
    let coworkings = system.coworkings();
    let first = coworkings.create(new_coworking("Atrium")).unwrap();

    assert_already_exists(&coworkings.create(new_coworking("Atrium")));

    let mut same_address = new_coworking("Other");
    same_address.address = first.address.clone();
    assert_already_exists(&coworkings.create(same_address));

    // Keeping its own name is not a conflict.
    let mut renamed = new_coworking("Atrium");
    renamed.phone_number = "+1 555 0199".to_string();
    let updated = coworkings.update(first.coworking_id, renamed).unwrap();
    assert_eq!(updated.phone_number, "+1 555 0199");
    assert_eq!(updated.created_at, first.created_at);
}

#[test]
fn workspace_name_unique_within_coworking_only() {
    let (_storage, system) = system();
    let a = system.coworkings().create(new_coworking("North")).unwrap();
    let b = system.coworkings().create(new_coworking("South")).unwrap();
    let workspaces = system.workspaces();

    workspaces
        .create(a.coworking_id, new_workspace("Room", WorkspaceType::MeetingRoom, 6))
        .unwrap();
    assert_already_exists(
        &workspaces.create(a.coworking_id, new_workspace("Room", WorkspaceType::Office, 1)),
    );
    assert!(workspaces
        .create(b.coworking_id, new_workspace("Room", WorkspaceType::Office, 1))
        .is_ok());
}

#[test]
fn workspace_requires_existing_coworking_and_capacity() {
    let (_storage, system) = system();
    let missing = CoworkingId::now_v7();
    assert_not_found(
        &system
            .workspaces()
            .create(missing, new_workspace("Ghost", WorkspaceType::OpenSpace, 3)),
    );
    assert_not_found(&system.workspaces().list_by_coworking(missing));

    let coworking = system.coworkings().create(new_coworking("Loft")).unwrap();
    assert_invalid_argument(&system.workspaces().create(
        coworking.coworking_id,
        new_workspace("Empty", WorkspaceType::OpenSpace, 0),
    ));
}

#[test]
fn bulk_create_stops_at_first_failure() {
    let (storage, system) = system();
    let coworking = system.coworkings().create(new_coworking("Depot")).unwrap();

    let result = system.workspaces().create_bulk(
        coworking.coworking_id,
        vec![
            new_workspace("A", WorkspaceType::FixedDesk, 1),
            new_workspace("A", WorkspaceType::FixedDesk, 1),
            new_workspace("C", WorkspaceType::FixedDesk, 1),
        ],
    );

    assert_already_exists(&result);
    assert_eq!(storage.workspace_count().unwrap(), 1);
}

#[test]
fn user_email_unique() {
    let (_storage, system) = system();
    let users = system.users();
    let ana = users.create(new_user("ana@example.com")).unwrap();
    let bo = users.create(new_user("bo@example.com")).unwrap();

    assert_already_exists(&users.create(new_user("ana@example.com")));
    assert_already_exists(&users.update(bo.user_id, new_user("ana@example.com")));

    let same = users.update(ana.user_id, new_user("ana@example.com")).unwrap();
    assert_eq!(same.user_id, ana.user_id);
}

#[test]
fn unknown_email_is_not_found() {
    let (_storage, system) = system();
    assert_not_found(&system.reservations().list_by_user_email("nobody@example.com"));
}

#[test]
fn period_query_is_inclusive_and_scoped_to_coworking() {
    let (_storage, system) = system();
    let here = system.coworkings().create(new_coworking("Here")).unwrap();
    let there = system.coworkings().create(new_coworking("There")).unwrap();
    let hall = system
        .workspaces()
        .create(here.coworking_id, new_workspace("Hall", WorkspaceType::OpenSpace, 10))
        .unwrap();
    let far = system
        .workspaces()
        .create(there.coworking_id, new_workspace("Hall", WorkspaceType::OpenSpace, 10))
        .unwrap();
    let user = system.users().create(new_user("kai@example.com")).unwrap();

    let reservations = system.reservations();
    let early = reservations
        .create(hall.workspace_id, user.user_id, new_reservation(1, 5))
        .unwrap();
    let late = reservations
        .create(hall.workspace_id, user.user_id, new_reservation(10, 12))
        .unwrap();
    reservations
        .create(far.workspace_id, user.user_id, new_reservation(1, 12))
        .unwrap();

    // Touching only the last day of `early`.
    let edge = reservations
        .list_by_period(day(5), day(6), here.coworking_id)
        .unwrap();
    assert_eq!(edge, vec![early.clone()]);

    let both = reservations
        .list_by_period(day(0), day(20), here.coworking_id)
        .unwrap();
    assert_eq!(both.len(), 2);
    assert!(both.contains(&early) && both.contains(&late));

    let gap = reservations
        .list_by_period(day(6), day(9), here.coworking_id)
        .unwrap();
    assert!(gap.is_empty());

    assert_invalid_argument(&reservations.list_by_period(day(9), day(6), here.coworking_id));
}

#[test]
fn missing_reservation_operations_are_not_found() {
    let (_storage, system) = system();
    let id = coworking_test_utils::ReservationId::now_v7();
    let reservations = system.reservations();

    assert_not_found(&reservations.get(id));
    assert_not_found(&reservations.update(id, new_reservation(1, 2)));
    assert_not_found(&reservations.delete(id));
}
