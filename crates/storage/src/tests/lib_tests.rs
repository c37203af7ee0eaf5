use chrono::{TimeZone, Utc};
use shared::domain::{SorStatus, UserRole};

use super::*;

fn seeded() -> Storage {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    Storage::new(Seed::builtin(now)).expect("builtin seed")
}

#[test]
fn builtin_seed_loads() {
    let storage = seeded();
    assert_eq!(storage.branches().len(), 6);
    assert_eq!(storage.users().len(), 8);
    assert_eq!(storage.categories().len(), 7);
    assert_eq!(storage.requests().len(), 2);
    assert_eq!(storage.default_branch().as_str(), "B1");
}

#[test]
fn sample_requests_keep_seeded_state() {
    let storage = seeded();
    let first = storage
        .request(&SorId::from("SOR-2024-001"))
        .expect("sor 001");
    assert_eq!(first.status, SorStatus::SubmittedToPrincipal);
    assert_eq!(first.audit_log.len(), 1);

    let second = storage
        .request(&SorId::from("SOR-2024-002"))
        .expect("sor 002");
    assert_eq!(second.status, SorStatus::ApprovedByPrincipal);
    assert_eq!(second.audit_log.len(), 2);
    assert_eq!(second.messages.len(), 1);
}

#[test]
fn every_workflow_role_has_a_seeded_user() {
    let storage = seeded();
    for role in [
        UserRole::Principal,
        UserRole::Procurement,
        UserRole::Inventory,
        UserRole::Finance,
        UserRole::Cfo,
    ] {
        assert!(storage.first_user_with_role(role).is_some(), "{role:?}");
    }
    assert!(storage.first_user_with_role(UserRole::Hr).is_none());
}

#[test]
fn allocated_ids_continue_after_seeded_sequence() {
    let mut storage = seeded();
    let first = storage.allocate_request_id(2024).expect("id");
    let second = storage.allocate_request_id(2025).expect("id");
    assert_eq!(first.as_str(), "SOR-2024-003");
    assert_eq!(second.as_str(), "SOR-2025-004");
}

#[test]
fn allocated_ids_skip_existing_references() {
    let mut storage = seeded();
    let mut taken = storage.requests()[0].clone();
    taken.id = SorId::from("SOR-2024-003");
    storage.insert_request(taken).expect("insert");
    let next = storage.allocate_request_id(2024).expect("id");
    assert_eq!(next.as_str(), "SOR-2024-004");
}

#[test]
fn insert_prepends_and_rejects_duplicates() {
    let mut storage = seeded();
    let mut sor = storage.requests()[1].clone();
    sor.id = SorId::from("SOR-2024-050");
    storage.insert_request(sor.clone()).expect("insert");
    assert_eq!(storage.requests()[0].id, sor.id);

    let err = storage.insert_request(sor).expect_err("duplicate");
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn seed_with_foreign_branch_is_rejected() {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let mut seed = Seed::builtin(now);
    seed.requests[0].branch_id = BranchId::from("B99");
    let err = Storage::new(seed).expect_err("invalid seed");
    assert!(err.to_string().contains("unknown branch"));
}

#[test]
fn seed_without_creation_entry_is_rejected() {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let mut seed = Seed::builtin(now);
    seed.requests[1].audit_log.remove(0);
    let err = Storage::new(seed).expect_err("invalid seed");
    assert!(err.to_string().contains("must start with"));
}

#[test]
fn seed_at_the_sequence_ceiling_is_rejected() {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let mut seed = Seed::builtin(now);
    seed.requests[0].id = SorId::from("SOR-2024-4294967295");
    let err = Storage::new(seed).expect_err("no ids left");
    assert!(err.to_string().contains("no room for new ids"));
}

#[test]
fn last_sequence_number_is_handed_out_once() {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let mut seed = Seed::builtin(now);
    seed.requests[0].id = SorId::from("SOR-2024-4294967294");
    let mut storage = Storage::new(seed).expect("seed");

    let last = storage.allocate_request_id(2024).expect("last id");
    assert_eq!(last.as_str(), "SOR-2024-4294967295");
    let err = storage.allocate_request_id(2024).expect_err("exhausted");
    assert!(err.to_string().contains("exhausted"));
}

#[test]
fn sequence_parsing_ignores_foreign_ids() {
    assert_eq!(sequence_of(&SorId::from("SOR-2024-017")), Some(17));
    assert_eq!(sequence_of(&SorId::from("PO-2024-017")), None);
    assert_eq!(sequence_of(&SorId::from("SOR-2024-abc")), None);
}
