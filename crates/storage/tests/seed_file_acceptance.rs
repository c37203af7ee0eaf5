use std::io::Write;

use chrono::{TimeZone, Utc};
use shared::domain::{SorId, UserRole};
use storage::{Seed, Storage};

#[test]
fn seed_file_round_trips_through_json() {
    let now = Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap();
    let mut seed = Seed::builtin(now);
    seed.categories.push("Transport".to_string());

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let raw = serde_json::to_string_pretty(&seed).expect("serialize seed");
    file.write_all(raw.as_bytes()).expect("write seed");

    let storage = Storage::from_seed_file(file.path()).expect("load seed file");
    assert!(storage.categories().iter().any(|c| c == "Transport"));
    assert_eq!(
        storage
            .first_user_with_role(UserRole::Cfo)
            .map(|u| u.name.as_str()),
        Some("John CFO")
    );
    assert!(storage.request(&SorId::from("SOR-2024-002")).is_some());
}

#[test]
fn malformed_seed_file_reports_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"{ not json").expect("write");

    let err = Storage::from_seed_file(file.path()).expect_err("should fail");
    let message = format!("{err:#}");
    assert!(message.contains("failed to parse seed file"), "{message}");
}

#[test]
fn missing_seed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Storage::from_seed_file(&dir.path().join("absent.json")).expect_err("missing");
    assert!(err.to_string().contains("failed to read seed file"));
}
