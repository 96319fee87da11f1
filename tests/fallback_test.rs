use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let catalog = common::catalog_file();
    let requests = common::requests_file(&["enroll, alice, free-1,"]);

    let mut cmd = Command::new(cargo_bin!("courseway"));
    cmd.arg(requests.path())
        .arg("--catalog")
        .arg(catalog.path())
        .arg("--db-path")
        .arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "falling back to in-memory storage",
        ))
        .stdout(predicate::str::contains("alice,free-1,enrolled,0"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let catalog = common::catalog_file();
    let requests = common::requests_file(&["enroll, alice, free-1,"]);

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("courseway"));
    cmd.arg(requests.path())
        .arg("--catalog")
        .arg(catalog.path())
        .arg("--db-path")
        .arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("falling back").not());
}
