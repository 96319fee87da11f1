use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_request_rows() {
    let catalog = common::catalog_file();
    let requests = common::requests_file(&[
        // Valid enrollment
        "enroll, alice, free-1,",
        // Unknown action
        "refund, alice, free-1,",
        // Progress row without lesson
        "complete, alice, free-1,",
        // Unknown course
        "enroll, alice, nope,",
        // Valid progress row
        "complete, alice, free-1, l1",
    ]);

    let mut cmd = Command::new(cargo_bin!("courseway"));
    cmd.arg(requests.path()).arg("--catalog").arg(catalog.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading request"))
        .stderr(predicate::str::contains("needs a lesson"))
        .stderr(predicate::str::contains("Course nope"))
        .stdout(predicate::str::contains("alice,free-1,enrolled,1"));
}

#[test]
fn test_malformed_catalog_rows() {
    let catalog = common::write_csv(
        common::CATALOG_HEADER,
        &[
            "c1, Negative, -5, true, teacher, acct",
            "c2, Bad flag, 10, maybe, teacher, acct",
            "c3, Fine, 0, false, teacher,",
        ],
    );
    let requests = common::requests_file(&[
        "enroll, alice, c1,",
        "enroll, alice, c2,",
        "enroll, alice, c3,",
    ]);

    let mut cmd = Command::new(cargo_bin!("courseway"));
    cmd.arg(requests.path()).arg("--catalog").arg(catalog.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading course"))
        .stdout(predicate::str::contains("alice,c3,enrolled,0"))
        .stdout(predicate::str::contains("alice,c1").not());
}
