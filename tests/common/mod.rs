#![allow(dead_code)]

use courseway::application::enrollment::EnrollmentCoordinator;
use courseway::config::EnrollmentConfig;
use courseway::domain::course::Course;
use courseway::domain::ids::UserId;
use courseway::domain::money::Price;
use courseway::domain::ports::{CourseCatalog, UserStore};
use courseway::domain::user::User;
use courseway::infrastructure::in_memory::{InMemoryCourseCatalog, InMemoryUserStore};
use courseway::infrastructure::simulated_gateway::SimulatedGateway;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

pub const CATALOG_HEADER: &str = "id, name, price, paid, instructor, payout_account";
pub const REQUEST_HEADER: &str = "action, user, course, lesson";

/// Catalog with one free course (`free-1`) and one 50.00 paid course (`paid-1`).
pub fn catalog_file() -> NamedTempFile {
    write_csv(
        CATALOG_HEADER,
        &[
            "free-1, Intro to Rust, 0, false, teacher,",
            "paid-1, Async Rust, 50.00, true, teacher, acct_teacher",
            "broken-1, No Payout, 20.00, true, teacher,",
        ],
    )
}

pub fn requests_file(rows: &[&str]) -> NamedTempFile {
    write_csv(REQUEST_HEADER, rows)
}

pub fn write_csv(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{header}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub struct Harness {
    pub coordinator: EnrollmentCoordinator,
    pub users: InMemoryUserStore,
    pub gateway: SimulatedGateway,
}

/// Coordinator over in-memory stores with `students` registered and a
/// paid course `paid-1` priced at `price`.
pub async fn harness(price: Decimal, students: &[&str]) -> Harness {
    let users = InMemoryUserStore::new();
    let catalog = InMemoryCourseCatalog::new();
    let gateway = SimulatedGateway::new();

    catalog
        .store(Course::free("free-1", "Intro", UserId::from("teacher")))
        .await
        .unwrap();
    catalog
        .store(Course::paid(
            "paid-1",
            "Paid",
            Price::new(price).unwrap(),
            UserId::from("teacher"),
            "acct_teacher",
        ))
        .await
        .unwrap();
    for student in students {
        users.store(User::new(*student)).await.unwrap();
    }

    let coordinator = EnrollmentCoordinator::new(
        Box::new(users.clone()),
        Box::new(catalog),
        Box::new(gateway.clone()),
        EnrollmentConfig::default(),
    );
    Harness {
        coordinator,
        users,
        gateway,
    }
}
