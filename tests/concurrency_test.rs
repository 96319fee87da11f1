use courseway::application::enrollment::ConfirmOutcome;
use courseway::domain::checkout::SessionStatus;
use courseway::domain::ids::{CourseId, UserId};
use courseway::domain::ports::UserStore;
use courseway::domain::user::CallerIdentity;
use rust_decimal_macros::dec;
use std::sync::Arc;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirms_grant_once() {
    let harness = common::harness(dec!(50.00), &["bob"]).await;
    let caller = CallerIdentity::new("bob");
    let course = CourseId::from("paid-1");

    let handle = harness
        .coordinator
        .begin_paid_enrollment(&caller, &course)
        .await
        .unwrap();
    harness
        .gateway
        .settle(&handle.session_id, SessionStatus::Paid)
        .await
        .unwrap();

    let coordinator = Arc::new(harness.coordinator);
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let coordinator = Arc::clone(&coordinator);
        let caller = caller.clone();
        let course = course.clone();
        tasks.push(tokio::spawn(async move {
            coordinator.confirm_paid_enrollment(&caller, &course).await
        }));
    }

    let mut granted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(ConfirmOutcome::Enrolled(_)) => granted += 1,
            Ok(ConfirmOutcome::AlreadyEnrolled(_)) => {}
            other => panic!("unexpected confirm result: {other:?}"),
        }
    }
    assert_eq!(granted, 1);

    let user = harness.users.get(&UserId::from("bob")).await.unwrap().unwrap();
    assert_eq!(user.courses.len(), 1);
    assert!(user.pending_checkout.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_free_enrollment_and_confirm_do_not_lose_updates() {
    let harness = common::harness(dec!(50.00), &["bob"]).await;
    let caller = CallerIdentity::new("bob");

    let handle = harness
        .coordinator
        .begin_paid_enrollment(&caller, &CourseId::from("paid-1"))
        .await
        .unwrap();
    harness
        .gateway
        .settle(&handle.session_id, SessionStatus::Paid)
        .await
        .unwrap();

    let coordinator = Arc::new(harness.coordinator);
    let free = {
        let coordinator = Arc::clone(&coordinator);
        let caller = caller.clone();
        tokio::spawn(async move {
            coordinator
                .enroll_free(&caller, &CourseId::from("free-1"))
                .await
        })
    };
    let paid = {
        let coordinator = Arc::clone(&coordinator);
        let caller = caller.clone();
        tokio::spawn(async move {
            coordinator
                .confirm_paid_enrollment(&caller, &CourseId::from("paid-1"))
                .await
        })
    };
    free.await.unwrap().unwrap();
    paid.await.unwrap().unwrap();

    let user = harness.users.get(&UserId::from("bob")).await.unwrap().unwrap();
    assert!(user.is_enrolled(&CourseId::from("free-1")));
    assert!(user.is_enrolled(&CourseId::from("paid-1")));
    assert!(user.pending_checkout.is_none());
}
