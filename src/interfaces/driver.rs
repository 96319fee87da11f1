use crate::application::enrollment::{ConfirmOutcome, EnrollmentCoordinator};
use crate::application::progress::ProgressTracker;
use crate::domain::checkout::SessionStatus;
use crate::domain::user::{CallerIdentity, User};
use crate::error::{EnrollmentError, Result};
use crate::infrastructure::simulated_gateway::SimulatedGateway;
use crate::interfaces::csv::report_writer::{ReportRow, ReportStatus};
use crate::interfaces::csv::request_reader::{Action, Request};
use tracing::info;

/// Replays request rows against the coordinator and the progress tracker.
///
/// Callers are registered on first appearance, standing in for the identity
/// provider. `settle` and `expire` rows only work with a simulated gateway.
pub struct RequestDriver {
    coordinator: EnrollmentCoordinator,
    tracker: ProgressTracker,
    simulated: Option<SimulatedGateway>,
}

impl RequestDriver {
    pub fn new(
        coordinator: EnrollmentCoordinator,
        tracker: ProgressTracker,
        simulated: Option<SimulatedGateway>,
    ) -> Self {
        Self {
            coordinator,
            tracker,
            simulated,
        }
    }

    pub async fn handle(&self, request: &Request) -> Result<()> {
        let caller = CallerIdentity::new(request.user.clone());
        self.register(&caller).await?;
        let course = &request.course;

        match request.action {
            Action::Check => {
                let status = self.coordinator.check_enrollment(&caller, course).await?;
                info!(user = %caller.user_id, course = %course, enrolled = status.enrolled, "checked");
            }
            Action::Enroll => {
                self.coordinator.enroll_free(&caller, course).await?;
            }
            Action::Checkout => {
                self.coordinator.begin_paid_enrollment(&caller, course).await?;
            }
            Action::Settle => self.settle(&caller, SessionStatus::Paid).await?,
            Action::Expire => self.settle(&caller, SessionStatus::Expired).await?,
            Action::Confirm => {
                match self.coordinator.confirm_paid_enrollment(&caller, course).await? {
                    ConfirmOutcome::GatewayUnavailable { reason } => {
                        return Err(EnrollmentError::Gateway(format!(
                            "checkout still pending: {reason}"
                        )));
                    }
                    ConfirmOutcome::NotYetPaid { status } => {
                        info!(user = %caller.user_id, course = %course, ?status, "not yet paid");
                    }
                    ConfirmOutcome::Enrolled(_) | ConfirmOutcome::AlreadyEnrolled(_) => {}
                }
            }
            Action::Complete => {
                let lesson = request.require_lesson()?.clone();
                self.tracker.mark_completed(&caller, course, lesson).await?;
            }
            Action::Incomplete => {
                let lesson = request.require_lesson()?;
                self.tracker.mark_incomplete(&caller, course, lesson).await?;
            }
        }
        Ok(())
    }

    /// One row per enrolled course and per outstanding checkout, by user id.
    pub async fn report(&self) -> Result<Vec<ReportRow>> {
        let mut rows = Vec::new();
        for user in self.coordinator.users().get_all().await? {
            let caller = CallerIdentity::new(user.id.clone());
            for course in &user.courses {
                let completed = self.tracker.list_completed(&caller, course).await?.len();
                rows.push(ReportRow {
                    user: user.id.clone(),
                    course: course.clone(),
                    status: ReportStatus::Enrolled,
                    completed,
                });
            }
            if let Some(pending) = &user.pending_checkout {
                rows.push(ReportRow {
                    user: user.id.clone(),
                    course: pending.course_id.clone(),
                    status: ReportStatus::Pending,
                    completed: 0,
                });
            }
        }
        Ok(rows)
    }

    async fn register(&self, caller: &CallerIdentity) -> Result<()> {
        let users = self.coordinator.users();
        if users.get(&caller.user_id).await?.is_none() {
            users.store(User::new(caller.user_id.clone())).await?;
        }
        Ok(())
    }

    async fn settle(&self, caller: &CallerIdentity, status: SessionStatus) -> Result<()> {
        let gateway = self.simulated.as_ref().ok_or_else(|| {
            EnrollmentError::InvalidState(
                "settling checkouts needs the simulated gateway".to_string(),
            )
        })?;
        let pending = self
            .coordinator
            .users()
            .get(&caller.user_id)
            .await?
            .and_then(|user| user.pending_checkout)
            .ok_or_else(|| {
                EnrollmentError::NotFound(format!("User {} has no pending checkout", caller.user_id))
            })?;
        gateway.settle(&pending.session_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnrollmentConfig;
    use crate::domain::course::Course;
    use crate::domain::ids::{CourseId, LessonId, UserId};
    use crate::domain::money::Price;
    use crate::domain::ports::CourseCatalog;
    use crate::infrastructure::in_memory::{
        InMemoryCompletionStore, InMemoryCourseCatalog, InMemoryUserStore,
    };
    use rust_decimal_macros::dec;

    async fn driver() -> RequestDriver {
        let catalog = InMemoryCourseCatalog::new();
        catalog
            .store(Course::free("free", "Intro", UserId::from("t")))
            .await
            .unwrap();
        catalog
            .store(Course::paid(
                "paid",
                "Pro",
                Price::new(dec!(50.00)).unwrap(),
                UserId::from("t"),
                "acct_t",
            ))
            .await
            .unwrap();
        let gateway = SimulatedGateway::new();
        let coordinator = EnrollmentCoordinator::new(
            Box::new(InMemoryUserStore::new()),
            Box::new(catalog),
            Box::new(gateway.clone()),
            EnrollmentConfig::default(),
        );
        let tracker = ProgressTracker::new(Box::new(InMemoryCompletionStore::new()));
        RequestDriver::new(coordinator, tracker, Some(gateway))
    }

    fn request(action: Action, user: &str, course: &str, lesson: Option<&str>) -> Request {
        Request {
            action,
            user: UserId::from(user),
            course: CourseId::from(course),
            lesson: lesson.map(LessonId::from),
        }
    }

    #[tokio::test]
    async fn test_paid_flow_through_driver() {
        let driver = driver().await;
        driver
            .handle(&request(Action::Checkout, "u1", "paid", None))
            .await
            .unwrap();
        let rows = driver.report().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ReportStatus::Pending);

        driver
            .handle(&request(Action::Settle, "u1", "paid", None))
            .await
            .unwrap();
        driver
            .handle(&request(Action::Confirm, "u1", "paid", None))
            .await
            .unwrap();
        driver
            .handle(&request(Action::Complete, "u1", "paid", Some("l1")))
            .await
            .unwrap();

        let rows = driver.report().await.unwrap();
        assert_eq!(
            rows,
            vec![ReportRow {
                user: UserId::from("u1"),
                course: CourseId::from("paid"),
                status: ReportStatus::Enrolled,
                completed: 1,
            }]
        );
    }

    #[tokio::test]
    async fn test_progress_rows_need_lesson() {
        let driver = driver().await;
        let result = driver
            .handle(&request(Action::Complete, "u1", "free", None))
            .await;
        assert!(matches!(result, Err(EnrollmentError::Validation(_))));
    }

    #[tokio::test]
    async fn test_settle_without_pending_checkout() {
        let driver = driver().await;
        let result = driver
            .handle(&request(Action::Settle, "u1", "paid", None))
            .await;
        assert!(matches!(result, Err(EnrollmentError::NotFound(_))));
    }
}
