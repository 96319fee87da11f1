use crate::config::EnrollmentConfig;
use crate::domain::checkout::{CheckoutHandle, CheckoutRequest, SessionStatus};
use crate::domain::course::Course;
use crate::domain::ids::CourseId;
use crate::domain::ports::{CourseCatalogBox, PaymentGatewayBox, UserStoreBox};
use crate::domain::user::{CallerIdentity, CheckoutGrant, PendingCheckout, User};
use crate::error::{EnrollmentError, Result};
use tracing::{debug, info, warn};

/// Enrollment flag plus the course it refers to.
#[derive(Debug, PartialEq, Clone)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
    pub course: Course,
}

#[derive(Debug, PartialEq, Clone)]
pub enum EnrollOutcome {
    Enrolled(Course),
    /// Re-enrolling is a no-op.
    AlreadyEnrolled(Course),
}

#[derive(Debug, PartialEq, Clone)]
pub enum ConfirmOutcome {
    /// Payment confirmed; the course was granted by this call.
    Enrolled(Course),
    /// Nothing left to confirm and the course is already granted.
    AlreadyEnrolled(Course),
    /// The gateway reports the session as not (yet) paid.
    NotYetPaid { status: SessionStatus },
    /// The gateway could not be asked; the checkout stays pending.
    GatewayUnavailable { reason: String },
}

impl ConfirmOutcome {
    pub fn is_enrolled(&self) -> bool {
        matches!(
            self,
            ConfirmOutcome::Enrolled(_) | ConfirmOutcome::AlreadyEnrolled(_)
        )
    }
}

/// Drives free and paid enrollment for authenticated callers.
///
/// Paid enrollment is a two-step, pull-based flow: `begin_paid_enrollment`
/// opens a hosted checkout and remembers it on the user, and
/// `confirm_paid_enrollment` asks the gateway whether it was paid. Both steps
/// are safe to repeat.
pub struct EnrollmentCoordinator {
    users: UserStoreBox,
    catalog: CourseCatalogBox,
    gateway: PaymentGatewayBox,
    config: EnrollmentConfig,
}

impl EnrollmentCoordinator {
    /// Creates a new `EnrollmentCoordinator`.
    ///
    /// # Arguments
    ///
    /// * `users` - The store for user enrollment state.
    /// * `catalog` - The course catalog.
    /// * `gateway` - The payment processor used for paid courses.
    /// * `config` - Fee rate, currency and redirect targets.
    pub fn new(
        users: UserStoreBox,
        catalog: CourseCatalogBox,
        gateway: PaymentGatewayBox,
        config: EnrollmentConfig,
    ) -> Self {
        Self {
            users,
            catalog,
            gateway,
            config,
        }
    }

    pub fn users(&self) -> &UserStoreBox {
        &self.users
    }

    pub async fn check_enrollment(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
    ) -> Result<EnrollmentStatus> {
        let user = self.load_user(caller).await?;
        let course = self.load_course(course_id).await?;
        Ok(EnrollmentStatus {
            enrolled: user.is_enrolled(course_id),
            course,
        })
    }

    pub async fn enroll_free(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
    ) -> Result<EnrollOutcome> {
        let course = self.load_course(course_id).await?;
        if course.paid {
            return Err(EnrollmentError::InvalidState(format!(
                "Course {} requires payment",
                course.id
            )));
        }

        if self.users.add_course(&caller.user_id, course_id).await? {
            info!(user = %caller.user_id, course = %course_id, "free enrollment granted");
            Ok(EnrollOutcome::Enrolled(course))
        } else {
            debug!(user = %caller.user_id, course = %course_id, "already enrolled");
            Ok(EnrollOutcome::AlreadyEnrolled(course))
        }
    }

    /// Opens a hosted checkout for a paid course and records it on the user.
    ///
    /// Any checkout the user had pending is superseded. Nothing is persisted
    /// if the gateway refuses the session.
    pub async fn begin_paid_enrollment(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
    ) -> Result<CheckoutHandle> {
        let user = self.load_user(caller).await?;
        let course = self.load_course(course_id).await?;
        let terms = course.paid_terms()?;
        if user.is_enrolled(course_id) {
            return Err(EnrollmentError::InvalidState(format!(
                "User {} already owns course {}",
                user.id, course.id
            )));
        }

        let amount = terms.price.to_minor_units()?;
        let fee = terms.price.fee(self.config.fee_rate)?.to_minor_units()?;
        let request = CheckoutRequest {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            amount,
            fee,
            currency: self.config.currency.clone(),
            destination: terms.payout_account.to_string(),
            success_url: self.config.success_url_for(course_id),
            cancel_url: self.config.cancel_url.clone(),
        };

        let session = self.gateway.create_session(request).await?;
        let handle = CheckoutHandle::from(&session);
        self.users
            .set_pending_checkout(
                &caller.user_id,
                PendingCheckout {
                    session_id: session.id,
                    course_id: course_id.clone(),
                },
            )
            .await?;

        info!(
            user = %caller.user_id,
            course = %course_id,
            session = %handle.session_id,
            %amount,
            %fee,
            payout = %(amount - fee),
            "checkout opened"
        );
        Ok(handle)
    }

    /// Pulls the pending checkout's status and grants the course once paid.
    pub async fn confirm_paid_enrollment(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
    ) -> Result<ConfirmOutcome> {
        let user = self.load_user(caller).await?;
        let course = self.load_course(course_id).await?;

        if user.is_enrolled(course_id) {
            debug!(user = %user.id, course = %course_id, "confirm replayed after grant");
            return Ok(ConfirmOutcome::AlreadyEnrolled(course));
        }
        let Some(pending) = user.pending_checkout.clone() else {
            return Err(EnrollmentError::NotFound(format!(
                "User {} has no pending checkout",
                user.id
            )));
        };
        if &pending.course_id != course_id {
            return Err(EnrollmentError::InvalidState(format!(
                "Pending checkout of user {} is for course {}, not {}",
                user.id, pending.course_id, course_id
            )));
        }

        let session = match self.gateway.retrieve_session(&pending.session_id).await {
            Ok(session) => session,
            Err(err) => {
                warn!(
                    user = %user.id,
                    session = %pending.session_id,
                    "checkout status unavailable: {err}"
                );
                return Ok(ConfirmOutcome::GatewayUnavailable {
                    reason: err.to_string(),
                });
            }
        };
        if !session.status.is_paid() {
            debug!(session = %session.id, status = ?session.status, "checkout not paid");
            return Ok(ConfirmOutcome::NotYetPaid {
                status: session.status,
            });
        }

        match self
            .users
            .complete_checkout(&user.id, &pending.session_id, course_id)
            .await?
        {
            CheckoutGrant::Granted => {
                info!(
                    user = %user.id,
                    course = %course_id,
                    session = %pending.session_id,
                    "paid enrollment granted"
                );
                Ok(ConfirmOutcome::Enrolled(course))
            }
            CheckoutGrant::Stale => self.resolve_stale_confirm(caller, course).await,
        }
    }

    /// The caller's enrolled courses, in catalog order.
    pub async fn enrolled_courses(&self, caller: &CallerIdentity) -> Result<Vec<Course>> {
        let user = self.load_user(caller).await?;
        let ids: Vec<CourseId> = user.courses.into_iter().collect();
        self.catalog.get_many(&ids).await
    }

    /// A concurrent confirm or a new checkout replaced the pending reference
    /// between our read and the conditional update.
    async fn resolve_stale_confirm(
        &self,
        caller: &CallerIdentity,
        course: Course,
    ) -> Result<ConfirmOutcome> {
        let user = self.load_user(caller).await?;
        if user.is_enrolled(&course.id) {
            Ok(ConfirmOutcome::AlreadyEnrolled(course))
        } else {
            Err(EnrollmentError::InvalidState(format!(
                "Checkout of user {} was superseded before it could be confirmed",
                user.id
            )))
        }
    }

    async fn load_user(&self, caller: &CallerIdentity) -> Result<User> {
        self.users
            .get(&caller.user_id)
            .await?
            .ok_or_else(|| EnrollmentError::NotFound(format!("User {}", caller.user_id)))
    }

    async fn load_course(&self, course_id: &CourseId) -> Result<Course> {
        self.catalog
            .get(course_id)
            .await?
            .ok_or_else(|| EnrollmentError::NotFound(format!("Course {course_id}")))
    }
}
