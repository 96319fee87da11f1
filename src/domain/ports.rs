use super::checkout::{CheckoutRequest, CheckoutSession};
use super::course::Course;
use super::ids::{CourseId, LessonId, SessionId, UserId};
use super::progress::{CompletionChange, CompletionRecord};
use super::user::{CheckoutGrant, PendingCheckout, User};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence of user enrollment state.
///
/// Every mutating method is a single atomic read-modify-write on one user
/// record, so concurrent free enrollments and checkout confirmations on the
/// same user never lose each other's updates. All of them fail with
/// `NotFound` when the user does not exist.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, user_id: &UserId) -> Result<Option<User>>;
    /// Set-union add. Returns `false` if the course was already present.
    async fn add_course(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool>;
    /// Overwrites any earlier pending checkout.
    async fn set_pending_checkout(
        &self,
        user_id: &UserId,
        pending: PendingCheckout,
    ) -> Result<()>;
    /// Adds the course and clears the pending checkout together, only if the
    /// stored pending checkout still names `session_id` for `course_id`.
    async fn complete_checkout(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        course_id: &CourseId,
    ) -> Result<CheckoutGrant>;
    async fn get_all(&self) -> Result<Vec<User>>;
}

/// Read access to the course catalog.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn store(&self, course: Course) -> Result<()>;
    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>>;
    /// Courses among `course_ids` that exist, in id order.
    async fn get_many(&self, course_ids: &[CourseId]) -> Result<Vec<Course>>;
}

/// Per (user, course) lesson completion records.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    async fn get(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<CompletionRecord>>;
    /// Creates the record on first use.
    async fn mark(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        lesson_id: LessonId,
    ) -> Result<CompletionChange>;
    async fn unmark(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<CompletionChange>;
}

/// Hosted checkout at an external payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession>;
    async fn retrieve_session(&self, session_id: &SessionId) -> Result<CheckoutSession>;
}

pub type UserStoreBox = Box<dyn UserStore>;
pub type CourseCatalogBox = Box<dyn CourseCatalog>;
pub type CompletionStoreBox = Box<dyn CompletionStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type UserStoreFactory = Box<dyn Fn() -> UserStoreBox + Send + Sync>;
