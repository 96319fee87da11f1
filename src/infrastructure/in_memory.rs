use crate::domain::course::Course;
use crate::domain::ids::{CourseId, LessonId, SessionId, UserId};
use crate::domain::ports::{CompletionStore, CourseCatalog, UserStore};
use crate::domain::progress::{CompletionChange, CompletionRecord};
use crate::domain::user::{CheckoutGrant, PendingCheckout, User};
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for users.
///
/// Uses `Arc<RwLock<HashMap<UserId, User>>>` to allow shared concurrent access.
/// Every mutation runs under a single write guard, which makes the combined
/// grant-and-clear of a checkout atomic.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    /// Creates a new, empty in-memory user store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<T>(&self, user_id: &UserId, f: impl FnOnce(&mut User) -> T) -> Result<T> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| EnrollmentError::NotFound(format!("User {user_id}")))?;
        Ok(f(user))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn add_course(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool> {
        self.update(user_id, |user| user.enroll(course_id.clone()))
            .await
    }

    async fn set_pending_checkout(&self, user_id: &UserId, pending: PendingCheckout) -> Result<()> {
        self.update(user_id, |user| {
            user.begin_checkout(pending);
        })
        .await
    }

    async fn complete_checkout(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        course_id: &CourseId,
    ) -> Result<CheckoutGrant> {
        self.update(user_id, |user| user.complete_checkout(session_id, course_id))
            .await
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

/// In-memory course catalog, ordered by course id.
#[derive(Default, Clone)]
pub struct InMemoryCourseCatalog {
    courses: Arc<RwLock<BTreeMap<CourseId, Course>>>,
}

impl InMemoryCourseCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn store(&self, course: Course) -> Result<()> {
        let mut courses = self.courses.write().await;
        courses.insert(course.id.clone(), course);
        Ok(())
    }

    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(course_id).cloned())
    }

    async fn get_many(&self, course_ids: &[CourseId]) -> Result<Vec<Course>> {
        let courses = self.courses.read().await;
        let mut found: Vec<Course> = course_ids
            .iter()
            .filter_map(|id| courses.get(id).cloned())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found.dedup_by(|a, b| a.id == b.id);
        Ok(found)
    }
}

/// In-memory completion records keyed by (user, course).
#[derive(Default, Clone)]
pub struct InMemoryCompletionStore {
    records: Arc<RwLock<HashMap<(UserId, CourseId), CompletionRecord>>>,
}

impl InMemoryCompletionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionStore for InMemoryCompletionStore {
    async fn get(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<CompletionRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(user_id.clone(), course_id.clone()))
            .cloned())
    }

    async fn mark(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        lesson_id: LessonId,
    ) -> Result<CompletionChange> {
        let mut records = self.records.write().await;
        let record = records
            .entry((user_id.clone(), course_id.clone()))
            .or_insert_with(|| CompletionRecord::new(user_id.clone(), course_id.clone()));
        Ok(record.mark(lesson_id))
    }

    async fn unmark(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<CompletionChange> {
        let mut records = self.records.write().await;
        Ok(records
            .get_mut(&(user_id.clone(), course_id.clone()))
            .map(|record| record.unmark(lesson_id))
            .unwrap_or(CompletionChange::Unchanged))
    }
}
