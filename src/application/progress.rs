use crate::domain::ids::{CourseId, LessonId};
use crate::domain::ports::CompletionStoreBox;
use crate::domain::progress::CompletionChange;
use crate::domain::user::CallerIdentity;
use crate::error::Result;
use std::collections::BTreeSet;
use tracing::debug;

/// Records which lessons a caller has completed in each course.
pub struct ProgressTracker {
    completions: CompletionStoreBox,
}

impl ProgressTracker {
    pub fn new(completions: CompletionStoreBox) -> Self {
        Self { completions }
    }

    pub async fn mark_completed(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
        lesson_id: LessonId,
    ) -> Result<CompletionChange> {
        let change = self
            .completions
            .mark(&caller.user_id, course_id, lesson_id)
            .await?;
        debug!(user = %caller.user_id, course = %course_id, ?change, "lesson completed");
        Ok(change)
    }

    pub async fn mark_incomplete(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<CompletionChange> {
        let change = self
            .completions
            .unmark(&caller.user_id, course_id, lesson_id)
            .await?;
        debug!(user = %caller.user_id, course = %course_id, ?change, "lesson reopened");
        Ok(change)
    }

    /// Empty when the caller never completed anything in the course.
    pub async fn list_completed(
        &self,
        caller: &CallerIdentity,
        course_id: &CourseId,
    ) -> Result<BTreeSet<LessonId>> {
        Ok(self
            .completions
            .get(&caller.user_id, course_id)
            .await?
            .map(|record| record.lessons)
            .unwrap_or_default())
    }
}
