use super::ids::{CourseId, LessonId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a mark/unmark call did to a completion record.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CompletionChange {
    Added,
    Removed,
    /// The lesson was already in the requested state.
    Unchanged,
}

/// Lessons a user has completed in one course.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CompletionRecord {
    pub user: UserId,
    pub course: CourseId,
    pub lessons: BTreeSet<LessonId>,
}

impl CompletionRecord {
    pub fn new(user: UserId, course: CourseId) -> Self {
        Self {
            user,
            course,
            lessons: BTreeSet::new(),
        }
    }

    pub fn mark(&mut self, lesson: LessonId) -> CompletionChange {
        if self.lessons.insert(lesson) {
            CompletionChange::Added
        } else {
            CompletionChange::Unchanged
        }
    }

    pub fn unmark(&mut self, lesson: &LessonId) -> CompletionChange {
        if self.lessons.remove(lesson) {
            CompletionChange::Removed
        } else {
            CompletionChange::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_unmark() {
        let mut record = CompletionRecord::new(UserId::from("u1"), CourseId::from("c1"));
        assert_eq!(record.mark(LessonId::from("l1")), CompletionChange::Added);
        assert_eq!(record.mark(LessonId::from("l1")), CompletionChange::Unchanged);
        assert_eq!(record.lessons.len(), 1);

        assert_eq!(record.unmark(&LessonId::from("l2")), CompletionChange::Unchanged);
        assert_eq!(record.unmark(&LessonId::from("l1")), CompletionChange::Removed);
        assert!(record.lessons.is_empty());
    }
}
