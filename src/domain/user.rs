use super::ids::{CourseId, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The authenticated caller of an enrollment or progress operation.
///
/// Authentication happens upstream; this value is trusted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: UserId,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// The checkout a user has opened and not yet confirmed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PendingCheckout {
    pub session_id: SessionId,
    pub course_id: CourseId,
}

/// Result of a conditional checkout completion on the user store.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CheckoutGrant {
    /// The course was granted and the pending checkout cleared.
    Granted,
    /// The stored pending checkout no longer names the session; nothing changed.
    Stale,
}

/// A user as seen by the enrollment core.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: UserId,
    /// Courses the user has access to.
    pub courses: BTreeSet<CourseId>,
    /// At most one in-flight paid enrollment is tracked.
    pub pending_checkout: Option<PendingCheckout>,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            courses: BTreeSet::new(),
            pending_checkout: None,
        }
    }

    pub fn is_enrolled(&self, course_id: &CourseId) -> bool {
        self.courses.contains(course_id)
    }

    /// Adds the course with set semantics. Returns `false` if it was already there.
    pub fn enroll(&mut self, course_id: CourseId) -> bool {
        self.courses.insert(course_id)
    }

    /// Replaces any earlier pending checkout.
    pub fn begin_checkout(&mut self, pending: PendingCheckout) -> Option<PendingCheckout> {
        self.pending_checkout.replace(pending)
    }

    /// Grants the course and clears the pending checkout in one step, but only
    /// while the pending checkout still names `session_id`.
    pub fn complete_checkout(
        &mut self,
        session_id: &SessionId,
        course_id: &CourseId,
    ) -> CheckoutGrant {
        match &self.pending_checkout {
            Some(pending)
                if &pending.session_id == session_id && &pending.course_id == course_id =>
            {
                self.courses.insert(course_id.clone());
                self.pending_checkout = None;
                CheckoutGrant::Granted
            }
            _ => CheckoutGrant::Stale,
        }
    }
}
