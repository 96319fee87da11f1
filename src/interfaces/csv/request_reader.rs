use crate::domain::ids::{CourseId, LessonId, UserId};
use crate::error::{EnrollmentError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Report whether the user is enrolled.
    Check,
    /// Free enrollment.
    Enroll,
    /// Open a paid checkout.
    Checkout,
    /// Mark the user's pending checkout paid at the simulated gateway.
    Settle,
    /// Let the user's pending checkout expire at the simulated gateway.
    Expire,
    /// Confirm a paid checkout.
    Confirm,
    Complete,
    Incomplete,
}

/// One row of the request script.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Request {
    pub action: Action,
    pub user: UserId,
    pub course: CourseId,
    pub lesson: Option<LessonId>,
}

impl Request {
    /// The lesson column, required by progress actions.
    pub fn require_lesson(&self) -> Result<&LessonId> {
        self.lesson.as_ref().ok_or_else(|| {
            EnrollmentError::Validation(format!("{:?} request needs a lesson", self.action))
        })
    }
}

/// Reads enrollment requests from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Request>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EnrollmentError::from))
    }
}
