use crate::domain::ids::{CourseId, UserId};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Enrolled,
    Pending,
}

/// One output line: a user's standing in one course.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct ReportRow {
    pub user: UserId,
    pub course: CourseId,
    pub status: ReportStatus,
    /// Completed lesson count.
    pub completed: usize,
}

/// Writes the final enrollment report as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_rows(&mut self, rows: impl IntoIterator<Item = ReportRow>) -> Result<()> {
        let mut empty = true;
        for row in rows {
            self.writer.serialize(row)?;
            empty = false;
        }
        if empty {
            self.writer
                .write_record(["user", "course", "status", "completed"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
