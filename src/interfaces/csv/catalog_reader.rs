use crate::domain::course::Course;
use crate::domain::ids::{CourseId, UserId};
use crate::domain::money::Price;
use crate::error::{EnrollmentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CourseRow {
    id: CourseId,
    name: String,
    price: Decimal,
    paid: bool,
    instructor: UserId,
    payout_account: Option<String>,
}

impl TryFrom<CourseRow> for Course {
    type Error = EnrollmentError;

    fn try_from(row: CourseRow) -> Result<Self> {
        Ok(Course {
            id: row.id,
            name: row.name,
            price: Price::new(row.price)?,
            paid: row.paid,
            instructor: row.instructor,
            payout_account: row.payout_account.filter(|account| !account.is_empty()),
        })
    }
}

/// Reads catalog entries (`id, name, price, paid, instructor, payout_account`)
/// from a CSV source.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn courses(self) -> impl Iterator<Item = Result<Course>> {
        self.reader
            .into_deserialize::<CourseRow>()
            .map(|result| result.map_err(EnrollmentError::from).and_then(Course::try_from))
    }
}
