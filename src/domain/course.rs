use super::ids::{CourseId, UserId};
use super::money::Price;
use crate::error::EnrollmentError;
use serde::{Deserialize, Serialize};

/// A catalog entry as seen by the enrollment core.
///
/// Only the fields needed to pick an enrollment path and split a payment are
/// carried here; lessons, media and publishing state live with the catalog.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Only meaningful when `paid` is set.
    pub price: Price,
    pub paid: bool,
    pub instructor: UserId,
    /// Payout account of the instructor at the payment processor.
    pub payout_account: Option<String>,
}

/// Validated pricing of a paid course, ready to be turned into a checkout.
#[derive(Debug, PartialEq, Clone)]
pub struct PaidTerms<'a> {
    pub price: Price,
    pub payout_account: &'a str,
}

impl Course {
    pub fn free(id: impl Into<CourseId>, name: impl Into<String>, instructor: UserId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: Price::ZERO,
            paid: false,
            instructor,
            payout_account: None,
        }
    }

    pub fn paid(
        id: impl Into<CourseId>,
        name: impl Into<String>,
        price: Price,
        instructor: UserId,
        payout_account: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            paid: true,
            instructor,
            payout_account: Some(payout_account.into()),
        }
    }

    /// Returns the price and payout destination of a paid course.
    ///
    /// A free course is an `InvalidState`; a paid course without a positive
    /// price or without a payout account is a `Configuration` error.
    pub fn paid_terms(&self) -> Result<PaidTerms<'_>, EnrollmentError> {
        if !self.paid {
            return Err(EnrollmentError::InvalidState(format!(
                "Course {} is free",
                self.id
            )));
        }
        if !self.price.is_positive() {
            return Err(EnrollmentError::Configuration(format!(
                "Paid course {} has no positive price",
                self.id
            )));
        }
        let payout_account = self
            .payout_account
            .as_deref()
            .filter(|account| !account.trim().is_empty())
            .ok_or_else(|| {
                EnrollmentError::Configuration(format!(
                    "Instructor {} of course {} has no payout account",
                    self.instructor, self.id
                ))
            })?;
        Ok(PaidTerms {
            price: self.price,
            payout_account,
        })
    }
}
