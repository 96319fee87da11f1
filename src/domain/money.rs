use crate::error::EnrollmentError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// Number of decimal places kept for prices before conversion to minor units.
const PRICE_SCALE: u32 = 2;

/// A course price in major currency units (e.g. dollars).
///
/// This is a wrapper around `rust_decimal::Decimal` that rejects negative values,
/// so that a price read from the catalog can be trusted by fee calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(Decimal);

/// An amount in the currency's minor unit (e.g. cents), as sent to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinorUnits(pub i64);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, EnrollmentError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EnrollmentError::Validation(
                "Price must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Rounds to cents, halves away from zero.
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Platform share of this price at `rate`, rounded to cents.
    pub fn fee(&self, rate: Decimal) -> Result<Self, EnrollmentError> {
        self.0
            .checked_mul(rate)
            .map(|fee| Self(fee).rounded())
            .ok_or_else(|| {
                EnrollmentError::Validation(format!("Fee on price {} overflows", self.0))
            })
    }

    pub fn to_minor_units(&self) -> Result<MinorUnits, EnrollmentError> {
        self.rounded()
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.to_i64())
            .map(MinorUnits)
            .ok_or_else(|| {
                EnrollmentError::Validation(format!(
                    "Price {} does not fit in minor units",
                    self.0
                ))
            })
    }
}

impl TryFrom<Decimal> for Price {
    type Error = EnrollmentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sub for MinorUnits {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
