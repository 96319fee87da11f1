use crate::domain::ids::CourseId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

pub const DEFAULT_FEE_RATE: Decimal = dec!(0.30);
pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_SUCCESS_URL: &str = "http://localhost:3000/stripe/success";
pub const DEFAULT_CANCEL_URL: &str = "http://localhost:3000/stripe/cancel";

/// Settings for paid enrollments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    /// Platform share of every paid enrollment, as a fraction of the price.
    pub fee_rate: Decimal,
    /// ISO currency code sent to the gateway.
    pub currency: String,
    /// Base redirect after payment; the course id is appended.
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            currency: DEFAULT_CURRENCY.to_string(),
            success_url: DEFAULT_SUCCESS_URL.to_string(),
            cancel_url: DEFAULT_CANCEL_URL.to_string(),
        }
    }
}

impl EnrollmentConfig {
    pub fn success_url_for(&self, course_id: &CourseId) -> String {
        format!("{}/{}", self.success_url.trim_end_matches('/'), course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnrollmentConfig::default();
        assert_eq!(config.fee_rate, dec!(0.30));
        assert_eq!(config.currency, "usd");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EnrollmentConfig =
            serde_json::from_str(r#"{"currency": "eur", "success_url": "https://x.test/ok/"}"#)
                .unwrap();
        assert_eq!(config.currency, "eur");
        assert_eq!(config.fee_rate, DEFAULT_FEE_RATE);
        assert_eq!(
            config.success_url_for(&CourseId::from("c1")),
            "https://x.test/ok/c1"
        );
    }
}
