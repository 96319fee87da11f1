use super::ids::{CourseId, SessionId};
use super::money::MinorUnits;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Paid,
    Expired,
}

impl SessionStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, SessionStatus::Paid)
    }
}

/// Everything the gateway needs to open a hosted checkout for one course.
#[derive(Debug, PartialEq, Clone)]
pub struct CheckoutRequest {
    pub course_id: CourseId,
    pub course_name: String,
    /// Total charged to the buyer.
    pub amount: MinorUnits,
    /// Platform share withheld from the instructor transfer.
    pub fee: MinorUnits,
    pub currency: String,
    /// Instructor payout account receiving `amount - fee`.
    pub destination: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// A checkout session as reported by the gateway.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CheckoutSession {
    pub id: SessionId,
    pub status: SessionStatus,
    pub amount: MinorUnits,
    pub fee: MinorUnits,
    pub destination: String,
    /// Hosted checkout page the client is redirected to.
    pub url: Option<String>,
}

/// What the caller gets back after opening a checkout.
#[derive(Debug, PartialEq, Clone)]
pub struct CheckoutHandle {
    pub session_id: SessionId,
    pub url: Option<String>,
}

impl From<&CheckoutSession> for CheckoutHandle {
    fn from(session: &CheckoutSession) -> Self {
        Self {
            session_id: session.id.clone(),
            url: session.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Expired).unwrap(),
            "\"expired\""
        );
        assert!(SessionStatus::Paid.is_paid());
        assert!(!SessionStatus::Open.is_paid());
    }
}
