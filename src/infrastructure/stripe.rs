//! Reqwest-backed Stripe Checkout adapter.
//!
//! This adapter owns transport details only: form serialisation of the
//! checkout request, bearer authentication, timeout and HTTP error mapping,
//! and JSON decoding of sessions into domain values.

use crate::domain::checkout::{CheckoutRequest, CheckoutSession, SessionStatus};
use crate::domain::ids::SessionId;
use crate::domain::money::MinorUnits;
use crate::domain::ports::PaymentGateway;
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const METADATA_COURSE: &str = "course_id";
const METADATA_FEE: &str = "application_fee_amount";
const METADATA_DESTINATION: &str = "destination";

/// Checkout session payload as returned by `/v1/checkout/sessions`.
#[derive(Debug, Deserialize)]
struct SessionDto {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    amount_total: Option<i64>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorDto,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    message: Option<String>,
}

/// Payment gateway talking to the Stripe REST API.
///
/// Sessions are created with a destination charge: the buyer pays the full
/// amount, the instructor's connected account receives it minus the
/// application fee.
pub struct StripeCheckoutGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeCheckoutGateway {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        secret_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.api_base)
    }

    async fn read_session(response: reqwest::Response) -> Result<CheckoutSession> {
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_session(body.as_ref())
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckoutGateway {
    async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        let form = build_session_form(&request);
        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_session(response).await
    }

    async fn retrieve_session(&self, session_id: &SessionId) -> Result<CheckoutSession> {
        let response = self
            .client
            .get(format!("{}/{}", self.sessions_url(), session_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_session(response).await
    }
}

fn build_session_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "line_items[0][price_data][currency]",
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount.0.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.course_name.clone(),
        ),
        (
            "payment_intent_data[application_fee_amount]",
            request.fee.0.to_string(),
        ),
        (
            "payment_intent_data[transfer_data][destination]",
            request.destination.clone(),
        ),
        ("metadata[course_id]", request.course_id.to_string()),
        ("metadata[application_fee_amount]", request.fee.0.to_string()),
        ("metadata[destination]", request.destination.clone()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
    ]
}

fn parse_session(body: &[u8]) -> Result<CheckoutSession> {
    let dto: SessionDto = serde_json::from_slice(body).map_err(|error| {
        EnrollmentError::Gateway(format!("invalid checkout session payload: {error}"))
    })?;

    let status = map_session_status(dto.status.as_deref(), dto.payment_status.as_deref());
    let fee = dto
        .metadata
        .get(METADATA_FEE)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or_default();
    let destination = dto
        .metadata
        .get(METADATA_DESTINATION)
        .cloned()
        .unwrap_or_default();
    if !dto.metadata.contains_key(METADATA_COURSE) {
        tracing::debug!(session = %dto.id, "checkout session carries no course metadata");
    }

    Ok(CheckoutSession {
        id: SessionId::new(dto.id),
        status,
        amount: MinorUnits(dto.amount_total.unwrap_or_default()),
        fee: MinorUnits(fee),
        destination,
        url: dto.url,
    })
}

fn map_session_status(status: Option<&str>, payment_status: Option<&str>) -> SessionStatus {
    match (status, payment_status) {
        (_, Some("paid")) => SessionStatus::Paid,
        (Some("expired"), _) => SessionStatus::Expired,
        _ => SessionStatus::Open,
    }
}

fn map_transport_error(error: reqwest::Error) -> EnrollmentError {
    if error.is_timeout() {
        EnrollmentError::Gateway(format!("timed out: {error}"))
    } else {
        EnrollmentError::Gateway(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EnrollmentError {
    let detail = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body_preview(body));
    if detail.is_empty() {
        EnrollmentError::Gateway(format!("status {}", status.as_u16()))
    } else {
        EnrollmentError::Gateway(format!("status {}: {}", status.as_u16(), detail))
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
