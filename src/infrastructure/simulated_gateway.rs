use crate::domain::checkout::{CheckoutRequest, CheckoutSession, SessionStatus};
use crate::domain::ids::SessionId;
use crate::domain::ports::PaymentGateway;
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

const CHECKOUT_BASE_URL: &str = "https://checkout.simulated.invalid/pay";

/// An in-process payment gateway.
///
/// Sessions are created `Open` and only change status through [`settle`],
/// which stands in for the buyer paying (or abandoning) the hosted checkout.
/// [`set_available`] toggles transport failures for both operations.
///
/// [`settle`]: SimulatedGateway::settle
/// [`set_available`]: SimulatedGateway::set_available
#[derive(Clone)]
pub struct SimulatedGateway {
    sessions: Arc<RwLock<HashMap<SessionId, CheckoutSession>>>,
    next_id: Arc<AtomicU64>,
    available: Arc<AtomicBool>,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self {
            sessions: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Moves a session to `status`, as the processor would out-of-band.
    pub async fn settle(&self, session_id: &SessionId, status: SessionStatus) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| EnrollmentError::NotFound(format!("Checkout session {session_id}")))?;
        session.status = status;
        Ok(())
    }

    pub async fn session(&self, session_id: &SessionId) -> Option<CheckoutSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EnrollmentError::Gateway(
                "simulated gateway unavailable".to_string(),
            ))
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        self.ensure_available()?;
        if request.fee > request.amount {
            return Err(EnrollmentError::Gateway(format!(
                "application fee {} exceeds amount {}",
                request.fee, request.amount
            )));
        }

        let id = SessionId::new(format!(
            "cs_sim_{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        let session = CheckoutSession {
            url: Some(format!("{CHECKOUT_BASE_URL}/{id}")),
            id: id.clone(),
            status: SessionStatus::Open,
            amount: request.amount,
            fee: request.fee,
            destination: request.destination,
        };
        self.sessions.write().await.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &SessionId) -> Result<CheckoutSession> {
        self.ensure_available()?;
        self.session(session_id).await.ok_or_else(|| {
            EnrollmentError::Gateway(format!("no such checkout session: {session_id}"))
        })
    }
}
