use std::collections::HashMap;

use spg_common::Money;
use thiserror::Error;

use crate::db_types::SessionId;

/// Everything the engine needs to create a hosted checkout session with the payment provider.
#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    /// The full line total, not the unit price.
    pub amount: Money,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Embedded in the session and echoed back by the gateway on status queries.
    pub metadata: HashMap<String, String>,
}

/// A freshly created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: SessionId,
    /// Where to send the buyer to complete payment.
    pub redirect_url: String,
}

/// The live state of a checkout session as reported by the gateway. Both fields are the provider's raw strings;
/// the engine only ever compares them for equality and mirrors `status` into the ledger verbatim.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub status: String,
    pub payment_status: String,
}

impl SessionStatus {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    pub fn is_expired(&self) -> bool {
        self.status == "expired"
    }
}

/// Client contract for the external payment provider. Calls may fail or time out; implementations must carry
/// bounded timeouts so a stuck provider cannot wedge a reconciliation.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Creates a hosted checkout session and returns its id and redirect URL.
    async fn create_session(&self, request: NewCheckoutSession) -> Result<CheckoutSession, GatewayError>;

    /// Fetches the current status of an existing session.
    async fn fetch_session_status(&self, session_id: &SessionId) -> Result<SessionStatus, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("The payment gateway did not respond in time: {0}")]
    Timeout(String),
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
}
