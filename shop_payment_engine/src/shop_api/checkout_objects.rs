use serde::{Deserialize, Serialize};

use crate::db_types::{PaymentStatus, PaymentTransaction, ProductId, SessionId};

/// An inbound purchase request: which product, for whom, how many, and where the buyer's browser came from (used
/// to build the success/cancel redirect targets).
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub product_id: ProductId,
    /// The messaging-platform user id of the buyer.
    pub buyer_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub origin_url: String,
}

fn default_quantity() -> u32 {
    1
}

/// The result of initiating a checkout: hand `redirect_url` to the buyer, poll with `session_id`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutIntent {
    pub session_id: SessionId,
    pub redirect_url: String,
}

/// The result of reconciling a session against the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub payment_status: PaymentStatus,
    /// The gateway's raw session status, mirrored verbatim.
    pub gateway_status: String,
    pub delivered: bool,
}

impl From<&PaymentTransaction> for ReconcileOutcome {
    fn from(transaction: &PaymentTransaction) -> Self {
        Self {
            payment_status: transaction.payment_status,
            gateway_status: transaction.gateway_status.clone(),
            delivered: transaction.delivered,
        }
    }
}
