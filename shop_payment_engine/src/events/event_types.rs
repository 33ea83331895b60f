use crate::db_types::{PaymentTransaction, Product};

/// Fired after a paid transaction was successfully delivered to the buyer.
#[derive(Debug, Clone)]
pub struct ProductDeliveredEvent {
    pub transaction: PaymentTransaction,
    pub product: Product,
}

/// Fired when a transaction reached `paid` but delivery did not succeed on any channel. Subscribers are the
/// operator-facing reporting path for undelivered purchases; the checkout flow itself carries on.
#[derive(Debug, Clone)]
pub struct DeliveryFailedEvent {
    pub transaction: PaymentTransaction,
}
