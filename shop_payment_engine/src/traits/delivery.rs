use crate::db_types::{PaymentTransaction, Product};

/// Contract for delivering a purchased digital good to the buyer on the messaging platform.
///
/// `deliver` returns true if any channel succeeded (direct message, or the configured fallback channel when the
/// direct message is rejected). It never raises past this boundary: implementations catch every messaging-platform
/// error, log a diagnostic, and report `false`. A false result leaves the transaction paid-but-undelivered, which
/// is a recoverable, reportable state.
#[allow(async_fn_in_trait)]
pub trait DeliveryNotifier {
    async fn deliver(&self, transaction: &PaymentTransaction, product: &Product) -> bool;
}
