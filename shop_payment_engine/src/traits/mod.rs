//! The abstract contracts the engine is built against.
//!
//! Storage backends implement [`CatalogManagement`] and [`LedgerManagement`] (rolled up in [`ShopDatabase`]).
//! The two independently-failing external collaborators are behind [`PaymentGateway`] and [`DeliveryNotifier`],
//! which keeps the checkout orchestrator testable without a Stripe account or a Discord bot token.
mod catalog;
mod delivery;
mod gateway;
mod ledger;

pub use catalog::{CatalogError, CatalogManagement, StockAdjustment};
pub use delivery::DeliveryNotifier;
pub use gateway::{CheckoutSession, GatewayError, NewCheckoutSession, PaymentGateway, SessionStatus};
pub use ledger::{LedgerError, LedgerManagement};

/// The highest level of behaviour for storage backends supporting the storefront payment engine: the product
/// catalog and the payment transaction ledger, plus a handle on where the data lives.
pub trait ShopDatabase: Clone + CatalogManagement + LedgerManagement {
    /// The URL of the database.
    fn url(&self) -> &str;
}
