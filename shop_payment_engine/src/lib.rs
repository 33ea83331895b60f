//! Storefront Payment Engine
//!
//! The engine holds the core logic of the storefront payment gateway: the product catalog, the payment transaction
//! ledger, and the checkout orchestrator that drives a purchase from gateway session creation through exactly-once
//! delivery of the purchased digital good.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used in the database,
//!    which are defined in [`mod@db_types`] and are public.
//! 2. The engine public API ([`CheckoutApi`]). It is generic over the storage backend and the two external
//!    collaborators (payment gateway and delivery notifier), whose contracts live in [`mod@traits`]. Anything that
//!    implements those traits can drive a checkout.
//! 3. A set of events that can be subscribed to ([`mod@events`]). These fire when a delivery succeeds or when a paid
//!    transaction could not be delivered, so operators can hook reporting onto them without touching the checkout
//!    flow.
pub mod db_types;
pub mod events;
mod shop_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use shop_api::{
    checkout_objects::{CheckoutIntent, PurchaseRequest, ReconcileOutcome},
    CheckoutApi,
    CheckoutError,
};
