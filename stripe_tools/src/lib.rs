//! A minimal Stripe client covering the two calls the storefront payment gateway makes: creating a hosted
//! Checkout session, and fetching a session's current status. Everything else Stripe offers is out of scope.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{CheckoutSessionRequest, CheckoutSessionResponse, CheckoutStatusResponse};
pub use error::StripeApiError;
