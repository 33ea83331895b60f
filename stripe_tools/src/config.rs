use std::{env, time::Duration};

use log::*;
use spg_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// Base URL for the Stripe API. Only overridden in tests.
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// Applied to every request. A stuck gateway call must never wedge a checkout or reconciliation.
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_STRIPE_API_URL.to_string(), secret_key: Secret::default(), timeout: DEFAULT_TIMEOUT }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = env::var("SPG_STRIPE_API_URL").ok().unwrap_or_else(|| DEFAULT_STRIPE_API_URL.to_string());
        let secret_key = env::var("SPG_STRIPE_SECRET_KEY").ok().map(Secret::new).unwrap_or_else(|| {
            error!("🪛️ SPG_STRIPE_SECRET_KEY is not set. Checkout session calls will be rejected by Stripe.");
            Secret::default()
        });
        let timeout = env::var("SPG_STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for SPG_STRIPE_TIMEOUT_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { api_url, secret_key, timeout }
    }
}
