use std::collections::HashMap;

use serde::Deserialize;
use spg_common::Money;

/// Everything needed to create a hosted Checkout session. The amount is the full line total; Stripe receives it
/// in minor units (cents), which is also how [`Money`] is backed, so no conversion arithmetic exists here.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub amount: Money,
    pub currency: String,
    /// Shown on the Stripe payment page as the line item name.
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Arbitrary key-value pairs. Stripe stores these with the session and echoes them back on status queries.
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionRequest {
    /// Flattens the request into the form-encoded parameter list Stripe's API expects.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("line_items[0][price_data][currency]".to_string(), self.currency.clone()),
            ("line_items[0][price_data][unit_amount]".to_string(), self.amount.cents().to_string()),
            ("line_items[0][price_data][product_data][name]".to_string(), self.product_name.clone()),
        ];
        let mut keys: Vec<&String> = self.metadata.keys().collect();
        keys.sort();
        for key in keys {
            form.push((format!("metadata[{key}]"), self.metadata[key].clone()));
        }
        form
    }
}

/// The subset of Stripe's Checkout session object returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    pub id: String,
    /// The hosted payment page to redirect the buyer to.
    pub url: String,
}

/// The subset of the session object consulted on status queries. Both status fields are kept as raw strings and
/// passed through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutStatusResponse {
    pub id: String,
    /// Session lifecycle: "open", "complete" or "expired".
    pub status: String,
    /// Payment state: "paid", "unpaid" or "no_payment_required".
    pub payment_status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
