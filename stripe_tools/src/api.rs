use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    config::StripeConfig,
    data_objects::{CheckoutSessionRequest, CheckoutSessionResponse, CheckoutStatusResponse},
    error::StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn form_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending Stripe query: {url}");
        let mut req = self.client.request(method, url);
        if !form.is_empty() {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                StripeApiError::Timeout(e.to_string())
            } else {
                StripeApiError::RequestError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("Stripe query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Creates a hosted Checkout session and returns its id and redirect URL.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse, StripeApiError> {
        let form = request.to_form();
        debug!("Creating checkout session for {} {}", request.amount, request.currency);
        let result: CheckoutSessionResponse =
            self.form_query(Method::POST, "/checkout/sessions", &form).await?;
        info!("Created checkout session [{}]", result.id);
        Ok(result)
    }

    /// Fetches the live status of an existing Checkout session.
    pub async fn get_checkout_status(&self, session_id: &str) -> Result<CheckoutStatusResponse, StripeApiError> {
        let path = format!("/checkout/sessions/{session_id}");
        debug!("Fetching status for checkout session [{session_id}]");
        let result: CheckoutStatusResponse = self.form_query(Method::GET, &path, &[]).await?;
        trace!("Session [{session_id}] status: {} / {}", result.status, result.payment_status);
        Ok(result)
    }
}
