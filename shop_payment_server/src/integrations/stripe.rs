use shop_payment_engine::traits::{CheckoutSession, GatewayError, NewCheckoutSession, PaymentGateway, SessionStatus};
use shop_payment_engine::db_types::SessionId;
use stripe_tools::{CheckoutSessionRequest, StripeApi, StripeApiError};

/// [`PaymentGateway`] implementation backed by Stripe Checkout.
#[derive(Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(api: StripeApi) -> Self {
        Self { api }
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: NewCheckoutSession) -> Result<CheckoutSession, GatewayError> {
        let product_name = request
            .metadata
            .get("product_name")
            .cloned()
            .unwrap_or_else(|| "Storefront purchase".to_string());
        let session_request = CheckoutSessionRequest {
            amount: request.amount,
            currency: request.currency,
            product_name,
            success_url: request.success_url,
            cancel_url: request.cancel_url,
            metadata: request.metadata,
        };
        let response = self.api.create_checkout_session(&session_request).await.map_err(into_gateway_error)?;
        Ok(CheckoutSession { session_id: SessionId::from(response.id), redirect_url: response.url })
    }

    async fn fetch_session_status(&self, session_id: &SessionId) -> Result<SessionStatus, GatewayError> {
        let response = self.api.get_checkout_status(session_id.as_str()).await.map_err(into_gateway_error)?;
        Ok(SessionStatus { status: response.status, payment_status: response.payment_status })
    }
}

fn into_gateway_error(e: StripeApiError) -> GatewayError {
    match e {
        StripeApiError::Timeout(m) => GatewayError::Timeout(m),
        StripeApiError::QueryError { status, message } if status < 500 => {
            GatewayError::Rejected(format!("{status}: {message}"))
        },
        other => GatewayError::Unavailable(other.to_string()),
    }
}
