use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StripeApiError {
    #[error("Could not initialize the Stripe client. {0}")]
    Initialization(String),
    #[error("Error sending request to Stripe. {0}")]
    RequestError(String),
    #[error("Stripe did not respond in time. {0}")]
    Timeout(String),
    #[error("Stripe returned an error. Code: {status}, Message: {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize Stripe response. {0}")]
    JsonError(String),
}
