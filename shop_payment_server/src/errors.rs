use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shop_payment_engine::{
    traits::{CatalogError, LedgerError},
    CheckoutError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    CheckoutError(#[from] CheckoutError),
    #[error("{0}")]
    CatalogError(#[from] CatalogError),
    #[error("{0}")]
    LedgerError(#[from] LedgerError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::CheckoutError(e) => checkout_status_code(e),
            Self::CatalogError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::LedgerError(e) => ledger_status_code(e),
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// Validation failures are the client's problem; a flaky gateway is retryable; conflicting writes are retryable
/// with backoff. Everything else is on us.
fn checkout_status_code(e: &CheckoutError) -> StatusCode {
    match e {
        CheckoutError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        CheckoutError::InvalidPurchase(_) => StatusCode::BAD_REQUEST,
        CheckoutError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CheckoutError::CatalogError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CheckoutError::LedgerError(e) => ledger_status_code(e),
    }
}

fn ledger_status_code(e: &LedgerError) -> StatusCode {
    match e {
        LedgerError::DuplicateSession(_) => StatusCode::CONFLICT,
        LedgerError::ForbiddenTransition { .. } => StatusCode::CONFLICT,
        LedgerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod test {
    use shop_payment_engine::db_types::{ProductId, SessionId};

    use super::*;

    #[test]
    fn client_facing_failures_map_to_client_codes() {
        let e = ServerError::from(CheckoutError::ProductNotFound(ProductId::from("p1")));
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        let e = ServerError::from(CheckoutError::TransactionNotFound(SessionId::from("cs_1")));
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        let e = ServerError::from(CheckoutError::InsufficientStock {
            product_id: ProductId::from("p1"),
            available: 1,
            requested: 4,
        });
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn transient_failures_are_retryable_codes() {
        let e = ServerError::from(CheckoutError::GatewayUnavailable("timed out".to_string()));
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let e = ServerError::from(LedgerError::DuplicateSession(SessionId::from("cs_1")));
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn error_body_is_json() {
        let e = ServerError::NoRecordFound("no such product".to_string());
        let resp = e.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
