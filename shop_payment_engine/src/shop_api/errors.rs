use thiserror::Error;

use crate::{
    db_types::{ProductId, SessionId},
    traits::{CatalogError, GatewayError, LedgerError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Product {0} does not exist or is not for sale")]
    ProductNotFound(ProductId),
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock { product_id: ProductId, available: i64, requested: u32 },
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("No transaction found for session {0}")]
    TransactionNotFound(SessionId),
    #[error("Invalid purchase request. {0}")]
    InvalidPurchase(String),
    #[error("Catalog error. {0}")]
    CatalogError(#[from] CatalogError),
    #[error("Ledger error. {0}")]
    LedgerError(#[from] LedgerError),
}

impl From<GatewayError> for CheckoutError {
    fn from(e: GatewayError) -> Self {
        CheckoutError::GatewayUnavailable(e.to_string())
    }
}
