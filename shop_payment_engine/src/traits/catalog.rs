use thiserror::Error;

use crate::db_types::{NewProduct, Product, ProductId};

/// The outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// The decrement was applied. `remaining` is the stock level after the update.
    Adjusted { remaining: i64 },
    /// Applying the decrement would have driven stock below zero, so nothing was changed.
    Insufficient { available: i64 },
    /// The product no longer exists. Nothing was changed.
    ProductMissing,
}

/// Persistence contract for the product catalog.
///
/// Products are soft-deleted only: a deactivated product is excluded from listings and purchase, but its record is
/// retained so that historical transactions keep resolving.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Stores a new product, assigning it a fresh id, and returns the stored record.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    /// Fetches a product regardless of its active flag. Used by the delivery path, which must still resolve
    /// products that were deactivated after purchase.
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// Fetches a product only if it is active.
    async fn fetch_active_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// All active products, oldest first.
    async fn fetch_active_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Soft-deletes a product. Returns false if no active product with this id exists.
    async fn deactivate_product(&self, id: &ProductId) -> Result<bool, CatalogError>;

    /// Atomically decrements stock by `quantity`, but only if the resulting value would be non-negative.
    /// This is a single conditional update at the store level; concurrent callers can never drive stock below zero.
    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<StockAdjustment, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Internal catalog database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
