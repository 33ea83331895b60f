//! `SqliteDatabase` is the concrete SQLite implementation of the engine's storage traits.
use std::fmt::Debug;

use chrono::Duration;
use sqlx::SqlitePool;

use super::db::{new_pool, products, transactions};
use crate::{
    db_types::{NewProduct, NewTransaction, PaymentStatus, PaymentTransaction, Product, ProductId, SessionId},
    traits::{CatalogError, CatalogManagement, LedgerError, LedgerManagement, ShopDatabase, StockAdjustment},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url` and brings the schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ShopDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_product(product, &mut conn).await
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(id, &mut conn).await?)
    }

    async fn fetch_active_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_active_product(id, &mut conn).await?)
    }

    async fn fetch_active_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_active_products(&mut conn).await?)
    }

    async fn deactivate_product(&self, id: &ProductId) -> Result<bool, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::deactivate_product(id, &mut conn).await
    }

    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<StockAdjustment, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::decrement_stock(id, quantity, &mut conn).await
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<PaymentTransaction, LedgerError> {
        // The duplicate check and the insert must agree, so both run inside one transaction.
        let mut tx = self.pool.begin().await?;
        let stored = transactions::insert_transaction(transaction, &mut tx).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn fetch_transaction(&self, session_id: &SessionId) -> Result<Option<PaymentTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_transaction(session_id, &mut conn).await?)
    }

    async fn try_mark_paid(&self, session_id: &SessionId, gateway_status: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::transition_from_pending(session_id, PaymentStatus::Paid, gateway_status, &mut conn).await
    }

    async fn mark_expired(&self, session_id: &SessionId, gateway_status: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::transition_from_pending(session_id, PaymentStatus::Expired, gateway_status, &mut conn).await
    }

    async fn set_delivered(&self, session_id: &SessionId) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::set_delivered(session_id, &mut conn).await
    }

    async fn record_gateway_status(&self, session_id: &SessionId, gateway_status: &str) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::record_gateway_status(session_id, gateway_status, &mut conn).await
    }

    async fn fetch_recent_transactions(&self, limit: u32) -> Result<Vec<PaymentTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_recent_transactions(limit, &mut conn).await?)
    }

    async fn fetch_undelivered_paid(&self) -> Result<Vec<PaymentTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_undelivered_paid(&mut conn).await?)
    }

    async fn fetch_stale_pending(&self, older_than: Duration) -> Result<Vec<PaymentTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_stale_pending(older_than, &mut conn).await?)
    }
}
