use chrono::Utc;
use mockall::mock;
use shop_payment_engine::{
    db_types::{NewProduct, NewTransaction, PaymentTransaction, Product, ProductId, SessionId},
    traits::{CatalogError, CatalogManagement, LedgerError, LedgerManagement, StockAdjustment},
};
use spg_common::Money;

mock! {
    pub Catalog {}
    impl CatalogManagement for Catalog {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;
        async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
        async fn fetch_active_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
        async fn fetch_active_products(&self) -> Result<Vec<Product>, CatalogError>;
        async fn deactivate_product(&self, id: &ProductId) -> Result<bool, CatalogError>;
        async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<StockAdjustment, CatalogError>;
    }
}

mock! {
    pub Ledger {}
    impl LedgerManagement for Ledger {
        async fn insert_transaction(&self, transaction: NewTransaction) -> Result<PaymentTransaction, LedgerError>;
        async fn fetch_transaction(&self, session_id: &SessionId) -> Result<Option<PaymentTransaction>, LedgerError>;
        async fn try_mark_paid(&self, session_id: &SessionId, gateway_status: &str) -> Result<bool, LedgerError>;
        async fn mark_expired(&self, session_id: &SessionId, gateway_status: &str) -> Result<bool, LedgerError>;
        async fn set_delivered(&self, session_id: &SessionId) -> Result<(), LedgerError>;
        async fn record_gateway_status(&self, session_id: &SessionId, gateway_status: &str) -> Result<(), LedgerError>;
        async fn fetch_recent_transactions(&self, limit: u32) -> Result<Vec<PaymentTransaction>, LedgerError>;
        async fn fetch_undelivered_paid(&self) -> Result<Vec<PaymentTransaction>, LedgerError>;
        async fn fetch_stale_pending(&self, older_than: chrono::Duration) -> Result<Vec<PaymentTransaction>, LedgerError>;
    }
}

pub fn sample_product() -> Product {
    Product {
        id: ProductId::from("prod-sample"),
        name: "Netflix Premium".to_string(),
        price: Money::from_cents(2599),
        description: "Premium account".to_string(),
        category: "streaming".to_string(),
        stock: 5,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
