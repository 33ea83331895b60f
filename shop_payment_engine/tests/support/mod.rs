use shop_payment_engine::{
    db_types::{NewProduct, Product},
    traits::CatalogManagement,
    SqliteDatabase,
};
use spg_common::Money;

/// A fresh in-memory database with the schema applied. Single connection, since every connection to
/// `sqlite::memory:` would otherwise get its own empty database.
pub async fn memory_db() -> SqliteDatabase {
    dotenvy::dotenv().ok();
    let _ = env_logger::try_init();
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating in-memory database")
}

pub async fn seed_product(db: &SqliteDatabase, name: &str, price_cents: i64, stock: i64) -> Product {
    let product = NewProduct::new(name, Money::from_cents(price_cents))
        .with_description("A test product")
        .with_category("streaming")
        .with_stock(stock);
    db.insert_product(product).await.expect("Error seeding product")
}
