use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product, ProductId},
    traits::{CatalogError, StockAdjustment},
};

/// Inserts a new product with a freshly generated id and returns the stored row.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    let id = ProductId::random();
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (id, name, price, description, category, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(id)
    .bind(product.name)
    .bind(product.price)
    .bind(product.description)
    .bind(product.category)
    .bind(product.stock)
    .fetch_one(conn)
    .await?;
    debug!("🛒️ Product [{}] ({}) added to the catalog", product.id, product.name);
    Ok(product)
}

pub async fn fetch_product(id: &ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_active_product(
    id: &ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1 AND active = 1")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Returns all active products, oldest first.
pub async fn fetch_active_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products WHERE active = 1 ORDER BY created_at ASC")
        .fetch_all(conn)
        .await?;
    trace!("🛒️ Fetched {} active products", products.len());
    Ok(products)
}

/// Soft-deletes the product. Returns false if there was no active product with this id.
pub async fn deactivate_product(id: &ProductId, conn: &mut SqliteConnection) -> Result<bool, CatalogError> {
    let result =
        sqlx::query("UPDATE products SET active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND active = 1")
            .bind(id.as_str())
            .execute(conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Decrements stock by `quantity` in a single conditional update. The `stock >= $1` guard is what keeps stock
/// non-negative under concurrent decrements: of two racing updates that would jointly overdraw the stock, only
/// the one that still sees a sufficient level applies.
pub async fn decrement_stock(
    id: &ProductId,
    quantity: u32,
    conn: &mut SqliteConnection,
) -> Result<StockAdjustment, CatalogError> {
    let quantity = i64::from(quantity);
    let updated: Option<(i64,)> = sqlx::query_as(
        r#"
            UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock >= $1
            RETURNING stock;
        "#,
    )
    .bind(quantity)
    .bind(id.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((remaining,)) = updated {
        return Ok(StockAdjustment::Adjusted { remaining });
    }
    let current: Option<(i64,)> =
        sqlx::query_as("SELECT stock FROM products WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    match current {
        Some((available,)) => Ok(StockAdjustment::Insufficient { available }),
        None => Ok(StockAdjustment::ProductMissing),
    }
}
