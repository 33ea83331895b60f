//! Concurrency bound on the stock decrement: no interleaving of concurrent decrements may ever drive stock
//! below zero, and exactly `initial_stock` units may be sold.
use futures::future::join_all;
use shop_payment_engine::traits::{CatalogManagement, StockAdjustment};

mod support;
use support::{memory_db, seed_product};

const INITIAL_STOCK: i64 = 5;
const BUYERS: usize = 25;

#[tokio::test]
async fn burst_of_decrements_never_oversells() {
    let db = memory_db().await;
    let product = seed_product(&db, "Limited drop", 4999, INITIAL_STOCK).await;

    let attempts = (0..BUYERS).map(|_| {
        let db = db.clone();
        let id = product.id.clone();
        async move { db.decrement_stock(&id, 1).await.unwrap() }
    });
    let outcomes = join_all(attempts).await;

    let sold = outcomes.iter().filter(|o| matches!(o, StockAdjustment::Adjusted { .. })).count();
    let refused = outcomes.iter().filter(|o| matches!(o, StockAdjustment::Insufficient { .. })).count();
    assert_eq!(sold as i64, INITIAL_STOCK);
    assert_eq!(refused, BUYERS - sold);
    for outcome in &outcomes {
        if let StockAdjustment::Adjusted { remaining } = outcome {
            assert!(*remaining >= 0);
        }
    }

    let product = db.fetch_product(&product.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 0);
}
