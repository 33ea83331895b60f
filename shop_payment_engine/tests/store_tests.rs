use std::collections::HashMap;

use shop_payment_engine::{
    db_types::{NewTransaction, PaymentStatus, ProductId},
    traits::{CatalogManagement, LedgerError, LedgerManagement, StockAdjustment},
};
use spg_common::Money;

mod support;
use support::{memory_db, seed_product};

#[tokio::test]
async fn products_are_soft_deleted() {
    let db = memory_db().await;
    let product = seed_product(&db, "Netflix Premium", 2599, 5).await;

    let listed = db.fetch_active_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, product.id);

    assert!(db.deactivate_product(&product.id).await.unwrap());
    // Deactivating twice is not an error, it just reports that nothing changed.
    assert!(!db.deactivate_product(&product.id).await.unwrap());

    assert!(db.fetch_active_products().await.unwrap().is_empty());
    assert!(db.fetch_active_product(&product.id).await.unwrap().is_none());
    // The record itself is retained for the delivery path.
    let retained = db.fetch_product(&product.id).await.unwrap().unwrap();
    assert!(!retained.active);
    assert_eq!(retained.stock, 5);
}

#[tokio::test]
async fn stock_decrement_is_bounded_at_zero() {
    let db = memory_db().await;
    let product = seed_product(&db, "Gift card", 1000, 3).await;

    assert_eq!(db.decrement_stock(&product.id, 2).await.unwrap(), StockAdjustment::Adjusted { remaining: 1 });
    assert_eq!(db.decrement_stock(&product.id, 2).await.unwrap(), StockAdjustment::Insufficient { available: 1 });
    assert_eq!(db.decrement_stock(&product.id, 1).await.unwrap(), StockAdjustment::Adjusted { remaining: 0 });
    assert_eq!(db.decrement_stock(&product.id, 1).await.unwrap(), StockAdjustment::Insufficient { available: 0 });

    let missing = ProductId::from("no-such-product");
    assert_eq!(db.decrement_stock(&missing, 1).await.unwrap(), StockAdjustment::ProductMissing);
}

#[tokio::test]
async fn ledger_rejects_duplicate_sessions() {
    let db = memory_db().await;
    let product = seed_product(&db, "Spotify", 1990, 5).await;
    let new_tx = NewTransaction::new(
        "cs_dup".into(),
        product.id.clone(),
        "12345".to_string(),
        Money::from_cents(1990),
        "brl".to_string(),
    );

    db.insert_transaction(new_tx.clone()).await.unwrap();
    let err = db.insert_transaction(new_tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateSession(_)));
}

#[tokio::test]
async fn paid_transition_is_single_shot() {
    let db = memory_db().await;
    let product = seed_product(&db, "Spotify", 1990, 5).await;
    let new_tx = NewTransaction::new(
        "cs_gate".into(),
        product.id.clone(),
        "12345".to_string(),
        Money::from_cents(1990),
        "brl".to_string(),
    );
    db.insert_transaction(new_tx).await.unwrap();

    assert!(db.try_mark_paid(&"cs_gate".into(), "complete").await.unwrap());
    // Every subsequent attempt loses the gate, whatever the target status.
    assert!(!db.try_mark_paid(&"cs_gate".into(), "complete").await.unwrap());
    assert!(!db.mark_expired(&"cs_gate".into(), "expired").await.unwrap());

    let stored = db.fetch_transaction(&"cs_gate".into()).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.gateway_status, "complete");
}

#[tokio::test]
async fn delivered_flag_requires_an_existing_session() {
    let db = memory_db().await;
    let err = db.set_delivered(&"cs_missing".into()).await.unwrap_err();
    assert!(matches!(err, LedgerError::SessionNotFound(_)));
}

#[tokio::test]
async fn metadata_round_trips_through_the_ledger() {
    let db = memory_db().await;
    let product = seed_product(&db, "Netflix", 2599, 5).await;
    let metadata = HashMap::from([
        ("quantity".to_string(), "3".to_string()),
        ("buyer_id".to_string(), "98765".to_string()),
    ]);
    let new_tx = NewTransaction::new(
        "cs_meta".into(),
        product.id.clone(),
        "98765".to_string(),
        Money::from_cents(7797),
        "brl".to_string(),
    )
    .with_metadata(metadata.clone());
    db.insert_transaction(new_tx).await.unwrap();

    let stored = db.fetch_transaction(&"cs_meta".into()).await.unwrap().unwrap();
    assert_eq!(stored.metadata, metadata);
    assert_eq!(stored.quantity(), 3);
    assert_eq!(stored.amount, Money::from_cents(7797));
}

#[tokio::test]
async fn recent_and_undelivered_reports() {
    let db = memory_db().await;
    let product = seed_product(&db, "Netflix", 2599, 5).await;
    for session in ["cs_a", "cs_b", "cs_c"] {
        let new_tx = NewTransaction::new(
            session.into(),
            product.id.clone(),
            "1".to_string(),
            Money::from_cents(2599),
            "brl".to_string(),
        );
        db.insert_transaction(new_tx).await.unwrap();
    }
    assert_eq!(db.fetch_recent_transactions(2).await.unwrap().len(), 2);
    assert_eq!(db.fetch_recent_transactions(100).await.unwrap().len(), 3);

    // cs_a: paid and delivered; cs_b: paid, delivery failed. Only cs_b shows up in the report.
    db.try_mark_paid(&"cs_a".into(), "complete").await.unwrap();
    db.set_delivered(&"cs_a".into()).await.unwrap();
    db.try_mark_paid(&"cs_b".into(), "complete").await.unwrap();

    let undelivered = db.fetch_undelivered_paid().await.unwrap();
    assert_eq!(undelivered.len(), 1);
    assert_eq!(undelivered[0].session_id.as_str(), "cs_b");
}

#[tokio::test]
async fn stale_pending_honours_the_age_cutoff() {
    let db = memory_db().await;
    let product = seed_product(&db, "Netflix", 2599, 5).await;
    let new_tx = NewTransaction::new(
        "cs_stale".into(),
        product.id.clone(),
        "1".to_string(),
        Money::from_cents(2599),
        "brl".to_string(),
    );
    db.insert_transaction(new_tx).await.unwrap();

    // A row updated this instant is not stale yet for any positive cutoff.
    let stale = db.fetch_stale_pending(chrono::Duration::minutes(1)).await.unwrap();
    assert!(stale.is_empty());
    let stale = db.fetch_stale_pending(chrono::Duration::seconds(-1)).await.unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].session_id.as_str(), "cs_stale");
}
