//! Endpoint tests against mocked stores. The checkout pipeline itself is covered by the engine's integration
//! tests; these verify the HTTP layer: routing, validation, serialization and status-code mapping.
mod mocks;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use crate::{
    routes::{create_product, delete_product, health, list_products, recent_transactions},
    test::mocks::{sample_product, MockCatalog, MockLedger},
};

#[actix_web::test]
async fn health_responds() {
    let app = test::init_service(App::new().service(health)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn listing_returns_active_products() {
    let mut catalog = MockCatalog::new();
    catalog.expect_fetch_active_products().times(1).returning(|| Ok(vec![sample_product()]));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(catalog))
            .route("/products", web::get().to(list_products::<MockCatalog>)),
    )
    .await;

    let req = test::TestRequest::get().uri("/products").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Netflix Premium");
    assert_eq!(products[0]["price"], "25.99");
}

#[actix_web::test]
async fn create_product_round_trips() {
    let mut catalog = MockCatalog::new();
    catalog.expect_insert_product().times(1).returning(|new_product| {
        let mut product = sample_product();
        product.name = new_product.name;
        product.price = new_product.price;
        product.stock = new_product.stock;
        Ok(product)
    });
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(catalog))
            .route("/products", web::post().to(create_product::<MockCatalog>)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(json!({"name": "Spotify", "price": "19.90", "stock": 3}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Spotify");
    assert_eq!(body["price"], "19.90");
    assert_eq!(body["stock"], 3);
}

#[actix_web::test]
async fn create_product_rejects_blank_names() {
    let mut catalog = MockCatalog::new();
    catalog.expect_insert_product().times(0);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(catalog))
            .route("/products", web::post().to(create_product::<MockCatalog>)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(json!({"name": "   ", "price": "19.90"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deleting_an_unknown_product_is_not_found() {
    let mut catalog = MockCatalog::new();
    catalog.expect_deactivate_product().times(1).returning(|_| Ok(false));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(catalog))
            .route("/products/{product_id}", web::delete().to(delete_product::<MockCatalog>)),
    )
    .await;

    let req = test::TestRequest::delete().uri("/products/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_product_soft_deletes() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_deactivate_product()
        .times(1)
        .withf(|id| id.as_str() == "prod-sample")
        .returning(|_| Ok(true));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(catalog))
            .route("/products/{product_id}", web::delete().to(delete_product::<MockCatalog>)),
    )
    .await;

    let req = test::TestRequest::delete().uri("/products/prod-sample").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Product removed");
}

#[actix_web::test]
async fn transaction_listing_comes_from_the_ledger() {
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_recent_transactions().times(1).withf(|limit| *limit == 100).returning(|_| Ok(vec![]));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ledger))
            .route("/payments/transactions", web::get().to(recent_transactions::<MockLedger>)),
    )
    .await;

    let req = test::TestRequest::get().uri("/payments/transactions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body.as_array().unwrap().is_empty());
}
