//! Request handler definitions
//!
//! Define each route and its handler here. Handlers are thin: validate, call into the engine, map the result onto
//! a DTO. Anything long or non-cpu-bound must stay async so a worker thread never blocks on I/O.
//!
//! Handlers are generic over the engine traits rather than the concrete SQLite/Stripe/Discord types, so the
//! endpoint tests can exercise them against mocks. The server registers them with concrete types in
//! [`crate::server`].
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_payment_engine::{
    db_types::{ProductId, SessionId},
    traits::{CatalogManagement, DeliveryNotifier, LedgerManagement, PaymentGateway, ShopDatabase},
    CheckoutApi,
    PurchaseRequest,
};

use crate::{
    data_objects::{JsonResponse, ProductForm},
    errors::ServerError,
};

const TRANSACTION_PAGE_SIZE: u32 = 100;

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------  Catalog  ----------------------------------------------------
/// All active products. Soft-deleted products never appear here.
pub async fn list_products<B>(db: web::Data<B>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement + 'static {
    trace!("💻️ Received product listing request");
    let products = db.fetch_active_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

pub async fn create_product<B>(db: web::Data<B>, body: web::Json<ProductForm>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement + 'static {
    let new_product = body.into_inner().into_new_product().map_err(ServerError::InvalidRequestBody)?;
    let product = db.insert_product(new_product).await?;
    debug!("💻️ Product [{}] created", product.id);
    Ok(HttpResponse::Ok().json(product))
}

/// Soft delete. The record is retained so historical transactions keep resolving.
pub async fn delete_product<B>(db: web::Data<B>, path: web::Path<String>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement + 'static {
    let id = ProductId::from(path.into_inner());
    if db.deactivate_product(&id).await? {
        debug!("💻️ Product [{id}] deactivated");
        Ok(HttpResponse::Ok().json(JsonResponse::new("Product removed")))
    } else {
        Err(ServerError::NoRecordFound(format!("No active product with id {id}")))
    }
}

// ----------------------------------------------  Payments ----------------------------------------------------
/// Starts a checkout: validates the purchase, creates the gateway session, records the pending transaction and
/// hands back the redirect URL.
pub async fn create_checkout<B, G, N>(
    api: web::Data<CheckoutApi<B, G, N>>,
    body: web::Json<PurchaseRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: ShopDatabase + 'static,
    G: PaymentGateway + 'static,
    N: DeliveryNotifier + 'static,
{
    trace!("💻️ Received checkout request");
    let intent = api.initiate(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(intent))
}

/// Reconciles a session against the gateway and reports `{payment_status, gateway_status, delivered}`. Clients
/// poll this after returning from the payment page; it is idempotent, so they can poll as often as they like.
pub async fn payment_status<B, G, N>(
    api: web::Data<CheckoutApi<B, G, N>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServerError>
where
    B: ShopDatabase + 'static,
    G: PaymentGateway + 'static,
    N: DeliveryNotifier + 'static,
{
    let session_id = SessionId::from(path.into_inner());
    trace!("💻️ Received status poll for session [{session_id}]");
    let outcome = api.reconcile(&session_id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn recent_transactions<B>(db: web::Data<B>) -> Result<HttpResponse, ServerError>
where B: LedgerManagement + 'static {
    let transactions = db.fetch_recent_transactions(TRANSACTION_PAGE_SIZE).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

/// Paid transactions that were never delivered. This is the operator's view for spotting purchases that need
/// manual fulfilment.
pub async fn undelivered_transactions<B>(db: web::Data<B>) -> Result<HttpResponse, ServerError>
where B: LedgerManagement + 'static {
    let transactions = db.fetch_undelivered_paid().await?;
    Ok(HttpResponse::Ok().json(transactions))
}
