use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use discord_tools::DiscordApi;
use log::*;
use shop_payment_engine::{
    events::{EventHandlers, EventHooks},
    CheckoutApi,
    SqliteDatabase,
};
use stripe_tools::StripeApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{DiscordNotifier, StripeGateway},
    routes::{
        create_checkout,
        create_product,
        delete_product,
        health,
        list_products,
        payment_status,
        recent_transactions,
        undelivered_transactions,
    },
    sweeper::start_reconcile_sweeper,
};

pub type Api = CheckoutApi<SqliteDatabase, StripeGateway, DiscordNotifier>;

const EVENT_BUFFER_SIZE: usize = 16;
const DB_POOL_SIZE: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, DB_POOL_SIZE)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let stripe = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let discord = DiscordApi::new(config.discord.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = StripeGateway::new(stripe);
    let notifier = DiscordNotifier::new(discord, config.fallback_channel_id.clone());

    // Paid-but-undelivered transactions must be impossible to miss. The hook keeps them on the error log; the
    // /api/payments/undelivered route gives operators the full list.
    let mut hooks = EventHooks::default();
    hooks.on_delivery_failed(|event| {
        Box::pin(async move {
            error!(
                "🚨️ Session [{}] is paid but NOT delivered. Buyer {} is waiting on manual fulfilment.",
                event.transaction.session_id, event.transaction.buyer_id
            );
        }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let api = Api::new(db.clone(), gateway, notifier, config.currency.clone(), producers);
    let _sweeper = start_reconcile_sweeper(api.clone(), config.sweep_interval, config.stale_pending_after);

    let srv = create_server_instance(&config, db, api)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: &ServerConfig, db: SqliteDatabase, api: Api) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("spg::access_log"))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(api.clone()))
            .service(
                web::scope("/api")
                    .service(health)
                    .route("/products", web::get().to(list_products::<SqliteDatabase>))
                    .route("/products", web::post().to(create_product::<SqliteDatabase>))
                    .route("/products/{product_id}", web::delete().to(delete_product::<SqliteDatabase>))
                    .route(
                        "/payments/checkout",
                        web::post().to(create_checkout::<SqliteDatabase, StripeGateway, DiscordNotifier>),
                    )
                    .route(
                        "/payments/status/{session_id}",
                        web::get().to(payment_status::<SqliteDatabase, StripeGateway, DiscordNotifier>),
                    )
                    .route("/payments/transactions", web::get().to(recent_transactions::<SqliteDatabase>))
                    .route("/payments/undelivered", web::get().to(undelivered_transactions::<SqliteDatabase>)),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
