use std::{collections::HashMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{NewTransaction, PaymentStatus, PaymentTransaction, SessionId},
    events::{DeliveryFailedEvent, EventProducers, ProductDeliveredEvent},
    shop_api::{
        checkout_objects::{CheckoutIntent, PurchaseRequest, ReconcileOutcome},
        errors::CheckoutError,
    },
    traits::{DeliveryNotifier, NewCheckoutSession, PaymentGateway, ShopDatabase, StockAdjustment},
};

/// `CheckoutApi` is the primary API for handling the purchase and reconciliation flows.
///
/// It holds no persistent state of its own; it coordinates the catalog and ledger stores (`B`) with the payment
/// gateway (`G`) and the delivery notifier (`N`), treating every external call as potentially failing or partially
/// completing.
pub struct CheckoutApi<B, G, N> {
    db: B,
    gateway: G,
    notifier: N,
    currency: String,
    producers: EventProducers,
}

impl<B, G, N> Debug for CheckoutApi<B, G, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.currency)
    }
}

impl<B: Clone, G: Clone, N: Clone> Clone for CheckoutApi<B, G, N> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            gateway: self.gateway.clone(),
            notifier: self.notifier.clone(),
            currency: self.currency.clone(),
            producers: self.producers.clone(),
        }
    }
}

impl<B, G, N> CheckoutApi<B, G, N> {
    pub fn new<S: Into<String>>(db: B, gateway: G, notifier: N, currency: S, producers: EventProducers) -> Self {
        Self { db, gateway, notifier, currency: currency.into(), producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G, N> CheckoutApi<B, G, N>
where
    B: ShopDatabase,
    G: PaymentGateway,
    N: DeliveryNotifier,
{
    /// Initiates a checkout for the given purchase request.
    ///
    /// Validates the product and its stock level, creates a hosted checkout session with the gateway, and only
    /// then records a `pending` transaction in the ledger. A gateway failure persists nothing. No stock is
    /// reserved at this stage; stock is decremented at confirmed delivery, so concurrent purchases can both pass
    /// the stock check and oversell. That is an accepted tradeoff, not a defect to mask.
    pub async fn initiate(&self, request: PurchaseRequest) -> Result<CheckoutIntent, CheckoutError> {
        if request.quantity == 0 {
            return Err(CheckoutError::InvalidPurchase("quantity must be at least 1".to_string()));
        }
        let product = self
            .db
            .fetch_active_product(&request.product_id)
            .await?
            .ok_or_else(|| CheckoutError::ProductNotFound(request.product_id.clone()))?;
        if product.stock < i64::from(request.quantity) {
            debug!(
                "🛒️ Purchase of {} x [{}] rejected: only {} in stock",
                request.quantity, product.id, product.stock
            );
            return Err(CheckoutError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: request.quantity,
            });
        }
        let amount = product.price.times(request.quantity).map_err(|e| CheckoutError::InvalidPurchase(e.to_string()))?;
        let metadata = HashMap::from([
            ("product_id".to_string(), product.id.to_string()),
            ("product_name".to_string(), product.name.clone()),
            ("buyer_id".to_string(), request.buyer_id.clone()),
            ("quantity".to_string(), request.quantity.to_string()),
            ("storefront_purchase".to_string(), "true".to_string()),
        ]);
        let session_request = NewCheckoutSession {
            amount,
            currency: self.currency.clone(),
            success_url: format!("{}?session_id={{CHECKOUT_SESSION_ID}}&payment=success", request.origin_url),
            cancel_url: format!("{}?payment=cancelled", request.origin_url),
            metadata: metadata.clone(),
        };
        let session = self.gateway.create_session(session_request).await.map_err(|e| {
            warn!("🛒️ Gateway refused to create a session for product [{}]: {e}", product.id);
            e
        })?;
        let new_transaction =
            NewTransaction::new(session.session_id, product.id, request.buyer_id, amount, self.currency.clone())
                .with_metadata(metadata);
        let transaction = self.db.insert_transaction(new_transaction).await?;
        debug!(
            "🛒️ Checkout session [{}] created for {} x product [{}] ({} {})",
            transaction.session_id, request.quantity, transaction.product_id, amount, self.currency
        );
        Ok(CheckoutIntent { session_id: transaction.session_id, redirect_url: session.redirect_url })
    }

    /// Reconciles the ledger record for `session_id` against the gateway's live status, applying at most one
    /// forward transition. Idempotent; safe to call on every client poll.
    ///
    /// The stored status is always the source of truth for "has this already been delivered". The gateway is only
    /// consulted to detect a `pending → paid/expired` transition, never to re-trigger one that was already
    /// applied: a transaction that is already `paid` short-circuits without a gateway call, and the
    /// `pending → paid` transition itself is gated by a single atomic conditional update, so of any number of
    /// concurrent reconciliations exactly one attempts delivery.
    pub async fn reconcile(&self, session_id: &SessionId) -> Result<ReconcileOutcome, CheckoutError> {
        let transaction = self
            .db
            .fetch_transaction(session_id)
            .await?
            .ok_or_else(|| CheckoutError::TransactionNotFound(session_id.clone()))?;
        if transaction.payment_status == PaymentStatus::Paid {
            trace!("🔄️ Session [{session_id}] is already paid; skipping gateway poll");
            return Ok(ReconcileOutcome::from(&transaction));
        }
        // Nothing has been written yet, so a gateway failure or timeout here leaves the ledger row untouched and
        // the caller can simply retry.
        let live = self.gateway.fetch_session_status(session_id).await?;
        if live.is_paid() {
            let won = self.db.try_mark_paid(session_id, &live.status).await?;
            if !won {
                debug!("🔄️ Session [{session_id}] was marked paid by a concurrent reconciliation");
                let current = self
                    .db
                    .fetch_transaction(session_id)
                    .await?
                    .ok_or_else(|| CheckoutError::TransactionNotFound(session_id.clone()))?;
                return Ok(ReconcileOutcome::from(&current));
            }
            info!("🔄️ Session [{session_id}] transitioned to paid; attempting delivery");
            let delivered = self.deliver(&transaction).await;
            if delivered {
                self.db.set_delivered(session_id).await?;
                self.decrement_stock_for(&transaction).await;
            }
            Ok(ReconcileOutcome { payment_status: PaymentStatus::Paid, gateway_status: live.status, delivered })
        } else if live.is_expired() {
            if self.db.mark_expired(session_id, &live.status).await? {
                info!("🔄️ Session [{session_id}] expired before payment");
                return Ok(ReconcileOutcome {
                    payment_status: PaymentStatus::Expired,
                    gateway_status: live.status,
                    delivered: false,
                });
            }
            // A concurrent reconciliation already moved this session to a terminal state; report what is stored.
            let current = self
                .db
                .fetch_transaction(session_id)
                .await?
                .ok_or_else(|| CheckoutError::TransactionNotFound(session_id.clone()))?;
            Ok(ReconcileOutcome::from(&current))
        } else {
            self.db.record_gateway_status(session_id, &live.status).await?;
            trace!("🔄️ Session [{session_id}] still {}; gateway says '{}'", transaction.payment_status, live.status);
            Ok(ReconcileOutcome {
                payment_status: transaction.payment_status,
                gateway_status: live.status,
                delivered: transaction.delivered,
            })
        }
    }

    /// Runs the delivery attempt for a freshly paid transaction and publishes the matching event. Only ever called
    /// by the reconciliation that won the paid gate.
    async fn deliver(&self, transaction: &PaymentTransaction) -> bool {
        let product = match self.db.fetch_product(&transaction.product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                error!(
                    "📨️ Cannot deliver session [{}]: product [{}] no longer exists",
                    transaction.session_id, transaction.product_id
                );
                self.publish_delivery_failed(transaction).await;
                return false;
            },
            Err(e) => {
                error!("📨️ Cannot deliver session [{}]: catalog lookup failed. {e}", transaction.session_id);
                self.publish_delivery_failed(transaction).await;
                return false;
            },
        };
        let delivered = self.notifier.deliver(transaction, &product).await;
        if delivered {
            info!("📨️ Session [{}] delivered to buyer {}", transaction.session_id, transaction.buyer_id);
            for producer in &self.producers.product_delivered_producer {
                let event =
                    ProductDeliveredEvent { transaction: transaction.clone(), product: product.clone() };
                producer.publish_event(event).await;
            }
        } else {
            warn!(
                "📨️ Session [{}] is paid but could not be delivered to buyer {}",
                transaction.session_id, transaction.buyer_id
            );
            self.publish_delivery_failed(transaction).await;
        }
        delivered
    }

    async fn publish_delivery_failed(&self, transaction: &PaymentTransaction) {
        for producer in &self.producers.delivery_failed_producer {
            let event = DeliveryFailedEvent { transaction: transaction.clone() };
            producer.publish_event(event).await;
        }
    }

    /// Applies the post-delivery stock decrement. Stock accuracy is best-effort relative to delivery correctness:
    /// none of the outcomes here unwinds the delivery or the paid status, they are only logged.
    async fn decrement_stock_for(&self, transaction: &PaymentTransaction) {
        let quantity = transaction.quantity();
        match self.db.decrement_stock(&transaction.product_id, quantity).await {
            Ok(StockAdjustment::Adjusted { remaining }) => {
                debug!("🛒️ Stock for product [{}] reduced by {quantity} to {remaining}", transaction.product_id);
            },
            Ok(StockAdjustment::Insufficient { available }) => {
                warn!(
                    "🛒️ Product [{}] oversold: {quantity} delivered for session [{}] with only {available} in stock",
                    transaction.product_id, transaction.session_id
                );
            },
            Ok(StockAdjustment::ProductMissing) => {
                warn!(
                    "🛒️ Product [{}] was deleted while session [{}] was in flight; stock not adjusted",
                    transaction.product_id, transaction.session_id
                );
            },
            Err(e) => {
                error!(
                    "🛒️ Stock update for product [{}] failed after delivery of session [{}]. {e}",
                    transaction.product_id, transaction.session_id
                );
            },
        }
    }
}
