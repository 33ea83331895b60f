use chrono::Duration;
use log::{debug, trace};
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewTransaction, PaymentStatus, PaymentTransaction, SessionId},
    traits::LedgerError,
};

/// Inserts a new transaction with `pending` status. Session ids are issued exactly once by the gateway, so an
/// existing row for the same session is a caller bug and is rejected.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<PaymentTransaction, LedgerError> {
    if fetch_transaction(&transaction.session_id, &mut *conn).await?.is_some() {
        return Err(LedgerError::DuplicateSession(transaction.session_id));
    }
    let stored: PaymentTransaction = sqlx::query_as(
        r#"
            INSERT INTO payment_transactions (session_id, product_id, buyer_id, amount, currency, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(transaction.session_id)
    .bind(transaction.product_id)
    .bind(transaction.buyer_id)
    .bind(transaction.amount)
    .bind(transaction.currency)
    .bind(Json(transaction.metadata))
    .fetch_one(conn)
    .await?;
    debug!("🧾️ Transaction recorded for session [{}]", stored.session_id);
    Ok(stored)
}

pub async fn fetch_transaction(
    session_id: &SessionId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentTransaction>, sqlx::Error> {
    let transaction = sqlx::query_as("SELECT * FROM payment_transactions WHERE session_id = $1")
        .bind(session_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(transaction)
}

/// Applies a `pending → {paid, failed, expired}` transition as a single conditional update, recording the
/// gateway's raw status alongside it. Returns true only if this call applied the transition; a row that is no
/// longer pending is left untouched. The transition table lives in [`PaymentStatus::can_transition_to`] and any
/// target it rejects is refused here before the database is consulted.
pub(crate) async fn transition_from_pending(
    session_id: &SessionId,
    to: PaymentStatus,
    gateway_status: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, LedgerError> {
    if !PaymentStatus::Pending.can_transition_to(to) {
        return Err(LedgerError::ForbiddenTransition { from: PaymentStatus::Pending, to });
    }
    let result = sqlx::query(
        r#"
            UPDATE payment_transactions
            SET payment_status = $1, gateway_status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE session_id = $3 AND payment_status = 'pending';
        "#,
    )
    .bind(to)
    .bind(gateway_status)
    .bind(session_id.as_str())
    .execute(conn)
    .await?;
    trace!("🧾️ Transition of [{session_id}] to {to}: {} row(s)", result.rows_affected());
    Ok(result.rows_affected() > 0)
}

/// Flips the delivered flag. The flag only ever moves false → true; setting it again is a harmless no-op.
pub(crate) async fn set_delivered(session_id: &SessionId, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    let result = sqlx::query(
        "UPDATE payment_transactions SET delivered = 1, updated_at = CURRENT_TIMESTAMP WHERE session_id = $1",
    )
    .bind(session_id.as_str())
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(LedgerError::SessionNotFound(session_id.clone()));
    }
    Ok(())
}

/// Mirrors the gateway's raw status without touching the payment status.
pub(crate) async fn record_gateway_status(
    session_id: &SessionId,
    gateway_status: &str,
    conn: &mut SqliteConnection,
) -> Result<(), LedgerError> {
    let result = sqlx::query(
        "UPDATE payment_transactions SET gateway_status = $1, updated_at = CURRENT_TIMESTAMP WHERE session_id = $2",
    )
    .bind(gateway_status)
    .bind(session_id.as_str())
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(LedgerError::SessionNotFound(session_id.clone()));
    }
    Ok(())
}

pub async fn fetch_recent_transactions(
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentTransaction>, sqlx::Error> {
    let transactions = sqlx::query_as("SELECT * FROM payment_transactions ORDER BY created_at DESC LIMIT $1")
        .bind(i64::from(limit))
        .fetch_all(conn)
        .await?;
    Ok(transactions)
}

pub async fn fetch_undelivered_paid(conn: &mut SqliteConnection) -> Result<Vec<PaymentTransaction>, sqlx::Error> {
    let transactions = sqlx::query_as(
        "SELECT * FROM payment_transactions WHERE payment_status = 'paid' AND delivered = 0 ORDER BY updated_at ASC",
    )
    .fetch_all(conn)
    .await?;
    Ok(transactions)
}

/// Pending transactions whose last update is older than the given age.
pub async fn fetch_stale_pending(
    older_than: Duration,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentTransaction>, sqlx::Error> {
    let transactions = sqlx::query_as(
        r#"
            SELECT * FROM payment_transactions
            WHERE payment_status = 'pending'
              AND (unixepoch(CURRENT_TIMESTAMP) - unixepoch(updated_at)) > $1
            ORDER BY updated_at ASC;
        "#,
    )
    .bind(older_than.num_seconds())
    .fetch_all(conn)
    .await?;
    Ok(transactions)
}
