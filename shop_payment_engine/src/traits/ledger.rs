use chrono::Duration;
use thiserror::Error;

use crate::db_types::{NewTransaction, PaymentStatus, PaymentTransaction, SessionId};

/// Persistence contract for the payment transaction ledger.
///
/// The ledger exclusively owns [`PaymentTransaction`] records. Status updates go through the conditional
/// transition methods below, which enforce the `pending → {paid, failed, expired}` table at the storage boundary:
/// a transition whose precondition no longer holds affects zero rows and reports `false`, it never overwrites a
/// terminal status.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Stores a new transaction with `pending` status. A transaction for the same session id must not already
    /// exist; session ids are issued exactly once by the gateway.
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<PaymentTransaction, LedgerError>;

    /// Fetches the transaction for the given checkout session.
    async fn fetch_transaction(&self, session_id: &SessionId) -> Result<Option<PaymentTransaction>, LedgerError>;

    /// Attempts the `pending → paid` transition as a single atomic conditional update, recording the gateway's raw
    /// status alongside it.
    ///
    /// Returns true only for the caller that actually applied the transition. This is the per-session gate that
    /// serializes concurrent reconciliations: of any number of concurrent callers, exactly one observes `true` and
    /// may trigger delivery. It requires no in-process lock and survives multi-process deployment.
    async fn try_mark_paid(&self, session_id: &SessionId, gateway_status: &str) -> Result<bool, LedgerError>;

    /// Attempts the `pending → expired` transition, same conditional shape as [`Self::try_mark_paid`].
    async fn mark_expired(&self, session_id: &SessionId, gateway_status: &str) -> Result<bool, LedgerError>;

    /// Flips the delivered flag to true. The flag never transitions back.
    async fn set_delivered(&self, session_id: &SessionId) -> Result<(), LedgerError>;

    /// Persists the gateway's raw status string and bumps the update timestamp without changing the payment
    /// status. Used on reconciliation branches that observe no transition.
    async fn record_gateway_status(&self, session_id: &SessionId, gateway_status: &str) -> Result<(), LedgerError>;

    /// The most recent transactions, newest first.
    async fn fetch_recent_transactions(&self, limit: u32) -> Result<Vec<PaymentTransaction>, LedgerError>;

    /// Paid transactions whose delivery did not succeed. This is the operator's reporting channel for
    /// paid-but-undelivered purchases, which are recoverable, not fatal.
    async fn fetch_undelivered_paid(&self) -> Result<Vec<PaymentTransaction>, LedgerError>;

    /// Pending transactions that have not been touched for longer than `older_than`. Feed for the background
    /// reconciliation sweeper.
    async fn fetch_stale_pending(&self, older_than: Duration) -> Result<Vec<PaymentTransaction>, LedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Internal ledger database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert transaction, one already exists for session {0}")]
    DuplicateSession(SessionId),
    #[error("Status transition {from} -> {to} is not allowed")]
    ForbiddenTransition { from: PaymentStatus, to: PaymentStatus },
    #[error("No transaction exists for session {0}")]
    SessionNotFound(SessionId),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
