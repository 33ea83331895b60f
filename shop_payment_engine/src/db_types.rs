use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use spg_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

//--------------------------------------      ProductId       ---------------------------------------------------------
/// A lightweight wrapper around a product's unique id. Ids are generated by the catalog on creation and are opaque
/// to everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------      SessionId       ---------------------------------------------------------
/// The checkout session identifier issued by the payment gateway. Opaque; never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for SessionId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------    PaymentStatus     ---------------------------------------------------------
/// The lifecycle state of a payment transaction.
///
/// The only legal transitions are `Pending` → `Paid`, `Pending` → `Failed` and `Pending` → `Expired`. The three
/// non-pending states are terminal. The ledger enforces this table on every status update; a disallowed transition
/// is rejected rather than overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// The checkout session has been created, and the gateway has not confirmed payment.
    Pending,
    /// The gateway confirmed payment in full. Terminal.
    Paid,
    /// The gateway rejected the payment. Terminal.
    Failed,
    /// The checkout session lapsed before payment. Terminal.
    Expired,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid) |
                (PaymentStatus::Pending, PaymentStatus::Failed) |
                (PaymentStatus::Pending, PaymentStatus::Expired)
        )
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for PaymentStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status in storage: {value}. Defaulting to pending.");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------       Product        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub description: String,
    pub category: String,
    pub stock: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewProduct      ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub description: String,
    pub category: String,
    pub stock: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            description: String::new(),
            category: "general".to_string(),
            stock: 0,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }
}

//--------------------------------------  PaymentTransaction  ---------------------------------------------------------
/// A persisted payment transaction, keyed by the gateway's checkout session id.
///
/// The ledger exclusively owns these records. They are created at session-creation time with `pending` status and
/// are only ever mutated by the reconciliation flow; they are never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentTransaction {
    pub session_id: SessionId,
    pub product_id: ProductId,
    /// The messaging-platform user id of the buyer.
    pub buyer_id: String,
    pub amount: Money,
    pub currency: String,
    pub payment_status: PaymentStatus,
    /// Free-text mirror of the gateway's raw session status.
    pub gateway_status: String,
    pub delivered: bool,
    /// The key-value mapping embedded in the checkout session and echoed back by the gateway.
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    /// The purchased quantity, as echoed back in the gateway metadata. Falls back to a single unit if the metadata
    /// was lost or mangled upstream.
    pub fn quantity(&self) -> u32 {
        self.metadata.get("quantity").and_then(|q| q.parse().ok()).unwrap_or(1)
    }
}

#[cfg(feature = "sqlite")]
impl FromRow<'_, sqlx::sqlite::SqliteRow> for PaymentTransaction {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::{types::Json, Row};
        let metadata: Json<HashMap<String, String>> = row.try_get("metadata")?;
        Ok(Self {
            session_id: row.try_get("session_id")?,
            product_id: row.try_get("product_id")?,
            buyer_id: row.try_get("buyer_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            payment_status: row.try_get("payment_status")?,
            gateway_status: row.try_get("gateway_status")?,
            delivered: row.try_get("delivered")?,
            metadata: metadata.0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

//--------------------------------------    NewTransaction    ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The session id as issued by the payment gateway.
    pub session_id: SessionId,
    pub product_id: ProductId,
    pub buyer_id: String,
    pub amount: Money,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl NewTransaction {
    pub fn new(session_id: SessionId, product_id: ProductId, buyer_id: String, amount: Money, currency: String) -> Self {
        Self { session_id, product_id, buyer_id, amount, currency, metadata: HashMap::new() }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pending_is_the_only_live_status() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Expired.is_terminal());
    }

    #[test]
    fn transition_table() {
        use PaymentStatus::*;
        for next in [Paid, Failed, Expired] {
            assert!(Pending.can_transition_to(next));
        }
        assert!(!Pending.can_transition_to(Pending));
        for from in [Paid, Failed, Expired] {
            for next in [Pending, Paid, Failed, Expired] {
                assert!(!from.can_transition_to(next), "{from} -> {next} must be rejected");
            }
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        use PaymentStatus::*;
        for status in [Pending, Paid, Failed, Expired] {
            assert_eq!(status.to_string().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("Paid".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn quantity_comes_from_metadata() {
        let mut tx = sample_transaction();
        assert_eq!(tx.quantity(), 1);
        tx.metadata.insert("quantity".to_string(), "3".to_string());
        assert_eq!(tx.quantity(), 3);
        tx.metadata.insert("quantity".to_string(), "not-a-number".to_string());
        assert_eq!(tx.quantity(), 1);
    }

    fn sample_transaction() -> PaymentTransaction {
        PaymentTransaction {
            session_id: "cs_test_123".into(),
            product_id: ProductId::random(),
            buyer_id: "440099".to_string(),
            amount: Money::from_cents(2599),
            currency: "brl".to_string(),
            payment_status: PaymentStatus::Pending,
            gateway_status: "open".to_string(),
            delivered: false,
            metadata: HashMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
