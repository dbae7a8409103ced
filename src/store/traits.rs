//! `ExchangeStore` trait — single async interface for the exchange log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DatabaseError;

/// One recorded inbound-message/reply pair.
///
/// Immutable once written; the log is append-only.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    /// Store-assigned key, strictly increasing in insertion order.
    pub id: i64,
    /// Carrier-supplied sender address, stored as-is.
    pub sender: String,
    /// Raw inbound message body.
    pub message: String,
    /// Reply chosen by the classifier.
    pub response: String,
    /// Insert time, assigned by the store.
    pub timestamp: DateTime<Utc>,
}

/// Backend-agnostic store for the exchange log.
#[async_trait]
pub trait ExchangeStore: Send + Sync {
    /// Run all pending schema migrations. Safe to call on every start.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    /// Persist one exchange. The store assigns `id` and `timestamp` and
    /// returns the stored row. The row is durable before this returns.
    async fn record(
        &self,
        sender: &str,
        message: &str,
        response: &str,
    ) -> Result<Exchange, DatabaseError>;

    /// Up to `limit` most recently recorded exchanges, newest first by `id`.
    ///
    /// Fewer rows than `limit` (including none) is not an error.
    async fn recent(&self, limit: usize) -> Result<Vec<Exchange>, DatabaseError>;
}
