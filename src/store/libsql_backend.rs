//! libSQL backend — async `ExchangeStore` implementation.
//!
//! Supports local file and in-memory databases. A single connection is
//! reused for all operations; `libsql::Connection` is `Send + Sync` and
//! safe for concurrent async use, with writes serialized by SQLite so id
//! assignment stays unique and increasing.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{Exchange, ExchangeStore};

/// libSQL exchange log backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    // Try RFC 3339 first (our canonical write format)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    // Try SQLite datetime() output with fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    // Try SQLite datetime() output without fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql Row to an Exchange.
///
/// Column order matches EXCHANGE_COLUMNS:
/// 0:id, 1:sender, 2:message, 3:response, 4:timestamp
///
/// Rows written before the timestamp column existed have NULL there; they
/// map to the epoch floor.
fn row_to_exchange(row: &libsql::Row) -> Result<Exchange, libsql::Error> {
    let timestamp_str: Option<String> = row.get(4).ok();

    Ok(Exchange {
        id: row.get(0)?,
        sender: row.get(1)?,
        message: row.get(2)?,
        response: row.get(3)?,
        timestamp: timestamp_str
            .map(|s| parse_datetime(&s))
            .unwrap_or(DateTime::<Utc>::MIN_UTC),
    })
}

// ── Trait implementation ────────────────────────────────────────────

const EXCHANGE_COLUMNS: &str = "id, sender, message, response, timestamp";

#[async_trait]
impl ExchangeStore for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn record(
        &self,
        sender: &str,
        message: &str,
        response: &str,
    ) -> Result<Exchange, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now();

        // RETURNING reads the assigned id atomically with the insert.
        let mut rows = conn
            .query(
                "INSERT INTO messages (sender, message, response, timestamp)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id",
                params![sender, message, response, now.to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("record: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("record: {e}")))?
            .ok_or_else(|| DatabaseError::Query("record: no id returned".to_string()))?;

        let id: i64 = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("record id parse: {e}")))?;

        debug!(id, sender = sender, "Exchange recorded");

        Ok(Exchange {
            id,
            sender: sender.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            timestamp: now,
        })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Exchange>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {EXCHANGE_COLUMNS} FROM messages ORDER BY id DESC LIMIT ?1"),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent: {e}")))?;

        let mut exchanges = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_exchange(&row) {
                Ok(exchange) => exchanges.push(exchange),
                Err(e) => {
                    tracing::warn!("Skipping exchange row: {e}");
                }
            }
        }
        Ok(exchanges)
    }
}
