//! Persistence layer — SQLite-backed append-only exchange log.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Exchange, ExchangeStore};
