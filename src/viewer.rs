//! Exchange log viewer — polls the store on a fixed interval and renders
//! the most recent exchanges.
//!
//! The timer and the store query are decoupled: `spawn_poll_task` owns the
//! interval, `poll_once` does one read-and-render pass, and rendering goes
//! through the `ExchangeRenderer` trait so the loop and the output can be
//! tested independently.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::store::{Exchange, ExchangeStore};

/// How many rows each poll fetches.
pub const RECENT_WINDOW: usize = 10;

/// Renders one batch of recent exchanges.
pub trait ExchangeRenderer: Send + Sync {
    fn render(&self, exchanges: &[Exchange]);

    /// Called when the poll read fails. The loop keeps going.
    fn render_error(&self, error: &DatabaseError) {
        warn!(error = %error, "Viewer poll failed");
    }
}

/// Renderer that logs a compact line per exchange via `tracing`.
pub struct LogRenderer;

impl ExchangeRenderer for LogRenderer {
    fn render(&self, exchanges: &[Exchange]) {
        if exchanges.is_empty() {
            info!("No exchanges recorded yet");
            return;
        }
        info!(count = exchanges.len(), "Recent exchanges");
        for exchange in exchanges {
            info!(
                id = exchange.id,
                sender = %exchange.sender,
                message = %exchange.message,
                response = %exchange.response,
                timestamp = %exchange.timestamp.to_rfc3339(),
                "exchange"
            );
        }
    }
}

/// One poll iteration: read the log, hand the rows to the renderer.
pub async fn poll_once(store: &dyn ExchangeStore, renderer: &dyn ExchangeRenderer) {
    match store.recent(RECENT_WINDOW).await {
        Ok(rows) => renderer.render(&rows),
        Err(e) => renderer.render_error(&e),
    }
}

/// Spawn the polling viewer.
///
/// Ticks every `interval` and renders the most recent exchanges. Runs until
/// the process exits; it never blocks the inbound path.
pub fn spawn_poll_task(
    store: Arc<dyn ExchangeStore>,
    renderer: Arc<dyn ExchangeRenderer>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            poll_once(store.as_ref(), renderer.as_ref()).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::store::LibSqlBackend;

    /// Renderer that collects every rendered batch.
    #[derive(Default)]
    struct CollectingRenderer {
        batches: Mutex<Vec<Vec<Exchange>>>,
        errors: Mutex<usize>,
    }

    impl ExchangeRenderer for CollectingRenderer {
        fn render(&self, exchanges: &[Exchange]) {
            self.batches.lock().unwrap().push(exchanges.to_vec());
        }

        fn render_error(&self, _error: &DatabaseError) {
            *self.errors.lock().unwrap() += 1;
        }
    }

    /// Store whose reads always fail.
    struct BrokenStore;

    #[async_trait]
    impl ExchangeStore for BrokenStore {
        async fn init_schema(&self) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn record(
            &self,
            _sender: &str,
            _message: &str,
            _response: &str,
        ) -> Result<Exchange, DatabaseError> {
            Err(DatabaseError::Query("record: broken".into()))
        }

        async fn recent(&self, _limit: usize) -> Result<Vec<Exchange>, DatabaseError> {
            Err(DatabaseError::Query("recent: broken".into()))
        }
    }

    #[tokio::test]
    async fn poll_once_renders_recent_rows() {
        let store = LibSqlBackend::new_memory().await.unwrap();
        store.record("+1555", "dose?", "dose reply").await.unwrap();
        store.record("+1556", "storage?", "storage reply").await.unwrap();

        let renderer = CollectingRenderer::default();
        poll_once(&store, &renderer).await;

        let batches = renderer.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][0].message, "storage?");
    }

    #[tokio::test]
    async fn poll_once_with_empty_store_renders_empty_batch() {
        let store = LibSqlBackend::new_memory().await.unwrap();
        let renderer = CollectingRenderer::default();
        poll_once(&store, &renderer).await;

        let batches = renderer.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
    }

    #[tokio::test]
    async fn read_failure_goes_to_render_error() {
        let renderer = CollectingRenderer::default();
        poll_once(&BrokenStore, &renderer).await;

        assert_eq!(*renderer.errors.lock().unwrap(), 1);
        assert!(renderer.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn poll_task_keeps_ticking() {
        let store: Arc<dyn ExchangeStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        store.record("+1555", "hi", "reply").await.unwrap();

        let renderer = Arc::new(CollectingRenderer::default());
        let handle = spawn_poll_task(
            Arc::clone(&store),
            Arc::clone(&renderer) as Arc<dyn ExchangeRenderer>,
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        let batches = renderer.batches.lock().unwrap();
        assert!(batches.len() >= 2, "expected repeated polls, got {}", batches.len());
        assert_eq!(batches[0][0].message, "hi");
    }

    #[tokio::test]
    async fn poll_task_survives_read_failures() {
        let renderer = Arc::new(CollectingRenderer::default());
        let handle = spawn_poll_task(
            Arc::new(BrokenStore),
            Arc::clone(&renderer) as Arc<dyn ExchangeRenderer>,
            Duration::from_millis(10),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert!(*renderer.errors.lock().unwrap() >= 2);
    }
}
