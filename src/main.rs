use std::sync::Arc;

use sampark::classifier::Classifier;
use sampark::config::ResponderConfig;
use sampark::store::{ExchangeStore, LibSqlBackend};
use sampark::viewer::{self, LogRenderer};
use sampark::webhook::webhook_routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ResponderConfig::from_env()?;

    eprintln!("📨 Sampark v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook:  http://0.0.0.0:{}/incoming", config.port);
    eprintln!("   Recent:   http://0.0.0.0:{}/api/exchanges", config.port);
    eprintln!("   Viewer:   every {:?}", config.poll_interval);

    // ── Database ─────────────────────────────────────────────────────────
    // Opened once here and shared; closed when the process exits.
    let db_path = std::path::Path::new(&config.db_path);
    let store: Arc<dyn ExchangeStore> = Arc::new(
        LibSqlBackend::new_local(db_path).await.unwrap_or_else(|e| {
            eprintln!("Error: Failed to open database at {}: {}", config.db_path, e);
            std::process::exit(1);
        }),
    );

    eprintln!("   Database: {}\n", config.db_path);

    // ── Viewer ───────────────────────────────────────────────────────────
    let _viewer_handle = viewer::spawn_poll_task(
        Arc::clone(&store),
        Arc::new(LogRenderer),
        config.poll_interval,
    );

    // ── Webhook server ───────────────────────────────────────────────────
    let classifier = Arc::new(Classifier::default_rules());
    let app = webhook_routes(Arc::clone(&store), classifier);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
