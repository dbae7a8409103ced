//! Webhook + dashboard REST endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Form, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use super::twiml;
use crate::classifier::Classifier;
use crate::store::ExchangeStore;

/// Default number of rows returned by the dashboard read.
const DEFAULT_RECENT_LIMIT: usize = 20;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExchangeStore>,
    pub classifier: Arc<Classifier>,
}

/// Build the Axum router with the webhook and dashboard routes.
pub fn webhook_routes(store: Arc<dyn ExchangeStore>, classifier: Arc<Classifier>) -> Router {
    let state = AppState { store, classifier };

    Router::new()
        .route("/", get(index))
        .route("/incoming", post(incoming_message))
        .route("/api/exchanges", get(list_exchanges))
        // The dashboard is served elsewhere and polls this API.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sampark"
    }))
}

// ── Carrier webhook ─────────────────────────────────────────────────────

/// Inbound form fields as sent by the carrier.
///
/// Absent fields are treated as empty text, never rejected.
#[derive(Debug, Deserialize)]
pub struct IncomingForm {
    #[serde(rename = "From", default)]
    from: Option<String>,
    #[serde(rename = "Body", default)]
    body: Option<String>,
}

async fn incoming_message(
    State(state): State<AppState>,
    Form(form): Form<IncomingForm>,
) -> Response {
    let sender = form.from.unwrap_or_default();
    let body = form.body.unwrap_or_default();
    let reply = state.classifier.classify(Some(&body));

    match state.store.record(&sender, &body, reply).await {
        Ok(exchange) => {
            info!(id = exchange.id, sender = %exchange.sender, "Inbound message answered");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/xml")],
                twiml::message_response(reply),
            )
                .into_response()
        }
        Err(e) => {
            // Not durably recorded — the carrier must see the failure.
            error!(error = %e, sender = %sender, "Failed to record exchange");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// ── Dashboard read ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    limit: Option<usize>,
}

async fn list_exchanges(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT).max(1);

    match state.store.recent(limit).await {
        Ok(exchanges) => Json(exchanges).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read recent exchanges");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
