use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::db::StoreError;
use crate::error::{negotiate_errors, ApiError};

pub mod dictionary;
pub mod docs;
pub mod foods;
pub mod health;
pub mod metrics;
pub mod nutrients;
pub mod search;

/// Request bodies are small JSON documents.
const BODY_LIMIT: usize = 1024 * 1024;

/// Build the full application router. API routes are nested under
/// `api_prefix`; `/health` and `/metrics` stay at the root.
pub fn router(state: AppState, api_prefix: &str, prometheus: Arc<PrometheusHandle>) -> Router {
    let api = Router::new()
        .route("/food/{id}", get(foods::food_by_id))
        .route("/foods", get(foods::foods_by_ids))
        .route("/foods/browse", get(foods::browse_foods))
        .route(
            "/foods/search",
            get(search::search_foods).post(search::search_foods_body),
        )
        .route("/foods/count/{doctype}", get(foods::count_documents))
        .route("/dictionary/{type}", get(dictionary::browse_dictionary))
        .route("/nutrients/food/{id}", get(nutrients::nutrient_panel))
        .route("/nutrients/foods", get(nutrients::nutrient_panels))
        .route("/nutrients/report", post(nutrients::nutrient_report))
        .route("/docs/{type}", get(docs::api_document));

    let app = match api_prefix.trim_end_matches('/') {
        "" => Router::new().merge(api),
        prefix => Router::new().nest(prefix, api),
    };

    app.route("/health", get(health::health_check))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(prometheus),
        )
        .layer(middleware::from_fn(negotiate_errors))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}

/// Decode datastore rows into a response type.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ApiError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| {
                tracing::error!(error = %e, "Datastore row has an unexpected shape");
                ApiError::from(StoreError::Decode(e))
            })
        })
        .collect()
}
