use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use tracing::info;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::browse::BrowseResult;
use crate::models::request::{SearchParams, SearchRequest, SearchSpec};

/// GET /foods/search?q=..
pub async fn search_foods(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<BrowseResult<Value>>, ApiError> {
    run_search(&state, params.normalize()?).await
}

/// POST /foods/search
pub async fn search_foods_body(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<BrowseResult<Value>>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    run_search(&state, body.normalize()?).await
}

async fn run_search(
    state: &AppState,
    spec: SearchSpec,
) -> Result<Json<BrowseResult<Value>>, ApiError> {
    let hits = state.store.search(&state.queries.search(&spec)).await?;
    info!(
        query = %spec.query,
        total = hits.total,
        returned = hits.rows.len(),
        "Food search"
    );
    Ok(Json(BrowseResult::new(hits.rows, spec.offset, spec.max)))
}
