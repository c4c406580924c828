use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::browse::BrowseResult;
use crate::models::request::DictionaryParams;

/// GET /dictionary/{type}. Entries are passed through as stored.
pub async fn browse_dictionary(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<DictionaryParams>,
) -> Result<Json<BrowseResult<Value>>, ApiError> {
    let request = params.normalize(&kind)?;
    let rows = state.store.query(&state.queries.dictionary(&request)).await?;
    Ok(Json(BrowseResult::new(rows, request.offset, request.max)))
}
