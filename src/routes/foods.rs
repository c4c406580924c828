use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::app_state::AppState;
use crate::db::id_list::{check_batch_len, check_identifiers};
use crate::db::StoreError;
use crate::error::ApiError;
use crate::models::browse::BrowseResult;
use crate::models::food::{DocCount, Food};
use crate::models::request::BrowseParams;
use crate::routes::decode_rows;

/// Repeated `id=` keys of `GET /foods`.
#[derive(Debug, Default, Deserialize)]
pub struct IdsParams {
    #[serde(default)]
    pub id: Vec<String>,
}

/// GET /food/{id}. One food by fdcId or UPC.
pub async fn food_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BrowseResult<Food>>, ApiError> {
    let fdc_id = state.resolver().resolve(&id).await?;
    let doc = state.store.get(&fdc_id).await.map_err(|e| match e {
        StoreError::NotFound(_) => ApiError::NotFound(format!("No food found for {id}")),
        other => other.into(),
    })?;
    let food: Vec<Food> = decode_rows(vec![doc])?;
    Ok(Json(BrowseResult::exact(food)))
}

/// GET /foods?id=..&id=.. Foods for a batch of fdcIds or UPCs.
///
/// UPCs that resolve to nothing are carried as empty ids and simply match
/// no document, so the page may hold fewer foods than were asked for.
pub async fn foods_by_ids(
    State(state): State<AppState>,
    axum_extra::extract::Query(params): axum_extra::extract::Query<IdsParams>,
) -> Result<Json<BrowseResult<Food>>, ApiError> {
    if params.id.is_empty() {
        return Err(ApiError::Validation(
            "At least one id parameter is required".to_string(),
        ));
    }
    check_batch_len(params.id.len())?;
    check_identifiers(&params.id)?;

    let resolved = state.resolver().resolve_all(&params.id).await;
    let statement = state.queries.foods_by_ids(&resolved)?;
    let foods: Vec<Food> = decode_rows(state.store.query(&statement).await?)?;

    info!(requested = params.id.len(), found = foods.len(), "Foods by id");
    Ok(Json(BrowseResult::exact(foods)))
}

/// GET /foods/browse
pub async fn browse_foods(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<BrowseResult<Food>>, ApiError> {
    let request = params.normalize()?;
    let rows = state.store.query(&state.queries.browse(&request)).await?;
    let foods: Vec<Food> = decode_rows(rows)?;
    Ok(Json(BrowseResult::new(foods, request.page, request.max)))
}

/// GET /foods/count/{doctype}
pub async fn count_documents(
    State(state): State<AppState>,
    Path(doc_type): Path<String>,
) -> Result<Json<DocCount>, ApiError> {
    let rows = state.store.query(&state.queries.count(&doc_type)).await?;
    let count = rows
        .first()
        .and_then(|row| row.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    if count == 0 {
        return Err(ApiError::NotFound(format!(
            "No documents found for type {doc_type}"
        )));
    }
    Ok(Json(DocCount { doc_type, count }))
}
