use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::app_state::AppState;
use crate::db::id_list::{check_batch_len, check_identifiers};
use crate::db::queries::NUTRIENT_GROUP_KEY;
use crate::db::StoreError;
use crate::error::ApiError;
use crate::models::nutrient::NutrientFoodBrowse;
use crate::models::request::{NutrientReport, NutrientReportRequest};
use crate::services::aggregation::{group_nutrient_rows, single_panel};

/// Optional repeated `n=` nutrient numbers.
#[derive(Debug, Default, Deserialize)]
pub struct PanelParams {
    #[serde(default)]
    pub n: Vec<String>,
}

/// Repeated `id=` and `n=` keys of `GET /nutrients/foods`.
#[derive(Debug, Default, Deserialize)]
pub struct PanelsParams {
    #[serde(default)]
    pub id: Vec<String>,
    #[serde(default)]
    pub n: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NutrientReportResponse {
    pub request: NutrientReport,
    pub items: Vec<Value>,
}

/// GET /nutrients/food/{id}
///
/// An unknown food yields an empty panel rather than an error.
pub async fn nutrient_panel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PanelParams>,
) -> Result<Json<NutrientFoodBrowse>, ApiError> {
    check_batch_len(params.n.len())?;
    check_identifiers(&[id.as_str()])?;
    check_identifiers(&params.n)?;

    let fdc_id = state.resolver().resolve(&id).await?;
    let statement = state.queries.nutrient_panel(&fdc_id, &params.n)?;
    let rows = state.store.query(&statement).await?;
    Ok(Json(single_panel(rows).map_err(StoreError::from)?))
}

/// GET /nutrients/foods?id=..&n=.. One panel per food, in fdcId order.
pub async fn nutrient_panels(
    State(state): State<AppState>,
    Query(params): Query<PanelsParams>,
) -> Result<Json<Vec<NutrientFoodBrowse>>, ApiError> {
    if params.id.is_empty() {
        return Err(ApiError::Validation(
            "At least one id parameter is required".to_string(),
        ));
    }
    check_batch_len(params.id.len())?;
    if !params.n.is_empty() {
        check_batch_len(params.id.len() * params.n.len())?;
    }
    check_identifiers(&params.id)?;
    check_identifiers(&params.n)?;

    let resolved = state.resolver().resolve_all(&params.id).await;
    let statement = state.queries.nutrient_panels(&resolved, &params.n)?;
    debug_assert_eq!(statement.ordered_by, Some(NUTRIENT_GROUP_KEY));

    let rows = state.store.query(&statement).await?;
    let panels = group_nutrient_rows(rows).map_err(StoreError::from)?;
    info!(requested = params.id.len(), panels = panels.len(), "Nutrient panels");
    Ok(Json(panels))
}

/// POST /nutrients/report
pub async fn nutrient_report(
    State(state): State<AppState>,
    payload: Result<Json<NutrientReportRequest>, JsonRejection>,
) -> Result<Json<NutrientReportResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let request = body.normalize()?;

    let items = state
        .store
        .query(&state.queries.nutrient_report(&request))
        .await?;
    Ok(Json(NutrientReportResponse { request, items }))
}
