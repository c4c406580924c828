use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use tracing::error;

use crate::app_state::AppState;
use crate::error::ApiError;

/// GET /docs/{type}. The OpenAPI document as `json` or `yaml`.
pub async fn api_document(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (file, content_type) = match kind.as_str() {
        "json" => ("apiDoc.json", "application/json"),
        "yaml" => ("apiDoc.yaml", "application/yaml"),
        _ => {
            return Err(ApiError::Validation(
                "a doc type is required: yaml or json".to_string(),
            ))
        }
    };

    let path = state.docs_dir.join(file);
    let body = tokio::fs::read(&path).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read API document");
        ApiError::NotFound(format!("{file} is not available"))
    })?;

    Ok(([(header::CONTENT_TYPE, content_type)], body))
}
