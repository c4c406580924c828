use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::{QueryError, StoreError};

/// Failures surfaced to API clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-bounds request. Raised before any datastore call.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Datastore failure. Details are logged where the failure happened and
    /// never echoed to the client.
    #[error("Datastore request failed")]
    Upstream(#[source] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("{id} not found")),
            other => ApiError::Upstream(other),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{status, message}` body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = ErrorEnvelope {
            status: status.as_u16(),
            message: self.to_string(),
        };

        let mut response = (status, Json(envelope.clone())).into_response();
        response.extensions_mut().insert(envelope);
        response
    }
}

const XML: &str = "application/xml";

/// Re-render error envelopes as XML for clients that ask for it.
pub async fn negotiate_errors(request: Request, next: Next) -> Response {
    let wants_xml = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == XML);

    let response = next.run(request).await;
    if !wants_xml {
        return response;
    }

    let Some(envelope) = response.extensions().get::<ErrorEnvelope>().cloned() else {
        return response;
    };

    match quick_xml::se::to_string_with_root("map", &envelope) {
        Ok(body) => {
            let mut xml = (response.status(), body).into_response();
            xml.headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(XML));
            xml
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to render error envelope as XML");
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_categories() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("gone".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::Query("syntax error near WHERE".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err = ApiError::from(StoreError::NotFound("12345".into()));
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_upstream_message_hides_details() {
        let err = ApiError::from(StoreError::Query(
            "SELECT * FROM fdc WHERE secret".into(),
        ));
        assert_eq!(err.to_string(), "Datastore request failed");
    }

    #[test]
    fn test_envelope_xml_shape() {
        let xml = quick_xml::se::to_string_with_root(
            "map",
            &ErrorEnvelope {
                status: 404,
                message: "No food found!".into(),
            },
        )
        .unwrap();
        assert_eq!(
            xml,
            "<map><status>404</status><message>No food found!</message></map>"
        );
    }
}
