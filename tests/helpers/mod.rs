//! Test helper utilities for driving the router in-process

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use tower::ServiceExt;

use fdc_api::app_state::AppState;
use fdc_api::db::queries::QueryBuilder;
use fdc_api::db::{DataStore, SearchHits, SearchQuery, Statement, StoreError, StoreResult};
use fdc_api::routes;

pub const BUCKET: &str = "fdc";
pub const FTS_INDEX: &str = "fd_food";

type Responder = Box<dyn Fn(&Statement) -> StoreResult<Vec<Value>> + Send + Sync>;

/// In-process [`DataStore`] that answers statements from a script and
/// records everything it is asked.
pub struct ScriptedStore {
    docs: Mutex<HashMap<String, Value>>,
    responder: Responder,
    hits: SearchHits,
    healthy: bool,
    pub statements: Mutex<Vec<Statement>>,
    pub searches: Mutex<Vec<SearchQuery>>,
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            responder: Box::new(|_| Ok(Vec::new())),
            hits: SearchHits::default(),
            healthy: true,
            statements: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every statement with `respond`.
    pub fn responding(
        mut self,
        respond: impl Fn(&Statement) -> StoreResult<Vec<Value>> + Send + Sync + 'static,
    ) -> Self {
        self.responder = Box::new(respond);
        self
    }

    pub fn with_doc(self, key: &str, doc: Value) -> Self {
        self.docs.lock().unwrap().insert(key.to_string(), doc);
        self
    }

    pub fn with_hits(mut self, hits: SearchHits) -> Self {
        self.hits = hits;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn issued(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    /// Statements other than UPC lookups.
    pub fn data_statements(&self) -> Vec<Statement> {
        self.issued()
            .into_iter()
            .filter(|s| s.param("upc").is_none())
            .collect()
    }
}

#[async_trait]
impl DataStore for ScriptedStore {
    async fn get(&self, id: &str) -> StoreResult<Value> {
        self.docs
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn put(&self, id: &str, doc: &Value) -> StoreResult<()> {
        self.docs.lock().unwrap().insert(id.to_string(), doc.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.docs
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn query(&self, statement: &Statement) -> StoreResult<Vec<Value>> {
        self.statements.lock().unwrap().push(statement.clone());
        (self.responder)(statement)
    }

    async fn search(&self, query: &SearchQuery) -> StoreResult<SearchHits> {
        self.searches.lock().unwrap().push(query.clone());
        Ok(self.hits.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(StoreError::Query("connection refused".to_string()))
        }
    }
}

pub fn docs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/docs")
}

/// Full router over `store`, nested under `/v1`.
pub fn app(store: Arc<ScriptedStore>) -> Router {
    let state = AppState::new(store, QueryBuilder::new(BUCKET, FTS_INDEX), docs_dir());
    let prometheus = Arc::new(PrometheusBuilder::new().build_recorder().handle());
    routes::router(state, "/v1", prometheus)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse {
        status,
        content_type,
        body,
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_accept(app: Router, uri: &str, accept: &str) -> TestResponse {
    let request = Request::get(uri)
        .header(header::ACCEPT, accept)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> TestResponse {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> TestResponse {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
