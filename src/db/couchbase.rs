//! [`DataStore`] over the Couchbase query (N1QL) and search (FTS) REST
//! services.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::db::queries::QueryBuilder;
use crate::db::{DataStore, SearchHits, SearchQuery, Statement, StoreError, StoreResult};

/// Connection settings for one bucket.
#[derive(Debug, Clone)]
pub struct CouchbaseSettings {
    pub query_url: String,
    pub search_url: String,
    pub username: String,
    pub password: String,
    pub bucket: String,
    pub fts_index: String,
    pub timeout: Duration,
}

/// Client for a Couchbase bucket.
pub struct CouchbaseStore {
    http: Client,
    query_endpoint: String,
    search_url: String,
    username: String,
    password: String,
    statements: QueryBuilder,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    errors: Vec<QueryFailure>,
}

#[derive(Deserialize)]
struct QueryFailure {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_hits: u64,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: String,
}

#[derive(Deserialize)]
struct KeyedDocument {
    id: String,
    doc: Value,
}

impl CouchbaseStore {
    pub fn new(settings: &CouchbaseSettings) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("fdc-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            query_endpoint: format!("{}/query/service", settings.query_url.trim_end_matches('/')),
            search_url: settings.search_url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            statements: QueryBuilder::new(&settings.bucket, &settings.fts_index),
        })
    }

    async fn execute(&self, statement: &Statement) -> StoreResult<Vec<Value>> {
        let start = Instant::now();
        let result = self.send_statement(statement).await;

        metrics::histogram!("datastore_query_seconds").record(start.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("datastore_queries_total", "outcome" => outcome).increment(1);

        if let Err(ref e) = result {
            let params = Value::Object(statement.params.clone());
            error!(
                statement = %statement.text,
                params = %params,
                error = %e,
                "Datastore statement failed"
            );
        }
        result
    }

    async fn send_statement(&self, statement: &Statement) -> StoreResult<Vec<Value>> {
        let mut body = Map::with_capacity(statement.params.len() + 1);
        body.insert("statement".to_string(), Value::String(statement.text.clone()));
        body.extend(statement.params.clone());

        let response = self
            .http
            .post(&self.query_endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let parsed: QueryResponse = response.json().await?;
        if parsed.status != "success" || !parsed.errors.is_empty() {
            let detail = parsed
                .errors
                .iter()
                .map(|e| format!("{} {}", e.code, e.msg))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::Query(format!("status {}: {detail}", parsed.status)));
        }
        Ok(parsed.results)
    }
}

#[async_trait]
impl DataStore for CouchbaseStore {
    async fn get(&self, id: &str) -> StoreResult<Value> {
        self.execute(&self.statements.get_by_key(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn put(&self, id: &str, doc: &Value) -> StoreResult<()> {
        self.execute(&self.statements.upsert(id, doc)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let removed = self.execute(&self.statements.delete_by_key(id)).await?;
        if removed.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn query(&self, statement: &Statement) -> StoreResult<Vec<Value>> {
        self.execute(statement).await
    }

    async fn search(&self, query: &SearchQuery) -> StoreResult<SearchHits> {
        let url = format!("{}/api/index/{}/query", self.search_url, query.index);
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&query.body)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        metrics::histogram!("datastore_query_seconds").record(start.elapsed().as_secs_f64());

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                metrics::counter!("datastore_queries_total", "outcome" => "error").increment(1);
                error!(index = %query.index, body = %query.body, error = %e, "Full-text search failed");
                return Err(e.into());
            }
        };
        metrics::counter!("datastore_queries_total", "outcome" => "ok").increment(1);

        let parsed: SearchResponse = response.json().await?;
        let keys: Vec<String> = parsed.hits.into_iter().map(|h| h.id).collect();
        if keys.is_empty() {
            return Ok(SearchHits {
                total: parsed.total_hits,
                rows: Vec::new(),
            });
        }

        // USE KEYS does not preserve order; restore relevance order.
        let mut fetched: HashMap<String, Value> = self
            .execute(&self.statements.documents_by_keys(&keys))
            .await?
            .into_iter()
            .filter_map(|row| serde_json::from_value::<KeyedDocument>(row).ok())
            .map(|d| (d.id, d.doc))
            .collect();

        let mut rows = Vec::with_capacity(keys.len());
        for key in &keys {
            match fetched.remove(key) {
                Some(doc) => rows.push(doc),
                None => warn!(key = %key, "Search hit has no backing document"),
            }
        }

        Ok(SearchHits {
            total: parsed.total_hits,
            rows,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.execute(&Statement::new("SELECT 1")).await?;
        Ok(())
    }
}
