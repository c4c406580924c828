//! Datastore contract and the query layer built on top of it.
//!
//! The store is a JSON document bucket that answers keyed get/put/delete,
//! SQL-like statements over the documents, and full-text search against a
//! named index. Everything above this module talks to it only through
//! [`DataStore`].

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod couchbase;
pub mod id_list;
pub mod queries;

pub use id_list::QueryError;

/// A statement plus the named parameters it references as `$name`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub text: String,
    pub params: Map<String, Value>,
    /// Field the statement sorts its rows by, when the caller relies on it.
    pub ordered_by: Option<&'static str>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Bind `$name` to `value`.
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(format!("${name}"), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(&format!("${name}"))
    }
}

/// A request against a full-text search index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub index: String,
    pub body: Value,
}

/// Full-text search result: the index's match count and the matching
/// documents in relevance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub rows: Vec<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("HTTP request to datastore failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("datastore rejected statement: {0}")]
    Query(String),

    #[error("failed to decode datastore response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The operations the API requires from the document store.
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// request for the lifetime of the process.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch a document by key.
    async fn get(&self, id: &str) -> StoreResult<Value>;

    /// Insert or replace a document.
    async fn put(&self, id: &str, doc: &Value) -> StoreResult<()>;

    /// Remove a document. Missing keys are `NotFound`.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Run a statement and return its rows in the order the store produced
    /// them.
    async fn query(&self, statement: &Statement) -> StoreResult<Vec<Value>>;

    /// Run a full-text search.
    async fn search(&self, query: &SearchQuery) -> StoreResult<SearchHits>;

    /// Connectivity check for health reporting.
    async fn ping(&self) -> StoreResult<()>;
}
