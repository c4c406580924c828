use std::time::Duration;

use serde::Deserialize;

use crate::db::couchbase::CouchbaseSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path segment every API route is nested under
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Couchbase query service base URL (e.g., "http://localhost:8093")
    pub couchbase_query_url: String,

    /// Couchbase search service base URL (e.g., "http://localhost:8094")
    pub couchbase_search_url: String,

    pub couchbase_user: String,

    pub couchbase_password: String,

    /// Bucket holding foods, nutrient data and dictionaries
    pub couchbase_bucket: String,

    /// Full-text index used by food search
    pub couchbase_fts_index: String,

    /// Directory holding apiDoc.json and apiDoc.yaml
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    #[serde(default = "default_timeout_secs")]
    pub datastore_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_api_root() -> String {
    "v1".to_string()
}

fn default_docs_dir() -> String {
    "./dist".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn couchbase(&self) -> CouchbaseSettings {
        CouchbaseSettings {
            query_url: self.couchbase_query_url.clone(),
            search_url: self.couchbase_search_url.clone(),
            username: self.couchbase_user.clone(),
            password: self.couchbase_password.clone(),
            bucket: self.couchbase_bucket.clone(),
            fts_index: self.couchbase_fts_index.clone(),
            timeout: Duration::from_secs(self.datastore_timeout_secs),
        }
    }

    /// Route prefix, always with a single leading slash.
    pub fn route_prefix(&self) -> String {
        format!("/{}", self.api_root.trim_matches('/'))
    }
}
