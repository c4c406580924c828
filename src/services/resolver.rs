use serde_json::Value;
use tracing::{info, warn};

use crate::db::queries::QueryBuilder;
use crate::db::{DataStore, StoreResult};

/// Primary ids are at most this long; anything longer and all-digit is
/// taken to be a UPC/GTIN.
const MAX_PRIMARY_ID_LEN: usize = 7;

/// Whether `id` looks like an alternate (barcode) code rather than an fdcId.
pub fn is_alternate_code(id: &str) -> bool {
    id.len() > MAX_PRIMARY_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

/// Maps UPCs to fdcIds through the datastore.
pub struct IdentifierResolver<'a> {
    store: &'a dyn DataStore,
    queries: &'a QueryBuilder,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(store: &'a dyn DataStore, queries: &'a QueryBuilder) -> Self {
        Self { store, queries }
    }

    /// Resolve one candidate. fdcIds pass through untouched; a UPC with no
    /// matching food resolves to an empty string. When several foods carry
    /// the same UPC the last row wins.
    pub async fn resolve(&self, candidate: &str) -> StoreResult<String> {
        if !is_alternate_code(candidate) {
            return Ok(candidate.to_string());
        }

        let rows = self.store.query(&self.queries.resolve_upc(candidate)).await?;
        let resolved = match rows.into_iter().last() {
            Some(Value::String(id)) => id,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        let outcome = if resolved.is_empty() { "unmatched" } else { "matched" };
        metrics::counter!("identifier_resolutions_total", "outcome" => outcome).increment(1);
        info!(upc = %candidate, fdc_id = %resolved, "Resolved alternate code");
        Ok(resolved)
    }

    /// Resolve every candidate in order, one lookup per alternate code.
    /// Failed lookups leave an empty slot rather than aborting the batch.
    pub async fn resolve_all<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        let mut resolved = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let candidate = candidate.as_ref();
            match self.resolve(candidate).await {
                Ok(id) => resolved.push(id),
                Err(e) => {
                    warn!(upc = %candidate, error = %e, "Alternate code lookup failed");
                    resolved.push(String::new());
                }
            }
        }
        resolved
    }
}
