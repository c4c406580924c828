use std::path::PathBuf;
use std::sync::Arc;

use crate::db::queries::QueryBuilder;
use crate::db::DataStore;
use crate::services::resolver::IdentifierResolver;

/// Shared application state passed to all route handlers.
///
/// Everything here is fixed at start-up; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub queries: Arc<QueryBuilder>,
    pub docs_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, queries: QueryBuilder, docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            queries: Arc::new(queries),
            docs_dir: Arc::new(docs_dir.into()),
        }
    }

    pub fn resolver(&self) -> IdentifierResolver<'_> {
        IdentifierResolver::new(self.store.as_ref(), &self.queries)
    }
}
