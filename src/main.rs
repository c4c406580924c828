use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

use fdc_api::app_state::AppState;
use fdc_api::config::AppConfig;
use fdc_api::db::couchbase::CouchbaseStore;
use fdc_api::db::queries::QueryBuilder;
use fdc_api::routes;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing fdc-api server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "datastore_queries_total",
        "Datastore round trips by outcome"
    );
    metrics::describe_histogram!(
        "datastore_query_seconds",
        "Time spent in datastore round trips"
    );
    metrics::describe_counter!(
        "identifier_resolutions_total",
        "UPC to fdcId lookups by outcome"
    );

    tracing::info!(
        query_url = %config.couchbase_query_url,
        bucket = %config.couchbase_bucket,
        "Connecting to Couchbase"
    );
    let settings = config.couchbase();
    let store = CouchbaseStore::new(&settings).expect("Failed to initialize Couchbase client");
    let queries = QueryBuilder::new(&settings.bucket, &settings.fts_index);

    let state = AppState::new(Arc::new(store), queries, &config.docs_dir);
    let app = routes::router(state, &config.route_prefix(), prometheus_handle);

    tracing::info!("Starting fdc-api on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
