use anyhow::Context;
use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use marketplace_search::config::loader::CliArgs;
use marketplace_search::config::types::{IndexBackend, IndexConfig, ServiceConfig, StoreBackend, StoreConfig};
use marketplace_search::index::TextIndex;
use marketplace_search::index::analyzer::Analyzer;
use marketplace_search::index::elastic::ElasticIndex;
use marketplace_search::index::memory::MemoryIndex;
use marketplace_search::search::aggregator::Aggregator;
use marketplace_search::search::handlers::{handle_health, handle_search, handle_search_products};
use marketplace_search::store::RecordStore;
use marketplace_search::store::handlers::handle_get_product;
use marketplace_search::store::memory::MemoryStore;
use marketplace_search::store::postgres::PgRecordStore;
use marketplace_search::store::remote::HttpRecordStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: {} [--config <file.json>] [--bind <addr:port>]", args[0]);
        eprintln!("Example: {} --bind 0.0.0.0:8080", args[0]);
        eprintln!("Example: {} --config gateway.json", args[0]);
        return Ok(());
    }

    let cli = CliArgs::parse(&args)?;
    let config = ServiceConfig::load(&cli, |key| std::env::var(key).ok())?;

    let level: tracing::Level = config
        .log_level
        .parse()
        .with_context(|| format!("invalid log level {}", config.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Starting search gateway on {}", config.bind);

    // 1. Text index:
    let index = build_index(&config.index).await?;
    tracing::info!("Text index backend: {}", index.name());

    // 2. Record store:
    let store = build_store(&config.store).await?;
    tracing::info!("Record store backend: {}", store.name());

    // 3. Aggregator:
    let aggregator = Arc::new(Aggregator::new(index, store.clone(), config.search.clone()));
    tracing::info!(
        "Limits: default {} max {} (batch lookup: {})",
        config.search.default_limit,
        config.search.max_limit,
        config.search.batch_lookup
    );

    // 4. HTTP Router:
    let app = Router::new()
        .route("/products/search", post(handle_search_products))
        .route("/search", get(handle_search))
        .route("/products/:id", get(handle_get_product))
        .route("/health", get(handle_health))
        .layer(Extension(aggregator))
        .layer(Extension(store));

    // 5. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_index(config: &IndexConfig) -> anyhow::Result<Arc<dyn TextIndex>> {
    match config.backend {
        IndexBackend::Elasticsearch => {
            let index = ElasticIndex::new(config);
            if config.create_if_missing && index.ensure_index().await? {
                tracing::info!("Created index {}", config.index_name);
            }
            Ok(Arc::new(index))
        }
        IndexBackend::Memory => {
            let analyzer = Analyzer::from_config(&config.analyzer)?;
            let index = MemoryIndex::new(analyzer, config.name_boost);
            if let Some(path) = &config.seed_path {
                index.load_json_file(path)?;
            }
            Ok(Arc::new(index))
        }
    }
}

async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    let timeout = Duration::from_millis(config.timeout_ms);

    match config.backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("the postgres store needs a database_url")?;
            let store = PgRecordStore::connect(url, config.max_connections, timeout).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Http => {
            let url = config
                .base_url
                .as_deref()
                .context("the http store needs a base_url")?;
            Ok(Arc::new(HttpRecordStore::new(url, timeout)?))
        }
        StoreBackend::Memory => {
            let store = match &config.seed_path {
                Some(path) => MemoryStore::load_json_file(path)?,
                None => MemoryStore::new(),
            };
            tracing::info!("Loaded {} products into memory", store.len());
            Ok(Arc::new(store))
        }
    }
}
