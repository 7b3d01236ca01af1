use std::{env, path::PathBuf, sync::Arc, time::Duration};

use coursehub_db_memory::MemoryCatalog;
use coursehub_storage::CatalogStorage;
use coursehub_server::cache::{CacheClient, PublishedCoursesCache, ViewCounters, create_backend};
use coursehub_server::catalog::CatalogService;
use coursehub_server::config::AppConfig;
use coursehub_server::notifications::LogDispatcher;
use coursehub_server::server::{AppState, ServerBuilder};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From COURSEHUB_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (coursehub.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (COURSEHUB_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (optional, local development)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let (config_path, source) = resolve_config_path();

    let cfg = match AppConfig::load(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    coursehub_server::observability::init_tracing_with_level(&cfg.logging.level);
    tracing::info!(
        path = %config_path.display(),
        source = %source,
        "Configuration loaded"
    );

    // Cache tier: Redis when configured and reachable, in-process otherwise.
    let backend = create_backend(&cfg.redis).await;
    let client = CacheClient::new(backend);
    let published_cache = PublishedCoursesCache::new(
        client.clone(),
        Duration::from_secs(cfg.cache.published_ttl_secs),
    );
    let view_counters =
        ViewCounters::new(client, Duration::from_secs(cfg.cache.views_window_secs));

    // Catalog store. The in-memory backend serves single-process deployments;
    // relational backends plug in through the same trait.
    let storage = Arc::new(MemoryCatalog::new());
    tracing::info!(backend = storage.backend_name(), "Catalog storage ready");

    let catalog = Arc::new(CatalogService::new(
        storage,
        published_cache,
        view_counters,
        Arc::new(LogDispatcher),
    ));

    let server = ServerBuilder::new(AppState { catalog })
        .with_config(cfg)
        .build();

    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

fn resolve_config_path() -> (PathBuf, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (PathBuf::from(path), ConfigSource::CliArgument);
            }
        }
    }
    if let Ok(path) = env::var("COURSEHUB_CONFIG") {
        return (PathBuf::from(path), ConfigSource::EnvironmentVariable);
    }
    (PathBuf::from("coursehub.toml"), ConfigSource::Default)
}
