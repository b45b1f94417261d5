//! `stitchlined` — the StitchLine server binary.
//!
//! Usage:
//!   stitchlined -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/stitchline/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use aitools::{AiModule, HttpPromptClient};
use auth::AuthModule;
use auth::service::AuthConfig;
use production::service::ProductionService;
use production::{FactoryRegistry, ProductionModule};
use stitchline_core::Module;

use config::ServerConfig;

/// StitchLine server.
#[derive(Parser, Debug)]
#[command(name = "stitchlined", about = "StitchLine production management server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = stitchline_core::ServiceConfig::under(&data_dir);

    // Embedded stores, shared by all modules.
    let sql: Arc<dyn stitchline_sql::SqlStore> = Arc::new(
        stitchline_sql::SqliteStore::open(&core_config.resolve_sqlite())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let overlay = stitchline_kv::OverlayStore::new(
        stitchline_kv::RedbStore::open(&core_config.resolve_kv())
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    let loaded = stitchline_kv::FileLoader::load(&core_config.config_dir(), &overlay)
        .map_err(|e| anyhow::anyhow!("failed to load config files: {}", e))?;
    info!("Loaded {} config entries into the KV file layer", loaded);
    let kv: Arc<dyn stitchline_kv::KvStore> = Arc::new(overlay);

    let search: Arc<dyn stitchline_search::SearchEngine> = Arc::new(
        stitchline_search::TantivyEngine::open(&core_config.resolve_search())
            .map_err(|e| anyhow::anyhow!("failed to open search engine: {}", e))?,
    );

    // ── Modules ──

    let auth_config = AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        access_token_ttl: server_config.jwt.expire_secs as i64,
        ..Default::default()
    };
    let auth_module = AuthModule::new(Arc::clone(&sql), auth_config)?;
    bootstrap::ensure_root(auth_module.service(), &server_config.root.password_hash)?;
    info!("Auth module initialized");

    let gate: Arc<dyn stitchline_core::AccessGate> =
        Arc::new(auth::AuthGate::new(auth_module.service().clone()));

    let mut registry = FactoryRegistry::new();
    for factory in &server_config.factories {
        let service = ProductionService::new(
            Arc::clone(&sql),
            Arc::clone(&kv),
            Arc::clone(&search),
            factory.id.clone(),
        )?;
        registry.insert(service);
        info!(factory = %factory.id, name = %factory.name, "factory registered");
    }
    let production_module = ProductionModule::new(registry, Arc::clone(&gate));
    info!("Production module initialized");

    let prompt_client = Arc::new(HttpPromptClient::new(
        server_config.ai.endpoint.clone(),
        server_config.ai.api_key.clone(),
    ));
    let ai_module = AiModule::new(aitools::service::AiService::new(
        prompt_client,
        Arc::clone(&kv),
    ));
    info!("AI tools module initialized");

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (production_module.name(), production_module.routes()),
        (ai_module.name(), ai_module.routes()),
    ];

    let app = routes::build_router(auth_module.service().clone(), module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("StitchLine server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
