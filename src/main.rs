use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use product_catalog_backend::{
    build_router,
    config::{AppConfig, StoreBackend},
    llm::OpenAiClient,
    storage::{PostgresProductStore, ProductStore, SqliteProductStore},
    AppState,
};

#[derive(Parser)]
#[command(name = "product-catalog-backend", about = "Product catalog with AI translation and search")]
struct Cli {
    /// JSON config file (defaults to ~/.product-catalog/config.json when present)
    #[arg(long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).await?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let store: Arc<dyn ProductStore> = match config.store_backend() {
        StoreBackend::Postgres => Arc::new(
            PostgresProductStore::connect(&config.postgres)
                .await
                .context("connecting to postgres product store")?,
        ),
        StoreBackend::Sqlite => Arc::new(
            SqliteProductStore::open(&config.database_path)
                .await
                .context("opening sqlite product store")?,
        ),
    };
    let model = Arc::new(OpenAiClient::from_config(&config).context("building oracle client")?);

    let app = build_router(AppState::new(&config, store.clone(), model));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;
    tracing::info!("Server running on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
