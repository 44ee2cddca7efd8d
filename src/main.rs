// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use card_canvas::application::dataset_provider::Datasets;
use card_canvas::application::layout_store::LayoutStore;
use card_canvas::cards::register_builtin;
use card_canvas::infrastructure::config::load_app_config;
use card_canvas::infrastructure::layout_file::{JsonFileLayoutStore, MemoryLayoutStore};
use card_canvas::infrastructure::memory_dataset::Table;
use card_canvas::presentation::{app_state::AppState, router};
use card_canvas::{CardRegistry, DashboardService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Load datasets (infrastructure layer)
    let main_table = Table::load(&config.data.main)
        .await
        .with_context(|| format!("Failed to load dataset {}", config.data.main))?;
    let positions = Table::load(&config.data.positions)
        .await
        .with_context(|| format!("Failed to load dataset {}", config.data.positions))?;
    let datasets = Datasets::new(Arc::new(main_table), Arc::new(positions));

    let store: Arc<dyn LayoutStore> = match &config.layout.path {
        Some(path) => Arc::new(JsonFileLayoutStore::new(path)),
        None => Arc::new(MemoryLayoutStore::new()),
    };

    // Register card types and create the service (application layer)
    let mut registry = CardRegistry::new();
    register_builtin(&mut registry)?;
    let dashboard = DashboardService::new(Arc::new(registry), datasets, config.cards, store);
    dashboard.load_layout().await.context("Failed to restore saved layout")?;

    let state = Arc::new(AppState {
        dashboard,
        info: config.dashboard,
    });

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting card-canvas on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
