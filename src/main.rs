//! Rickdex - a Rick and Morty character and episode browser
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! The binary initializes:
//! - Configuration ([`ConfigManager`], `Rickdex Data/Rickdex.yaml` plus `RICKDEX_*` overrides)
//! - Logging (daily rotating file, optional console output)
//! - Tokio runtime for the GraphQL requests
//! - State management ([`StateManager`]) and the [`QueryCoordinator`]
//! - The [`AvatarLoader`] for character images
//! - The window ([`AppController`])
//!
//! Threading model:
//! - **Main thread**: runs the Slint event loop
//! - **Tokio workers**: run the GraphQL queries and avatar downloads
//! - **State listener**: std::thread that re-renders on state changes
//!
//! # Execution Flow
//!
//! 1. Load configuration (writing defaults on first run)
//! 2. Initialize logging → `<log_dir>/rickdex.<date>`
//! 3. Create the tokio runtime
//! 4. Build transport, client, state manager and coordinator
//! 5. Create the window and mount the character list (initial fetch)
//! 6. Run the Slint event loop until the window closes
//! 7. Abort in-flight queries, log metrics, shut the runtime down

use anyhow::{Context, Result};
use camino::Utf8Path;
use rickdex::services::{AvatarLoader, GraphQlClient, HttpTransport, QueryCoordinator};
use rickdex::ui::AppController;
use rickdex::{APP_NAME, ConfigManager, QueryMetrics, StateManager, VERSION};
use std::sync::Arc;
use std::time::Duration;

/// Directory holding `Rickdex.yaml`
const DATA_DIR: &str = "Rickdex Data";

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(DATA_DIR)?;
    let wrote_default = config_manager.write_default_if_missing()?;
    let config = config_manager.load()?;

    let _guard = rickdex::logging::setup_logging_with_console(
        Utf8Path::new(&config.log_dir),
        "rickdex",
        config.debug_mode,
        config.log_to_console,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if wrote_default {
        tracing::info!("Wrote default config to {}", config_manager.config_path());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("rickdex-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;
    tracing::info!("GraphQL endpoint: {}", transport.endpoint());

    let state_manager = Arc::new(StateManager::new());
    let metrics = Arc::new(QueryMetrics::new());
    let avatars = Arc::new(AvatarLoader::new(
        Arc::new(transport.clone()),
        Arc::clone(&state_manager),
        runtime.handle().clone(),
        Arc::clone(&metrics),
    ));
    let coordinator = Arc::new(QueryCoordinator::new(
        Arc::clone(&state_manager),
        Arc::new(GraphQlClient::new(transport)),
        config.fetch_policy,
        runtime.handle().clone(),
        Arc::clone(&metrics),
    ));

    let controller = AppController::new(
        state_manager,
        Arc::clone(&coordinator),
        avatars,
        Arc::clone(&metrics),
    )?;
    coordinator.mount();

    tracing::info!("App controller initialized, launching window");

    // Blocks until the window is closed
    let result = controller.run();

    tracing::info!("GUI closed, shutting down");
    coordinator.shutdown();
    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
