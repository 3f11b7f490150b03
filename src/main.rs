//! I.D.T.F.E - Integrated Developer Tools for Efficiency
//!
//! Main entry point for the dashboard backend.
//!
//! # Execution Flow
//!
//! 1. Load configuration from `$IDTFE_CONFIG_DIR/idtfe.yaml` (default: current
//!    directory) layered with environment overrides
//! 2. Initialize logging → `<logging.dir>/<logging.prefix>.<date>`
//! 3. Create the tokio runtime
//! 4. Bind `server.host:server.port` and serve until Ctrl-C
//! 5. Log the metrics summary and shut the runtime down with a 5s timeout

use anyhow::{Context, Result};
use idtfe::server::{self, AppState};
use idtfe::{APP_NAME, ConfigManager, EnvFileStore, Metrics, VERSION};
use std::sync::Arc;

fn main() -> Result<()> {
    let config_dir = std::env::var("IDTFE_CONFIG_DIR").unwrap_or_else(|_| ".".to_string());
    let config_manager = ConfigManager::new(&config_dir)?;
    let config = config_manager.load_app_config()?;

    // Held until exit so buffered log lines are flushed
    let _log_guard = idtfe::logging::setup_logging(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("idtfe-worker")
        .build()?;

    let secrets_path = config_manager.secrets_path(&config);
    tracing::info!("Secret store: {}", secrets_path);

    let metrics = Arc::new(Metrics::new());
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        Arc::new(EnvFileStore::new(secrets_path)),
        Arc::clone(&metrics),
    ));

    let result = runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", bind_addr))?;
        server::serve(listener, state, server::shutdown_signal())
            .await
            .context("Server error")
    });

    metrics.log_summary();

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result
}
