//! Formatrack service binary.
//!
//! Starts the admin API server and, when ALERT_HOUR is configured, the
//! in-process daily alert scheduler. Runs until Ctrl-C.

use tracing_subscriber::EnvFilter;

use formatrack::api::{start_api_server, ApiContext};
use formatrack::config::{self, AppConfig};
use formatrack::db::sqlite::open_database;
use formatrack::scheduler::start_alert_scheduler;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env();

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create data directory {}: {e}", parent.display()))?;
    }

    // Open once at startup so migrations run before anything serves traffic.
    open_database(&config.db_path).map_err(|e| format!("Cannot open database: {e}"))?;

    let _scheduler = config.alert_hour.map(|hour| {
        start_alert_scheduler(config.db_path.clone(), config.alert.clone(), hour)
    });

    let mut server = start_api_server(ApiContext::new(config))
        .await
        .map_err(|e| format!("Cannot start API server: {e}"))?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Cannot listen for shutdown signal: {e}"))?;

    tracing::info!("Shutting down");
    server.shutdown();
    Ok(())
}
