//! Application constants, data paths, and environment-driven configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Formatrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the API server.
pub const DEFAULT_BIND: &str = "127.0.0.1:8473";

/// Default sender identity for alert emails.
pub const DEFAULT_ALERT_FROM: &str = "Formatrack <alerts@formatrack.app>";

/// Default Resend API base URL.
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

/// Get the application data directory
/// ~/Formatrack/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Formatrack")
}

/// Default database path inside the data directory.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("formatrack.db")
}

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,tower_http=warn".to_string()
}

/// Runtime configuration resolved from the environment at startup.
///
/// Everything is read once at process start; components receive the pieces
/// they need explicitly instead of consulting ambient global state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file (FORMATRACK_DB).
    pub db_path: PathBuf,
    /// API listen address (FORMATRACK_BIND).
    pub bind: SocketAddr,
    /// Optional static bearer token guarding the API (FORMATRACK_API_TOKEN).
    pub api_token: Option<String>,
    /// Alert email settings.
    pub alert: AlertConfig,
    /// UTC hour (0-23) for the in-process daily scheduler (ALERT_HOUR).
    /// `None` disables the scheduler; an external cron can still trigger
    /// the job through the API.
    pub alert_hour: Option<u32>,
}

/// Settings consumed by the expiry alert job and its mailer.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Recipient of the consolidated alert (ALERT_RECIPIENT).
    pub recipient: String,
    /// Sender identity (ALERT_FROM).
    pub from: String,
    /// Resend API key (RESEND_API_KEY). Empty means sending will fail —
    /// surfaced as a delivery error at job time, not at startup.
    pub resend_api_key: String,
    /// Resend API base URL (RESEND_BASE_URL), overridable for tests.
    pub resend_base_url: String,
    /// Dashboard link rendered in the email footer (DASHBOARD_URL).
    pub dashboard_url: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        let db_path = std::env::var("FORMATRACK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let bind = std::env::var("FORMATRACK_BIND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| DEFAULT_BIND.parse().expect("default bind is valid"));

        let api_token = std::env::var("FORMATRACK_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let alert_hour = std::env::var("ALERT_HOUR")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|h| *h < 24);

        Self {
            db_path,
            bind,
            api_token,
            alert: AlertConfig::from_env(),
            alert_hour,
        }
    }
}

impl AlertConfig {
    pub fn from_env() -> Self {
        Self {
            recipient: std::env::var("ALERT_RECIPIENT").unwrap_or_default(),
            from: std::env::var("ALERT_FROM")
                .unwrap_or_else(|_| DEFAULT_ALERT_FROM.to_string()),
            resend_api_key: std::env::var("RESEND_API_KEY").unwrap_or_default(),
            resend_base_url: std::env::var("RESEND_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RESEND_BASE_URL.to_string()),
            dashboard_url: std::env::var("DASHBOARD_URL").ok().filter(|u| !u.is_empty()),
        }
    }
}
