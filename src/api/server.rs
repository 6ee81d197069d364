//! API server lifecycle — binds the listener and runs the axum server.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. The caller keeps the handle alive and triggers shutdown on
//! process exit.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::admin_api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind the configured address and serve the admin API in a background task.
pub async fn start_api_server(ctx: ApiContext) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(ctx.config.bind)
        .await
        .map_err(|e| format!("Failed to bind API server on {}: {e}", ctx.config.bind))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Cannot read bound address: {e}"))?;

    let router = admin_api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "API server exited with error");
        }
    });

    tracing::info!(%addr, "API server listening");

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlertConfig, AppConfig};

    #[tokio::test]
    async fn binds_ephemeral_port_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("test.db"),
            bind: "127.0.0.1:0".parse().unwrap(),
            api_token: None,
            alert: AlertConfig {
                recipient: String::new(),
                from: String::new(),
                resend_api_key: String::new(),
                resend_base_url: "http://127.0.0.1:1".to_string(),
                dashboard_url: None,
            },
            alert_hour: None,
        };

        let mut server = start_api_server(ApiContext::new(config)).await.unwrap();
        assert_ne!(server.addr.port(), 0);
        server.shutdown();
    }
}
