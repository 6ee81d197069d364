//! Job trigger endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::alerts::{run_expiry_alert_job, AlertRunReport};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::mailer::ResendMailer;

/// `POST /api/jobs/expiry-alert` — run the daily expiry alert now.
///
/// This is the entry point for the external scheduler (a cron curling the
/// endpoint once a day). The run is synchronous: the response carries the
/// match count, or a 502 with provider detail when delivery fails. The
/// blocking mail client runs on the blocking pool, not the async runtime.
pub async fn run_expiry_alert(
    State(ctx): State<ApiContext>,
) -> Result<Json<AlertRunReport>, ApiError> {
    let report = tokio::task::spawn_blocking(move || -> Result<AlertRunReport, ApiError> {
        let conn = ctx.open_db()?;
        let mailer = ResendMailer::from_config(&ctx.config.alert);
        let today = Utc::now().date_naive();
        run_expiry_alert_job(&conn, &mailer, &ctx.config.alert, today).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(report))
}
