//! Expiry schedule endpoints: dashboard view, apprenticeship list, CSV export.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard::{
    apply_schedule_filter, fetch_apprenticeship_schedule, fetch_expiry_schedule, status_counts,
    ApprenticeshipScheduleRow, ExpiryRow, StatusCounts,
};
use crate::export::{export_filename, schedule_to_csv};
use crate::models::{CertificateStatus, ScheduleFilter};

#[derive(Deserialize)]
pub struct ScheduleQuery {
    /// Live status filter, e.g. `due_in_6m`.
    pub status: Option<String>,
    pub company_id: Option<Uuid>,
    /// Name search, case-insensitive substring.
    pub q: Option<String>,
}

impl ScheduleQuery {
    fn into_filter(self) -> Result<ScheduleFilter, ApiError> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                CertificateStatus::from_str(raw)
                    .map_err(|_| ApiError::BadRequest(format!("invalid status: {raw}")))?,
            ),
        };
        Ok(ScheduleFilter {
            status,
            company_id: self.company_id,
            name_search: self.q.filter(|q| !q.is_empty()),
        })
    }
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    /// KPI counts over the whole schedule, before filtering.
    pub counts: StatusCounts,
    pub rows: Vec<ExpiryRow>,
}

/// `GET /api/schedule` — expiry schedule with live status, KPI counts,
/// and optional status/company/name filters.
pub async fn schedule(
    State(ctx): State<ApiContext>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let filter = query.into_filter()?;
    let conn = ctx.open_db()?;
    let today = Utc::now().date_naive();

    let all_rows = fetch_expiry_schedule(&conn, today)?;
    let counts = status_counts(&all_rows);
    let rows = apply_schedule_filter(all_rows, &filter);

    Ok(Json(ScheduleResponse { counts, rows }))
}

/// `GET /api/schedule/export` — the filtered schedule as a CSV download.
pub async fn export_csv(
    State(ctx): State<ApiContext>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Response, ApiError> {
    let filter = query.into_filter()?;
    let conn = ctx.open_db()?;
    let today = Utc::now().date_naive();

    let rows = apply_schedule_filter(fetch_expiry_schedule(&conn, today)?, &filter);
    let csv = schedule_to_csv(&rows)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(today));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// `GET /api/schedule/apprenticeships` — apprenticeships, next milestone
/// first.
pub async fn apprenticeships(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<ApprenticeshipScheduleRow>>, ApiError> {
    let conn = ctx.open_db()?;
    let rows = fetch_apprenticeship_schedule(&conn)?;
    Ok(Json(rows))
}
