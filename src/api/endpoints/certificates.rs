//! Certificate CRUD endpoints.
//!
//! Save-time status freezing happens here: both create and update classify
//! the submitted expiry date against today and persist the result. The
//! stored value is only a snapshot — schedule reads recompute it live.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CertificatePayload};
use crate::db::repository;
use crate::models::Certificate;
use crate::status::classify_status;

fn certificate_from_payload(id: Uuid, payload: CertificatePayload) -> Certificate {
    let today = Utc::now().date_naive();
    Certificate {
        id,
        employee_id: payload.employee_id,
        company_id: payload.company_id,
        course_type: payload.course_type,
        course_name: payload.course_name,
        protocol: payload.protocol,
        course_start: payload.course_start,
        course_end: payload.course_end,
        issued_on: payload.issued_on,
        expires_on: payload.expires_on,
        status: classify_status(payload.expires_on, today),
        notes: payload.notes,
    }
}

/// `POST /api/certificates` — create a certificate with a frozen status.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CertificatePayload>,
) -> Result<(StatusCode, Json<Certificate>), ApiError> {
    if payload.course_name.trim().is_empty() {
        return Err(ApiError::BadRequest("course_name must not be empty".into()));
    }

    let cert = certificate_from_payload(Uuid::new_v4(), payload);
    let conn = ctx.open_db()?;
    repository::insert_certificate(&conn, &cert)?;
    Ok((StatusCode::CREATED, Json(cert)))
}

/// `GET /api/certificates/:id`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Certificate>, ApiError> {
    let conn = ctx.open_db()?;
    let cert = repository::get_certificate(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("certificate {id} not found")))?;
    Ok(Json(cert))
}

/// `PUT /api/certificates/:id` — update and re-freeze the status.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CertificatePayload>,
) -> Result<Json<Certificate>, ApiError> {
    if payload.course_name.trim().is_empty() {
        return Err(ApiError::BadRequest("course_name must not be empty".into()));
    }

    let cert = certificate_from_payload(id, payload);
    let conn = ctx.open_db()?;
    repository::update_certificate(&conn, &cert)?;
    Ok(Json(cert))
}

/// `DELETE /api/certificates/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    repository::delete_certificate(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
