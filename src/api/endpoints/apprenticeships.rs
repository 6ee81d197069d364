//! Apprenticeship CRUD endpoints.
//!
//! The lifecycle status comes from the payload as-is: it is the operator's
//! call, never derived from the milestone date.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApprenticeshipPayload};
use crate::db::repository;
use crate::models::Apprenticeship;

fn apprenticeship_from_payload(id: Uuid, payload: ApprenticeshipPayload) -> Apprenticeship {
    Apprenticeship {
        id,
        employee_id: payload.employee_id,
        company_id: payload.company_id,
        contract_start: payload.contract_start,
        contract_end: payload.contract_end,
        annuities_completed: payload.annuities_completed,
        annuities_remaining: payload.annuities_remaining,
        next_milestone_due: payload.next_milestone_due,
        status: payload.status,
        notes: payload.notes,
    }
}

/// `POST /api/apprenticeships`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ApprenticeshipPayload>,
) -> Result<(StatusCode, Json<Apprenticeship>), ApiError> {
    let app = apprenticeship_from_payload(Uuid::new_v4(), payload);
    let conn = ctx.open_db()?;
    repository::insert_apprenticeship(&conn, &app)?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// `GET /api/apprenticeships/:id`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Apprenticeship>, ApiError> {
    let conn = ctx.open_db()?;
    let app = repository::get_apprenticeship(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("apprenticeship {id} not found")))?;
    Ok(Json(app))
}

/// `PUT /api/apprenticeships/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprenticeshipPayload>,
) -> Result<Json<Apprenticeship>, ApiError> {
    let app = apprenticeship_from_payload(id, payload);
    let conn = ctx.open_db()?;
    repository::update_apprenticeship(&conn, &app)?;
    Ok(Json(app))
}

/// `DELETE /api/apprenticeships/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    repository::delete_apprenticeship(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
