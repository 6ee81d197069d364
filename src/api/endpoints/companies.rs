//! Company CRUD endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CompanyPayload};
use crate::db::repository;
use crate::models::Company;

#[derive(Deserialize)]
pub struct CompanyListQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// `GET /api/companies` — companies ordered by name.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<CompanyListQuery>,
) -> Result<Json<Vec<Company>>, ApiError> {
    let conn = ctx.open_db()?;
    let companies = repository::list_companies(&conn, query.active_only)?;
    Ok(Json(companies))
}

/// `POST /api/companies` — create a company.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CompanyPayload>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".into()));
    }

    let company = Company {
        id: Uuid::new_v4(),
        name: payload.name,
        vat_number: payload.vat_number,
        active: payload.active,
    };

    let conn = ctx.open_db()?;
    repository::insert_company(&conn, &company)?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// `GET /api/companies/:id`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, ApiError> {
    let conn = ctx.open_db()?;
    let company = repository::get_company(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("company {id} not found")))?;
    Ok(Json(company))
}

/// `PUT /api/companies/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyPayload>,
) -> Result<Json<Company>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".into()));
    }

    let company = Company {
        id,
        name: payload.name,
        vat_number: payload.vat_number,
        active: payload.active,
    };

    let conn = ctx.open_db()?;
    repository::update_company(&conn, &company)?;
    Ok(Json(company))
}

/// `DELETE /api/companies/:id` — fails with 409 while still referenced.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    repository::delete_company(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
