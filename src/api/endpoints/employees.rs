//! Employee CRUD endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, EmployeePayload};
use crate::db::repository;
use crate::models::{Employee, EmployeeFilter};

#[derive(Deserialize)]
pub struct EmployeeListQuery {
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub active_only: bool,
}

/// `GET /api/employees` — employees ordered by name, with optional filters.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let conn = ctx.open_db()?;
    let filter = EmployeeFilter {
        company_id: query.company_id,
        active_only: query.active_only,
    };
    let employees = repository::list_employees(&conn, &filter)?;
    Ok(Json(employees))
}

/// `POST /api/employees` — create an employee.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(payload): Json<EmployeePayload>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name must not be empty".into()));
    }

    let employee = Employee {
        id: Uuid::new_v4(),
        company_id: payload.company_id,
        full_name: payload.full_name,
        tax_code: payload.tax_code,
        active: payload.active,
    };

    let conn = ctx.open_db()?;
    repository::insert_employee(&conn, &employee)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// `GET /api/employees/:id`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    let conn = ctx.open_db()?;
    let employee = repository::get_employee(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("employee {id} not found")))?;
    Ok(Json(employee))
}

/// `PUT /api/employees/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<Employee>, ApiError> {
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name must not be empty".into()));
    }

    let employee = Employee {
        id,
        company_id: payload.company_id,
        full_name: payload.full_name,
        tax_code: payload.tax_code,
        active: payload.active,
    };

    let conn = ctx.open_db()?;
    repository::update_employee(&conn, &employee)?;
    Ok(Json(employee))
}

/// `DELETE /api/employees/:id` — their certificates cascade.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = ctx.open_db()?;
    repository::delete_employee(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
