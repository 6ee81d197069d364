//! Shared types for the admin API layer.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::db::sqlite::open_database;
use crate::models::{ApprenticeshipStatus, CourseType};

/// Shared context for all API routes and middleware.
///
/// Connections are opened per request; SQLite handles are cheap to open
/// and this keeps handlers free of shared mutable state.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            db_path: Arc::new(config.db_path.clone()),
            config: Arc::new(config),
        }
    }

    /// Open a connection to the configured database.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.db_path).map_err(|e| ApiError::Internal(e.to_string()))
    }
}

fn default_true() -> bool {
    true
}

// ───────────────────────────────────────────────────────────
// Request payloads
// ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompanyPayload {
    pub name: String,
    pub vat_number: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct EmployeePayload {
    pub company_id: Uuid,
    pub full_name: String,
    pub tax_code: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Certificate fields as submitted by the form. `status` is absent on
/// purpose: the server freezes it from `expires_on` at save time.
#[derive(Debug, Deserialize)]
pub struct CertificatePayload {
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub course_type: CourseType,
    pub course_name: String,
    pub protocol: Option<String>,
    pub course_start: Option<NaiveDate>,
    pub course_end: Option<NaiveDate>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Apprenticeship fields as submitted by the form. Here `status` IS part
/// of the payload — the operator picks it.
#[derive(Debug, Deserialize)]
pub struct ApprenticeshipPayload {
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub annuities_completed: Option<String>,
    pub annuities_remaining: Option<String>,
    pub next_milestone_due: Option<NaiveDate>,
    pub status: ApprenticeshipStatus,
    pub notes: Option<String>,
}
