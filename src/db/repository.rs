//! CRUD repository over the SQLite store.
//!
//! All functions take an open `&Connection`; callers own the connection
//! lifecycle. Certificate `status` is stored exactly as passed in — freezing
//! a fresh classification at save time is the caller's job (see
//! `crate::status`), and the stored value is treated as a stale snapshot
//! everywhere else.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::*;

fn constraint(e: rusqlite::Error) -> DatabaseError {
    match &e {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(e.to_string())
        }
        _ => e.into(),
    }
}

// ═══════════════════════════════════════════
// Company Repository
// ═══════════════════════════════════════════

pub fn insert_company(conn: &Connection, company: &Company) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO companies (id, name, vat_number, active) VALUES (?1, ?2, ?3, ?4)",
        params![
            company.id.to_string(),
            company.name,
            company.vat_number,
            company.active as i32,
        ],
    )
    .map_err(constraint)?;
    Ok(())
}

pub fn get_company(conn: &Connection, id: &Uuid) -> Result<Option<Company>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, vat_number, active FROM companies WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i32>(3)?,
            ))
        },
    );

    match result {
        Ok((id, name, vat_number, active)) => Ok(Some(Company {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name,
            vat_number,
            active: active != 0,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_company(conn: &Connection, company: &Company) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE companies SET name = ?2, vat_number = ?3, active = ?4 WHERE id = ?1",
            params![
                company.id.to_string(),
                company.name,
                company.vat_number,
                company.active as i32,
            ],
        )
        .map_err(constraint)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "company".into(),
            id: company.id.to_string(),
        });
    }
    Ok(())
}

/// Delete a company. Fails with `ConstraintViolation` while employees or
/// records still reference it.
pub fn delete_company(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM companies WHERE id = ?1",
        params![id.to_string()],
    )
    .map_err(constraint)?;
    Ok(())
}

/// List companies ordered by name.
pub fn list_companies(conn: &Connection, active_only: bool) -> Result<Vec<Company>, DatabaseError> {
    let sql = if active_only {
        "SELECT id, name, vat_number, active FROM companies WHERE active = 1 ORDER BY name"
    } else {
        "SELECT id, name, vat_number, active FROM companies ORDER BY name"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, i32>(3)?,
        ))
    })?;

    let mut companies = Vec::new();
    for row in rows {
        let (id, name, vat_number, active) = row?;
        companies.push(Company {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name,
            vat_number,
            active: active != 0,
        });
    }
    Ok(companies)
}

// ═══════════════════════════════════════════
// Employee Repository
// ═══════════════════════════════════════════

pub fn insert_employee(conn: &Connection, employee: &Employee) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO employees (id, company_id, full_name, tax_code, active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            employee.id.to_string(),
            employee.company_id.to_string(),
            employee.full_name,
            employee.tax_code,
            employee.active as i32,
        ],
    )
    .map_err(constraint)?;
    Ok(())
}

struct EmployeeRow {
    id: String,
    company_id: String,
    full_name: String,
    tax_code: Option<String>,
    active: i32,
}

fn employee_from_row(row: EmployeeRow) -> Result<Employee, DatabaseError> {
    Ok(Employee {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        company_id: Uuid::parse_str(&row.company_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        full_name: row.full_name,
        tax_code: row.tax_code,
        active: row.active != 0,
    })
}

pub fn get_employee(conn: &Connection, id: &Uuid) -> Result<Option<Employee>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, company_id, full_name, tax_code, active FROM employees WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(EmployeeRow {
                id: row.get(0)?,
                company_id: row.get(1)?,
                full_name: row.get(2)?,
                tax_code: row.get(3)?,
                active: row.get(4)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(employee_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_employee(conn: &Connection, employee: &Employee) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE employees SET company_id = ?2, full_name = ?3, tax_code = ?4, active = ?5
             WHERE id = ?1",
            params![
                employee.id.to_string(),
                employee.company_id.to_string(),
                employee.full_name,
                employee.tax_code,
                employee.active as i32,
            ],
        )
        .map_err(constraint)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "employee".into(),
            id: employee.id.to_string(),
        });
    }
    Ok(())
}

/// Delete an employee; their certificates and apprenticeships cascade.
pub fn delete_employee(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM employees WHERE id = ?1",
        params![id.to_string()],
    )
    .map_err(constraint)?;
    Ok(())
}

/// List employees ordered by name, with optional company / active filters.
pub fn list_employees(
    conn: &Connection,
    filter: &EmployeeFilter,
) -> Result<Vec<Employee>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, company_id, full_name, tax_code, active FROM employees WHERE 1=1",
    );
    let mut args: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(company_id) = &filter.company_id {
        sql.push_str(" AND company_id = ?");
        args.push(rusqlite::types::Value::Text(company_id.to_string()));
    }
    if filter.active_only {
        sql.push_str(" AND active = 1");
    }
    sql.push_str(" ORDER BY full_name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| {
        Ok(EmployeeRow {
            id: row.get(0)?,
            company_id: row.get(1)?,
            full_name: row.get(2)?,
            tax_code: row.get(3)?,
            active: row.get(4)?,
        })
    })?;

    let mut employees = Vec::new();
    for row in rows {
        employees.push(employee_from_row(row?)?);
    }
    Ok(employees)
}

// ═══════════════════════════════════════════
// Certificate Repository
// ═══════════════════════════════════════════

pub fn insert_certificate(conn: &Connection, cert: &Certificate) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO certificates (id, employee_id, company_id, course_type, course_name,
         protocol, course_start, course_end, issued_on, expires_on, status, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            cert.id.to_string(),
            cert.employee_id.to_string(),
            cert.company_id.to_string(),
            cert.course_type.as_str(),
            cert.course_name,
            cert.protocol,
            cert.course_start.map(|d| d.to_string()),
            cert.course_end.map(|d| d.to_string()),
            cert.issued_on.map(|d| d.to_string()),
            cert.expires_on.map(|d| d.to_string()),
            cert.status.as_str(),
            cert.notes,
        ],
    )
    .map_err(constraint)?;
    Ok(())
}

// Internal row type for Certificate mapping
struct CertificateRow {
    id: String,
    employee_id: String,
    company_id: String,
    course_type: String,
    course_name: String,
    protocol: Option<String>,
    course_start: Option<String>,
    course_end: Option<String>,
    issued_on: Option<String>,
    expires_on: Option<String>,
    status: String,
    notes: Option<String>,
}

const CERTIFICATE_COLUMNS: &str = "id, employee_id, company_id, course_type, course_name,
         protocol, course_start, course_end, issued_on, expires_on, status, notes";

fn certificate_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CertificateRow> {
    Ok(CertificateRow {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        company_id: row.get(2)?,
        course_type: row.get(3)?,
        course_name: row.get(4)?,
        protocol: row.get(5)?,
        course_start: row.get(6)?,
        course_end: row.get(7)?,
        issued_on: row.get(8)?,
        expires_on: row.get(9)?,
        status: row.get(10)?,
        notes: row.get(11)?,
    })
}

fn certificate_from_row(row: CertificateRow) -> Result<Certificate, DatabaseError> {
    Ok(Certificate {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        employee_id: Uuid::parse_str(&row.employee_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        company_id: Uuid::parse_str(&row.company_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        course_type: CourseType::from_str(&row.course_type)?,
        course_name: row.course_name,
        protocol: row.protocol,
        course_start: row
            .course_start
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        course_end: row
            .course_end
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        issued_on: row
            .issued_on
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        expires_on: row
            .expires_on
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        status: CertificateStatus::from_str(&row.status)?,
        notes: row.notes,
    })
}

pub fn get_certificate(conn: &Connection, id: &Uuid) -> Result<Option<Certificate>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], certificate_row);

    match result {
        Ok(row) => Ok(Some(certificate_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_certificate(conn: &Connection, cert: &Certificate) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE certificates SET employee_id = ?2, company_id = ?3, course_type = ?4,
             course_name = ?5, protocol = ?6, course_start = ?7, course_end = ?8,
             issued_on = ?9, expires_on = ?10, status = ?11, notes = ?12
             WHERE id = ?1",
            params![
                cert.id.to_string(),
                cert.employee_id.to_string(),
                cert.company_id.to_string(),
                cert.course_type.as_str(),
                cert.course_name,
                cert.protocol,
                cert.course_start.map(|d| d.to_string()),
                cert.course_end.map(|d| d.to_string()),
                cert.issued_on.map(|d| d.to_string()),
                cert.expires_on.map(|d| d.to_string()),
                cert.status.as_str(),
                cert.notes,
            ],
        )
        .map_err(constraint)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "certificate".into(),
            id: cert.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_certificate(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM certificates WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

// ═══════════════════════════════════════════
// Apprenticeship Repository
// ═══════════════════════════════════════════

pub fn insert_apprenticeship(
    conn: &Connection,
    app: &Apprenticeship,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO apprenticeships (id, employee_id, company_id, contract_start,
         contract_end, annuities_completed, annuities_remaining, next_milestone_due,
         status, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            app.id.to_string(),
            app.employee_id.to_string(),
            app.company_id.to_string(),
            app.contract_start.map(|d| d.to_string()),
            app.contract_end.map(|d| d.to_string()),
            app.annuities_completed,
            app.annuities_remaining,
            app.next_milestone_due.map(|d| d.to_string()),
            app.status.as_str(),
            app.notes,
        ],
    )
    .map_err(constraint)?;
    Ok(())
}

struct ApprenticeshipRowRaw {
    id: String,
    employee_id: String,
    company_id: String,
    contract_start: Option<String>,
    contract_end: Option<String>,
    annuities_completed: Option<String>,
    annuities_remaining: Option<String>,
    next_milestone_due: Option<String>,
    status: String,
    notes: Option<String>,
}

fn apprenticeship_from_row(row: ApprenticeshipRowRaw) -> Result<Apprenticeship, DatabaseError> {
    Ok(Apprenticeship {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        employee_id: Uuid::parse_str(&row.employee_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        company_id: Uuid::parse_str(&row.company_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        contract_start: row
            .contract_start
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        contract_end: row
            .contract_end
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        annuities_completed: row.annuities_completed,
        annuities_remaining: row.annuities_remaining,
        next_milestone_due: row
            .next_milestone_due
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        status: ApprenticeshipStatus::from_str(&row.status)?,
        notes: row.notes,
    })
}

pub fn get_apprenticeship(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Apprenticeship>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, employee_id, company_id, contract_start, contract_end,
         annuities_completed, annuities_remaining, next_milestone_due, status, notes
         FROM apprenticeships WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(ApprenticeshipRowRaw {
                id: row.get(0)?,
                employee_id: row.get(1)?,
                company_id: row.get(2)?,
                contract_start: row.get(3)?,
                contract_end: row.get(4)?,
                annuities_completed: row.get(5)?,
                annuities_remaining: row.get(6)?,
                next_milestone_due: row.get(7)?,
                status: row.get(8)?,
                notes: row.get(9)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(apprenticeship_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_apprenticeship(
    conn: &Connection,
    app: &Apprenticeship,
) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE apprenticeships SET employee_id = ?2, company_id = ?3,
             contract_start = ?4, contract_end = ?5, annuities_completed = ?6,
             annuities_remaining = ?7, next_milestone_due = ?8, status = ?9, notes = ?10
             WHERE id = ?1",
            params![
                app.id.to_string(),
                app.employee_id.to_string(),
                app.company_id.to_string(),
                app.contract_start.map(|d| d.to_string()),
                app.contract_end.map(|d| d.to_string()),
                app.annuities_completed,
                app.annuities_remaining,
                app.next_milestone_due.map(|d| d.to_string()),
                app.status.as_str(),
                app.notes,
            ],
        )
        .map_err(constraint)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "apprenticeship".into(),
            id: app.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_apprenticeship(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM apprenticeships WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
