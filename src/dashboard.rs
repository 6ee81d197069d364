//! Dashboard read model — certificate expiry schedule and apprenticeship list.
//!
//! Provides the data layer behind the admin dashboard: joined schedule rows
//! with live status, KPI counts, filtering/search, and the exact-date lookup
//! the alert job runs. Status and days-remaining are always recomputed here
//! from today's date; the stored certificate status is a save-time snapshot
//! and is intentionally ignored on read.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{CertificateStatus, CourseType, ScheduleFilter};
use crate::status::{classify_status, days_remaining};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the certificate expiry schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryRow {
    pub certificate_id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub full_name: String,
    pub tax_code: Option<String>,
    pub company_name: String,
    pub course_type: CourseType,
    pub course_name: String,
    pub protocol: Option<String>,
    pub course_start: Option<NaiveDate>,
    pub course_end: Option<NaiveDate>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    /// Signed calendar days until expiry, from the evaluation date.
    pub days_remaining: Option<i64>,
    /// Live status, classified against the evaluation date at fetch time.
    pub status: CertificateStatus,
}

/// KPI tile counts over the whole schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub valid: u32,
    pub due_in_12m: u32,
    pub due_in_6m: u32,
    pub expired: u32,
}

/// One row of the apprenticeship list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprenticeshipScheduleRow {
    pub apprenticeship_id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub full_name: String,
    pub company_name: String,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub annuities_completed: Option<String>,
    pub annuities_remaining: Option<String>,
    pub next_milestone_due: Option<NaiveDate>,
    /// Operator-chosen state, reported as stored.
    pub status: crate::models::ApprenticeshipStatus,
}

// ---------------------------------------------------------------------------
// Certificate schedule
// ---------------------------------------------------------------------------

const EXPIRY_ROW_SELECT: &str = "SELECT c.id, c.employee_id, c.company_id, e.full_name,
            e.tax_code, co.name, c.course_type, c.course_name, c.protocol,
            c.course_start, c.course_end, c.issued_on, c.expires_on
     FROM certificates c
     JOIN employees e ON c.employee_id = e.id
     JOIN companies co ON c.company_id = co.id";

fn expiry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpiryRowRaw> {
    Ok(ExpiryRowRaw {
        certificate_id: row.get(0)?,
        employee_id: row.get(1)?,
        company_id: row.get(2)?,
        full_name: row.get(3)?,
        tax_code: row.get(4)?,
        company_name: row.get(5)?,
        course_type: row.get(6)?,
        course_name: row.get(7)?,
        protocol: row.get(8)?,
        course_start: row.get(9)?,
        course_end: row.get(10)?,
        issued_on: row.get(11)?,
        expires_on: row.get(12)?,
    })
}

struct ExpiryRowRaw {
    certificate_id: String,
    employee_id: String,
    company_id: String,
    full_name: String,
    tax_code: Option<String>,
    company_name: String,
    course_type: String,
    course_name: String,
    protocol: Option<String>,
    course_start: Option<String>,
    course_end: Option<String>,
    issued_on: Option<String>,
    expires_on: Option<String>,
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
}

fn expiry_row_from_raw(raw: ExpiryRowRaw, today: NaiveDate) -> Result<ExpiryRow, DatabaseError> {
    let expires_on = parse_date(raw.expires_on);
    Ok(ExpiryRow {
        certificate_id: Uuid::parse_str(&raw.certificate_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        employee_id: Uuid::parse_str(&raw.employee_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        company_id: Uuid::parse_str(&raw.company_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        full_name: raw.full_name,
        tax_code: raw.tax_code,
        company_name: raw.company_name,
        course_type: CourseType::from_str(&raw.course_type)?,
        course_name: raw.course_name,
        protocol: raw.protocol,
        course_start: parse_date(raw.course_start),
        course_end: parse_date(raw.course_end),
        issued_on: parse_date(raw.issued_on),
        expires_on,
        days_remaining: days_remaining(expires_on, today),
        status: classify_status(expires_on, today),
    })
}

/// Fetch the full expiry schedule, soonest expiry first (no expiry last).
///
/// `today` is the evaluation date for live status and days-remaining; pass
/// it in explicitly so reads are reproducible and testable.
pub fn fetch_expiry_schedule(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Vec<ExpiryRow>, DatabaseError> {
    let sql = format!(
        "{EXPIRY_ROW_SELECT}
         ORDER BY c.expires_on IS NULL, c.expires_on ASC, e.full_name ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], expiry_row)?;

    let mut schedule = Vec::new();
    for row in rows {
        schedule.push(expiry_row_from_raw(row?, today)?);
    }
    Ok(schedule)
}

/// Certificates whose expiry date equals `date` exactly — the alert job's
/// point lookup. An equality match on the ISO date column, deliberately not
/// a range: a certificate at 179 or 181 days out never matches.
pub fn fetch_expiry_rows_on(
    conn: &Connection,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<ExpiryRow>, DatabaseError> {
    let sql = format!(
        "{EXPIRY_ROW_SELECT}
         WHERE c.expires_on = ?1
         ORDER BY e.full_name ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![date.to_string()], expiry_row)?;

    let mut matches = Vec::new();
    for row in rows {
        matches.push(expiry_row_from_raw(row?, today)?);
    }
    Ok(matches)
}

/// Filter schedule rows by live status, company, and name search.
///
/// Runs after the fetch because status filtering needs the live
/// classification, which only exists in Rust.
pub fn apply_schedule_filter(rows: Vec<ExpiryRow>, filter: &ScheduleFilter) -> Vec<ExpiryRow> {
    let needle = filter.name_search.as_ref().map(|s| s.to_lowercase());
    rows.into_iter()
        .filter(|row| {
            if let Some(status) = filter.status {
                if row.status != status {
                    return false;
                }
            }
            if let Some(company_id) = filter.company_id {
                if row.company_id != company_id {
                    return false;
                }
            }
            if let Some(needle) = &needle {
                if !row.full_name.to_lowercase().contains(needle) {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Count rows per live status — the four dashboard KPI tiles.
pub fn status_counts(rows: &[ExpiryRow]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for row in rows {
        match row.status {
            CertificateStatus::Valid => counts.valid += 1,
            CertificateStatus::DueIn12m => counts.due_in_12m += 1,
            CertificateStatus::DueIn6m => counts.due_in_6m += 1,
            CertificateStatus::Expired => counts.expired += 1,
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Apprenticeship schedule
// ---------------------------------------------------------------------------

/// Fetch all apprenticeships, next milestone first (no milestone last).
pub fn fetch_apprenticeship_schedule(
    conn: &Connection,
) -> Result<Vec<ApprenticeshipScheduleRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.employee_id, a.company_id, e.full_name, co.name,
                a.contract_start, a.contract_end, a.annuities_completed,
                a.annuities_remaining, a.next_milestone_due, a.status
         FROM apprenticeships a
         JOIN employees e ON a.employee_id = e.id
         JOIN companies co ON a.company_id = co.id
         ORDER BY a.next_milestone_due IS NULL, a.next_milestone_due ASC, e.full_name ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, Option<String>>(9)?,
            row.get::<_, String>(10)?,
        ))
    })?;

    let mut schedule = Vec::new();
    for row in rows {
        let (
            id,
            employee_id,
            company_id,
            full_name,
            company_name,
            contract_start,
            contract_end,
            annuities_completed,
            annuities_remaining,
            next_milestone_due,
            status,
        ) = row?;
        schedule.push(ApprenticeshipScheduleRow {
            apprenticeship_id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            employee_id: Uuid::parse_str(&employee_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            company_id: Uuid::parse_str(&company_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            full_name,
            company_name,
            contract_start: parse_date(contract_start),
            contract_end: parse_date(contract_end),
            annuities_completed,
            annuities_remaining,
            next_milestone_due: parse_date(next_milestone_due),
            status: crate::models::ApprenticeshipStatus::from_str(&status)?,
        });
    }
    Ok(schedule)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seed_company(conn: &Connection, name: &str) -> Uuid {
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            vat_number: None,
            active: true,
        };
        insert_company(conn, &company).unwrap();
        company.id
    }

    fn seed_employee(conn: &Connection, company_id: Uuid, name: &str) -> Uuid {
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id,
            full_name: name.to_string(),
            tax_code: None,
            active: true,
        };
        insert_employee(conn, &employee).unwrap();
        employee.id
    }

    fn seed_certificate(
        conn: &Connection,
        employee_id: Uuid,
        company_id: Uuid,
        course: &str,
        expires_on: Option<NaiveDate>,
    ) -> Uuid {
        let cert = Certificate {
            id: Uuid::new_v4(),
            employee_id,
            company_id,
            course_type: CourseType::WorkerTraining,
            course_name: course.to_string(),
            protocol: None,
            course_start: None,
            course_end: None,
            issued_on: None,
            expires_on,
            // Deliberately wrong snapshot: reads must recompute.
            status: CertificateStatus::Valid,
            notes: None,
        };
        insert_certificate(conn, &cert).unwrap();
        cert.id
    }

    #[test]
    fn schedule_empty() {
        let conn = open_memory_database().unwrap();
        let rows = fetch_expiry_schedule(&conn, date("2026-03-01")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn schedule_ordered_by_expiry_nulls_last() {
        let conn = open_memory_database().unwrap();
        let company = seed_company(&conn, "Alfa Edile");
        let employee = seed_employee(&conn, company, "Rossi Mario");

        seed_certificate(&conn, employee, company, "Later", Some(date("2027-01-01")));
        seed_certificate(&conn, employee, company, "Sooner", Some(date("2026-05-01")));
        seed_certificate(&conn, employee, company, "Open-ended", None);

        let rows = fetch_expiry_schedule(&conn, date("2026-03-01")).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].course_name, "Sooner");
        assert_eq!(rows[1].course_name, "Later");
        assert_eq!(rows[2].course_name, "Open-ended");
        assert!(rows[2].expires_on.is_none());
    }

    #[test]
    fn schedule_status_is_live_not_stored() {
        let conn = open_memory_database().unwrap();
        let company = seed_company(&conn, "Alfa Edile");
        let employee = seed_employee(&conn, company, "Rossi Mario");
        // Stored snapshot says Valid, but the date is long past.
        seed_certificate(&conn, employee, company, "Old", Some(date("2020-01-01")));

        let rows = fetch_expiry_schedule(&conn, date("2026-03-01")).unwrap();
        assert_eq!(rows[0].status, CertificateStatus::Expired);
        assert!(rows[0].days_remaining.unwrap() < 0);
    }

    #[test]
    fn schedule_days_remaining_and_bands() {
        let conn = open_memory_database().unwrap();
        let company = seed_company(&conn, "Alfa Edile");
        let employee = seed_employee(&conn, company, "Rossi Mario");
        let today = date("2026-03-01");

        seed_certificate(&conn, employee, company, "Six", Some(today + Duration::days(90)));
        seed_certificate(&conn, employee, company, "Twelve", Some(today + Duration::days(300)));
        seed_certificate(&conn, employee, company, "Far", Some(today + Duration::days(400)));
        seed_certificate(&conn, employee, company, "None", None);

        let rows = fetch_expiry_schedule(&conn, today).unwrap();
        let by_name = |n: &str| rows.iter().find(|r| r.course_name == n).unwrap();
        assert_eq!(by_name("Six").status, CertificateStatus::DueIn6m);
        assert_eq!(by_name("Six").days_remaining, Some(90));
        assert_eq!(by_name("Twelve").status, CertificateStatus::DueIn12m);
        assert_eq!(by_name("Far").status, CertificateStatus::Valid);
        assert_eq!(by_name("None").status, CertificateStatus::Valid);
        assert_eq!(by_name("None").days_remaining, None);
    }

    #[test]
    fn filter_by_status_company_and_name() {
        let conn = open_memory_database().unwrap();
        let alfa = seed_company(&conn, "Alfa Edile");
        let beta = seed_company(&conn, "Beta Impianti");
        let rossi = seed_employee(&conn, alfa, "Rossi Mario");
        let verdi = seed_employee(&conn, beta, "Verdi Anna");
        let today = date("2026-03-01");

        seed_certificate(&conn, rossi, alfa, "A", Some(today + Duration::days(90)));
        seed_certificate(&conn, verdi, beta, "B", Some(today + Duration::days(90)));
        seed_certificate(&conn, verdi, beta, "C", Some(today + Duration::days(400)));

        let rows = fetch_expiry_schedule(&conn, today).unwrap();

        let due = apply_schedule_filter(
            rows.clone(),
            &ScheduleFilter {
                status: Some(CertificateStatus::DueIn6m),
                ..Default::default()
            },
        );
        assert_eq!(due.len(), 2);

        let beta_only = apply_schedule_filter(
            rows.clone(),
            &ScheduleFilter {
                company_id: Some(beta),
                ..Default::default()
            },
        );
        assert_eq!(beta_only.len(), 2);

        let by_name = apply_schedule_filter(
            rows,
            &ScheduleFilter {
                name_search: Some("verdi".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_name.len(), 2);
        assert!(by_name.iter().all(|r| r.full_name == "Verdi Anna"));
    }

    #[test]
    fn counts_cover_all_bands() {
        let conn = open_memory_database().unwrap();
        let company = seed_company(&conn, "Alfa Edile");
        let employee = seed_employee(&conn, company, "Rossi Mario");
        let today = date("2026-03-01");

        seed_certificate(&conn, employee, company, "E", Some(today - Duration::days(5)));
        seed_certificate(&conn, employee, company, "S1", Some(today + Duration::days(10)));
        seed_certificate(&conn, employee, company, "S2", Some(today + Duration::days(180)));
        seed_certificate(&conn, employee, company, "T", Some(today + Duration::days(200)));
        seed_certificate(&conn, employee, company, "V", None);

        let rows = fetch_expiry_schedule(&conn, today).unwrap();
        let counts = status_counts(&rows);
        assert_eq!(
            counts,
            StatusCounts {
                valid: 1,
                due_in_12m: 1,
                due_in_6m: 2,
                expired: 1,
            }
        );
    }

    #[test]
    fn point_lookup_matches_exact_date_only() {
        let conn = open_memory_database().unwrap();
        let company = seed_company(&conn, "Alfa Edile");
        let employee = seed_employee(&conn, company, "Rossi Mario");
        let today = date("2026-03-01");
        let target = today + Duration::days(180);

        seed_certificate(&conn, employee, company, "Hit", Some(target));
        seed_certificate(&conn, employee, company, "DayBefore", Some(target - Duration::days(1)));
        seed_certificate(&conn, employee, company, "DayAfter", Some(target + Duration::days(1)));
        seed_certificate(&conn, employee, company, "NoExpiry", None);

        let hits = fetch_expiry_rows_on(&conn, target, today).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].course_name, "Hit");
        assert_eq!(hits[0].days_remaining, Some(180));
        assert_eq!(hits[0].status, CertificateStatus::DueIn6m);
    }

    #[test]
    fn apprenticeship_schedule_ordered_nulls_last() {
        let conn = open_memory_database().unwrap();
        let company = seed_company(&conn, "Alfa Edile");
        let piero = seed_employee(&conn, company, "Giovane Piero");
        let anna = seed_employee(&conn, company, "Bianchi Anna");

        let seed_app = |employee_id: Uuid, due: Option<NaiveDate>, status| {
            let app = Apprenticeship {
                id: Uuid::new_v4(),
                employee_id,
                company_id: company,
                contract_start: Some(date("2025-09-01")),
                contract_end: Some(date("2028-08-31")),
                annuities_completed: Some("1st".to_string()),
                annuities_remaining: Some("2nd and 3rd".to_string()),
                next_milestone_due: due,
                status,
                notes: None,
            };
            insert_apprenticeship(&conn, &app).unwrap();
        };

        seed_app(piero, Some(date("2027-05-31")), ApprenticeshipStatus::Active);
        seed_app(anna, Some(date("2026-11-30")), ApprenticeshipStatus::Due);
        seed_app(anna, None, ApprenticeshipStatus::Completed);

        let rows = fetch_apprenticeship_schedule(&conn).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].next_milestone_due, Some(date("2026-11-30")));
        assert_eq!(rows[0].status, ApprenticeshipStatus::Due);
        assert_eq!(rows[1].full_name, "Giovane Piero");
        assert!(rows[2].next_milestone_due.is_none());
    }
}
