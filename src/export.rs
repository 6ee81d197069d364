//! Spreadsheet export of the certificate expiry schedule.
//!
//! Renders the filtered schedule as CSV (RFC-4180 quoting via the `csv`
//! crate) for download from the dashboard. Days-remaining and status come
//! from the rows as fetched, i.e. live values for the evaluation date the
//! caller used.

use chrono::NaiveDate;
use thiserror::Error;

use crate::dashboard::ExpiryRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Column headers, in spreadsheet order.
const HEADERS: [&str; 12] = [
    "Full Name",
    "Tax Code",
    "Company",
    "Course Type",
    "Course",
    "Protocol",
    "Course Start",
    "Course End",
    "Issued On",
    "Expires On",
    "Days Remaining",
    "Status",
];

fn opt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

/// Render schedule rows as a CSV document (header + one record per row).
pub fn schedule_to_csv(rows: &[ExpiryRow]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for row in rows {
        writer.write_record([
            row.full_name.clone(),
            row.tax_code.clone().unwrap_or_default(),
            row.company_name.clone(),
            row.course_type.label().to_string(),
            row.course_name.clone(),
            row.protocol.clone().unwrap_or_default(),
            opt_date(row.course_start),
            opt_date(row.course_end),
            opt_date(row.issued_on),
            opt_date(row.expires_on),
            row.days_remaining
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.status.as_str().to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
}

/// Suggested download filename, stamped with the evaluation date.
pub fn export_filename(today: NaiveDate) -> String {
    format!("Schedule_{today}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificateStatus, CourseType};
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_row(name: &str, course: &str) -> ExpiryRow {
        ExpiryRow {
            certificate_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            full_name: name.to_string(),
            tax_code: Some("RSSMRA80A01H501U".to_string()),
            company_name: "Alfa Edile".to_string(),
            course_type: CourseType::FireSafety,
            course_name: course.to_string(),
            protocol: Some("FC21513".to_string()),
            course_start: Some(date("2025-01-10")),
            course_end: Some(date("2025-01-12")),
            issued_on: Some(date("2025-01-15")),
            expires_on: Some(date("2027-06-30")),
            days_remaining: Some(120),
            status: CertificateStatus::DueIn6m,
        }
    }

    #[test]
    fn header_row_present() {
        let csv = schedule_to_csv(&[]).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("Full Name,Tax Code,Company"));
        assert!(header.ends_with("Days Remaining,Status"));
    }

    #[test]
    fn rows_rendered_with_values() {
        let csv = schedule_to_csv(&[sample_row("Rossi Mario", "Fire safety")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Rossi Mario"));
        assert!(lines[1].contains("Fire Safety"));
        assert!(lines[1].contains("2027-06-30"));
        assert!(lines[1].contains("120"));
        assert!(lines[1].contains("due_in_6m"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut row = sample_row("Rossi, Mario", "Fire safety, module B");
        row.tax_code = None;
        row.protocol = None;
        let csv = schedule_to_csv(&[row]).unwrap();
        let data_line = csv.lines().nth(1).unwrap();
        assert!(data_line.contains("\"Rossi, Mario\""));
        assert!(data_line.contains("\"Fire safety, module B\""));
    }

    #[test]
    fn missing_optionals_are_empty_cells() {
        let mut row = sample_row("Rossi Mario", "Fire safety");
        row.tax_code = None;
        row.protocol = None;
        row.expires_on = None;
        row.days_remaining = None;
        let csv = schedule_to_csv(&[row]).unwrap();
        let fields: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(fields[1], ""); // tax code
        assert_eq!(fields[5], ""); // protocol
    }

    #[test]
    fn filename_is_date_stamped() {
        assert_eq!(export_filename(date("2026-03-01")), "Schedule_2026-03-01.csv");
    }
}
