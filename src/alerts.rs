//! Daily expiry alert job.
//!
//! One invocation per day: look up certificates whose expiry date is exactly
//! 180 or exactly 365 days out, render a single consolidated HTML email, and
//! send it to the configured recipient. The match is an equality check on the
//! expiry date, not a range — each certificate is alerted exactly once per
//! lead time, on the day it crosses the threshold. The flip side: if a day's
//! run is skipped, that day's alerts are gone; there is no catch-up and no
//! cross-day bookkeeping. The job keeps no state between invocations.

use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::config::AlertConfig;
use crate::dashboard::{fetch_expiry_rows_on, ExpiryRow};
use crate::db::DatabaseError;
use crate::mailer::{Mailer, MailerError, OutboundEmail};
use crate::status::{SIX_MONTH_WINDOW_DAYS, TWELVE_MONTH_WINDOW_DAYS};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Outcome of one alert job invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRunReport {
    /// How many certificates matched the two lead times.
    pub matched: usize,
    /// Whether a notification went out (false on a zero-match run).
    pub emailed: bool,
}

/// A failed run. Zero matches is NOT an error — it's a successful no-op.
#[derive(Debug, Error)]
pub enum AlertJobError {
    #[error("Fetching due certificates failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Alert delivery failed: {0}")]
    Delivery(#[from] MailerError),
}

// ═══════════════════════════════════════════════════════════
// Matching
// ═══════════════════════════════════════════════════════════

/// The two target expiry dates for a run: today + 180 and today + 365 days.
pub fn alert_targets(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today + Duration::days(SIX_MONTH_WINDOW_DAYS),
        today + Duration::days(TWELVE_MONTH_WINDOW_DAYS),
    )
}

/// Gather the certificates due for alerting today: two independent point
/// queries, 180-day matches first, then 365-day matches. No further sorting
/// across the two groups.
pub fn gather_due_certificates(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Vec<ExpiryRow>, DatabaseError> {
    let (target_6m, target_12m) = alert_targets(today);

    let mut matches = fetch_expiry_rows_on(conn, target_6m, today)?;
    matches.extend(fetch_expiry_rows_on(conn, target_12m, today)?);
    Ok(matches)
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the consolidated notification for the matched rows.
///
/// One table row per certificate; the days-remaining badge is amber for the
/// 6-month band and orange for the 12-month band so the two urgencies read
/// apart at a glance.
pub fn render_alert_email(
    rows: &[ExpiryRow],
    today: NaiveDate,
    config: &AlertConfig,
) -> OutboundEmail {
    let table_rows: String = rows
        .iter()
        .map(|row| {
            let days = row.days_remaining.unwrap_or_default();
            let (badge_bg, badge_fg) = if days <= SIX_MONTH_WINDOW_DAYS {
                ("#fef3c7", "#d97706")
            } else {
                ("#fff7ed", "#ea580c")
            };
            let expires = row
                .expires_on
                .map(|d| d.to_string())
                .unwrap_or_else(|| "—".to_string());
            format!(
                "<tr style=\"border-bottom:1px solid #e2e8f0\">\
                 <td style=\"padding:10px 14px;font-weight:600\">{name}</td>\
                 <td style=\"padding:10px 14px;color:#64748b\">{company}</td>\
                 <td style=\"padding:10px 14px;color:#64748b\">{course}</td>\
                 <td style=\"padding:10px 14px;color:#64748b\">{expires}</td>\
                 <td style=\"padding:10px 14px\">\
                 <span style=\"background:{badge_bg};color:{badge_fg};padding:3px 10px;\
                 border-radius:20px;font-size:12px;font-weight:600\">{days} days</span>\
                 </td></tr>",
                name = escape_html(&row.full_name),
                company = escape_html(&row.company_name),
                course = escape_html(&row.course_name),
            )
        })
        .collect();

    let footer = match &config.dashboard_url {
        Some(url) => format!(
            "<div style=\"padding:20px 24px;background:#f8fafc;border-top:1px solid #e2e8f0\">\
             <a href=\"{url}\" style=\"background:#1e3a8a;color:white;padding:10px 24px;\
             border-radius:8px;text-decoration:none;font-weight:600;font-size:14px\">\
             Open Formatrack →</a></div>"
        ),
        None => String::new(),
    };

    let html = format!(
        "<div style=\"font-family:'Segoe UI',sans-serif;max-width:700px;margin:0 auto\">\
         <div style=\"background:#1e3a8a;padding:32px;border-radius:12px 12px 0 0\">\
         <h1 style=\"color:white;margin:0;font-size:22px\">⏰ Formatrack expiry alert</h1>\
         <p style=\"color:rgba(255,255,255,0.7);margin:8px 0 0;font-size:14px\">\
         {count} certificate(s) approaching expiry — {today}</p></div>\
         <div style=\"background:white;border:1px solid #e2e8f0;border-radius:0 0 12px 12px;overflow:hidden\">\
         <table style=\"width:100%;border-collapse:collapse\">\
         <thead><tr style=\"background:#f8fafc\">\
         <th style=\"padding:10px 14px;text-align:left;font-size:11px;color:#94a3b8\">Name</th>\
         <th style=\"padding:10px 14px;text-align:left;font-size:11px;color:#94a3b8\">Company</th>\
         <th style=\"padding:10px 14px;text-align:left;font-size:11px;color:#94a3b8\">Course</th>\
         <th style=\"padding:10px 14px;text-align:left;font-size:11px;color:#94a3b8\">Expires</th>\
         <th style=\"padding:10px 14px;text-align:left;font-size:11px;color:#94a3b8\">Days</th>\
         </tr></thead><tbody>{table_rows}</tbody></table>{footer}</div></div>",
        count = rows.len(),
    );

    OutboundEmail {
        from: config.from.clone(),
        to: config.recipient.clone(),
        subject: format!("⏰ {} certificate(s) approaching expiry — Formatrack", rows.len()),
        html,
    }
}

// ═══════════════════════════════════════════════════════════
// The job
// ═══════════════════════════════════════════════════════════

/// Run one alert invocation for `today`.
///
/// Fetch failures and delivery failures both surface as a failed run; the
/// invoking scheduler owns any retry policy. A zero-match day succeeds
/// without sending anything.
pub fn run_expiry_alert_job(
    conn: &Connection,
    mailer: &dyn Mailer,
    config: &AlertConfig,
    today: NaiveDate,
) -> Result<AlertRunReport, AlertJobError> {
    let matches = gather_due_certificates(conn, today)?;

    if matches.is_empty() {
        tracing::info!(%today, "Expiry alert run: no certificates due");
        return Ok(AlertRunReport {
            matched: 0,
            emailed: false,
        });
    }

    let email = render_alert_email(&matches, today, config);
    mailer.send(&email)?;

    tracing::info!(%today, matched = matches.len(), recipient = %config.recipient,
        "Expiry alert sent");
    Ok(AlertRunReport {
        matched: matches.len(),
        emailed: true,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use std::cell::RefCell;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn test_config() -> AlertConfig {
        AlertConfig {
            recipient: "admin@example.com".to_string(),
            from: "Formatrack <alerts@formatrack.app>".to_string(),
            resend_api_key: "test-key".to_string(),
            resend_base_url: "https://api.resend.test".to_string(),
            dashboard_url: Some("https://formatrack.example.com".to_string()),
        }
    }

    /// Records every send; never fails.
    struct RecordingMailer {
        sent: RefCell<Vec<OutboundEmail>>,
    }

    impl RecordingMailer {
        fn new() -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Mailer for RecordingMailer {
        fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
            self.sent.borrow_mut().push(email.clone());
            Ok(())
        }
    }

    /// Always rejects the send with a provider error.
    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send(&self, _email: &OutboundEmail) -> Result<(), MailerError> {
            Err(MailerError::Api {
                status: 422,
                body: "{\"message\":\"domain not verified\"}".to_string(),
            })
        }
    }

    fn seed(conn: &Connection, name: &str, course: &str, expires_on: Option<NaiveDate>) {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Alfa Edile".to_string(),
            vat_number: None,
            active: true,
        };
        insert_company(conn, &company).unwrap();
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id: company.id,
            full_name: name.to_string(),
            tax_code: None,
            active: true,
        };
        insert_employee(conn, &employee).unwrap();
        insert_certificate(
            conn,
            &Certificate {
                id: Uuid::new_v4(),
                employee_id: employee.id,
                company_id: company.id,
                course_type: CourseType::FirstAid,
                course_name: course.to_string(),
                protocol: None,
                course_start: None,
                course_end: None,
                issued_on: None,
                expires_on,
                status: CertificateStatus::Valid,
                notes: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn targets_are_180_and_365_days_out() {
        let (t6, t12) = alert_targets(date("2026-03-01"));
        assert_eq!(t6, date("2026-08-28"));
        assert_eq!(t12, date("2027-03-01"));
    }

    #[test]
    fn matches_exactly_the_two_lead_times() {
        let conn = open_memory_database().unwrap();
        let today = date("2026-03-01");
        let (t6, t12) = alert_targets(today);

        seed(&conn, "Rossi Mario", "At 180", Some(t6));
        seed(&conn, "Verdi Anna", "At 179", Some(t6 - Duration::days(1)));
        seed(&conn, "Bianchi Luca", "At 365", Some(t12));
        seed(&conn, "Neri Paola", "At 364", Some(t12 - Duration::days(1)));

        let matches = gather_due_certificates(&conn, today).unwrap();
        assert_eq!(matches.len(), 2);
        // 180-day match first, then the 365-day match.
        assert_eq!(matches[0].course_name, "At 180");
        assert_eq!(matches[0].days_remaining, Some(180));
        assert_eq!(matches[1].course_name, "At 365");
        assert_eq!(matches[1].days_remaining, Some(365));
    }

    #[test]
    fn matches_within_a_band_are_name_ordered() {
        let conn = open_memory_database().unwrap();
        let today = date("2026-03-01");
        let (t6, _) = alert_targets(today);

        seed(&conn, "Verdi Anna", "B", Some(t6));
        seed(&conn, "Bianchi Luca", "A", Some(t6));

        let matches = gather_due_certificates(&conn, today).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].full_name, "Bianchi Luca");
        assert_eq!(matches[1].full_name, "Verdi Anna");
    }

    #[test]
    fn job_sends_one_consolidated_email() {
        let conn = open_memory_database().unwrap();
        let today = date("2026-03-01");
        let (t6, t12) = alert_targets(today);
        seed(&conn, "Rossi Mario", "Fire safety refresher", Some(t6));
        seed(&conn, "Bianchi Luca", "First aid", Some(t12));

        let mailer = RecordingMailer::new();
        let report =
            run_expiry_alert_job(&conn, &mailer, &test_config(), today).unwrap();

        assert_eq!(
            report,
            AlertRunReport {
                matched: 2,
                emailed: true,
            }
        );

        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert_eq!(email.to, "admin@example.com");
        assert!(email.subject.contains('2'));
        assert!(email.html.contains("Rossi Mario"));
        assert!(email.html.contains("Bianchi Luca"));
        assert!(email.html.contains("Fire safety refresher"));
    }

    #[test]
    fn zero_matches_is_a_successful_noop() {
        let conn = open_memory_database().unwrap();
        let today = date("2026-03-01");
        seed(&conn, "Rossi Mario", "Far away", Some(today + Duration::days(400)));

        let mailer = RecordingMailer::new();
        let report =
            run_expiry_alert_job(&conn, &mailer, &test_config(), today).unwrap();

        assert_eq!(
            report,
            AlertRunReport {
                matched: 0,
                emailed: false,
            }
        );
        assert!(mailer.sent.borrow().is_empty());
    }

    #[test]
    fn delivery_failure_surfaces_provider_detail() {
        let conn = open_memory_database().unwrap();
        let today = date("2026-03-01");
        let (t6, _) = alert_targets(today);
        seed(&conn, "Rossi Mario", "Fire safety", Some(t6));

        let err =
            run_expiry_alert_job(&conn, &FailingMailer, &test_config(), today).unwrap_err();
        match err {
            AlertJobError::Delivery(MailerError::Api { status, body }) => {
                assert_eq!(status, 422);
                assert!(body.contains("domain not verified"));
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[test]
    fn email_distinguishes_urgency_bands() {
        let today = date("2026-03-01");
        let (t6, t12) = alert_targets(today);
        let conn = open_memory_database().unwrap();
        seed(&conn, "Rossi Mario", "Soon", Some(t6));
        seed(&conn, "Bianchi Luca", "Later", Some(t12));

        let rows = gather_due_certificates(&conn, today).unwrap();
        let email = render_alert_email(&rows, today, &test_config());

        // Amber badge for the 6-month band, orange for the 12-month band.
        assert!(email.html.contains("#d97706"));
        assert!(email.html.contains("#ea580c"));
        assert!(email.html.contains("180 days"));
        assert!(email.html.contains("365 days"));
        assert!(email.html.contains("formatrack.example.com"));
    }

    #[test]
    fn email_escapes_markup_in_names() {
        let today = date("2026-03-01");
        let (t6, _) = alert_targets(today);
        let conn = open_memory_database().unwrap();
        seed(&conn, "Rossi <Mario>", "A & B", Some(t6));

        let rows = gather_due_certificates(&conn, today).unwrap();
        let email = render_alert_email(&rows, today, &test_config());
        assert!(email.html.contains("Rossi &lt;Mario&gt;"));
        assert!(email.html.contains("A &amp; B"));
        assert!(!email.html.contains("Rossi <Mario>"));
    }
}
