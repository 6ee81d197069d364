//! In-process daily trigger for the expiry alert job.
//!
//! Optional deployment mode: when ALERT_HOUR is configured, a background
//! thread wakes every few minutes and fires the job once per calendar day
//! while the current UTC hour matches. Only the in-memory "last ran on"
//! date is kept, so a restart during the alert hour can run the job again —
//! same contract as an external cron with at-most-daily cadence. The
//! primary trigger remains the external scheduler hitting the API.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Timelike, Utc};

use crate::alerts::{run_expiry_alert_job, AlertRunReport};
use crate::config::AlertConfig;
use crate::db::sqlite::open_database;
use crate::mailer::ResendMailer;

/// Check interval: every 5 minutes.
const CHECK_INTERVAL_SECS: u64 = 5 * 60;

/// Sleep granularity for shutdown responsiveness (1 second).
const SLEEP_GRANULARITY_SECS: u64 = 1;

/// Handle for the background alert scheduler thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on
/// `Drop`. Keep it alive for the lifetime of the process.
pub struct AlertSchedulerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl AlertSchedulerHandle {
    /// Request graceful shutdown. A run in progress completes; no new run
    /// will start.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for AlertSchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the daily alert scheduler on a separate thread.
pub fn start_alert_scheduler(
    db_path: PathBuf,
    alert: AlertConfig,
    alert_hour: u32,
) -> AlertSchedulerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(alert_hour, "Alert scheduler started (check every {CHECK_INTERVAL_SECS}s)");
        scheduler_loop(&db_path, &alert, alert_hour, &flag);
    });

    AlertSchedulerHandle {
        shutdown,
        handle: Some(handle),
    }
}

/// Is the job due right now? Once per calendar day, during the configured
/// UTC hour.
fn should_run(
    now_hour: u32,
    today: NaiveDate,
    alert_hour: u32,
    last_run: Option<NaiveDate>,
) -> bool {
    now_hour == alert_hour && last_run != Some(today)
}

fn scheduler_loop(db_path: &Path, alert: &AlertConfig, alert_hour: u32, shutdown: &AtomicBool) {
    let mut last_run: Option<NaiveDate> = None;

    while !shutdown.load(Ordering::Relaxed) {
        let now = Utc::now();
        let today = now.date_naive();

        if should_run(now.hour(), today, alert_hour, last_run) {
            // One attempt per day, success or failure — the job itself never
            // retries, and neither does this loop.
            last_run = Some(today);
            match run_once(db_path, alert, today) {
                Ok(report) => {
                    tracing::info!(matched = report.matched, emailed = report.emailed,
                        "Scheduled alert run finished");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled alert run failed");
                }
            }
        }

        // Sleep in small increments for responsive shutdown
        for _ in 0..(CHECK_INTERVAL_SECS / SLEEP_GRANULARITY_SECS) {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!("Alert scheduler shutting down");
                return;
            }
            std::thread::sleep(Duration::from_secs(SLEEP_GRANULARITY_SECS));
        }
    }
    tracing::info!("Alert scheduler shutting down");
}

fn run_once(
    db_path: &Path,
    alert: &AlertConfig,
    today: NaiveDate,
) -> Result<AlertRunReport, String> {
    let conn = open_database(db_path).map_err(|e| format!("Cannot open database: {e}"))?;
    let mailer = ResendMailer::from_config(alert);
    run_expiry_alert_job(&conn, &mailer, alert, today).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn runs_only_during_configured_hour() {
        let today = date("2026-03-01");
        assert!(should_run(6, today, 6, None));
        assert!(!should_run(5, today, 6, None));
        assert!(!should_run(7, today, 6, None));
    }

    #[test]
    fn runs_at_most_once_per_day() {
        let today = date("2026-03-01");
        assert!(should_run(6, today, 6, None));
        assert!(!should_run(6, today, 6, Some(today)));
        // Next day it fires again.
        assert!(should_run(6, date("2026-03-02"), 6, Some(today)));
    }

    #[test]
    fn shutdown_stops_the_thread() {
        let dir = tempfile::tempdir().unwrap();
        let handle = start_alert_scheduler(
            dir.path().join("test.db"),
            AlertConfig {
                recipient: String::new(),
                from: String::new(),
                resend_api_key: String::new(),
                resend_base_url: "http://127.0.0.1:1".to_string(),
                dashboard_url: None,
            },
            // An hour that is never "now" in practice doesn't matter here;
            // shutdown must win regardless.
            0,
        );
        handle.shutdown();
        drop(handle); // joins
    }
}
