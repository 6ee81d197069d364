//! Expiry status classification for certificates.
//!
//! The classifier is the single source of truth for certificate status. It
//! runs in two places: at save time, where the caller freezes the result
//! into the record for cheap list filtering, and at read time, where the
//! dashboard recomputes it against today's date. A frozen snapshot drifts
//! until the next save; reads that care about accuracy always recompute.

use chrono::NaiveDate;

use crate::models::CertificateStatus;

/// Days before expiry at which a certificate enters the 6-month band.
pub const SIX_MONTH_WINDOW_DAYS: i64 = 180;

/// Days before expiry at which a certificate enters the 12-month band.
pub const TWELVE_MONTH_WINDOW_DAYS: i64 = 365;

/// Classify a certificate's lifecycle status from its expiry date.
///
/// Calendar-day granularity: both inputs are dates, so time of day never
/// enters the calculation. The bands partition the integer day line with
/// no gaps or overlaps; 180 and 365 belong to the lower band.
///
/// * no expiry date     → `Valid` (nothing to track)
/// * days < 0           → `Expired`
/// * 0 ≤ days ≤ 180     → `DueIn6m`
/// * 181 ≤ days ≤ 365   → `DueIn12m`
/// * days > 365         → `Valid`
pub fn classify_status(expires_on: Option<NaiveDate>, today: NaiveDate) -> CertificateStatus {
    let Some(expiry) = expires_on else {
        return CertificateStatus::Valid;
    };

    let days = (expiry - today).num_days();
    if days < 0 {
        CertificateStatus::Expired
    } else if days <= SIX_MONTH_WINDOW_DAYS {
        CertificateStatus::DueIn6m
    } else if days <= TWELVE_MONTH_WINDOW_DAYS {
        CertificateStatus::DueIn12m
    } else {
        CertificateStatus::Valid
    }
}

/// Signed days from `today` to `expires_on`; `None` when no expiry is tracked.
///
/// Negative means the certificate already expired.
pub fn days_remaining(expires_on: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    expires_on.map(|expiry| (expiry - today).num_days())
}
