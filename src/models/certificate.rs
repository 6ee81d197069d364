use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CertificateStatus, CourseType};

/// A safety-training certificate issued to one employee.
///
/// `status` is a snapshot frozen at save time from `expires_on`; reads that
/// need accuracy recompute it from today's date instead of trusting the
/// stored value, which drifts until the next save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub course_type: CourseType,
    pub course_name: String,
    /// Registry protocol number printed on the certificate (e.g. FC21513).
    pub protocol: Option<String>,
    pub course_start: Option<NaiveDate>,
    pub course_end: Option<NaiveDate>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub status: CertificateStatus,
    pub notes: Option<String>,
}
