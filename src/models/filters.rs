use uuid::Uuid;

use super::enums::CertificateStatus;

/// Filter for the certificate expiry schedule.
#[derive(Debug, Default, Clone)]
pub struct ScheduleFilter {
    /// Match the LIVE status computed at read time, not the stored snapshot.
    pub status: Option<CertificateStatus>,
    pub company_id: Option<Uuid>,
    /// Case-insensitive substring match on the employee name.
    pub name_search: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct EmployeeFilter {
    pub company_id: Option<Uuid>,
    pub active_only: bool,
}
