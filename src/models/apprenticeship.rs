use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ApprenticeshipStatus;

/// An apprenticeship contract with yearly training milestones.
///
/// `status` is chosen by the operator on save; it is NOT derived from
/// `next_milestone_due`, in contrast to certificate status. The annuity
/// fields are free text ("1st and 2nd", "3rd due in May") because milestone
/// bookkeeping varies per training body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apprenticeship {
    pub id: Uuid,
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
