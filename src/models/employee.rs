use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Surname-first display name, as entered by the administrator.
    pub full_name: String,
    pub tax_code: Option<String>,
    pub active: bool,
}
