//! API endpoint handlers.
//!
//! Each module corresponds to a dashboard feature. Handlers reuse the
//! repository and read-model functions; none of them hold state.

pub mod apprenticeships;
pub mod certificates;
pub mod companies;
pub mod employees;
pub mod health;
pub mod jobs;
pub mod schedule;
