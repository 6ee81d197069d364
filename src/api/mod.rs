//! Admin API.
//!
//! Exposes the compliance-tracking operations as HTTP endpoints for the
//! dashboard UI. Routes are nested under `/api/` and optionally protected
//! by a static bearer token (the identity provider in front of the
//! dashboard is an external concern; this is the thin glue).
//!
//! The router is composable — `admin_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::admin_api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
