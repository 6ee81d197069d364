//! Static bearer token authentication middleware.
//!
//! When FORMATRACK_API_TOKEN is configured, every request must carry
//! `Authorization: Bearer <token>`. With no token configured the API is
//! open — the expected setup behind a reverse proxy or on localhost.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Require the configured bearer token, if any.
///
/// Accesses `ApiContext` from request extensions (injected by Extension
/// layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    if let Some(expected) = &ctx.config.api_token {
        let presented = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        if presented != expected {
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}
