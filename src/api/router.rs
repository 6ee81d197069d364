//! Admin API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Request tracing → 2. CORS → 3. Extension (context) → 4. Auth → Handler

use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the admin API router.
///
/// Handlers use `State<ApiContext>`; the auth middleware reads the same
/// context from an `Extension` layer, which must therefore sit outside it.
pub fn admin_api_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/companies",
            get(endpoints::companies::list).post(endpoints::companies::create),
        )
        .route(
            "/companies/:id",
            get(endpoints::companies::get_one)
                .put(endpoints::companies::update)
                .delete(endpoints::companies::remove),
        )
        .route(
            "/employees",
            get(endpoints::employees::list).post(endpoints::employees::create),
        )
        .route(
            "/employees/:id",
            get(endpoints::employees::get_one)
                .put(endpoints::employees::update)
                .delete(endpoints::employees::remove),
        )
        .route("/certificates", post(endpoints::certificates::create))
        .route(
            "/certificates/:id",
            get(endpoints::certificates::get_one)
                .put(endpoints::certificates::update)
                .delete(endpoints::certificates::remove),
        )
        .route("/apprenticeships", post(endpoints::apprenticeships::create))
        .route(
            "/apprenticeships/:id",
            get(endpoints::apprenticeships::get_one)
                .put(endpoints::apprenticeships::update)
                .delete(endpoints::apprenticeships::remove),
        )
        .route("/schedule", get(endpoints::schedule::schedule))
        .route("/schedule/export", get(endpoints::schedule::export_csv))
        .route(
            "/schedule/apprenticeships",
            get(endpoints::schedule::apprenticeships),
        )
        .route("/jobs/expiry-alert", post(endpoints::jobs::run_expiry_alert))
        .with_state(ctx.clone());

    Router::new()
        .nest("/api", routes)
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(Extension(ctx))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
