use crate::app_context::AppContext;
use crate::cli::Args;
use crate::http::{cors, middleware};
use crate::{health, removebg};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

/// Largest multipart body accepted for a removal request.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn new(args: &Args, app_context: AppContext) -> Router {
    let cors_policy = cors::layer(args);
    tracing::info!("Initialized HTTP configuration.");

    let health_routes = Router::new().route("/check", get(health::handlers::healthcheck));
    let api_routes = Router::new()
        .route("/removebg", post(removebg::handlers::remove_background))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .nest("/health", health_routes)
        .nest("/api", api_routes)
        .with_state(app_context)
        .layer(cors_policy)
        .layer(axum::middleware::from_fn(middleware::tracing))
}
