use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::features::intake::handlers;
use crate::features::intake::services::IntakeService;

/// Public intake route. The body limit covers all attachments plus form overhead.
pub fn routes(service: Arc<IntakeService>) -> Router {
    let body_limit = service.config().body_limit();

    Router::new()
        .route(
            "/api/intake",
            post(handlers::submit_intake).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(service)
}
