use axum::{routing::get, Router};

use crate::features::auth::handlers;

/// Admin session routes (mounted behind the auth middleware)
pub fn admin_routes() -> Router {
    Router::new().route("/api/admin/me", get(handlers::get_me))
}
