use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::admin_intake::{handlers, services::AdminIntakeService};

/// Admin routes for reviewing intake submissions
pub fn admin_routes(service: Arc<AdminIntakeService>) -> Router {
    Router::new()
        .route("/api/admin/intake", get(handlers::list_intakes))
        .route("/api/admin/intake/summary", get(handlers::intake_summary))
        .route("/api/admin/intake/{id}", get(handlers::get_intake))
        .route(
            "/api/admin/intake/{id}/status",
            patch(handlers::update_intake_status),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_pool;
    use crate::features::intake::models::{IntakeStatus, RequestType};
    use crate::modules::storage::MemoryStorage;
    use crate::shared::test_helpers::{intake_fixture, with_admin_auth, with_regular_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::Value;

    async fn seeded_service() -> Arc<AdminIntakeService> {
        let service = AdminIntakeService::new(
            lazy_pool(),
            Arc::new(MemoryStorage::new()),
            std::time::Duration::from_secs(30),
        );
        let now = Utc::now();
        service
            .seed_cache(vec![
                intake_fixture(
                    "Alice Example",
                    "alice@example.com",
                    RequestType::Diagnosis,
                    IntakeStatus::New,
                    now,
                ),
                intake_fixture(
                    "Bob Example",
                    "bob@example.com",
                    RequestType::Other,
                    IntakeStatus::Closed,
                    now - Duration::days(1),
                ),
                intake_fixture(
                    "Carol Sample",
                    "carol@sample.jp",
                    RequestType::Estimate,
                    IntakeStatus::New,
                    now - Duration::days(2),
                ),
            ])
            .await;
        Arc::new(service)
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(admin_routes(seeded_service().await)).unwrap();

        let response = server.get("/api/admin/intake").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_non_admin() {
        let app = with_regular_user_auth(admin_routes(seeded_service().await));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/admin/intake/summary").await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_filters_and_counts() {
        let app = with_admin_auth(admin_routes(seeded_service().await));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/admin/intake")
            .add_query_param("q", "EXAMPLE")
            .add_query_param("pageSize", 1)
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["meta"]["total"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["name"], "Alice Example");
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let app = with_admin_auth(admin_routes(seeded_service().await));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/admin/intake")
            .add_query_param("status", "archived")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["success"], false);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_list_rejects_non_numeric_page_with_envelope() {
        let app = with_admin_auth(admin_routes(seeded_service().await));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/admin/intake")
            .add_query_param("page", "abc")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_list_with_huge_page_is_empty() {
        let app = with_admin_auth(admin_routes(seeded_service().await));
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/api/admin/intake")
            .add_query_param("page", i64::MAX.to_string())
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["meta"]["total"], 3);
    }

    #[tokio::test]
    async fn test_summary_counts_every_status() {
        let app = with_admin_auth(admin_routes(seeded_service().await));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/admin/intake/summary").await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["data"]["total"], 3);
        let by_status = json["data"]["byStatus"].as_array().unwrap();
        assert_eq!(by_status.len(), 5);
        assert_eq!(by_status[0]["status"], "new");
        assert_eq!(by_status[0]["count"], 2);
        assert_eq!(by_status[4]["status"], "closed");
        assert_eq!(by_status[4]["count"], 1);
    }
}
