use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::content::handlers;
use crate::features::content::services::{ContentService, ImageUploadService, MAX_IMAGE_SIZE};

/// Multipart framing on top of the image itself
const UPLOAD_OVERHEAD: usize = 64 * 1024;

/// Public read routes, mounted at the kind's public path
pub fn public_routes(service: Arc<ContentService>) -> Router {
    let base = service.kind().public_path();

    Router::new()
        .route(base, get(handlers::list_published))
        .route(&format!("{}/categories", base), get(handlers::list_categories))
        .route(&format!("{}/{{slug}}", base), get(handlers::get_published))
        .with_state(service)
}

/// Admin CRUD routes, mounted at the kind's admin path
pub fn admin_routes(service: Arc<ContentService>) -> Router {
    let base = service.kind().admin_path();

    Router::new()
        .route(
            base,
            get(handlers::list_content).post(handlers::create_content),
        )
        .route(
            &format!("{}/{{id}}", base),
            get(handlers::get_content)
                .patch(handlers::update_content)
                .delete(handlers::delete_content),
        )
        .with_state(service)
}

pub fn upload_routes(service: Arc<ImageUploadService>) -> Router {
    Router::new()
        .route(
            "/api/admin/uploads/images",
            post(handlers::upload_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + UPLOAD_OVERHEAD)),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_pool;
    use crate::features::content::models::ContentKind;
    use crate::modules::storage::MemoryStorage;
    use crate::shared::test_helpers::{with_admin_auth, with_regular_user_auth};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn blog_admin() -> Router {
        admin_routes(Arc::new(ContentService::new(lazy_pool(), ContentKind::Blog)))
    }

    #[tokio::test]
    async fn test_admin_requires_authentication() {
        let server = TestServer::new(blog_admin()).unwrap();

        let response = server.get("/api/admin/blog").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_rejects_non_admin() {
        let server = TestServer::new(with_regular_user_auth(blog_admin())).unwrap();

        let response = server
            .post("/api/admin/blog")
            .json(&json!({ "title": "記事", "slug": "post" }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_with_invalid_slug_is_rejected() {
        let server = TestServer::new(with_admin_auth(blog_admin())).unwrap();

        let response = server
            .post("/api/admin/blog")
            .json(&json!({
                "title": "春のキャンペーン",
                "slug": "Spring Campaign!",
                "content": "本文",
                "status": "published"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap_or_default().contains("slug"));
    }

    #[tokio::test]
    async fn test_create_with_unknown_status_is_rejected() {
        let server = TestServer::new(with_admin_auth(blog_admin())).unwrap();

        let response = server
            .post("/api/admin/blog")
            .json(&json!({ "title": "記事", "slug": "post", "status": "archived" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_with_invalid_link_is_rejected() {
        let server = TestServer::new(with_admin_auth(admin_routes(Arc::new(
            ContentService::new(lazy_pool(), ContentKind::Announcement),
        ))))
        .unwrap();

        let response = server
            .patch("/api/admin/announcements/5f0c6f62-8d8a-4f0e-9a43-3b2f4a9c1e11")
            .json(&json!({ "links": [{ "label": "詳細", "url": "example" }] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_with_script_cover_image_is_rejected() {
        let server = TestServer::new(with_admin_auth(blog_admin())).unwrap();

        let response = server
            .patch("/api/admin/blog/5f0c6f62-8d8a-4f0e-9a43-3b2f4a9c1e11")
            .json(&json!({ "cover_image": "javascript:alert(1)" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_admin_list_with_bad_query_uses_error_envelope() {
        let server = TestServer::new(with_admin_auth(blog_admin())).unwrap();

        let response = server.get("/api/admin/blog?status=archived").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_public_list_with_bad_page_uses_error_envelope() {
        let server = TestServer::new(public_routes(Arc::new(ContentService::new(
            lazy_pool(),
            ContentKind::Blog,
        ))))
        .unwrap();

        let response = server.get("/api/blog?page=abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    fn upload_server(storage: Arc<MemoryStorage>, admin: bool) -> TestServer {
        let router = upload_routes(Arc::new(ImageUploadService::new(storage)));
        let router = if admin {
            with_admin_auth(router)
        } else {
            with_regular_user_auth(router)
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_upload_image() {
        let storage = Arc::new(MemoryStorage::new());
        let server = upload_server(storage.clone(), true);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0])
                .file_name("cover.png")
                .mime_type("image/png"),
        );
        let response = server
            .post("/api/admin/uploads/images")
            .multipart(form)
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let key = body["data"]["key"].as_str().unwrap();
        assert!(key.starts_with("public/images/"));
        assert_eq!(
            body["data"]["url"].as_str().unwrap(),
            format!("https://storage.test/{}", key)
        );
        assert_eq!(storage.keys(), vec![key.to_string()]);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let storage = Arc::new(MemoryStorage::new());
        let server = upload_server(storage.clone(), true);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("brochure.pdf")
                .mime_type("application/pdf"),
        );
        let response = server
            .post("/api/admin/uploads/images")
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let server = upload_server(Arc::new(MemoryStorage::new()), false);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![1, 2, 3])
                .file_name("a.gif")
                .mime_type("image/gif"),
        );
        let response = server
            .post("/api/admin/uploads/images")
            .multipart(form)
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }
}
