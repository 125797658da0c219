mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin_intake::{routes as admin_intake_routes, AdminIntakeService};
use crate::features::auth;
use crate::features::auth::routes as auth_routes;
use crate::features::contact::{routes as contact_routes, ContactService};
use crate::features::content::{
    routes as content_routes, ContentKind, ContentService, ImageUploadService,
};
use crate::features::intake::{routes as intake_routes, IntakeNotifier, IntakeService};
use crate::modules::email::{Mailer, ResendClient};
use crate::modules::storage::{ObjectStorage, S3Storage};
use crate::shared::templates::TemplateEngine;
use axum::{middleware::from_fn_with_state, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Starting {} (tokio_worker_threads={}, pid={})",
        config.app.site_name,
        worker_threads,
        std::process::id()
    );

    // Database
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Admin auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
        config.auth.admin_emails.clone(),
    ));
    tracing::info!("Auth configuration initialized (issuer: {})", config.auth.issuer);

    // Object storage
    let storage: Arc<dyn ObjectStorage> = Arc::new(
        S3Storage::new(config.storage.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?,
    );
    tracing::info!("Storage initialized for bucket: {}", config.storage.bucket);

    // Email
    let templates = Arc::new(
        TemplateEngine::new(
            config
                .email
                .as_ref()
                .and_then(|e| e.template_dir.as_deref())
                .map(Path::new),
        )
        .map_err(|e| anyhow::anyhow!("Failed to load email templates: {}", e))?,
    );

    let mailer = match &config.email {
        Some(email) => {
            let client = Arc::new(
                ResendClient::new(email.api_key.clone(), email.api_base.clone())
                    .map_err(|e| anyhow::anyhow!("Failed to create email client: {}", e))?,
            );
            tracing::info!(
                "Email delivery enabled ({} admin recipients)",
                email.to.len()
            );
            Some(Arc::new(Mailer::from_config(client, email)))
        }
        None => {
            tracing::warn!(
                "RESEND_API_KEY, RESEND_FROM or RESEND_TO not set; contact returns 500 and intake emails are skipped"
            );
            None
        }
    };

    // Services
    let contact_service = Arc::new(ContactService::new(
        mailer.clone(),
        Arc::clone(&templates),
        config.app.site_name.clone(),
    ));

    let intake_notifier = IntakeNotifier::new(
        mailer,
        Arc::clone(&templates),
        Arc::clone(&storage),
        config.app.site_name.clone(),
        config.app.site_url.clone(),
        config.intake.inline_attachment_max,
        config.intake.inline_total_max,
    );
    let intake_service = Arc::new(IntakeService::new(
        pool.clone(),
        Arc::clone(&storage),
        intake_notifier,
        config.intake.clone(),
    ));
    let admin_intake_service = Arc::new(AdminIntakeService::new(
        pool.clone(),
        Arc::clone(&storage),
        config.intake.admin_cache_ttl,
    ));

    let announcement_service = Arc::new(ContentService::new(
        pool.clone(),
        ContentKind::Announcement,
    ));
    let blog_service = Arc::new(ContentService::new(pool.clone(), ContentKind::Blog));
    let image_upload_service = Arc::new(ImageUploadService::new(Arc::clone(&storage)));
    tracing::info!("Services initialized");

    // Swagger
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::basic_auth_middleware,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Admin routes (require a verified ID token)
    let protected_routes = Router::new()
        .merge(auth_routes::admin_routes())
        .merge(admin_intake_routes::admin_routes(admin_intake_service))
        .merge(content_routes::admin_routes(Arc::clone(&announcement_service)))
        .merge(content_routes::admin_routes(Arc::clone(&blog_service)))
        .merge(content_routes::upload_routes(image_upload_service))
        .route_layer(from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes
    let public_routes = Router::new()
        .merge(contact_routes::routes(contact_service))
        .merge(intake_routes::routes(intake_service))
        .merge(content_routes::public_routes(announcement_service))
        .merge(content_routes::public_routes(blog_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(&config.app.cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
