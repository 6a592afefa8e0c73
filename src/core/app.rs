use std::sync::Arc;

use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::SwaggerConfig;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::locations::{self, LocationService};
use crate::modules::storage::PhotoStorage;

/// Simple health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Application routes: health, the locations API and, for backends that
/// need it, the routes serving stored photos
pub fn api_router(
    location_service: Arc<LocationService>,
    photo_storage: &dyn PhotoStorage,
    max_photo_size: usize,
) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .merge(locations::routes(location_service, max_photo_size));

    match photo_storage.static_routes() {
        Some(static_routes) => router.merge(static_routes),
        None => router,
    }
}

/// Swagger UI at `/swagger-ui`, behind basic auth when credentials are set
pub fn swagger_router(config: &SwaggerConfig) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    if let Some(credentials) = config.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        swagger.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
            credentials,
        ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        swagger
    }
}

/// CORS, request ids and request tracing around the whole application
pub fn with_http_layers(router: Router, cors_allowed_origins: Vec<String>) -> Router {
    router
        .layer(middleware::cors_layer(cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
