//! Route configuration and setup

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request},
    response::Redirect,
    routing::get,
    Router,
};
use std::sync::Arc;
use themtube_core::Config;
use themtube_infra::{get_request_id, request_id_middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::auth::auth_middleware;
use crate::constants::{
    API_V1_STR, DOCS_PATH, MULTIPART_OVERHEAD_BYTES, OPENAPI_JSON_PATH, STREAM_PREFIX,
};
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Protected routes carry their own auth layer so they can share paths with public ones.
    let api_routes = public_routes().merge(protected_routes().layer(
        axum::middleware::from_fn_with_state(state.clone(), auth_middleware),
    ));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = get_request_id(request).unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let body_limit = config
        .video
        .max_video_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    tracing::info!(
        stream_dir = %config.video_directory(),
        body_limit_bytes = body_limit,
        "Routes configured"
    );

    let app = Router::new()
        .route("/", get(|| async { Redirect::temporary(DOCS_PATH) }))
        .nest(API_V1_STR, api_routes)
        .merge(RapiDoc::with_openapi(OPENAPI_JSON_PATH, ApiDoc::openapi()).path(DOCS_PATH))
        .nest_service(STREAM_PREFIX, ServeDir::new(config.video_directory()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid ALLOWED_ORIGINS entry: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::ready))
        .route("/register", axum::routing::post(handlers::users::register))
        .route("/login", axum::routing::post(handlers::users::login))
        .route("/videos", get(handlers::video_get::list_videos))
        .route("/videos/{id}", get(handlers::video_get::get_video))
        .route("/videos/{id}/watch", get(handlers::video_watch::watch_video))
}

/// Protected routes (bearer token required)
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(handlers::users::me))
        .route("/users", get(handlers::users::list_users))
        .route("/videos", axum::routing::post(handlers::video_upload::upload_video))
        .route(
            "/videos/{id}",
            axum::routing::patch(handlers::video_update::update_video)
                .delete(handlers::video_delete::delete_video),
        )
}
