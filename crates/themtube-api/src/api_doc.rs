//! OpenAPI documentation, served as JSON and rendered with RapiDoc.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use themtube_core::models;

/// Registers the `bearer` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ThemTube API",
        version = "1.0.0",
        description = "Video sharing API. Uploaded videos are transcoded to a three-rendition HLS ladder and streamed from /stream."
    ),
    paths(
        // Health
        handlers::health::health,
        handlers::health::ready,
        // Users
        handlers::users::register,
        handlers::users::login,
        handlers::users::me,
        handlers::users::list_users,
        // Videos
        handlers::video_get::list_videos,
        handlers::video_get::get_video,
        handlers::video_watch::watch_video,
        handlers::video_upload::upload_video,
        handlers::video_update::update_video,
        handlers::video_delete::delete_video,
    ),
    components(
        schemas(
            models::UserResponse,
            models::UserRole,
            models::SignInType,
            models::UserStatus,
            models::RegisterRequest,
            models::LoginForm,
            models::TokenResponse,
            models::Video,
            models::VideoUpdate,
            models::VideoPage,
            models::MessageResponse,
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness checks"),
        (name = "users", description = "Registration, login and account lookup"),
        (name = "videos", description = "Video upload, catalog and playback")
    )
)]
pub struct ApiDoc;
