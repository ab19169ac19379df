//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Personal Blog Server",
        version = "0.3.0",
        description = "Accounts and sessions for the personal blog: password login, GitHub sign-in, refresh token rotation"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // User endpoints
        api::users::create_user,
        // Auth endpoints
        api::auth::login,
        api::auth::github_login,
        api::auth::github_callback,
        api::auth::refresh,
        api::auth::logout,
        api::auth::me,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::CreateUserRequest,
            models::UserResponse,
            models::LoginRequest,
            models::RefreshTokenRequest,
            models::TokenPair,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Users", description = "Account signup"),
        (name = "Auth", description = "Login, GitHub sign-in and session tokens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
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
