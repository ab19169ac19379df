//! API endpoint modules.

pub mod auth;
pub mod health;
pub mod openapi;
pub mod users;

use actix_web::web;

pub use auth::configure_routes as configure_auth_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use users::configure_routes as configure_user_routes;

/// Mount every `/api/v1` route.
pub fn configure_v1(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(configure_health_routes)
            .configure(configure_user_routes)
            .configure(configure_auth_routes),
    );
}
