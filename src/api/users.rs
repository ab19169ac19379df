//! Account signup endpoint.

use actix_web::{HttpResponse, post, web};

use crate::models::{CreateUserRequest, UserResponse};
use crate::services::UserService;

/// Configure user routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user);
}

/// Create a password account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid name, email or password", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::error::ErrorResponse)
    )
)]
#[post("/users")]
pub async fn create_user(
    body: web::Json<CreateUserRequest>,
    users: web::Data<UserService>,
) -> actix_web::Result<HttpResponse> {
    let user = users.create_user(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}
