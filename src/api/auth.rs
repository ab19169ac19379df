//! Session endpoints: password login, GitHub sign-in, refresh, logout, me.
//!
//! Tokens travel in JSON bodies. The only cookie is the short-lived CSRF
//! `state` set before redirecting to GitHub and checked on callback.

use std::net::SocketAddr;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::{LOCATION, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::{info, warn};

use crate::auth::BearerAuth;
use crate::db::UserStore;
use crate::error::{AppError, OAuthError};
use crate::models::{
    CallbackQuery, LoginRequest, RefreshTokenRequest, RequestMeta, TokenPair, UserResponse,
    user::validate_email,
};
use crate::services::{AuthSessionManager, GitHubOAuthClient};

/// OAuth CSRF state cookie: holds the random `state` sent to GitHub.
pub const OAUTH_STATE_COOKIE: &str = "blog_oauth_state";

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(github_login)
        .service(github_callback)
        .service(refresh)
        .service(logout)
        .service(me);
}

/// Generate a random CSRF state value.
fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Audit metadata for the refresh token row.
pub fn request_meta(req: &HttpRequest) -> RequestMeta {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let ip_address = req.connection_info().realip_remote_addr().map(|addr| {
        addr.parse::<SocketAddr>()
            .map(|s| s.ip().to_string())
            .unwrap_or_else(|_| addr.to_string())
    });

    RequestMeta {
        user_agent,
        ip_address,
    }
}

fn state_cookie(req: &HttpRequest, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(req.connection_info().scheme() == "https");
    cookie
}

fn require_github(
    client: Option<web::Data<GitHubOAuthClient>>,
) -> Result<web::Data<GitHubOAuthClient>, OAuthError> {
    client.ok_or(OAuthError::NotConfigured)
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, description = "Missing or malformed fields", body = crate::error::ErrorResponse),
        (status = 401, description = "Email or password is incorrect", body = crate::error::ErrorResponse),
        (status = 409, description = "Account signs in with GitHub", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    sessions: web::Data<AuthSessionManager>,
) -> actix_web::Result<HttpResponse> {
    let email = body.email.trim();
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::InvalidInput("email and password are required".to_string()).into());
    }
    validate_email(email)?;

    let pair = sessions
        .login(email, &body.password, &request_meta(&req))
        .await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// Redirect to GitHub's authorization page.
#[utoipa::path(
    get,
    path = "/api/v1/auth/github/login",
    tag = "Auth",
    responses(
        (status = 302, description = "Redirect to GitHub"),
        (status = 503, description = "GitHub sign-in is not configured", body = crate::error::ErrorResponse)
    )
)]
#[get("/auth/github/login")]
pub async fn github_login(
    req: HttpRequest,
    github: Option<web::Data<GitHubOAuthClient>>,
) -> actix_web::Result<HttpResponse> {
    let github = require_github(github)?;

    let state = generate_state();
    let authorize_url = github.authorize_url(&state);

    Ok(HttpResponse::Found()
        .cookie(state_cookie(&req, state))
        .append_header((LOCATION, authorize_url))
        .finish())
}

/// Complete GitHub sign-in.
///
/// Verifies `state`, exchanges `code`, resolves the GitHub identity and
/// issues a token pair for the linked or newly created account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/github/callback",
    tag = "Auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from GitHub"),
        ("state" = Option<String>, Query, description = "CSRF state echoed by GitHub")
    ),
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, description = "Missing code", body = crate::error::ErrorResponse),
        (status = 401, description = "State verification failed", body = crate::error::ErrorResponse),
        (status = 409, description = "Email belongs to another account", body = crate::error::ErrorResponse),
        (status = 502, description = "GitHub call failed", body = crate::error::ErrorResponse),
        (status = 503, description = "GitHub sign-in is not configured", body = crate::error::ErrorResponse)
    )
)]
#[get("/auth/github/callback")]
pub async fn github_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    github: Option<web::Data<GitHubOAuthClient>>,
    sessions: web::Data<AuthSessionManager>,
) -> actix_web::Result<HttpResponse> {
    let github = require_github(github)?;

    // --- CSRF state verification ---
    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    let provided_state = query.state.as_deref().unwrap_or("");
    if provided_state.is_empty() || provided_state != expected_state {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized("OAuth state verification failed".to_string()).into());
    }

    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("missing code parameter".to_string()))?;

    let access_token = github.exchange_code_for_token(code).await?;
    let identity = github.get_user_info(&access_token).await?;
    info!(
        github_id = identity.id,
        login = %identity.login,
        "GitHub identity resolved"
    );

    let pair = sessions
        .login_with_github(&identity, &request_meta(&req))
        .await?;

    let mut clear_state = state_cookie(&req, String::new());
    clear_state.make_removal();

    Ok(HttpResponse::Ok().cookie(clear_state).json(pair))
}

/// Rotate a refresh token into a new pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token invalid, expired or already used", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/refresh")]
pub async fn refresh(
    req: HttpRequest,
    body: web::Json<RefreshTokenRequest>,
    sessions: web::Data<AuthSessionManager>,
) -> actix_web::Result<HttpResponse> {
    if body.refresh_token.is_empty() {
        return Err(AppError::InvalidInput("refresh_token is required".to_string()).into());
    }

    let pair = sessions
        .refresh_token(&body.refresh_token, &request_meta(&req))
        .await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// Revoke a refresh token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "Unknown refresh token", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/logout")]
pub async fn logout(
    body: web::Json<RefreshTokenRequest>,
    sessions: web::Data<AuthSessionManager>,
) -> actix_web::Result<HttpResponse> {
    if body.refresh_token.is_empty() {
        return Err(AppError::InvalidInput("refresh_token is required".to_string()).into());
    }

    sessions.logout(&body.refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Current user from the access token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 404, description = "User no longer exists or is inactive", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[get("/auth/me")]
pub async fn me(
    auth: BearerAuth,
    users: web::Data<dyn UserStore>,
) -> actix_web::Result<HttpResponse> {
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
