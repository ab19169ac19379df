//! Shared helpers for the API E2E tests.

use std::sync::Arc;

use actix_web::{App, dev::ServiceResponse, test, web};
use argon2::Params;
use personal_blog_lib::auth::{Argon2Hasher, PasswordHasher};
use personal_blog_lib::config::{AuthSettings, GitHubOAuthSettings};
use personal_blog_lib::db::{MemoryStore, RefreshTokenStore, UserStore};
use personal_blog_lib::middleware::RequestLogger;
use personal_blog_lib::services::{AuthSessionManager, GitHubOAuthClient, UserService};
use secrecy::SecretString;
use serde_json::{Value, json};

pub const TEST_JWT_SECRET: &str = "e2e-test-secret-that-is-long-enough";
pub const TEST_CLIENT_ID: &str = "e2e-client-id";
pub const TEST_CLIENT_SECRET: &str = "e2e-client-secret";

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: SecretString::from(TEST_JWT_SECRET.to_string()),
        access_token_ttl_secs: 300,
        refresh_token_ttl_secs: 3600,
        disclose_login_method: true,
        cleanup_interval_secs: 60,
    }
}

/// GitHub settings pointing both base URLs at a mock provider.
pub fn github_settings(base_url: &str) -> GitHubOAuthSettings {
    GitHubOAuthSettings {
        enabled: true,
        client_id: Some(TEST_CLIENT_ID.to_string()),
        client_secret: Some(SecretString::from(TEST_CLIENT_SECRET.to_string())),
        redirect_url: Some("http://localhost:4444/api/v1/auth/github/callback".to_string()),
        oauth_base_url: base_url.to_string(),
        api_base_url: base_url.to_string(),
        http_timeout_secs: 5,
    }
}

/// Argon2id with minimal cost so tests stay fast.
pub fn fast_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::with_params(Params::new(8, 1, 1, None).unwrap()))
}

/// Create a test app over `store`, with GitHub sign-in when `github_base_url` is set.
pub async fn create_test_app(
    store: &MemoryStore,
    github_base_url: Option<&str>,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let users: Arc<dyn UserStore> = Arc::new(store.clone());
    let refresh_tokens: Arc<dyn RefreshTokenStore> = Arc::new(store.clone());
    let hasher: Arc<dyn PasswordHasher> = fast_hasher();

    let sessions = AuthSessionManager::new(
        users.clone(),
        refresh_tokens,
        hasher.clone(),
        &auth_settings(),
    )
    .expect("failed to build session manager");
    let signer = sessions.signer().clone();
    let user_service = UserService::new(users.clone(), hasher);

    let mut app = App::new()
        .wrap(RequestLogger)
        .app_data(web::Data::new(sessions))
        .app_data(web::Data::from(users))
        .app_data(web::Data::new(user_service))
        .app_data(web::Data::new(signer));

    if let Some(base_url) = github_base_url {
        let client = GitHubOAuthClient::new(&github_settings(base_url))
            .expect("failed to build GitHub client");
        app = app.app_data(web::Data::new(client));
    }

    test::init_service(app.configure(personal_blog_lib::api::configure_v1)).await
}

/// Call a route and return `(status, json body)`. Empty bodies read as `Null`.
pub async fn send<S>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, body)
}

/// Register a password account.
pub async fn signup<S>(app: &S, email: &str, password: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": email,
            "password": password,
        }))
        .to_request();
    send(app, req).await
}

/// Password login.
pub async fn login<S>(app: &S, email: &str, password: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header(("User-Agent", "e2e-agent/1.0"))
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

/// Redeem a refresh token.
pub async fn refresh<S>(app: &S, refresh_token: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": refresh_token }))
        .to_request();
    send(app, req).await
}

/// Revoke a refresh token.
pub async fn logout<S>(app: &S, refresh_token: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .set_json(json!({ "refresh_token": refresh_token }))
        .to_request();
    send(app, req).await
}

/// Fetch the current user with an access token.
pub async fn me<S>(app: &S, access_token: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", access_token)))
        .to_request();
    send(app, req).await
}
