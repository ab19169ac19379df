//! E2E tests: signup, password login and the bearer-protected `/auth/me`.

use actix_web::test;
use personal_blog_lib::db::MemoryStore;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn test_signup_then_login() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let (status, user) = signup(&app, "ada@example.com", "correct horse").await;
    assert_eq!(status, 201, "Signup should succeed: {:?}", user);
    assert_eq!(user["email"], "ada@example.com");
    assert!(user.get("password_hash").is_none());

    let (status, pair) = login(&app, "ada@example.com", "correct horse").await;
    assert_eq!(status, 200, "Login should succeed: {:?}", pair);
    assert!(pair["access_token"].is_string());
    assert!(pair["refresh_token"].is_string());

    let (status, current) = me(&app, pair["access_token"].as_str().unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(current["id"], user["id"]);
    assert_eq!(current["email"], "ada@example.com");

    // Audit fields recorded on the refresh token
    let user_id = uuid::Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();
    let tokens = store.refresh_tokens_for(user_id).await;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].user_agent.as_deref(), Some("e2e-agent/1.0"));
}

#[actix_rt::test]
async fn test_signup_duplicate_email_conflicts() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    signup(&app, "ada@example.com", "correct horse").await;
    let (status, body) = signup(&app, "ada@example.com", "another password").await;

    assert_eq!(status, 409);
    assert_eq!(body["error"], "CONFLICT");
}

#[actix_rt::test]
async fn test_signup_rejects_short_password() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let (status, body) = signup(&app, "ada@example.com", "short").await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
    assert_eq!(store.user_count().await, 0);
}

#[actix_rt::test]
async fn test_login_wrong_password_and_unknown_email_look_alike() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;
    signup(&app, "ada@example.com", "correct horse").await;

    let (wrong_status, wrong_body) = login(&app, "ada@example.com", "wrong horse").await;
    let (unknown_status, unknown_body) = login(&app, "nobody@example.com", "wrong horse").await;

    assert_eq!(wrong_status, 401);
    assert_eq!(unknown_status, 401);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "USER_NOT_FOUND");
}

#[actix_rt::test]
async fn test_login_requires_fields() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let (status, body) = login(&app, "", "").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, _) = login(&app, "not-an-email", "whatever").await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_me_requires_valid_bearer() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = me(&app, "not.a.jwt").await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_me_for_deactivated_user() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let (_, user) = signup(&app, "ada@example.com", "correct horse").await;
    let (_, pair) = login(&app, "ada@example.com", "correct horse").await;

    let user_id = uuid::Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();
    store.set_active(user_id, false).await;

    let (status, _) = me(&app, pair["access_token"].as_str().unwrap()).await;
    assert_eq!(status, 404);
}
