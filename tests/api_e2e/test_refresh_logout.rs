//! E2E tests: refresh rotation and logout.

use personal_blog_lib::db::MemoryStore;

use super::test_helpers::*;

async fn logged_in<S>(app: &S) -> serde_json::Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    signup(app, "a@x.com", "correct horse").await;
    let (status, pair) = login(app, "a@x.com", "correct horse").await;
    assert_eq!(status, 200, "Login should succeed: {:?}", pair);
    pair
}

/// Login, refresh, then replay the first refresh token.
#[actix_rt::test]
async fn test_refresh_rotates_and_rejects_replay() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;
    let t1 = logged_in(&app).await;
    let t1_refresh = t1["refresh_token"].as_str().unwrap();

    let (status, t2) = refresh(&app, t1_refresh).await;
    assert_eq!(status, 200, "Refresh should succeed: {:?}", t2);
    assert_ne!(t2["refresh_token"], t1["refresh_token"]);

    let (status, body) = refresh(&app, t1_refresh).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "REFRESH_TOKEN_REVOKED");

    // The rotated token still works and stays bound to the same user
    let (status, t3) = refresh(&app, t2["refresh_token"].as_str().unwrap()).await;
    assert_eq!(status, 200);
    let (_, first) = me(&app, t1["access_token"].as_str().unwrap()).await;
    let (_, third) = me(&app, t3["access_token"].as_str().unwrap()).await;
    assert_eq!(first["id"], third["id"]);
}

#[actix_rt::test]
async fn test_refresh_unknown_token() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let (status, body) = refresh(&app, "0123456789abcdef").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "INVALID_REFRESH_TOKEN");
}

#[actix_rt::test]
async fn test_logout_revokes_refresh_token() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;
    let pair = logged_in(&app).await;
    let raw = pair["refresh_token"].as_str().unwrap();

    let (status, body) = logout(&app, raw).await;
    assert_eq!(status, 204);
    assert!(body.is_null());

    // Logging out twice is harmless
    let (status, _) = logout(&app, raw).await;
    assert_eq!(status, 204);

    let (status, body) = refresh(&app, raw).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "REFRESH_TOKEN_REVOKED");
}

#[actix_rt::test]
async fn test_logout_unknown_token() {
    let store = MemoryStore::new();
    let app = create_test_app(&store, None).await;

    let (status, body) = logout(&app, "never-issued").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "INVALID_REFRESH_TOKEN");
}
