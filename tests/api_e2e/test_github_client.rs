//! E2E tests: `GitHubOAuthClient` against the mock provider.

use personal_blog_lib::error::OAuthError;
use personal_blog_lib::services::GitHubOAuthClient;
use secrecy::ExposeSecret;

use super::mock_github_provider::{MockAccount, MockGitHubProvider};
use super::test_helpers::*;

#[actix_rt::test]
async fn test_exchange_code_sends_client_credentials() {
    let mock = MockGitHubProvider::start().await;
    mock.register("code-1", MockAccount::public(1, "octocat", "octo@example.com"));
    let client = GitHubOAuthClient::new(&github_settings(&mock.base_url)).unwrap();

    let token = client.exchange_code_for_token("code-1").await.unwrap();
    assert_eq!(token.expose_secret(), "gho_code-1");

    let exchanges = mock.exchanges();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0]["client_id"], TEST_CLIENT_ID);
    assert_eq!(exchanges[0]["client_secret"], TEST_CLIENT_SECRET);
    assert_eq!(exchanges[0]["code"], "code-1");
}

#[actix_rt::test]
async fn test_exchange_rejected_code_is_an_error() {
    let mock = MockGitHubProvider::start().await;
    mock.register("code-2", MockAccount::public(2, "octocat", "octo@example.com"));
    mock.reject("code-2");
    let client = GitHubOAuthClient::new(&github_settings(&mock.base_url)).unwrap();

    let err = client.exchange_code_for_token("code-2").await.unwrap_err();
    match err {
        OAuthError::TokenExchange(reason) => assert!(reason.contains("incorrect or expired")),
        other => panic!("expected TokenExchange, got {other:?}"),
    }
}

#[actix_rt::test]
async fn test_user_info_with_public_email() {
    let mock = MockGitHubProvider::start().await;
    mock.register("code-3", MockAccount::public(3, "octocat", "octo@example.com"));
    let client = GitHubOAuthClient::new(&github_settings(&mock.base_url)).unwrap();

    let token = client.exchange_code_for_token("code-3").await.unwrap();
    let identity = client.get_user_info(&token).await.unwrap();

    assert_eq!(identity.id, 3);
    assert_eq!(identity.login, "octocat");
    assert_eq!(identity.email, "octo@example.com");
    assert_eq!(identity.name.as_deref(), Some("Grace Hopper"));
    assert!(identity.avatar_url.is_some());
}

#[actix_rt::test]
async fn test_user_info_falls_back_to_email_list() {
    let mock = MockGitHubProvider::start().await;
    mock.register(
        "code-4",
        MockAccount::private(
            4,
            "hidden",
            vec![
                ("unverified@example.com", false, false),
                ("verified@example.com", false, true),
                ("primary@example.com", true, true),
            ],
        ),
    );
    let client = GitHubOAuthClient::new(&github_settings(&mock.base_url)).unwrap();

    let token = client.exchange_code_for_token("code-4").await.unwrap();
    let identity = client.get_user_info(&token).await.unwrap();

    assert_eq!(identity.email, "primary@example.com");
    assert_eq!(identity.display_name(), "hidden");
}

#[actix_rt::test]
async fn test_user_info_without_any_email() {
    let mock = MockGitHubProvider::start().await;
    mock.register("code-5", MockAccount::private(5, "ghost", vec![]));
    let client = GitHubOAuthClient::new(&github_settings(&mock.base_url)).unwrap();

    let token = client.exchange_code_for_token("code-5").await.unwrap();
    let err = client.get_user_info(&token).await.unwrap_err();
    assert!(matches!(err, OAuthError::MissingEmail));
}

#[actix_rt::test]
async fn test_user_info_bad_token_is_status_error() {
    let mock = MockGitHubProvider::start().await;
    let client = GitHubOAuthClient::new(&github_settings(&mock.base_url)).unwrap();

    let err = client
        .get_user_info(&secrecy::SecretString::from("gho_forged".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OAuthError::Status {
            endpoint: "/user",
            status: 401
        }
    ));
}
