//! Mock GitHub OAuth provider for E2E tests.
//!
//! Serves the token exchange, `/user` and `/user/emails` endpoints from an
//! in-process HTTP server. Accounts are registered per authorization code.

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, post, web};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

/// GitHub account served by the mock.
#[derive(Debug, Clone)]
pub struct MockAccount {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    /// Public profile email; `None` mimics a private email setting
    pub email: Option<String>,
    /// `(email, primary, verified)` entries for `/user/emails`
    pub emails: Vec<(String, bool, bool)>,
}

impl MockAccount {
    pub fn public(id: i64, login: &str, email: &str) -> Self {
        Self {
            id,
            login: login.to_string(),
            name: Some("Grace Hopper".to_string()),
            email: Some(email.to_string()),
            emails: vec![(email.to_string(), true, true)],
        }
    }

    pub fn private(id: i64, login: &str, emails: Vec<(&str, bool, bool)>) -> Self {
        Self {
            id,
            login: login.to_string(),
            name: None,
            email: None,
            emails: emails
                .into_iter()
                .map(|(e, p, v)| (e.to_string(), p, v))
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct MockGitHubState {
    /// Authorization code -> account
    pub accounts: HashMap<String, MockAccount>,
    /// Codes GitHub should reject
    pub rejected_codes: Vec<String>,
    /// Token exchanges seen, for asserting client credentials
    pub exchanges: Vec<serde_json::Value>,
}

type SharedState = web::Data<Arc<Mutex<MockGitHubState>>>;

fn access_token_for(code: &str) -> String {
    format!("gho_{}", code)
}

fn account_for(req: &HttpRequest, state: &MockGitHubState) -> Option<MockAccount> {
    let token = req
        .headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    state
        .accounts
        .iter()
        .find(|(code, _)| access_token_for(code) == token)
        .map(|(_, account)| account.clone())
}

#[derive(Deserialize)]
struct ExchangeBody {
    code: String,
}

#[post("/login/oauth/access_token")]
async fn access_token(state: SharedState, body: web::Json<serde_json::Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    state.exchanges.push(body.0.clone());

    let Ok(parsed) = serde_json::from_value::<ExchangeBody>(body.0) else {
        return HttpResponse::BadRequest().finish();
    };

    if state.rejected_codes.contains(&parsed.code) || !state.accounts.contains_key(&parsed.code) {
        // GitHub answers 200 with an error body
        return HttpResponse::Ok().json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired.",
        }));
    }

    HttpResponse::Ok().json(json!({
        "access_token": access_token_for(&parsed.code),
        "token_type": "bearer",
        "scope": "user:email",
    }))
}

#[get("/user")]
async fn user(req: HttpRequest, state: SharedState) -> HttpResponse {
    let state = state.lock().unwrap();
    match account_for(&req, &state) {
        Some(account) => HttpResponse::Ok().json(json!({
            "id": account.id,
            "login": account.login,
            "name": account.name,
            "email": account.email,
            "avatar_url": format!("https://avatars.example.com/u/{}", account.id),
        })),
        None => HttpResponse::Unauthorized().json(json!({ "message": "Bad credentials" })),
    }
}

#[get("/user/emails")]
async fn user_emails(req: HttpRequest, state: SharedState) -> HttpResponse {
    let state = state.lock().unwrap();
    match account_for(&req, &state) {
        Some(account) => {
            let emails: Vec<_> = account
                .emails
                .iter()
                .map(|(email, primary, verified)| {
                    json!({ "email": email, "primary": primary, "verified": verified })
                })
                .collect();
            HttpResponse::Ok().json(emails)
        }
        None => HttpResponse::Unauthorized().json(json!({ "message": "Bad credentials" })),
    }
}

/// Mock GitHub serving both the OAuth and REST endpoints.
pub struct MockGitHubProvider {
    pub base_url: String,
    pub state: Arc<Mutex<MockGitHubState>>,
}

impl MockGitHubProvider {
    /// Start the mock on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockGitHubState::default()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(access_token)
                .service(user)
                .service(user_emails)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Lives as long as the test runtime
        tokio::spawn(server);

        MockGitHubProvider { base_url, state }
    }

    /// Make `code` exchangeable for `account`.
    pub fn register(&self, code: &str, account: MockAccount) {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(code.to_string(), account);
    }

    /// Make the token endpoint reject `code`.
    pub fn reject(&self, code: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_codes
            .push(code.to_string());
    }

    pub fn exchanges(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().exchanges.clone()
    }
}
