use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use bullpen::auth::password;
use bullpen::config::Config;
use bullpen::db::MemoryAccountStore;
use bullpen::models::Account;
use bullpen::state::SharedState;

pub const TEST_SECRET: &str = "test-reset-secret-that-is-long-enough";

/// A running test server backed by an in-memory account store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    pub accounts: Arc<MemoryAccountStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Seed an account whose password is `plain`.
    pub fn seed_account(&self, email: &str, plain: &str) -> Account {
        let hash = password::hash(plain).expect("hashing failed");
        self.accounts.insert(email, &hash, "Test Coach")
    }

    /// Issue a token for `account` the same way the forgot-password flow does.
    pub fn issue_token(&self, account: &Account) -> String {
        self.state
            .reset_tokens
            .issue(&account.id.to_string(), &account.email, &account.password_hash)
            .expect("issue failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn forgot_password(&self, email: &str) -> (Value, StatusCode) {
        self.post_json("/api/v1/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/v1/auth/reset-password",
            &json!({ "token": token, "password": new_password }),
        )
        .await
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        reset_token_secret: TEST_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        reset_ttl_minutes: 15,
        log_level: "warn".to_string(),
        smtp: None,
    }
}

/// Spawn the app on a random port.
pub async fn spawn_app() -> TestApp {
    let accounts = Arc::new(MemoryAccountStore::new());
    let (app, state) = bullpen::build_app(test_config(), accounts.clone())
        .expect("Failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        state,
        accounts,
    }
}
