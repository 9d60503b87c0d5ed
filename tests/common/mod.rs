//! Shared helpers for the integration tests
//!
//! Every test gets its own server on a random port, backed by in-memory
//! storage, so no database is needed.

#![allow(dead_code)]

use std::net::TcpListener;

use chirpy::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, PolkaSettings, Platform, Settings,
};
use chirpy::startup::run;
use chirpy::storage::Storage;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub struct LoggedInUser {
    pub id: String,
    pub token: String,
    pub refresh_token: String,
}

pub fn test_settings(platform: Platform) -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform,
            static_dir: "./public".to_string(),
        },
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy_test".to_string(),
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 60 * 24 * 60 * 60,
        },
        polka: PolkaSettings {
            api_key: POLKA_KEY.to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_settings(Platform::Dev)).await
}

pub async fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, Storage::in_memory(), settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_user(&self, email: &str) -> Value {
        let response = self
            .post_json("/api/users", &json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(201, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str) -> LoggedInUser {
        let response = self
            .post_json("/api/login", &json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(200, response.status().as_u16());

        let body: Value = response.json().await.expect("Failed to parse response");
        LoggedInUser {
            id: body["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn signup_and_login(&self, email: &str) -> LoggedInUser {
        self.create_user(email).await;
        self.login(email).await
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(&self.url("/api/chirps"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
