#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use journal::auth::{PasswordVault, TokenService};
use journal::server::{AppState, LinkBuilder, create_router};
use journal::store::{SqliteStore, Store};

pub const SECRET: &[u8] = b"integration-test-secret";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// The full router over a fresh in-memory store.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = SqliteStore::open_in_memory().expect("open store");
        store.initialize().expect("initialize store");

        let state = Arc::new(AppState::new(
            Arc::new(store),
            PasswordVault::with_params(1024, 1, 1).expect("vault params"),
            TokenService::new(SECRET, Duration::minutes(15)),
            LinkBuilder::default(),
        ));

        Self {
            router: create_router(state),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `<name>@example.com` with password `secure123`, returning the id.
    pub async fn register(&self, name: &str) -> i64 {
        let resp = self
            .send(
                Method::POST,
                "/api/users/register",
                None,
                Some(json!({
                    "username": name,
                    "email": format!("{name}@example.com"),
                    "password": "secure123"
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "register {name}: {}", resp.body);
        resp.body["id"].as_i64().expect("user id")
    }

    pub async fn login(&self, name: &str) -> String {
        let resp = self
            .send(
                Method::POST,
                "/api/users/login",
                None,
                Some(json!({
                    "email": format!("{name}@example.com"),
                    "password": "secure123"
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login {name}: {}", resp.body);
        resp.body["token"].as_str().expect("token").to_string()
    }

    /// Registers and logs in, returning `(user id, token)`.
    pub async fn user(&self, name: &str) -> (i64, String) {
        let id = self.register(name).await;
        let token = self.login(name).await;
        (id, token)
    }

    pub async fn create_entry(&self, token: &str, title: &str, content: &str, tags: &[&str]) -> i64 {
        let resp = self
            .post(
                "/api/entries",
                token,
                json!({ "title": title, "content": content, "tags": tags }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create entry: {}", resp.body);
        resp.body["entry_id"].as_i64().expect("entry id")
    }
}
