use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::api::api_router;
use super::links::LinkBuilder;
use super::response::ApiError;
use crate::auth::{PasswordVault, TokenService};
use crate::store::Store;

/// Shared, read-only context handed to every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub vault: PasswordVault,
    pub tokens: TokenService,
    pub links: LinkBuilder,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        vault: PasswordVault,
        tokens: TokenService,
        links: LinkBuilder,
    ) -> Self {
        Self {
            store,
            vault,
            tokens,
            links,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

pub(super) async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
