use axum::{
    Json,
    extract::rejection::PathRejection,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use super::links::Links;
use crate::error::{AuthFailure, Error, FieldErrors};

/// A single resource with its hypermedia links.
#[derive(Debug, Serialize)]
pub struct Resource<T: Serialize> {
    #[serde(flatten)]
    pub data: T,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl<T: Serialize> Resource<T> {
    #[must_use]
    pub fn new(data: T, links: Links) -> Self {
        Self { data, links }
    }
}

/// Collection response: `{items: [...], _links: {...}}`.
#[derive(Debug, Serialize)]
pub struct Collection<T: Serialize> {
    pub items: Vec<Resource<T>>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl<T: Serialize> Collection<T> {
    /// Wraps `items`, linking each one with `link`.
    pub fn new<F>(items: Vec<T>, link: F, links: Links) -> Self
    where
        F: Fn(&T) -> Links,
    {
        let items = items
            .into_iter()
            .map(|item| {
                let links = link(&item);
                Resource::new(item, links)
            })
            .collect();
        Self { items, links }
    }
}

/// Acknowledgement for a mutation, optionally carrying the resource.
#[derive(Debug, Serialize)]
pub struct Ack<T: Serialize> {
    pub message: &'static str,
    #[serde(flatten)]
    pub data: T,
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub reason: Option<AuthFailure>,
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            reason: None,
            errors: None,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn unauthorized(failure: AuthFailure) -> Self {
        Self {
            reason: Some(failure),
            ..Self::with_status(StatusCode::UNAUTHORIZED, failure.message())
        }
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::with_status(StatusCode::FORBIDDEN, "Unauthorized")
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::with_status(StatusCode::NOT_FOUND, "Not found")
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::with_status(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::with_status(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    }

    #[must_use]
    pub fn unprocessable(errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::with_status(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed")
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(errors) => ApiError::unprocessable(errors),
            Error::Auth(failure) => ApiError::unauthorized(failure),
            Error::Forbidden => ApiError::forbidden(),
            Error::NotFound => ApiError::not_found(),
            Error::Conflict(message) => ApiError::bad_request(message),
            Error::AlreadyExists => ApiError::bad_request("Resource already exists"),
            other => {
                tracing::error!("Request failed: {other}");
                ApiError::internal()
            }
        }
    }
}

/// An id segment that does not parse as an integer names no resource.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                tracing::debug!("Rejected path: {}", err.body_text());
                ApiError::not_found()
            }
            other => {
                tracing::error!("Path extraction failed: {}", other.body_text());
                ApiError::internal()
            }
        }
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        ApiError::unauthorized(failure)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match (&self.errors, self.reason) {
            (Some(errors), _) => json!({ "errors": errors }),
            (None, Some(reason)) => json!({ "error": self.message, "reason": reason.reason() }),
            (None, None) => json!({ "error": self.message }),
        };

        let mut response = (self.status, Json(body)).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"journal\""),
            );
        }

        response
    }
}
