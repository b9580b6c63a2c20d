//! Inbound payload schemas.
//!
//! Bodies are decoded field by field from a JSON object so that a wrong type
//! is reported against the field that carries it, then checked with the
//! `validator` rules declared on each schema. Unknown fields are ignored.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use super::response::ApiError;
use crate::error::FieldErrors;

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_LIST: &str = "Not a valid list.";
const INVALID_BODY: &str = "Invalid input type.";

/// Builds a typed schema from a decoded JSON object.
pub trait Schema: Validate + Sized {
    fn from_object(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Self>;
}

/// Extractor that yields a schema only if the body decodes and validates.
pub struct Payload<S>(pub S);

impl<S, St> FromRequest<St> for Payload<S>
where
    S: Schema,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large()
            } else {
                ApiError::unprocessable(schema_error(INVALID_BODY))
            }
        })?;

        parse(&body).map(Payload).map_err(ApiError::unprocessable)
    }
}

/// Decodes and validates a raw body against `S`.
pub fn parse<S: Schema>(body: &[u8]) -> Result<S, FieldErrors> {
    let value: Value = serde_json::from_slice(body).map_err(|_| schema_error(INVALID_BODY))?;
    let Value::Object(object) = value else {
        return Err(schema_error(INVALID_BODY));
    };

    let mut errors = FieldErrors::new();
    let schema = S::from_object(&object, &mut errors);

    if let Some(schema) = &schema {
        if let Err(failed) = schema.validate() {
            merge(&mut errors, &failed, &object);
        }
    }

    match schema {
        Some(schema) if errors.is_empty() => Ok(schema),
        _ => Err(errors),
    }
}

fn schema_error(message: &str) -> FieldErrors {
    FieldErrors::from([("_schema".to_string(), vec![message.to_string()])])
}

fn push(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

/// Translates `validator` failures into the wording clients see.
fn merge(errors: &mut FieldErrors, failed: &ValidationErrors, object: &Map<String, Value>) {
    for (field, failures) in failed.field_errors() {
        let len = object
            .get(&*field)
            .and_then(Value::as_str)
            .map(|v| v.chars().count() as u64);

        for failure in failures.iter() {
            let param = |name: &str| failure.params.get(name).and_then(Value::as_u64);
            let message = match &*failure.code {
                "email" => "Not a valid email address.".to_string(),
                "length" => {
                    match (param("min"), param("max"), len) {
                        (Some(min), _, Some(len)) if len < min => {
                            format!("Shorter than minimum length {min}.")
                        }
                        (_, Some(max), _) => format!("Longer than maximum length {max}."),
                        (Some(min), None, _) => format!("Shorter than minimum length {min}."),
                        _ => "Invalid length.".to_string(),
                    }
                }
                code => format!("Invalid value ({code})."),
            };
            push(errors, &field, message);
        }
    }
}

fn string_field(
    object: &Map<String, Value>,
    field: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    match object.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) => {
            push(errors, field, NULL);
            None
        }
        Some(_) => {
            push(errors, field, NOT_STRING);
            None
        }
        None => {
            if required {
                push(errors, field, MISSING);
            }
            None
        }
    }
}

fn required_string(object: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    string_field(object, field, true, errors)
}

fn optional_string(object: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    string_field(object, field, false, errors)
}

fn required_string_list(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<Vec<String>> {
    match object.get(field) {
        Some(Value::Array(items)) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            if strings.is_none() {
                push(errors, field, NOT_STRING);
            }
            strings
        }
        Some(Value::Null) => {
            push(errors, field, NULL);
            None
        }
        Some(_) => {
            push(errors, field, NOT_LIST);
            None
        }
        None => {
            push(errors, field, MISSING);
            None
        }
    }
}

#[derive(Debug, Validate)]
pub struct Register {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl Schema for Register {
    fn from_object(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Self> {
        let username = required_string(object, "username", errors);
        let email = required_string(object, "email", errors);
        let password = required_string(object, "password", errors);
        Some(Self {
            username: username?,
            email: email?,
            password: password?,
        })
    }
}

#[derive(Debug, Validate)]
pub struct Login {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl Schema for Login {
    fn from_object(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Self> {
        let email = required_string(object, "email", errors);
        let password = required_string(object, "password", errors);
        Some(Self {
            email: email?,
            password: password?,
        })
    }
}

#[derive(Debug, Validate)]
pub struct EntryWrite {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub tags: Vec<String>,
}

impl Schema for EntryWrite {
    fn from_object(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Self> {
        let title = required_string(object, "title", errors);
        let content = required_string(object, "content", errors);
        let tags = required_string_list(object, "tags", errors);
        Some(Self {
            title: title?,
            content: content?,
            tags: tags?,
        })
    }
}

#[derive(Debug, Validate)]
pub struct CommentWrite {
    #[validate(length(min = 1))]
    pub content: String,
}

impl Schema for CommentWrite {
    fn from_object(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Self> {
        let content = required_string(object, "content", errors)?;
        Some(Self { content })
    }
}

/// Partial update of a user; each present field follows the `Register` rules.
#[derive(Debug, Default, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

impl Schema for UserUpdate {
    fn from_object(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<Self> {
        Some(Self {
            username: optional_string(object, "username", errors),
            email: optional_string(object, "email", errors),
            password: optional_string(object, "password", errors),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_value<S: Schema>(value: Value) -> Result<S, FieldErrors> {
        parse(value.to_string().as_bytes())
    }

    #[test]
    fn test_register_accepts_valid_payload() {
        let register: Register = parse_value(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secure123",
            "admin": true
        }))
        .unwrap();

        assert_eq!(register.username, "alice");
        assert_eq!(register.email, "alice@example.com");
    }

    #[test]
    fn test_register_reports_every_field() {
        let errors = parse_value::<Register>(json!({
            "username": "",
            "email": "not-an-email",
            "password": "short"
        }))
        .unwrap_err();

        assert_eq!(errors["username"], vec!["Shorter than minimum length 1."]);
        assert_eq!(errors["email"], vec!["Not a valid email address."]);
        assert_eq!(errors["password"], vec!["Shorter than minimum length 6."]);
    }

    #[test]
    fn test_missing_fields() {
        let errors = parse_value::<Register>(json!({ "username": "alice" })).unwrap_err();

        assert_eq!(errors["email"], vec![MISSING]);
        assert_eq!(errors["password"], vec![MISSING]);
        assert!(!errors.contains_key("username"));
    }

    #[test]
    fn test_username_too_long() {
        let errors = parse_value::<Register>(json!({
            "username": "x".repeat(51),
            "email": "alice@example.com",
            "password": "secure123"
        }))
        .unwrap_err();

        assert_eq!(errors["username"], vec!["Longer than maximum length 50."]);
    }

    #[test]
    fn test_entry_types_are_checked() {
        let errors = parse_value::<EntryWrite>(json!({
            "title": 5,
            "content": "Hello",
            "tags": "a,b"
        }))
        .unwrap_err();

        assert_eq!(errors["title"], vec![NOT_STRING]);
        assert_eq!(errors["tags"], vec![NOT_LIST]);
        assert!(!errors.contains_key("content"));

        let errors = parse_value::<EntryWrite>(json!({
            "title": "t",
            "content": "c",
            "tags": ["a", 1]
        }))
        .unwrap_err();
        assert_eq!(errors["tags"], vec![NOT_STRING]);
    }

    #[test]
    fn test_entry_requires_content_and_tags() {
        let errors = parse_value::<EntryWrite>(json!({ "title": "t", "content": "c" })).unwrap_err();
        assert_eq!(errors["tags"], vec![MISSING]);

        let errors = parse_value::<EntryWrite>(json!({ "title": "", "content": "", "tags": [] })).unwrap_err();
        assert_eq!(errors["title"], vec!["Shorter than minimum length 1."]);
        assert_eq!(errors["content"], vec!["Shorter than minimum length 1."]);
    }

    #[test]
    fn test_entry_accepts_empty_tags() {
        let entry: EntryWrite = parse_value(json!({ "title": "t", "content": "c", "tags": [] })).unwrap();
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn test_user_update_is_partial() {
        let update: UserUpdate = parse_value(json!({})).unwrap();
        assert!(update.username.is_none() && update.email.is_none() && update.password.is_none());

        let errors = parse_value::<UserUpdate>(json!({ "email": "nope" })).unwrap_err();
        assert_eq!(errors["email"], vec!["Not a valid email address."]);
    }

    #[test]
    fn test_malformed_body() {
        let errors = parse::<CommentWrite>(b"{not json").unwrap_err();
        assert_eq!(errors["_schema"], vec![INVALID_BODY]);

        let errors = parse::<CommentWrite>(b"[1, 2]").unwrap_err();
        assert_eq!(errors["_schema"], vec![INVALID_BODY]);
    }
}
