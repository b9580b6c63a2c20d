use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;

use super::helpers::extract_bearer;
use crate::error::AuthFailure;
use crate::server::AppState;
use crate::server::response::ApiError;
use crate::store::transaction;

/// Extractor that requires a valid bearer token whose subject still exists.
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthFailure::Malformed)?),
            None => None,
        };

        let bearer = extract_bearer(header)?;
        let user_id = state.tokens.verify(bearer, Utc::now())?;

        let known = transaction(state.store.as_ref(), |tx| Ok(tx.get_user(user_id)?.is_some()))?;
        if !known {
            tracing::warn!("Rejected token for deleted user {user_id}");
            return Err(AuthFailure::UnknownUser.into());
        }

        Ok(AuthUser { user_id })
    }
}
