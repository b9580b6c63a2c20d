use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};

use super::Path;
use crate::auth::AuthUser;
use crate::server::AppState;
use crate::server::response::{ApiError, Collection, Resource};
use crate::service::history as history_service;

pub async fn list_history(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let edits = history_service::list(state.store.as_ref(), auth.user_id, id)?;

    Ok::<_, ApiError>(Json(Collection::new(
        edits,
        |edit| state.links.edit(edit),
        state.links.history(id),
    )))
}

pub async fn get_history(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((id, history_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let edit = history_service::get(state.store.as_ref(), auth.user_id, id, history_id)?;

    let links = state.links.edit(&edit);
    Ok::<_, ApiError>(Json(Resource::new(edit, links)))
}
