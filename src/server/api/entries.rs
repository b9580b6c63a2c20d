use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::Path;
use crate::auth::AuthUser;
use crate::server::AppState;
use crate::server::response::{Ack, ApiError, Collection, Resource};
use crate::server::validation::{EntryWrite, Payload};
use crate::service::entries::{self as entry_service, EntryDraft};

impl From<EntryWrite> for EntryDraft {
    fn from(body: EntryWrite) -> Self {
        EntryDraft {
            title: body.title,
            content: body.content,
            tags: body.tags,
        }
    }
}

pub async fn list_entries(auth: AuthUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries = entry_service::list(state.store.as_ref(), auth.user_id)?;

    Ok::<_, ApiError>(Json(Collection::new(
        entries,
        |entry| state.links.entry(entry),
        state.links.entries(auth.user_id),
    )))
}

pub async fn create_entry(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<EntryWrite>,
) -> impl IntoResponse {
    let entry = entry_service::create(state.store.as_ref(), auth.user_id, body.into())?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(json!({
            "entry_id": entry.id,
            "message": "Entry created successfully",
            "_links": state.links.entry(&entry),
        })),
    ))
}

pub async fn get_entry(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let entry = entry_service::get(state.store.as_ref(), auth.user_id, id)?;

    let links = state.links.entry(&entry);
    Ok::<_, ApiError>(Json(Resource::new(entry, links)))
}

pub async fn replace_entry(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Payload(body): Payload<EntryWrite>,
) -> impl IntoResponse {
    let entry = entry_service::replace(state.store.as_ref(), auth.user_id, id, body.into())?;

    let links = state.links.entry(&entry);
    Ok::<_, ApiError>(Json(Ack {
        message: "Entry updated successfully",
        data: Resource::new(entry, links),
    }))
}

pub async fn delete_entry(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    entry_service::delete(state.store.as_ref(), auth.user_id, id)?;

    Ok::<_, ApiError>(Json(json!({ "message": "Entry deleted successfully" })))
}
