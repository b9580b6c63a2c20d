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
use crate::server::validation::{Login, Payload, Register, UserUpdate};
use crate::service::entries as entry_service;
use crate::service::users::{self as user_service, Registration, UserPatch};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<Register>,
) -> impl IntoResponse {
    let user = user_service::register(
        state.store.as_ref(),
        &state.vault,
        Registration {
            username: body.username,
            email: body.email,
            password: body.password,
        },
    )?;

    let links = state.links.user(&user);
    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(Ack {
            message: "User registered successfully",
            data: Resource::new(user, links),
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<Login>,
) -> impl IntoResponse {
    let session = user_service::login(
        state.store.as_ref(),
        &state.vault,
        &state.tokens,
        &body.email,
        &body.password,
    )?;

    let mut links = state.links.user_id(session.user_id);
    links.retain(|rel, _| *rel == "self");

    Ok::<_, ApiError>(Json(json!({
        "token": session.token,
        "user_id": session.user_id,
        "_links": links,
    })))
}

pub async fn list_users(auth: AuthUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let users = user_service::list_visible(state.store.as_ref(), auth.user_id)?;

    Ok::<_, ApiError>(Json(Collection::new(
        users,
        |user| state.links.user(user),
        state.links.users(),
    )))
}

pub async fn get_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = user_service::get(state.store.as_ref(), auth.user_id, id)?;

    let links = state.links.user(&user);
    Ok::<_, ApiError>(Json(Resource::new(user, links)))
}

pub async fn update_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Payload(body): Payload<UserUpdate>,
) -> impl IntoResponse {
    let user = user_service::update(
        state.store.as_ref(),
        &state.vault,
        auth.user_id,
        id,
        UserPatch {
            username: body.username,
            email: body.email,
            password: body.password,
        },
    )?;

    let links = state.links.user(&user);
    Ok::<_, ApiError>(Json(Ack {
        message: "User updated successfully",
        data: Resource::new(user, links),
    }))
}

pub async fn delete_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    user_service::delete(state.store.as_ref(), auth.user_id, id)?;

    Ok::<_, ApiError>(Json(json!({ "message": "User deleted successfully" })))
}

pub async fn list_user_entries(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let entries = entry_service::list_for_user(state.store.as_ref(), auth.user_id, id)?;

    Ok::<_, ApiError>(Json(Collection::new(
        entries,
        |entry| state.links.entry(entry),
        state.links.user_entries(id),
    )))
}
