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
use crate::server::validation::{CommentWrite, Payload};
use crate::service::comments as comment_service;

pub async fn list_comments(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let comments = comment_service::list(state.store.as_ref(), id)?;

    Ok::<_, ApiError>(Json(Collection::new(
        comments,
        |comment| state.links.comment(comment),
        state.links.comments(id),
    )))
}

pub async fn add_comment(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Payload(body): Payload<CommentWrite>,
) -> impl IntoResponse {
    let comment = comment_service::add(state.store.as_ref(), auth.user_id, id, body.content)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(json!({
            "comment_id": comment.id,
            "message": "Comment added successfully",
            "_links": state.links.comment(&comment),
        })),
    ))
}

pub async fn get_comment(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let comment = comment_service::get(state.store.as_ref(), id)?;

    let links = state.links.comment(&comment);
    Ok::<_, ApiError>(Json(Resource::new(comment, links)))
}

pub async fn update_comment(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((id, comment_id)): Path<(i64, i64)>,
    Payload(body): Payload<CommentWrite>,
) -> impl IntoResponse {
    let comment = comment_service::update(
        state.store.as_ref(),
        auth.user_id,
        id,
        comment_id,
        body.content,
    )?;

    let links = state.links.comment(&comment);
    Ok::<_, ApiError>(Json(Ack {
        message: "Comment updated successfully",
        data: Resource::new(comment, links),
    }))
}

pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    comment_service::delete(state.store.as_ref(), auth.user_id, id, comment_id)?;

    Ok::<_, ApiError>(Json(json!({ "message": "Comment deleted successfully" })))
}
