mod comments;
mod entries;
mod history;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRequestParts,
    routing::{get, post, put},
};

use crate::server::AppState;
use crate::server::response::ApiError;

/// Path parameters whose rejection is reported as a JSON error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/entries", get(users::list_user_entries))
        // Entries
        .route(
            "/entries",
            get(entries::list_entries).post(entries::create_entry),
        )
        .route(
            "/entries/{id}",
            get(entries::get_entry)
                .put(entries::replace_entry)
                .delete(entries::delete_entry),
        )
        // Comments
        .route(
            "/entries/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/entries/{id}/comments/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/comments/{id}", get(comments::get_comment))
        // Edit history (read-only)
        .route("/entries/{id}/history", get(history::list_history))
        .route(
            "/entries/{id}/history/{history_id}",
            get(history::get_history),
        )
        .method_not_allowed_fallback(super::router::method_not_allowed)
}
