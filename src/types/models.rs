use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Reserved for a sentiment collaborator; always null for now.
    pub sentiment_score: Option<f64>,
    pub sentiment_tag: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub entry_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub entry_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// An append-only record of one content replacement on an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditHistory {
    pub id: i64,
    pub entry_id: i64,
    pub editor_id: i64,
    pub edited_at: DateTime<Utc>,
    pub previous_content: String,
    pub new_content: String,
}

#[derive(Debug, Clone)]
pub struct NewEditHistory {
    pub entry_id: i64,
    pub editor_id: i64,
    pub edited_at: DateTime<Utc>,
    pub previous_content: String,
    pub new_content: String,
}
