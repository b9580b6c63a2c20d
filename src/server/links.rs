use std::collections::BTreeMap;

use crate::types::{Comment, EditHistory, Entry, User};

/// Relation name to URI.
pub type Links = BTreeMap<&'static str, String>;

/// Derives canonical URIs for resources and collections. With an empty base
/// the links are relative, e.g. `/entries/1`.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn uri(&self, path: String) -> String {
        format!("{}{path}", self.base)
    }

    pub fn user(&self, user: &User) -> Links {
        self.user_id(user.id)
    }

    pub fn user_id(&self, id: i64) -> Links {
        Links::from([
            ("self", self.uri(format!("/users/{id}"))),
            ("entries", self.uri(format!("/users/{id}/entries"))),
        ])
    }

    pub fn users(&self) -> Links {
        Links::from([("self", self.uri("/users".to_string()))])
    }

    pub fn entry(&self, entry: &Entry) -> Links {
        let id = entry.id;
        Links::from([
            ("self", self.uri(format!("/entries/{id}"))),
            ("user", self.uri(format!("/users/{}", entry.user_id))),
            ("comments", self.uri(format!("/entries/{id}/comments"))),
            ("history", self.uri(format!("/entries/{id}/history"))),
        ])
    }

    /// The entries collection of `owner`.
    pub fn entries(&self, owner: i64) -> Links {
        Links::from([
            ("self", self.uri("/entries".to_string())),
            ("user", self.uri(format!("/users/{owner}"))),
        ])
    }

    /// The entries collection reached through `/users/{owner}/entries`.
    pub fn user_entries(&self, owner: i64) -> Links {
        Links::from([
            ("self", self.uri(format!("/users/{owner}/entries"))),
            ("user", self.uri(format!("/users/{owner}"))),
        ])
    }

    pub fn comment(&self, comment: &Comment) -> Links {
        Links::from([
            ("self", self.uri(format!("/comments/{}", comment.id))),
            ("entry", self.uri(format!("/entries/{}", comment.entry_id))),
        ])
    }

    pub fn comments(&self, entry_id: i64) -> Links {
        Links::from([
            ("self", self.uri(format!("/entries/{entry_id}/comments"))),
            ("entry", self.uri(format!("/entries/{entry_id}"))),
        ])
    }

    pub fn edit(&self, edit: &EditHistory) -> Links {
        let entry_id = edit.entry_id;
        Links::from([
            ("self", self.uri(format!("/entries/{entry_id}/history/{}", edit.id))),
            ("entry", self.uri(format!("/entries/{entry_id}"))),
        ])
    }

    pub fn history(&self, entry_id: i64) -> Links {
        Links::from([
            ("self", self.uri(format!("/entries/{entry_id}/history"))),
            ("entry", self.uri(format!("/entries/{entry_id}"))),
        ])
    }
}
