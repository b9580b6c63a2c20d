use crate::error::{Error, Result};
use crate::store::{Store, Tx, transaction};
use crate::types::{Comment, NewComment};

fn ensure_entry(tx: &dyn Tx, entry_id: i64) -> Result<()> {
    tx.get_entry(entry_id)?.ok_or(Error::NotFound)?;
    Ok(())
}

/// Loads a comment through its entry and checks authorship. A comment that
/// belongs to a different entry counts as absent.
fn authored_comment(tx: &dyn Tx, author: i64, entry_id: i64, comment_id: i64) -> Result<Comment> {
    let comment = tx
        .get_comment(comment_id)?
        .filter(|c| c.entry_id == entry_id)
        .ok_or(Error::NotFound)?;

    if comment.user_id != author {
        tracing::warn!("User {author} refused access to comment {comment_id}");
        return Err(Error::Forbidden);
    }
    Ok(comment)
}

/// Any authenticated user may comment on any existing entry.
pub fn add(store: &dyn Store, author: i64, entry_id: i64, content: String) -> Result<Comment> {
    let comment = transaction(store, |tx| {
        ensure_entry(tx, entry_id)?;
        tx.create_comment(&NewComment {
            entry_id,
            user_id: author,
            content,
            created_at: super::now(),
        })
    })?;

    tracing::info!("User {author} commented on entry {entry_id}");
    Ok(comment)
}

pub fn list(store: &dyn Store, entry_id: i64) -> Result<Vec<Comment>> {
    transaction(store, |tx| {
        ensure_entry(tx, entry_id)?;
        tx.list_entry_comments(entry_id)
    })
}

pub fn get(store: &dyn Store, comment_id: i64) -> Result<Comment> {
    transaction(store, |tx| tx.get_comment(comment_id)?.ok_or(Error::NotFound))
}

pub fn update(
    store: &dyn Store,
    author: i64,
    entry_id: i64,
    comment_id: i64,
    content: String,
) -> Result<Comment> {
    let comment = transaction(store, |tx| {
        let mut comment = authored_comment(tx, author, entry_id, comment_id)?;
        comment.content = content;
        comment.updated_at = super::bump(comment.updated_at, super::now());
        tx.update_comment(&comment)
    })?;

    tracing::info!("User {author} updated comment {comment_id}");
    Ok(comment)
}

pub fn delete(store: &dyn Store, author: i64, entry_id: i64, comment_id: i64) -> Result<()> {
    transaction(store, |tx| {
        authored_comment(tx, author, entry_id, comment_id)?;
        tx.delete_comment(comment_id)?;
        Ok(())
    })?;

    tracing::info!("User {author} deleted comment {comment_id}");
    Ok(())
}
