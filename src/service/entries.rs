use crate::error::{Error, Result};
use crate::store::{Store, Tx, transaction};
use crate::types::{Entry, NewEditHistory, NewEntry};

/// The writable fields of an entry, used both to create and to replace one.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Loads an entry the viewer owns: absent is `NotFound`, someone else's is
/// `Forbidden`.
pub(crate) fn owned_entry(tx: &dyn Tx, viewer: i64, entry_id: i64) -> Result<Entry> {
    let entry = tx.get_entry(entry_id)?.ok_or(Error::NotFound)?;
    if entry.user_id != viewer {
        tracing::warn!("User {viewer} refused access to entry {entry_id}");
        return Err(Error::Forbidden);
    }
    Ok(entry)
}

pub fn create(store: &dyn Store, owner: i64, draft: EntryDraft) -> Result<Entry> {
    let entry = transaction(store, |tx| {
        tx.create_entry(&NewEntry {
            user_id: owner,
            title: draft.title,
            content: draft.content,
            tags: draft.tags,
            created_at: super::now(),
        })
    })?;

    tracing::info!("User {owner} created entry {}", entry.id);
    Ok(entry)
}

pub fn list(store: &dyn Store, owner: i64) -> Result<Vec<Entry>> {
    transaction(store, |tx| tx.list_user_entries(owner))
}

/// Entries of `user_id`, readable only by that user.
pub fn list_for_user(store: &dyn Store, viewer: i64, user_id: i64) -> Result<Vec<Entry>> {
    if viewer != user_id {
        tracing::warn!("User {viewer} refused access to entries of user {user_id}");
        return Err(Error::Forbidden);
    }
    list(store, user_id)
}

pub fn get(store: &dyn Store, viewer: i64, entry_id: i64) -> Result<Entry> {
    transaction(store, |tx| owned_entry(tx, viewer, entry_id))
}

/// Overwrites title, content and tags. A change of content is recorded in the
/// edit history within the same transaction.
pub fn replace(store: &dyn Store, viewer: i64, entry_id: i64, draft: EntryDraft) -> Result<Entry> {
    let entry = transaction(store, |tx| {
        let mut entry = owned_entry(tx, viewer, entry_id)?;
        let now = super::now();
        let previous_content = std::mem::replace(&mut entry.content, draft.content);

        entry.title = draft.title;
        entry.tags = draft.tags;
        entry.updated_at = super::bump(entry.updated_at, now);

        if previous_content != entry.content {
            tx.append_edit_history(&NewEditHistory {
                entry_id,
                editor_id: viewer,
                edited_at: now,
                previous_content,
                new_content: entry.content.clone(),
            })?;
        }

        tx.update_entry(&entry)
    })?;

    tracing::info!("User {viewer} replaced entry {entry_id}");
    Ok(entry)
}

pub fn delete(store: &dyn Store, viewer: i64, entry_id: i64) -> Result<()> {
    transaction(store, |tx| {
        owned_entry(tx, viewer, entry_id)?;
        tx.delete_entry(entry_id)?;
        Ok(())
    })?;

    tracing::info!("User {viewer} deleted entry {entry_id}");
    Ok(())
}
