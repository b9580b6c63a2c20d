use super::entries::owned_entry;
use crate::error::{Error, Result};
use crate::store::{Store, transaction};
use crate::types::EditHistory;

/// Edit history of an entry, oldest first. Owner only.
pub fn list(store: &dyn Store, viewer: i64, entry_id: i64) -> Result<Vec<EditHistory>> {
    transaction(store, |tx| {
        owned_entry(tx, viewer, entry_id)?;
        tx.list_entry_history(entry_id)
    })
}

pub fn get(store: &dyn Store, viewer: i64, entry_id: i64, history_id: i64) -> Result<EditHistory> {
    transaction(store, |tx| {
        owned_entry(tx, viewer, entry_id)?;
        tx.get_edit_history(history_id)?
            .filter(|edit| edit.entry_id == entry_id)
            .ok_or(Error::NotFound)
    })
}
