mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// All reads and writes happen through a [`Tx`] obtained from [`Store::begin`],
/// so every domain operation runs as a single unit of work.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Opens a write transaction. Dropping the returned handle without calling
    /// [`Tx::commit`] rolls it back.
    fn begin(&self) -> Result<Box<dyn Tx + '_>>;
}

/// A unit of work against the store.
///
/// Listing operations return rows ordered by id ascending unless noted.
/// Deleting a parent row removes its dependents: users take their entries,
/// comments and edits with them; entries take their comments and history.
pub trait Tx {
    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<User>;
    fn delete_user(&self, id: i64) -> Result<bool>;

    // Entry operations
    fn create_entry(&self, entry: &NewEntry) -> Result<Entry>;
    fn get_entry(&self, id: i64) -> Result<Option<Entry>>;
    fn list_user_entries(&self, user_id: i64) -> Result<Vec<Entry>>;
    fn update_entry(&self, entry: &Entry) -> Result<Entry>;
    fn delete_entry(&self, id: i64) -> Result<bool>;

    // Comment operations
    fn create_comment(&self, comment: &NewComment) -> Result<Comment>;
    fn get_comment(&self, id: i64) -> Result<Option<Comment>>;
    fn list_entry_comments(&self, entry_id: i64) -> Result<Vec<Comment>>;
    fn update_comment(&self, comment: &Comment) -> Result<Comment>;
    fn delete_comment(&self, id: i64) -> Result<bool>;

    // Edit history operations (append-only)
    fn append_edit_history(&self, edit: &NewEditHistory) -> Result<EditHistory>;
    fn get_edit_history(&self, id: i64) -> Result<Option<EditHistory>>;
    /// Ordered by `edited_at`, then id.
    fn list_entry_history(&self, entry_id: i64) -> Result<Vec<EditHistory>>;

    fn commit(self: Box<Self>) -> Result<()>;
}

/// Runs `scope` inside a transaction, committing when it returns `Ok` and
/// rolling back when it returns `Err`.
pub fn transaction<T, F>(store: &dyn Store, scope: F) -> Result<T>
where
    F: FnOnce(&dyn Tx) -> Result<T>,
{
    let tx = store.begin()?;
    let value = scope(tx.as_ref())?;
    tx.commit()?;
    Ok(value)
}
