use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ffi, params};

use super::schema::SCHEMA;
use super::{Store, Tx};
use crate::config::DatabaseLocation;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn open(location: &DatabaseLocation) -> Result<Self> {
        match location {
            DatabaseLocation::Memory => Self::open_in_memory(),
            DatabaseLocation::File(path) => Self::new(path),
        }
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| Error::Internal(format!("failed to encode tags: {e}")))
}

fn decode_tags(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn decode_optional_tags(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

/// Translates constraint violations into domain errors: a duplicate unique
/// key is `AlreadyExists`, a dangling foreign key is `NotFound`.
fn map_write_error(err: rusqlite::Error) -> Error {
    let extended_code = match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    };

    match extended_code {
        Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
            Error::AlreadyExists
        }
        Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => Error::NotFound,
        _ => Error::Database(err),
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        registered_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        tags: decode_tags(row, 4)?,
        sentiment_score: row.get(5)?,
        sentiment_tag: decode_optional_tags(row, 6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        entry_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn edit_from_row(row: &Row<'_>) -> rusqlite::Result<EditHistory> {
    Ok(EditHistory {
        id: row.get(0)?,
        entry_id: row.get(1)?,
        editor_id: row.get(2)?,
        edited_at: parse_datetime(&row.get::<_, String>(3)?),
        previous_content: row.get(4)?,
        new_content: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, registered_at";
const ENTRY_COLUMNS: &str = "id, user_id, title, content, tags, sentiment_score, sentiment_tag, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, entry_id, user_id, content, created_at, updated_at";
const EDIT_COLUMNS: &str = "id, entry_id, editor_id, edited_at, previous_content, new_content";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn Tx + '_>> {
        let conn = self.conn();
        // IMMEDIATE takes the write lock up front so a read-check-write
        // sequence cannot interleave with another writer.
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTx {
            conn,
            finished: false,
        }))
    }
}

pub struct SqliteTx<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Drop for SqliteTx<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::error!("Failed to roll back transaction: {e}");
        }
    }
}

impl Tx for SqliteTx<'_> {
    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (username, email, password_hash, registered_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.username,
                    user.email,
                    user.password_hash,
                    format_datetime(&user.registered_at),
                ],
            )
            .map_err(map_write_error)?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            registered_at: user.registered_at,
        })
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<User> {
        let rows = self
            .conn
            .execute(
                "UPDATE users SET username = ?1, email = ?2, password_hash = ?3 WHERE id = ?4",
                params![user.username, user.email, user.password_hash, user.id],
            )
            .map_err(map_write_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(user.clone())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Entry operations

    fn create_entry(&self, entry: &NewEntry) -> Result<Entry> {
        let created_at = format_datetime(&entry.created_at);
        self.conn
            .execute(
                "INSERT INTO entries (user_id, title, content, tags, sentiment_score, sentiment_tag, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5, ?5)",
                params![
                    entry.user_id,
                    entry.title,
                    entry.content,
                    encode_tags(&entry.tags)?,
                    created_at,
                ],
            )
            .map_err(map_write_error)?;

        Ok(Entry {
            id: self.conn.last_insert_rowid(),
            user_id: entry.user_id,
            title: entry.title.clone(),
            content: entry.content.clone(),
            tags: entry.tags.clone(),
            sentiment_score: None,
            sentiment_tag: None,
            created_at: entry.created_at,
            updated_at: entry.created_at,
        })
    }

    fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        self.conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"),
                params![id],
                entry_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_user_entries(&self, user_id: i64) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![user_id], entry_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_entry(&self, entry: &Entry) -> Result<Entry> {
        let sentiment_tag = entry
            .sentiment_tag
            .as_deref()
            .map(encode_tags)
            .transpose()?;

        let rows = self
            .conn
            .execute(
                "UPDATE entries
                 SET title = ?1, content = ?2, tags = ?3, sentiment_score = ?4, sentiment_tag = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    entry.title,
                    entry.content,
                    encode_tags(&entry.tags)?,
                    entry.sentiment_score,
                    sentiment_tag,
                    format_datetime(&entry.updated_at),
                    entry.id,
                ],
            )
            .map_err(map_write_error)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(entry.clone())
    }

    fn delete_entry(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Comment operations

    fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        let created_at = format_datetime(&comment.created_at);
        self.conn
            .execute(
                "INSERT INTO comments (entry_id, user_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![comment.entry_id, comment.user_id, comment.content, created_at],
            )
            .map_err(map_write_error)?;

        Ok(Comment {
            id: self.conn.last_insert_rowid(),
            entry_id: comment.entry_id,
            user_id: comment.user_id,
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.created_at,
        })
    }

    fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        self.conn
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
                params![id],
                comment_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_entry_comments(&self, entry_id: i64) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE entry_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![entry_id], comment_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_comment(&self, comment: &Comment) -> Result<Comment> {
        let rows = self.conn.execute(
            "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                comment.content,
                format_datetime(&comment.updated_at),
                comment.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(comment.clone())
    }

    fn delete_comment(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Edit history operations

    fn append_edit_history(&self, edit: &NewEditHistory) -> Result<EditHistory> {
        self.conn
            .execute(
                "INSERT INTO edit_history (entry_id, editor_id, edited_at, previous_content, new_content)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    edit.entry_id,
                    edit.editor_id,
                    format_datetime(&edit.edited_at),
                    edit.previous_content,
                    edit.new_content,
                ],
            )
            .map_err(map_write_error)?;

        Ok(EditHistory {
            id: self.conn.last_insert_rowid(),
            entry_id: edit.entry_id,
            editor_id: edit.editor_id,
            edited_at: edit.edited_at,
            previous_content: edit.previous_content.clone(),
            new_content: edit.new_content.clone(),
        })
    }

    fn get_edit_history(&self, id: i64) -> Result<Option<EditHistory>> {
        self.conn
            .query_row(
                &format!("SELECT {EDIT_COLUMNS} FROM edit_history WHERE id = ?1"),
                params![id],
                edit_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_entry_history(&self, entry_id: i64) -> Result<Vec<EditHistory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EDIT_COLUMNS} FROM edit_history WHERE entry_id = ?1 ORDER BY edited_at, id"
        ))?;

        let rows = stmt.query_map(params![entry_id], edit_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}
