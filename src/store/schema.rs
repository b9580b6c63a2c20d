pub const SCHEMA: &str = r#"
-- Users own entries; email is the login identity
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    registered_at TEXT NOT NULL
);

-- Journal entries
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings

    -- Placeholders for a sentiment collaborator, NULL until one exists
    sentiment_score REAL,
    sentiment_tag TEXT,                -- JSON array of strings

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Comments may be left by any user on any entry
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Append-only record of entry content replacements
CREATE TABLE IF NOT EXISTS edit_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    editor_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    edited_at TEXT NOT NULL,
    previous_content TEXT NOT NULL,
    new_content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_user ON entries(user_id);
CREATE INDEX IF NOT EXISTS idx_comments_entry ON comments(entry_id);
CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id);
CREATE INDEX IF NOT EXISTS idx_edit_history_entry ON edit_history(entry_id);
CREATE INDEX IF NOT EXISTS idx_edit_history_editor ON edit_history(editor_id);
"#;
