//! SQL schema for the SkillPostr SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- trimmed, lowercased
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- One row per user, inserted empty at sign-up.
CREATE TABLE IF NOT EXISTS profiles (
    id         TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
    name       TEXT,
    avatar_url TEXT,
    bio        TEXT,
    location   TEXT,
    updated_at TEXT NOT NULL
);

-- Posts are never updated or deleted.
CREATE TABLE IF NOT EXISTS posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url   TEXT,
    category    TEXT NOT NULL,   -- 'Tech' | 'Business' | 'Lifestyle'
    author_id   TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL
);

-- Objects are write-once: the (bucket, object_key) pair is never reused.
CREATE TABLE IF NOT EXISTS objects (
    bucket       TEXT NOT NULL,
    object_key   TEXT NOT NULL,
    content_type TEXT NOT NULL,
    content_hash TEXT NOT NULL,   -- SHA-256, lowercase hex
    size         INTEGER NOT NULL,
    data         BLOB NOT NULL,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (bucket, object_key)
);

CREATE INDEX IF NOT EXISTS posts_feed_idx     ON posts(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS sessions_user_idx  ON sessions(user_id);

PRAGMA user_version = 1;
";
