//! SQL DDL for initializing the database (SQLite).

/// Statements run in order by [`super::Storage::migrate`]. All are idempotent.
pub const SQLITE_INIT: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "user" (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS asset (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
        name          TEXT NOT NULL,
        description   TEXT NOT NULL,
        serial_number TEXT UNIQUE,
        value_cents   INTEGER CHECK (value_cents IS NULL OR value_cents >= 0),
        slug          TEXT NOT NULL UNIQUE,
        created_at    TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS asset_user_id_idx ON asset (user_id)",
    "CREATE INDEX IF NOT EXISTS asset_created_at_idx ON asset (created_at)",
];
