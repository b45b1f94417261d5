use stitchline_sql::SqlStore;

use crate::service::AuthError;

/// SQL DDL statements to initialize the auth database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for efficient filtering and uniqueness.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        username TEXT UNIQUE,
        role TEXT,
        active INTEGER,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        user_id TEXT,
        revoked INTEGER,
        issued_at TEXT,
        expires_at TEXT,
        created_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_revoked ON sessions(revoked)",
];

pub fn init_schema(sql: &dyn SqlStore) -> Result<(), AuthError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| AuthError::Store(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
