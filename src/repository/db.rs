//! Database Connection and Setup
//!
//! Manages the SQLite database connection and migrations. The connection
//! is shared by every repository behind one `tokio::sync::Mutex`, which is
//! what serializes durable writes in the cooperative model.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared connection handle used by all repositories
pub type DbConnection = Arc<Mutex<Connection>>;

/// Open (or create) the database at `db_path` and run migrations.
/// Pass `:memory:` for an in-memory database in tests.
pub fn init_db(db_path: &Path) -> DomainResult<DbConnection> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open db: {}", e)))?;

    run_migrations(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',
            position INTEGER NOT NULL DEFAULT 0,
            column_index INTEGER NOT NULL DEFAULT 0,
            archived_at INTEGER,
            created_at INTEGER,
            updated_at INTEGER
        )",
        (),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL DEFAULT '',
            list_id INTEGER NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'unchecked',
            archived_at INTEGER,
            created_at INTEGER,
            updated_at INTEGER
        )",
        (),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    // Auxiliary tables consumed by layers outside this engine
    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT
        )",
        (),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sync_state (
            key TEXT PRIMARY KEY,
            value TEXT
        )",
        (),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    // Earlier schemas kept task archive state only in `status`
    if !column_exists(conn, "tasks", "archived_at") {
        conn.execute("ALTER TABLE tasks ADD COLUMN archived_at INTEGER", ())
            .map_err(|e| DomainError::Internal(format!("Failed to add archived_at: {}", e)))?;
    }

    // Indexes for the ordered queries every container read uses
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lists_column ON lists(column_index, position)",
        (),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_id, position)",
        (),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(())
}
