pub mod migrations;
pub mod repository;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use migrations::run_migrations;

/// Open (or create) the database file, enable WAL and foreign keys, migrate.
pub fn open(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Opening database at {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    prepare(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    run_migrations(&conn)?;
    Ok(conn)
}
