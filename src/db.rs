// ==========================================
// StitchAdmin - SQLite-Verbindungsinitialisierung
// ==========================================
// Ziel:
// - Einheitliches PRAGMA-Verhalten für alle Connection::open-Aufrufe
//   (Fremdschlüssel immer an, einheitliches busy_timeout)
// - Schema-Anlage und Versionsprüfung an einer Stelle
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Standard busy_timeout (Millisekunden)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Vom Code erwartete schema_version (abgeglichen mit `schema.sql`)
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Eingebettetes Schema
const SCHEMA_SQL: &str = include_str!("../schema.sql");

/// Konfiguriert die einheitlichen PRAGMAs einer SQLite-Verbindung
///
/// Hinweis:
/// - foreign_keys muss pro Verbindung aktiviert werden
/// - busy_timeout muss pro Verbindung gesetzt werden
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Öffnet eine SQLite-Verbindung mit einheitlicher Konfiguration
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Öffnet eine In-Memory-Verbindung mit Schema (für Tests und Demos)
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Legt das Schema an (idempotent) und schreibt die schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let existing = read_schema_version(conn)?;
    if existing.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// Liest die schema_version (None, wenn die Tabelle fehlt)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_schema() {
        let conn = open_in_memory().unwrap();
        let version = read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_in_memory().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }
}
