// ==========================================
// StitchAdmin - Nummernkreise
// ==========================================
// Aufträge      A{JJJJ}-NNN
// Packlisten    PL-{JJJJ}-{NNNN}
// Lieferscheine LS-{JJJJ}-{NNNN}
// Versand       VS{JJJJ}-{NNNN}
// Postbuch      POST-{JJJJ}-{NNNNNN}
// Regel: neue Nummer = Maximum des Jahres + 1,
// Start bei 001 bzw. 0001.
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// Nummernkreis-Verwaltung
pub struct NumberSequences {
    conn: Arc<Mutex<Connection>>,
}

impl NumberSequences {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Maximaler numerischer Suffix aller Nummern mit Präfix in einer Spalte
    fn max_suffix(&self, table: &str, column: &str, prefix: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let pattern = format!("{}%", prefix);
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} LIKE ?1",
            column, table, column
        ))?;
        let numbers = stmt
            .query_map(params![pattern], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        let max = numbers
            .iter()
            .filter_map(|n| n.strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Ok(max)
    }

    /// Nächste Auftrags-ID, z.B. "A2025-001"
    pub fn next_order_id(&self, year: i32) -> RepositoryResult<String> {
        let prefix = format!("A{}-", year);
        let next = self.max_suffix("orders", "id", &prefix)? + 1;
        Ok(format!("{}{:03}", prefix, next))
    }

    /// Nächste Packlisten-Nummer, z.B. "PL-2025-0001"
    pub fn next_packing_list_number(&self, year: i32) -> RepositoryResult<String> {
        let prefix = format!("PL-{}-", year);
        let next = self.max_suffix("packing_lists", "packing_list_number", &prefix)? + 1;
        Ok(format!("{}{:04}", prefix, next))
    }

    /// Nächste Lieferschein-Nummer, z.B. "LS-2025-0001"
    pub fn next_delivery_note_number(&self, year: i32) -> RepositoryResult<String> {
        let prefix = format!("LS-{}-", year);
        let next = self.max_suffix("delivery_notes", "delivery_note_number", &prefix)? + 1;
        Ok(format!("{}{:04}", prefix, next))
    }

    /// Nächste Versand-ID, z.B. "VS2025-0001"
    pub fn next_shipment_id(&self, year: i32) -> RepositoryResult<String> {
        let prefix = format!("VS{}-", year);
        let next = self.max_suffix("shipments", "id", &prefix)? + 1;
        Ok(format!("{}{:04}", prefix, next))
    }

    /// Nächste Postbuch-Nummer, z.B. "POST-2025-000001"
    pub fn next_post_entry_number(&self, year: i32) -> RepositoryResult<String> {
        let prefix = format!("POST-{}-", year);
        let next = self.max_suffix("post_entries", "entry_number", &prefix)? + 1;
        Ok(format!("{}{:06}", prefix, next))
    }
}
