// ==========================================
// StitchAdmin - Garn-Repository
// ==========================================
// Katalog (threads), Bestand (thread_stock) und
// Verbrauchsjournal (thread_usage).
// Regel: thread_usage wird nie geändert oder
// gelöscht; der Bestand ist eine Projektion.
// ==========================================

use crate::domain::thread::{Thread, ThreadStock, ThreadUsage};
use crate::domain::types::UsageType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_datetime, opt_datetime, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const THREAD_COLUMNS: &str = "id, manufacturer, color_number, color_name_de, color_name_en, \
     hex_color, rgb_r, rgb_g, rgb_b, weight, material, price, active, created_at, updated_at";

const STOCK_COLUMNS: &str = "id, thread_id, quantity_m, min_stock_m, location, updated_at";

const USAGE_COLUMNS: &str = "id, thread_id, order_id, machine_id, quantity_m, usage_type, \
     used_at, recorded_by, notes";

/// Garn-Repository
pub struct ThreadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ThreadRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_thread(row: &Row<'_>) -> SqliteResult<Thread> {
        Ok(Thread {
            id: row.get(0)?,
            manufacturer: row.get(1)?,
            color_number: row.get(2)?,
            color_name_de: row.get(3)?,
            color_name_en: row.get(4)?,
            hex_color: row.get(5)?,
            rgb_r: row.get(6)?,
            rgb_g: row.get(7)?,
            rgb_b: row.get(8)?,
            weight: row.get(9)?,
            material: row.get(10)?,
            price: row.get(11)?,
            active: row.get::<_, i64>(12)? != 0,
            created_at: parse_datetime(&row.get::<_, String>(13)?),
            updated_at: opt_datetime(row.get(14)?),
        })
    }

    fn map_stock(row: &Row<'_>) -> SqliteResult<ThreadStock> {
        Ok(ThreadStock {
            id: row.get(0)?,
            thread_id: row.get(1)?,
            quantity_m: row.get(2)?,
            min_stock_m: row.get(3)?,
            location: row.get(4)?,
            updated_at: opt_datetime(row.get(5)?),
        })
    }

    fn map_usage(row: &Row<'_>) -> SqliteResult<ThreadUsage> {
        Ok(ThreadUsage {
            id: row.get(0)?,
            thread_id: row.get(1)?,
            order_id: row.get(2)?,
            machine_id: row.get(3)?,
            quantity_m: row.get(4)?,
            usage_type: UsageType::parse(&row.get::<_, String>(5)?)
                .unwrap_or(UsageType::Production),
            used_at: parse_datetime(&row.get::<_, String>(6)?),
            recorded_by: row.get(7)?,
            notes: row.get(8)?,
        })
    }

    // ==========================================
    // Katalog
    // ==========================================

    /// Legt ein Garn an (inkl. leerem Bestandssatz)
    pub fn insert(&self, thread: &Thread) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO threads (
                id, manufacturer, color_number, color_name_de, color_name_en,
                hex_color, rgb_r, rgb_g, rgb_b, weight, material, price, active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                thread.id,
                thread.manufacturer,
                thread.color_number,
                thread.color_name_de,
                thread.color_name_en,
                thread.hex_color,
                thread.rgb_r,
                thread.rgb_g,
                thread.rgb_b,
                thread.weight,
                thread.material,
                thread.price,
                thread.active as i64,
                fmt_datetime(&thread.created_at),
                thread.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        conn.execute(
            "INSERT INTO thread_stock (thread_id, quantity_m, min_stock_m) VALUES (?1, 0, 0)",
            params![thread.id],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Thread>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM threads WHERE id = ?1",
            THREAD_COLUMNS
        ))?;
        let thread = stmt.query_row(params![id], Self::map_thread).optional()?;
        Ok(thread)
    }

    pub fn get(&self, id: &str) -> RepositoryResult<Thread> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Garn".to_string(),
            id: id.to_string(),
        })
    }

    /// Sucht per Katalogschlüssel (Hersteller, Farbnummer)
    pub fn find_by_catalog_key(
        &self,
        manufacturer: &str,
        color_number: &str,
    ) -> RepositoryResult<Option<Thread>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM threads WHERE manufacturer = ?1 AND color_number = ?2",
            THREAD_COLUMNS
        ))?;
        let thread = stmt
            .query_row(params![manufacturer, color_number], Self::map_thread)
            .optional()?;
        Ok(thread)
    }

    /// Aktualisiert Katalogfelder eines Garns
    pub fn update(&self, thread: &Thread) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE threads SET
                manufacturer = ?2, color_number = ?3, color_name_de = ?4, color_name_en = ?5,
                hex_color = ?6, rgb_r = ?7, rgb_g = ?8, rgb_b = ?9,
                weight = ?10, material = ?11, price = ?12, active = ?13, updated_at = ?14
            WHERE id = ?1
            "#,
            params![
                thread.id,
                thread.manufacturer,
                thread.color_number,
                thread.color_name_de,
                thread.color_name_en,
                thread.hex_color,
                thread.rgb_r,
                thread.rgb_g,
                thread.rgb_b,
                thread.weight,
                thread.material,
                thread.price,
                thread.active as i64,
                thread.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Garn".to_string(),
                id: thread.id.clone(),
            });
        }
        Ok(())
    }

    /// Alle aktiven Garne
    pub fn list_active(&self) -> RepositoryResult<Vec<Thread>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM threads WHERE active = 1 ORDER BY manufacturer, color_number",
            THREAD_COLUMNS
        ))?;
        let threads = stmt
            .query_map([], Self::map_thread)?
            .collect::<SqliteResult<Vec<Thread>>>()?;
        Ok(threads)
    }

    // ==========================================
    // Bestand
    // ==========================================

    pub fn find_stock(&self, thread_id: &str) -> RepositoryResult<Option<ThreadStock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM thread_stock WHERE thread_id = ?1",
            STOCK_COLUMNS
        ))?;
        let stock = stmt
            .query_row(params![thread_id], Self::map_stock)
            .optional()?;
        Ok(stock)
    }

    pub fn get_stock(&self, thread_id: &str) -> RepositoryResult<ThreadStock> {
        self.find_stock(thread_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Garnbestand".to_string(),
                id: thread_id.to_string(),
            })
    }

    /// Setzt Bestand, Mindestbestand und Lagerort
    pub fn set_stock(
        &self,
        thread_id: &str,
        quantity_m: f64,
        min_stock_m: f64,
        location: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE thread_stock
            SET quantity_m = ?2, min_stock_m = ?3, location = ?4, updated_at = datetime('now')
            WHERE thread_id = ?1
            "#,
            params![thread_id, quantity_m, min_stock_m, location],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Garnbestand".to_string(),
                id: thread_id.to_string(),
            });
        }
        Ok(())
    }

    /// Garne mit Bestand <= Mindestbestand (mit Bestandssatz)
    pub fn list_low_stock(&self) -> RepositoryResult<Vec<(Thread, ThreadStock)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.manufacturer, t.color_number, t.color_name_de, t.color_name_en,
                   t.hex_color, t.rgb_r, t.rgb_g, t.rgb_b, t.weight, t.material, t.price,
                   t.active, t.created_at, t.updated_at,
                   s.id, s.thread_id, s.quantity_m, s.min_stock_m, s.location, s.updated_at
            FROM threads t
            JOIN thread_stock s ON s.thread_id = t.id
            WHERE t.active = 1 AND s.quantity_m <= s.min_stock_m
            ORDER BY s.quantity_m - s.min_stock_m
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                let thread = Self::map_thread(row)?;
                let stock = ThreadStock {
                    id: row.get(15)?,
                    thread_id: row.get(16)?,
                    quantity_m: row.get(17)?,
                    min_stock_m: row.get(18)?,
                    location: row.get(19)?,
                    updated_at: opt_datetime(row.get(20)?),
                };
                Ok((thread, stock))
            })?
            .collect::<SqliteResult<Vec<(Thread, ThreadStock)>>>()?;
        Ok(rows)
    }

    // ==========================================
    // Verbrauchsjournal
    // ==========================================

    /// Hängt einen Verbrauchseintrag an und bucht den Bestand ab
    /// (saturierend bei 0) - beides in EINER Transaktion.
    ///
    /// Unbekanntes Garn ist ein harter Fehler.
    pub fn append_usage(&self, usage: &ThreadUsage) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM threads WHERE id = ?1",
                params![usage.thread_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(RepositoryError::NotFound {
                entity: "Garn".to_string(),
                id: usage.thread_id.clone(),
            });
        }

        conn.execute("BEGIN TRANSACTION", [])?;

        let result = (|| -> RepositoryResult<i64> {
            conn.execute(
                r#"
                INSERT INTO thread_usage (
                    thread_id, order_id, machine_id, quantity_m, usage_type,
                    used_at, recorded_by, notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    usage.thread_id,
                    usage.order_id,
                    usage.machine_id,
                    usage.quantity_m,
                    usage.usage_type.as_str(),
                    fmt_datetime(&usage.used_at),
                    usage.recorded_by,
                    usage.notes,
                ],
            )?;
            let usage_id = conn.last_insert_rowid();

            // Bestandsprojektion fortschreiben, saturiert bei 0
            conn.execute(
                r#"
                UPDATE thread_stock
                SET quantity_m = MAX(0, quantity_m - ?2), updated_at = datetime('now')
                WHERE thread_id = ?1
                "#,
                params![usage.thread_id, usage.quantity_m],
            )?;

            Ok(usage_id)
        })();

        match result {
            Ok(id) => {
                conn.execute("COMMIT", [])?;
                Ok(id)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    /// Verbrauchseinträge eines Auftrags
    pub fn list_usage_for_order(&self, order_id: &str) -> RepositoryResult<Vec<ThreadUsage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM thread_usage WHERE order_id = ?1 ORDER BY used_at, id",
            USAGE_COLUMNS
        ))?;
        let usages = stmt
            .query_map(params![order_id], Self::map_usage)?
            .collect::<SqliteResult<Vec<ThreadUsage>>>()?;
        Ok(usages)
    }

    /// Verbrauchseinträge eines Garns
    pub fn list_usage_for_thread(&self, thread_id: &str) -> RepositoryResult<Vec<ThreadUsage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM thread_usage WHERE thread_id = ?1 ORDER BY used_at, id",
            USAGE_COLUMNS
        ))?;
        let usages = stmt
            .query_map(params![thread_id], Self::map_usage)?
            .collect::<SqliteResult<Vec<ThreadUsage>>>()?;
        Ok(usages)
    }

    /// Summe des verbuchten Verbrauchs eines Garns (Audit:
    /// Anfangsbestand - Summe = erwarteter Bestand)
    pub fn total_usage(&self, thread_id: &str) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(quantity_m), 0) FROM thread_usage WHERE thread_id = ?1",
            params![thread_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}
