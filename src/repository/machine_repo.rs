// ==========================================
// StitchAdmin - Maschinen-Repository
// ==========================================
// Verwaltung der machines-Tabelle.
// Löschen nur ohne aktive Aufträge.
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::types::{MachineStatus, MachineType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_datetime, opt_date, opt_datetime, parse_datetime};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const MACHINE_COLUMNS: &str = "id, name, machine_type, manufacturer, model, serial_number, \
     num_heads, needles_per_head, max_speed, max_area_width_mm, max_area_height_mm, \
     setup_time_minutes, thread_change_time_minutes, hoop_change_time_minutes, \
     status, maintenance_due, created_at, created_by, updated_at, updated_by";

/// Maschinen-Repository
pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Machine> {
        Ok(Machine {
            id: row.get(0)?,
            name: row.get(1)?,
            machine_type: MachineType::parse(&row.get::<_, String>(2)?)
                .unwrap_or(MachineType::Embroidery),
            manufacturer: row.get(3)?,
            model: row.get(4)?,
            serial_number: row.get(5)?,
            num_heads: row.get(6)?,
            needles_per_head: row.get(7)?,
            max_speed: row.get(8)?,
            max_area_width_mm: row.get(9)?,
            max_area_height_mm: row.get(10)?,
            setup_time_minutes: row.get(11)?,
            thread_change_time_minutes: row.get(12)?,
            hoop_change_time_minutes: row.get(13)?,
            status: MachineStatus::parse(&row.get::<_, String>(14)?)
                .unwrap_or(MachineStatus::Off),
            maintenance_due: opt_date(row.get(15)?),
            created_at: parse_datetime(&row.get::<_, String>(16)?),
            created_by: row.get(17)?,
            updated_at: opt_datetime(row.get(18)?),
            updated_by: row.get(19)?,
        })
    }

    /// Legt eine Maschine an
    pub fn insert(&self, machine: &Machine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machines (
                id, name, machine_type, manufacturer, model, serial_number,
                num_heads, needles_per_head, max_speed, max_area_width_mm, max_area_height_mm,
                setup_time_minutes, thread_change_time_minutes, hoop_change_time_minutes,
                status, maintenance_due, created_at, created_by, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                      ?17, ?18, ?19, ?20)
            "#,
            params![
                machine.id,
                machine.name,
                machine.machine_type.as_str(),
                machine.manufacturer,
                machine.model,
                machine.serial_number,
                machine.num_heads,
                machine.needles_per_head,
                machine.max_speed,
                machine.max_area_width_mm,
                machine.max_area_height_mm,
                machine.setup_time_minutes,
                machine.thread_change_time_minutes,
                machine.hoop_change_time_minutes,
                machine.status.as_str(),
                machine.maintenance_due.as_ref().map(fmt_date),
                fmt_datetime(&machine.created_at),
                machine.created_by,
                machine.updated_at.as_ref().map(fmt_datetime),
                machine.updated_by,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM machines WHERE id = ?1",
            MACHINE_COLUMNS
        ))?;
        let machine = stmt.query_row(params![id], Self::map_row).optional()?;
        Ok(machine)
    }

    pub fn get(&self, id: &str) -> RepositoryResult<Machine> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Maschine".to_string(),
            id: id.to_string(),
        })
    }

    /// Alle Maschinen
    pub fn list_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM machines ORDER BY name",
            MACHINE_COLUMNS
        ))?;
        let machines = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<Machine>>>()?;
        Ok(machines)
    }

    /// Aktive Maschinen der angegebenen Typen
    pub fn list_active_by_types(&self, types: &[MachineType]) -> RepositoryResult<Vec<Machine>> {
        let all = self.list_all()?;
        Ok(all
            .into_iter()
            .filter(|m| m.status == MachineStatus::Active && types.contains(&m.machine_type))
            .collect())
    }

    /// Setzt den Maschinenstatus
    pub fn set_status(&self, machine_id: &str, status: MachineStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE machines SET status = ?2 WHERE id = ?1",
            params![machine_id, status.as_str()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Maschine".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }

    /// Setzt den nächsten Wartungstermin
    pub fn set_maintenance_due(
        &self,
        machine_id: &str,
        due: Option<NaiveDate>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE machines SET maintenance_due = ?2 WHERE id = ?1",
            params![machine_id, due.as_ref().map(fmt_date)],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Maschine".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }

    /// Anzahl aktiver Aufträge (accepted/in_progress) auf einer Maschine
    pub fn count_active_orders(&self, machine_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM orders \
             WHERE assigned_machine_id = ?1 AND status IN ('accepted', 'in_progress')",
            params![machine_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// ID des Auftrags, der auf der Maschine in Produktion ist (falls vorhanden)
    pub fn find_in_progress_order(&self, machine_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let order_id = conn
            .query_row(
                "SELECT id FROM orders \
                 WHERE assigned_machine_id = ?1 AND status = 'in_progress' LIMIT 1",
                params![machine_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(order_id)
    }

    /// Löscht eine Maschine; nur ohne aktive Aufträge zulässig
    pub fn delete(&self, machine_id: &str) -> RepositoryResult<()> {
        if self.count_active_orders(machine_id)? > 0 {
            return Err(RepositoryError::ValidationError(format!(
                "Maschine {} hat aktive Aufträge und kann nicht gelöscht werden",
                machine_id
            )));
        }
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM machines WHERE id = ?1", params![machine_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Maschine".to_string(),
                id: machine_id.to_string(),
            });
        }
        Ok(())
    }
}
