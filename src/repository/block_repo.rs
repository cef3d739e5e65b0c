// ==========================================
// StitchAdmin - Kalenderblock-Repository
// ==========================================
// schedule_blocks: Produktionsslots und
// CRM-Aktivitäten. Löschen nur weich
// (is_active = 0).
// ==========================================

use crate::domain::calendar::ScheduleBlock;
use crate::domain::types::{BlockType, Priority};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{
    fmt_date, fmt_datetime, fmt_time, opt_date, opt_datetime, parse_date, parse_datetime,
    parse_time,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const BLOCK_COLUMNS: &str = "id, block_type, title, start_date, start_time, end_date, end_time, \
     machine_id, order_id, customer_id, contact_person, summary, content, outcome, \
     follow_up_date, follow_up_notes, priority, is_active, notes, created_at, created_by, \
     updated_at, updated_by";

/// Kalenderblock-Repository
pub struct ScheduleBlockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleBlockRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_block(row: &Row<'_>) -> SqliteResult<ScheduleBlock> {
        Ok(ScheduleBlock {
            id: row.get(0)?,
            block_type: BlockType::parse(&row.get::<_, String>(1)?).unwrap_or(BlockType::Other),
            title: row.get(2)?,
            start_date: parse_date(&row.get::<_, String>(3)?),
            start_time: parse_time(&row.get::<_, String>(4)?),
            end_date: parse_date(&row.get::<_, String>(5)?),
            end_time: parse_time(&row.get::<_, String>(6)?),
            machine_id: row.get(7)?,
            order_id: row.get(8)?,
            customer_id: row.get(9)?,
            contact_person: row.get(10)?,
            summary: row.get(11)?,
            content: row.get(12)?,
            outcome: row.get(13)?,
            follow_up_date: opt_date(row.get(14)?),
            follow_up_notes: row.get(15)?,
            priority: Priority::parse(&row.get::<_, String>(16)?).unwrap_or(Priority::Normal),
            is_active: row.get::<_, i64>(17)? != 0,
            notes: row.get(18)?,
            created_at: parse_datetime(&row.get::<_, String>(19)?),
            created_by: row.get(20)?,
            updated_at: opt_datetime(row.get(21)?),
            updated_by: row.get(22)?,
        })
    }

    /// Legt einen Block an
    pub fn insert(&self, block: &ScheduleBlock) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO schedule_blocks (
                id, block_type, title, start_date, start_time, end_date, end_time,
                machine_id, order_id, customer_id, contact_person, summary, content,
                outcome, follow_up_date, follow_up_notes, priority, is_active, notes,
                created_at, created_by, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)
            "#,
            params![
                block.id,
                block.block_type.as_str(),
                block.title,
                fmt_date(&block.start_date),
                fmt_time(&block.start_time),
                fmt_date(&block.end_date),
                fmt_time(&block.end_time),
                block.machine_id,
                block.order_id,
                block.customer_id,
                block.contact_person,
                block.summary,
                block.content,
                block.outcome,
                block.follow_up_date.as_ref().map(fmt_date),
                block.follow_up_notes,
                block.priority.as_str(),
                block.is_active as i64,
                block.notes,
                fmt_datetime(&block.created_at),
                block.created_by,
                block.updated_at.as_ref().map(fmt_datetime),
                block.updated_by,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<ScheduleBlock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_blocks WHERE id = ?1",
            BLOCK_COLUMNS
        ))?;
        let block = stmt.query_row(params![id], Self::map_block).optional()?;
        Ok(block)
    }

    pub fn get(&self, id: &str) -> RepositoryResult<ScheduleBlock> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Kalenderblock".to_string(),
            id: id.to_string(),
        })
    }

    /// Schreibt die veränderlichen Felder zurück
    pub fn update(&self, block: &ScheduleBlock) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE schedule_blocks SET
                block_type = ?2, title = ?3, start_date = ?4, start_time = ?5,
                end_date = ?6, end_time = ?7, machine_id = ?8, order_id = ?9,
                customer_id = ?10, contact_person = ?11, summary = ?12, content = ?13,
                outcome = ?14, follow_up_date = ?15, follow_up_notes = ?16, priority = ?17,
                is_active = ?18, notes = ?19, updated_at = ?20, updated_by = ?21
            WHERE id = ?1
            "#,
            params![
                block.id,
                block.block_type.as_str(),
                block.title,
                fmt_date(&block.start_date),
                fmt_time(&block.start_time),
                fmt_date(&block.end_date),
                fmt_time(&block.end_time),
                block.machine_id,
                block.order_id,
                block.customer_id,
                block.contact_person,
                block.summary,
                block.content,
                block.outcome,
                block.follow_up_date.as_ref().map(fmt_date),
                block.follow_up_notes,
                block.priority.as_str(),
                block.is_active as i64,
                block.notes,
                block.updated_at.as_ref().map(fmt_datetime),
                block.updated_by,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Kalenderblock".to_string(),
                id: block.id.clone(),
            });
        }
        Ok(())
    }

    /// Weiches Löschen (is_active = 0)
    pub fn deactivate(&self, block_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE schedule_blocks SET is_active = 0 WHERE id = ?1",
            params![block_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Kalenderblock".to_string(),
                id: block_id.to_string(),
            });
        }
        Ok(())
    }

    /// Deaktiviert alle aktiven Blöcke eines Auftrags
    /// (bei Stornierung), liefert die Anzahl
    pub fn deactivate_for_order(&self, order_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE schedule_blocks SET is_active = 0 WHERE order_id = ?1 AND is_active = 1",
            params![order_id],
        )?;
        Ok(affected)
    }

    /// Aktive Blöcke einer Maschine, die einen Datumsbereich berühren
    pub fn list_active_for_machine(
        &self,
        machine_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleBlock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_blocks \
             WHERE machine_id = ?1 AND is_active = 1 \
               AND start_date <= ?3 AND end_date >= ?2 \
             ORDER BY start_date, start_time",
            BLOCK_COLUMNS
        ))?;
        let blocks = stmt
            .query_map(
                params![machine_id, fmt_date(&start_date), fmt_date(&end_date)],
                Self::map_block,
            )?
            .collect::<SqliteResult<Vec<ScheduleBlock>>>()?;
        Ok(blocks)
    }

    /// Aktive Blöcke einer Maschine, die das Intervall [start, end) überlappen;
    /// exclude_id blendet den zu verschiebenden Block selbst aus.
    pub fn find_conflicting(
        &self,
        machine_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_id: Option<&str>,
    ) -> RepositoryResult<Vec<ScheduleBlock>> {
        let candidates =
            self.list_active_for_machine(machine_id, start.date(), end.date())?;
        Ok(candidates
            .into_iter()
            .filter(|b| b.overlaps(start, end))
            .filter(|b| exclude_id.map(|id| b.id != id).unwrap_or(true))
            .collect())
    }

    /// Alle aktiven Blöcke in einem Datumsbereich (Kalenderansicht)
    pub fn list_for_date_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        block_types: Option<&[BlockType]>,
    ) -> RepositoryResult<Vec<ScheduleBlock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_blocks \
             WHERE is_active = 1 AND start_date <= ?2 AND end_date >= ?1 \
             ORDER BY start_date, start_time",
            BLOCK_COLUMNS
        ))?;
        let blocks = stmt
            .query_map(
                params![fmt_date(&start_date), fmt_date(&end_date)],
                Self::map_block,
            )?
            .collect::<SqliteResult<Vec<ScheduleBlock>>>()?;

        Ok(match block_types {
            Some(types) => blocks
                .into_iter()
                .filter(|b| types.contains(&b.block_type))
                .collect(),
            None => blocks,
        })
    }

    /// CRM-Aktivitäten eines Kunden, neueste zuerst
    pub fn list_customer_activities(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<ScheduleBlock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_blocks \
             WHERE customer_id = ?1 AND is_active = 1 \
             ORDER BY start_date DESC, start_time DESC LIMIT ?2",
            BLOCK_COLUMNS
        ))?;
        let blocks = stmt
            .query_map(params![customer_id, limit as i64], Self::map_block)?
            .collect::<SqliteResult<Vec<ScheduleBlock>>>()?;
        Ok(blocks.into_iter().filter(|b| b.block_type.is_crm()).collect())
    }

    /// Fällige Wiedervorlagen (follow_up_date <= today)
    pub fn list_pending_follow_ups(
        &self,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleBlock>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_blocks \
             WHERE is_active = 1 AND follow_up_date IS NOT NULL AND follow_up_date <= ?1 \
             ORDER BY follow_up_date",
            BLOCK_COLUMNS
        ))?;
        let blocks = stmt
            .query_map(params![fmt_date(&today)], Self::map_block)?
            .collect::<SqliteResult<Vec<ScheduleBlock>>>()?;
        Ok(blocks)
    }

    /// Volltextsuche über title, summary, content, contact_person, notes
    /// (Teilstring, case-insensitive), neueste zuerst
    pub fn search(&self, term: &str, limit: usize) -> RepositoryResult<Vec<ScheduleBlock>> {
        let pattern = format!("%{}%", term.to_lowercase());
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM schedule_blocks \
             WHERE is_active = 1 AND ( \
                LOWER(COALESCE(title, '')) LIKE ?1 OR \
                LOWER(COALESCE(summary, '')) LIKE ?1 OR \
                LOWER(COALESCE(content, '')) LIKE ?1 OR \
                LOWER(COALESCE(contact_person, '')) LIKE ?1 OR \
                LOWER(COALESCE(notes, '')) LIKE ?1 ) \
             ORDER BY start_date DESC, start_time DESC LIMIT ?2",
            BLOCK_COLUMNS
        ))?;
        let blocks = stmt
            .query_map(params![pattern, limit as i64], Self::map_block)?
            .collect::<SqliteResult<Vec<ScheduleBlock>>>()?;
        Ok(blocks)
    }
}
