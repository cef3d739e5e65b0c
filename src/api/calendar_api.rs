// ==========================================
// StitchAdmin - Kalender-API
// ==========================================
// Zeitblöcke (Produktion + CRM) auf einer
// gemeinsamen Zeitachse: Wochenansicht mit
// Tagessegmenten, Volltextsuche, Wiedervorlagen.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_valid_interval;
use crate::config::SettingsReader;
use crate::domain::calendar::{BlockSegment, ScheduleBlock};
use crate::domain::clock::Clock;
use crate::domain::types::{BlockType, Priority};
use crate::repository::ScheduleBlockRepository;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Neuer Kalenderblock
#[derive(Debug, Clone)]
pub struct NewBlock {
    pub block_type: BlockType,
    pub title: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub machine_id: Option<String>,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub contact_person: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub outcome: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub priority: Priority,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Ein Tag der Wochenansicht
#[derive(Debug, Clone)]
pub struct DayView {
    pub date: NaiveDate,
    pub segments: Vec<(ScheduleBlock, BlockSegment)>,
}

/// Kalender-API
pub struct CalendarApi<S: SettingsReader> {
    blocks: ScheduleBlockRepository,
    settings: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: SettingsReader> CalendarApi<S> {
    pub fn new(conn: Arc<Mutex<Connection>>, settings: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            blocks: ScheduleBlockRepository::from_connection(conn),
            settings,
            clock,
        }
    }

    /// Legt einen Block an
    ///
    /// Produktionsblöcke brauchen eine Maschine.
    pub fn create_block(&self, new: NewBlock) -> ApiResult<ScheduleBlock> {
        require_valid_interval(new.start, new.end)?;
        if new.block_type == BlockType::Production && new.machine_id.is_none() {
            return Err(ApiError::InvalidInput(
                "Produktionsblöcke benötigen eine Maschine".to_string(),
            ));
        }

        let block = ScheduleBlock {
            id: Uuid::new_v4().to_string(),
            block_type: new.block_type,
            title: new.title,
            start_date: new.start.date(),
            start_time: new.start.time(),
            end_date: new.end.date(),
            end_time: new.end.time(),
            machine_id: new.machine_id,
            order_id: new.order_id,
            customer_id: new.customer_id,
            contact_person: new.contact_person,
            summary: new.summary,
            content: new.content,
            outcome: new.outcome,
            follow_up_date: new.follow_up_date,
            follow_up_notes: None,
            priority: new.priority,
            is_active: true,
            notes: new.notes,
            created_at: self.clock.now(),
            created_by: new.created_by,
            updated_at: None,
            updated_by: None,
        };
        self.blocks.insert(&block)?;
        Ok(block)
    }

    /// Weiches Löschen eines Blocks
    pub fn deactivate_block(&self, block_id: &str) -> ApiResult<()> {
        Ok(self.blocks.deactivate(block_id)?)
    }

    /// Wochenansicht: Blöcke in Tagessegmente zerlegt,
    /// geklappt auf das Arbeitszeitfenster der Einstellungen
    pub async fn week_view(&self, week_start: NaiveDate) -> ApiResult<Vec<DayView>> {
        let settings = self
            .settings
            .get_settings()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let week_end = week_start + Duration::days(6);
        let blocks = self.blocks.list_for_date_range(week_start, week_end, None)?;

        let mut by_date: HashMap<NaiveDate, Vec<(ScheduleBlock, BlockSegment)>> = HashMap::new();
        for block in blocks {
            for segment in block.segments_for_week(
                week_start,
                week_end,
                settings.work_start,
                settings.work_end,
            ) {
                by_date
                    .entry(segment.date)
                    .or_default()
                    .push((block.clone(), segment));
            }
        }

        let mut days = Vec::with_capacity(7);
        for offset in 0..7 {
            let date = week_start + Duration::days(offset);
            let mut segments = by_date.remove(&date).unwrap_or_default();
            segments.sort_by_key(|(_, segment)| segment.start_time);
            days.push(DayView { date, segments });
        }
        Ok(days)
    }

    /// Volltextsuche über CRM- und Produktionsblöcke
    pub fn search(&self, term: &str, limit: usize) -> ApiResult<Vec<ScheduleBlock>> {
        if term.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Suchbegriff darf nicht leer sein".to_string(),
            ));
        }
        Ok(self.blocks.search(term, limit)?)
    }

    /// CRM-Aktivitäten eines Kunden, neueste zuerst
    pub fn customer_activities(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> ApiResult<Vec<ScheduleBlock>> {
        Ok(self.blocks.list_customer_activities(customer_id, limit)?)
    }

    /// Fällige Wiedervorlagen
    pub fn pending_follow_ups(&self) -> ApiResult<Vec<ScheduleBlock>> {
        Ok(self.blocks.list_pending_follow_ups(self.clock.today())?)
    }

    /// Blockstatistik eines Zeitraums (Anzahl und Minuten je Typ)
    pub fn statistics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ApiResult<HashMap<BlockType, (usize, i64)>> {
        let blocks = self.blocks.list_for_date_range(start_date, end_date, None)?;
        let mut stats: HashMap<BlockType, (usize, i64)> = HashMap::new();
        for block in blocks {
            let entry = stats.entry(block.block_type).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += block.duration_minutes();
        }
        Ok(stats)
    }
}
