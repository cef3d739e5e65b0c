// ==========================================
// StitchAdmin - Kalenderblock-Domänenmodell
// ==========================================
// Universeller Zeitblock: Produktionsslots und
// CRM-Aktivitäten liegen auf derselben Zeitachse.
// Mehrtägige Blöcke sind EIN Datensatz
// (start_date/start_time, end_date/end_time).
// ==========================================

use crate::domain::types::{BlockType, Priority};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Kalenderblock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub id: String,
    pub block_type: BlockType,
    pub title: Option<String>,

    // Zeitraum (Ende kann an einem anderen Tag liegen)
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,

    // Verknüpfungen
    pub machine_id: Option<String>,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,

    // CRM-Felder
    pub contact_person: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub outcome: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_notes: Option<String>,
    pub priority: Priority,

    // Soft-Delete
    pub is_active: bool,

    pub notes: Option<String>,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
}

/// Tagessegment eines Blocks für die Wochenansicht
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSegment {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_start: bool,
    pub is_end: bool,
    pub is_continuation: bool,
}

impl ScheduleBlock {
    /// Startzeitpunkt als DateTime
    pub fn start(&self) -> NaiveDateTime {
        self.start_date.and_time(self.start_time)
    }

    /// Endzeitpunkt als DateTime
    pub fn end(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end_time)
    }

    /// Mehrtägiger Block?
    pub fn is_multiday(&self) -> bool {
        self.start_date != self.end_date
    }

    /// Gesamtdauer in Minuten
    pub fn duration_minutes(&self) -> i64 {
        (self.end() - self.start()).num_minutes()
    }

    /// Überlappt dieser Block das halboffene Intervall [other_start, other_end)?
    ///
    /// Regel: [a1,a2) und [b1,b2) überlappen gdw. a1 < b2 und b1 < a2.
    pub fn overlaps(&self, other_start: NaiveDateTime, other_end: NaiveDateTime) -> bool {
        self.start() < other_end && other_start < self.end()
    }

    /// Fällige Wiedervorlage relativ zu `today`?
    pub fn needs_follow_up(&self, today: NaiveDate) -> bool {
        self.follow_up_date
            .map(|date| date <= today)
            .unwrap_or(false)
    }

    /// Teilt den Block in Tagessegmente für die Wochenansicht auf
    ///
    /// Fortsetzungstage werden auf das Arbeitszeitfenster
    /// work_start..work_end (volle Stunden) geklappt.
    pub fn segments_for_week(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
        work_start_hour: u32,
        work_end_hour: u32,
    ) -> Vec<BlockSegment> {
        let mut segments = Vec::new();

        let mut current = self.start_date.max(week_start);
        let last = self.end_date.min(week_end);

        let work_start =
            NaiveTime::from_hms_opt(work_start_hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
        let work_end =
            NaiveTime::from_hms_opt(work_end_hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);

        while current <= last {
            let is_start = current == self.start_date;
            let is_end = current == self.end_date;

            segments.push(BlockSegment {
                date: current,
                start_time: if is_start { self.start_time } else { work_start },
                end_time: if is_end { self.end_time } else { work_end },
                is_start,
                is_end,
                is_continuation: !is_start && !is_end,
            });

            current += Duration::days(1);
        }

        segments
    }
}
