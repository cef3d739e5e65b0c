// ==========================================
// StitchAdmin - Produktionsplaner (Scheduler)
// ==========================================
// Platziert Produktionsblöcke ohne Überlappung
// auf Maschinen und schlägt freie Maschinen vor.
// Überlappungsregel: [a1,a2) und [b1,b2)
// überlappen gdw. a1 < b2 und b1 < a2.
// Vorschlagsregel: freie (idle) Maschinen werden
// gegenüber belegten, aber unverplanten bevorzugt.
// ==========================================

use crate::domain::calendar::ScheduleBlock;
use crate::domain::clock::Clock;
use crate::domain::machine::Machine;
use crate::domain::order::Order;
use crate::domain::types::{BlockType, MachineStatus, Priority};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::{MachineRepository, ScheduleBlockRepository};
use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Produktionsplaner
pub struct Scheduler {
    machines: MachineRepository,
    blocks: ScheduleBlockRepository,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            machines: MachineRepository::from_connection(conn.clone()),
            blocks: ScheduleBlockRepository::from_connection(conn),
            clock,
        }
    }

    /// Liegt im Intervall [start, end) ein aktiver Block auf der Maschine?
    fn has_conflict(
        &self,
        machine_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_block: Option<&str>,
    ) -> EngineResult<bool> {
        let conflicts = self
            .blocks
            .find_conflicting(machine_id, start, end, exclude_block)?;
        Ok(!conflicts.is_empty())
    }

    /// Schlägt eine passende freie Maschine für einen Auftrag vor
    ///
    /// # Parameter
    /// - order: Auftrag (bestimmt die zulässigen Maschinentypen)
    /// - start: gewünschter Produktionsbeginn
    /// - duration_minutes: geplante Dauer
    ///
    /// # Rückgabe
    /// - Some(Machine): vorgeschlagene Maschine
    /// - None: keine konfliktfreie Maschine gefunden
    pub fn suggest_machine(
        &self,
        order: &Order,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> EngineResult<Option<Machine>> {
        let end = start + Duration::minutes(duration_minutes);
        let machine_types = order.order_type.compatible_machine_types();
        let candidates = self.machines.list_active_by_types(&machine_types)?;

        debug!(
            order_id = %order.id,
            candidates = candidates.len(),
            "Maschinenvorschlag wird ermittelt"
        );

        let mut busy_fallback: Option<Machine> = None;

        for machine in candidates {
            if self.has_conflict(&machine.id, start, end, None)? {
                continue;
            }

            // Freie Maschine (kein laufender Auftrag) gewinnt sofort
            let running = self.machines.find_in_progress_order(&machine.id)?;
            if running.is_none() {
                return Ok(Some(machine));
            }
            if busy_fallback.is_none() {
                busy_fallback = Some(machine);
            }
        }

        Ok(busy_fallback)
    }

    /// Plant einen Produktionsblock atomar ein
    ///
    /// Lehnt mit ScheduleConflict ab, wenn ein aktiver Block
    /// auf der Maschine das Intervall überlappt.
    pub fn schedule(
        &self,
        order: &Order,
        machine_id: &str,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> EngineResult<ScheduleBlock> {
        if duration_minutes <= 0 {
            return Err(EngineError::Validation(
                "Produktionsdauer muss größer als 0 Minuten sein".to_string(),
            ));
        }

        let machine = self.machines.get(machine_id)?;
        if machine.status != MachineStatus::Active {
            return Err(EngineError::Validation(format!(
                "Maschine {} ist nicht einsatzbereit (Status: {})",
                machine.name, machine.status
            )));
        }

        let end = start + Duration::minutes(duration_minutes);
        if self.has_conflict(machine_id, start, end, None)? {
            return Err(EngineError::ScheduleConflict {
                machine_id: machine_id.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let now = self.clock.now();
        let block = ScheduleBlock {
            id: Uuid::new_v4().to_string(),
            block_type: BlockType::Production,
            title: Some(format!("Produktion {}", order.id)),
            start_date: start.date(),
            start_time: start.time(),
            end_date: end.date(),
            end_time: end.time(),
            machine_id: Some(machine_id.to_string()),
            order_id: Some(order.id.clone()),
            customer_id: Some(order.customer_id.clone()),
            contact_person: None,
            summary: order.description.clone(),
            content: None,
            outcome: None,
            follow_up_date: None,
            follow_up_notes: None,
            priority: if order.rush_order {
                Priority::Urgent
            } else {
                Priority::Normal
            },
            is_active: true,
            notes: None,
            created_at: now,
            created_by: None,
            updated_at: None,
            updated_by: None,
        };
        self.blocks.insert(&block)?;

        info!(
            order_id = %order.id,
            machine_id = %machine_id,
            start = %start,
            end = %end,
            "Produktionsblock eingeplant"
        );

        Ok(block)
    }

    /// Verschiebt einen Block auf eine andere Maschine / einen
    /// anderen Start; die Dauer bleibt erhalten.
    pub fn move_block(
        &self,
        block_id: &str,
        new_machine_id: &str,
        new_start: NaiveDateTime,
    ) -> EngineResult<ScheduleBlock> {
        let mut block = self.blocks.get(block_id)?;
        let duration = block.duration_minutes();
        let new_end = new_start + Duration::minutes(duration);

        let machine = self.machines.get(new_machine_id)?;
        if machine.status != MachineStatus::Active {
            return Err(EngineError::Validation(format!(
                "Maschine {} ist nicht einsatzbereit (Status: {})",
                machine.name, machine.status
            )));
        }

        if self.has_conflict(new_machine_id, new_start, new_end, Some(block_id))? {
            return Err(EngineError::ScheduleConflict {
                machine_id: new_machine_id.to_string(),
                start: new_start.to_string(),
                end: new_end.to_string(),
            });
        }

        block.machine_id = Some(new_machine_id.to_string());
        block.start_date = new_start.date();
        block.start_time = new_start.time();
        block.end_date = new_end.date();
        block.end_time = new_end.time();
        block.updated_at = Some(self.clock.now());
        self.blocks.update(&block)?;

        info!(
            block_id = %block_id,
            machine_id = %new_machine_id,
            start = %new_start,
            "Block verschoben"
        );

        Ok(block)
    }
}
