// ==========================================
// StitchAdmin - Maschinen-API
// ==========================================
// Maschinenregister: Anlage, Statuspflege,
// Wartungsübersicht.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_non_empty;
use crate::domain::clock::Clock;
use crate::domain::machine::{Machine, MaintenanceState};
use crate::domain::types::{MachineStatus, MachineType};
use crate::repository::MachineRepository;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Neue Maschine
#[derive(Debug, Clone)]
pub struct NewMachine {
    pub id: String,
    pub name: String,
    pub machine_type: MachineType,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub num_heads: i64,
    pub needles_per_head: i64,
    pub max_area_width_mm: Option<i64>,
    pub max_area_height_mm: Option<i64>,
    pub setup_time_minutes: i64,
    pub maintenance_interval_days: Option<i64>,
    pub created_by: Option<String>,
}

/// Maschinen-API
pub struct MachineApi {
    machines: MachineRepository,
    clock: Arc<dyn Clock>,
}

impl MachineApi {
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            machines: MachineRepository::from_connection(conn),
            clock,
        }
    }

    /// Legt eine Maschine an
    pub fn create_machine(&self, new: NewMachine) -> ApiResult<Machine> {
        require_non_empty(&new.id, "Maschinen-ID")?;
        require_non_empty(&new.name, "Maschinenname")?;

        let now = self.clock.now();
        let maintenance_due = new
            .maintenance_interval_days
            .map(|days| now.date() + Duration::days(days));

        let machine = Machine {
            id: new.id,
            name: new.name,
            machine_type: new.machine_type,
            manufacturer: new.manufacturer,
            model: new.model,
            serial_number: None,
            num_heads: new.num_heads.max(1),
            needles_per_head: new.needles_per_head.max(1),
            max_speed: 1000,
            max_area_width_mm: new.max_area_width_mm,
            max_area_height_mm: new.max_area_height_mm,
            setup_time_minutes: new.setup_time_minutes,
            thread_change_time_minutes: 3,
            hoop_change_time_minutes: 5,
            status: MachineStatus::Active,
            maintenance_due,
            created_at: now,
            created_by: new.created_by,
            updated_at: None,
            updated_by: None,
        };
        self.machines.insert(&machine)?;
        info!(machine_id = %machine.id, name = %machine.name, "Maschine angelegt");
        Ok(machine)
    }

    pub fn get(&self, machine_id: &str) -> ApiResult<Machine> {
        Ok(self.machines.get(machine_id)?)
    }

    pub fn list_all(&self) -> ApiResult<Vec<Machine>> {
        Ok(self.machines.list_all()?)
    }

    /// Setzt den Maschinenstatus (active / maintenance / off)
    pub fn set_status(&self, machine_id: &str, status: MachineStatus) -> ApiResult<()> {
        // Außerbetriebnahme nur ohne laufenden Auftrag
        if status != MachineStatus::Active {
            if let Some(order_id) = self.machines.find_in_progress_order(machine_id)? {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "Maschine {} fertigt gerade Auftrag {}",
                    machine_id, order_id
                )));
            }
        }
        self.machines.set_status(machine_id, status)?;
        Ok(())
    }

    /// Setzt den nächsten Wartungstermin
    pub fn set_maintenance_due(
        &self,
        machine_id: &str,
        due: Option<NaiveDate>,
    ) -> ApiResult<()> {
        Ok(self.machines.set_maintenance_due(machine_id, due)?)
    }

    /// Wartungsübersicht: Maschinen mit Zustand relativ zu heute
    pub fn maintenance_overview(&self) -> ApiResult<Vec<(Machine, MaintenanceState)>> {
        let today = self.clock.today();
        let machines = self.machines.list_all()?;
        Ok(machines
            .into_iter()
            .map(|m| {
                let state = m.maintenance_state(today);
                (m, state)
            })
            .collect())
    }

    /// Löscht eine Maschine (nur ohne aktive Aufträge)
    pub fn delete(&self, machine_id: &str) -> ApiResult<()> {
        Ok(self.machines.delete(machine_id)?)
    }
}
