// ==========================================
// StitchAdmin - Maschinen-Domänenmodell
// ==========================================
// Stick-, Druck- und DTF-Maschinen inkl.
// Kopf-/Nadelaufbau und Rüstzeiten
// ==========================================

use crate::domain::types::{MachineStatus, MachineType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Produktionsmaschine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub name: String,
    pub machine_type: MachineType,

    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,

    // Stickmaschinen-Aufbau
    pub num_heads: i64,
    pub needles_per_head: i64,
    pub max_speed: i64,
    pub max_area_width_mm: Option<i64>,
    pub max_area_height_mm: Option<i64>,

    // Rüst-/Wechselzeiten
    pub setup_time_minutes: i64,
    pub thread_change_time_minutes: i64,
    pub hoop_change_time_minutes: i64,

    pub status: MachineStatus,
    pub maintenance_due: Option<NaiveDate>,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
}

/// Wartungszustand für die Anzeige
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceState {
    Overdue,   // Überfällig
    DueSoon,   // Innerhalb von 7 Tagen fällig
    Ok,        // Fällig, aber nicht zeitnah
    Unplanned, // Keine Wartung geplant
}

impl Machine {
    /// Einsatzbereit für neue Produktionsaufträge
    pub fn is_available(&self) -> bool {
        self.status == MachineStatus::Active
    }

    /// Passt eine Designfläche (mm) auf diese Maschine?
    pub fn fits_design(&self, width_mm: f64, height_mm: f64) -> bool {
        let width_ok = self
            .max_area_width_mm
            .map(|max| width_mm <= max as f64)
            .unwrap_or(true);
        let height_ok = self
            .max_area_height_mm
            .map(|max| height_mm <= max as f64)
            .unwrap_or(true);
        width_ok && height_ok
    }

    /// Wartungszustand relativ zu `today`
    pub fn maintenance_state(&self, today: NaiveDate) -> MaintenanceState {
        match self.maintenance_due {
            None => MaintenanceState::Unplanned,
            Some(due) => {
                let days = (due - today).num_days();
                if days < 0 {
                    MaintenanceState::Overdue
                } else if days <= 7 {
                    MaintenanceState::DueSoon
                } else {
                    MaintenanceState::Ok
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Machine {
        Machine {
            id: "M001".to_string(),
            name: "Tajima 1".to_string(),
            machine_type: MachineType::Embroidery,
            manufacturer: Some("Tajima".to_string()),
            model: None,
            serial_number: None,
            num_heads: 6,
            needles_per_head: 15,
            max_speed: 1000,
            max_area_width_mm: Some(400),
            max_area_height_mm: Some(400),
            setup_time_minutes: 15,
            thread_change_time_minutes: 3,
            hoop_change_time_minutes: 5,
            status: MachineStatus::Active,
            maintenance_due: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            created_by: None,
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn test_fits_design() {
        let m = machine();
        assert!(m.fits_design(380.0, 200.0));
        assert!(!m.fits_design(420.0, 200.0));
    }

    #[test]
    fn test_maintenance_state() {
        let m = machine();
        assert_eq!(
            m.maintenance_state(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()),
            MaintenanceState::Overdue
        );
        assert_eq!(
            m.maintenance_state(NaiveDate::from_ymd_opt(2025, 5, 28).unwrap()),
            MaintenanceState::DueSoon
        );
        assert_eq!(
            m.maintenance_state(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            MaintenanceState::Ok
        );
    }
}
