// ==========================================
// StitchAdmin - Werkstatteinstellungen
// ==========================================
// Typisierte Sicht auf die settings_kv-Tabelle.
// Vom Kern konsumierte Schalter:
// - auto_create_packing_list
// - auto_create_delivery_note
// - auto_inventory_booking
// - require_qc_before_packing
// - work_start / work_end (Stunden 0..23)
// - distraction_factor (Multiplikator auf Zeitschätzungen)
// ==========================================

use crate::repository::SettingsRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// Werkstatteinstellungen (Snapshot)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopSettings {
    pub auto_create_packing_list: bool,
    pub auto_create_delivery_note: bool,
    pub auto_inventory_booking: bool,
    pub require_qc_before_packing: bool,
    pub work_start: u32,
    pub work_end: u32,
    pub distraction_factor: f64,
}

impl Default for WorkshopSettings {
    fn default() -> Self {
        Self {
            auto_create_packing_list: true,
            auto_create_delivery_note: true,
            auto_inventory_booking: true,
            require_qc_before_packing: false,
            work_start: 8,
            work_end: 17,
            distraction_factor: 1.0,
        }
    }
}

/// Lesezugriff auf die Einstellungen (für Engines und APIs)
#[async_trait]
pub trait SettingsReader: Send + Sync {
    async fn get_settings(&self) -> Result<WorkshopSettings, Box<dyn Error + Send + Sync>>;
}

/// Einstellungsverwaltung auf der settings_kv-Tabelle
pub struct SettingsManager {
    repo: SettingsRepository,
}

impl SettingsManager {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            repo: SettingsRepository::from_connection(conn),
        }
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        self.repo
            .get_value(key)
            .ok()
            .flatten()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    fn read_u32(&self, key: &str, default: u32) -> u32 {
        self.repo
            .get_value(key)
            .ok()
            .flatten()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn read_f64(&self, key: &str, default: f64) -> f64 {
        self.repo
            .get_value(key)
            .ok()
            .flatten()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Liest den aktuellen Einstellungs-Snapshot
    pub fn load(&self) -> WorkshopSettings {
        let defaults = WorkshopSettings::default();
        WorkshopSettings {
            auto_create_packing_list: self
                .read_bool("auto_create_packing_list", defaults.auto_create_packing_list),
            auto_create_delivery_note: self
                .read_bool("auto_create_delivery_note", defaults.auto_create_delivery_note),
            auto_inventory_booking: self
                .read_bool("auto_inventory_booking", defaults.auto_inventory_booking),
            require_qc_before_packing: self
                .read_bool("require_qc_before_packing", defaults.require_qc_before_packing),
            work_start: self.read_u32("work_start", defaults.work_start).min(23),
            work_end: self.read_u32("work_end", defaults.work_end).min(23),
            distraction_factor: self.read_f64("distraction_factor", defaults.distraction_factor),
        }
    }

    /// Schreibt einen kompletten Snapshot zurück
    pub fn store(&self, settings: &WorkshopSettings) -> Result<(), Box<dyn Error + Send + Sync>> {
        let pairs: Vec<(&str, String)> = vec![
            (
                "auto_create_packing_list",
                (settings.auto_create_packing_list as i64).to_string(),
            ),
            (
                "auto_create_delivery_note",
                (settings.auto_create_delivery_note as i64).to_string(),
            ),
            (
                "auto_inventory_booking",
                (settings.auto_inventory_booking as i64).to_string(),
            ),
            (
                "require_qc_before_packing",
                (settings.require_qc_before_packing as i64).to_string(),
            ),
            ("work_start", settings.work_start.to_string()),
            ("work_end", settings.work_end.to_string()),
            ("distraction_factor", settings.distraction_factor.to_string()),
        ];
        for (key, value) in pairs {
            self.repo
                .set_value(key, &value)
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + Sync>)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsReader for SettingsManager {
    async fn get_settings(&self) -> Result<WorkshopSettings, Box<dyn Error + Send + Sync>> {
        Ok(self.load())
    }
}

/// Feste Einstellungen (Tests, Sonderläufe)
#[derive(Debug, Clone)]
pub struct StaticSettings(pub WorkshopSettings);

#[async_trait]
impl SettingsReader for StaticSettings {
    async fn get_settings(&self) -> Result<WorkshopSettings, Box<dyn Error + Send + Sync>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[tokio::test]
    async fn test_defaults_without_rows() {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let manager = SettingsManager::from_connection(conn);
        let settings = manager.get_settings().await.unwrap();
        assert!(settings.auto_create_packing_list);
        assert_eq!(settings.work_start, 8);
        assert_eq!(settings.work_end, 17);
        assert_eq!(settings.distraction_factor, 1.0);
    }

    #[tokio::test]
    async fn test_store_and_reload() {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let manager = SettingsManager::from_connection(conn);

        let mut settings = WorkshopSettings::default();
        settings.require_qc_before_packing = true;
        settings.work_start = 7;
        settings.distraction_factor = 1.2;
        manager.store(&settings).unwrap();

        let reloaded = manager.load();
        assert!(reloaded.require_qc_before_packing);
        assert_eq!(reloaded.work_start, 7);
        assert_eq!(reloaded.distraction_factor, 1.2);
    }
}
