// ==========================================
// StitchAdmin - Konfigurationsschicht
// ==========================================

pub mod settings;

pub use settings::{SettingsManager, SettingsReader, StaticSettings, WorkshopSettings};
