// ==========================================
// StitchAdmin - Kernbibliothek
// ==========================================
// Auftrags- und Produktionsverwaltung für
// Stickerei / Textildruck (Werkstattbetrieb)
// Technik: Rust + SQLite
// ==========================================

// Initialisierung der Internationalisierung
rust_i18n::i18n!("locales", fallback = "de");

// ==========================================
// Moduldeklarationen
// ==========================================

// Domänenschicht - Entitäten und Typen
pub mod domain;

// Datenzugriffsschicht
pub mod repository;

// Engine-Schicht - Geschäftsregeln
pub mod engine;

// Importschicht - Garnkatalog
pub mod importer;

// Konfigurationsschicht - Werkstatteinstellungen
pub mod config;

// Datenbank-Infrastruktur (Verbindung/PRAGMA/Schema)
pub mod db;

// Logging
pub mod logging;

// Internationalisierung
pub mod i18n;

// Externe Dienste (E-Mail, PDF) - nur Schnittstellen
pub mod services;

// API-Schicht - Geschäftsvorgänge
pub mod api;

// ==========================================
// Re-Exporte der Kerntypen
// ==========================================

// Domänentypen
pub use domain::types::{
    ApprovalStatus, BlockType, DeliveryMethod, DeliveryNoteStatus, DesignStatus, DesignType,
    MachineStatus, MachineType, OrderStatus, OrderType, PackingListStatus, PostDirection,
    PostEntryStatus, Priority, ShipmentStatus, UsageType,
};

// Domänenentitäten
pub use domain::{
    Article, Customer, DeliveryNote, Machine, Order, OrderDesign, OrderItem,
    OrderItemPersonalization, OrderStatusHistory, PackingList, PostEntry, ScheduleBlock, Shipment,
    Thread, ThreadStock, ThreadUsage,
};

// Engines
pub use engine::{
    DocumentCascade, DstAnalysis, PackingFlowEngine, Scheduler, ThreadEstimator, WorkflowEngine,
};

// API
pub use api::{CalendarApi, DesignApi, MachineApi, OrderApi, ShippingApi, ThreadApi};

// ==========================================
// Konstanten
// ==========================================

// Systemversion
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Systemname
pub const APP_NAME: &str = "StitchAdmin";

// Datenbankversion
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
