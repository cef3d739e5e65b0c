// ==========================================
// StitchAdmin - Garn-API
// ==========================================
// Katalogpflege, Verbrauchsbuchung, Meldebestände
// und Verbrauchsschätzung pro Auftrag.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_non_empty, validate_hex_color};
use crate::domain::clock::Clock;
use crate::domain::thread::{hex_to_rgb, Thread, ThreadStock, ThreadUsage};
use crate::domain::types::UsageType;
use crate::engine::thread_estimator::{ThreadEstimate, ThreadEstimator};
use crate::importer::{ColumnMapping, ImportReport, ThreadCatalogImporter};
use crate::repository::{DesignRepository, OrderRepository, ThreadRepository};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Neues Garn
#[derive(Debug, Clone)]
pub struct NewThread {
    pub manufacturer: String,
    pub color_number: String,
    pub color_name_de: Option<String>,
    pub hex_color: Option<String>,
    pub weight: i64,
    pub material: Option<String>,
    pub price: f64,
}

/// Nachbestellvorschlag
#[derive(Debug, Clone)]
pub struct RestockSuggestion {
    pub thread: Thread,
    pub stock: ThreadStock,
    /// Vorschlag: auf das Doppelte des Mindestbestands auffüllen
    pub suggested_quantity_m: f64,
}

/// Garn-API
pub struct ThreadApi {
    threads: ThreadRepository,
    orders: OrderRepository,
    designs: DesignRepository,
    estimator: ThreadEstimator,
    importer: ThreadCatalogImporter,
    clock: Arc<dyn Clock>,
}

impl ThreadApi {
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            threads: ThreadRepository::from_connection(conn.clone()),
            orders: OrderRepository::from_connection(conn.clone()),
            designs: DesignRepository::from_connection(conn.clone()),
            estimator: ThreadEstimator::new(),
            importer: ThreadCatalogImporter::new(conn, clock.clone()),
            clock,
        }
    }

    /// Legt ein Garn an (Identität: Hersteller + Farbnummer)
    pub fn create_thread(&self, new: NewThread) -> ApiResult<Thread> {
        require_non_empty(&new.manufacturer, "Hersteller")?;
        require_non_empty(&new.color_number, "Farbnummer")?;
        if let Some(hex) = new.hex_color.as_deref() {
            validate_hex_color(hex)?;
        }

        if self
            .threads
            .find_by_catalog_key(&new.manufacturer, &new.color_number)?
            .is_some()
        {
            return Err(ApiError::Conflict(format!(
                "Garn {} {} existiert bereits",
                new.manufacturer, new.color_number
            )));
        }

        let rgb = new.hex_color.as_deref().and_then(hex_to_rgb);
        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            manufacturer: new.manufacturer,
            color_number: new.color_number,
            color_name_de: new.color_name_de,
            color_name_en: None,
            hex_color: new.hex_color,
            rgb_r: rgb.map(|(r, _, _)| r as i64),
            rgb_g: rgb.map(|(_, g, _)| g as i64),
            rgb_b: rgb.map(|(_, _, b)| b as i64),
            weight: new.weight,
            material: new.material,
            price: new.price,
            active: true,
            created_at: self.clock.now(),
            updated_at: None,
        };
        self.threads.insert(&thread)?;
        info!(thread = %thread.display_name(), "Garn angelegt");
        Ok(thread)
    }

    /// Setzt Bestand und Mindestbestand eines Garns
    pub fn set_stock(
        &self,
        thread_id: &str,
        quantity_m: f64,
        min_stock_m: f64,
        location: Option<&str>,
    ) -> ApiResult<()> {
        if quantity_m < 0.0 || min_stock_m < 0.0 {
            return Err(ApiError::InvalidInput(
                "Bestand darf nicht negativ sein".to_string(),
            ));
        }
        Ok(self
            .threads
            .set_stock(thread_id, quantity_m, min_stock_m, location)?)
    }

    /// Bucht Garnverbrauch (append-only) und schreibt den
    /// Bestand saturierend fort. Unbekanntes Garn → Fehler.
    pub fn record_usage(
        &self,
        thread_id: &str,
        order_id: Option<&str>,
        machine_id: Option<&str>,
        quantity_m: f64,
        usage_type: UsageType,
        recorded_by: Option<&str>,
    ) -> ApiResult<i64> {
        if quantity_m <= 0.0 {
            return Err(ApiError::InvalidInput(
                "Verbrauchsmenge muss größer als 0 sein".to_string(),
            ));
        }
        let usage_id = self.threads.append_usage(&ThreadUsage {
            id: 0,
            thread_id: thread_id.to_string(),
            order_id: order_id.map(|s| s.to_string()),
            machine_id: machine_id.map(|s| s.to_string()),
            quantity_m,
            usage_type,
            used_at: self.clock.now(),
            recorded_by: recorded_by.map(|s| s.to_string()),
            notes: None,
        })?;
        Ok(usage_id)
    }

    /// Garne unter Meldebestand mit Nachbestellvorschlag
    pub fn low_stock(&self) -> ApiResult<Vec<RestockSuggestion>> {
        let rows = self.threads.list_low_stock()?;
        Ok(rows
            .into_iter()
            .map(|(thread, stock)| {
                let target = stock.min_stock_m * 2.0;
                let suggested = (target - stock.quantity_m).max(0.0);
                RestockSuggestion {
                    thread,
                    stock,
                    suggested_quantity_m: suggested,
                }
            })
            .collect())
    }

    /// Verbrauchsschätzung pro Farbe für einen Auftrag
    pub fn estimate_for_order(&self, order_id: &str) -> ApiResult<Vec<ThreadEstimate>> {
        let order = self.orders.get(order_id)?;
        let designs = self.designs.list_for_order(order_id)?;
        Ok(self.estimator.estimate_for_order(&order, &designs))
    }

    /// Garnkatalog-Import (CSV/Excel) mit Spaltenzuordnung
    pub fn import_catalog(
        &self,
        path: &Path,
        mapping: &ColumnMapping,
    ) -> ApiResult<ImportReport> {
        Ok(self.importer.import_file(path, mapping)?)
    }

    /// Verbrauchshistorie eines Garns
    pub fn usage_history(&self, thread_id: &str) -> ApiResult<Vec<ThreadUsage>> {
        Ok(self.threads.list_usage_for_thread(thread_id)?)
    }
}
