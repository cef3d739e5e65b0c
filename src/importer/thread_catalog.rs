// ==========================================
// StitchAdmin - Garnkatalog-Import
// ==========================================
// Bulk-Upsert über den Katalogschlüssel
// (Hersteller, Farbnummer). RGB wird aus dem
// Hex-Wert abgeleitet, wenn vorhanden; sonst
// bleiben die RGB-Felder leer.
// ==========================================

use crate::domain::clock::Clock;
use crate::domain::thread::{hex_to_rgb, Thread};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::parser_for;
use crate::repository::ThreadRepository;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Spaltenzuordnung: Quellspalte → Zielfeld
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub manufacturer: String,
    pub color_number: String,
    pub color_name: Option<String>,
    pub hex_color: Option<String>,
    pub weight: Option<String>,
    pub material: Option<String>,
    pub price: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            manufacturer: "Hersteller".to_string(),
            color_number: "Farbnummer".to_string(),
            color_name: Some("Farbname".to_string()),
            hex_color: Some("Hex".to_string()),
            weight: Some("Stärke".to_string()),
            material: Some("Material".to_string()),
            price: Some("Preis".to_string()),
        }
    }
}

/// Importbericht
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Garnkatalog-Importer
pub struct ThreadCatalogImporter {
    threads: ThreadRepository,
    clock: Arc<dyn Clock>,
}

impl ThreadCatalogImporter {
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            threads: ThreadRepository::from_connection(conn),
            clock,
        }
    }

    /// Importiert eine Katalogdatei (CSV oder Excel)
    pub fn import_file(
        &self,
        path: &Path,
        mapping: &ColumnMapping,
    ) -> ImportResult<ImportReport> {
        let parser = parser_for(path)?;
        let records = parser.parse_to_raw_records(path)?;
        info!(path = %path.display(), rows = records.len(), "Garnkatalog-Import gestartet");
        self.import_records(&records, mapping)
    }

    /// Importiert bereits geparste Zeilen
    pub fn import_records(
        &self,
        records: &[HashMap<String, String>],
        mapping: &ColumnMapping,
    ) -> ImportResult<ImportReport> {
        let mut report = ImportReport::default();

        for (index, record) in records.iter().enumerate() {
            let row = index + 2; // 1-basiert, nach der Kopfzeile
            match self.upsert_record(record, mapping) {
                Ok(true) => report.imported += 1,
                Ok(false) => report.updated += 1,
                Err(ImportError::InvalidRow { reason, .. }) => {
                    report.skipped += 1;
                    report.errors.push(format!("Zeile {}: {}", row, reason));
                }
                Err(e) => {
                    report.skipped += 1;
                    report.errors.push(format!("Zeile {}: {}", row, e));
                }
            }
        }

        info!(
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped,
            "Garnkatalog-Import abgeschlossen"
        );
        if !report.errors.is_empty() {
            warn!(errors = report.errors.len(), "Import mit Fehlerzeilen abgeschlossen");
        }

        Ok(report)
    }

    /// Upsert einer Zeile; true = neu angelegt, false = aktualisiert
    fn upsert_record(
        &self,
        record: &HashMap<String, String>,
        mapping: &ColumnMapping,
    ) -> ImportResult<bool> {
        let get = |column: &str| -> Option<String> {
            record
                .get(column)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let manufacturer = get(&mapping.manufacturer).ok_or_else(|| ImportError::InvalidRow {
            row: 0,
            reason: format!("Hersteller fehlt (Spalte '{}')", mapping.manufacturer),
        })?;
        let color_number = get(&mapping.color_number).ok_or_else(|| ImportError::InvalidRow {
            row: 0,
            reason: format!("Farbnummer fehlt (Spalte '{}')", mapping.color_number),
        })?;

        let color_name = mapping.color_name.as_deref().and_then(get);
        let hex_color = mapping.hex_color.as_deref().and_then(get);
        let weight = mapping
            .weight
            .as_deref()
            .and_then(get)
            .and_then(|v| v.parse::<i64>().ok());
        let material = mapping.material.as_deref().and_then(get);
        let price = mapping
            .price
            .as_deref()
            .and_then(get)
            .and_then(|v| v.replace(',', ".").parse::<f64>().ok());

        // RGB aus Hex ableiten; ungültiges Hex lässt RGB leer
        let rgb = hex_color.as_deref().and_then(hex_to_rgb);

        let existing = self
            .threads
            .find_by_catalog_key(&manufacturer, &color_number)
            .map_err(|e| ImportError::Database(e.to_string()))?;

        let now = self.clock.now();
        match existing {
            Some(mut thread) => {
                if let Some(name) = color_name {
                    thread.color_name_de = Some(name);
                }
                if let Some(hex) = hex_color {
                    thread.hex_color = Some(hex);
                }
                if let Some((r, g, b)) = rgb {
                    thread.rgb_r = Some(r as i64);
                    thread.rgb_g = Some(g as i64);
                    thread.rgb_b = Some(b as i64);
                }
                if let Some(w) = weight {
                    thread.weight = w;
                }
                if let Some(m) = material {
                    thread.material = Some(m);
                }
                if let Some(p) = price {
                    thread.price = p;
                }
                thread.updated_at = Some(now);
                self.threads
                    .update(&thread)
                    .map_err(|e| ImportError::Database(e.to_string()))?;
                Ok(false)
            }
            None => {
                let thread = Thread {
                    id: Uuid::new_v4().to_string(),
                    manufacturer,
                    color_number,
                    color_name_de: color_name,
                    color_name_en: None,
                    hex_color,
                    rgb_r: rgb.map(|(r, _, _)| r as i64),
                    rgb_g: rgb.map(|(_, g, _)| g as i64),
                    rgb_b: rgb.map(|(_, _, b)| b as i64),
                    weight: weight.unwrap_or(40),
                    material,
                    price: price.unwrap_or(0.0),
                    active: true,
                    created_at: now,
                    updated_at: None,
                };
                self.threads
                    .insert(&thread)
                    .map_err(|e| ImportError::Database(e.to_string()))?;
                Ok(true)
            }
        }
    }
}
