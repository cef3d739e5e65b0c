// ==========================================
// StitchAdmin - Garn-Domänenmodell
// ==========================================
// Garn + Bestand + Verbrauchsjournal
// Identität eines Garns: (Hersteller, Farbnummer)
// Regel: Verbrauch ist append-only, der Bestand
// ist eine daraus ableitbare Projektion.
// ==========================================

use crate::domain::types::UsageType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Stickgarn (Katalogeintrag)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub manufacturer: String,
    pub color_number: String,

    pub color_name_de: Option<String>,
    pub color_name_en: Option<String>,

    // Farbwerte
    pub hex_color: Option<String>,
    pub rgb_r: Option<i64>,
    pub rgb_g: Option<i64>,
    pub rgb_b: Option<i64>,

    // Eigenschaften
    pub weight: i64, // z.B. 40 für No.40
    pub material: Option<String>,
    pub price: f64,
    pub active: bool,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Thread {
    /// Katalogschlüssel (Hersteller, Farbnummer)
    pub fn catalog_key(&self) -> (String, String) {
        (self.manufacturer.clone(), self.color_number.clone())
    }

    /// Anzeigename, z.B. "Madeira 1147 (Bordeaux)"
    pub fn display_name(&self) -> String {
        match self.color_name_de.as_deref() {
            Some(name) if !name.is_empty() => {
                format!("{} {} ({})", self.manufacturer, self.color_number, name)
            }
            _ => format!("{} {}", self.manufacturer, self.color_number),
        }
    }
}

/// Garnbestand (1:1 zum Garn, Meter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadStock {
    pub id: i64,
    pub thread_id: String,
    pub quantity_m: f64,
    pub min_stock_m: f64,
    pub location: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl ThreadStock {
    pub fn is_low(&self) -> bool {
        self.quantity_m <= self.min_stock_m
    }
}

/// Garnverbrauchs-Eintrag (Journal, wird nie geändert)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadUsage {
    pub id: i64,
    pub thread_id: String,
    pub order_id: Option<String>,
    pub machine_id: Option<String>,
    pub quantity_m: f64,
    pub usage_type: UsageType,
    pub used_at: NaiveDateTime,
    pub recorded_by: Option<String>,
    pub notes: Option<String>,
}

/// Wandelt einen Hex-Farbwert ("#A1B2C3") in RGB um
///
/// Ungültige Werte liefern None; RGB bleibt dann leer.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let value = hex.trim().trim_start_matches('#');
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&value[0..2], 16).ok()?;
    let g = u8::from_str_radix(&value[2..4], 16).ok()?;
    let b = u8::from_str_radix(&value[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("00ff80"), Some((0, 255, 128)));
        assert_eq!(hex_to_rgb("#GGHHII"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
    }

    #[test]
    fn test_low_stock_boundary() {
        let stock = ThreadStock {
            id: 1,
            thread_id: "G1".to_string(),
            quantity_m: 500.0,
            min_stock_m: 500.0,
            location: None,
            updated_at: None,
        };
        // Gleichstand zählt bereits als niedrig
        assert!(stock.is_low());
    }
}
