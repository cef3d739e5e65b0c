// ==========================================
// StitchAdmin - Artikel-Domänenmodell
// ==========================================
// Abgleich: schema.sql articles-Tabelle
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Katalogartikel (Textilien, Kappen, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,

    // Lager
    pub stock: i64,
    pub min_stock: i64,

    // Einkaufspreise (einzeln / Karton / 10er-Karton)
    pub purchase_price_single: Option<f64>,
    pub purchase_price_carton: Option<f64>,
    pub purchase_price_ten_carton: Option<f64>,

    // Verkauf
    pub recommended_price: Option<f64>,
    pub sell_price: Option<f64>,

    pub active: bool,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Article {
    /// Effektiver Verkaufspreis (manuell vor empfohlenem Preis)
    pub fn effective_price(&self) -> f64 {
        self.sell_price
            .or(self.recommended_price)
            .unwrap_or(0.0)
    }

    /// Bestand unter Mindestbestand
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article() -> Article {
        Article {
            id: "ART001".to_string(),
            code: "ART001".to_string(),
            name: "T-Shirt Basic".to_string(),
            category: Some("Shirts".to_string()),
            brand: None,
            stock: 4,
            min_stock: 5,
            purchase_price_single: Some(4.50),
            purchase_price_carton: Some(4.10),
            purchase_price_ten_carton: Some(3.80),
            recommended_price: Some(19.90),
            sell_price: None,
            active: true,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_effective_price_falls_back_to_recommended() {
        assert_eq!(article().effective_price(), 19.90);

        let mut a = article();
        a.sell_price = Some(20.0);
        assert_eq!(a.effective_price(), 20.0);
    }

    #[test]
    fn test_low_stock() {
        assert!(article().is_low_stock());
    }
}
