// ==========================================
// StitchAdmin - Kunden-Domänenmodell
// ==========================================
// Abgleich: schema.sql customers-Tabelle
// ==========================================

use crate::domain::types::CustomerType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kunde (privat oder geschäftlich)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub customer_type: CustomerType,

    // Firmen- bzw. Personendaten
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    // Anschrift
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,

    // Kontakt
    pub email: Option<String>,
    pub phone: Option<String>,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Customer {
    /// Anzeigename: Firma bei Geschäftskunden, sonst "Vorname Nachname"
    pub fn display_name(&self) -> String {
        if let Some(company) = self.company_name.as_deref() {
            if !company.is_empty() {
                return company.to_string();
            }
        }
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{} {}", first, last).trim().to_string()
    }

    /// Anschrift als Versand-Snapshot (mehrzeilig)
    pub fn address_block(&self) -> String {
        let street = self.street.as_deref().unwrap_or("");
        let postal = self.postal_code.as_deref().unwrap_or("");
        let city = self.city.as_deref().unwrap_or("");
        format!("{}\n{} {}", street, postal, city).trim().to_string()
    }
}
