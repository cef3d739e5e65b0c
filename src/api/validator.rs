// ==========================================
// StitchAdmin - Eingabevalidierung
// ==========================================
// Prüfregeln der API-Schicht; Meldungen sind
// kurz, deutsch und benennen das Feld.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use chrono::NaiveDateTime;

/// Pflichtfeld: nicht leer
pub fn require_non_empty(value: &str, field: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} darf nicht leer sein", field)));
    }
    Ok(())
}

/// Menge muss positiv sein
pub fn require_positive_quantity(quantity: i64, field: &str) -> ApiResult<()> {
    if quantity <= 0 {
        return Err(ApiError::InvalidInput(format!(
            "{} muss größer als 0 sein (ist {})",
            field, quantity
        )));
    }
    Ok(())
}

/// Preis darf nicht negativ sein
pub fn require_non_negative_price(price: f64, field: &str) -> ApiResult<()> {
    if price < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "{} darf nicht negativ sein",
            field
        )));
    }
    Ok(())
}

/// Zeitraum: Ende nicht vor Beginn
pub fn require_valid_interval(start: NaiveDateTime, end: NaiveDateTime) -> ApiResult<()> {
    if end < start {
        return Err(ApiError::InvalidInput(
            "Ende darf nicht vor dem Beginn liegen".to_string(),
        ));
    }
    Ok(())
}

/// Hex-Farbwert im Format #RRGGBB (oder leer)
pub fn validate_hex_color(hex: &str) -> ApiResult<()> {
    let value = hex.trim().trim_start_matches('#');
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::InvalidInput(format!(
            "Ungültiger Hex-Farbwert: {}",
            hex
        )));
    }
    Ok(())
}
