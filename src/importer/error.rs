// ==========================================
// StitchAdmin - Importfehler
// ==========================================

use thiserror::Error;

/// Fehler beim Garnkatalog-Import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Datei nicht gefunden: {0}")]
    FileNotFound(String),

    #[error("Nicht unterstütztes Dateiformat: {0}")]
    UnsupportedFormat(String),

    #[error("CSV-Parsing fehlgeschlagen: {0}")]
    CsvParseError(String),

    #[error("Excel-Parsing fehlgeschlagen: {0}")]
    ExcelParseError(String),

    #[error("Pflichtspalte fehlt: {0}")]
    MissingColumn(String),

    #[error("Zeile {row} ungültig: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Datenbankfehler: {0}")]
    Database(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result-Alias
pub type ImportResult<T> = Result<T, ImportError>;
