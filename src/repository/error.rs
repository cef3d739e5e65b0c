// ==========================================
// StitchAdmin - Fehlerarten der Datenzugriffsschicht
// ==========================================
// Werkzeug: thiserror-Ableitung
// Regel: Repositories enthalten keine Geschäftslogik
// ==========================================

use thiserror::Error;

/// Fehler der Datenzugriffsschicht
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Datenbankfehler =====
    #[error("Eintrag nicht gefunden: {entity} mit id={id}")]
    NotFound { entity: String, id: String },

    #[error("Datenbankverbindung fehlgeschlagen: {0}")]
    DatabaseConnectionError(String),

    #[error("Datenbanksperre konnte nicht erworben werden: {0}")]
    LockError(String),

    #[error("Datenbanktransaktion fehlgeschlagen: {0}")]
    DatabaseTransactionError(String),

    #[error("Datenbankabfrage fehlgeschlagen: {0}")]
    DatabaseQueryError(String),

    #[error("Eindeutigkeit verletzt: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fremdschlüssel verletzt: {0}")]
    ForeignKeyViolation(String),

    // ===== Datenqualität =====
    #[error("Datenvalidierung fehlgeschlagen: {0}")]
    ValidationError(String),

    #[error("Feldwert ungültig (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== Allgemein =====
    #[error("Interner Fehler: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// Umwandlung von rusqlite::Error
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unbekannt".to_string(),
                id: "Unbekannt".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result-Alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;
