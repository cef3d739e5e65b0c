// ==========================================
// StitchAdmin - Fehlerarten der API-Schicht
// ==========================================
// Wandelt technische Fehler der unteren Schichten
// in benutzerverständliche deutsche Meldungen um.
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API-Fehler
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Ungültige Eingabe: {0}")]
    InvalidInput(String),

    #[error("Nicht gefunden: {0}")]
    NotFound(String),

    #[error("Unzulässiger Statuswechsel von {from} nach {to}: {reason}")]
    IllegalTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Konflikt: {0}")]
    Conflict(String),

    #[error("Geschäftsregel verletzt: {0}")]
    BusinessRuleViolation(String),

    #[error("Import fehlgeschlagen: {0}")]
    Import(String),

    #[error("Externer Dienst fehlgeschlagen: {0}")]
    External(String),

    #[error("Datenbankfehler: {0}")]
    Database(String),

    #[error("Interner Fehler: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) existiert nicht", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("Eindeutigkeit verletzt: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("Verweis ungültig: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("Feld {}: {}", field, message))
            }
            RepositoryError::LockError(msg)
            | RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::Database(msg),
            RepositoryError::InternalError(msg) => ApiError::Internal(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::IllegalTransition { from, to, reason } => {
                ApiError::IllegalTransition { from, to, reason }
            }
            EngineError::ScheduleConflict {
                machine_id,
                start,
                end,
            } => ApiError::Conflict(format!(
                "Maschine {} ist im Zeitraum {} - {} belegt",
                machine_id, start, end
            )),
            EngineError::NoMachineAvailable(msg) => ApiError::BusinessRuleViolation(msg),
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) existiert nicht", entity, id))
            }
            EngineError::Validation(msg) => ApiError::InvalidInput(msg),
            EngineError::External(msg) => ApiError::External(msg),
            EngineError::Repository(repo) => repo.into(),
            EngineError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::Import(err.to_string())
    }
}

/// Result-Alias
pub type ApiResult<T> = Result<T, ApiError>;
