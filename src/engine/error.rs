// ==========================================
// StitchAdmin - Fehlerarten der Engine-Schicht
// ==========================================
// Regel: abgelehnte Statuswechsel tragen immer
// from, to und eine verständliche Begründung.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Fehler der Engine-Schicht
#[derive(Error, Debug)]
pub enum EngineError {
    /// Unzulässiger Statuswechsel; der Zustand bleibt unverändert
    #[error("Unzulässiger Statuswechsel von {from} nach {to}: {reason}")]
    IllegalTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Terminkonflikt beim Einplanen
    #[error("Terminkonflikt auf Maschine {machine_id}: {start} - {end} ist belegt")]
    ScheduleConflict {
        machine_id: String,
        start: String,
        end: String,
    },

    #[error("Keine passende freie Maschine gefunden: {0}")]
    NoMachineAvailable(String),

    #[error("Eintrag nicht gefunden: {entity} mit id={id}")]
    NotFound { entity: String, id: String },

    #[error("Validierung fehlgeschlagen: {0}")]
    Validation(String),

    /// Fehler eines externen Dienstes (PDF, E-Mail); Zustand bleibt intakt
    #[error("Externer Dienst fehlgeschlagen: {0}")]
    External(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Interner Fehler: {0}")]
    Internal(String),
}

impl EngineError {
    /// Bequemer Konstruktor für abgelehnte Statuswechsel
    pub fn illegal_transition(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::IllegalTransition {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }
}

/// Result-Alias
pub type EngineResult<T> = Result<T, EngineError>;
