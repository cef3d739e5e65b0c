// ==========================================
// StitchAdmin - Uhr (injizierbar)
// ==========================================
// Regel: Kernlogik ruft now() nie direkt auf,
// sondern immer über diese Schnittstelle.
// Tests frieren die Zeit damit ein.
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::sync::Mutex;

/// Zeitquelle der Anwendung
pub trait Clock: Send + Sync {
    /// Aktueller Zeitpunkt (UTC, naiv)
    fn now(&self) -> NaiveDateTime;

    /// Aktuelles Datum (UTC)
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Systemuhr (Produktionsbetrieb)
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Feststehende Uhr für Tests
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Setzt die Uhr auf einen neuen Zeitpunkt
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    /// Dreht die Uhr um Minuten vor
    pub fn advance_minutes(&self, minutes: i64) {
        let mut guard = self.now.lock().unwrap();
        *guard += chrono::Duration::minutes(minutes);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}
