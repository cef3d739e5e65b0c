// ==========================================
// StitchAdmin - Datenzugriffsschicht
// ==========================================
// Ein Repository pro Aggregat; alle Repositories
// teilen sich eine Verbindung (Arc<Mutex<Connection>>).
// Regel: keine Geschäftslogik in dieser Schicht.
// ==========================================

pub mod error;

pub mod article_repo;
pub mod block_repo;
pub mod customer_repo;
pub mod design_repo;
pub mod machine_repo;
pub mod numbering;
pub mod order_repo;
pub mod settings_repo;
pub mod shipping_repo;
pub mod thread_repo;

pub use article_repo::ArticleRepository;
pub use block_repo::ScheduleBlockRepository;
pub use customer_repo::CustomerRepository;
pub use design_repo::DesignRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use machine_repo::MachineRepository;
pub use numbering::NumberSequences;
pub use order_repo::OrderRepository;
pub use settings_repo::SettingsRepository;
pub use shipping_repo::ShippingRepository;
pub use thread_repo::ThreadRepository;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

// ==========================================
// Gemeinsame Datums-/Zeitformate (TEXT-Spalten)
// ==========================================

pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
pub(crate) const TIME_FMT: &str = "%H:%M:%S";

pub(crate) fn fmt_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

pub(crate) fn fmt_date(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub(crate) fn fmt_time(t: &NaiveTime) -> String {
    t.format(TIME_FMT).to_string()
}

pub(crate) fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| {
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    })
}

pub(crate) fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
}

pub(crate) fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, TIME_FMT)
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

pub(crate) fn opt_datetime(s: Option<String>) -> Option<NaiveDateTime> {
    s.map(|v| parse_datetime(&v))
}

pub(crate) fn opt_date(s: Option<String>) -> Option<NaiveDate> {
    s.map(|v| parse_date(&v))
}
