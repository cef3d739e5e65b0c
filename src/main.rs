// ==========================================
// StitchAdmin - Haupteinstieg
// ==========================================
// Initialisiert Logging, Datenbank und Schema;
// die Oberfläche läuft als separates Frontend
// gegen diese Bibliothek.
// ==========================================

use stitch_admin::db;
use stitch_admin::logging;

/// Standard-Datenbankpfad im Benutzerverzeichnis
fn default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join("stitch-admin");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(error = %e, "Datenverzeichnis konnte nicht angelegt werden");
    }
    dir.join("stitch_admin.db").display().to_string()
}

fn main() {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - Auftrags- und Produktionsverwaltung", stitch_admin::APP_NAME);
    tracing::info!("Version: {}", stitch_admin::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::var("STITCH_ADMIN_DB").unwrap_or_else(|_| default_db_path());
    tracing::info!("Datenbank: {}", db_path);

    let conn = match db::open_sqlite_connection(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Datenbankverbindung fehlgeschlagen");
            std::process::exit(1);
        }
    };

    if let Err(e) = db::init_schema(&conn) {
        tracing::error!(error = %e, "Schema-Anlage fehlgeschlagen");
        std::process::exit(1);
    }

    match db::read_schema_version(&conn) {
        Ok(Some(version)) if version == db::CURRENT_SCHEMA_VERSION => {
            tracing::info!(version, "Schema aktuell");
        }
        Ok(Some(version)) => {
            tracing::warn!(
                version,
                expected = db::CURRENT_SCHEMA_VERSION,
                "Schema-Version weicht ab"
            );
        }
        Ok(None) => tracing::warn!("Keine schema_version gefunden"),
        Err(e) => tracing::warn!(error = %e, "schema_version nicht lesbar"),
    }

    tracing::info!("Initialisierung abgeschlossen");
}
