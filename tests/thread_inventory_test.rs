// ==========================================
// Garnbestand - Integrationstests
// ==========================================
// Verbrauchsjournal, saturierende Bestandsbuchung,
// Meldebestände, Schätzung, Katalog-Import.
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use std::collections::HashMap;
use stitch_admin::api::{ApiError, ThreadApi};
use stitch_admin::domain::types::UsageType;
use stitch_admin::importer::{ColumnMapping, ThreadCatalogImporter};
use stitch_admin::repository::ThreadRepository;

// ==========================================
// Verbrauchsbuchung
// ==========================================

#[test]
fn test_record_usage_decrements_stock() {
    let conn = test_conn();
    let api = ThreadApi::new(conn.clone(), fixed_clock());
    ThreadBuilder::new("G1", "1147").stock(100.0).insert(&conn);

    api.record_usage("G1", None, None, 30.0, UsageType::Production, Some("tester"))
        .unwrap();

    let repo = ThreadRepository::from_connection(conn.clone());
    let stock = repo.get_stock("G1").unwrap();
    assert_eq!(stock.quantity_m, 70.0);

    let usages = repo.list_usage_for_thread("G1").unwrap();
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].quantity_m, 30.0);
}

#[test]
fn test_stock_saturates_at_zero() {
    let conn = test_conn();
    let api = ThreadApi::new(conn.clone(), fixed_clock());
    ThreadBuilder::new("G1", "1147").stock(10.0).insert(&conn);

    api.record_usage("G1", None, None, 25.0, UsageType::Production, None)
        .unwrap();

    let stock = ThreadRepository::from_connection(conn.clone())
        .get_stock("G1")
        .unwrap();
    assert_eq!(stock.quantity_m, 0.0, "Bestand saturiert bei 0");
}

#[test]
fn test_unknown_thread_is_hard_error() {
    let conn = test_conn();
    let api = ThreadApi::new(conn.clone(), fixed_clock());

    let result = api.record_usage("GIBT-ES-NICHT", None, None, 5.0, UsageType::Test, None);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

// ==========================================
// Bestand als Projektion: aus Anfangsbestand und
// Journal rekonstruierbar
// ==========================================

#[test]
fn test_stock_recomputable_from_usage_log() {
    let conn = test_conn();
    let api = ThreadApi::new(conn.clone(), fixed_clock());
    ThreadBuilder::new("G1", "1147").stock(500.0).insert(&conn);

    api.record_usage("G1", None, None, 120.0, UsageType::Production, None)
        .unwrap();
    api.record_usage("G1", None, None, 30.0, UsageType::Test, None)
        .unwrap();
    api.record_usage("G1", None, None, 50.0, UsageType::Waste, None)
        .unwrap();

    let repo = ThreadRepository::from_connection(conn.clone());
    let total_used = repo.total_usage("G1").unwrap();
    let stock = repo.get_stock("G1").unwrap();
    assert_eq!(total_used, 200.0);
    assert_eq!(stock.quantity_m, 500.0 - total_used);
}

// ==========================================
// Meldebestände und Nachbestellvorschläge
// ==========================================

#[test]
fn test_low_stock_suggestions() {
    let conn = test_conn();
    let api = ThreadApi::new(conn.clone(), fixed_clock());

    ThreadBuilder::new("G1", "1147")
        .stock(40.0)
        .min_stock(100.0)
        .insert(&conn);
    ThreadBuilder::new("G2", "1000")
        .stock(100.0)
        .min_stock(100.0)
        .insert(&conn); // Gleichstand zählt als niedrig
    ThreadBuilder::new("G3", "1800")
        .stock(800.0)
        .min_stock(100.0)
        .insert(&conn);

    let suggestions = api.low_stock().unwrap();
    assert_eq!(suggestions.len(), 2);

    let by_id: HashMap<_, _> = suggestions
        .iter()
        .map(|s| (s.thread.id.clone(), s))
        .collect();
    // Auffüllen auf das Doppelte des Mindestbestands
    assert_eq!(by_id["G1"].suggested_quantity_m, 160.0);
    assert_eq!(by_id["G2"].suggested_quantity_m, 100.0);
}

// ==========================================
// Katalog-Import (Upsert über Hersteller + Farbnummer)
// ==========================================

#[test]
fn test_catalog_import_upsert() {
    let conn = test_conn();
    let importer = ThreadCatalogImporter::new(conn.clone(), fixed_clock());
    ThreadBuilder::new("G1", "1147").insert(&conn); // Madeira 1147 existiert

    let mapping = ColumnMapping::default();
    let rows: Vec<HashMap<String, String>> = vec![
        // Update des bestehenden Garns inkl. RGB aus Hex
        [
            ("Hersteller", "Madeira"),
            ("Farbnummer", "1147"),
            ("Farbname", "Bordeaux"),
            ("Hex", "#800020"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        // Neues Garn ohne Hex → RGB bleibt leer
        [
            ("Hersteller", "Madeira"),
            ("Farbnummer", "1000"),
            ("Farbname", "Weiß"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
        // Zeile ohne Farbnummer → übersprungen
        [("Hersteller", "Madeira"), ("Farbname", "Kaputt")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    ];

    let report = importer.import_records(&rows, &mapping).unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors.len(), 1);

    let repo = ThreadRepository::from_connection(conn.clone());
    let updated = repo.find_by_catalog_key("Madeira", "1147").unwrap().unwrap();
    assert_eq!(updated.color_name_de.as_deref(), Some("Bordeaux"));
    assert_eq!(updated.rgb_r, Some(0x80));
    assert_eq!(updated.rgb_g, Some(0x00));
    assert_eq!(updated.rgb_b, Some(0x20));

    let created = repo.find_by_catalog_key("Madeira", "1000").unwrap().unwrap();
    assert!(created.rgb_r.is_none());
}

#[test]
fn test_catalog_import_from_csv_file() {
    use std::io::Write;

    let conn = test_conn();
    let api = ThreadApi::new(conn.clone(), fixed_clock());

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "Hersteller,Farbnummer,Farbname,Hex").unwrap();
    writeln!(file, "Gütermann,339,Marine,#1B2A4A").unwrap();
    writeln!(file, "Gütermann,800,Gold,#C9A227").unwrap();

    let report = api
        .import_catalog(file.path(), &ColumnMapping::default())
        .unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.updated, 0);
}
