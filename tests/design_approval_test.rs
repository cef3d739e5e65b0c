// ==========================================
// Design-Freigabe - Integrationstests
// ==========================================
// pending → sent → {approved, rejected,
// revision_requested}; Ablehnung + erneuter
// Upload führt zurück zu pending.
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use std::io::Write;
use std::sync::Arc;
use stitch_admin::api::{ApiError, DesignApi, NewOrder, NewOrderDesign, NewOrderItem, OrderApi};
use stitch_admin::domain::design::DesignThreadColor;
use stitch_admin::domain::types::{ApprovalStatus, DesignStatus, DesignType, OrderType};
use stitch_admin::services::{NoopEmailDispatcher, NoopPdfRenderer};

fn setup_apis(
    conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>,
) -> (
    OrderApi<stitch_admin::config::StaticSettings>,
    DesignApi<stitch_admin::config::StaticSettings>,
) {
    let clock = fixed_clock();
    let settings = default_settings();
    let order_api = OrderApi::new(conn.clone(), settings.clone(), clock.clone());
    let design_api = DesignApi::new(
        conn.clone(),
        settings,
        Arc::new(NoopPdfRenderer),
        Arc::new(NoopEmailDispatcher),
        clock,
    );
    (order_api, design_api)
}

fn order_with_design(api: &OrderApi<stitch_admin::config::StaticSettings>) -> (String, String) {
    let order = api
        .create_order(NewOrder {
            customer_id: "K001".to_string(),
            order_type: OrderType::Embroidery,
            description: None,
            customer_notes: None,
            design_status: DesignStatus::Ready,
            design_file_path: None,
            stitch_count: None,
            due_date: None,
            rush_order: false,
            items: vec![NewOrderItem {
                article_id: Some("ART001".to_string()),
                quantity: 10,
                unit_price: 20.0,
                textile_size: None,
                textile_color: None,
            }],
            designs: vec![NewOrderDesign {
                position: "brust_links".to_string(),
                design_type: DesignType::Stick,
                is_personalized: false,
                design_file_path: Some("designs/logo.dst".to_string()),
                design_name: Some("Logo".to_string()),
                stitch_count: Some(5000),
                width_mm: Some(90.0),
                height_mm: Some(60.0),
                thread_colors: vec![DesignThreadColor {
                    thread_id: None,
                    color_name: "Rot".to_string(),
                    color_number: None,
                }],
                approval_required: true,
                setup_price: 25.0,
                price_per_piece: 3.0,
            }],
            created_by: None,
        })
        .unwrap();
    let details = api.order_details(&order.id).unwrap();
    let design_id = details.designs[0].id.clone();
    (order.id, design_id)
}

// ==========================================
// Freigabe-Lebenszyklus
// ==========================================

#[tokio::test]
async fn test_approval_happy_path() {
    let conn = test_conn();
    let (order_api, design_api) = setup_apis(&conn);
    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);

    let (_order_id, design_id) = order_with_design(&order_api);

    let sent = design_api
        .send_for_approval(&design_id, "kunde@example.de")
        .await
        .unwrap();
    assert_eq!(sent.approval_status, ApprovalStatus::Sent);

    let approved = design_api.approve(&design_id, Some("passt so")).unwrap();
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert!(approved.approved_at.is_some());
    assert!(!approved.blocks_production());
}

#[tokio::test]
async fn test_rejection_requires_reupload() {
    let conn = test_conn();
    let (order_api, design_api) = setup_apis(&conn);
    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);

    let (_order_id, design_id) = order_with_design(&order_api);

    design_api
        .send_for_approval(&design_id, "kunde@example.de")
        .await
        .unwrap();
    let rejected = design_api
        .reject(&design_id, Some("Farbe gefällt nicht"))
        .unwrap();
    assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);

    // Abgelehnte Designs können nicht erneut versendet werden
    let resend = design_api
        .send_for_approval(&design_id, "kunde@example.de")
        .await;
    assert!(matches!(resend, Err(ApiError::IllegalTransition { .. })));

    // Erneuter Upload setzt auf pending zurück
    let data = helpers::test_data_builder::build_dst(
        &(0..100)
            .map(|_| helpers::test_data_builder::dst_move(10, 10))
            .collect::<Vec<_>>(),
        true,
    );
    let mut file = tempfile::Builder::new().suffix(".dst").tempfile().unwrap();
    file.write_all(&data).unwrap();

    let reuploaded = design_api.attach_file(&design_id, file.path()).unwrap();
    assert_eq!(reuploaded.approval_status, ApprovalStatus::Pending);
    assert_eq!(reuploaded.stitch_count, Some(100));
}

#[tokio::test]
async fn test_decision_only_after_sent() {
    let conn = test_conn();
    let (order_api, design_api) = setup_apis(&conn);
    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);

    let (_order_id, design_id) = order_with_design(&order_api);

    // Direkt freigeben ohne Versand → abgelehnt
    let result = design_api.approve(&design_id, None);
    assert!(matches!(result, Err(ApiError::IllegalTransition { .. })));
}

// ==========================================
// Datei-Anhang und Metrik-Übernahme
// ==========================================

#[tokio::test]
async fn test_attach_dst_updates_metrics() {
    let conn = test_conn();
    let (order_api, design_api) = setup_apis(&conn);
    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);

    let (order_id, design_id) = order_with_design(&order_api);

    let records: Vec<[u8; 3]> = (0..250)
        .map(|_| helpers::test_data_builder::dst_move(20, 10))
        .collect();
    let data = helpers::test_data_builder::build_dst(&records, true);
    let mut file = tempfile::Builder::new().suffix(".dst").tempfile().unwrap();
    file.write_all(&data).unwrap();

    let design = design_api.attach_file(&design_id, file.path()).unwrap();
    assert_eq!(design.stitch_count, Some(250));
    assert!(design.width_mm.unwrap() > 0.0);

    // Auftragsweite Metriken wurden fortgeschrieben
    let details = order_api.order_details(&order_id).unwrap();
    assert_eq!(details.order.stitch_count, Some(250));
    assert!(details.order.design_width_mm.unwrap() > 0.0);
}

#[tokio::test]
async fn test_unknown_file_kind_rejected() {
    let conn = test_conn();
    let (order_api, design_api) = setup_apis(&conn);
    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);

    let (_order_id, design_id) = order_with_design(&order_api);

    let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    let result = design_api.attach_file(&design_id, file.path());
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
