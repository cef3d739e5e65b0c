// ==========================================
// Workflow-Engine - Integrationstests
// ==========================================
// Statusmaschine: Design-Gate, Maschinenbelegung,
// Endzustände, Stornierung, Historie.
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use stitch_admin::api::{ApiError, NewOrder, NewOrderDesign, NewOrderItem, OrderApi};
use stitch_admin::domain::design::DesignThreadColor;
use stitch_admin::domain::types::{DesignStatus, DesignType, OrderStatus, OrderType};
use stitch_admin::repository::{OrderRepository, ScheduleBlockRepository};

fn new_order_input(customer_id: &str, design_status: DesignStatus) -> NewOrder {
    NewOrder {
        customer_id: customer_id.to_string(),
        order_type: OrderType::Embroidery,
        description: Some("Vereins-Shirts".to_string()),
        customer_notes: None,
        design_status,
        design_file_path: None,
        stitch_count: Some(6000),
        due_date: Some(test_datetime(2025, 3, 20, 12, 0)),
        rush_order: false,
        items: vec![NewOrderItem {
            article_id: Some("ART001".to_string()),
            quantity: 10,
            unit_price: 20.0,
            textile_size: Some("L".to_string()),
            textile_color: Some("Schwarz".to_string()),
        }],
        designs: vec![],
        created_by: Some("tester".to_string()),
    }
}

// ==========================================
// Happy Path: draft → accepted → in_progress → ready
// ==========================================

#[tokio::test]
async fn test_happy_path_transitions() {
    let conn = test_conn();
    let clock = fixed_clock();
    let api = OrderApi::new(conn.clone(), default_settings(), clock.clone());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let mut input = new_order_input("K001", DesignStatus::CustomerProvided);
    input.design_file_path = Some("designs/logo.dst".to_string());
    let order = api.create_order(input).unwrap();
    assert_eq!(order.id, "A2025-001");
    assert_eq!(order.status, OrderStatus::Draft);
    assert_eq!(order.total_price, 200.0);

    api.accept_order(&order.id, Some("tester")).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();
    api.schedule_production(&order.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();

    let started = api.start_production(&order.id, Some("tester")).await.unwrap();
    assert_eq!(started.status, OrderStatus::InProgress);
    assert!(started.production_start.is_some());
    assert_eq!(started.assigned_machine_id.as_deref(), Some("M001"));

    // Produktionsdauer über die eingefrorene Uhr
    clock.advance_minutes(120);
    let finished = api.finish_production(&order.id, Some("tester")).await.unwrap();
    assert_eq!(finished.status, OrderStatus::Ready);
    assert_eq!(finished.production_minutes, Some(120));

    // Historie: Anlage + 3 Übergänge = 4 Einträge
    let history = OrderRepository::from_connection(conn.clone())
        .list_history(&order.id)
        .unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].from_status, Some(OrderStatus::Draft));
    assert_eq!(history[3].to_status, OrderStatus::Ready);
    // chronologisch aufsteigend
    for pair in history.windows(2) {
        assert!(pair[0].changed_at <= pair[1].changed_at);
    }
}

// ==========================================
// Design-Gate blockiert den Produktionsstart
// ==========================================

#[tokio::test]
async fn test_design_gate_blocks_needs_order() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let order = api
        .create_order(new_order_input("K001", DesignStatus::NeedsOrder))
        .unwrap();
    api.accept_order(&order.id, None).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();

    let result = api.start_production(&order.id, None).await;
    match result {
        Err(ApiError::IllegalTransition { from, to, reason }) => {
            assert_eq!(from, "accepted");
            assert_eq!(to, "in_progress");
            assert!(reason.contains("Design"));
        }
        other => panic!("IllegalTransition erwartet, war: {:?}", other.map(|o| o.status)),
    }

    // Keine Mutation, kein Produktionsblock
    let unchanged = OrderRepository::from_connection(conn.clone())
        .get(&order.id)
        .unwrap();
    assert_eq!(unchanged.status, OrderStatus::Accepted);
    assert!(unchanged.production_start.is_none());

    let blocks = ScheduleBlockRepository::from_connection(conn.clone())
        .list_active_for_machine(
            "M001",
            test_datetime(2025, 1, 1, 0, 0).date(),
            test_datetime(2025, 12, 31, 0, 0).date(),
        )
        .unwrap();
    assert!(blocks.is_empty());
}

#[tokio::test]
async fn test_design_gate_blocks_unapproved_position() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let mut input = new_order_input("K001", DesignStatus::Ready);
    input.designs = vec![NewOrderDesign {
        position: "brust_links".to_string(),
        design_type: DesignType::Stick,
        is_personalized: false,
        design_file_path: Some("designs/logo.dst".to_string()),
        design_name: Some("Logo".to_string()),
        stitch_count: Some(6000),
        width_mm: Some(90.0),
        height_mm: Some(60.0),
        thread_colors: vec![DesignThreadColor {
            thread_id: None,
            color_name: "Rot".to_string(),
            color_number: Some("1147".to_string()),
        }],
        approval_required: true, // Freigabe steht aus
        setup_price: 25.0,
        price_per_piece: 3.0,
    }];
    let order = api.create_order(input).unwrap();
    api.accept_order(&order.id, None).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();

    let result = api.start_production(&order.id, None).await;
    match result {
        Err(ApiError::IllegalTransition { reason, .. }) => {
            assert!(reason.contains("nicht freigegeben"));
        }
        other => panic!("IllegalTransition erwartet, war: {:?}", other.map(|o| o.status)),
    }
}

// ==========================================
// Altbestand: Datei vorhanden genügt
// ==========================================

#[tokio::test]
async fn test_legacy_order_with_file_passes_gate() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    // design_status none, aber Datei hinterlegt
    let mut input = new_order_input("K001", DesignStatus::None);
    input.design_file_path = Some("designs/alt.dst".to_string());
    let order = api.create_order(input).unwrap();
    api.accept_order(&order.id, None).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();

    let started = api.start_production(&order.id, None).await.unwrap();
    assert_eq!(started.status, OrderStatus::InProgress);
}

// ==========================================
// Eine Maschine, höchstens ein laufender Auftrag
// ==========================================

#[tokio::test]
async fn test_machine_busy_blocks_second_order() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let first = api
        .create_order(new_order_input("K001", DesignStatus::CustomerProvided))
        .unwrap();
    api.accept_order(&first.id, None).await.unwrap();
    api.assign_machine(&first.id, "M001").unwrap();
    api.start_production(&first.id, None).await.unwrap();

    let second = api
        .create_order(new_order_input("K001", DesignStatus::CustomerProvided))
        .unwrap();
    api.accept_order(&second.id, None).await.unwrap();
    api.assign_machine(&second.id, "M001").unwrap();

    let result = api.start_production(&second.id, None).await;
    match result {
        Err(ApiError::IllegalTransition { reason, .. }) => {
            assert!(reason.contains("belegt"));
            assert!(reason.contains(&first.id));
        }
        other => panic!("IllegalTransition erwartet, war: {:?}", other.map(|o| o.status)),
    }
}

// ==========================================
// Endzustände sind endgültig
// ==========================================

#[tokio::test]
async fn test_terminal_states_reject_transitions() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);

    let order = api
        .create_order(new_order_input("K001", DesignStatus::CustomerProvided))
        .unwrap();
    api.cancel_order(&order.id, None, Some("Kunde hat storniert"))
        .await
        .unwrap();

    // Erneuter Übergang aus dem Endzustand → IllegalTransition, keine Mutation
    let result = api.accept_order(&order.id, None).await;
    assert!(matches!(result, Err(ApiError::IllegalTransition { .. })));

    let history_before = OrderRepository::from_connection(conn.clone())
        .list_history(&order.id)
        .unwrap();
    let again = api.cancel_order(&order.id, None, None).await;
    assert!(matches!(again, Err(ApiError::IllegalTransition { .. })));
    let history_after = OrderRepository::from_connection(conn.clone())
        .list_history(&order.id)
        .unwrap();
    assert_eq!(history_before.len(), history_after.len());
}

// ==========================================
// Stornierung gibt Blöcke und Maschine frei
// ==========================================

#[tokio::test]
async fn test_cancel_frees_blocks_and_machine() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let order = api
        .create_order(new_order_input("K001", DesignStatus::CustomerProvided))
        .unwrap();
    api.accept_order(&order.id, None).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();
    api.schedule_production(&order.id, test_datetime(2025, 3, 11, 9, 0), 120)
        .unwrap();

    let cancelled = api.cancel_order(&order.id, None, None).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.assigned_machine_id.is_none());

    let blocks = ScheduleBlockRepository::from_connection(conn.clone())
        .list_active_for_machine(
            "M001",
            test_datetime(2025, 1, 1, 0, 0).date(),
            test_datetime(2025, 12, 31, 0, 0).date(),
        )
        .unwrap();
    assert!(blocks.is_empty(), "Blöcke müssen freigegeben sein");
}

// ==========================================
// Annahme verlangt Kunde und Positionen
// ==========================================

#[tokio::test]
async fn test_accept_requires_items() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);

    let mut input = new_order_input("K001", DesignStatus::CustomerProvided);
    input.items = vec![];
    let order = api.create_order(input).unwrap();

    let result = api.accept_order(&order.id, None).await;
    match result {
        Err(ApiError::IllegalTransition { reason, .. }) => {
            assert!(reason.contains("Positionen"));
        }
        other => panic!("IllegalTransition erwartet, war: {:?}", other.map(|o| o.status)),
    }
}
