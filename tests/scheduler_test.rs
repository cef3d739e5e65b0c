// ==========================================
// Scheduler - Integrationstests
// ==========================================
// Konflikterkennung, Maschinenvorschlag
// (freie vor belegten Maschinen), Verschieben.
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use stitch_admin::api::{ApiError, NewOrder, NewOrderItem, OrderApi};
use stitch_admin::domain::types::{DesignStatus, MachineType, OrderType};

fn order_input(customer_id: &str) -> NewOrder {
    NewOrder {
        customer_id: customer_id.to_string(),
        order_type: OrderType::Embroidery,
        description: None,
        customer_notes: None,
        design_status: DesignStatus::CustomerProvided,
        design_file_path: Some("designs/logo.dst".to_string()),
        stitch_count: Some(6000),
        due_date: None,
        rush_order: false,
        items: vec![NewOrderItem {
            article_id: Some("ART001".to_string()),
            quantity: 10,
            unit_price: 20.0,
            textile_size: None,
            textile_color: None,
        }],
        designs: vec![],
        created_by: None,
    }
}

// ==========================================
// Szenario: Überlappung auf M001, Ausweichen auf M002
// ==========================================

#[tokio::test]
async fn test_conflict_then_alternative_machine() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);
    MachineBuilder::new("M002").insert(&conn);

    // Erster Auftrag: M001 von 09:00 bis 11:00
    let first = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&first.id, "M001").unwrap();
    api.schedule_production(&first.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();

    // Zweiter Auftrag: M001 um 10:00 → Konflikt, kein zweiter Block
    let second = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&second.id, "M001").unwrap();
    let conflict =
        api.schedule_production(&second.id, test_datetime(2025, 3, 10, 10, 0), 120);
    assert!(matches!(conflict, Err(ApiError::Conflict(_))));

    let blocks_m001 = stitch_admin::repository::ScheduleBlockRepository::from_connection(
        conn.clone(),
    )
    .list_active_for_machine(
        "M001",
        test_datetime(2025, 3, 10, 0, 0).date(),
        test_datetime(2025, 3, 10, 0, 0).date(),
    )
    .unwrap();
    assert_eq!(blocks_m001.len(), 1);

    // Ausweichen auf M002 um 10:00 → gelingt
    api.assign_machine(&second.id, "M002").unwrap();
    let block = api
        .schedule_production(&second.id, test_datetime(2025, 3, 10, 10, 0), 120)
        .unwrap();
    assert_eq!(block.machine_id.as_deref(), Some("M002"));
}

// ==========================================
// Angrenzende Intervalle sind kein Konflikt
// ==========================================

#[tokio::test]
async fn test_adjacent_intervals_do_not_conflict() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let first = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&first.id, "M001").unwrap();
    api.schedule_production(&first.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();

    // 11:00-13:00 grenzt an [09:00, 11:00) an → zulässig
    let second = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&second.id, "M001").unwrap();
    api.schedule_production(&second.id, test_datetime(2025, 3, 10, 11, 0), 120)
        .unwrap();
}

// ==========================================
// Maschinenvorschlag: Typ passt, frei vor belegt
// ==========================================

#[tokio::test]
async fn test_suggest_machine_prefers_idle() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);
    MachineBuilder::new("M002").insert(&conn);
    // Druckmaschine passt nicht zu Stickaufträgen
    MachineBuilder::new("D001")
        .machine_type(MachineType::Dtf)
        .insert(&conn);

    // M001 fertigt bereits einen Auftrag
    let running = api.create_order(order_input("K001")).unwrap();
    api.accept_order(&running.id, None).await.unwrap();
    api.assign_machine(&running.id, "M001").unwrap();
    api.start_production(&running.id, None).await.unwrap();

    let next = api.create_order(order_input("K001")).unwrap();
    let suggested = api
        .suggest_machine(&next.id, test_datetime(2025, 3, 12, 9, 0), 120)
        .unwrap();

    // M002 ist frei und wird bevorzugt
    assert_eq!(suggested.map(|m| m.id).as_deref(), Some("M002"));
}

#[tokio::test]
async fn test_suggest_machine_falls_back_to_busy() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    // Einzige Maschine fertigt bereits, ist aber im
    // gewünschten Fenster unverplant → Rückfall auf sie
    let running = api.create_order(order_input("K001")).unwrap();
    api.accept_order(&running.id, None).await.unwrap();
    api.assign_machine(&running.id, "M001").unwrap();
    api.start_production(&running.id, None).await.unwrap();

    let next = api.create_order(order_input("K001")).unwrap();
    let suggested = api
        .suggest_machine(&next.id, test_datetime(2025, 4, 1, 9, 0), 120)
        .unwrap();
    assert_eq!(suggested.map(|m| m.id).as_deref(), Some("M001"));
}

#[tokio::test]
async fn test_suggest_machine_none_when_all_conflicting() {
    let conn = test_conn();
    let api = OrderApi::new(conn.clone(), default_settings(), fixed_clock());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let first = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&first.id, "M001").unwrap();
    api.schedule_production(&first.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();

    let next = api.create_order(order_input("K001")).unwrap();
    let suggested = api
        .suggest_machine(&next.id, test_datetime(2025, 3, 10, 10, 0), 60)
        .unwrap();
    assert!(suggested.is_none());
}

// ==========================================
// Verschieben mit Konfliktprüfung
// ==========================================

#[tokio::test]
async fn test_move_block_checks_conflicts() {
    let conn = test_conn();
    let clock = fixed_clock();
    let api = OrderApi::new(conn.clone(), default_settings(), clock.clone());
    let scheduler = stitch_admin::engine::Scheduler::new(conn.clone(), clock.clone());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);
    MachineBuilder::new("M002").insert(&conn);

    let first = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&first.id, "M001").unwrap();
    let first_block = api
        .schedule_production(&first.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();

    let second = api.create_order(order_input("K001")).unwrap();
    api.assign_machine(&second.id, "M002").unwrap();
    api.schedule_production(&second.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();

    // Verschieben auf M002 um 10:00 → Konflikt
    let conflict = scheduler.move_block(&first_block.id, "M002", test_datetime(2025, 3, 10, 10, 0));
    assert!(conflict.is_err());

    // Verschieben auf M002 um 13:00 → ok, Dauer bleibt 120 Minuten
    let moved = scheduler
        .move_block(&first_block.id, "M002", test_datetime(2025, 3, 10, 13, 0))
        .unwrap();
    assert_eq!(moved.machine_id.as_deref(), Some("M002"));
    assert_eq!(moved.duration_minutes(), 120);

    // Verschieben innerhalb des eigenen Zeitfensters (gleicher Block)
    // ist kein Konflikt mit sich selbst
    let self_move = scheduler
        .move_block(&moved.id, "M002", test_datetime(2025, 3, 10, 13, 30))
        .unwrap();
    assert_eq!(self_move.duration_minutes(), 120);
}
