// ==========================================
// Gesamtablauf - End-to-End-Tests
// ==========================================
// Szenario A: Einzeldesign vom Auftrag bis zur
// automatischen Packliste (Dokumentkaskade).
// Szenario B: Multi-Position-Auftrag mit
// Personalisierung und automatischer Garnbuchung.
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use stitch_admin::api::{
    NewOrder, NewOrderDesign, NewOrderItem, OrderApi, PersonalizationEntry, ShippingApi,
};
use stitch_admin::domain::design::DesignThreadColor;
use stitch_admin::domain::types::{
    DesignStatus, DesignType, OrderStatus, OrderType, PackingListStatus, PostDirection,
};
use stitch_admin::repository::ThreadRepository;

// ==========================================
// Szenario A: Happy Path mit Dokumentkaskade
// ==========================================

#[tokio::test]
async fn test_single_design_order_to_packing_list() {
    let conn = test_conn();
    let clock = fixed_clock();
    let settings = default_settings();
    let api = OrderApi::new(conn.clone(), settings.clone(), clock.clone());
    let shipping = ShippingApi::new(conn.clone(), settings.clone(), clock.clone());

    CustomerBuilder::new("K001").company("Müller GmbH").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let order = api
        .create_order(NewOrder {
            customer_id: "K001".to_string(),
            order_type: OrderType::Embroidery,
            description: Some("Poloshirts mit Logo".to_string()),
            customer_notes: None,
            design_status: DesignStatus::CustomerProvided,
            design_file_path: Some("designs/logo.dst".to_string()),
            stitch_count: Some(6000),
            due_date: Some(test_datetime(2025, 3, 20, 12, 0)),
            rush_order: false,
            items: vec![NewOrderItem {
                article_id: Some("ART001".to_string()),
                quantity: 10,
                unit_price: 20.0,
                textile_size: Some("L".to_string()),
                textile_color: Some("Navy".to_string()),
            }],
            designs: vec![],
            created_by: Some("tester".to_string()),
        })
        .unwrap();
    assert_eq!(order.id, "A2025-001");
    assert_eq!(order.total_price, 200.0);

    api.accept_order(&order.id, Some("tester")).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();
    api.schedule_production(&order.id, test_datetime(2025, 3, 10, 9, 0), 120)
        .unwrap();
    api.start_production(&order.id, Some("tester")).await.unwrap();

    clock.advance_minutes(120);
    let ready = api.finish_production(&order.id, Some("tester")).await.unwrap();
    assert_eq!(ready.status, OrderStatus::Ready);
    assert_eq!(ready.production_minutes, Some(120));

    // Kaskade: genau eine Packliste mit 10 Stück
    let lists = shipping.packing_lists_for_order(&order.id).unwrap();
    assert_eq!(lists.len(), 1);
    let list = &lists[0];
    assert_eq!(list.packing_list_number, "PL-2025-0001");
    assert_eq!(list.status, PackingListStatus::Ready);
    assert_eq!(list.total_quantity(), 10);
    assert_eq!(list.carton_number, 1);
    assert!(!list.is_partial_delivery);

    // Genau ein Postbuch-Eintrag, wechselseitig verknüpft
    let entries = shipping.post_entries_for_order(&order.id).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.direction, PostDirection::Outgoing);
    assert!(entry.is_auto_created);
    assert_eq!(entry.packing_list_id.as_deref(), Some(list.id.as_str()));
    assert_eq!(list.post_entry_id.as_deref(), Some(entry.id.as_str()));
    assert_eq!(entry.recipient.as_deref(), Some("Müller GmbH"));

    // Historie: Anlage + draft→accepted→in_progress→ready = 4 Einträge
    let details = api.order_details(&order.id).unwrap();
    assert_eq!(details.history.len(), 4);
    assert_eq!(details.history[0].from_status, Some(OrderStatus::Draft));
    assert_eq!(details.history[3].to_status, OrderStatus::Ready);
}

// ==========================================
// Kaskade läuft nicht doppelt
// ==========================================

#[tokio::test]
async fn test_cascade_not_duplicated() {
    let conn = test_conn();
    let clock = fixed_clock();
    let settings = default_settings();
    let api = OrderApi::new(conn.clone(), settings.clone(), clock.clone());
    let shipping = ShippingApi::new(conn.clone(), settings.clone(), clock.clone());

    CustomerBuilder::new("K001").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    let order = api
        .create_order(NewOrder {
            customer_id: "K001".to_string(),
            order_type: OrderType::Embroidery,
            description: None,
            customer_notes: None,
            design_status: DesignStatus::CustomerProvided,
            design_file_path: Some("designs/logo.dst".to_string()),
            stitch_count: Some(2000),
            due_date: None,
            rush_order: false,
            items: vec![NewOrderItem {
                article_id: Some("ART001".to_string()),
                quantity: 5,
                unit_price: 10.0,
                textile_size: None,
                textile_color: None,
            }],
            designs: vec![],
            created_by: None,
        })
        .unwrap();

    api.accept_order(&order.id, None).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();
    api.start_production(&order.id, None).await.unwrap();
    api.finish_production(&order.id, None).await.unwrap();

    // Eine bereits vorhandene Packliste bleibt die einzige
    let before = shipping.packing_lists_for_order(&order.id).unwrap();
    assert_eq!(before.len(), 1);
}

// ==========================================
// Szenario B: Multi-Position mit Personalisierung
// ==========================================

#[tokio::test]
async fn test_multi_position_personalized_order() {
    let conn = test_conn();
    let clock = fixed_clock();
    let settings = default_settings();
    let api = OrderApi::new(conn.clone(), settings.clone(), clock.clone());

    CustomerBuilder::new("K001").company("Alpenverein e.V.").insert(&conn);
    ArticleBuilder::new("ART001").insert(&conn);
    MachineBuilder::new("M001").insert(&conn);

    // Zwei Garne mit Bestand
    ThreadBuilder::new("G-ROT", "1147")
        .color_name("Rot")
        .stock(100.0)
        .insert(&conn);
    ThreadBuilder::new("G-GOLD", "1070")
        .color_name("Gold")
        .stock(100.0)
        .insert(&conn);

    let names = [
        "Max", "Anna", "Peter", "Lena", "Jonas", "Marie", "Paul", "Laura", "Felix", "Sophie",
        "Tim", "Julia", "David", "Emma", "Lukas", "Mia",
    ];

    // 16 Shirts, Brust links personalisiert, Rücken-Sammeldesign
    let order = api
        .create_order(NewOrder {
            customer_id: "K001".to_string(),
            order_type: OrderType::Embroidery,
            description: Some("Alpentour 2025".to_string()),
            customer_notes: None,
            design_status: DesignStatus::Ready,
            design_file_path: None,
            stitch_count: Some(8000),
            due_date: None,
            rush_order: false,
            items: (0..16)
                .map(|_| NewOrderItem {
                    article_id: Some("ART001".to_string()),
                    quantity: 1,
                    unit_price: 22.0,
                    textile_size: Some("L".to_string()),
                    textile_color: Some("Rot".to_string()),
                })
                .collect(),
            designs: vec![
                NewOrderDesign {
                    position: "brust_links".to_string(),
                    design_type: DesignType::Stick,
                    is_personalized: true,
                    design_file_path: Some("designs/name.dst".to_string()),
                    design_name: Some("Name".to_string()),
                    stitch_count: Some(1200),
                    width_mm: Some(80.0),
                    height_mm: Some(20.0),
                    thread_colors: vec![DesignThreadColor {
                        thread_id: Some("G-ROT".to_string()),
                        color_name: "Rot".to_string(),
                        color_number: Some("1147".to_string()),
                    }],
                    approval_required: false,
                    setup_price: 15.0,
                    price_per_piece: 2.5,
                },
                NewOrderDesign {
                    position: "ruecken".to_string(),
                    design_type: DesignType::Stick,
                    is_personalized: false,
                    design_file_path: Some("designs/ruecken.dst".to_string()),
                    design_name: Some("Alpentour 2025 mit Namensliste".to_string()),
                    stitch_count: Some(6800),
                    width_mm: Some(250.0),
                    height_mm: Some(180.0),
                    thread_colors: vec![DesignThreadColor {
                        thread_id: Some("G-GOLD".to_string()),
                        color_name: "Gold".to_string(),
                        color_number: Some("1070".to_string()),
                    }],
                    approval_required: false,
                    setup_price: 30.0,
                    price_per_piece: 4.0,
                },
            ],
            created_by: None,
        })
        .unwrap();

    // Preis: 16×22 + (15 + 16×2.5) + (30 + 16×4.0) = 352 + 55 + 94 = 501
    assert_eq!(order.total_price, 501.0);

    // Personalisierungen in Produktionsreihenfolge anlegen
    let details = api.order_details(&order.id).unwrap();
    let brust_design = details
        .designs
        .iter()
        .find(|d| d.position == "brust_links")
        .unwrap();
    let entries: Vec<PersonalizationEntry> = details
        .items
        .iter()
        .zip(names.iter())
        .enumerate()
        .map(|(index, (item, name))| PersonalizationEntry {
            order_item_id: item.id,
            text_line_1: Some(name.to_string()),
            text_line_2: None,
            text_line_3: None,
            sequence_number: Some(index as i64 + 1),
        })
        .collect();
    let created = api.add_personalizations(&brust_design.id, entries).unwrap();
    assert_eq!(created, 16);

    // Produktion durchfahren
    api.accept_order(&order.id, None).await.unwrap();
    api.assign_machine(&order.id, "M001").unwrap();
    api.start_production(&order.id, None).await.unwrap();
    clock.advance_minutes(240);
    api.finish_production(&order.id, None).await.unwrap();

    // Garnbuchung: 8000 × 0.5 mm × 1.1 = 4.4 m, je Farbe 2.2 m
    let repo = ThreadRepository::from_connection(conn.clone());
    let usage_rot = repo.list_usage_for_order(&order.id).unwrap();
    assert_eq!(usage_rot.len(), 2);
    for usage in &usage_rot {
        assert!((usage.quantity_m - 2.2).abs() < 1e-9);
    }
    assert!((repo.get_stock("G-ROT").unwrap().quantity_m - 97.8).abs() < 1e-9);
    assert!((repo.get_stock("G-GOLD").unwrap().quantity_m - 97.8).abs() < 1e-9);

    // 16 Personalisierungen in sequence_number-Reihenfolge, gefertigt
    let personalizations = api.personalizations_in_sequence(&brust_design.id).unwrap();
    assert_eq!(personalizations.len(), 16);
    for (index, p) in personalizations.iter().enumerate() {
        assert_eq!(p.sequence_number, Some(index as i64 + 1));
        assert!(p.is_produced);
    }
    assert_eq!(personalizations[0].text_line_1.as_deref(), Some("Max"));
    assert_eq!(personalizations[15].text_line_1.as_deref(), Some("Mia"));
}
