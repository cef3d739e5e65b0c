// ==========================================
// StitchAdmin - Dokumentkaskade
// ==========================================
// Nach Produktionsabschluss: genau eine Packliste
// (Status ready, ein Karton) plus ein Postbuch-Eintrag
// (ausgehend, Entwurf, automatisch angelegt), beide
// wechselseitig verknüpft. Existiert bereits eine
// Packliste zum Auftrag, wird nichts angelegt.
// ==========================================

use crate::domain::clock::Clock;
use crate::domain::order::Order;
use crate::domain::shipping::{PackingItem, PackingList, PostEntry};
use crate::domain::types::{PackingListStatus, PostDirection, PostEntryStatus};
use crate::engine::error::EngineResult;
use crate::repository::{
    ArticleRepository, CustomerRepository, NumberSequences, OrderRepository, ShippingRepository,
};
use chrono::Datelike;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Ergebnis der Kaskade
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub packing_list_id: Option<String>,
    pub post_entry_id: Option<String>,
    pub skipped: bool,
}

/// Dokumentkaskade
pub struct DocumentCascade {
    orders: OrderRepository,
    articles: ArticleRepository,
    customers: CustomerRepository,
    shipping: ShippingRepository,
    numbers: NumberSequences,
    clock: Arc<dyn Clock>,
}

impl DocumentCascade {
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: OrderRepository::from_connection(conn.clone()),
            articles: ArticleRepository::from_connection(conn.clone()),
            customers: CustomerRepository::from_connection(conn.clone()),
            shipping: ShippingRepository::from_connection(conn.clone()),
            numbers: NumberSequences::from_connection(conn),
            clock,
        }
    }

    /// Positions-Snapshot aus den Auftragspositionen
    pub fn snapshot_items(&self, order_id: &str) -> EngineResult<Vec<PackingItem>> {
        let items = self.orders.list_items(order_id)?;
        let mut snapshot = Vec::with_capacity(items.len());
        for item in items {
            let name = match item.article_id.as_deref() {
                Some(article_id) => self
                    .articles
                    .find_by_id(article_id)?
                    .map(|a| a.name)
                    .unwrap_or_else(|| article_id.to_string()),
                None => "Position".to_string(),
            };
            snapshot.push(PackingItem {
                article_id: item.article_id,
                name,
                quantity: item.quantity,
                textile_size: item.textile_size,
                textile_color: item.textile_color,
            });
        }
        Ok(snapshot)
    }

    /// Führt die Kaskade für einen Auftrag aus
    pub fn run_for_order(&self, order: &Order) -> EngineResult<CascadeOutcome> {
        // Bereits vorhandene Packliste → nichts tun
        let existing = self.shipping.list_packing_lists_for_order(&order.id)?;
        if !existing.is_empty() {
            info!(order_id = %order.id, "Packliste existiert bereits, Kaskade übersprungen");
            return Ok(CascadeOutcome {
                packing_list_id: existing.first().map(|l| l.id.clone()),
                post_entry_id: None,
                skipped: true,
            });
        }

        let now = self.clock.now();
        let year = now.date().year();
        let items = self.snapshot_items(&order.id)?;
        let customer = self.customers.find_by_id(&order.customer_id)?;

        // Packliste (ein Karton, sofern der Bediener nichts ändert)
        let packing_list = PackingList {
            id: Uuid::new_v4().to_string(),
            packing_list_number: self.numbers.next_packing_list_number(year)?,
            order_id: Some(order.id.clone()),
            customer_id: Some(order.customer_id.clone()),
            carton_number: 1,
            total_cartons: 1,
            is_partial_delivery: false,
            status: PackingListStatus::Ready,
            items,
            customer_notes: order.customer_notes.clone(),
            packing_notes: None,
            total_weight_kg: None,
            package_length_cm: None,
            package_width_cm: None,
            package_height_cm: None,
            qc_performed: false,
            qc_by: None,
            qc_date: None,
            qc_notes: None,
            qc_photos: vec![],
            packed_by: None,
            packed_at: None,
            inventory_booked: false,
            inventory_booking_date: None,
            delivery_note_id: None,
            post_entry_id: None,
            created_at: now,
            created_by: None,
            updated_at: None,
        };
        self.shipping.insert_packing_list(&packing_list)?;

        // Postbuch-Eintrag (ausgehend, Entwurf)
        let post_entry = PostEntry {
            id: Uuid::new_v4().to_string(),
            entry_number: self.numbers.next_post_entry_number(year)?,
            entry_date: now,
            direction: PostDirection::Outgoing,
            sender: None,
            sender_address: None,
            recipient: customer.as_ref().map(|c| c.display_name()),
            recipient_address: customer.as_ref().map(|c| c.address_block()),
            customer_id: Some(order.customer_id.clone()),
            order_id: Some(order.id.clone()),
            packing_list_id: Some(packing_list.id.clone()),
            delivery_note_id: None,
            tracking_number: None,
            carrier: None,
            status: PostEntryStatus::Draft,
            is_auto_created: true,
            notes: None,
            created_at: now,
            created_by: None,
        };
        self.shipping.insert_post_entry(&post_entry)?;

        // Rückverweis auf beiden Seiten
        let mut linked = packing_list.clone();
        linked.post_entry_id = Some(post_entry.id.clone());
        linked.updated_at = Some(now);
        self.shipping.update_packing_list(&linked)?;

        info!(
            order_id = %order.id,
            packing_list = %linked.packing_list_number,
            post_entry = %post_entry.entry_number,
            "Dokumentkaskade abgeschlossen"
        );

        Ok(CascadeOutcome {
            packing_list_id: Some(linked.id),
            post_entry_id: Some(post_entry.id),
            skipped: false,
        })
    }
}
