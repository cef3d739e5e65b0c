// ==========================================
// StitchAdmin - Verpackungs- und Versandablauf
// ==========================================
// Packlisten-Lebenszyklus:
// draft → ready → qc_passed → packed → shipped
// (ready → packed nur, wenn keine QK-Pflicht besteht)
// Teillieferungen: ein Auftrag kann N Packlisten
// (Karton i/N) haben; der Auftrag gilt erst als
// versendet, wenn ALLE Packlisten versendet sind.
// Versand: created → shipped → delivered; Anlage
// nur für Aufträge im Status ready.
// ==========================================

use crate::config::SettingsReader;
use crate::domain::clock::Clock;
use crate::domain::shipping::{DeliveryNote, PackingItem, PackingList, Shipment};
use crate::domain::types::{
    DeliveryMethod, DeliveryNoteStatus, OrderStatus, PackingListStatus, PostEntryStatus,
    ShipmentStatus,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::workflow::{TransitionContext, WorkflowEngine};
use crate::repository::{
    ArticleRepository, CustomerRepository, NumberSequences, OrderRepository, ShippingRepository,
};
use chrono::Datelike;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Paketdaten beim Verpacken
#[derive(Debug, Clone, Default)]
pub struct PackageDetails {
    pub total_weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
}

/// Verpackungs- und Versand-Engine
pub struct PackingFlowEngine<S: SettingsReader> {
    orders: OrderRepository,
    articles: ArticleRepository,
    customers: CustomerRepository,
    shipping: ShippingRepository,
    numbers: NumberSequences,
    workflow: WorkflowEngine<S>,
    settings: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: SettingsReader> PackingFlowEngine<S> {
    pub fn new(conn: Arc<Mutex<Connection>>, settings: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: OrderRepository::from_connection(conn.clone()),
            articles: ArticleRepository::from_connection(conn.clone()),
            customers: CustomerRepository::from_connection(conn.clone()),
            shipping: ShippingRepository::from_connection(conn.clone()),
            numbers: NumberSequences::from_connection(conn.clone()),
            workflow: WorkflowEngine::new(conn, settings.clone(), clock.clone()),
            settings,
            clock,
        }
    }

    fn reject(list: &PackingList, to: PackingListStatus, reason: &str) -> EngineError {
        EngineError::illegal_transition(list.status.as_str(), to.as_str(), reason)
    }

    // ==========================================
    // Packlisten
    // ==========================================

    /// Legt N Packlisten (Karton 1..N) für einen Auftrag an
    ///
    /// Jeder Eintrag in `cartons` ist der Positions-Snapshot
    /// eines Kartons. Die Listen starten im Status draft.
    pub fn create_packing_lists(
        &self,
        order_id: &str,
        cartons: Vec<Vec<PackingItem>>,
    ) -> EngineResult<Vec<PackingList>> {
        if cartons.is_empty() {
            return Err(EngineError::Validation(
                "Mindestens ein Karton ist erforderlich".to_string(),
            ));
        }
        let order = self.orders.get(order_id)?;
        let now = self.clock.now();
        let year = now.date().year();
        let total = cartons.len() as i64;

        let mut lists = Vec::with_capacity(cartons.len());
        for (index, items) in cartons.into_iter().enumerate() {
            let list = PackingList {
                id: Uuid::new_v4().to_string(),
                packing_list_number: self.numbers.next_packing_list_number(year)?,
                order_id: Some(order.id.clone()),
                customer_id: Some(order.customer_id.clone()),
                carton_number: index as i64 + 1,
                total_cartons: total,
                is_partial_delivery: total > 1,
                status: PackingListStatus::Draft,
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
            self.shipping.insert_packing_list(&list)?;
            lists.push(list);
        }

        info!(order_id = %order_id, cartons = lists.len(), "Packlisten angelegt");
        Ok(lists)
    }

    /// draft → ready: alle Positionen sind Kartons zugeordnet
    pub fn mark_ready(&self, packing_list_id: &str) -> EngineResult<PackingList> {
        let mut list = self.shipping.get_packing_list(packing_list_id)?;
        if list.status != PackingListStatus::Draft {
            return Err(Self::reject(
                &list,
                PackingListStatus::Ready,
                "Nur Entwürfe können freigegeben werden",
            ));
        }
        if list.items.is_empty() {
            return Err(Self::reject(
                &list,
                PackingListStatus::Ready,
                "Packliste hat keine Positionen",
            ));
        }
        list.status = PackingListStatus::Ready;
        list.updated_at = Some(self.clock.now());
        self.shipping.update_packing_list(&list)?;
        Ok(list)
    }

    /// ready → qc_passed: Qualitätskontrolle erfassen
    pub fn record_qc(
        &self,
        packing_list_id: &str,
        qc_by: Option<&str>,
        qc_notes: Option<&str>,
        qc_photos: Vec<String>,
    ) -> EngineResult<PackingList> {
        let mut list = self.shipping.get_packing_list(packing_list_id)?;
        if list.status != PackingListStatus::Ready {
            return Err(Self::reject(
                &list,
                PackingListStatus::QcPassed,
                "Qualitätskontrolle nur im Status 'Bereit zur Verpackung' möglich",
            ));
        }
        let now = self.clock.now();
        list.status = PackingListStatus::QcPassed;
        list.qc_performed = true;
        list.qc_by = qc_by.map(|s| s.to_string());
        list.qc_date = Some(now);
        list.qc_notes = qc_notes.map(|s| s.to_string());
        list.qc_photos = qc_photos;
        list.updated_at = Some(now);
        self.shipping.update_packing_list(&list)?;
        Ok(list)
    }

    /// (ready | qc_passed) → packed
    ///
    /// Bei QK-Pflicht ist Verpacken ohne bestandene QK blockiert.
    /// Beim Eintritt in packed: Lagerbuchung und Lieferschein-
    /// Erstellung gemäß Einstellungen.
    pub async fn mark_packed(
        &self,
        packing_list_id: &str,
        details: PackageDetails,
        packed_by: Option<&str>,
    ) -> EngineResult<PackingList> {
        let mut list = self.shipping.get_packing_list(packing_list_id)?;
        let settings = self
            .settings
            .get_settings()
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        match list.status {
            PackingListStatus::QcPassed => {}
            PackingListStatus::Ready => {
                if settings.require_qc_before_packing {
                    return Err(Self::reject(
                        &list,
                        PackingListStatus::Packed,
                        "Qualitätskontrolle ist vor dem Verpacken erforderlich",
                    ));
                }
            }
            _ => {
                return Err(Self::reject(
                    &list,
                    PackingListStatus::Packed,
                    "Packliste ist nicht bereit zum Verpacken",
                ));
            }
        }

        let now = self.clock.now();
        list.status = PackingListStatus::Packed;
        list.total_weight_kg = details.total_weight_kg;
        list.package_length_cm = details.length_cm;
        list.package_width_cm = details.width_cm;
        list.package_height_cm = details.height_cm;
        list.packed_by = packed_by.map(|s| s.to_string());
        list.packed_at = Some(now);
        list.updated_at = Some(now);

        // Lagerbuchung: verpackte Artikel vom Bestand abziehen
        if settings.auto_inventory_booking && !list.inventory_booked {
            for item in &list.items {
                if let Some(article_id) = item.article_id.as_deref() {
                    if let Err(e) = self.articles.adjust_stock(article_id, -item.quantity) {
                        warn!(
                            packing_list = %list.packing_list_number,
                            article_id = %article_id,
                            error = %e,
                            "Lagerbuchung fehlgeschlagen"
                        );
                    }
                }
            }
            list.inventory_booked = true;
            list.inventory_booking_date = Some(now);
        }

        self.shipping.update_packing_list(&list)?;

        // Lieferschein automatisch erzeugen
        if settings.auto_create_delivery_note && list.delivery_note_id.is_none() {
            match self.create_delivery_note(&list.id) {
                Ok(note) => {
                    info!(
                        packing_list = %list.packing_list_number,
                        delivery_note = %note.delivery_note_number,
                        "Lieferschein automatisch erstellt"
                    );
                    list = self.shipping.get_packing_list(&list.id)?;
                }
                Err(e) => {
                    warn!(
                        packing_list = %list.packing_list_number,
                        error = %e,
                        "Automatische Lieferschein-Erstellung fehlgeschlagen"
                    );
                }
            }
        }

        Ok(list)
    }

    /// packed → shipped; schließt den Auftrag ab, sobald
    /// alle Packlisten versendet sind
    pub async fn mark_shipped(
        &self,
        packing_list_id: &str,
        changed_by: Option<&str>,
    ) -> EngineResult<PackingList> {
        let mut list = self.shipping.get_packing_list(packing_list_id)?;
        if list.status != PackingListStatus::Packed {
            return Err(Self::reject(
                &list,
                PackingListStatus::Shipped,
                "Nur verpackte Packlisten können versendet werden",
            ));
        }
        let now = self.clock.now();
        list.status = PackingListStatus::Shipped;
        list.updated_at = Some(now);
        self.shipping.update_packing_list(&list)?;

        if let Some(order_id) = list.order_id.clone() {
            self.complete_order_if_fully_shipped(&order_id, changed_by)
                .await?;
        }

        Ok(list)
    }

    /// Auftrag abschließen, wenn alle Packlisten versendet sind
    async fn complete_order_if_fully_shipped(
        &self,
        order_id: &str,
        changed_by: Option<&str>,
    ) -> EngineResult<()> {
        let lists = self.shipping.list_packing_lists_for_order(order_id)?;
        let all_shipped = lists
            .iter()
            .all(|l| l.status == PackingListStatus::Shipped);
        if !all_shipped {
            info!(order_id = %order_id, "Noch nicht alle Kartons versendet, Auftrag bleibt offen");
            return Ok(());
        }

        let order = self.orders.get(order_id)?;
        if order.status != OrderStatus::Ready {
            return Ok(());
        }

        self.workflow
            .transition(
                order_id,
                OrderStatus::Completed,
                TransitionContext {
                    comment: Some("Alle Kartons versendet".to_string()),
                    changed_by: changed_by.map(|s| s.to_string()),
                },
            )
            .await?;
        Ok(())
    }

    // ==========================================
    // Lieferscheine
    // ==========================================

    /// Erstellt einen Lieferschein aus einer Packliste
    pub fn create_delivery_note(&self, packing_list_id: &str) -> EngineResult<DeliveryNote> {
        let mut list = self.shipping.get_packing_list(packing_list_id)?;
        let now = self.clock.now();
        let year = now.date().year();

        let note = DeliveryNote {
            id: Uuid::new_v4().to_string(),
            delivery_note_number: self.numbers.next_delivery_note_number(year)?,
            order_id: list.order_id.clone(),
            packing_list_id: Some(list.id.clone()),
            customer_id: list.customer_id.clone(),
            post_entry_id: list.post_entry_id.clone(),
            delivery_date: now.date(),
            items: list.items.clone(),
            notes: None,
            delivery_method: DeliveryMethod::Shipping,
            signature_image: None,
            signature_name: None,
            signature_date: None,
            signature_device: None,
            status: DeliveryNoteStatus::Ready,
            created_at: now,
            created_by: list.packed_by.clone(),
            updated_at: None,
        };
        self.shipping.insert_delivery_note(&note)?;

        // Rückverweis an der Packliste
        list.delivery_note_id = Some(note.id.clone());
        list.updated_at = Some(now);
        self.shipping.update_packing_list(&list)?;

        // Postbuch-Eintrag verknüpfen (falls vorhanden)
        if let Some(post_entry_id) = list.post_entry_id.as_deref() {
            self.shipping.link_post_entry_delivery_note(
                post_entry_id,
                &note.id,
                PostEntryStatus::InProgress,
            )?;
        }

        Ok(note)
    }

    /// Erfasst die Empfänger-Unterschrift auf einem Lieferschein
    pub fn record_signature(
        &self,
        delivery_note_id: &str,
        signature_image: Option<&str>,
        signature_name: &str,
        signature_device: Option<&str>,
    ) -> EngineResult<DeliveryNote> {
        let mut note = self.shipping.get_delivery_note(delivery_note_id)?;
        let now = self.clock.now();
        note.signature_image = signature_image.map(|s| s.to_string());
        note.signature_name = Some(signature_name.to_string());
        note.signature_date = Some(now);
        note.signature_device = signature_device.map(|s| s.to_string());
        note.status = DeliveryNoteStatus::Signed;
        note.updated_at = Some(now);
        self.shipping.update_delivery_note(&note)?;
        Ok(note)
    }

    // ==========================================
    // Versand
    // ==========================================

    /// Legt einen Versand an; der Auftrag muss im Status ready sein
    pub fn create_shipment(
        &self,
        order_id: &str,
        carrier: Option<&str>,
        tracking_number: Option<&str>,
    ) -> EngineResult<Shipment> {
        let order = self.orders.get(order_id)?;
        if order.status != OrderStatus::Ready {
            return Err(EngineError::Validation(format!(
                "Versand nur für versandbereite Aufträge möglich (Status: {})",
                order.status.label_de()
            )));
        }

        let customer = self.customers.find_by_id(&order.customer_id)?;
        let now = self.clock.now();
        let year = now.date().year();

        let shipment = Shipment {
            id: self.numbers.next_shipment_id(year)?,
            order_id: order.id.clone(),
            carrier: carrier.map(|s| s.to_string()),
            tracking_number: tracking_number.map(|s| s.to_string()),
            weight_kg: None,
            length_cm: None,
            width_cm: None,
            height_cm: None,
            recipient_name: customer.as_ref().map(|c| c.display_name()),
            recipient_street: customer.as_ref().and_then(|c| c.street.clone()),
            recipient_postal_code: customer.as_ref().and_then(|c| c.postal_code.clone()),
            recipient_city: customer.as_ref().and_then(|c| c.city.clone()),
            recipient_country: customer.as_ref().and_then(|c| c.country.clone()),
            status: ShipmentStatus::Created,
            shipped_date: None,
            delivered_date: None,
            created_at: now,
            created_by: None,
            updated_at: None,
        };
        self.shipping.insert_shipment(&shipment)?;
        info!(order_id = %order_id, shipment_id = %shipment.id, "Versand angelegt");
        Ok(shipment)
    }

    /// created → shipped: markiert zugehörige verpackte Packlisten
    /// als versendet und schließt den Auftrag ab, sobald alle
    /// Packlisten versendet sind
    pub async fn mark_shipment_shipped(
        &self,
        shipment_id: &str,
        changed_by: Option<&str>,
    ) -> EngineResult<Shipment> {
        let mut shipment = self.shipping.get_shipment(shipment_id)?;
        if shipment.status != ShipmentStatus::Created {
            return Err(EngineError::illegal_transition(
                shipment.status.as_str(),
                ShipmentStatus::Shipped.as_str(),
                "Versand wurde bereits verschickt",
            ));
        }
        let now = self.clock.now();
        shipment.status = ShipmentStatus::Shipped;
        shipment.shipped_date = Some(now);
        shipment.updated_at = Some(now);
        self.shipping.update_shipment(&shipment)?;

        // Verpackte Packlisten des Auftrags gelten nun als versendet
        let lists = self
            .shipping
            .list_packing_lists_for_order(&shipment.order_id)?;
        for mut list in lists {
            if list.status == PackingListStatus::Packed {
                list.status = PackingListStatus::Shipped;
                list.updated_at = Some(now);
                self.shipping.update_packing_list(&list)?;
            }
        }

        self.complete_order_if_fully_shipped(&shipment.order_id, changed_by)
            .await?;

        Ok(shipment)
    }

    /// shipped → delivered
    pub fn mark_shipment_delivered(&self, shipment_id: &str) -> EngineResult<Shipment> {
        let mut shipment = self.shipping.get_shipment(shipment_id)?;
        if shipment.status != ShipmentStatus::Shipped {
            return Err(EngineError::illegal_transition(
                shipment.status.as_str(),
                ShipmentStatus::Delivered.as_str(),
                "Nur verschickte Sendungen können zugestellt werden",
            ));
        }
        let now = self.clock.now();
        shipment.status = ShipmentStatus::Delivered;
        shipment.delivered_date = Some(now);
        shipment.updated_at = Some(now);
        self.shipping.update_shipment(&shipment)?;
        Ok(shipment)
    }
}
