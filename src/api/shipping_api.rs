// ==========================================
// StitchAdmin - Versand-API
// ==========================================
// Dünne Fassade über der Verpackungs-/Versand-
// Engine: Kartonaufteilung, QK, Verpacken,
// Lieferschein, Versand.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsReader;
use crate::domain::clock::Clock;
use crate::domain::shipping::{DeliveryNote, PackingItem, PackingList, PostEntry, Shipment};
use crate::engine::document_cascade::DocumentCascade;
use crate::engine::packing_flow::{PackageDetails, PackingFlowEngine};
use crate::repository::ShippingRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Versand-API
pub struct ShippingApi<S: SettingsReader> {
    flow: PackingFlowEngine<S>,
    cascade: DocumentCascade,
    shipping: ShippingRepository,
}

impl<S: SettingsReader> ShippingApi<S> {
    pub fn new(conn: Arc<Mutex<Connection>>, settings: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            flow: PackingFlowEngine::new(conn.clone(), settings, clock.clone()),
            cascade: DocumentCascade::new(conn.clone(), clock),
            shipping: ShippingRepository::from_connection(conn),
        }
    }

    /// Teilt die Auftragspositionen in Kartons fester Größe auf
    /// (letzter Karton trägt den Rest) und legt die Packlisten an
    pub fn split_into_cartons(
        &self,
        order_id: &str,
        units_per_carton: i64,
    ) -> ApiResult<Vec<PackingList>> {
        if units_per_carton <= 0 {
            return Err(ApiError::InvalidInput(
                "Kartongröße muss größer als 0 sein".to_string(),
            ));
        }

        let items = self.cascade.snapshot_items(order_id)?;
        if items.is_empty() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "Auftrag {} hat keine Positionen",
                order_id
            )));
        }

        // Stückweise auf Kartons verteilen
        let mut cartons: Vec<Vec<PackingItem>> = Vec::new();
        let mut current: Vec<PackingItem> = Vec::new();
        let mut remaining_in_carton = units_per_carton;

        for item in items {
            let mut quantity_left = item.quantity;
            while quantity_left > 0 {
                let take = quantity_left.min(remaining_in_carton);
                current.push(PackingItem {
                    quantity: take,
                    ..item.clone()
                });
                quantity_left -= take;
                remaining_in_carton -= take;
                if remaining_in_carton == 0 {
                    cartons.push(std::mem::take(&mut current));
                    remaining_in_carton = units_per_carton;
                }
            }
        }
        if !current.is_empty() {
            cartons.push(current);
        }

        Ok(self.flow.create_packing_lists(order_id, cartons)?)
    }

    /// Legt eine einzelne Packliste mit vorgegebenem Inhalt an
    pub fn create_packing_lists(
        &self,
        order_id: &str,
        cartons: Vec<Vec<PackingItem>>,
    ) -> ApiResult<Vec<PackingList>> {
        Ok(self.flow.create_packing_lists(order_id, cartons)?)
    }

    pub fn mark_ready(&self, packing_list_id: &str) -> ApiResult<PackingList> {
        Ok(self.flow.mark_ready(packing_list_id)?)
    }

    pub fn record_qc(
        &self,
        packing_list_id: &str,
        qc_by: Option<&str>,
        qc_notes: Option<&str>,
        qc_photos: Vec<String>,
    ) -> ApiResult<PackingList> {
        Ok(self.flow.record_qc(packing_list_id, qc_by, qc_notes, qc_photos)?)
    }

    pub async fn mark_packed(
        &self,
        packing_list_id: &str,
        details: PackageDetails,
        packed_by: Option<&str>,
    ) -> ApiResult<PackingList> {
        Ok(self.flow.mark_packed(packing_list_id, details, packed_by).await?)
    }

    pub async fn mark_shipped(
        &self,
        packing_list_id: &str,
        changed_by: Option<&str>,
    ) -> ApiResult<PackingList> {
        Ok(self.flow.mark_shipped(packing_list_id, changed_by).await?)
    }

    pub fn create_delivery_note(&self, packing_list_id: &str) -> ApiResult<DeliveryNote> {
        Ok(self.flow.create_delivery_note(packing_list_id)?)
    }

    pub fn record_signature(
        &self,
        delivery_note_id: &str,
        signature_image: Option<&str>,
        signature_name: &str,
        signature_device: Option<&str>,
    ) -> ApiResult<DeliveryNote> {
        Ok(self.flow.record_signature(
            delivery_note_id,
            signature_image,
            signature_name,
            signature_device,
        )?)
    }

    pub fn create_shipment(
        &self,
        order_id: &str,
        carrier: Option<&str>,
        tracking_number: Option<&str>,
    ) -> ApiResult<Shipment> {
        Ok(self.flow.create_shipment(order_id, carrier, tracking_number)?)
    }

    pub async fn mark_shipment_shipped(
        &self,
        shipment_id: &str,
        changed_by: Option<&str>,
    ) -> ApiResult<Shipment> {
        Ok(self.flow.mark_shipment_shipped(shipment_id, changed_by).await?)
    }

    pub fn mark_shipment_delivered(&self, shipment_id: &str) -> ApiResult<Shipment> {
        Ok(self.flow.mark_shipment_delivered(shipment_id)?)
    }

    // ==========================================
    // Abfragen
    // ==========================================

    pub fn packing_lists_for_order(&self, order_id: &str) -> ApiResult<Vec<PackingList>> {
        Ok(self.shipping.list_packing_lists_for_order(order_id)?)
    }

    pub fn post_entries_for_order(&self, order_id: &str) -> ApiResult<Vec<PostEntry>> {
        Ok(self.shipping.list_post_entries_for_order(order_id)?)
    }

    pub fn shipments_for_order(&self, order_id: &str) -> ApiResult<Vec<Shipment>> {
        Ok(self.shipping.list_shipments_for_order(order_id)?)
    }

    pub fn packing_list(&self, packing_list_id: &str) -> ApiResult<PackingList> {
        Ok(self.shipping.get_packing_list(packing_list_id)?)
    }

    pub fn delivery_note(&self, delivery_note_id: &str) -> ApiResult<DeliveryNote> {
        Ok(self.shipping.get_delivery_note(delivery_note_id)?)
    }
}
