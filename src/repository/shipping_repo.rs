// ==========================================
// StitchAdmin - Versand-Repository
// ==========================================
// packing_lists, delivery_notes, post_entries
// und shipments. Positions-Snapshots liegen
// als JSON in der items-Spalte.
// ==========================================

use crate::domain::shipping::{DeliveryNote, PackingItem, PackingList, PostEntry, Shipment};
use crate::domain::types::{
    DeliveryMethod, DeliveryNoteStatus, PackingListStatus, PostDirection, PostEntryStatus,
    ShipmentStatus,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_datetime, opt_datetime, parse_date, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const PACKING_COLUMNS: &str = "id, packing_list_number, order_id, customer_id, carton_number, \
     total_cartons, is_partial_delivery, status, items, customer_notes, packing_notes, \
     total_weight_kg, package_length_cm, package_width_cm, package_height_cm, qc_performed, \
     qc_by, qc_date, qc_notes, qc_photos, packed_by, packed_at, inventory_booked, \
     inventory_booking_date, delivery_note_id, post_entry_id, created_at, created_by, updated_at";

const DELIVERY_COLUMNS: &str = "id, delivery_note_number, order_id, packing_list_id, \
     customer_id, post_entry_id, delivery_date, items, notes, delivery_method, \
     signature_image, signature_name, signature_date, signature_device, status, \
     created_at, created_by, updated_at";

const POST_COLUMNS: &str = "id, entry_number, entry_date, direction, sender, sender_address, \
     recipient, recipient_address, customer_id, order_id, packing_list_id, delivery_note_id, \
     tracking_number, carrier, status, is_auto_created, notes, created_at, created_by";

const SHIPMENT_COLUMNS: &str = "id, order_id, carrier, tracking_number, weight_kg, length_cm, \
     width_cm, height_cm, recipient_name, recipient_street, recipient_postal_code, \
     recipient_city, recipient_country, status, shipped_date, delivered_date, created_at, \
     created_by, updated_at";

fn items_to_json(items: &[PackingItem]) -> RepositoryResult<String> {
    serde_json::to_string(items).map_err(|e| RepositoryError::InternalError(e.to_string()))
}

fn items_from_json(raw: Option<String>) -> Vec<PackingItem> {
    raw.and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

fn photos_from_json(raw: Option<String>) -> Vec<String> {
    raw.and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Versand-Repository
pub struct ShippingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShippingRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_packing_list(row: &Row<'_>) -> SqliteResult<PackingList> {
        Ok(PackingList {
            id: row.get(0)?,
            packing_list_number: row.get(1)?,
            order_id: row.get(2)?,
            customer_id: row.get(3)?,
            carton_number: row.get(4)?,
            total_cartons: row.get(5)?,
            is_partial_delivery: row.get::<_, i64>(6)? != 0,
            status: PackingListStatus::parse(&row.get::<_, String>(7)?)
                .unwrap_or(PackingListStatus::Draft),
            items: items_from_json(row.get(8)?),
            customer_notes: row.get(9)?,
            packing_notes: row.get(10)?,
            total_weight_kg: row.get(11)?,
            package_length_cm: row.get(12)?,
            package_width_cm: row.get(13)?,
            package_height_cm: row.get(14)?,
            qc_performed: row.get::<_, i64>(15)? != 0,
            qc_by: row.get(16)?,
            qc_date: opt_datetime(row.get(17)?),
            qc_notes: row.get(18)?,
            qc_photos: photos_from_json(row.get(19)?),
            packed_by: row.get(20)?,
            packed_at: opt_datetime(row.get(21)?),
            inventory_booked: row.get::<_, i64>(22)? != 0,
            inventory_booking_date: opt_datetime(row.get(23)?),
            delivery_note_id: row.get(24)?,
            post_entry_id: row.get(25)?,
            created_at: parse_datetime(&row.get::<_, String>(26)?),
            created_by: row.get(27)?,
            updated_at: opt_datetime(row.get(28)?),
        })
    }

    fn map_delivery_note(row: &Row<'_>) -> SqliteResult<DeliveryNote> {
        Ok(DeliveryNote {
            id: row.get(0)?,
            delivery_note_number: row.get(1)?,
            order_id: row.get(2)?,
            packing_list_id: row.get(3)?,
            customer_id: row.get(4)?,
            post_entry_id: row.get(5)?,
            delivery_date: parse_date(&row.get::<_, String>(6)?),
            items: items_from_json(row.get(7)?),
            notes: row.get(8)?,
            delivery_method: DeliveryMethod::parse(&row.get::<_, String>(9)?)
                .unwrap_or(DeliveryMethod::Shipping),
            signature_image: row.get(10)?,
            signature_name: row.get(11)?,
            signature_date: opt_datetime(row.get(12)?),
            signature_device: row.get(13)?,
            status: DeliveryNoteStatus::parse(&row.get::<_, String>(14)?)
                .unwrap_or(DeliveryNoteStatus::Draft),
            created_at: parse_datetime(&row.get::<_, String>(15)?),
            created_by: row.get(16)?,
            updated_at: opt_datetime(row.get(17)?),
        })
    }

    fn map_post_entry(row: &Row<'_>) -> SqliteResult<PostEntry> {
        Ok(PostEntry {
            id: row.get(0)?,
            entry_number: row.get(1)?,
            entry_date: parse_datetime(&row.get::<_, String>(2)?),
            direction: PostDirection::parse(&row.get::<_, String>(3)?)
                .unwrap_or(PostDirection::Outgoing),
            sender: row.get(4)?,
            sender_address: row.get(5)?,
            recipient: row.get(6)?,
            recipient_address: row.get(7)?,
            customer_id: row.get(8)?,
            order_id: row.get(9)?,
            packing_list_id: row.get(10)?,
            delivery_note_id: row.get(11)?,
            tracking_number: row.get(12)?,
            carrier: row.get(13)?,
            status: PostEntryStatus::parse(&row.get::<_, String>(14)?)
                .unwrap_or(PostEntryStatus::Draft),
            is_auto_created: row.get::<_, i64>(15)? != 0,
            notes: row.get(16)?,
            created_at: parse_datetime(&row.get::<_, String>(17)?),
            created_by: row.get(18)?,
        })
    }

    fn map_shipment(row: &Row<'_>) -> SqliteResult<Shipment> {
        Ok(Shipment {
            id: row.get(0)?,
            order_id: row.get(1)?,
            carrier: row.get(2)?,
            tracking_number: row.get(3)?,
            weight_kg: row.get(4)?,
            length_cm: row.get(5)?,
            width_cm: row.get(6)?,
            height_cm: row.get(7)?,
            recipient_name: row.get(8)?,
            recipient_street: row.get(9)?,
            recipient_postal_code: row.get(10)?,
            recipient_city: row.get(11)?,
            recipient_country: row.get(12)?,
            status: ShipmentStatus::parse(&row.get::<_, String>(13)?)
                .unwrap_or(ShipmentStatus::Created),
            shipped_date: opt_datetime(row.get(14)?),
            delivered_date: opt_datetime(row.get(15)?),
            created_at: parse_datetime(&row.get::<_, String>(16)?),
            created_by: row.get(17)?,
            updated_at: opt_datetime(row.get(18)?),
        })
    }

    // ==========================================
    // Packlisten
    // ==========================================

    pub fn insert_packing_list(&self, list: &PackingList) -> RepositoryResult<()> {
        let items_json = items_to_json(&list.items)?;
        let photos_json = serde_json::to_string(&list.qc_photos)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO packing_lists (
                id, packing_list_number, order_id, customer_id, carton_number,
                total_cartons, is_partial_delivery, status, items, customer_notes,
                packing_notes, total_weight_kg, package_length_cm, package_width_cm,
                package_height_cm, qc_performed, qc_by, qc_date, qc_notes, qc_photos,
                packed_by, packed_at, inventory_booked, inventory_booking_date,
                delivery_note_id, post_entry_id, created_at, created_by, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)
            "#,
            params![
                list.id,
                list.packing_list_number,
                list.order_id,
                list.customer_id,
                list.carton_number,
                list.total_cartons,
                list.is_partial_delivery as i64,
                list.status.as_str(),
                items_json,
                list.customer_notes,
                list.packing_notes,
                list.total_weight_kg,
                list.package_length_cm,
                list.package_width_cm,
                list.package_height_cm,
                list.qc_performed as i64,
                list.qc_by,
                list.qc_date.as_ref().map(fmt_datetime),
                list.qc_notes,
                photos_json,
                list.packed_by,
                list.packed_at.as_ref().map(fmt_datetime),
                list.inventory_booked as i64,
                list.inventory_booking_date.as_ref().map(fmt_datetime),
                list.delivery_note_id,
                list.post_entry_id,
                fmt_datetime(&list.created_at),
                list.created_by,
                list.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_packing_list(&self, id: &str) -> RepositoryResult<Option<PackingList>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM packing_lists WHERE id = ?1",
            PACKING_COLUMNS
        ))?;
        let list = stmt
            .query_row(params![id], Self::map_packing_list)
            .optional()?;
        Ok(list)
    }

    pub fn get_packing_list(&self, id: &str) -> RepositoryResult<PackingList> {
        self.find_packing_list(id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Packliste".to_string(),
                id: id.to_string(),
            })
    }

    pub fn update_packing_list(&self, list: &PackingList) -> RepositoryResult<()> {
        let items_json = items_to_json(&list.items)?;
        let photos_json = serde_json::to_string(&list.qc_photos)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE packing_lists SET
                carton_number = ?2, total_cartons = ?3, is_partial_delivery = ?4,
                status = ?5, items = ?6, customer_notes = ?7, packing_notes = ?8,
                total_weight_kg = ?9, package_length_cm = ?10, package_width_cm = ?11,
                package_height_cm = ?12, qc_performed = ?13, qc_by = ?14, qc_date = ?15,
                qc_notes = ?16, qc_photos = ?17, packed_by = ?18, packed_at = ?19,
                inventory_booked = ?20, inventory_booking_date = ?21,
                delivery_note_id = ?22, post_entry_id = ?23, updated_at = ?24
            WHERE id = ?1
            "#,
            params![
                list.id,
                list.carton_number,
                list.total_cartons,
                list.is_partial_delivery as i64,
                list.status.as_str(),
                items_json,
                list.customer_notes,
                list.packing_notes,
                list.total_weight_kg,
                list.package_length_cm,
                list.package_width_cm,
                list.package_height_cm,
                list.qc_performed as i64,
                list.qc_by,
                list.qc_date.as_ref().map(fmt_datetime),
                list.qc_notes,
                photos_json,
                list.packed_by,
                list.packed_at.as_ref().map(fmt_datetime),
                list.inventory_booked as i64,
                list.inventory_booking_date.as_ref().map(fmt_datetime),
                list.delivery_note_id,
                list.post_entry_id,
                list.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Packliste".to_string(),
                id: list.id.clone(),
            });
        }
        Ok(())
    }

    /// Packlisten eines Auftrags (Karton 1..N)
    pub fn list_packing_lists_for_order(
        &self,
        order_id: &str,
    ) -> RepositoryResult<Vec<PackingList>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM packing_lists WHERE order_id = ?1 ORDER BY carton_number, id",
            PACKING_COLUMNS
        ))?;
        let lists = stmt
            .query_map(params![order_id], Self::map_packing_list)?
            .collect::<SqliteResult<Vec<PackingList>>>()?;
        Ok(lists)
    }

    // ==========================================
    // Lieferscheine
    // ==========================================

    pub fn insert_delivery_note(&self, note: &DeliveryNote) -> RepositoryResult<()> {
        let items_json = items_to_json(&note.items)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO delivery_notes (
                id, delivery_note_number, order_id, packing_list_id, customer_id,
                post_entry_id, delivery_date, items, notes, delivery_method,
                signature_image, signature_name, signature_date, signature_device,
                status, created_at, created_by, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18)
            "#,
            params![
                note.id,
                note.delivery_note_number,
                note.order_id,
                note.packing_list_id,
                note.customer_id,
                note.post_entry_id,
                fmt_date(&note.delivery_date),
                items_json,
                note.notes,
                note.delivery_method.as_str(),
                note.signature_image,
                note.signature_name,
                note.signature_date.as_ref().map(fmt_datetime),
                note.signature_device,
                note.status.as_str(),
                fmt_datetime(&note.created_at),
                note.created_by,
                note.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_delivery_note(&self, id: &str) -> RepositoryResult<Option<DeliveryNote>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM delivery_notes WHERE id = ?1",
            DELIVERY_COLUMNS
        ))?;
        let note = stmt
            .query_row(params![id], Self::map_delivery_note)
            .optional()?;
        Ok(note)
    }

    pub fn get_delivery_note(&self, id: &str) -> RepositoryResult<DeliveryNote> {
        self.find_delivery_note(id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Lieferschein".to_string(),
                id: id.to_string(),
            })
    }

    pub fn update_delivery_note(&self, note: &DeliveryNote) -> RepositoryResult<()> {
        let items_json = items_to_json(&note.items)?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE delivery_notes SET
                post_entry_id = ?2, delivery_date = ?3, items = ?4, notes = ?5,
                delivery_method = ?6, signature_image = ?7, signature_name = ?8,
                signature_date = ?9, signature_device = ?10, status = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                note.id,
                note.post_entry_id,
                fmt_date(&note.delivery_date),
                items_json,
                note.notes,
                note.delivery_method.as_str(),
                note.signature_image,
                note.signature_name,
                note.signature_date.as_ref().map(fmt_datetime),
                note.signature_device,
                note.status.as_str(),
                note.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Lieferschein".to_string(),
                id: note.id.clone(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Postbuch
    // ==========================================

    pub fn insert_post_entry(&self, entry: &PostEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO post_entries (
                id, entry_number, entry_date, direction, sender, sender_address,
                recipient, recipient_address, customer_id, order_id, packing_list_id,
                delivery_note_id, tracking_number, carrier, status, is_auto_created,
                notes, created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19)
            "#,
            params![
                entry.id,
                entry.entry_number,
                fmt_datetime(&entry.entry_date),
                entry.direction.as_str(),
                entry.sender,
                entry.sender_address,
                entry.recipient,
                entry.recipient_address,
                entry.customer_id,
                entry.order_id,
                entry.packing_list_id,
                entry.delivery_note_id,
                entry.tracking_number,
                entry.carrier,
                entry.status.as_str(),
                entry.is_auto_created as i64,
                entry.notes,
                fmt_datetime(&entry.created_at),
                entry.created_by,
            ],
        )?;
        Ok(())
    }

    pub fn find_post_entry(&self, id: &str) -> RepositoryResult<Option<PostEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM post_entries WHERE id = ?1",
            POST_COLUMNS
        ))?;
        let entry = stmt
            .query_row(params![id], Self::map_post_entry)
            .optional()?;
        Ok(entry)
    }

    pub fn get_post_entry(&self, id: &str) -> RepositoryResult<PostEntry> {
        self.find_post_entry(id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Postbuch-Eintrag".to_string(),
                id: id.to_string(),
            })
    }

    /// Verknüpft Lieferschein und Status am Postbuch-Eintrag
    pub fn link_post_entry_delivery_note(
        &self,
        post_entry_id: &str,
        delivery_note_id: &str,
        status: PostEntryStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE post_entries SET delivery_note_id = ?2, status = ?3 WHERE id = ?1",
            params![post_entry_id, delivery_note_id, status.as_str()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Postbuch-Eintrag".to_string(),
                id: post_entry_id.to_string(),
            });
        }
        Ok(())
    }

    /// Postbuch-Einträge eines Auftrags
    pub fn list_post_entries_for_order(&self, order_id: &str) -> RepositoryResult<Vec<PostEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM post_entries WHERE order_id = ?1 ORDER BY entry_date, id",
            POST_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![order_id], Self::map_post_entry)?
            .collect::<SqliteResult<Vec<PostEntry>>>()?;
        Ok(entries)
    }

    // ==========================================
    // Versand
    // ==========================================

    pub fn insert_shipment(&self, shipment: &Shipment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shipments (
                id, order_id, carrier, tracking_number, weight_kg, length_cm, width_cm,
                height_cm, recipient_name, recipient_street, recipient_postal_code,
                recipient_city, recipient_country, status, shipped_date, delivered_date,
                created_at, created_by, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19)
            "#,
            params![
                shipment.id,
                shipment.order_id,
                shipment.carrier,
                shipment.tracking_number,
                shipment.weight_kg,
                shipment.length_cm,
                shipment.width_cm,
                shipment.height_cm,
                shipment.recipient_name,
                shipment.recipient_street,
                shipment.recipient_postal_code,
                shipment.recipient_city,
                shipment.recipient_country,
                shipment.status.as_str(),
                shipment.shipped_date.as_ref().map(fmt_datetime),
                shipment.delivered_date.as_ref().map(fmt_datetime),
                fmt_datetime(&shipment.created_at),
                shipment.created_by,
                shipment.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_shipment(&self, id: &str) -> RepositoryResult<Option<Shipment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shipments WHERE id = ?1",
            SHIPMENT_COLUMNS
        ))?;
        let shipment = stmt.query_row(params![id], Self::map_shipment).optional()?;
        Ok(shipment)
    }

    pub fn get_shipment(&self, id: &str) -> RepositoryResult<Shipment> {
        self.find_shipment(id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Versand".to_string(),
                id: id.to_string(),
            })
    }

    pub fn update_shipment(&self, shipment: &Shipment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE shipments SET
                carrier = ?2, tracking_number = ?3, weight_kg = ?4, length_cm = ?5,
                width_cm = ?6, height_cm = ?7, status = ?8, shipped_date = ?9,
                delivered_date = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                shipment.id,
                shipment.carrier,
                shipment.tracking_number,
                shipment.weight_kg,
                shipment.length_cm,
                shipment.width_cm,
                shipment.height_cm,
                shipment.status.as_str(),
                shipment.shipped_date.as_ref().map(fmt_datetime),
                shipment.delivered_date.as_ref().map(fmt_datetime),
                shipment.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Versand".to_string(),
                id: shipment.id.clone(),
            });
        }
        Ok(())
    }

    /// Versände eines Auftrags
    pub fn list_shipments_for_order(&self, order_id: &str) -> RepositoryResult<Vec<Shipment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shipments WHERE order_id = ?1 ORDER BY created_at, id",
            SHIPMENT_COLUMNS
        ))?;
        let shipments = stmt
            .query_map(params![order_id], Self::map_shipment)?
            .collect::<SqliteResult<Vec<Shipment>>>()?;
        Ok(shipments)
    }
}
