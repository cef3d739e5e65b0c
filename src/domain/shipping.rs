// ==========================================
// StitchAdmin - Versand-Domänenmodelle
// ==========================================
// Packliste, Lieferschein, Postbuch, Versand.
// Die Dokumente verweisen per ID aufeinander
// (Auftrag ↔ Packliste ↔ Postbuch bilden einen
// kleinen Zyklus, daher keine besitzenden Zeiger).
// ==========================================

use crate::domain::types::{
    DeliveryMethod, DeliveryNoteStatus, PackingListStatus, PostDirection, PostEntryStatus,
    ShipmentStatus,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Positions-Snapshot in Packliste/Lieferschein (JSON)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackingItem {
    pub article_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    pub textile_size: Option<String>,
    pub textile_color: Option<String>,
}

/// Packliste (PL-JJJJ-NNNN), ggf. Karton i von N
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingList {
    pub id: String,
    pub packing_list_number: String,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,

    // Teillieferung
    pub carton_number: i64,
    pub total_cartons: i64,
    pub is_partial_delivery: bool,

    pub status: PackingListStatus,
    pub items: Vec<PackingItem>,

    pub customer_notes: Option<String>,
    pub packing_notes: Option<String>,

    // Gewicht und Maße
    pub total_weight_kg: Option<f64>,
    pub package_length_cm: Option<f64>,
    pub package_width_cm: Option<f64>,
    pub package_height_cm: Option<f64>,

    // Qualitätskontrolle
    pub qc_performed: bool,
    pub qc_by: Option<String>,
    pub qc_date: Option<NaiveDateTime>,
    pub qc_notes: Option<String>,
    pub qc_photos: Vec<String>,

    // Verpackung
    pub packed_by: Option<String>,
    pub packed_at: Option<NaiveDateTime>,

    // Lagerbuchung
    pub inventory_booked: bool,
    pub inventory_booking_date: Option<NaiveDateTime>,

    // Rückverweise
    pub delivery_note_id: Option<String>,
    pub post_entry_id: Option<String>,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl PackingList {
    /// "Karton 1 von 3" bei Teillieferung, sonst None
    pub fn carton_label(&self) -> Option<String> {
        if self.total_cartons > 1 {
            Some(format!("Karton {} von {}", self.carton_number, self.total_cartons))
        } else {
            None
        }
    }

    /// Nummer inkl. Karton-Info, z.B. "PL-2025-0001 (Karton 1/3)"
    pub fn display_number(&self) -> String {
        if self.total_cartons > 1 {
            format!(
                "{} (Karton {}/{})",
                self.packing_list_number, self.carton_number, self.total_cartons
            )
        } else {
            self.packing_list_number.clone()
        }
    }

    /// Stückzahl über alle Positionen
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Lieferschein (LS-JJJJ-NNNN)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryNote {
    pub id: String,
    pub delivery_note_number: String,
    pub order_id: Option<String>,
    pub packing_list_id: Option<String>,
    pub customer_id: Option<String>,
    pub post_entry_id: Option<String>,

    pub delivery_date: NaiveDate,
    pub items: Vec<PackingItem>,
    pub notes: Option<String>,
    pub delivery_method: DeliveryMethod,

    // Unterschrift
    pub signature_image: Option<String>,
    pub signature_name: Option<String>,
    pub signature_date: Option<NaiveDateTime>,
    pub signature_device: Option<String>,

    pub status: DeliveryNoteStatus,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl DeliveryNote {
    pub fn is_signed(&self) -> bool {
        self.signature_image.is_some() || self.signature_name.is_some()
    }

    pub fn is_pickup(&self) -> bool {
        self.delivery_method == DeliveryMethod::Pickup
    }
}

/// Postbuch-Eintrag (POST-JJJJ-NNNNNN)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub id: String,
    pub entry_number: String,
    pub entry_date: NaiveDateTime,
    pub direction: PostDirection,

    // Absender/Empfänger-Snapshot
    pub sender: Option<String>,
    pub sender_address: Option<String>,
    pub recipient: Option<String>,
    pub recipient_address: Option<String>,

    pub customer_id: Option<String>,
    pub order_id: Option<String>,
    pub packing_list_id: Option<String>,
    pub delivery_note_id: Option<String>,

    pub tracking_number: Option<String>,
    pub carrier: Option<String>,

    pub status: PostEntryStatus,
    pub is_auto_created: bool,
    pub notes: Option<String>,

    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
}

/// Versand (VS{JJJJ}-NNNN)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub order_id: String,

    pub carrier: Option<String>,
    pub tracking_number: Option<String>,

    // Paketdaten
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,

    // Empfänger-Snapshot
    pub recipient_name: Option<String>,
    pub recipient_street: Option<String>,
    pub recipient_postal_code: Option<String>,
    pub recipient_city: Option<String>,
    pub recipient_country: Option<String>,

    pub status: ShipmentStatus,
    pub shipped_date: Option<NaiveDateTime>,
    pub delivered_date: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn packing_list(carton: i64, total: i64) -> PackingList {
        PackingList {
            id: "P1".to_string(),
            packing_list_number: "PL-2025-0001".to_string(),
            order_id: Some("A2025-001".to_string()),
            customer_id: Some("K001".to_string()),
            carton_number: carton,
            total_cartons: total,
            is_partial_delivery: total > 1,
            status: PackingListStatus::Ready,
            items: vec![PackingItem {
                article_id: Some("ART001".to_string()),
                name: "T-Shirt Basic".to_string(),
                quantity: 10,
                textile_size: Some("L".to_string()),
                textile_color: None,
            }],
            customer_notes: None,
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
            created_at: NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            created_by: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_carton_label() {
        assert_eq!(packing_list(1, 1).carton_label(), None);
        assert_eq!(
            packing_list(2, 3).carton_label(),
            Some("Karton 2 von 3".to_string())
        );
    }

    #[test]
    fn test_display_number() {
        assert_eq!(packing_list(1, 1).display_number(), "PL-2025-0001");
        assert_eq!(
            packing_list(1, 3).display_number(),
            "PL-2025-0001 (Karton 1/3)"
        );
    }

    #[test]
    fn test_total_quantity() {
        assert_eq!(packing_list(1, 1).total_quantity(), 10);
    }
}
