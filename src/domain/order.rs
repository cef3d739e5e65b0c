// ==========================================
// StitchAdmin - Auftrags-Domänenmodell
// ==========================================
// Auftragskopf, Positionen und Status-Historie.
// Regel: Ein Auftrag in Produktion hat immer
// Maschine und Produktionsstart gesetzt.
// ==========================================

use crate::domain::types::{DesignStatus, OrderStatus, OrderType, SupplierOrderStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Auftrag (ID im Nummernkreis A{JJJJ}-NNN)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,

    // Allgemeine Angaben
    pub description: Option<String>,
    pub internal_notes: Option<String>,
    pub customer_notes: Option<String>,

    // Stickerei-Angaben (auftragsweit, aus der DST-Analyse)
    pub stitch_count: Option<i64>,
    pub design_width_mm: Option<f64>,
    pub design_height_mm: Option<f64>,

    // Design-Beschaffung
    pub design_status: DesignStatus,
    pub design_file_path: Option<String>,

    // Preise
    pub total_price: f64,
    pub deposit_amount: f64,
    pub discount_percent: f64,

    // Termine
    pub due_date: Option<NaiveDateTime>,
    pub rush_order: bool,

    // Workflow-Schalter
    pub auto_create_packing_list: bool,

    // Produktion
    pub assigned_machine_id: Option<String>,
    pub production_start: Option<NaiveDateTime>,
    pub production_end: Option<NaiveDateTime>,
    pub production_minutes: Option<i64>,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
}

impl Order {
    /// Design-Datei vorhanden (Altbestand ohne Freigabe-Workflow)
    pub fn has_design_file(&self) -> bool {
        self.design_file_path
            .as_deref()
            .map(|p| !p.is_empty())
            .unwrap_or(false)
    }

    /// Jahr aus der Auftrags-ID (A2025-001 → 2025)
    pub fn id_year(&self) -> Option<i32> {
        self.id
            .strip_prefix('A')
            .and_then(|rest| rest.split('-').next())
            .and_then(|y| y.parse().ok())
    }
}

/// Auftragsposition (Artikel, Menge, Größe, Farbe)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: String,
    pub article_id: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub textile_size: Option<String>,
    pub textile_color: Option<String>,
    pub supplier_order_status: SupplierOrderStatus,
    pub created_at: NaiveDateTime,
}

impl OrderItem {
    /// Zeilensumme
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Status-Historie (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusHistory {
    pub id: i64,
    pub order_id: String,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub comment: Option<String>,
    pub changed_at: NaiveDateTime,
    pub changed_by: Option<String>,
}
