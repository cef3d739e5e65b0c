// ==========================================
// StitchAdmin - Auftrags-API
// ==========================================
// Auftragsannahme (inkl. Multi-Position-Designs
// und Personalisierungen), Maschinen-Zuordnung,
// Produktionssteuerung über die Workflow-Engine.
// Preisregel: Positionssumme + Σ Designs
// (Einrichtung + Stückpreis × Stückzahl).
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    require_non_empty, require_non_negative_price, require_positive_quantity,
};
use crate::config::SettingsReader;
use crate::domain::clock::Clock;
use crate::domain::design::{DesignThreadColor, OrderDesign, OrderItemPersonalization};
use crate::domain::machine::Machine;
use crate::domain::order::{Order, OrderItem, OrderStatusHistory};
use crate::domain::types::{
    DesignStatus, DesignType, OrderStatus, OrderType, SupplierOrderStatus,
};
use crate::engine::scheduler::Scheduler;
use crate::engine::workflow::{TransitionContext, WorkflowEngine};
use crate::repository::{
    CustomerRepository, DesignRepository, MachineRepository, NumberSequences, OrderRepository,
};
use chrono::{Datelike, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Neue Auftragsposition
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub article_id: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub textile_size: Option<String>,
    pub textile_color: Option<String>,
}

/// Neues Positions-Design
#[derive(Debug, Clone)]
pub struct NewOrderDesign {
    pub position: String,
    pub design_type: DesignType,
    pub is_personalized: bool,
    pub design_file_path: Option<String>,
    pub design_name: Option<String>,
    pub stitch_count: Option<i64>,
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub thread_colors: Vec<DesignThreadColor>,
    pub approval_required: bool,
    pub setup_price: f64,
    pub price_per_piece: f64,
}

/// Neuer Auftrag (Auftragsannahme)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: String,
    pub order_type: OrderType,
    pub description: Option<String>,
    pub customer_notes: Option<String>,
    pub design_status: DesignStatus,
    pub design_file_path: Option<String>,
    pub stitch_count: Option<i64>,
    pub due_date: Option<NaiveDateTime>,
    pub rush_order: bool,
    pub items: Vec<NewOrderItem>,
    pub designs: Vec<NewOrderDesign>,
    pub created_by: Option<String>,
}

/// Personalisierungs-Eingabe (ein Stück)
#[derive(Debug, Clone)]
pub struct PersonalizationEntry {
    pub order_item_id: i64,
    pub text_line_1: Option<String>,
    pub text_line_2: Option<String>,
    pub text_line_3: Option<String>,
    pub sequence_number: Option<i64>,
}

/// Vollansicht eines Auftrags
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub designs: Vec<OrderDesign>,
    pub history: Vec<OrderStatusHistory>,
    pub personalizations: Vec<OrderItemPersonalization>,
}

/// Auftrags-API
pub struct OrderApi<S: SettingsReader> {
    orders: OrderRepository,
    designs: DesignRepository,
    customers: CustomerRepository,
    machines: MachineRepository,
    numbers: NumberSequences,
    workflow: WorkflowEngine<S>,
    scheduler: Scheduler,
    clock: Arc<dyn Clock>,
}

impl<S: SettingsReader> OrderApi<S> {
    pub fn new(conn: Arc<Mutex<Connection>>, settings: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: OrderRepository::from_connection(conn.clone()),
            designs: DesignRepository::from_connection(conn.clone()),
            customers: CustomerRepository::from_connection(conn.clone()),
            machines: MachineRepository::from_connection(conn.clone()),
            numbers: NumberSequences::from_connection(conn.clone()),
            workflow: WorkflowEngine::new(conn.clone(), settings, clock.clone()),
            scheduler: Scheduler::new(conn, clock.clone()),
            clock,
        }
    }

    // ==========================================
    // Auftragsannahme
    // ==========================================

    /// Legt einen neuen Auftrag an (Status draft)
    pub fn create_order(&self, new: NewOrder) -> ApiResult<Order> {
        require_non_empty(&new.customer_id, "Kunde")?;
        self.customers
            .find_by_id(&new.customer_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Kunde (id={}) existiert nicht", new.customer_id))
            })?;

        for item in &new.items {
            require_positive_quantity(item.quantity, "Menge")?;
            require_non_negative_price(item.unit_price, "Einzelpreis")?;
        }
        for design in &new.designs {
            require_non_empty(&design.position, "Design-Position")?;
            require_non_negative_price(design.setup_price, "Einrichtungspreis")?;
            require_non_negative_price(design.price_per_piece, "Stückpreis")?;
        }

        let now = self.clock.now();
        let order_id = self.numbers.next_order_id(now.date().year())?;

        let mut order = Order {
            id: order_id.clone(),
            customer_id: new.customer_id,
            order_type: new.order_type,
            status: OrderStatus::Draft,
            description: new.description,
            internal_notes: None,
            customer_notes: new.customer_notes,
            stitch_count: new.stitch_count,
            design_width_mm: None,
            design_height_mm: None,
            design_status: new.design_status,
            design_file_path: new.design_file_path,
            total_price: 0.0,
            deposit_amount: 0.0,
            discount_percent: 0.0,
            due_date: new.due_date,
            rush_order: new.rush_order,
            auto_create_packing_list: true,
            assigned_machine_id: None,
            production_start: None,
            production_end: None,
            production_minutes: None,
            created_at: now,
            created_by: new.created_by.clone(),
            updated_at: None,
            updated_by: None,
            completed_at: None,
            completed_by: None,
        };
        self.orders.insert(&order)?;

        let mut total_quantity = 0;
        for item in new.items {
            total_quantity += item.quantity;
            self.orders.insert_item(&OrderItem {
                id: 0,
                order_id: order_id.clone(),
                article_id: item.article_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                textile_size: item.textile_size,
                textile_color: item.textile_color,
                supplier_order_status: SupplierOrderStatus::None,
                created_at: now,
            })?;
        }

        for (index, design) in new.designs.into_iter().enumerate() {
            self.designs.insert(&OrderDesign {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                position: design.position,
                position_label: None,
                design_type: design.design_type,
                is_personalized: design.is_personalized,
                design_file_path: design.design_file_path,
                design_name: design.design_name,
                stitch_count: design.stitch_count,
                width_mm: design.width_mm,
                height_mm: design.height_mm,
                thread_colors: design.thread_colors,
                estimated_time_minutes: None,
                print_width_cm: None,
                print_height_cm: None,
                approval_required: design.approval_required,
                approval_status: if design.approval_required {
                    crate::domain::types::ApprovalStatus::Pending
                } else {
                    crate::domain::types::ApprovalStatus::Skipped
                },
                approved_at: None,
                approval_notes: None,
                setup_price: design.setup_price,
                price_per_piece: design.price_per_piece,
                sort_order: index as i64,
                created_at: now,
                updated_at: None,
            })?;
        }

        order.total_price = self.compute_total(&order_id, total_quantity)?;
        order.updated_at = Some(now);
        self.orders.update(&order)?;

        // Erster Historieneintrag: Anlage im Ausgangsstatus
        self.orders.append_history(&OrderStatusHistory {
            id: 0,
            order_id: order_id.clone(),
            from_status: Some(OrderStatus::Draft),
            to_status: OrderStatus::Draft,
            comment: Some("Auftrag angelegt".to_string()),
            changed_at: now,
            changed_by: new.created_by,
        })?;

        info!(order_id = %order.id, "Auftrag angelegt");
        Ok(order)
    }

    /// Gesamtpreis: Positionssumme + Designpreise
    fn compute_total(&self, order_id: &str, total_quantity: i64) -> ApiResult<f64> {
        let items = self.orders.list_items(order_id)?;
        let designs = self.designs.list_for_order(order_id)?;
        let item_total: f64 = items.iter().map(|i| i.line_total()).sum();
        let design_total: f64 = designs
            .iter()
            .map(|d| d.total_price(total_quantity))
            .sum();
        Ok(item_total + design_total)
    }

    /// Berechnet den Gesamtpreis eines Auftrags neu
    pub fn recalculate_total(&self, order_id: &str) -> ApiResult<f64> {
        let mut order = self.orders.get(order_id)?;
        let total_quantity: i64 = self
            .orders
            .list_items(order_id)?
            .iter()
            .map(|i| i.quantity)
            .sum();
        order.total_price = self.compute_total(order_id, total_quantity)?;
        order.updated_at = Some(self.clock.now());
        self.orders.update(&order)?;
        Ok(order.total_price)
    }

    // ==========================================
    // Statussteuerung (über die Workflow-Engine)
    // ==========================================

    pub async fn accept_order(
        &self,
        order_id: &str,
        changed_by: Option<&str>,
    ) -> ApiResult<Order> {
        Ok(self
            .workflow
            .transition(order_id, OrderStatus::Accepted, ctx(changed_by, None))
            .await?)
    }

    pub async fn start_production(
        &self,
        order_id: &str,
        changed_by: Option<&str>,
    ) -> ApiResult<Order> {
        Ok(self
            .workflow
            .transition(order_id, OrderStatus::InProgress, ctx(changed_by, None))
            .await?)
    }

    pub async fn finish_production(
        &self,
        order_id: &str,
        changed_by: Option<&str>,
    ) -> ApiResult<Order> {
        Ok(self
            .workflow
            .transition(order_id, OrderStatus::Ready, ctx(changed_by, None))
            .await?)
    }

    pub async fn complete_order(
        &self,
        order_id: &str,
        changed_by: Option<&str>,
    ) -> ApiResult<Order> {
        Ok(self
            .workflow
            .transition(order_id, OrderStatus::Completed, ctx(changed_by, None))
            .await?)
    }

    pub async fn cancel_order(
        &self,
        order_id: &str,
        changed_by: Option<&str>,
        comment: Option<&str>,
    ) -> ApiResult<Order> {
        Ok(self
            .workflow
            .transition(order_id, OrderStatus::Cancelled, ctx(changed_by, comment))
            .await?)
    }

    // ==========================================
    // Maschine und Planung
    // ==========================================

    /// Weist dem Auftrag eine Maschine zu
    pub fn assign_machine(&self, order_id: &str, machine_id: &str) -> ApiResult<Order> {
        let mut order = self.orders.get(order_id)?;
        if order.status.is_terminal() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "Auftrag {} ist abgeschlossen und kann nicht mehr geändert werden",
                order_id
            )));
        }
        let machine = self.machines.get(machine_id)?;
        if !machine.is_available() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "Maschine {} ist nicht einsatzbereit",
                machine.name
            )));
        }
        order.assigned_machine_id = Some(machine_id.to_string());
        order.updated_at = Some(self.clock.now());
        self.orders.update(&order)?;
        Ok(order)
    }

    /// Schlägt eine freie Maschine vor
    pub fn suggest_machine(
        &self,
        order_id: &str,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> ApiResult<Option<Machine>> {
        let order = self.orders.get(order_id)?;
        Ok(self
            .scheduler
            .suggest_machine(&order, start, duration_minutes)?)
    }

    /// Plant die Produktion auf der zugewiesenen Maschine ein
    pub fn schedule_production(
        &self,
        order_id: &str,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> ApiResult<crate::domain::ScheduleBlock> {
        let order = self.orders.get(order_id)?;
        let machine_id = order.assigned_machine_id.clone().ok_or_else(|| {
            ApiError::BusinessRuleViolation(format!(
                "Auftrag {} hat keine zugewiesene Maschine",
                order_id
            ))
        })?;
        Ok(self
            .scheduler
            .schedule(&order, &machine_id, start, duration_minutes)?)
    }

    // ==========================================
    // Personalisierungen
    // ==========================================

    /// Legt Personalisierungen für ein Design an
    pub fn add_personalizations(
        &self,
        design_id: &str,
        entries: Vec<PersonalizationEntry>,
    ) -> ApiResult<usize> {
        let design = self.designs.get(design_id)?;
        if !design.is_personalized {
            return Err(ApiError::BusinessRuleViolation(format!(
                "Design '{}' ist nicht als personalisiert markiert",
                design.position_label()
            )));
        }
        let now = self.clock.now();
        let mut created = 0;
        for entry in entries {
            self.designs.insert_personalization(&OrderItemPersonalization {
                id: 0,
                order_item_id: entry.order_item_id,
                order_design_id: design_id.to_string(),
                text_line_1: entry.text_line_1,
                text_line_2: entry.text_line_2,
                text_line_3: entry.text_line_3,
                font_name: None,
                custom_color: None,
                sequence_number: entry.sequence_number,
                is_produced: false,
                produced_at: None,
                produced_by: None,
                qc_checked: false,
                qc_notes: None,
                created_at: now,
            })?;
            created += 1;
        }
        Ok(created)
    }

    /// Personalisierungen eines Designs in Produktionsreihenfolge
    pub fn personalizations_in_sequence(
        &self,
        design_id: &str,
    ) -> ApiResult<Vec<OrderItemPersonalization>> {
        Ok(self.designs.list_personalizations_for_design(design_id)?)
    }

    // ==========================================
    // Abfragen
    // ==========================================

    /// Vollansicht eines Auftrags
    pub fn order_details(&self, order_id: &str) -> ApiResult<OrderDetails> {
        let order = self.orders.get(order_id)?;
        Ok(OrderDetails {
            items: self.orders.list_items(order_id)?,
            designs: self.designs.list_for_order(order_id)?,
            history: self.orders.list_history(order_id)?,
            personalizations: self.designs.list_personalizations_for_order(order_id)?,
            order,
        })
    }

    pub fn list_by_status(&self, status: OrderStatus) -> ApiResult<Vec<Order>> {
        Ok(self.orders.list_by_status(status)?)
    }
}

fn ctx(changed_by: Option<&str>, comment: Option<&str>) -> TransitionContext {
    TransitionContext {
        comment: comment.map(|s| s.to_string()),
        changed_by: changed_by.map(|s| s.to_string()),
    }
}
