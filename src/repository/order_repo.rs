// ==========================================
// StitchAdmin - Auftrags-Repository
// ==========================================
// orders, order_items und order_status_history.
// Regel: Statuswechsel laufen über die
// Workflow-Engine, nie direkt über update().
// Die Historie ist append-only.
// ==========================================

use crate::domain::order::{Order, OrderItem, OrderStatusHistory};
use crate::domain::types::{DesignStatus, OrderStatus, OrderType, SupplierOrderStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_datetime, opt_datetime, parse_datetime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ORDER_COLUMNS: &str = "id, customer_id, order_type, status, description, internal_notes, \
     customer_notes, stitch_count, design_width_mm, design_height_mm, design_status, \
     design_file_path, total_price, deposit_amount, discount_percent, due_date, rush_order, \
     auto_create_packing_list, assigned_machine_id, production_start, production_end, \
     production_minutes, created_at, created_by, updated_at, updated_by, completed_at, \
     completed_by";

const ITEM_COLUMNS: &str = "id, order_id, article_id, quantity, unit_price, textile_size, \
     textile_color, supplier_order_status, created_at";

const HISTORY_COLUMNS: &str =
    "id, order_id, from_status, to_status, comment, changed_at, changed_by";

/// Auftrags-Repository
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_order(row: &Row<'_>) -> SqliteResult<Order> {
        Ok(Order {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            order_type: OrderType::parse(&row.get::<_, String>(2)?)
                .unwrap_or(OrderType::Embroidery),
            status: OrderStatus::parse(&row.get::<_, String>(3)?).unwrap_or(OrderStatus::Draft),
            description: row.get(4)?,
            internal_notes: row.get(5)?,
            customer_notes: row.get(6)?,
            stitch_count: row.get(7)?,
            design_width_mm: row.get(8)?,
            design_height_mm: row.get(9)?,
            design_status: DesignStatus::parse(&row.get::<_, String>(10)?)
                .unwrap_or(DesignStatus::None),
            design_file_path: row.get(11)?,
            total_price: row.get(12)?,
            deposit_amount: row.get(13)?,
            discount_percent: row.get(14)?,
            due_date: opt_datetime(row.get(15)?),
            rush_order: row.get::<_, i64>(16)? != 0,
            auto_create_packing_list: row.get::<_, i64>(17)? != 0,
            assigned_machine_id: row.get(18)?,
            production_start: opt_datetime(row.get(19)?),
            production_end: opt_datetime(row.get(20)?),
            production_minutes: row.get(21)?,
            created_at: parse_datetime(&row.get::<_, String>(22)?),
            created_by: row.get(23)?,
            updated_at: opt_datetime(row.get(24)?),
            updated_by: row.get(25)?,
            completed_at: opt_datetime(row.get(26)?),
            completed_by: row.get(27)?,
        })
    }

    fn map_item(row: &Row<'_>) -> SqliteResult<OrderItem> {
        Ok(OrderItem {
            id: row.get(0)?,
            order_id: row.get(1)?,
            article_id: row.get(2)?,
            quantity: row.get(3)?,
            unit_price: row.get(4)?,
            textile_size: row.get(5)?,
            textile_color: row.get(6)?,
            supplier_order_status: SupplierOrderStatus::parse(&row.get::<_, String>(7)?)
                .unwrap_or(SupplierOrderStatus::None),
            created_at: parse_datetime(&row.get::<_, String>(8)?),
        })
    }

    fn map_history(row: &Row<'_>) -> SqliteResult<OrderStatusHistory> {
        Ok(OrderStatusHistory {
            id: row.get(0)?,
            order_id: row.get(1)?,
            from_status: row
                .get::<_, Option<String>>(2)?
                .and_then(|s| OrderStatus::parse(&s)),
            to_status: OrderStatus::parse(&row.get::<_, String>(3)?)
                .unwrap_or(OrderStatus::Draft),
            comment: row.get(4)?,
            changed_at: parse_datetime(&row.get::<_, String>(5)?),
            changed_by: row.get(6)?,
        })
    }

    // ==========================================
    // Aufträge
    // ==========================================

    /// Legt einen Auftrag an
    pub fn insert(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO orders (
                id, customer_id, order_type, status, description, internal_notes,
                customer_notes, stitch_count, design_width_mm, design_height_mm,
                design_status, design_file_path, total_price, deposit_amount,
                discount_percent, due_date, rush_order, auto_create_packing_list,
                assigned_machine_id, production_start, production_end, production_minutes,
                created_at, created_by, updated_at, updated_by, completed_at, completed_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                      ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)
            "#,
            params![
                order.id,
                order.customer_id,
                order.order_type.as_str(),
                order.status.as_str(),
                order.description,
                order.internal_notes,
                order.customer_notes,
                order.stitch_count,
                order.design_width_mm,
                order.design_height_mm,
                order.design_status.as_str(),
                order.design_file_path,
                order.total_price,
                order.deposit_amount,
                order.discount_percent,
                order.due_date.as_ref().map(fmt_datetime),
                order.rush_order as i64,
                order.auto_create_packing_list as i64,
                order.assigned_machine_id,
                order.production_start.as_ref().map(fmt_datetime),
                order.production_end.as_ref().map(fmt_datetime),
                order.production_minutes,
                fmt_datetime(&order.created_at),
                order.created_by,
                order.updated_at.as_ref().map(fmt_datetime),
                order.updated_by,
                order.completed_at.as_ref().map(fmt_datetime),
                order.completed_by,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders WHERE id = ?1",
            ORDER_COLUMNS
        ))?;
        let order = stmt.query_row(params![id], Self::map_order).optional()?;
        Ok(order)
    }

    pub fn get(&self, id: &str) -> RepositoryResult<Order> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Auftrag".to_string(),
            id: id.to_string(),
        })
    }

    /// Schreibt alle veränderlichen Felder zurück
    pub fn update(&self, order: &Order) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE orders SET
                customer_id = ?2, order_type = ?3, status = ?4, description = ?5,
                internal_notes = ?6, customer_notes = ?7, stitch_count = ?8,
                design_width_mm = ?9, design_height_mm = ?10, design_status = ?11,
                design_file_path = ?12, total_price = ?13, deposit_amount = ?14,
                discount_percent = ?15, due_date = ?16, rush_order = ?17,
                auto_create_packing_list = ?18, assigned_machine_id = ?19,
                production_start = ?20, production_end = ?21, production_minutes = ?22,
                updated_at = ?23, updated_by = ?24, completed_at = ?25, completed_by = ?26
            WHERE id = ?1
            "#,
            params![
                order.id,
                order.customer_id,
                order.order_type.as_str(),
                order.status.as_str(),
                order.description,
                order.internal_notes,
                order.customer_notes,
                order.stitch_count,
                order.design_width_mm,
                order.design_height_mm,
                order.design_status.as_str(),
                order.design_file_path,
                order.total_price,
                order.deposit_amount,
                order.discount_percent,
                order.due_date.as_ref().map(fmt_datetime),
                order.rush_order as i64,
                order.auto_create_packing_list as i64,
                order.assigned_machine_id,
                order.production_start.as_ref().map(fmt_datetime),
                order.production_end.as_ref().map(fmt_datetime),
                order.production_minutes,
                order.updated_at.as_ref().map(fmt_datetime),
                order.updated_by,
                order.completed_at.as_ref().map(fmt_datetime),
                order.completed_by,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Auftrag".to_string(),
                id: order.id.clone(),
            });
        }
        Ok(())
    }

    /// Aufträge mit bestimmtem Status
    pub fn list_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders WHERE status = ?1 ORDER BY due_date, id",
            ORDER_COLUMNS
        ))?;
        let orders = stmt
            .query_map(params![status.as_str()], Self::map_order)?
            .collect::<SqliteResult<Vec<Order>>>()?;
        Ok(orders)
    }

    /// Alle Aufträge
    pub fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders ORDER BY id",
            ORDER_COLUMNS
        ))?;
        let orders = stmt
            .query_map([], Self::map_order)?
            .collect::<SqliteResult<Vec<Order>>>()?;
        Ok(orders)
    }

    /// Löscht einen Auftrag samt Positionen/Historie (cascade).
    /// Nur stornierte Aufträge dürfen gelöscht werden.
    pub fn delete(&self, order_id: &str) -> RepositoryResult<()> {
        let order = self.get(order_id)?;
        if order.status != OrderStatus::Cancelled {
            return Err(RepositoryError::ValidationError(format!(
                "Nur stornierte Aufträge können gelöscht werden (Auftrag {})",
                order_id
            )));
        }
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM orders WHERE id = ?1", params![order_id])?;
        Ok(())
    }

    // ==========================================
    // Positionen
    // ==========================================

    /// Legt eine Auftragsposition an, liefert die Zeilen-ID
    pub fn insert_item(&self, item: &OrderItem) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO order_items (
                order_id, article_id, quantity, unit_price, textile_size, textile_color,
                supplier_order_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                item.order_id,
                item.article_id,
                item.quantity,
                item.unit_price,
                item.textile_size,
                item.textile_color,
                item.supplier_order_status.as_str(),
                fmt_datetime(&item.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Positionen eines Auftrags
    pub fn list_items(&self, order_id: &str) -> RepositoryResult<Vec<OrderItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![order_id], Self::map_item)?
            .collect::<SqliteResult<Vec<OrderItem>>>()?;
        Ok(items)
    }

    // ==========================================
    // Status-Historie (append-only)
    // ==========================================

    /// Hängt einen Historieneintrag an
    pub fn append_history(&self, entry: &OrderStatusHistory) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO order_status_history (
                order_id, from_status, to_status, comment, changed_at, changed_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.order_id,
                entry.from_status.map(|s| s.as_str()),
                entry.to_status.as_str(),
                entry.comment,
                fmt_datetime(&entry.changed_at),
                entry.changed_by,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Historie eines Auftrags, chronologisch
    pub fn list_history(&self, order_id: &str) -> RepositoryResult<Vec<OrderStatusHistory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM order_status_history WHERE order_id = ?1 ORDER BY changed_at, id",
            HISTORY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(params![order_id], Self::map_history)?
            .collect::<SqliteResult<Vec<OrderStatusHistory>>>()?;
        Ok(entries)
    }
}
