// ==========================================
// StitchAdmin - Design-Repository
// ==========================================
// order_designs und order_item_personalizations.
// Garnfarben werden als JSON in der Spalte
// thread_colors abgelegt.
// ==========================================

use crate::domain::design::{DesignThreadColor, OrderDesign, OrderItemPersonalization};
use crate::domain::types::{ApprovalStatus, DesignType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_datetime, opt_datetime, parse_datetime};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DESIGN_COLUMNS: &str = "id, order_id, position, position_label, design_type, \
     is_personalized, design_file_path, design_name, stitch_count, width_mm, height_mm, \
     thread_colors, estimated_time_minutes, print_width_cm, print_height_cm, \
     approval_required, approval_status, approved_at, approval_notes, setup_price, \
     price_per_piece, sort_order, created_at, updated_at";

const PERSONALIZATION_COLUMNS: &str = "id, order_item_id, order_design_id, text_line_1, \
     text_line_2, text_line_3, font_name, custom_color, sequence_number, is_produced, \
     produced_at, produced_by, qc_checked, qc_notes, created_at";

/// Design-Repository
pub struct DesignRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DesignRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn parse_thread_colors(raw: Option<String>) -> Vec<DesignThreadColor> {
        raw.and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn map_design(row: &Row<'_>) -> SqliteResult<OrderDesign> {
        Ok(OrderDesign {
            id: row.get(0)?,
            order_id: row.get(1)?,
            position: row.get(2)?,
            position_label: row.get(3)?,
            design_type: DesignType::parse(&row.get::<_, String>(4)?)
                .unwrap_or(DesignType::Stick),
            is_personalized: row.get::<_, i64>(5)? != 0,
            design_file_path: row.get(6)?,
            design_name: row.get(7)?,
            stitch_count: row.get(8)?,
            width_mm: row.get(9)?,
            height_mm: row.get(10)?,
            thread_colors: Self::parse_thread_colors(row.get(11)?),
            estimated_time_minutes: row.get(12)?,
            print_width_cm: row.get(13)?,
            print_height_cm: row.get(14)?,
            approval_required: row.get::<_, i64>(15)? != 0,
            approval_status: ApprovalStatus::parse(&row.get::<_, String>(16)?)
                .unwrap_or(ApprovalStatus::Pending),
            approved_at: opt_datetime(row.get(17)?),
            approval_notes: row.get(18)?,
            setup_price: row.get(19)?,
            price_per_piece: row.get(20)?,
            sort_order: row.get(21)?,
            created_at: parse_datetime(&row.get::<_, String>(22)?),
            updated_at: opt_datetime(row.get(23)?),
        })
    }

    fn map_personalization(row: &Row<'_>) -> SqliteResult<OrderItemPersonalization> {
        Ok(OrderItemPersonalization {
            id: row.get(0)?,
            order_item_id: row.get(1)?,
            order_design_id: row.get(2)?,
            text_line_1: row.get(3)?,
            text_line_2: row.get(4)?,
            text_line_3: row.get(5)?,
            font_name: row.get(6)?,
            custom_color: row.get(7)?,
            sequence_number: row.get(8)?,
            is_produced: row.get::<_, i64>(9)? != 0,
            produced_at: opt_datetime(row.get(10)?),
            produced_by: row.get(11)?,
            qc_checked: row.get::<_, i64>(12)? != 0,
            qc_notes: row.get(13)?,
            created_at: parse_datetime(&row.get::<_, String>(14)?),
        })
    }

    // ==========================================
    // Designs
    // ==========================================

    /// Legt ein Positions-Design an
    pub fn insert(&self, design: &OrderDesign) -> RepositoryResult<()> {
        let thread_colors_json = serde_json::to_string(&design.thread_colors)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO order_designs (
                id, order_id, position, position_label, design_type, is_personalized,
                design_file_path, design_name, stitch_count, width_mm, height_mm,
                thread_colors, estimated_time_minutes, print_width_cm, print_height_cm,
                approval_required, approval_status, approved_at, approval_notes,
                setup_price, price_per_piece, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
            "#,
            params![
                design.id,
                design.order_id,
                design.position,
                design.position_label,
                design.design_type.as_str(),
                design.is_personalized as i64,
                design.design_file_path,
                design.design_name,
                design.stitch_count,
                design.width_mm,
                design.height_mm,
                thread_colors_json,
                design.estimated_time_minutes,
                design.print_width_cm,
                design.print_height_cm,
                design.approval_required as i64,
                design.approval_status.as_str(),
                design.approved_at.as_ref().map(fmt_datetime),
                design.approval_notes,
                design.setup_price,
                design.price_per_piece,
                design.sort_order,
                fmt_datetime(&design.created_at),
                design.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<OrderDesign>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM order_designs WHERE id = ?1",
            DESIGN_COLUMNS
        ))?;
        let design = stmt.query_row(params![id], Self::map_design).optional()?;
        Ok(design)
    }

    pub fn get(&self, id: &str) -> RepositoryResult<OrderDesign> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Design".to_string(),
            id: id.to_string(),
        })
    }

    /// Designs eines Auftrags in Positions-Reihenfolge
    pub fn list_for_order(&self, order_id: &str) -> RepositoryResult<Vec<OrderDesign>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM order_designs WHERE order_id = ?1 ORDER BY sort_order, id",
            DESIGN_COLUMNS
        ))?;
        let designs = stmt
            .query_map(params![order_id], Self::map_design)?
            .collect::<SqliteResult<Vec<OrderDesign>>>()?;
        Ok(designs)
    }

    /// Schreibt die veränderlichen Felder eines Designs zurück
    pub fn update(&self, design: &OrderDesign) -> RepositoryResult<()> {
        let thread_colors_json = serde_json::to_string(&design.thread_colors)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE order_designs SET
                position = ?2, position_label = ?3, design_type = ?4, is_personalized = ?5,
                design_file_path = ?6, design_name = ?7, stitch_count = ?8, width_mm = ?9,
                height_mm = ?10, thread_colors = ?11, estimated_time_minutes = ?12,
                print_width_cm = ?13, print_height_cm = ?14, approval_required = ?15,
                approval_status = ?16, approved_at = ?17, approval_notes = ?18,
                setup_price = ?19, price_per_piece = ?20, sort_order = ?21, updated_at = ?22
            WHERE id = ?1
            "#,
            params![
                design.id,
                design.position,
                design.position_label,
                design.design_type.as_str(),
                design.is_personalized as i64,
                design.design_file_path,
                design.design_name,
                design.stitch_count,
                design.width_mm,
                design.height_mm,
                thread_colors_json,
                design.estimated_time_minutes,
                design.print_width_cm,
                design.print_height_cm,
                design.approval_required as i64,
                design.approval_status.as_str(),
                design.approved_at.as_ref().map(fmt_datetime),
                design.approval_notes,
                design.setup_price,
                design.price_per_piece,
                design.sort_order,
                design.updated_at.as_ref().map(fmt_datetime),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Design".to_string(),
                id: design.id.clone(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Personalisierungen
    // ==========================================

    /// Legt eine Personalisierung an, liefert die Zeilen-ID
    pub fn insert_personalization(
        &self,
        p: &OrderItemPersonalization,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO order_item_personalizations (
                order_item_id, order_design_id, text_line_1, text_line_2, text_line_3,
                font_name, custom_color, sequence_number, is_produced, produced_at,
                produced_by, qc_checked, qc_notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                p.order_item_id,
                p.order_design_id,
                p.text_line_1,
                p.text_line_2,
                p.text_line_3,
                p.font_name,
                p.custom_color,
                p.sequence_number,
                p.is_produced as i64,
                p.produced_at.as_ref().map(fmt_datetime),
                p.produced_by,
                p.qc_checked as i64,
                p.qc_notes,
                fmt_datetime(&p.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Personalisierungen eines Designs in Produktionsreihenfolge
    pub fn list_personalizations_for_design(
        &self,
        design_id: &str,
    ) -> RepositoryResult<Vec<OrderItemPersonalization>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM order_item_personalizations \
             WHERE order_design_id = ?1 ORDER BY sequence_number, id",
            PERSONALIZATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![design_id], Self::map_personalization)?
            .collect::<SqliteResult<Vec<OrderItemPersonalization>>>()?;
        Ok(rows)
    }

    /// Alle Personalisierungen eines Auftrags (über dessen Designs)
    pub fn list_personalizations_for_order(
        &self,
        order_id: &str,
    ) -> RepositoryResult<Vec<OrderItemPersonalization>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.order_item_id, p.order_design_id, p.text_line_1, p.text_line_2,
                   p.text_line_3, p.font_name, p.custom_color, p.sequence_number,
                   p.is_produced, p.produced_at, p.produced_by, p.qc_checked, p.qc_notes,
                   p.created_at
            FROM order_item_personalizations p
            JOIN order_designs d ON d.id = p.order_design_id
            WHERE d.order_id = ?1
            ORDER BY p.sequence_number, p.id
            "#,
        )?;
        let rows = stmt
            .query_map(params![order_id], Self::map_personalization)?
            .collect::<SqliteResult<Vec<OrderItemPersonalization>>>()?;
        Ok(rows)
    }

    /// Markiert eine Personalisierung als gefertigt
    pub fn mark_personalization_produced(
        &self,
        personalization_id: i64,
        produced_at: NaiveDateTime,
        produced_by: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE order_item_personalizations
            SET is_produced = 1, produced_at = ?2, produced_by = ?3
            WHERE id = ?1
            "#,
            params![personalization_id, fmt_datetime(&produced_at), produced_by],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Personalisierung".to_string(),
                id: personalization_id.to_string(),
            });
        }
        Ok(())
    }
}
