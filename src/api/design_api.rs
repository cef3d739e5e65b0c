// ==========================================
// StitchAdmin - Design-API
// ==========================================
// Design-Dateien (Klassifizierung, DST-Analyse)
// und Freigabe-Workflow pro Position:
// pending → sent → {approved, rejected,
// revision_requested}; Ablehnung verlangt
// erneuten Upload und führt zurück zu pending.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::SettingsReader;
use crate::domain::clock::Clock;
use crate::domain::design::{classify_design_file, is_dst_file, DesignFileKind, OrderDesign};
use crate::domain::types::ApprovalStatus;
use crate::engine::dst_analyzer::{analyze_dst_file, DstAnalysis};
use crate::repository::{DesignRepository, OrderRepository};
use crate::services::{EmailDispatcher, PdfRenderer};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Design-API
pub struct DesignApi<S: SettingsReader> {
    orders: OrderRepository,
    designs: DesignRepository,
    settings: Arc<S>,
    pdf: Arc<dyn PdfRenderer>,
    email: Arc<dyn EmailDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<S: SettingsReader> DesignApi<S> {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        settings: Arc<S>,
        pdf: Arc<dyn PdfRenderer>,
        email: Arc<dyn EmailDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders: OrderRepository::from_connection(conn.clone()),
            designs: DesignRepository::from_connection(conn),
            settings,
            pdf,
            email,
            clock,
        }
    }

    /// Analysiert eine Design-Datei
    ///
    /// Nur DST liefert automatische Metriken; andere Formate
    /// werden nur klassifiziert und manuell gepflegt.
    pub fn analyze_file(&self, path: &Path) -> ApiResult<DstAnalysis> {
        let path_str = path.display().to_string();
        match classify_design_file(&path_str) {
            DesignFileKind::Unknown => Err(ApiError::InvalidInput(format!(
                "Nicht unterstütztes Design-Dateiformat: {}",
                path_str
            ))),
            _ if !is_dst_file(&path_str) => Err(ApiError::InvalidInput(
                "Nur DST-Dateien können automatisch analysiert werden".to_string(),
            )),
            _ => Ok(analyze_dst_file(path)),
        }
    }

    /// Hängt eine Design-Datei an eine Position und übernimmt
    /// bei DST die Metriken (Stiche, Maße) in Design und Auftrag
    pub fn attach_file(&self, design_id: &str, path: &Path) -> ApiResult<OrderDesign> {
        let path_str = path.display().to_string();
        if classify_design_file(&path_str) == DesignFileKind::Unknown {
            return Err(ApiError::InvalidInput(format!(
                "Nicht unterstütztes Design-Dateiformat: {}",
                path_str
            )));
        }

        let mut design = self.designs.get(design_id)?;
        let now = self.clock.now();
        design.design_file_path = Some(path_str.clone());

        if is_dst_file(&path_str) {
            let analysis = analyze_dst_file(path);
            if analysis.success {
                design.stitch_count = Some(analysis.total_stitches);
                design.width_mm = Some(analysis.width_mm);
                design.height_mm = Some(analysis.height_mm);
                design.estimated_time_minutes = Some(analysis.estimated_time_minutes as i64);

                // Auftragsweite Stickerei-Angaben fortschreiben
                let mut order = self.orders.get(&design.order_id)?;
                order.stitch_count = Some(
                    order.stitch_count.unwrap_or(0).max(analysis.total_stitches),
                );
                order.design_width_mm = Some(analysis.width_mm);
                order.design_height_mm = Some(analysis.height_mm);
                order.updated_at = Some(now);
                self.orders.update(&order)?;
            } else {
                warn!(
                    design_id = %design_id,
                    error = ?analysis.error,
                    "DST-Analyse fehlgeschlagen, Datei wird ohne Metriken übernommen"
                );
            }
        }

        // Nach erneutem Upload beginnt die Freigabe von vorn
        if matches!(
            design.approval_status,
            ApprovalStatus::Rejected | ApprovalStatus::RevisionRequested
        ) {
            design.approval_status = ApprovalStatus::Pending;
            design.approved_at = None;
        }

        design.updated_at = Some(now);
        self.designs.update(&design)?;
        Ok(design)
    }

    // ==========================================
    // Freigabe-Workflow
    // ==========================================

    /// pending → sent: Freigabeformular erzeugen und versenden
    pub async fn send_for_approval(
        &self,
        design_id: &str,
        recipient_email: &str,
    ) -> ApiResult<OrderDesign> {
        let mut design = self.designs.get(design_id)?;
        if design.approval_status != ApprovalStatus::Pending {
            return Err(ApiError::IllegalTransition {
                from: design.approval_status.as_str().to_string(),
                to: ApprovalStatus::Sent.as_str().to_string(),
                reason: "Nur ausstehende Designs können zur Freigabe gesendet werden".to_string(),
            });
        }

        let order = self.orders.get(&design.order_id)?;
        let settings = self
            .settings
            .get_settings()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        // PDF und Versand sind externe Dienste; Fehler dort
        // lassen den Freigabe-Status unverändert
        let (pdf_path, _colors) = self
            .pdf
            .render_design_approval(
                &order,
                &design,
                &settings,
                design.design_file_path.as_deref(),
            )
            .await
            .map_err(|e| ApiError::External(format!("PDF-Erzeugung fehlgeschlagen: {}", e)))?;

        let outcome = self
            .email
            .send(
                recipient_email,
                &format!("Design-Freigabe für Auftrag {}", order.id),
                &format!(
                    "Bitte prüfen Sie das Design '{}' für Auftrag {}.",
                    design.position_label(),
                    order.id
                ),
                &[pdf_path],
            )
            .await
            .map_err(|e| ApiError::External(format!("E-Mail-Versand fehlgeschlagen: {}", e)))?;

        if !outcome.success {
            return Err(ApiError::External(
                outcome
                    .message
                    .unwrap_or_else(|| "E-Mail-Versand fehlgeschlagen".to_string()),
            ));
        }

        design.approval_status = ApprovalStatus::Sent;
        design.updated_at = Some(self.clock.now());
        self.designs.update(&design)?;
        info!(design_id = %design_id, "Design zur Freigabe versendet");
        Ok(design)
    }

    /// sent → approved: Freigabe mit Zeitstempel
    pub fn approve(&self, design_id: &str, notes: Option<&str>) -> ApiResult<OrderDesign> {
        self.resolve_approval(design_id, ApprovalStatus::Approved, notes)
    }

    /// sent → rejected: verlangt erneuten Upload
    pub fn reject(&self, design_id: &str, notes: Option<&str>) -> ApiResult<OrderDesign> {
        self.resolve_approval(design_id, ApprovalStatus::Rejected, notes)
    }

    /// sent → revision_requested
    pub fn request_revision(
        &self,
        design_id: &str,
        notes: Option<&str>,
    ) -> ApiResult<OrderDesign> {
        self.resolve_approval(design_id, ApprovalStatus::RevisionRequested, notes)
    }

    fn resolve_approval(
        &self,
        design_id: &str,
        to: ApprovalStatus,
        notes: Option<&str>,
    ) -> ApiResult<OrderDesign> {
        let mut design = self.designs.get(design_id)?;
        if design.approval_status != ApprovalStatus::Sent {
            return Err(ApiError::IllegalTransition {
                from: design.approval_status.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: "Entscheidung nur für versendete Freigaben möglich".to_string(),
            });
        }
        let now = self.clock.now();
        design.approval_status = to;
        design.approval_notes = notes.map(|s| s.to_string());
        design.approved_at = if to == ApprovalStatus::Approved {
            Some(now)
        } else {
            None
        };
        design.updated_at = Some(now);
        self.designs.update(&design)?;
        info!(design_id = %design_id, status = %to, "Freigabe-Entscheidung erfasst");
        Ok(design)
    }
}
