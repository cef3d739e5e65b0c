// ==========================================
// StitchAdmin - Workflow-Engine (Auftragsstatus)
// ==========================================
// Explizite Übergangstabelle über
// draft → accepted → in_progress → ready → completed
// sowie Stornierung aus jedem Nicht-Endzustand.
// Regel: JEDER Statuswechsel läuft über transition();
// Statusänderung und Historieneintrag werden in einer
// Transaktion geschrieben. Unkritische Folgeaktionen
// (Garnverbrauch, Dokumentkaskade) laufen nach dem
// Commit und blockieren den Übergang nicht.
// ==========================================

use crate::config::SettingsReader;
use crate::domain::clock::Clock;
use crate::domain::design::OrderDesign;
use crate::domain::order::{Order, OrderStatusHistory};
use crate::domain::types::{ApprovalStatus, DesignStatus, OrderStatus, UsageType};
use crate::domain::ThreadUsage;
use crate::engine::document_cascade::DocumentCascade;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::scheduler::Scheduler;
use crate::engine::thread_estimator::ThreadEstimator;
use crate::repository::{
    DesignRepository, MachineRepository, OrderRepository, ScheduleBlockRepository,
    ThreadRepository,
};
use chrono::Duration;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Zulässige Statusübergänge (from → to)
const TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Draft, OrderStatus::Accepted),
    (OrderStatus::Accepted, OrderStatus::InProgress),
    (OrderStatus::InProgress, OrderStatus::Ready),
    (OrderStatus::Ready, OrderStatus::Completed),
    (OrderStatus::Draft, OrderStatus::Cancelled),
    (OrderStatus::Accepted, OrderStatus::Cancelled),
    (OrderStatus::InProgress, OrderStatus::Cancelled),
    (OrderStatus::Ready, OrderStatus::Cancelled),
];

/// Kontext eines Statuswechsels
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    pub comment: Option<String>,
    pub changed_by: Option<String>,
}

/// Workflow-Engine
pub struct WorkflowEngine<S: SettingsReader> {
    conn: Arc<Mutex<Connection>>,
    orders: OrderRepository,
    designs: DesignRepository,
    machines: MachineRepository,
    blocks: ScheduleBlockRepository,
    threads: ThreadRepository,
    estimator: ThreadEstimator,
    cascade: DocumentCascade,
    scheduler: Scheduler,
    settings: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: SettingsReader> WorkflowEngine<S> {
    pub fn new(conn: Arc<Mutex<Connection>>, settings: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: OrderRepository::from_connection(conn.clone()),
            designs: DesignRepository::from_connection(conn.clone()),
            machines: MachineRepository::from_connection(conn.clone()),
            blocks: ScheduleBlockRepository::from_connection(conn.clone()),
            threads: ThreadRepository::from_connection(conn.clone()),
            estimator: ThreadEstimator::new(),
            cascade: DocumentCascade::new(conn.clone(), clock.clone()),
            scheduler: Scheduler::new(conn.clone(), clock.clone()),
            settings,
            clock,
            conn,
        }
    }

    // ==========================================
    // Transaktionssteuerung
    // ==========================================
    // Die Sperre wird pro Statement erworben; BEGIN/COMMIT
    // klammern die Repository-Aufrufe auf derselben Verbindung.

    fn exec_sql(&self, sql: &str) -> EngineResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Internal(format!("Sperre fehlgeschlagen: {}", e)))?;
        conn.execute_batch(sql)
            .map_err(|e| EngineError::Internal(format!("{}: {}", sql, e)))?;
        Ok(())
    }

    fn begin(&self) -> EngineResult<()> {
        self.exec_sql("BEGIN IMMEDIATE")
    }

    fn commit(&self) -> EngineResult<()> {
        self.exec_sql("COMMIT")
    }

    fn rollback(&self) {
        let _ = self.exec_sql("ROLLBACK");
    }

    // ==========================================
    // Vorbedingungen
    // ==========================================

    /// Design-Gate für accepted → in_progress
    ///
    /// - needs_order ohne geliefertes und freigegebenes Design blockiert
    /// - jede freigabepflichtige Position ohne Freigabe blockiert
    /// - Altaufträge ohne Positions-Designs: Datei vorhanden genügt
    fn design_gate(&self, order: &Order, designs: &[OrderDesign]) -> Result<(), String> {
        if order.design_status == DesignStatus::NeedsOrder {
            let delivered_and_approved = designs
                .iter()
                .any(|d| d.approval_status == ApprovalStatus::Approved);
            if !delivered_and_approved {
                return Err(
                    "Design muss erst beim Lieferanten bestellt und freigegeben werden"
                        .to_string(),
                );
            }
        }

        if designs.is_empty() {
            // Altbestand ohne Freigabe-Workflow: Datei vorhanden genügt
            if order.design_status.is_production_ready() || order.has_design_file() {
                return Ok(());
            }
            return Err("Design fehlt".to_string());
        }

        for design in designs {
            if design.blocks_production() {
                return Err(format!(
                    "Design '{}' ist nicht freigegeben (Status: {})",
                    design.position_label(),
                    design.approval_status.label_de()
                ));
            }
        }

        Ok(())
    }

    /// Prüft die Vorbedingungen eines Übergangs; liefert bei
    /// Verletzung eine verständliche Begründung.
    async fn check_preconditions(
        &self,
        order: &Order,
        to: OrderStatus,
    ) -> EngineResult<Result<(), String>> {
        match to {
            OrderStatus::Accepted => {
                if order.customer_id.trim().is_empty() {
                    return Ok(Err("Kein Kunde zugeordnet".to_string()));
                }
                let items = self.orders.list_items(&order.id)?;
                if items.is_empty() {
                    return Ok(Err("Auftrag hat keine Positionen".to_string()));
                }
                Ok(Ok(()))
            }
            OrderStatus::InProgress => {
                let designs = self.designs.list_for_order(&order.id)?;
                if let Err(reason) = self.design_gate(order, &designs) {
                    return Ok(Err(reason));
                }

                let machine_id = match order.assigned_machine_id.as_deref() {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => return Ok(Err("Keine Maschine zugewiesen".to_string())),
                };

                let machine = match self.machines.find_by_id(&machine_id)? {
                    Some(machine) => machine,
                    None => {
                        return Ok(Err(format!("Maschine {} existiert nicht", machine_id)))
                    }
                };
                if !machine.is_available() {
                    return Ok(Err(format!(
                        "Maschine {} ist nicht einsatzbereit",
                        machine.name
                    )));
                }

                // Höchstens ein laufender Auftrag pro Maschine
                if let Some(running) = self.machines.find_in_progress_order(&machine_id)? {
                    if running != order.id {
                        return Ok(Err(format!(
                            "Maschine {} ist belegt durch Auftrag {}",
                            machine.name, running
                        )));
                    }
                }

                Ok(Ok(()))
            }
            // ready/completed/cancelled: Zulässigkeit kommt aus der Tabelle
            _ => Ok(Ok(())),
        }
    }

    // ==========================================
    // Übergang
    // ==========================================

    /// Führt einen Statuswechsel aus
    ///
    /// Ablauf: Tabelle prüfen → Vorbedingungen prüfen →
    /// Seiteneffekte + Historie in einer Transaktion →
    /// unkritische Folgeaktionen nach dem Commit.
    pub async fn transition(
        &self,
        order_id: &str,
        to: OrderStatus,
        ctx: TransitionContext,
    ) -> EngineResult<Order> {
        let mut order = self.orders.get(order_id)?;
        let from = order.status;

        if from.is_terminal() {
            return Err(EngineError::illegal_transition(
                from.as_str(),
                to.as_str(),
                format!("Auftrag ist im Endzustand '{}'", from.label_de()),
            ));
        }

        if !TRANSITIONS.contains(&(from, to)) {
            return Err(EngineError::illegal_transition(
                from.as_str(),
                to.as_str(),
                "Übergang ist nicht vorgesehen",
            ));
        }

        if let Err(reason) = self.check_preconditions(&order, to).await? {
            return Err(EngineError::illegal_transition(
                from.as_str(),
                to.as_str(),
                reason,
            ));
        }

        let now = self.clock.now();

        // In-progress braucht einen Produktionsblock; fehlt er,
        // wird er hier vor der Transaktion angelegt (Konflikt → Abbruch).
        if to == OrderStatus::InProgress {
            self.ensure_production_block(&order).await?;
        }

        // Seiteneffekte am Auftrag
        match to {
            OrderStatus::InProgress => {
                order.production_start = Some(now);
            }
            OrderStatus::Ready => {
                order.production_end = Some(now);
                order.production_minutes = order
                    .production_start
                    .map(|start| (now - start).num_minutes());
            }
            OrderStatus::Completed => {
                order.completed_at = Some(now);
                order.completed_by = ctx.changed_by.clone();
            }
            _ => {}
        }
        order.status = to;
        order.updated_at = Some(now);
        order.updated_by = ctx.changed_by.clone();

        // Statusänderung + Historie atomar
        self.begin()?;
        let result: EngineResult<()> = (|| {
            self.orders.update(&order)?;
            self.orders.append_history(&OrderStatusHistory {
                id: 0,
                order_id: order.id.clone(),
                from_status: Some(from),
                to_status: to,
                comment: ctx.comment.clone(),
                changed_at: now,
                changed_by: ctx.changed_by.clone(),
            })?;

            if to == OrderStatus::Cancelled {
                // Belegte Zeitblöcke freigeben, Maschine lösen
                self.blocks.deactivate_for_order(&order.id)?;
                order.assigned_machine_id = None;
                self.orders.update(&order)?;
            }

            Ok(())
        })();

        match result {
            Ok(()) => self.commit()?,
            Err(e) => {
                self.rollback();
                return Err(e);
            }
        }

        info!(
            order_id = %order.id,
            from = %from,
            to = %to,
            "Statuswechsel durchgeführt"
        );

        // Unkritische Folgeaktionen (nur in_progress → ready)
        if to == OrderStatus::Ready {
            self.run_completion_cascades(&order).await;
        }

        Ok(order)
    }

    /// Legt bei Bedarf den Produktionsblock für den Auftrag an
    async fn ensure_production_block(&self, order: &Order) -> EngineResult<()> {
        let machine_id = order
            .assigned_machine_id
            .as_deref()
            .ok_or_else(|| EngineError::Internal("Maschine fehlt".to_string()))?;

        let now = self.clock.now();
        let horizon = now + Duration::days(365);
        let existing = self
            .blocks
            .list_active_for_machine(machine_id, now.date() - Duration::days(365), horizon.date())?
            .into_iter()
            .any(|b| b.order_id.as_deref() == Some(order.id.as_str()));
        if existing {
            return Ok(());
        }

        let settings = self
            .settings
            .get_settings()
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        // Dauer aus der Stichzahl geschätzt, mindestens eine Stunde
        let base_minutes = order
            .stitch_count
            .map(|stitches| (stitches as f64 / 800.0 + 5.0))
            .unwrap_or(60.0);
        let duration = ((base_minutes * settings.distraction_factor).ceil() as i64).max(60);

        self.scheduler.schedule(order, machine_id, now, duration)?;
        Ok(())
    }

    // ==========================================
    // Folgeaktionen nach Produktionsabschluss
    // ==========================================

    /// Garnverbrauch buchen und Dokumentkaskade anstoßen.
    /// Fehler werden protokolliert und als Notiz am Auftrag
    /// hinterlegt; der Übergang bleibt bestehen.
    async fn run_completion_cascades(&self, order: &Order) {
        if let Err(e) = self.record_thread_usage(order) {
            warn!(order_id = %order.id, error = %e, "Automatische Garnbuchung fehlgeschlagen");
            self.attach_note(
                &order.id,
                &format!("Automatische Garnbuchung fehlgeschlagen: {}", e),
            );
        }

        if let Err(e) = self.mark_personalizations_produced(order) {
            warn!(order_id = %order.id, error = %e, "Personalisierungen konnten nicht abgeschlossen werden");
        }

        match self.settings.get_settings().await {
            Ok(settings) => {
                if settings.auto_create_packing_list && order.auto_create_packing_list {
                    if let Err(e) = self.cascade.run_for_order(order) {
                        warn!(order_id = %order.id, error = %e, "Dokumentkaskade fehlgeschlagen");
                        self.attach_note(
                            &order.id,
                            &format!("Automatische Packlisten-Erstellung fehlgeschlagen: {}", e),
                        );
                    }
                }
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Einstellungen nicht lesbar, Kaskade übersprungen");
            }
        }
    }

    /// Bucht den geschätzten Garnverbrauch gleichmäßig über
    /// die an den Designs hinterlegten Garne
    fn record_thread_usage(&self, order: &Order) -> EngineResult<usize> {
        let designs = self.designs.list_for_order(&order.id)?;
        let estimates = self.estimator.estimate_for_order(order, &designs);
        let now = self.clock.now();

        let mut recorded = 0;
        for estimate in estimates {
            let Some(thread_id) = estimate.thread_id else {
                // Farbe ohne Katalogreferenz kann nicht gebucht werden
                continue;
            };
            self.threads.append_usage(&ThreadUsage {
                id: 0,
                thread_id,
                order_id: Some(order.id.clone()),
                machine_id: order.assigned_machine_id.clone(),
                quantity_m: estimate.estimated_m,
                usage_type: UsageType::Production,
                used_at: now,
                recorded_by: None,
                notes: Some(format!("Automatische Buchung für {}", order.id)),
            })?;
            recorded += 1;
        }

        if recorded > 0 {
            info!(order_id = %order.id, recorded, "Garnverbrauch automatisch gebucht");
        }
        Ok(recorded)
    }

    /// Markiert alle Personalisierungen des Auftrags als gefertigt
    fn mark_personalizations_produced(&self, order: &Order) -> EngineResult<usize> {
        let personalizations = self.designs.list_personalizations_for_order(&order.id)?;
        let now = self.clock.now();
        let mut produced = 0;
        for p in personalizations.iter().filter(|p| !p.is_produced) {
            self.designs
                .mark_personalization_produced(p.id, now, order.updated_by.as_deref())?;
            produced += 1;
        }
        Ok(produced)
    }

    /// Hängt eine Notiz an den Auftrag (best effort)
    fn attach_note(&self, order_id: &str, note: &str) {
        let result = (|| -> EngineResult<()> {
            let mut order = self.orders.get(order_id)?;
            let mut notes = order.internal_notes.unwrap_or_default();
            if !notes.is_empty() {
                notes.push('\n');
            }
            notes.push_str("[Automatik] ");
            notes.push_str(note);
            order.internal_notes = Some(notes);
            self.orders.update(&order)?;
            Ok(())
        })();
        if let Err(e) = result {
            warn!(order_id = %order_id, error = %e, "Notiz konnte nicht gespeichert werden");
        }
    }
}
