// ==========================================
// StitchAdmin - Externe Dienste (Schnittstellen)
// ==========================================
// PDF-Erzeugung und E-Mail-Versand sind externe
// Mitspieler; der Kern konsumiert nur Dateipfad
// bzw. Versandergebnis. Die Implementierungen
// liegen außerhalb dieses Crates.
// ==========================================

use crate::config::WorkshopSettings;
use crate::domain::design::OrderDesign;
use crate::domain::order::Order;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;

/// Dominante Farbe aus der Design-Vorschau
/// (32er-RGB-Raster, Weißanteile verworfen)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DominantColor {
    pub hex: String,
    pub percent: f64,
    /// Deutscher Farbname, z.B. "Dunkelblau"
    pub name_de: String,
}

/// Ergebnis eines E-Mail-Versands
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// E-Mail-Versand
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachments: &[PathBuf],
    ) -> Result<DispatchOutcome, Box<dyn Error + Send + Sync>>;
}

/// PDF-Erzeugung (Design-Freigabeformular)
///
/// Liefert den Pfad der erzeugten Datei; bei Druck-Designs
/// zusätzlich die dominanten Farben der Vorschau.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_design_approval(
        &self,
        order: &Order,
        design: &OrderDesign,
        settings: &WorkshopSettings,
        image_path: Option<&str>,
    ) -> Result<(PathBuf, Vec<DominantColor>), Box<dyn Error + Send + Sync>>;
}

// ==========================================
// Leere Implementierungen (Tests, Offline-Betrieb)
// ==========================================

/// E-Mail-Versand, der nichts verschickt
#[derive(Debug, Default)]
pub struct NoopEmailDispatcher;

#[async_trait]
impl EmailDispatcher for NoopEmailDispatcher {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _body: &str,
        _attachments: &[PathBuf],
    ) -> Result<DispatchOutcome, Box<dyn Error + Send + Sync>> {
        Ok(DispatchOutcome {
            success: true,
            message: None,
        })
    }
}

/// PDF-Erzeugung, die nur einen Platzhalterpfad liefert
#[derive(Debug, Default)]
pub struct NoopPdfRenderer;

#[async_trait]
impl PdfRenderer for NoopPdfRenderer {
    async fn render_design_approval(
        &self,
        order: &Order,
        design: &OrderDesign,
        _settings: &WorkshopSettings,
        _image_path: Option<&str>,
    ) -> Result<(PathBuf, Vec<DominantColor>), Box<dyn Error + Send + Sync>> {
        Ok((
            PathBuf::from(format!("freigabe_{}_{}.pdf", order.id, design.id)),
            vec![],
        ))
    }
}
