// ==========================================
// StitchAdmin - Design-Domänenmodell
// ==========================================
// Mehrere Designs pro Auftrag (Multi-Position),
// z.B. Brust links personalisiert + Rücken-Sammeldesign.
// Personalisierung: ein Datensatz pro Stück und Position.
// ==========================================

use crate::domain::types::{ApprovalStatus, DesignType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Design-Position auf dem Textil (Code, deutsches Label)
pub const POSITION_CHOICES: &[(&str, &str)] = &[
    ("brust_links", "Brust links"),
    ("brust_rechts", "Brust rechts"),
    ("brust_mitte", "Brust Mitte"),
    ("aermel_links", "Ärmel links"),
    ("aermel_rechts", "Ärmel rechts"),
    ("ruecken", "Rücken"),
    ("ruecken_oben", "Rücken oben"),
    ("ruecken_unten", "Rücken unten"),
    ("kragen", "Kragen/Nacken"),
    ("bauch", "Bauch"),
    ("hosenbein_links", "Hosenbein links"),
    ("hosenbein_rechts", "Hosenbein rechts"),
    ("kappe_vorne", "Kappe vorne"),
    ("kappe_seite", "Kappe Seite"),
    ("andere", "Andere Position"),
];

/// Garnfarbe eines Designs (JSON in order_designs.thread_colors)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignThreadColor {
    /// Referenz in den Garnkatalog (optional bei Altdaten)
    pub thread_id: Option<String>,
    pub color_name: String,
    /// Herstellernummer, z.B. Madeira "1147"
    pub color_number: Option<String>,
}

/// Design einer Position (0..N pro Auftrag)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDesign {
    pub id: String,
    pub order_id: String,

    // Position auf dem Textil
    pub position: String,
    pub position_label: Option<String>,

    pub design_type: DesignType,
    pub is_personalized: bool,

    // Datei
    pub design_file_path: Option<String>,
    pub design_name: Option<String>,

    // Stickerei-Details (design_type = stick)
    pub stitch_count: Option<i64>,
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub thread_colors: Vec<DesignThreadColor>,
    pub estimated_time_minutes: Option<i64>,

    // Druck-Details (druck/flex)
    pub print_width_cm: Option<f64>,
    pub print_height_cm: Option<f64>,

    // Freigabe (pro Position)
    pub approval_required: bool,
    pub approval_status: ApprovalStatus,
    pub approved_at: Option<NaiveDateTime>,
    pub approval_notes: Option<String>,

    // Preis
    pub setup_price: f64,
    pub price_per_piece: f64,

    pub sort_order: i64,

    // Metadaten
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl OrderDesign {
    /// Benutzerfreundliche Positionsbezeichnung
    pub fn position_label(&self) -> String {
        if let Some(label) = self.position_label.as_deref() {
            if !label.is_empty() {
                return label.to_string();
            }
        }
        POSITION_CHOICES
            .iter()
            .find(|(code, _)| *code == self.position)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| self.position.clone())
    }

    /// Gesamtpreis dieser Position für `quantity` Stück
    pub fn total_price(&self, quantity: i64) -> f64 {
        self.setup_price + self.price_per_piece * quantity as f64
    }

    /// Blockiert diese Position den Produktionsstart?
    pub fn blocks_production(&self) -> bool {
        self.approval_required && !self.approval_status.unlocks_production()
    }
}

/// Personalisierung pro Stück (bis zu 3 Textzeilen)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemPersonalization {
    pub id: i64,
    pub order_item_id: i64,
    pub order_design_id: String,

    pub text_line_1: Option<String>,
    pub text_line_2: Option<String>,
    pub text_line_3: Option<String>,

    pub font_name: Option<String>,
    pub custom_color: Option<String>,

    /// Produktionsreihenfolge an der Maschine
    pub sequence_number: Option<i64>,

    pub is_produced: bool,
    pub produced_at: Option<NaiveDateTime>,
    pub produced_by: Option<String>,

    pub qc_checked: bool,
    pub qc_notes: Option<String>,

    pub created_at: NaiveDateTime,
}

impl OrderItemPersonalization {
    /// Vollständiger Text (Zeilen mit \n verbunden)
    pub fn full_text(&self) -> String {
        [&self.text_line_1, &self.text_line_2, &self.text_line_3]
            .iter()
            .filter_map(|line| line.as_deref())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Kurzdarstellung für Listen
    pub fn display_text(&self) -> String {
        match (self.text_line_1.as_deref(), self.text_line_2.as_deref()) {
            (Some(l1), Some(l2)) if !l1.is_empty() && !l2.is_empty() => format!("{} {}", l1, l2),
            (Some(l1), _) if !l1.is_empty() => l1.to_string(),
            _ => format!("#{}", self.sequence_number.unwrap_or(0)),
        }
    }
}

// ==========================================
// Design-Dateiarten
// ==========================================
// Klassifizierung rein über die Dateiendung
// (case-insensitive); nur DST wird analysiert.

/// Dateiart einer Design-Datei
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignFileKind {
    Embroidery, // .dst .pes .jef .exp .vp3 .vp4
    Print,      // .png .jpg .jpeg .svg .ai .pdf
    Unknown,
}

/// Klassifiziert eine Design-Datei anhand der Endung
pub fn classify_design_file(path: &str) -> DesignFileKind {
    let ext = path
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "dst" | "pes" | "jef" | "exp" | "vp3" | "vp4" => DesignFileKind::Embroidery,
        "png" | "jpg" | "jpeg" | "svg" | "ai" | "pdf" => DesignFileKind::Print,
        _ => DesignFileKind::Unknown,
    }
}

/// Nur DST-Dateien liefern automatische Metriken
pub fn is_dst_file(path: &str) -> bool {
    path.rsplit('.')
        .next()
        .map(|e| e.eq_ignore_ascii_case("dst"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn design() -> OrderDesign {
        OrderDesign {
            id: "D1".to_string(),
            order_id: "A2025-001".to_string(),
            position: "brust_links".to_string(),
            position_label: None,
            design_type: DesignType::Stick,
            is_personalized: true,
            design_file_path: Some("designs/logo.dst".to_string()),
            design_name: Some("Vereinslogo".to_string()),
            stitch_count: Some(6000),
            width_mm: Some(90.0),
            height_mm: Some(60.0),
            thread_colors: vec![],
            estimated_time_minutes: Some(12),
            print_width_cm: None,
            print_height_cm: None,
            approval_required: true,
            approval_status: ApprovalStatus::Pending,
            approved_at: None,
            approval_notes: None,
            setup_price: 25.0,
            price_per_piece: 3.50,
            sort_order: 0,
            created_at: NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_position_label_fallback() {
        assert_eq!(design().position_label(), "Brust links");
    }

    #[test]
    fn test_total_price() {
        assert_eq!(design().total_price(16), 25.0 + 16.0 * 3.50);
    }

    #[test]
    fn test_blocks_production() {
        let mut d = design();
        assert!(d.blocks_production());
        d.approval_status = ApprovalStatus::Approved;
        assert!(!d.blocks_production());
        d.approval_status = ApprovalStatus::Pending;
        d.approval_required = false;
        assert!(!d.blocks_production());
    }

    #[test]
    fn test_classify_design_file() {
        assert_eq!(classify_design_file("logo.DST"), DesignFileKind::Embroidery);
        assert_eq!(classify_design_file("logo.pes"), DesignFileKind::Embroidery);
        assert_eq!(classify_design_file("motiv.PNG"), DesignFileKind::Print);
        assert_eq!(classify_design_file("vektor.ai"), DesignFileKind::Print);
        assert_eq!(classify_design_file("datei.docx"), DesignFileKind::Unknown);
        assert!(is_dst_file("pfad/zum/logo.Dst"));
        assert!(!is_dst_file("logo.pes"));
    }

    #[test]
    fn test_personalization_text() {
        let p = OrderItemPersonalization {
            id: 1,
            order_item_id: 1,
            order_design_id: "D1".to_string(),
            text_line_1: Some("Max".to_string()),
            text_line_2: Some("Mustermann".to_string()),
            text_line_3: None,
            font_name: None,
            custom_color: None,
            sequence_number: Some(1),
            is_produced: false,
            produced_at: None,
            produced_by: None,
            qc_checked: false,
            qc_notes: None,
            created_at: NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        };
        assert_eq!(p.full_text(), "Max\nMustermann");
        assert_eq!(p.display_text(), "Max Mustermann");
    }
}
