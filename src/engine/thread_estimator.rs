// ==========================================
// StitchAdmin - Garnverbrauchs-Schätzer
// ==========================================
// Formel: Stichzahl × 0.5 mm × 1.1 Sicherheitsfaktor,
// gleichmäßig auf die gewählten Garnfarben verteilt.
// Eine Gewichtung pro Farbe gibt es nicht.
// ==========================================

use crate::domain::design::{DesignThreadColor, OrderDesign};
use crate::domain::order::Order;
use serde::{Deserialize, Serialize};

/// Garnlänge pro Stich (mm)
pub const MM_PER_STITCH: f64 = 0.5;

/// Sicherheitsfaktor auf die Schätzung
pub const SAFETY_FACTOR: f64 = 1.1;

/// Schätzwert für eine Garnfarbe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadEstimate {
    pub thread_id: Option<String>,
    pub color_name: String,
    pub color_number: Option<String>,
    pub estimated_m: f64,
}

/// Garnverbrauchs-Schätzer
pub struct ThreadEstimator;

impl Default for ThreadEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Gesamtverbrauch in Metern für eine Stichzahl
    pub fn total_meters(&self, stitch_count: i64) -> f64 {
        stitch_count.max(0) as f64 * MM_PER_STITCH * SAFETY_FACTOR / 1000.0
    }

    /// Sammelt die Garnfarben aller Designs eines Auftrags
    /// (dedupliziert über thread_id bzw. Farbname+Nummer)
    pub fn collect_colors(&self, designs: &[OrderDesign]) -> Vec<DesignThreadColor> {
        let mut colors: Vec<DesignThreadColor> = Vec::new();
        for design in designs {
            for color in &design.thread_colors {
                let already_known = colors.iter().any(|existing| match (&existing.thread_id, &color.thread_id) {
                    (Some(a), Some(b)) => a == b,
                    _ => {
                        existing.color_name == color.color_name
                            && existing.color_number == color.color_number
                    }
                });
                if !already_known {
                    colors.push(color.clone());
                }
            }
        }
        colors
    }

    /// Schätzt den Verbrauch pro Farbe für einen Auftrag
    ///
    /// Grundlage ist order.stitch_count und die Farben der Designs.
    /// Ohne Farben wird der Gesamtwert als ein Eintrag ohne
    /// Garnreferenz geliefert.
    pub fn estimate_for_order(
        &self,
        order: &Order,
        designs: &[OrderDesign],
    ) -> Vec<ThreadEstimate> {
        let stitch_count = order.stitch_count.unwrap_or(0);
        if stitch_count <= 0 {
            return vec![];
        }

        let total_m = self.total_meters(stitch_count);
        let colors = self.collect_colors(designs);

        if colors.is_empty() {
            return vec![ThreadEstimate {
                thread_id: None,
                color_name: "Unbekannt".to_string(),
                color_number: None,
                estimated_m: total_m,
            }];
        }

        let per_color = total_m / colors.len() as f64;
        colors
            .into_iter()
            .map(|color| ThreadEstimate {
                thread_id: color.thread_id,
                color_name: color.color_name,
                color_number: color.color_number,
                estimated_m: per_color,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ApprovalStatus, DesignStatus, DesignType, OrderStatus, OrderType};
    use chrono::NaiveDate;

    fn order_with_stitches(stitch_count: i64) -> Order {
        Order {
            id: "A2025-001".to_string(),
            customer_id: "K001".to_string(),
            order_type: OrderType::Embroidery,
            status: OrderStatus::InProgress,
            description: None,
            internal_notes: None,
            customer_notes: None,
            stitch_count: Some(stitch_count),
            design_width_mm: None,
            design_height_mm: None,
            design_status: DesignStatus::Ready,
            design_file_path: None,
            total_price: 0.0,
            deposit_amount: 0.0,
            discount_percent: 0.0,
            due_date: None,
            rush_order: false,
            auto_create_packing_list: true,
            assigned_machine_id: None,
            production_start: None,
            production_end: None,
            production_minutes: None,
            created_at: NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            created_by: None,
            updated_at: None,
            updated_by: None,
            completed_at: None,
            completed_by: None,
        }
    }

    fn design_with_colors(id: &str, colors: &[(&str, &str)]) -> OrderDesign {
        OrderDesign {
            id: id.to_string(),
            order_id: "A2025-001".to_string(),
            position: "brust_links".to_string(),
            position_label: None,
            design_type: DesignType::Stick,
            is_personalized: false,
            design_file_path: None,
            design_name: None,
            stitch_count: None,
            width_mm: None,
            height_mm: None,
            thread_colors: colors
                .iter()
                .map(|(thread_id, name)| DesignThreadColor {
                    thread_id: Some(thread_id.to_string()),
                    color_name: name.to_string(),
                    color_number: None,
                })
                .collect(),
            estimated_time_minutes: None,
            print_width_cm: None,
            print_height_cm: None,
            approval_required: false,
            approval_status: ApprovalStatus::Skipped,
            approved_at: None,
            approval_notes: None,
            setup_price: 0.0,
            price_per_piece: 0.0,
            sort_order: 0,
            created_at: NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_total_meters_formula() {
        let estimator = ThreadEstimator::new();
        // 6000 Stiche × 0.5 mm × 1.1 = 3300 mm = 3.3 m
        assert!((estimator.total_meters(6000) - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_even_split_across_colors() {
        let estimator = ThreadEstimator::new();
        let order = order_with_stitches(6000);
        let designs = vec![
            design_with_colors("D1", &[("G1", "Rot"), ("G2", "Blau")]),
            design_with_colors("D2", &[("G3", "Gold")]),
        ];

        let estimates = estimator.estimate_for_order(&order, &designs);
        assert_eq!(estimates.len(), 3);
        for estimate in &estimates {
            assert!((estimate.estimated_m - 1.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_duplicate_colors_counted_once() {
        let estimator = ThreadEstimator::new();
        let order = order_with_stitches(4000);
        // G1 auf beiden Positionen → nur einmal in der Schätzung
        let designs = vec![
            design_with_colors("D1", &[("G1", "Rot")]),
            design_with_colors("D2", &[("G1", "Rot"), ("G2", "Blau")]),
        ];

        let estimates = estimator.estimate_for_order(&order, &designs);
        assert_eq!(estimates.len(), 2);
    }

    #[test]
    fn test_no_stitches_yields_empty() {
        let estimator = ThreadEstimator::new();
        let order = order_with_stitches(0);
        assert!(estimator.estimate_for_order(&order, &[]).is_empty());
    }

    #[test]
    fn test_no_colors_yields_single_unassigned_estimate() {
        let estimator = ThreadEstimator::new();
        let order = order_with_stitches(2000);
        let estimates = estimator.estimate_for_order(&order, &[]);
        assert_eq!(estimates.len(), 1);
        assert!(estimates[0].thread_id.is_none());
    }
}
