// ==========================================
// StitchAdmin - DST-Analyse (Tajima)
// ==========================================
// Reine Funktion: Bytes → Designmetriken.
// Aufbau einer DST-Datei:
// - 512-Byte-Header (ASCII-Label in Byte 0..20,
//   weitere 20-Byte-Slots mit ASCII-Tags)
// - danach 3-Byte-Datensätze bis zur Endmarke 0xF3
// Bewegungseinheiten: 0.1 mm
// Regel: eine abgeschnittene Datei (keine Endmarke)
// liefert die bis dahin gesammelten Metriken mit
// success = true; kurze Dateien (< 512 Byte) liefern
// success = false statt eines Fehlers.
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header-Länge einer DST-Datei
pub const DST_HEADER_LEN: usize = 512;

/// Grenzwert Normalstich/Sprungstich in 0.1-mm-Einheiten
const NORMAL_STITCH_LIMIT: i32 = 121;

/// Stiche pro Minute für die Zeitschätzung
const STITCHES_PER_MINUTE: f64 = 800.0;

/// Minuten pro Farbwechsel
const MINUTES_PER_COLOR_CHANGE: f64 = 2.0;

/// Rüstzeit in Minuten
const SETUP_MINUTES: f64 = 5.0;

/// Analyse-Ergebnis einer DST-Datei
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DstAnalysis {
    pub success: bool,
    pub error: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,

    // Header
    pub dst_label: Option<String>,
    pub header_comments: Vec<String>,

    // Stichzählung
    pub total_stitches: i64,
    pub normal_stitches: i64,
    pub jump_stitches: i64,
    pub trim_count: i64,
    pub color_changes: i64,
    pub sequin_count: i64,
    pub stop_count: i64,
    pub unknown_commands: i64,

    // Längen
    pub total_length_mm: f64,
    pub avg_stitch_length_mm: f64,

    // Abmessungen (mm, eine Nachkommastelle)
    pub width_mm: f64,
    pub height_mm: f64,
    pub min_x_mm: f64,
    pub max_x_mm: f64,
    pub min_y_mm: f64,
    pub max_y_mm: f64,
    pub area_cm2: f64,

    // Farben
    pub estimated_colors: i64,

    // Qualität
    pub density_per_cm2: f64,
    pub density_rating: String,
    pub complexity_score: i64,
    pub complexity_rating: String,
    pub efficiency_rating: String,

    // Produktion
    pub estimated_time_minutes: f64,
    pub estimated_time_hours: f64,
    pub recommended_thread_weight: String,
    pub recommended_backing: String,
    pub production_difficulty: String,
}

impl DstAnalysis {
    fn failure(error: String, path: Option<&Path>) -> Self {
        Self {
            success: false,
            error: Some(error),
            file_path: path.map(|p| p.display().to_string()),
            file_name: path
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string()),
            dst_label: None,
            header_comments: vec![],
            total_stitches: 0,
            normal_stitches: 0,
            jump_stitches: 0,
            trim_count: 0,
            color_changes: 0,
            sequin_count: 0,
            stop_count: 0,
            unknown_commands: 0,
            total_length_mm: 0.0,
            avg_stitch_length_mm: 0.0,
            width_mm: 0.0,
            height_mm: 0.0,
            min_x_mm: 0.0,
            max_x_mm: 0.0,
            min_y_mm: 0.0,
            max_y_mm: 0.0,
            area_cm2: 0.0,
            estimated_colors: 1,
            density_per_cm2: 0.0,
            density_rating: "Niedrig".to_string(),
            complexity_score: 0,
            complexity_rating: "Niedrig".to_string(),
            efficiency_rating: "Unbekannt".to_string(),
            estimated_time_minutes: 0.0,
            estimated_time_hours: 0.0,
            recommended_thread_weight: "No. 40 (Standard)".to_string(),
            recommended_backing: "Mittleres Vlies".to_string(),
            production_difficulty: "Einfach".to_string(),
        }
    }
}

/// Kommandoarten im Stichstrom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DstCommand {
    ColorChange,
    Trim,
    Stop,
    Sequin,
    Unknown,
}

/// Klassifiziert einen 3-Byte-Datensatz unter der 0xF0-Maske
fn classify_command(b1: u8, b2: u8) -> DstCommand {
    if b2 == 0xFE && b1 == 0xB0 {
        DstCommand::ColorChange
    } else if b2 == 0xFD {
        DstCommand::Trim
    } else if b2 == 0xFF {
        DstCommand::Stop
    } else if b2 == 0xFE {
        DstCommand::Sequin
    } else {
        DstCommand::Unknown
    }
}

/// Dekodiert eine Bewegung in 0.1-mm-Einheiten
///
/// dx/dy aus den unteren 7 Bit von b0/b1, Vorzeichen aus
/// Bit 0/1 von b2, Faktor 81 bei gesetztem Bit 7/6 von b2.
fn decode_movement(b0: u8, b1: u8, b2: u8) -> (i32, i32) {
    let mut dx = (b0 & 0x7F) as i32;
    if b2 & 0x01 != 0 {
        dx = -dx;
    }
    if b2 & 0x80 != 0 {
        dx *= 81;
    }

    let mut dy = (b1 & 0x7F) as i32;
    if b2 & 0x02 != 0 {
        dy = -dy;
    }
    if b2 & 0x40 != 0 {
        dy *= 81;
    }

    (dx, dy)
}

/// Rundung auf eine Nachkommastelle (mm-Disziplin)
fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Liest einen 20-Byte-Header-Slot als ASCII-Tag
fn header_slot(header: &[u8], offset: usize) -> Option<String> {
    let slot = header.get(offset..offset + 20)?;
    let text: String = slot
        .iter()
        .filter(|b| b.is_ascii() && !b.is_ascii_control())
        .map(|b| *b as char)
        .collect();
    let trimmed = text.trim().trim_end_matches('\0').trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Analysiert eine DST-Datei vom Dateisystem
pub fn analyze_dst_file(path: &Path) -> DstAnalysis {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            return DstAnalysis::failure(
                format!("Datei konnte nicht gelesen werden: {}", e),
                Some(path),
            )
        }
    };

    let mut analysis = analyze_dst_bytes(&data);
    analysis.file_path = Some(path.display().to_string());
    analysis.file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string());
    analysis
}

/// Analysiert DST-Daten aus dem Speicher
pub fn analyze_dst_bytes(data: &[u8]) -> DstAnalysis {
    if data.len() < DST_HEADER_LEN {
        return DstAnalysis::failure(
            format!(
                "DST-Datei zu kurz: {} Byte (Header benötigt {})",
                data.len(),
                DST_HEADER_LEN
            ),
            None,
        );
    }

    let header = &data[..DST_HEADER_LEN];
    let stitch_data = &data[DST_HEADER_LEN..];

    // Header: Label in Slot 0, weitere Slots als Kommentare
    let dst_label = header_slot(header, 0);
    let mut header_comments = Vec::new();
    for offset in (20..DST_HEADER_LEN).step_by(20) {
        if let Some(tag) = header_slot(header, offset) {
            if tag.len() > 2 {
                header_comments.push(tag);
            }
        }
    }

    // Stichstrom: ein Durchlauf für Zählung, Farbfolge und Bounding-Box
    let mut total_stitches: i64 = 0;
    let mut normal_stitches: i64 = 0;
    let mut jump_stitches: i64 = 0;
    let mut trim_count: i64 = 0;
    let mut color_changes: i64 = 0;
    let mut sequin_count: i64 = 0;
    let mut stop_count: i64 = 0;
    let mut unknown_commands: i64 = 0;
    let mut total_length_tenth_mm: f64 = 0.0;

    let mut x: i32 = 0;
    let mut y: i32 = 0;
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;

    let mut i = 0;
    while i + 3 <= stitch_data.len() {
        let b0 = stitch_data[i];
        let b1 = stitch_data[i + 1];
        let b2 = stitch_data[i + 2];

        // Endmarke
        if b2 == 0xF3 {
            break;
        }

        // Kommandos unter der 0xF0-Maske
        if b2 & 0xF0 == 0xF0 {
            match classify_command(b1, b2) {
                DstCommand::ColorChange => color_changes += 1,
                DstCommand::Trim => trim_count += 1,
                DstCommand::Stop => stop_count += 1,
                DstCommand::Sequin => sequin_count += 1,
                DstCommand::Unknown => unknown_commands += 1,
            }
            i += 3;
            continue;
        }

        // Bewegung
        let (dx, dy) = decode_movement(b0, b1, b2);
        x += dx;
        y += dy;

        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        total_length_tenth_mm += ((dx as f64).powi(2) + (dy as f64).powi(2)).sqrt();

        if dx.abs() <= NORMAL_STITCH_LIMIT && dy.abs() <= NORMAL_STITCH_LIMIT {
            normal_stitches += 1;
        } else {
            jump_stitches += 1;
        }
        total_stitches += 1;

        i += 3;
    }
    // Ohne Endmarke gilt der Strom als abgeschnitten; die bis hier
    // gesammelten Werte werden trotzdem zurückgegeben.

    // Abmessungen (0.1 mm → mm)
    let (width_mm, height_mm, min_x_mm, max_x_mm, min_y_mm, max_y_mm) = if total_stitches > 0 {
        (
            round1((max_x - min_x).abs() as f64 / 10.0),
            round1((max_y - min_y).abs() as f64 / 10.0),
            round1(min_x as f64 / 10.0),
            round1(max_x as f64 / 10.0),
            round1(min_y as f64 / 10.0),
            round1(max_y as f64 / 10.0),
        )
    } else {
        (0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    };

    let area_cm2 = round2((width_mm / 10.0) * (height_mm / 10.0));

    // Dichte
    let density = if area_cm2 > 0.0 {
        normal_stitches as f64 / area_cm2
    } else {
        0.0
    };

    let density_rating = if density > 900.0 {
        "Sehr hoch"
    } else if density > 600.0 {
        "Hoch"
    } else if density > 300.0 {
        "Normal"
    } else {
        "Niedrig"
    };

    // Komplexität
    let mut complexity_score = 0;
    if color_changes > 10 {
        complexity_score += 3;
    }
    if jump_stitches > 50 {
        complexity_score += 2;
    }
    if normal_stitches > 50_000 {
        complexity_score += 2;
    }
    let complexity_rating = if complexity_score >= 6 {
        "Sehr hoch"
    } else if complexity_score >= 4 {
        "Hoch"
    } else if complexity_score >= 2 {
        "Mittel"
    } else {
        "Niedrig"
    };

    // Effizienz: Anteil Normalstiche
    let efficiency_rating = if total_stitches > 0 {
        let efficiency = normal_stitches as f64 / total_stitches as f64;
        if efficiency > 0.9 {
            "Sehr effizient"
        } else if efficiency > 0.7 {
            "Effizient"
        } else if efficiency > 0.5 {
            "Akzeptabel"
        } else {
            "Ineffizient"
        }
    } else {
        "Unbekannt"
    };

    // Zeitschätzung
    let estimated_time_minutes = (normal_stitches as f64 / STITCHES_PER_MINUTE
        + color_changes as f64 * MINUTES_PER_COLOR_CHANGE
        + SETUP_MINUTES)
        .round();

    // Garn-/Vlies-Empfehlung
    let recommended_thread_weight = if density < 400.0 {
        "No. 30 (Dick)"
    } else if density > 700.0 {
        "No. 50 (Fein)"
    } else {
        "No. 40 (Standard)"
    };

    let recommended_backing = if density > 800.0 || normal_stitches > 30_000 {
        "Schweres Vlies + Obervlies"
    } else if density < 400.0 {
        "Leichtes Vlies"
    } else {
        "Mittleres Vlies"
    };

    // Produktionsschwierigkeit
    let mut difficulty_score = 0;
    if color_changes > 10 {
        difficulty_score += 2;
    }
    if jump_stitches > 100 {
        difficulty_score += 2;
    }
    if width_mm > 300.0 {
        difficulty_score += 1;
    }
    if normal_stitches > 50_000 {
        difficulty_score += 1;
    }
    let production_difficulty = if difficulty_score >= 5 {
        "Sehr schwierig"
    } else if difficulty_score >= 3 {
        "Schwierig"
    } else if difficulty_score >= 1 {
        "Mittel"
    } else {
        "Einfach"
    };

    let total_length_mm = round2(total_length_tenth_mm / 10.0);
    let avg_stitch_length_mm = if normal_stitches > 0 {
        round2(total_length_mm / normal_stitches as f64)
    } else {
        0.0
    };

    DstAnalysis {
        success: true,
        error: None,
        file_path: None,
        file_name: None,
        dst_label,
        header_comments,
        total_stitches,
        normal_stitches,
        jump_stitches,
        trim_count,
        color_changes,
        sequin_count,
        stop_count,
        unknown_commands,
        total_length_mm,
        avg_stitch_length_mm,
        width_mm,
        height_mm,
        min_x_mm,
        max_x_mm,
        min_y_mm,
        max_y_mm,
        area_cm2,
        estimated_colors: color_changes + 1,
        density_per_cm2: round1(density),
        density_rating: density_rating.to_string(),
        complexity_score,
        complexity_rating: complexity_rating.to_string(),
        efficiency_rating: efficiency_rating.to_string(),
        estimated_time_minutes,
        estimated_time_hours: round2(estimated_time_minutes / 60.0),
        recommended_thread_weight: recommended_thread_weight.to_string(),
        recommended_backing: recommended_backing.to_string(),
        production_difficulty: production_difficulty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Baut eine minimale DST-Datei aus Stichprogramm-Records
    fn build_dst(records: &[[u8; 3]], with_end_marker: bool) -> Vec<u8> {
        let mut data = Vec::with_capacity(DST_HEADER_LEN + records.len() * 3 + 3);
        let mut header = vec![0x20u8; DST_HEADER_LEN];
        header[..9].copy_from_slice(b"LA:TEST  ");
        data.extend_from_slice(&header);
        for record in records {
            data.extend_from_slice(record);
        }
        if with_end_marker {
            data.extend_from_slice(&[0x00, 0x00, 0xF3]);
        }
        data
    }

    /// Bewegung +dx/+dy (0.1 mm, ohne Vorzeichen/Skalierung)
    fn movement(dx: u8, dy: u8) -> [u8; 3] {
        [dx & 0x7F, dy & 0x7F, 0x00]
    }

    #[test]
    fn test_short_file_is_structured_failure() {
        let analysis = analyze_dst_bytes(&[0u8; 100]);
        assert!(!analysis.success);
        assert!(analysis.error.as_deref().unwrap().contains("zu kurz"));
    }

    #[test]
    fn test_simple_square() {
        // Quadrat 10 mm x 10 mm in 2-mm-Schritten: 4 Kanten à 5 Stiche
        let mut records = Vec::new();
        for _ in 0..5 {
            records.push(movement(20, 0));
        }
        for _ in 0..5 {
            records.push([0, 20, 0x00]);
        }
        for _ in 0..5 {
            records.push([20, 0, 0x01]); // dx negativ
        }
        for _ in 0..5 {
            records.push([0, 20, 0x02]); // dy negativ
        }
        let data = build_dst(&records, true);
        let analysis = analyze_dst_bytes(&data);

        assert!(analysis.success);
        assert_eq!(analysis.total_stitches, 20);
        assert_eq!(analysis.normal_stitches, 20);
        assert_eq!(analysis.jump_stitches, 0);
        assert!((analysis.width_mm - 10.0).abs() < 0.1);
        assert!((analysis.height_mm - 10.0).abs() < 0.1);
        assert_eq!(analysis.dst_label.as_deref(), Some("LA:TEST"));
    }

    #[test]
    fn test_commands_are_counted() {
        let records = vec![
            movement(50, 0),
            [0xB0, 0xB0, 0xFE], // Farbwechsel (b1 = 0xB0)
            movement(50, 0),
            [0x00, 0x00, 0xFD], // Trim
            [0x00, 0x11, 0xFE], // Sequin (b1 != 0xB0)
            [0x00, 0x00, 0xFF], // Stop
            [0x00, 0x00, 0xF8], // Unbekanntes Kommando unter der Maske
            movement(50, 0),
        ];
        let data = build_dst(&records, true);
        let analysis = analyze_dst_bytes(&data);

        assert_eq!(analysis.total_stitches, 3);
        assert_eq!(analysis.color_changes, 1);
        assert_eq!(analysis.trim_count, 1);
        assert_eq!(analysis.sequin_count, 1);
        assert_eq!(analysis.stop_count, 1);
        assert_eq!(analysis.unknown_commands, 1);
        assert_eq!(analysis.estimated_colors, 2);
    }

    #[test]
    fn test_scaled_movement_is_jump() {
        // Bit 7 von b2: dx * 81 → weit über der Normalstich-Grenze
        let records = vec![movement(10, 0), [10, 0, 0x80]];
        let data = build_dst(&records, true);
        let analysis = analyze_dst_bytes(&data);

        assert_eq!(analysis.normal_stitches, 1);
        assert_eq!(analysis.jump_stitches, 1);
    }

    #[test]
    fn test_truncated_stream_succeeds() {
        let records: Vec<[u8; 3]> = (0..500).map(|_| movement(10, 10)).collect();
        let data = build_dst(&records, false); // keine Endmarke
        let analysis = analyze_dst_bytes(&data);

        assert!(analysis.success);
        assert_eq!(analysis.total_stitches, 500);
        assert!(analysis.width_mm > 0.0);
    }

    #[test]
    fn test_decode_movement_signs_and_scale() {
        assert_eq!(decode_movement(10, 20, 0x00), (10, 20));
        assert_eq!(decode_movement(10, 20, 0x01), (-10, 20));
        assert_eq!(decode_movement(10, 20, 0x02), (10, -20));
        assert_eq!(decode_movement(10, 20, 0x03), (-10, -20));
        assert_eq!(decode_movement(2, 3, 0xC0), (162, 243));
        // Bit 7 von b0/b1 wird ignoriert (nur die unteren 7 Bit zählen)
        assert_eq!(decode_movement(0x8A, 0x00, 0x00), (10, 0));
    }

    #[test]
    fn test_estimated_time_formula() {
        // 800 Normalstiche + 1 Farbwechsel → 1 + 2 + 5 = 8 Minuten
        let mut records = Vec::new();
        for _ in 0..800 {
            records.push(movement(1, 0));
        }
        records.push([0xB0, 0xB0, 0xFE]);
        let data = build_dst(&records, true);
        let analysis = analyze_dst_bytes(&data);

        assert_eq!(analysis.estimated_time_minutes, 8.0);
    }
}
