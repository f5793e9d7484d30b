//! Plain-text tables for the terminal report.

use std::fmt::{self, Write as _};

use stone_sieve_detect::StoneRecord;

use crate::io::ImageReport;
use crate::tally::SieveTally;

/// Right-aligned columns separated by two spaces.
#[derive(Debug, Clone)]
struct TextTable {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let line = |f: &mut fmt::Formatter<'_>, cells: &[&str]| -> fmt::Result {
            for (i, (cell, &w)) in cells.iter().zip(&widths).enumerate() {
                if i > 0 {
                    f.write_str("  ")?;
                }
                write!(f, "{cell:>w$}")?;
            }
            writeln!(f)
        };
        line(f, self.headers.as_slice())?;
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            line(f, cells.as_slice())?;
        }
        Ok(())
    }
}

/// Per-stone table with two decimals.
pub fn stone_table(stones: &[StoneRecord]) -> String {
    let mut table = TextTable::new(vec![
        "Stone",
        "Shortest Width (mm)",
        "Dimension1 (mm)",
        "Dimension2 (mm)",
    ]);
    for s in stones {
        table.push(vec![
            s.label(),
            format!("{:.2}", s.shortest_width_mm),
            format!("{:.2}", s.dimension1_mm),
            format!("{:.2}", s.dimension2_mm),
        ]);
    }
    table.to_string()
}

/// Aggregate category table, coarsest class first.
pub fn category_table(tally: &SieveTally) -> String {
    let mut table = TextTable::new(vec![
        "Stone Type (Category)",
        "Stone Count",
        "Stone Percentage",
    ]);
    for row in tally.rows() {
        table.push(vec![
            row.class.label().to_string(),
            row.count.to_string(),
            format!("{:.2}", row.percentage),
        ]);
    }
    table.to_string()
}

/// Block printed after each photo.
pub fn image_section(report: &ImageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image: {}", report.image_path);
    match (&report.analysis, &report.error) {
        (Some(analysis), _) => {
            if !analysis.calibration.is_calibrated() {
                out.push_str("(no calibration entry; values are uncalibrated)\n");
            }
            if analysis.report.is_empty() {
                out.push_str("No stones detected.\n");
            } else {
                out.push_str(&stone_table(&analysis.report.stones));
            }
            let _ = writeln!(out, "Total stones: {}", analysis.report.total());
            if let Some(path) = &report.output_path {
                let _ = writeln!(out, "Annotated image saved to {path}");
            }
        }
        (None, Some(err)) => {
            let _ = writeln!(out, "Failed: {err}");
        }
        (None, None) => {}
    }
    out
}

/// Closing block after all photos.
pub fn summary(tally: &SieveTally) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total stones across all images: {}", tally.total());
    if tally.failed_images > 0 {
        let _ = writeln!(out, "Images failed: {}", tally.failed_images);
    }
    out.push_str("\nAggregate Stone Categories:\n");
    out.push_str(&category_table(tally));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use stone_sieve_core::{RotatedRect, SieveClass};
    use stone_sieve_detect::StoneReport;

    fn record(stone: usize, w: f64, d1: f64) -> StoneRecord {
        StoneRecord {
            stone,
            shortest_width_mm: w,
            dimension1_mm: d1,
            dimension2_mm: w,
            class: SieveClass::classify(w),
            rect: RotatedRect {
                center: Point2::new(10.0, 10.0),
                width: 4.0,
                height: 2.0,
                angle: 0.0,
            },
        }
    }

    #[test]
    fn stone_table_is_right_aligned_with_two_decimals() {
        let text = stone_table(&[record(1, 16.6, 33.8), record(12, 3.25, 4.0)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "  Stone  Shortest Width (mm)  Dimension1 (mm)  Dimension2 (mm)"
        );
        assert!(lines[1].starts_with(" Stone1  "));
        assert!(lines[1].ends_with("16.60"));
        assert!(lines[1].contains("33.80"));
        assert!(lines[2].starts_with("Stone12"));
        assert!(lines[2].ends_with("3.25"));
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn category_table_lists_every_class() {
        let mut report = StoneReport::default();
        report.counts.record_width(50.0);
        report.counts.record_width(3.0);
        report.stones = vec![record(1, 50.0, 60.0), record(2, 3.0, 4.0)];
        let tally = SieveTally::new().absorb(&report);

        let text = category_table(&tally);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("Stone Type (Category)"));
        assert!(lines[1].contains("> 40mm") && lines[1].ends_with("50.00"));
        assert!(lines[3].contains("20mm to 10mm") && lines[3].ends_with("0.00"));
        assert!(lines[5].contains("4.75mm to 0mm") && lines[5].ends_with("50.00"));
    }

    #[test]
    fn summary_reports_totals_and_failures() {
        let tally = SieveTally::new().record_failure();
        let text = summary(&tally);
        assert!(text.contains("Total stones across all images: 0"));
        assert!(text.contains("Images failed: 1"));
        assert!(text.contains("Aggregate Stone Categories:"));
    }

    #[test]
    fn failed_image_section_shows_error() {
        let report = ImageReport {
            image_path: "S101.jpg".into(),
            output_path: None,
            analysis: None,
            error: Some("no reference object found".into()),
        };
        let text = image_section(&report);
        assert_eq!(text, "Image: S101.jpg\nFailed: no reference object found\n");
    }
}
