//! Cross-image accumulation.

use serde::{Deserialize, Serialize};
use stone_sieve_core::{CategoryCounts, SieveClass};
use stone_sieve_detect::StoneReport;

/// Running totals over a batch of photos.
///
/// Built by folding per-image reports with [`SieveTally::absorb`]; the sum of
/// `stones_per_image` always equals `counts.total()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SieveTally {
    pub counts: CategoryCounts,
    /// Stone totals of the successfully analyzed photos, in input order.
    pub stones_per_image: Vec<usize>,
    pub failed_images: usize,
}

/// One row of the aggregate category table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryRow {
    pub class: SieveClass,
    pub count: usize,
    pub percentage: f64,
}

impl SieveTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(mut self, report: &StoneReport) -> Self {
        self.counts.merge(&report.counts);
        self.stones_per_image.push(report.total());
        self
    }

    pub fn record_failure(mut self) -> Self {
        self.failed_images += 1;
        self
    }

    pub fn total(&self) -> usize {
        self.stones_per_image.iter().sum()
    }

    pub fn analyzed_images(&self) -> usize {
        self.stones_per_image.len()
    }

    /// Aggregate table rows, coarsest class first.
    pub fn rows(&self) -> Vec<CategoryRow> {
        let percentages = self.counts.percentages();
        self.counts
            .iter()
            .zip(percentages)
            .map(|((class, count), percentage)| CategoryRow {
                class,
                count,
                percentage,
            })
            .collect()
    }
}

/// Fold a batch of per-image reports into one tally.
pub fn aggregate<'a>(reports: impl IntoIterator<Item = &'a StoneReport>) -> SieveTally {
    reports
        .into_iter()
        .fold(SieveTally::new(), |tally, report| tally.absorb(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use stone_sieve_core::RotatedRect;
    use stone_sieve_detect::StoneRecord;

    fn report(widths: &[f64]) -> StoneReport {
        let mut report = StoneReport::default();
        for (i, &w) in widths.iter().enumerate() {
            let class = report.counts.record_width(w);
            report.stones.push(StoneRecord {
                stone: i + 1,
                shortest_width_mm: w,
                dimension1_mm: w,
                dimension2_mm: w,
                class,
                rect: RotatedRect {
                    center: Point2::new(0.0, 0.0),
                    width: 1.0,
                    height: 1.0,
                    angle: 0.0,
                },
            });
        }
        report
    }

    #[test]
    fn empty_batch_has_zero_percentages() {
        let tally = aggregate(std::iter::empty());
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.analyzed_images(), 0);
        for row in tally.rows() {
            assert_eq!(row.count, 0);
            assert_eq!(row.percentage, 0.0);
        }
    }

    #[test]
    fn category_counts_sum_across_images() {
        let a = report(&[50.0, 25.0, 3.0]);
        let b = report(&[12.0, 3.0]);
        let tally = aggregate([&a, &b]);

        assert_eq!(tally.counts.get(SieveClass::Over40), 1);
        assert_eq!(tally.counts.get(SieveClass::From20To40), 1);
        assert_eq!(tally.counts.get(SieveClass::From10To20), 1);
        assert_eq!(tally.counts.get(SieveClass::From4_75To10), 0);
        assert_eq!(tally.counts.get(SieveClass::UpTo4_75), 2);
        assert_eq!(tally.counts.total(), 5);
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.stones_per_image, vec![3, 2]);
    }

    #[test]
    fn rows_sum_to_one_hundred_percent() {
        let a = report(&[50.0, 25.0, 3.0, 7.0]);
        let tally = SieveTally::new().absorb(&a).record_failure();
        let rows = tally.rows();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].class, SieveClass::Over40);
        assert_relative_eq!(rows[0].percentage, 25.0);
        assert_relative_eq!(rows.iter().map(|r| r.percentage).sum::<f64>(), 100.0);
        assert_eq!(tally.failed_images, 1);
        assert_eq!(tally.analyzed_images(), 1);
    }
}
