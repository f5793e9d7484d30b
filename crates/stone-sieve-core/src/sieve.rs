//! Sieve classes and per-class stone counts.
//!
//! A stone is retained on the coarsest screen its shortest width exceeds:
//! each class is open at its lower edge and closed at its upper edge, so a
//! value of exactly 20 mm lands in `20..=40` rather than `10..=20`. The finest
//! class also collects zero and negative widths, which makes the classes a
//! total partition of the real line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Screen openings in millimeters, coarsest first.
pub const SCREEN_OPENINGS_MM: [f64; 4] = [40.0, 20.0, 10.0, 4.75];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SieveClass {
    /// `(40, inf)`
    Over40,
    /// `(20, 40]`
    From20To40,
    /// `(10, 20]`
    From10To20,
    /// `(4.75, 10]`
    From4_75To10,
    /// `(-inf, 4.75]`
    UpTo4_75,
}

impl SieveClass {
    /// All classes, coarsest first.
    pub const ALL: [SieveClass; 5] = [
        SieveClass::Over40,
        SieveClass::From20To40,
        SieveClass::From10To20,
        SieveClass::From4_75To10,
        SieveClass::UpTo4_75,
    ];

    /// Classify by shortest width in millimeters.
    ///
    /// NaN compares false against every opening and falls to the finest class.
    pub fn classify(shortest_width_mm: f64) -> Self {
        let [o40, o20, o10, o4_75] = SCREEN_OPENINGS_MM;
        if shortest_width_mm > o40 {
            SieveClass::Over40
        } else if shortest_width_mm > o20 {
            SieveClass::From20To40
        } else if shortest_width_mm > o10 {
            SieveClass::From10To20
        } else if shortest_width_mm > o4_75 {
            SieveClass::From4_75To10
        } else {
            SieveClass::UpTo4_75
        }
    }

    pub fn index(self) -> usize {
        match self {
            SieveClass::Over40 => 0,
            SieveClass::From20To40 => 1,
            SieveClass::From10To20 => 2,
            SieveClass::From4_75To10 => 3,
            SieveClass::UpTo4_75 => 4,
        }
    }

    /// Report label.
    pub fn label(self) -> &'static str {
        match self {
            SieveClass::Over40 => "> 40mm",
            SieveClass::From20To40 => "40mm to 20mm",
            SieveClass::From10To20 => "20mm to 10mm",
            SieveClass::From4_75To10 => "10mm to 4.75mm",
            SieveClass::UpTo4_75 => "4.75mm to 0mm",
        }
    }
}

impl fmt::Display for SieveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stone counts per sieve class.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts {
    counts: [usize; 5],
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, class: SieveClass) {
        self.counts[class.index()] += 1;
    }

    /// Classify a shortest width and count it; returns the class.
    pub fn record_width(&mut self, shortest_width_mm: f64) -> SieveClass {
        let class = SieveClass::classify(shortest_width_mm);
        self.record(class);
        class
    }

    pub fn get(&self, class: SieveClass) -> usize {
        self.counts[class.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Element-wise sum.
    pub fn merge(&mut self, other: &CategoryCounts) {
        for (dst, src) in self.counts.iter_mut().zip(other.counts) {
            *dst += src;
        }
    }

    /// Share of each class in percent, coarsest first. All zeros when
    /// nothing has been counted.
    pub fn percentages(&self) -> [f64; 5] {
        let total = self.total();
        if total == 0 {
            return [0.0; 5];
        }
        self.counts.map(|c| c as f64 / total as f64 * 100.0)
    }

    /// `(class, count)` pairs, coarsest first.
    pub fn iter(&self) -> impl Iterator<Item = (SieveClass, usize)> + '_ {
        SieveClass::ALL.iter().map(|&class| (class, self.get(class)))
    }
}
