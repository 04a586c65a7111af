//! Spatial severity patterns and their probabilities per burn-severity class
//!
//! The tables are hand-calibrated constants. Row `y` of a table holds, for
//! year-after-fire `y`, the probability that the hillslope is in each pattern;
//! every row sums to one. High severity starts concentrated on mostly-high
//! patterns and shifts toward low patterns as the hillslope recovers.

use crate::core_types::{BurnSeverity, SoilBin, SpatialPattern};
use crate::core_types::SpatialPattern::{Hhh, Hhl, Hlh, Hll, Lhh, Lhl, Lll, Llh, Uuu};

/// Number of years after fire covered by the tables
pub const YEARS_AFTER_FIRE: usize = 5;

/// Baseline soil bin for burned classes (most erodible condition)
pub const BASELINE_BURNED_BIN: SoilBin = SoilBin::ALL[4];

/// Soil bin used for every unburned run
pub const UNBURNED_BIN: SoilBin = SoilBin::ALL[1];

const HIGH_PATTERNS: [SpatialPattern; 8] = [Hhh, Lhh, Hlh, Hhl, Llh, Lhl, Hll, Lll];
const HIGH_WEIGHTS: [[f64; 8]; YEARS_AFTER_FIRE] = [
    [0.10, 0.30, 0.30, 0.30, 0.00, 0.00, 0.00, 0.00],
    [0.00, 0.25, 0.25, 0.25, 0.25, 0.00, 0.00, 0.00],
    [0.00, 0.00, 0.25, 0.25, 0.25, 0.25, 0.00, 0.00],
    [0.00, 0.00, 0.00, 0.25, 0.25, 0.25, 0.25, 0.00],
    [0.00, 0.00, 0.00, 0.00, 0.25, 0.25, 0.25, 0.25],
];

const MODERATE_PATTERNS: [SpatialPattern; 6] = [Hlh, Hhl, Llh, Lhl, Hll, Lll];
const MODERATE_WEIGHTS: [[f64; 6]; YEARS_AFTER_FIRE] = [
    [0.25, 0.25, 0.25, 0.25, 0.00, 0.00],
    [0.00, 0.25, 0.25, 0.25, 0.25, 0.00],
    [0.00, 0.00, 0.25, 0.25, 0.25, 0.25],
    [0.00, 0.00, 0.25, 0.25, 0.25, 0.25],
    [0.00, 0.00, 0.25, 0.25, 0.25, 0.25],
];

const LOW_PATTERNS: [SpatialPattern; 4] = [Llh, Lhl, Hll, Lll];
const LOW_WEIGHTS: [[f64; 4]; YEARS_AFTER_FIRE] = [
    [0.30, 0.30, 0.30, 0.10],
    [0.25, 0.25, 0.25, 0.25],
    [0.25, 0.25, 0.25, 0.25],
    [0.25, 0.25, 0.25, 0.25],
    [0.25, 0.25, 0.25, 0.25],
];

const UNBURNED_PATTERNS: [SpatialPattern; 1] = [Uuu];
const UNBURNED_WEIGHTS: [[f64; 1]; YEARS_AFTER_FIRE] = [[1.0], [1.0], [1.0], [1.0], [1.0]];

static HIGH: ScenarioSpace = ScenarioSpace::new(BurnSeverity::High, &HIGH_PATTERNS, &HIGH_WEIGHTS);
static MODERATE: ScenarioSpace =
    ScenarioSpace::new(BurnSeverity::Moderate, &MODERATE_PATTERNS, &MODERATE_WEIGHTS);
static LOW: ScenarioSpace = ScenarioSpace::new(BurnSeverity::Low, &LOW_PATTERNS, &LOW_WEIGHTS);
static UNBURNED: ScenarioSpace =
    ScenarioSpace::new(BurnSeverity::Unburned, &UNBURNED_PATTERNS, &UNBURNED_WEIGHTS);

/// Pattern list and spatial probability table of one burn-severity class
#[derive(Debug)]
pub struct ScenarioSpace {
    severity: BurnSeverity,
    patterns: &'static [SpatialPattern],
    weights: [&'static [f64]; YEARS_AFTER_FIRE],
}

impl ScenarioSpace {
    const fn new<const K: usize>(
        severity: BurnSeverity,
        patterns: &'static [SpatialPattern; K],
        weights: &'static [[f64; K]; YEARS_AFTER_FIRE],
    ) -> Self {
        Self {
            severity,
            patterns,
            weights: [&weights[0], &weights[1], &weights[2], &weights[3], &weights[4]],
        }
    }

    /// Static table for a burn-severity class
    #[must_use]
    pub fn for_severity(severity: BurnSeverity) -> &'static Self {
        match severity {
            BurnSeverity::High => &HIGH,
            BurnSeverity::Moderate => &MODERATE,
            BurnSeverity::Low => &LOW,
            BurnSeverity::Unburned => &UNBURNED,
        }
    }

    #[must_use]
    pub fn severity(&self) -> BurnSeverity {
        self.severity
    }

    /// Patterns in table column order
    #[must_use]
    pub fn patterns(&self) -> &'static [SpatialPattern] {
        self.patterns
    }

    /// Probability row for one year after fire, aligned with [`Self::patterns`]
    #[must_use]
    pub fn weights(&self, year_after_fire: usize) -> &'static [f64] {
        self.weights[year_after_fire]
    }

    /// Probability of `pattern` in `year_after_fire`; zero for patterns outside this class
    #[must_use]
    pub fn weight(&self, year_after_fire: usize, pattern: SpatialPattern) -> f64 {
        self.patterns
            .iter()
            .position(|p| *p == pattern)
            .map_or(0.0, |i| self.weights[year_after_fire][i])
    }

    /// Soil bins simulated for this class
    #[must_use]
    pub fn bins(&self) -> &'static [SoilBin] {
        if self.severity == BurnSeverity::Unburned {
            std::slice::from_ref(&UNBURNED_BIN)
        } else {
            &SoilBin::ALL
        }
    }

    /// Pattern and bin of the full-length baseline run
    #[must_use]
    pub fn baseline(&self) -> (SpatialPattern, SoilBin) {
        if self.severity == BurnSeverity::Unburned {
            (Uuu, UNBURNED_BIN)
        } else {
            (Hhh, BASELINE_BURNED_BIN)
        }
    }

    /// Every (pattern, bin) combination to simulate
    #[must_use]
    pub fn combinations(&self) -> Vec<(SpatialPattern, SoilBin)> {
        self.patterns
            .iter()
            .flat_map(|&pattern| self.bins().iter().map(move |&bin| (pattern, bin)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pattern_counts() {
        assert_eq!(ScenarioSpace::for_severity(BurnSeverity::Unburned).patterns().len(), 1);
        assert_eq!(ScenarioSpace::for_severity(BurnSeverity::Low).patterns().len(), 4);
        assert_eq!(ScenarioSpace::for_severity(BurnSeverity::Moderate).patterns().len(), 6);
        assert_eq!(ScenarioSpace::for_severity(BurnSeverity::High).patterns().len(), 8);
    }

    #[test]
    fn test_rows_sum_to_one() {
        for severity in BurnSeverity::ALL {
            let space = ScenarioSpace::for_severity(severity);
            for year in 0..YEARS_AFTER_FIRE {
                let row = space.weights(year);
                assert_eq!(row.len(), space.patterns().len());
                assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_combination_counts() {
        assert_eq!(ScenarioSpace::for_severity(BurnSeverity::High).combinations().len(), 40);
        let unburned = ScenarioSpace::for_severity(BurnSeverity::Unburned).combinations();
        assert_eq!(unburned, vec![(Uuu, UNBURNED_BIN)]);
    }

    #[test]
    fn test_weight_lookup() {
        let high = ScenarioSpace::for_severity(BurnSeverity::High);
        assert_eq!(high.weight(0, Hhh), 0.10);
        assert_eq!(high.weight(4, Lll), 0.25);
        assert_eq!(high.weight(0, Uuu), 0.0);
        assert_eq!(high.baseline(), (Hhh, SoilBin::ALL[4]));
    }
}
