//! Soil-bin probabilities per treatment and year after fire
//!
//! Bin 0 is the least erodible soil condition and bin 4 the most erodible.
//! Untreated hillslopes start centred on bin 2 and recover toward bin 0;
//! mulch moves mass toward bin 0 in the first two years in proportion to the
//! application rate, after which mulched hillslopes follow the untreated
//! trajectory. Values are hand-calibrated constants; every row sums to one.

use crate::core_types::{SoilBin, Treatment};
use crate::scenario::space::YEARS_AFTER_FIRE;

/// Year-after-fire row replaced by the monsoon variant
pub const MONSOON_ROW: usize = 1;

type Row = [f64; SoilBin::COUNT];
type Matrix = [Row; YEARS_AFTER_FIRE];

const UNTREATED: Matrix = [
    [0.10, 0.20, 0.40, 0.20, 0.10],
    [0.30, 0.30, 0.20, 0.10, 0.10],
    [0.50, 0.30, 0.10, 0.05, 0.05],
    [0.60, 0.30, 0.05, 0.03, 0.02],
    [0.70, 0.20, 0.05, 0.03, 0.02],
];

const SEEDING: Matrix = [
    [0.10, 0.20, 0.40, 0.20, 0.10],
    [0.40, 0.30, 0.15, 0.10, 0.05],
    [0.60, 0.25, 0.10, 0.03, 0.02],
    [0.70, 0.20, 0.05, 0.03, 0.02],
    [0.75, 0.20, 0.03, 0.01, 0.01],
];

const fn mulched(year0: Row, year1: Row) -> Matrix {
    [year0, year1, UNTREATED[2], UNTREATED[3], UNTREATED[4]]
}

const MULCH_05: Matrix = mulched([0.25, 0.25, 0.30, 0.15, 0.05], [0.40, 0.30, 0.15, 0.10, 0.05]);
const MULCH_10: Matrix = mulched([0.40, 0.30, 0.20, 0.07, 0.03], [0.50, 0.25, 0.15, 0.07, 0.03]);
const MULCH_15: Matrix = mulched([0.55, 0.25, 0.12, 0.05, 0.03], [0.60, 0.20, 0.12, 0.05, 0.03]);
const MULCH_20: Matrix = mulched([0.70, 0.18, 0.07, 0.03, 0.02], [0.65, 0.20, 0.09, 0.04, 0.02]);

/// Summer-storm climates keep year 1 closer to the burned condition
const MONSOON: [Row; 6] = [
    [0.20, 0.30, 0.25, 0.15, 0.10],
    [0.30, 0.30, 0.20, 0.12, 0.08],
    [0.30, 0.30, 0.20, 0.12, 0.08],
    [0.40, 0.30, 0.17, 0.08, 0.05],
    [0.50, 0.25, 0.15, 0.06, 0.04],
    [0.55, 0.25, 0.12, 0.05, 0.03],
];

/// Recovery matrices of every treatment, indexed by [`Treatment::index`]
#[derive(Debug)]
pub struct RecoveryTables {
    matrices: [Matrix; 6],
    monsoon: [Row; 6],
}

/// Process-wide recovery tables
pub static RECOVERY: RecoveryTables = RecoveryTables {
    matrices: [UNTREATED, SEEDING, MULCH_05, MULCH_10, MULCH_15, MULCH_20],
    monsoon: MONSOON,
};

impl RecoveryTables {
    /// Soil-bin probabilities of `treatment` in `year_after_fire`
    #[must_use]
    pub fn row(&self, treatment: Treatment, year_after_fire: usize, monsoonal: bool) -> &Row {
        if monsoonal && year_after_fire == MONSOON_ROW {
            &self.monsoon[treatment.index()]
        } else {
            &self.matrices[treatment.index()][year_after_fire]
        }
    }

    /// Probability that the hillslope is in `bin`
    #[must_use]
    pub fn weight(&self, treatment: Treatment, year_after_fire: usize, bin: SoilBin, monsoonal: bool) -> f64 {
        self.row(treatment, year_after_fire, monsoonal)[bin.index()]
    }
}
