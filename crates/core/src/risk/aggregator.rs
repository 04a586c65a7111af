//! Cumulative exceedance curves from tagged scenario results
//!
//! Each simulated event stands for one combination of climate year, spatial
//! pattern and soil bin. Its probability is the product of the three weights,
//! treating the climate, spatial and soil draws as independent. That
//! independence is a modeling approximation, not a property of the data.
//!
//! Walking events from the largest sediment delivery down, the running sum of
//! those probabilities is the probability that delivery is at least that
//! large. Curves start at 1% and saturate at 1.

use crate::core_types::{BurnSeverity, EventDate, Treatment};
use crate::risk::recovery::RecoveryTables;
use crate::scenario::scheduler::{sort_by_delivery, RepresentativeYear, TaggedEvent};
use crate::scenario::space::{ScenarioSpace, YEARS_AFTER_FIRE};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Runoff ranks of the representative climate years
pub const CLIMATE_RANKS: [usize; 5] = [5, 10, 20, 50, 75];

/// Occurrence probability of each representative climate year
pub const CLIMATE_WEIGHTS: [f64; 5] = [0.075, 0.075, 0.20, 0.275, 0.375];

/// Starting value of every curve
pub const INITIAL_PROBABILITY: f64 = 0.01;

/// Treatment → year after fire → curve aligned with the descending-delivery order
pub type RiskCurves = BTreeMap<Treatment, BTreeMap<usize, Vec<f64>>>;

/// Weighs scenario results into risk curves for one hillslope
#[derive(Debug, Clone, Copy)]
pub struct RiskAggregator<'a> {
    space: &'a ScenarioSpace,
    recovery: &'a RecoveryTables,
    monsoonal: bool,
}

impl<'a> RiskAggregator<'a> {
    #[must_use]
    pub fn new(space: &'a ScenarioSpace, recovery: &'a RecoveryTables, monsoonal: bool) -> Self {
        Self {
            space,
            recovery,
            monsoonal,
        }
    }

    /// Build a curve for every treatment and year after fire
    ///
    /// Events are ordered internally by a stable descending sort on sediment
    /// delivery, so callers may pass them in any order. Events whose climate
    /// rank is not among `years` carry no probability.
    #[must_use]
    pub fn aggregate(&self, years: &[RepresentativeYear], events: &[TaggedEvent]) -> RiskCurves {
        let mut ordered = events.to_vec();
        sort_by_delivery(&mut ordered);

        let climate: FxHashMap<usize, f64> = years.iter().map(|y| (y.rank, y.weight)).collect();

        let mut curves = RiskCurves::new();
        for treatment in Treatment::ALL {
            let per_year = (0..YEARS_AFTER_FIRE)
                .map(|year| (year, self.curve(&ordered, &climate, treatment, year)))
                .collect();
            curves.insert(treatment, per_year);
        }
        debug!(
            events = ordered.len(),
            severity = %self.space.severity(),
            monsoonal = self.monsoonal,
            "aggregated risk curves"
        );
        curves
    }

    fn curve(
        &self,
        ordered: &[TaggedEvent],
        climate: &FxHashMap<usize, f64>,
        treatment: Treatment,
        year_after_fire: usize,
    ) -> Vec<f64> {
        let mut cumulative = INITIAL_PROBABILITY;
        ordered
            .iter()
            .map(|tagged| {
                if cumulative < 1.0 {
                    if tagged.event.sed_del_kg_m <= 0.0 {
                        cumulative = 1.0;
                    } else {
                        let probability = climate.get(&tagged.climate_rank).copied().unwrap_or(0.0)
                            * self.space.weight(year_after_fire, tagged.pattern)
                            * self.soil_weight(treatment, year_after_fire, tagged);
                        cumulative = (cumulative + probability).min(1.0);
                    }
                }
                cumulative
            })
            .collect()
    }

    fn soil_weight(&self, treatment: Treatment, year_after_fire: usize, tagged: &TaggedEvent) -> f64 {
        if self.space.severity() == BurnSeverity::Unburned {
            1.0
        } else {
            self.recovery
                .weight(treatment, year_after_fire, tagged.bin, self.monsoonal)
        }
    }
}

/// Pair the fixed ranks and weights with the dates chosen for them
#[must_use]
pub fn representative_years(dates: &[EventDate]) -> Vec<RepresentativeYear> {
    CLIMATE_RANKS
        .iter()
        .zip(CLIMATE_WEIGHTS)
        .zip(dates)
        .map(|((&rank, weight), &date)| RepresentativeYear { rank, weight, date })
        .collect()
}
