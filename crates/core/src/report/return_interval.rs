//! Return-interval ranking of annual series
//!
//! Uses the Weibull plotting position for an annual-maxima series: the record at
//! 1-based rank `m` of `n` descending-sorted years has return period
//! `T = (n + 1) / m`. A requested interval maps to the largest rank whose
//! return period still reaches the interval.

use crate::error::{Result, RiskError};
use crate::report::soil_loss::{AnnualRecord, Measure};
use std::collections::BTreeMap;

/// Default intervals (years) reported for simulator summaries
pub const DEFAULT_RETURN_INTERVALS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

/// Interval label → record selected for that interval
pub type ReturnPeriodTable = BTreeMap<String, AnnualRecord>;

/// Label used as the key of a return period, e.g. `"2"` or `"1.5"`
#[must_use]
pub fn interval_label(interval: f64) -> String {
    format!("{interval}")
}

/// Compute the 0-based index into a descending-sorted series of `n` years for each interval
///
/// # Errors
/// Returns `InsufficientRecords` when an interval is longer than `n` years can resolve.
pub fn weibull_ranks(intervals: &[f64], n: usize) -> Result<Vec<(f64, usize)>> {
    let mut ranks = Vec::with_capacity(intervals.len());
    for &interval in intervals {
        let rank = (1..=n)
            .rev()
            .find(|&m| (n + 1) as f64 / m as f64 >= interval)
            .ok_or(RiskError::InsufficientRecords {
                // Smallest n with (n + 1) / 1 >= interval
                requested: (interval.ceil() as usize).saturating_sub(1).max(1),
                available: n,
            })?;
        ranks.push((interval, rank - 1));
    }
    Ok(ranks)
}

/// Select the record representing each return interval for one measure
///
/// Records are ordered descending by the measure (stable, so equal values keep
/// their year order) and indexed by Weibull rank.
///
/// # Errors
/// Returns `InsufficientRecords` if the series is too short for an interval.
pub fn rec_intervals<'a, I>(records: I, measure: Measure, intervals: &[f64]) -> Result<ReturnPeriodTable>
where
    I: IntoIterator<Item = &'a AnnualRecord>,
{
    let mut sorted: Vec<&AnnualRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| measure.value(b).total_cmp(&measure.value(a)));

    let ranks = weibull_ranks(intervals, sorted.len())?;
    Ok(ranks
        .into_iter()
        .map(|(interval, index)| (interval_label(interval), sorted[index].clone()))
        .collect())
}

/// Pick the entries at fixed 1-based ranks of an already descending-ranked list
///
/// # Errors
/// Returns `InsufficientRecords` if any rank exceeds the list length.
pub fn select_ranked<T: Clone>(ranked: &[T], ranks: &[usize]) -> Result<Vec<T>> {
    ranks
        .iter()
        .map(|&rank| {
            if rank == 0 || rank > ranked.len() {
                Err(RiskError::InsufficientRecords {
                    requested: rank,
                    available: ranked.len(),
                })
            } else {
                Ok(ranked[rank - 1].clone())
            }
        })
        .collect()
}
