//! Event-by-event (EBE) log parsing
//!
//! The log has three header lines followed by one whitespace-separated row per
//! runoff event. Only rows with exactly 14 columns are events; anything else
//! (blank lines, trailers) is ignored.

use crate::core_types::EventDate;
use crate::error::{Result, RiskError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const LOG_NAME: &str = "event-by-event log";
const HEADER_LINES: usize = 3;
const COLUMNS: [&str; 14] = [
    "day",
    "month",
    "year",
    "precip_mm",
    "runoff_mm",
    "ir_det_kg_m2",
    "av_det_kg_m2",
    "mx_det_kg_m2",
    "point_m",
    "av_dep_kg_m2",
    "max_dep_kg_m2",
    "point_dep_m",
    "sed_del_kg_m",
    "er",
];

/// One runoff event from the log
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EbeEvent {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub precip_mm: f64,
    pub runoff_mm: f64,
    /// Interrill detachment
    pub ir_det_kg_m2: f64,
    /// Average detachment
    pub av_det_kg_m2: f64,
    /// Maximum detachment
    pub mx_det_kg_m2: f64,
    /// Location of maximum detachment
    pub point_m: f64,
    /// Average deposition
    pub av_dep_kg_m2: f64,
    /// Maximum deposition
    pub max_dep_kg_m2: f64,
    /// Location of maximum deposition
    pub point_dep_m: f64,
    /// Sediment delivered per unit width
    pub sed_del_kg_m: f64,
    /// Enrichment ratio
    pub er: f64,
}

impl EbeEvent {
    #[must_use]
    pub const fn date(&self) -> EventDate {
        EventDate::new(self.day, self.month, self.year)
    }

    /// An event with no rain, runoff or sediment on the given date
    #[must_use]
    pub fn empty(date: EventDate) -> Self {
        Self {
            day: date.day,
            month: date.month,
            year: date.year,
            ..Self::default()
        }
    }
}

/// Peak rainfall intensities of one day from the companion climate record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakIntensity {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub peak_10min_mm_h: f64,
    pub peak_30min_mm_h: f64,
    pub peak_60min_mm_h: f64,
}

/// Largest-runoff event of one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualMaximaEvent {
    #[serde(flatten)]
    pub event: EbeEvent,
    #[serde(rename = "10-min Peak Rainfall Intensity (mm/hour)")]
    pub peak_10min_mm_h: Option<f64>,
    #[serde(rename = "30-min Peak Rainfall Intensity (mm/hour)")]
    pub peak_30min_mm_h: Option<f64>,
    #[serde(rename = "60-min Peak Rainfall Intensity (mm/hour)")]
    pub peak_60min_mm_h: Option<f64>,
    /// 1-based position in descending runoff order
    pub runoff_rank: usize,
}

/// Annual maxima series ordered by descending runoff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualMaxima {
    pub annual_maxima_events: Vec<AnnualMaximaEvent>,
    /// Years, wettest first; the "worst years" ordering
    pub runoff_year_ranks_descending: Vec<i32>,
    pub num_years_with_runoff_event: usize,
}

/// Parse every event row of a log
///
/// # Errors
/// Returns `Parse` naming the line and column of any non-numeric field.
pub fn parse_events(text: &str) -> Result<Vec<EbeEvent>> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate().skip(HEADER_LINES) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != COLUMNS.len() {
            continue;
        }
        let line_no = index + 1;
        let float = |i: usize| -> Result<f64> { read_field(fields[i], line_no, COLUMNS[i]) };
        events.push(EbeEvent {
            day: read_field(fields[0], line_no, COLUMNS[0])?,
            month: read_field(fields[1], line_no, COLUMNS[1])?,
            year: read_field(fields[2], line_no, COLUMNS[2])?,
            precip_mm: float(3)?,
            runoff_mm: float(4)?,
            ir_det_kg_m2: float(5)?,
            av_det_kg_m2: float(6)?,
            mx_det_kg_m2: float(7)?,
            point_m: float(8)?,
            av_dep_kg_m2: float(9)?,
            max_dep_kg_m2: float(10)?,
            point_dep_m: float(11)?,
            sed_del_kg_m: float(12)?,
            er: float(13)?,
        });
    }
    Ok(events)
}

fn read_field<T: std::str::FromStr>(token: &str, line: usize, column: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| RiskError::parse(LOG_NAME, line, column, format!("cannot read '{token}'")))
}

/// Select the largest-runoff event of each year and rank the years by it
///
/// Within a year the first event with the maximal runoff wins. Years are ranked
/// by a stable descending sort, so equal runoff keeps ascending year order. When
/// peak intensities are supplied they are joined on (day, month, year), first
/// match wins, and missing days stay `None`.
#[must_use]
pub fn annual_maxima(events: &[EbeEvent], peaks: Option<&[PeakIntensity]>) -> AnnualMaxima {
    let mut by_year: BTreeMap<i32, EbeEvent> = BTreeMap::new();
    for event in events {
        by_year
            .entry(event.year)
            .and_modify(|max| {
                if event.runoff_mm > max.runoff_mm {
                    *max = *event;
                }
            })
            .or_insert(*event);
    }

    let mut lookup: FxHashMap<EventDate, &PeakIntensity> = FxHashMap::default();
    for peak in peaks.unwrap_or_default() {
        lookup
            .entry(EventDate::new(peak.day, peak.month, peak.year))
            .or_insert(peak);
    }

    let mut maxima: Vec<EbeEvent> = by_year.into_values().collect();
    maxima.sort_by(|a, b| b.runoff_mm.total_cmp(&a.runoff_mm));

    let annual_maxima_events: Vec<AnnualMaximaEvent> = maxima
        .into_iter()
        .enumerate()
        .map(|(i, event)| {
            let peak = lookup.get(&event.date());
            AnnualMaximaEvent {
                event,
                peak_10min_mm_h: peak.map(|p| p.peak_10min_mm_h),
                peak_30min_mm_h: peak.map(|p| p.peak_30min_mm_h),
                peak_60min_mm_h: peak.map(|p| p.peak_60min_mm_h),
                runoff_rank: i + 1,
            }
        })
        .collect();

    let runoff_year_ranks_descending: Vec<i32> =
        annual_maxima_events.iter().map(|e| e.event.year).collect();
    AnnualMaxima {
        num_years_with_runoff_event: runoff_year_ranks_descending.len(),
        annual_maxima_events,
        runoff_year_ranks_descending,
    }
}

/// Restrict a short-climate log to the representative dates
///
/// `year_map[i]` is the original year simulated as year `i + 1` of the short
/// climate. Each date yields the first event on that day, re-dated to the
/// original year; a date without a runoff event yields an empty event so every
/// representative date is accounted for.
#[must_use]
pub fn events_on_dates(events: &[EbeEvent], dates: &[EventDate], year_map: &[i32]) -> Vec<EbeEvent> {
    let original_year = |simulated: i32| -> i32 {
        usize::try_from(simulated - 1)
            .ok()
            .and_then(|i| year_map.get(i).copied())
            .unwrap_or(simulated)
    };

    dates
        .iter()
        .map(|date| {
            events
                .iter()
                .find(|e| e.day == date.day && e.month == date.month && original_year(e.year) == date.year)
                .map_or_else(
                    || EbeEvent::empty(*date),
                    |e| EbeEvent {
                        year: date.year,
                        ..*e
                    },
                )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "  EVENT OUTPUT\n\n day mo year Precp Runoff IR-det Av-det Mx-det Point Av-dep Max-dep Point Sed.Del ER\n";

    fn row(day: u32, month: u32, year: i32, runoff: f64, sed: f64) -> String {
        format!("  {day}  {month}  {year}  20.0  {runoff}  0.1  0.2  0.3  10.0  0.0  0.0  0.0  {sed}  1.5\n")
    }

    #[test]
    fn test_parse_event_row() {
        let text = format!("{HEADER}  1  3  2007  12.4  3.1  0.02  0.5  1.2  45.0  0.1  0.3  60.0  7.25  1.8\n");
        let events = parse_events(&text).unwrap();
        assert_eq!(events.len(), 1);
        let e = events[0];
        assert_eq!((e.day, e.month, e.year), (1, 3, 2007));
        assert_eq!(e.precip_mm, 12.4);
        assert_eq!(e.runoff_mm, 3.1);
        assert_eq!(e.sed_del_kg_m, 7.25);
        assert_eq!(e.er, 1.8);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let text = format!("{HEADER}{}  total events 1\n\n", row(5, 6, 1, 2.0, 0.5));
        assert_eq!(parse_events(&text).unwrap().len(), 1);
    }

    #[test]
    fn test_non_numeric_field_fails() {
        let text = format!("{HEADER}  1  3  2007  12.4  ****  0.02  0.5  1.2  45.0  0.1  0.3  60.0  7.25  1.8\n");
        let err = parse_events(&text).unwrap_err();
        assert!(matches!(err, RiskError::Parse { line: 4, ref field, .. } if field == "runoff_mm"));
    }

    #[test]
    fn test_annual_maxima_first_max_and_stable_rank() {
        let text = format!(
            "{HEADER}{}{}{}{}{}",
            row(1, 1, 1, 5.0, 1.0),
            row(2, 2, 1, 9.0, 2.0),
            row(3, 3, 1, 9.0, 3.0),
            row(4, 4, 2, 9.0, 4.0),
            row(5, 5, 3, 12.0, 5.0),
        );
        let events = parse_events(&text).unwrap();
        let maxima = annual_maxima(&events, None);

        assert_eq!(maxima.runoff_year_ranks_descending, vec![3, 1, 2]);
        assert_eq!(maxima.num_years_with_runoff_event, 3);
        // Year 1 ties between day 2 and day 3: first one wins
        let year1 = &maxima.annual_maxima_events[1];
        assert_eq!(year1.event.day, 2);
        assert_eq!(year1.runoff_rank, 2);
        assert!(year1.peak_10min_mm_h.is_none());
    }

    #[test]
    fn test_peak_intensity_join_first_match_null_on_miss() {
        let events = vec![
            EbeEvent { day: 2, month: 7, year: 1, runoff_mm: 4.0, ..EbeEvent::default() },
            EbeEvent { day: 9, month: 8, year: 2, runoff_mm: 6.0, ..EbeEvent::default() },
        ];
        let peaks = vec![
            PeakIntensity { day: 2, month: 7, year: 1, peak_10min_mm_h: 40.0, peak_30min_mm_h: 25.0, peak_60min_mm_h: 15.0 },
            PeakIntensity { day: 2, month: 7, year: 1, peak_10min_mm_h: 99.0, peak_30min_mm_h: 99.0, peak_60min_mm_h: 99.0 },
        ];
        let maxima = annual_maxima(&events, Some(&peaks));
        let wettest = &maxima.annual_maxima_events[0];
        assert_eq!(wettest.event.year, 2);
        assert_eq!(wettest.peak_30min_mm_h, None);
        let second = &maxima.annual_maxima_events[1];
        assert_eq!(second.peak_10min_mm_h, Some(40.0));
        assert_eq!(second.peak_60min_mm_h, Some(15.0));
    }

    #[test]
    fn test_events_on_dates_maps_short_climate_years() {
        let events = vec![
            EbeEvent { day: 4, month: 6, year: 1, sed_del_kg_m: 2.0, ..EbeEvent::default() },
            EbeEvent { day: 4, month: 6, year: 2, sed_del_kg_m: 3.0, ..EbeEvent::default() },
        ];
        let dates = [EventDate::new(4, 6, 57), EventDate::new(9, 9, 12)];
        let selected = events_on_dates(&events, &dates, &[12, 57]);

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].date(), EventDate::new(4, 6, 57));
        assert_eq!(selected[0].sed_del_kg_m, 3.0);
        // No event on the second date in the short run
        assert_eq!(selected[1].date(), EventDate::new(9, 9, 12));
        assert_eq!(selected[1].sed_del_kg_m, 0.0);
    }
}
