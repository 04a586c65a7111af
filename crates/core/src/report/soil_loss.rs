//! Simulator soil-loss report parsing
//!
//! The report is a fixed-layout ASCII document. Values are located by a literal
//! section header and a fixed line offset below it, then by token position on
//! that line. Two layouts exist: a detailed report with one block per simulated
//! year followed by the averages, and an averaged report with the averages only.

use crate::error::{Result, RiskError};
use crate::report::return_interval::{rec_intervals, ReturnPeriodTable, DEFAULT_RETURN_INTERVALS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

const DETAILED_MARKER: &str = "Annual; detailed";
const YEAR_BLOCK_PREFIX: &str = "     HILLSLOPE";
const YEAR_BLOCK_MARKER: &str = "YEARLY SUMMARY";
const AVERAGES_HEADER: &str = "ANNUAL AVERAGE SUMMARIES";
const RAINFALL_HEADER: &str = "RAINFALL AND RUNOFF SUMMARY";
const SOIL_LOSS_HEADER: &str = "AREA OF NET SOIL LOSS";
const OFF_SITE_HEADER: &str = "OFF SITE EFFECTS";

/// Water balance and soil loss for one simulated year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    pub year: i32,
    pub storms: u32,
    pub rainevents: u32,
    pub snowevents: u32,
    pub precip_mm: f64,
    pub runoff_from_rain_mm: f64,
    pub runoff_from_snow_mm: f64,
    #[serde(rename = "runoff_from_rain+snow_mm")]
    pub runoff_total_mm: f64,
    pub soil_loss_mean_kg_m2: f64,
    pub soil_loss_max_kg_m2: f64,
    /// Sediment yield per unit area, set when the slope length is known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sediment_yield_kg_m2: Option<f64>,
    /// Sediment yield per unit width, set when the slope length is unknown
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sediment_yield_kg_m: Option<f64>,
}

/// Long-term annual averages of the simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnualAverages {
    pub storms: u32,
    pub rainevents: u32,
    pub snowevents: u32,
    pub precip_mm: f64,
    pub runoff_from_rain_mm: f64,
    pub runoff_from_snow_mm: f64,
    #[serde(rename = "runoff_from_rain+snow_mm")]
    pub runoff_total_mm: f64,
    pub soil_loss_mean_kg_m2: f64,
    pub soil_loss_max_kg_m2: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sediment_yield_kg_m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sediment_yield_kg_m: Option<f64>,
    #[serde(flatten)]
    pub road: Option<RoadPrismErosion>,
}

/// Road-prism quantities derived when a road width is supplied
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadPrismErosion {
    pub sim_width_m: f64,
    pub road_length_exhibiting_soil_loss_m: f64,
    pub road_prism_erosion_kg: f64,
    pub sediment_leaving_buffer_kg: f64,
}

/// Annual quantity a return-period table can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    PrecipMm,
    RunoffTotalMm,
    SoilLossMeanKgM2,
    SedimentYieldKgM2,
    SedimentYieldKgM,
}

impl Measure {
    /// Key of this measure in the serialized report
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::PrecipMm => "precip_mm",
            Self::RunoffTotalMm => "runoff_from_rain+snow_mm",
            Self::SoilLossMeanKgM2 => "soil_loss_mean_kg_m2",
            Self::SedimentYieldKgM2 => "sediment_yield_kg_m2",
            Self::SedimentYieldKgM => "sediment_yield_kg_m",
        }
    }

    /// Value of this measure on a record (NaN when the record lacks it)
    #[must_use]
    pub fn value(&self, record: &AnnualRecord) -> f64 {
        match self {
            Self::PrecipMm => record.precip_mm,
            Self::RunoffTotalMm => record.runoff_total_mm,
            Self::SoilLossMeanKgM2 => record.soil_loss_mean_kg_m2,
            Self::SedimentYieldKgM2 => record.sediment_yield_kg_m2.unwrap_or(f64::NAN),
            Self::SedimentYieldKgM => record.sediment_yield_kg_m.unwrap_or(f64::NAN),
        }
    }
}

/// Report with per-year detail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub annual_averages: AnnualAverages,
    /// Measure key → return-period table
    pub return_periods: BTreeMap<String, ReturnPeriodTable>,
    pub annuals: BTreeMap<i32, AnnualRecord>,
}

/// Parsed soil-loss report
///
/// Serializes as the detailed object, or as the bare averages when the report
/// carries no per-year section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SoilLossReport {
    Detailed(DetailedReport),
    Averaged(AnnualAverages),
}

impl SoilLossReport {
    /// Annual averages, present in both layouts
    #[must_use]
    pub fn annual_averages(&self) -> &AnnualAverages {
        match self {
            Self::Detailed(report) => &report.annual_averages,
            Self::Averaged(averages) => averages,
        }
    }

    /// Per-year records, detailed layout only
    #[must_use]
    pub fn annuals(&self) -> Option<&BTreeMap<i32, AnnualRecord>> {
        match self {
            Self::Detailed(report) => Some(&report.annuals),
            Self::Averaged(_) => None,
        }
    }
}

/// How to normalize and summarize a report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Hillslope length; turns per-width yield into per-area yield
    pub slope_length_m: Option<f64>,
    /// Simulated road width; adds road-prism quantities to the averages
    pub road_width_m: Option<f64>,
    /// Return intervals (years) for the per-year section
    pub return_intervals: Vec<f64>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            slope_length_m: None,
            road_width_m: None,
            return_intervals: DEFAULT_RETURN_INTERVALS.to_vec(),
        }
    }
}

impl ReportOptions {
    /// Options for a hillslope of known length
    #[must_use]
    pub fn with_slope_length(slope_length_m: f64) -> Self {
        Self {
            slope_length_m: Some(slope_length_m),
            ..Self::default()
        }
    }

    fn sediment_measure(&self) -> Measure {
        if self.slope_length_m.is_some() {
            Measure::SedimentYieldKgM2
        } else {
            Measure::SedimentYieldKgM
        }
    }

    /// Split a per-width yield into the per-area or per-width field
    fn sediment_yield(&self, kg_per_m: f64) -> (Option<f64>, Option<f64>) {
        match self.slope_length_m {
            Some(length) => (Some(kg_per_m / length), None),
            None => (None, Some(kg_per_m)),
        }
    }
}

/// Simulator version line, if the report has one
#[must_use]
pub fn simulator_version(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.contains("VERSION"))
        .map(|line| line.trim().to_string())
}

/// Parse a soil-loss report
///
/// # Errors
/// Returns `Parse` when a section (including every per-year block of a
/// detailed report) is missing, a field is not numeric or a year appears
/// twice, and `InsufficientRecords` when the per-year section is too
/// short for a requested return interval.
pub fn parse_soil_loss_report(text: &str, options: &ReportOptions) -> Result<SoilLossReport> {
    let lines: Vec<&str> = text.lines().collect();

    let averages_start = lines
        .iter()
        .position(|line| line.contains(AVERAGES_HEADER))
        .unwrap_or(0);
    let annual_averages = parse_averages(&lines, averages_start, options)?;

    let detailed = lines.first().is_some_and(|line| line.contains(DETAILED_MARKER));
    if !detailed {
        return Ok(SoilLossReport::Averaged(annual_averages));
    }

    let annuals = parse_annuals(&lines, options)?;
    if annuals.is_empty() {
        return Err(RiskError::parse(
            YEAR_BLOCK_MARKER,
            1,
            "year",
            "detailed report has no per-year blocks",
        ));
    }
    debug!(years = annuals.len(), "parsed detailed report");

    let measures = [
        Measure::PrecipMm,
        Measure::RunoffTotalMm,
        Measure::SoilLossMeanKgM2,
        options.sediment_measure(),
    ];
    let mut return_periods = BTreeMap::new();
    for measure in measures {
        let table = rec_intervals(annuals.values(), measure, &options.return_intervals)?;
        return_periods.insert(measure.key().to_string(), table);
    }

    Ok(SoilLossReport::Detailed(DetailedReport {
        version: simulator_version(text),
        annual_averages,
        return_periods,
        annuals,
    }))
}

fn parse_annuals(lines: &[&str], options: &ReportOptions) -> Result<BTreeMap<i32, AnnualRecord>> {
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with(YEAR_BLOCK_PREFIX) && line.contains(YEAR_BLOCK_MARKER))
        .map(|(i, _)| i)
        .collect();

    let mut annuals = BTreeMap::new();
    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(lines.len());
        let block = Block { lines, range: start..end };

        let year_field = lines[start].split_whitespace().last().unwrap_or_default();
        let year: i32 = parse_number(year_field, YEAR_BLOCK_MARKER, start, "year")?;

        let rain = block.section(RAINFALL_HEADER)?;
        let (line_no, tokens) = rain.tokens(9, "storms")?;
        if tokens.len() < 6 {
            return Err(RiskError::parse(
                RAINFALL_HEADER,
                line_no + 1,
                "storms",
                format!("expected 6 columns, found {}", tokens.len()),
            ));
        }
        let field = |i: usize, name: &str| -> Result<f64> { parse_number(tokens[i], RAINFALL_HEADER, line_no, name) };
        let storms = parse_number(tokens[0], RAINFALL_HEADER, line_no, "storms")?;
        let precip_mm = field(1, "precip_mm")?;
        let rainevents = parse_number(tokens[2], RAINFALL_HEADER, line_no, "rainevents")?;
        let runoff_from_rain_mm = field(3, "runoff_from_rain_mm")?;
        let snowevents = parse_number(tokens[4], RAINFALL_HEADER, line_no, "snowevents")?;
        let runoff_from_snow_mm = field(5, "runoff_from_snow_mm")?;

        let loss = block.section(SOIL_LOSS_HEADER)?;
        let soil_loss_mean_kg_m2 = loss.mean_soil_loss()?;
        let soil_loss_max_kg_m2 = loss.max_soil_loss()?;

        let off_site = block.section(OFF_SITE_HEADER)?;
        let yield_kg_m = off_site.nth_from_end(3, 2, "sediment_yield_kg_m")?;
        let (sediment_yield_kg_m2, sediment_yield_kg_m) = options.sediment_yield(yield_kg_m);

        if annuals.contains_key(&year) {
            return Err(RiskError::parse(
                YEAR_BLOCK_MARKER,
                start + 1,
                "year",
                format!("year {year} appears more than once"),
            ));
        }
        annuals.insert(
            year,
            AnnualRecord {
                year,
                storms,
                rainevents,
                snowevents,
                precip_mm,
                runoff_from_rain_mm,
                runoff_from_snow_mm,
                runoff_total_mm: runoff_from_rain_mm + runoff_from_snow_mm,
                soil_loss_mean_kg_m2,
                soil_loss_max_kg_m2,
                sediment_yield_kg_m2,
                sediment_yield_kg_m,
            },
        );
    }
    Ok(annuals)
}

fn parse_averages(lines: &[&str], start: usize, options: &ReportOptions) -> Result<AnnualAverages> {
    let block = Block {
        lines,
        range: start..lines.len(),
    };

    let rain = block.section(RAINFALL_HEADER)?;
    let storms = rain.first_token(5, "storms")?;
    let rainevents = rain.first_token(6, "rainevents")?;
    let snowevents = rain.first_token(7, "snowevents")?;
    let precip_mm = rain.nth_from_end(14, 2, "precip_mm")?;
    let runoff_from_rain_mm = rain.nth_from_end(15, 2, "runoff_from_rain_mm")?;
    let runoff_from_snow_mm = rain.nth_from_end(17, 2, "runoff_from_snow_mm")?;

    let loss = block.section(SOIL_LOSS_HEADER)?;
    let soil_loss_mean_kg_m2 = loss.mean_soil_loss()?;
    let soil_loss_max_kg_m2 = loss.max_soil_loss()?;

    let off_site = block.section(OFF_SITE_HEADER)?;
    let yield_kg_m: f64 = off_site.first_token(4, "sediment_yield_kg_m")?;
    let (sediment_yield_kg_m2, sediment_yield_kg_m) = options.sediment_yield(yield_kg_m);

    let road = match options.road_width_m {
        Some(width) => {
            let length_with_loss = loss.length_with_net_loss()?;
            Some(RoadPrismErosion {
                sim_width_m: width,
                road_length_exhibiting_soil_loss_m: length_with_loss,
                road_prism_erosion_kg: soil_loss_mean_kg_m2 * width * length_with_loss,
                sediment_leaving_buffer_kg: yield_kg_m * width,
            })
        }
        None => None,
    };

    Ok(AnnualAverages {
        storms,
        rainevents,
        snowevents,
        precip_mm,
        runoff_from_rain_mm,
        runoff_from_snow_mm,
        runoff_total_mm: runoff_from_rain_mm + runoff_from_snow_mm,
        soil_loss_mean_kg_m2,
        soil_loss_max_kg_m2,
        sediment_yield_kg_m2,
        sediment_yield_kg_m,
        road,
    })
}

/// Range of report lines searched for section headers
struct Block<'a> {
    lines: &'a [&'a str],
    range: Range<usize>,
}

impl<'a> Block<'a> {
    fn section(&self, header: &'static str) -> Result<Section<'a>> {
        self.lines[self.range.clone()]
            .iter()
            .position(|line| line.contains(header))
            .map(|offset| Section {
                lines: self.lines,
                header,
                at: self.range.start + offset,
            })
            .ok_or_else(|| {
                RiskError::parse(
                    header,
                    self.range.start + 1,
                    "header",
                    format!("section not found in lines {}..{}", self.range.start + 1, self.range.end),
                )
            })
    }
}

/// A located section header; fields are read at fixed offsets below it
struct Section<'a> {
    lines: &'a [&'a str],
    header: &'static str,
    at: usize,
}

impl<'a> Section<'a> {
    fn line(&self, offset: usize, field: &str) -> Result<(usize, &'a str)> {
        let index = self.at + offset;
        self.lines.get(index).map(|line| (index, *line)).ok_or_else(|| {
            RiskError::parse(self.header, index + 1, field, "report ends before this line")
        })
    }

    fn tokens(&self, offset: usize, field: &str) -> Result<(usize, Vec<&'a str>)> {
        let (index, line) = self.line(offset, field)?;
        Ok((index, line.split_whitespace().collect()))
    }

    fn first_token<T: std::str::FromStr>(&self, offset: usize, field: &str) -> Result<T> {
        let (index, tokens) = self.tokens(offset, field)?;
        let token = tokens.first().copied().unwrap_or_default();
        parse_number(token, self.header, index, field)
    }

    /// `n`-th token counted from the end of the line (1 = last)
    fn nth_from_end(&self, offset: usize, n: usize, field: &str) -> Result<f64> {
        let (index, tokens) = self.tokens(offset, field)?;
        let token = tokens
            .len()
            .checked_sub(n)
            .map(|i| tokens[i])
            .unwrap_or_default();
        parse_number(token, self.header, index, field)
    }

    /// Text after the first `=` of a line
    fn after_equals(&self, offset: usize, field: &str) -> Result<(usize, &'a str)> {
        let (index, line) = self.line(offset, field)?;
        line.split_once('=')
            .map(|(_, rhs)| (index, rhs))
            .ok_or_else(|| RiskError::parse(self.header, index + 1, field, "missing '='"))
    }

    fn mean_soil_loss(&self) -> Result<f64> {
        let (index, rhs) = self.after_equals(2, "soil_loss_mean_kg_m2")?;
        let value = rhs.replace(" kg/m2 **", "");
        parse_number(value.trim(), self.header, index, "soil_loss_mean_kg_m2")
    }

    fn max_soil_loss(&self) -> Result<f64> {
        let (index, rhs) = self.after_equals(3, "soil_loss_max_kg_m2")?;
        let token = rhs.split_whitespace().next().unwrap_or_default();
        parse_number(token, self.header, index, "soil_loss_max_kg_m2")
    }

    /// Fixed columns 9..18 of the tenth line: length of slope with net loss (m)
    fn length_with_net_loss(&self) -> Result<f64> {
        let field = "road_length_exhibiting_soil_loss_m";
        let (index, line) = self.line(10, field)?;
        let end = line.len().min(18);
        let column = line.get(9..end).unwrap_or_default();
        parse_number(column.trim(), self.header, index, field)
    }
}

fn parse_number<T: std::str::FromStr>(token: &str, section: &str, index: usize, field: &str) -> Result<T> {
    token.parse().map_err(|_| {
        RiskError::parse(section, index + 1, field, format!("cannot read '{token}' as a number"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Averaged section with every field at its documented offset
    fn averages_section(lines: &mut Vec<String>) {
        lines.push("     ANNUAL AVERAGE SUMMARIES".to_string());
        lines.push(String::new());
        lines.push("     RAINFALL AND RUNOFF SUMMARY".to_string());
        for _ in 0..4 {
            lines.push("     ---".to_string());
        }
        lines.push("       412 storms produced      9876.54 mm. of precipitation".to_string()); // +5
        lines.push("       380 rain storms produced 8000.00 mm. of rain".to_string()); // +6
        lines.push("        32 snow melts".to_string()); // +7
        for _ in 0..6 {
            lines.push(String::new());
        }
        lines.push("     average annual precipitation           987.65 mm".to_string()); // +14
        lines.push("     average annual runoff from rainfall     45.60 mm".to_string()); // +15
        lines.push("     from rain falling on frozen soil         0.00 mm".to_string()); // +16
        lines.push("     average annual runoff from snowmelt      4.40 mm".to_string()); // +17
        lines.push(String::new());
        lines.push("     AREA OF NET SOIL LOSS".to_string());
        lines.push(String::new());
        lines.push("     ** Soil Loss (avg. of net detachment areas) =     1.250 kg/m2 **".to_string()); // +2
        lines.push("     ** Maximum soil loss   =    7.500 kg/m2 at     90.00 meters".to_string()); // +3
        for _ in 0..6 {
            lines.push(String::new());
        }
        lines.push(format!("{:9}{:>9.2}   ", "", 80.0)); // +10
        lines.push(String::new());
        lines.push("     OFF SITE EFFECTS  OFF SITE EFFECTS  OFF SITE EFFECTS".to_string());
        for _ in 0..3 {
            lines.push(String::new());
        }
        lines.push("     12.000 kg/m of width".to_string()); // +4
    }

    fn year_block(lines: &mut Vec<String>, year: i32, precip: f64, yield_kg_m: f64) {
        lines.push(format!("     HILLSLOPE   1 YEARLY SUMMARY FOR YEAR {year}"));
        lines.push("     RAINFALL AND RUNOFF SUMMARY".to_string());
        for _ in 0..8 {
            lines.push(String::new());
        }
        lines.push(format!("     90  {precip:.2}  85  20.50  5  1.50")); // +9
        lines.push("     AREA OF NET SOIL LOSS".to_string());
        lines.push(String::new());
        lines.push("     ** Soil Loss (avg. of net detachment areas) =     0.800 kg/m2 **".to_string());
        lines.push("     ** Maximum soil loss   =    3.100 kg/m2 at     95.00 meters".to_string());
        lines.push("     OFF SITE EFFECTS".to_string());
        lines.push(String::new());
        lines.push(String::new());
        lines.push(format!("     Sediment leaving profile   {yield_kg_m:.3} kg/m"));
    }

    fn detailed_report(years: &[(i32, f64, f64)]) -> String {
        let mut lines = vec![
            "Annual; detailed hillslope output".to_string(),
            "     VERSION 2010.1".to_string(),
        ];
        for &(year, precip, yield_kg_m) in years {
            year_block(&mut lines, year, precip, yield_kg_m);
        }
        averages_section(&mut lines);
        lines.join("\n")
    }

    #[test]
    fn test_averaged_report_golden_values() {
        let mut lines = vec!["Annual; abbreviated".to_string()];
        averages_section(&mut lines);
        let report = parse_soil_loss_report(&lines.join("\n"), &ReportOptions::default()).unwrap();

        let SoilLossReport::Averaged(avg) = report else {
            panic!("expected averaged report");
        };
        assert_eq!(avg.storms, 412);
        assert_eq!(avg.rainevents, 380);
        assert_eq!(avg.snowevents, 32);
        assert_eq!(avg.precip_mm, 987.65);
        assert_eq!(avg.runoff_from_rain_mm, 45.6);
        assert_eq!(avg.runoff_from_snow_mm, 4.4);
        assert!((avg.runoff_total_mm - 50.0).abs() < 1e-9);
        assert_eq!(avg.soil_loss_mean_kg_m2, 1.25);
        assert_eq!(avg.soil_loss_max_kg_m2, 7.5);
        assert_eq!(avg.sediment_yield_kg_m, Some(12.0));
        assert_eq!(avg.sediment_yield_kg_m2, None);
        assert!(avg.road.is_none());
    }

    #[test]
    fn test_slope_length_gives_per_area_yield() {
        let mut lines = vec!["Annual; abbreviated".to_string()];
        averages_section(&mut lines);
        let report =
            parse_soil_loss_report(&lines.join("\n"), &ReportOptions::with_slope_length(60.0)).unwrap();
        let avg = report.annual_averages();
        assert_eq!(avg.sediment_yield_kg_m2, Some(0.2));
        assert_eq!(avg.sediment_yield_kg_m, None);
    }

    #[test]
    fn test_road_width_adds_prism_erosion() {
        let mut lines = vec!["Annual; abbreviated".to_string()];
        averages_section(&mut lines);
        let options = ReportOptions {
            road_width_m: Some(4.0),
            ..ReportOptions::default()
        };
        let report = parse_soil_loss_report(&lines.join("\n"), &options).unwrap();
        let road = report.annual_averages().road.clone().unwrap();
        assert_eq!(road.sim_width_m, 4.0);
        assert_eq!(road.road_length_exhibiting_soil_loss_m, 80.0);
        assert!((road.road_prism_erosion_kg - 1.25 * 4.0 * 80.0).abs() < 1e-9);
        assert!((road.sediment_leaving_buffer_kg - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_detailed_report_annuals_and_return_periods() {
        let years: Vec<(i32, f64, f64)> = (1..=10)
            .map(|y| (y, 500.0 + f64::from(y) * 10.0, f64::from(y)))
            .collect();
        let text = detailed_report(&years);
        let report = parse_soil_loss_report(&text, &ReportOptions::with_slope_length(50.0)).unwrap();

        let SoilLossReport::Detailed(detailed) = report else {
            panic!("expected detailed report");
        };
        assert_eq!(detailed.version.as_deref(), Some("VERSION 2010.1"));
        assert_eq!(detailed.annuals.len(), 10);

        let year3 = &detailed.annuals[&3];
        assert_eq!(year3.storms, 90);
        assert_eq!(year3.precip_mm, 530.0);
        assert_eq!(year3.rainevents, 85);
        assert_eq!(year3.runoff_from_rain_mm, 20.5);
        assert_eq!(year3.snowevents, 5);
        assert_eq!(year3.runoff_total_mm, 22.0);
        assert_eq!(year3.soil_loss_mean_kg_m2, 0.8);
        assert_eq!(year3.soil_loss_max_kg_m2, 3.1);
        assert!((year3.sediment_yield_kg_m2.unwrap() - 3.0 / 50.0).abs() < 1e-12);

        let precip = &detailed.return_periods["precip_mm"];
        assert_eq!(precip.len(), 4);
        // n = 10: T=10 → rank 1 (wettest year), T=2 → rank 5
        assert_eq!(precip["10"].year, 10);
        assert_eq!(precip["2"].year, 6);
        assert!(detailed.return_periods.contains_key("sediment_yield_kg_m2"));
        assert!(!detailed.return_periods.contains_key("sediment_yield_kg_m"));
    }

    #[test]
    fn test_duplicate_year_is_rejected() {
        let text = detailed_report(&[(1, 500.0, 1.0), (2, 510.0, 2.0), (1, 520.0, 3.0)]);
        let err = parse_soil_loss_report(&text, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, RiskError::Parse { ref field, .. } if field == "year"));
    }

    #[test]
    fn test_detailed_report_without_year_blocks() {
        let text = detailed_report(&[]);
        let err = parse_soil_loss_report(&text, &ReportOptions::default()).unwrap_err();
        let RiskError::Parse { section, .. } = err else {
            panic!("expected parse error");
        };
        assert_eq!(section, YEAR_BLOCK_MARKER);
    }

    #[test]
    fn test_missing_section_names_header() {
        let text = "Annual; abbreviated\n     RAINFALL AND RUNOFF SUMMARY\n";
        let err = parse_soil_loss_report(text, &ReportOptions::default()).unwrap_err();
        let RiskError::Parse { section, .. } = err else {
            panic!("expected parse error");
        };
        assert_eq!(section, RAINFALL_HEADER);
    }

    #[test]
    fn test_non_numeric_field_is_reported() {
        let mut lines = vec!["Annual; abbreviated".to_string()];
        averages_section(&mut lines);
        let text = lines.join("\n").replace("412 storms", "*** storms");
        let err = parse_soil_loss_report(&text, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, RiskError::Parse { ref field, .. } if field == "storms"));
    }
}
