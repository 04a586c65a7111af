//! Burn severity classes, spatial severity patterns and soil bins
//!
//! These are the closed dimensions of the scenario space. Each carries an
//! explicit mapping to the legacy code used in simulator file names and in the
//! serialized assessment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical fire-intensity class of the burned hillslope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BurnSeverity {
    /// High soil burn severity
    High,
    /// Moderate soil burn severity
    Moderate,
    /// Low soil burn severity
    Low,
    /// Unburned reference condition
    Unburned,
}

impl BurnSeverity {
    /// All classes in legacy table order
    pub const ALL: [Self; 4] = [Self::High, Self::Moderate, Self::Low, Self::Unburned];

    /// Single-letter legacy code
    #[must_use]
    pub const fn code(&self) -> char {
        match self {
            Self::High => 'h',
            Self::Moderate => 'm',
            Self::Low => 'l',
            Self::Unburned => 'u',
        }
    }

    /// Display name as accepted by the request layer
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::Unburned => "Unburned",
        }
    }
}

impl fmt::Display for BurnSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BurnSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(Self::High),
            "moderate" | "m" => Ok(Self::Moderate),
            "low" | "l" => Ok(Self::Low),
            "unburned" | "u" => Ok(Self::Unburned),
            _ => Err(format!("unknown burn severity '{s}'")),
        }
    }
}

/// Pre-fire vegetation, used only to pick the unburned management template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VegetationType {
    Forest,
    Range,
    Chaparral,
}

/// How burn intensity varies along the top, middle and bottom thirds of a hillslope
///
/// Each letter is the severity of one third: `h` high, `l` low, `u` unburned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpatialPattern {
    Hhh,
    Lhh,
    Hlh,
    Hhl,
    Llh,
    Lhl,
    Hll,
    Lll,
    Uuu,
}

impl SpatialPattern {
    /// Every pattern known to the scenario tables
    pub const ALL: [Self; 9] = [
        Self::Hhh,
        Self::Lhh,
        Self::Hlh,
        Self::Hhl,
        Self::Llh,
        Self::Lhl,
        Self::Hll,
        Self::Lll,
        Self::Uuu,
    ];

    /// Three-letter legacy code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Hhh => "hhh",
            Self::Lhh => "lhh",
            Self::Hlh => "hlh",
            Self::Hhl => "hhl",
            Self::Llh => "llh",
            Self::Lhl => "lhl",
            Self::Hll => "hll",
            Self::Lll => "lll",
            Self::Uuu => "uuu",
        }
    }

    /// Code with consecutive repeats collapsed, one letter per overland flow element
    ///
    /// `hhl` → `hl`, `lhl` → `lhl`, `lll` → `l`.
    #[must_use]
    pub fn collapsed(&self) -> String {
        let mut out = String::with_capacity(3);
        let mut last = None;
        for c in self.code().chars() {
            if last != Some(c) {
                out.push(c);
            }
            last = Some(c);
        }
        out
    }

    /// Number of overland flow elements (OFEs) the hillslope is split into
    #[must_use]
    pub fn ofe_count(&self) -> usize {
        self.collapsed().len()
    }

    /// Fraction of the slope length covered by each OFE, top to bottom
    #[must_use]
    pub fn ofe_fractions(&self) -> Vec<f64> {
        match self {
            Self::Hhh | Self::Lll | Self::Uuu => vec![1.0],
            Self::Llh | Self::Hhl => vec![2.0 / 3.0, 1.0 / 3.0],
            Self::Lhh | Self::Hll => vec![1.0 / 3.0, 2.0 / 3.0],
            Self::Lhl | Self::Hlh => vec![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
        }
    }

    /// Management template file name for this pattern
    #[must_use]
    pub fn management_template(&self, vegetation: VegetationType) -> String {
        match (self, vegetation) {
            (Self::Uuu, VegetationType::Forest) => "forest_95%_cover_80%_canopy.man".to_string(),
            (Self::Uuu, _) => "range_40%_cover_40%_canopy.man".to_string(),
            _ => format!("{}ofe.man", self.ofe_count()),
        }
    }
}

impl fmt::Display for SpatialPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SpatialPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.code() == lower)
            .ok_or_else(|| format!("unknown spatial severity pattern '{s}'"))
    }
}

impl TryFrom<String> for SpatialPattern {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpatialPattern> for String {
    fn from(value: SpatialPattern) -> Self {
        value.code().to_string()
    }
}

/// Discretized pre-fire soil condition, indexing hydraulic/erodibility interpolation
///
/// Bin 0 is the least erodible condition, bin 4 the most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SoilBin(u8);

impl SoilBin {
    /// Number of soil bins
    pub const COUNT: usize = 5;

    /// All bins in ascending order
    pub const ALL: [Self; Self::COUNT] = [Self(0), Self(1), Self(2), Self(3), Self(4)];

    /// Create a bin, `None` if out of range
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Bin index as a table column
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Raw bin number
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SoilBin {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("soil bin {value} out of range 0..=4"))
    }
}

impl From<SoilBin> for u8 {
    fn from(value: SoilBin) -> Self {
        value.0
    }
}

impl fmt::Display for SoilBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
