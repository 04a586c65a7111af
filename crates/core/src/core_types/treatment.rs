//! Post-fire rehabilitation treatments

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rehabilitation treatment applied after the fire
///
/// Serialized with the legacy treatment keys (`untreated`, `seeding`, `mulch_0.5`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Treatment {
    #[serde(rename = "untreated")]
    Untreated,
    #[serde(rename = "seeding")]
    Seeding,
    /// Straw mulch at 0.5 Mg/ha
    #[serde(rename = "mulch_0.5")]
    Mulch05,
    /// Straw mulch at 1 Mg/ha
    #[serde(rename = "mulch_1")]
    Mulch10,
    /// Straw mulch at 1.5 Mg/ha
    #[serde(rename = "mulch_1.5")]
    Mulch15,
    /// Straw mulch at 2 Mg/ha
    #[serde(rename = "mulch_2")]
    Mulch20,
}

impl Treatment {
    /// All treatments in table order
    pub const ALL: [Self; 6] = [
        Self::Untreated,
        Self::Seeding,
        Self::Mulch05,
        Self::Mulch10,
        Self::Mulch15,
        Self::Mulch20,
    ];

    /// Legacy treatment key
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Untreated => "untreated",
            Self::Seeding => "seeding",
            Self::Mulch05 => "mulch_0.5",
            Self::Mulch10 => "mulch_1",
            Self::Mulch15 => "mulch_1.5",
            Self::Mulch20 => "mulch_2",
        }
    }

    /// Row of this treatment in the recovery tables
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Untreated => 0,
            Self::Seeding => 1,
            Self::Mulch05 => 2,
            Self::Mulch10 => 3,
            Self::Mulch15 => 4,
            Self::Mulch20 => 5,
        }
    }

    /// Mulch application rate in Mg/ha, `None` for non-mulch treatments
    #[must_use]
    pub const fn mulch_rate_mg_ha(&self) -> Option<f64> {
        match self {
            Self::Untreated | Self::Seeding => None,
            Self::Mulch05 => Some(0.5),
            Self::Mulch10 => Some(1.0),
            Self::Mulch15 => Some(1.5),
            Self::Mulch20 => Some(2.0),
        }
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_table_order() {
        for (i, treatment) in Treatment::ALL.iter().enumerate() {
            assert_eq!(treatment.index(), i);
        }
    }

    #[test]
    fn test_serializes_legacy_key() {
        let json = serde_json::to_string(&Treatment::Mulch15).unwrap();
        assert_eq!(json, "\"mulch_1.5\"");
        assert_eq!(Treatment::Mulch05.mulch_rate_mg_ha(), Some(0.5));
        assert_eq!(Treatment::Seeding.mulch_rate_mg_ha(), None);
    }
}
