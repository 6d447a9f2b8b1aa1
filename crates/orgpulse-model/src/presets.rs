//! Dimension taxonomy and climate presets.
//!
//! A climate preset is a named table of target mean scores per dimension on
//! the 1–5 scale. It drives every synthesized Likert score and is the ground
//! truth the verification harness compares engine output against.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The 22 core dimension codes, in instrument order.
pub const DIMENSION_CODES: [&str; 22] = [
    "ORG", "PRO", "SEG", "BAL", "CUI", "DEM", "LID", "AUT", "COM", "CON", "ROL", "CMP", "REC",
    "BEN", "EQA", "NDI", "COH", "INN", "RES", "DES", "APR", "ENG",
];

/// Module add-on dimension codes.
pub const MODULE_CODES: [&str; 3] = ["CAM", "CLI", "DIG"];

/// Display name for a dimension code. Module codes resolve too.
#[must_use]
pub fn dimension_name(code: &str) -> &'static str {
    match code {
        "ORG" => "Pride",
        "PRO" => "Purpose",
        "SEG" => "Safety",
        "BAL" => "Work-Life Balance",
        "CUI" => "Care & Wellbeing",
        "DEM" => "Participative Decision-Making",
        "LID" => "Leadership",
        "AUT" => "Autonomy",
        "COM" => "Communication",
        "CON" => "Trust",
        "ROL" => "Role Clarity",
        "CMP" => "Compensation",
        "REC" => "Recognition",
        "BEN" => "Benefits",
        "EQA" => "Fairness",
        "NDI" => "Inclusion",
        "COH" => "Team Cohesion",
        "INN" => "Innovation",
        "RES" => "Respect",
        "DES" => "Career Development",
        "APR" => "Learning",
        "ENG" => "Engagement",
        "CAM" => "Change Management",
        "CLI" => "Client Orientation",
        "DIG" => "Digital Readiness",
        _ => "Unknown",
    }
}

/// The four reporting categories the engine aggregates dimensions into.
pub const CATEGORIES: [&str; 4] = [
    "Leadership & Trust",
    "Wellbeing & Safety",
    "Rewards & Development",
    "Purpose & Engagement",
];

/// Reporting category for a core dimension code. Module dimensions are not
/// categorized.
#[must_use]
pub fn category_of(code: &str) -> Option<&'static str> {
    match code {
        "LID" | "DEM" | "CON" | "COM" | "AUT" => Some(CATEGORIES[0]),
        "SEG" | "BAL" | "CUI" | "NDI" | "EQA" | "RES" => Some(CATEGORIES[1]),
        "CMP" | "REC" | "BEN" | "DES" | "APR" | "ROL" => Some(CATEGORIES[2]),
        "ORG" | "PRO" | "COH" | "INN" | "ENG" => Some(CATEGORIES[3]),
        _ => None,
    }
}

/// Target mean per dimension code, in stable dimension order.
pub type DimensionTargets = IndexMap<String, f64>;

/// Named climate preset selecting a target-mean table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimatePreset {
    Excellent,
    Good,
    Mixed,
    Poor,
}

/// Unknown preset name.
#[derive(Debug, thiserror::Error)]
#[error("unknown climate preset: {0} (expected excellent|good|mixed|poor)")]
pub struct ParsePresetError(pub String);

impl FromStr for ClimatePreset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excellent" => Ok(ClimatePreset::Excellent),
            "good" => Ok(ClimatePreset::Good),
            "mixed" => Ok(ClimatePreset::Mixed),
            "poor" => Ok(ClimatePreset::Poor),
            other => Err(ParsePresetError(other.to_string())),
        }
    }
}

impl std::fmt::Display for ClimatePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClimatePreset::Excellent => "excellent",
            ClimatePreset::Good => "good",
            ClimatePreset::Mixed => "mixed",
            ClimatePreset::Poor => "poor",
        };
        f.write_str(name)
    }
}

impl ClimatePreset {
    /// The per-dimension target table, including module defaults.
    #[must_use]
    pub fn targets(self) -> DimensionTargets {
        let rows: &[(&str, f64)] = match self {
            ClimatePreset::Excellent => &[
                ("ORG", 4.6),
                ("PRO", 4.5),
                ("SEG", 4.4),
                ("BAL", 4.3),
                ("CUI", 4.5),
                ("DEM", 4.2),
                ("LID", 4.5),
                ("AUT", 4.4),
                ("COM", 4.3),
                ("CON", 4.4),
                ("ROL", 4.5),
                ("CMP", 4.2),
                ("REC", 4.3),
                ("BEN", 4.1),
                ("EQA", 4.2),
                ("NDI", 4.6),
                ("COH", 4.5),
                ("INN", 4.3),
                ("RES", 4.4),
                ("DES", 4.2),
                ("APR", 4.3),
                ("ENG", 4.5),
                ("CAM", 4.3),
                ("CLI", 4.4),
                ("DIG", 4.2),
            ],
            ClimatePreset::Good => &[
                ("ORG", 4.3),
                ("PRO", 4.25),
                ("SEG", 3.9),
                ("BAL", 3.85),
                ("CUI", 4.0),
                ("DEM", 3.7),
                ("LID", 4.2),
                ("AUT", 4.1),
                ("COM", 3.95),
                ("CON", 3.9),
                ("ROL", 4.0),
                ("CMP", 3.6),
                ("REC", 3.8),
                ("BEN", 3.65),
                ("EQA", 3.7),
                ("NDI", 4.4),
                ("COH", 4.15),
                ("INN", 4.0),
                ("RES", 4.05),
                ("DES", 3.7),
                ("APR", 3.9),
                ("ENG", 4.1),
                ("CAM", 3.9),
                ("CLI", 4.0),
                ("DIG", 3.85),
            ],
            ClimatePreset::Mixed => &[
                ("ORG", 4.0),
                ("PRO", 3.9),
                ("SEG", 3.6),
                ("BAL", 3.5),
                ("CUI", 3.7),
                ("DEM", 3.3),
                ("LID", 3.8),
                ("AUT", 3.7),
                ("COM", 3.5),
                ("CON", 3.5),
                ("ROL", 3.7),
                ("CMP", 3.2),
                ("REC", 3.4),
                ("BEN", 3.2),
                ("EQA", 3.3),
                ("NDI", 4.0),
                ("COH", 3.8),
                ("INN", 3.5),
                ("RES", 3.7),
                ("DES", 3.3),
                ("APR", 3.5),
                ("ENG", 3.8),
                ("CAM", 3.5),
                ("CLI", 3.6),
                ("DIG", 3.4),
            ],
            ClimatePreset::Poor => &[
                ("ORG", 3.2),
                ("PRO", 3.0),
                ("SEG", 2.8),
                ("BAL", 2.7),
                ("CUI", 2.9),
                ("DEM", 2.5),
                ("LID", 2.9),
                ("AUT", 2.8),
                ("COM", 2.6),
                ("CON", 2.6),
                ("ROL", 2.8),
                ("CMP", 2.4),
                ("REC", 2.5),
                ("BEN", 2.3),
                ("EQA", 2.4),
                ("NDI", 3.2),
                ("COH", 3.0),
                ("INN", 2.7),
                ("RES", 2.9),
                ("DES", 2.5),
                ("APR", 2.7),
                ("ENG", 2.9),
                ("CAM", 2.7),
                ("CLI", 2.8),
                ("DIG", 2.6),
            ],
        };
        rows.iter().map(|(c, t)| ((*c).to_string(), *t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_covers_all_dimensions_and_modules() {
        for preset in [
            ClimatePreset::Excellent,
            ClimatePreset::Good,
            ClimatePreset::Mixed,
            ClimatePreset::Poor,
        ] {
            let targets = preset.targets();
            for code in DIMENSION_CODES.iter().chain(MODULE_CODES.iter()) {
                let t = targets.get(*code).copied().unwrap_or_default();
                assert!((1.0..=5.0).contains(&t), "{preset} missing {code}");
            }
        }
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!("GOOD".parse::<ClimatePreset>().unwrap(), ClimatePreset::Good);
        assert!("terrible".parse::<ClimatePreset>().is_err());
    }

    #[test]
    fn categories_partition_the_core_dimensions() {
        for code in DIMENSION_CODES {
            assert!(category_of(code).is_some(), "{code} has no category");
        }
        assert_eq!(category_of("CAM"), None);
    }
}
