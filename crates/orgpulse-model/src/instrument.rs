//! Built-in instrument catalog.
//!
//! The platform stores instruments (dimension/item definitions) in the
//! relational service; the harness carries an equivalent catalog in code so
//! every stage can resolve item metadata without a seeded database. Item ids
//! are stable string codes (`ORG1`, `ATT2`, `CAM3`) so a catalog rebuilt in a
//! later process invocation still matches previously persisted response rows.

use crate::presets::{dimension_name, DIMENSION_CODES};
use crate::records::CampaignRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Stable id of the core instrument.
pub const CORE_INSTRUMENT_ID: &str = "core-v1";

/// Optional add-on instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModuleCode {
    Cam,
    Cli,
    Dig,
}

impl ModuleCode {
    /// Dimension code contributed by this module.
    #[must_use]
    pub fn dimension_code(self) -> &'static str {
        match self {
            ModuleCode::Cam => "CAM",
            ModuleCode::Cli => "CLI",
            ModuleCode::Dig => "DIG",
        }
    }
}

/// Unknown module code.
#[derive(Debug, thiserror::Error)]
#[error("unknown module code: {0} (expected CAM|CLI|DIG)")]
pub struct ParseModuleError(pub String);

impl FromStr for ModuleCode {
    type Err = ParseModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CAM" => Ok(ModuleCode::Cam),
            "CLI" => Ok(ModuleCode::Cli),
            "DIG" => Ok(ModuleCode::Dig),
            other => Err(ParseModuleError(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dimension_code())
    }
}

/// One survey item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub id: String,
    pub dimension_code: String,
    pub text: String,
    pub is_reverse: bool,
    pub is_attention_check: bool,
    /// The single correct answer, defined only for attention checks.
    pub expected_score: Option<u8>,
}

/// A dimension with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    pub code: String,
    pub name: String,
    pub items: Vec<ItemDescriptor>,
}

/// An instrument: an ordered set of dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    pub dimensions: Vec<DimensionDef>,
}

impl Instrument {
    /// Flattened item list in instrument order.
    #[must_use]
    pub fn items(&self) -> Vec<ItemDescriptor> {
        self.dimensions.iter().flat_map(|d| d.items.iter().cloned()).collect()
    }
}

/// Derive the expected answer of an attention check from its text polarity:
/// disagreement-phrased checks expect 2, agreement-phrased checks expect 4.
#[must_use]
pub fn infer_expected_score(text: &str) -> Option<u8> {
    let lower = text.to_ascii_lowercase();
    if lower.contains("disagree") {
        Some(2)
    } else if lower.contains("agree") {
        Some(4)
    } else {
        None
    }
}

const ITEM_TEMPLATES: [&str; 4] = [
    "Overall, I am satisfied with the level of {} in my day-to-day work.",
    "My direct manager actively supports {} on our team.",
    "In practice, {} is often missing in this organization.",
    "Compared to a year ago, {} has clearly improved.",
];

fn likert_items(code: &str, with_reverse: bool) -> Vec<ItemDescriptor> {
    let topic = dimension_name(code).to_ascii_lowercase();
    ITEM_TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, template)| ItemDescriptor {
            id: format!("{code}{}", idx + 1),
            dimension_code: code.to_string(),
            text: template.replace("{}", &topic),
            // Template 3 is negation-phrased; only some dimensions carry it
            // as a true reverse item.
            is_reverse: with_reverse && idx == 2,
            is_attention_check: false,
            expected_score: None,
        })
        .collect()
}

fn attention_item(id: &str, host_dimension: &str, polarity_agree: bool) -> ItemDescriptor {
    let text = if polarity_agree {
        "This is an attention check: please select 'Agree' for this statement."
    } else {
        "This is an attention check: please select 'Disagree' for this statement."
    };
    ItemDescriptor {
        id: id.to_string(),
        dimension_code: host_dimension.to_string(),
        text: text.to_string(),
        is_reverse: false,
        is_attention_check: true,
        expected_score: infer_expected_score(text),
    }
}

/// The core instrument: 22 dimensions of 4 Likert items each (a reverse item
/// in every other dimension) plus two embedded attention checks.
#[must_use]
pub fn core_instrument() -> Instrument {
    let mut dimensions: Vec<DimensionDef> = DIMENSION_CODES
        .iter()
        .enumerate()
        .map(|(idx, code)| DimensionDef {
            code: (*code).to_string(),
            name: dimension_name(code).to_string(),
            items: likert_items(code, idx % 2 == 0),
        })
        .collect();

    // Attention checks ride inside host dimensions, one near each end of the
    // questionnaire.
    dimensions[0].items.push(attention_item("ATT1", DIMENSION_CODES[0], true));
    dimensions[16].items.push(attention_item("ATT2", DIMENSION_CODES[16], false));

    Instrument {
        id: CORE_INSTRUMENT_ID.to_string(),
        name: "OrgPulse Core".to_string(),
        dimensions,
    }
}

/// A module instrument: one dimension of 4 Likert items, no attention checks.
#[must_use]
pub fn module_instrument(module: ModuleCode) -> Instrument {
    let code = module.dimension_code();
    Instrument {
        id: format!("module-{}", code.to_ascii_lowercase()),
        name: format!("OrgPulse Module {code}"),
        dimensions: vec![DimensionDef {
            code: code.to_string(),
            name: dimension_name(code).to_string(),
            items: likert_items(code, false),
        }],
    }
}

/// All items a campaign's respondents answer: core instrument plus any
/// selected modules, in questionnaire order.
#[must_use]
pub fn items_for_campaign(campaign: &CampaignRecord) -> Vec<ItemDescriptor> {
    let mut items = core_instrument().items();
    for module in &campaign.module_codes {
        items.extend(module_instrument(*module).items());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_instrument_shape() {
        let core = core_instrument();
        assert_eq!(core.dimensions.len(), 22);
        let items = core.items();
        // 22 dims x 4 items + 2 attention checks.
        assert_eq!(items.len(), 90);
        assert_eq!(items.iter().filter(|i| i.is_attention_check).count(), 2);
        // Reverse items only in every other dimension, never on checks.
        assert_eq!(items.iter().filter(|i| i.is_reverse).count(), 11);
    }

    #[test]
    fn item_ids_are_stable_across_rebuilds() {
        assert_eq!(core_instrument().items()[0].id, "ORG1");
        assert_eq!(core_instrument().items()[0].id, core_instrument().items()[0].id);
    }

    #[test]
    fn attention_checks_have_expected_scores() {
        let items = core_instrument().items();
        let checks: Vec<_> = items.iter().filter(|i| i.is_attention_check).collect();
        assert_eq!(checks[0].expected_score, Some(4));
        assert_eq!(checks[1].expected_score, Some(2));
    }

    #[test]
    fn polarity_inference() {
        assert_eq!(infer_expected_score("please select 'Agree' here"), Some(4));
        assert_eq!(infer_expected_score("please select 'Disagree' here"), Some(2));
        assert_eq!(infer_expected_score("an ordinary item"), None);
    }

    #[test]
    fn module_instruments_add_four_items_each() {
        let m = module_instrument(ModuleCode::Dig);
        assert_eq!(m.items().len(), 4);
        assert!(m.items().iter().all(|i| i.dimension_code == "DIG"));
    }
}
