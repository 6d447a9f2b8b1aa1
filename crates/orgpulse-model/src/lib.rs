//! Shared data model for the OrgPulse harness.
//!
//! Three concerns live here:
//! - the minimal record shapes the store persists (respondents, responses,
//!   results, analytics, …),
//! - the built-in instrument catalog (dimensions, Likert items, attention
//!   checks, optional module add-ons),
//! - the climate presets that parameterize synthetic generation, plus the
//!   closed taxonomies used across the workspace.

mod instrument;
mod presets;
mod records;

pub use instrument::{
    infer_expected_score, items_for_campaign, module_instrument, core_instrument, DimensionDef,
    Instrument, ItemDescriptor, ModuleCode, ParseModuleError, CORE_INSTRUMENT_ID,
};
pub use presets::{
    category_of, dimension_name, ClimatePreset, DimensionTargets, ParsePresetError, CATEGORIES,
    DIMENSION_CODES, MODULE_CODES,
};
pub use records::{
    AnalysisType, AnalyticsRecord, BusinessIndicatorRecord, CampaignRecord, CampaignStatus,
    CheckCategory, Department, EngineTotals, OpenResponseRecord, OrganizationRecord,
    ParticipantRecord,
    QuestionType, RespondentRecord, RespondentStatus, ResponseRecord, ResultRecord, ResultType,
    SegmentType,
};
