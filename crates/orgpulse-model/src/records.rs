//! Record shapes persisted in the survey store.
//!
//! These mirror the minimal schema the harness consumes and produces. PII
//! (name, email) lives on `ParticipantRecord`, separate from the anonymous
//! `RespondentRecord` it links to.

use crate::instrument::ModuleCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A department bucket with its target headcount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    pub headcount: u32,
}

/// Organization under test. Created fresh per run, torn down by cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub country: String,
    pub industry: String,
    pub employee_count: u32,
    pub departments: Vec<Department>,
    pub created_at: DateTime<Utc>,
}

/// Campaign lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Closed,
}

/// Measurement campaign. Tech-sheet fields are filled in by the results
/// engine and verified against the raw rows afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub status: CampaignStatus,
    pub instrument_id: String,
    pub module_codes: Vec<ModuleCode>,
    pub population_n: Option<u32>,
    pub sample_n: Option<u32>,
    pub response_rate: Option<f64>,
    pub margin_of_error: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Respondent status. The engine moves attention-check failers from
/// `Completed` to `Disqualified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondentStatus {
    Completed,
    Disqualified,
}

/// Anonymous respondent row (no PII).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondentRecord {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub token: String,
    pub department: String,
    pub tenure: String,
    pub gender: String,
    pub status: RespondentStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// 0–10 recommend-likelihood rating.
    pub enps_score: u8,
}

/// PII row, linked to a respondent but stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub campaign_id: Uuid,
    pub respondent_id: Uuid,
    pub name: String,
    pub email: String,
}

/// One Likert answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub respondent_id: Uuid,
    pub item_id: String,
    /// 1–5.
    pub score: u8,
    pub answered_at: DateTime<Utc>,
}

/// Free-text comment categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Strength,
    Improvement,
    General,
}

/// Free-text comment attached to a respondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResponseRecord {
    pub respondent_id: Uuid,
    pub question_type: QuestionType,
    pub text: String,
}

/// Kinds of aggregated result rows the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Dimension,
    Item,
    Enps,
    Engagement,
}

/// Segmentation axis of a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Global,
    Department,
}

/// One aggregated result row written by the results engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub campaign_id: Uuid,
    pub result_type: ResultType,
    pub segment_type: SegmentType,
    pub segment_value: Option<String>,
    pub dimension_code: Option<String>,
    pub item_id: Option<String>,
    pub avg_score: f64,
    pub std_dev: Option<f64>,
    pub favorability_pct: Option<f64>,
    pub respondent_count: u32,
    pub metadata: Option<serde_json::Value>,
}

/// Analytics families the engine persists alongside result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    CorrelationMatrix,
    EngagementDrivers,
    Alerts,
    Categories,
    Reliability,
}

impl AnalysisType {
    /// Every analytics family a complete calculation must produce.
    pub const ALL: [AnalysisType; 5] = [
        AnalysisType::CorrelationMatrix,
        AnalysisType::EngagementDrivers,
        AnalysisType::Alerts,
        AnalysisType::Categories,
        AnalysisType::Reliability,
    ];
}

/// One analytics record (opaque JSON payload per family).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub campaign_id: Uuid,
    pub analysis_type: AnalysisType,
    pub data: serde_json::Value,
}

/// Business KPI row. Written by the web application, never by the harness;
/// cleanup still has to delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessIndicatorRecord {
    pub campaign_id: Uuid,
    pub name: String,
    pub value: f64,
}

/// Counts returned by the results-calculation contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTotals {
    pub valid_count: u32,
    pub disqualified_count: u32,
    pub total_results: u32,
    pub total_analytics: u32,
}

/// Verification check categories. A closed enum so a typo cannot silently
/// introduce an unverified category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    Structural,
    Statistical,
    Consistency,
    Recalculation,
}

impl CheckCategory {
    /// Report ordering.
    pub const ALL: [CheckCategory; 4] = [
        CheckCategory::Structural,
        CheckCategory::Statistical,
        CheckCategory::Consistency,
        CheckCategory::Recalculation,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CheckCategory::Structural => "Structural",
            CheckCategory::Statistical => "Statistical",
            CheckCategory::Consistency => "Consistency",
            CheckCategory::Recalculation => "Recalculation",
        }
    }
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_json() {
        let json = serde_json::to_string(&AnalysisType::CorrelationMatrix).unwrap();
        assert_eq!(json, "\"correlation_matrix\"");
        let back: AnalysisType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AnalysisType::CorrelationMatrix);

        let status: RespondentStatus = serde_json::from_str("\"disqualified\"").unwrap();
        assert_eq!(status, RespondentStatus::Disqualified);
    }

    #[test]
    fn check_categories_are_exactly_four() {
        assert_eq!(CheckCategory::ALL.len(), 4);
        assert_eq!(CheckCategory::Recalculation.label(), "Recalculation");
    }
}
