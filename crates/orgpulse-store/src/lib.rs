//! Survey store seam.
//!
//! The platform's persistent store is an external relational service; the
//! harness only needs a record sink/source with the minimal schema in the
//! data model. [`SurveyStore`] is that seam. Two backends ship here:
//! [`MemoryStore`] for tests and ephemeral runs, and [`JsonStore`], a
//! snapshot-file wrapper that lets individual CLI stages compose across
//! process invocations.

mod memory;
mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::JsonStore;

use async_trait::async_trait;
use orgpulse_model::{
    AnalyticsRecord, BusinessIndicatorRecord, CampaignRecord, OpenResponseRecord,
    OrganizationRecord, ParticipantRecord, RespondentRecord, RespondentStatus, ResponseRecord,
    ResultRecord,
};
use uuid::Uuid;

/// Store-layer failures. A batch insert either lands whole or returns an
/// error; there is no partial acceptance.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Insert would overwrite an existing record.
    #[error("duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },

    /// Snapshot file I/O failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failed.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Record sink/source for one survey store.
///
/// All batch inserts are atomic per call: implementations reject the whole
/// slice or accept it whole. Result/analytics writes use replace semantics
/// per campaign, so recalculation is naturally idempotent.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    // Organizations
    async fn insert_organization(&self, org: OrganizationRecord) -> Result<(), StoreError>;
    async fn fetch_organization(&self, id: Uuid) -> Result<Option<OrganizationRecord>, StoreError>;
    async fn delete_organization(&self, id: Uuid) -> Result<(), StoreError>;

    // Campaigns
    async fn insert_campaign(&self, campaign: CampaignRecord) -> Result<(), StoreError>;
    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError>;
    /// Overwrite an existing campaign row (status transitions, tech sheet).
    async fn update_campaign(&self, campaign: CampaignRecord) -> Result<(), StoreError>;
    async fn fetch_campaigns(&self, org_id: Uuid) -> Result<Vec<CampaignRecord>, StoreError>;
    async fn delete_campaigns(&self, org_id: Uuid) -> Result<(), StoreError>;

    // Respondents
    async fn insert_respondents(&self, rows: &[RespondentRecord]) -> Result<(), StoreError>;
    async fn fetch_respondents(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<RespondentRecord>, StoreError>;
    async fn update_respondent_status(
        &self,
        id: Uuid,
        status: RespondentStatus,
    ) -> Result<(), StoreError>;
    async fn delete_respondents(&self, campaign_id: Uuid) -> Result<(), StoreError>;

    // Participants (PII, separate table)
    async fn insert_participants(&self, rows: &[ParticipantRecord]) -> Result<(), StoreError>;
    async fn fetch_participants(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<ParticipantRecord>, StoreError>;
    async fn delete_participants(&self, campaign_id: Uuid) -> Result<(), StoreError>;

    // Responses
    async fn insert_responses(&self, rows: &[ResponseRecord]) -> Result<(), StoreError>;
    async fn fetch_responses(
        &self,
        respondent_ids: &[Uuid],
    ) -> Result<Vec<ResponseRecord>, StoreError>;
    async fn delete_responses(&self, respondent_ids: &[Uuid]) -> Result<(), StoreError>;

    // Open-text responses
    async fn insert_open_responses(&self, rows: &[OpenResponseRecord]) -> Result<(), StoreError>;
    async fn fetch_open_responses(
        &self,
        respondent_ids: &[Uuid],
    ) -> Result<Vec<OpenResponseRecord>, StoreError>;
    async fn delete_open_responses(&self, respondent_ids: &[Uuid]) -> Result<(), StoreError>;

    // Aggregated results (written by the results engine)
    async fn replace_results(
        &self,
        campaign_id: Uuid,
        rows: Vec<ResultRecord>,
    ) -> Result<(), StoreError>;
    async fn fetch_results(&self, campaign_id: Uuid) -> Result<Vec<ResultRecord>, StoreError>;
    async fn delete_results(&self, campaign_id: Uuid) -> Result<(), StoreError>;

    // Analytics records (written by the results engine)
    async fn replace_analytics(
        &self,
        campaign_id: Uuid,
        rows: Vec<AnalyticsRecord>,
    ) -> Result<(), StoreError>;
    async fn fetch_analytics(&self, campaign_id: Uuid) -> Result<Vec<AnalyticsRecord>, StoreError>;
    async fn delete_analytics(&self, campaign_id: Uuid) -> Result<(), StoreError>;

    // Business indicators (written by the web application; cleanup only)
    async fn insert_business_indicators(
        &self,
        rows: &[BusinessIndicatorRecord],
    ) -> Result<(), StoreError>;
    async fn fetch_business_indicators(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<BusinessIndicatorRecord>, StoreError>;
    async fn delete_business_indicators(&self, campaign_id: Uuid) -> Result<(), StoreError>;
}
