//! JSON snapshot backend.
//!
//! Wraps [`MemoryStore`] with a snapshot file that is loaded on open and
//! rewritten after every mutation, so `create-org`, `simulate-survey`,
//! `verify`, … can run as separate processes against the same data. Writes
//! go to a temp file first and are renamed into place.

use crate::memory::{MemoryStore, Tables};
use crate::{StoreError, SurveyStore};
use async_trait::async_trait;
use orgpulse_model::{
    AnalyticsRecord, BusinessIndicatorRecord, CampaignRecord, OpenResponseRecord,
    OrganizationRecord, ParticipantRecord, RespondentRecord, RespondentStatus, ResponseRecord,
    ResultRecord,
};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed [`SurveyStore`].
#[derive(Debug)]
pub struct JsonStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl JsonStore {
    /// Open a snapshot file, creating an empty store if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<Tables>(&raw)?
        } else {
            Tables::default()
        };
        Ok(Self { inner: MemoryStore::from_tables(tables), path })
    }

    /// The snapshot file this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.inner.snapshot())?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    async fn mutate<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        let out = result?;
        self.flush()?;
        Ok(out)
    }
}

#[async_trait]
impl SurveyStore for JsonStore {
    async fn insert_organization(&self, org: OrganizationRecord) -> Result<(), StoreError> {
        let r = self.inner.insert_organization(org).await;
        self.mutate(r).await
    }

    async fn fetch_organization(&self, id: Uuid) -> Result<Option<OrganizationRecord>, StoreError> {
        self.inner.fetch_organization(id).await
    }

    async fn delete_organization(&self, id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_organization(id).await;
        self.mutate(r).await
    }

    async fn insert_campaign(&self, campaign: CampaignRecord) -> Result<(), StoreError> {
        let r = self.inner.insert_campaign(campaign).await;
        self.mutate(r).await
    }

    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError> {
        self.inner.fetch_campaign(id).await
    }

    async fn update_campaign(&self, campaign: CampaignRecord) -> Result<(), StoreError> {
        let r = self.inner.update_campaign(campaign).await;
        self.mutate(r).await
    }

    async fn fetch_campaigns(&self, org_id: Uuid) -> Result<Vec<CampaignRecord>, StoreError> {
        self.inner.fetch_campaigns(org_id).await
    }

    async fn delete_campaigns(&self, org_id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_campaigns(org_id).await;
        self.mutate(r).await
    }

    async fn insert_respondents(&self, rows: &[RespondentRecord]) -> Result<(), StoreError> {
        let r = self.inner.insert_respondents(rows).await;
        self.mutate(r).await
    }

    async fn fetch_respondents(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<RespondentRecord>, StoreError> {
        self.inner.fetch_respondents(campaign_id).await
    }

    async fn update_respondent_status(
        &self,
        id: Uuid,
        status: RespondentStatus,
    ) -> Result<(), StoreError> {
        let r = self.inner.update_respondent_status(id, status).await;
        self.mutate(r).await
    }

    async fn delete_respondents(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_respondents(campaign_id).await;
        self.mutate(r).await
    }

    async fn insert_participants(&self, rows: &[ParticipantRecord]) -> Result<(), StoreError> {
        let r = self.inner.insert_participants(rows).await;
        self.mutate(r).await
    }

    async fn fetch_participants(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<ParticipantRecord>, StoreError> {
        self.inner.fetch_participants(campaign_id).await
    }

    async fn delete_participants(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_participants(campaign_id).await;
        self.mutate(r).await
    }

    async fn insert_responses(&self, rows: &[ResponseRecord]) -> Result<(), StoreError> {
        let r = self.inner.insert_responses(rows).await;
        self.mutate(r).await
    }

    async fn fetch_responses(
        &self,
        respondent_ids: &[Uuid],
    ) -> Result<Vec<ResponseRecord>, StoreError> {
        self.inner.fetch_responses(respondent_ids).await
    }

    async fn delete_responses(&self, respondent_ids: &[Uuid]) -> Result<(), StoreError> {
        let r = self.inner.delete_responses(respondent_ids).await;
        self.mutate(r).await
    }

    async fn insert_open_responses(&self, rows: &[OpenResponseRecord]) -> Result<(), StoreError> {
        let r = self.inner.insert_open_responses(rows).await;
        self.mutate(r).await
    }

    async fn fetch_open_responses(
        &self,
        respondent_ids: &[Uuid],
    ) -> Result<Vec<OpenResponseRecord>, StoreError> {
        self.inner.fetch_open_responses(respondent_ids).await
    }

    async fn delete_open_responses(&self, respondent_ids: &[Uuid]) -> Result<(), StoreError> {
        let r = self.inner.delete_open_responses(respondent_ids).await;
        self.mutate(r).await
    }

    async fn replace_results(
        &self,
        campaign_id: Uuid,
        rows: Vec<ResultRecord>,
    ) -> Result<(), StoreError> {
        let r = self.inner.replace_results(campaign_id, rows).await;
        self.mutate(r).await
    }

    async fn fetch_results(&self, campaign_id: Uuid) -> Result<Vec<ResultRecord>, StoreError> {
        self.inner.fetch_results(campaign_id).await
    }

    async fn delete_results(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_results(campaign_id).await;
        self.mutate(r).await
    }

    async fn replace_analytics(
        &self,
        campaign_id: Uuid,
        rows: Vec<AnalyticsRecord>,
    ) -> Result<(), StoreError> {
        let r = self.inner.replace_analytics(campaign_id, rows).await;
        self.mutate(r).await
    }

    async fn fetch_analytics(&self, campaign_id: Uuid) -> Result<Vec<AnalyticsRecord>, StoreError> {
        self.inner.fetch_analytics(campaign_id).await
    }

    async fn delete_analytics(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_analytics(campaign_id).await;
        self.mutate(r).await
    }

    async fn insert_business_indicators(
        &self,
        rows: &[BusinessIndicatorRecord],
    ) -> Result<(), StoreError> {
        let r = self.inner.insert_business_indicators(rows).await;
        self.mutate(r).await
    }

    async fn fetch_business_indicators(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<BusinessIndicatorRecord>, StoreError> {
        self.inner.fetch_business_indicators(campaign_id).await
    }

    async fn delete_business_indicators(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        let r = self.inner.delete_business_indicators(campaign_id).await;
        self.mutate(r).await
    }
}
