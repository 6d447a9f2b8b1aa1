//! In-memory store backend.

use crate::{StoreError, SurveyStore};
use async_trait::async_trait;
use orgpulse_model::{
    AnalyticsRecord, BusinessIndicatorRecord, CampaignRecord, OpenResponseRecord,
    OrganizationRecord, ParticipantRecord, RespondentRecord, RespondentStatus, ResponseRecord,
    ResultRecord,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Everything one store holds. Also the JSON snapshot shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    pub(crate) organizations: BTreeMap<Uuid, OrganizationRecord>,
    pub(crate) campaigns: BTreeMap<Uuid, CampaignRecord>,
    pub(crate) respondents: BTreeMap<Uuid, RespondentRecord>,
    pub(crate) participants: Vec<ParticipantRecord>,
    pub(crate) responses: Vec<ResponseRecord>,
    pub(crate) open_responses: Vec<OpenResponseRecord>,
    pub(crate) results: BTreeMap<Uuid, Vec<ResultRecord>>,
    pub(crate) analytics: BTreeMap<Uuid, Vec<AnalyticsRecord>>,
    pub(crate) business_indicators: Vec<BusinessIndicatorRecord>,
}

/// Map-backed [`SurveyStore`]. The default backend for tests and for
/// `run-full` invocations that tear everything down anyway.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_tables(tables: Tables) -> Self {
        Self { tables: RwLock::new(tables) }
    }

    pub(crate) fn snapshot(&self) -> Tables {
        self.tables.read().clone()
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn insert_organization(&self, org: OrganizationRecord) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        if t.organizations.contains_key(&org.id) {
            return Err(StoreError::DuplicateId { entity: "organization", id: org.id.to_string() });
        }
        t.organizations.insert(org.id, org);
        Ok(())
    }

    async fn fetch_organization(&self, id: Uuid) -> Result<Option<OrganizationRecord>, StoreError> {
        Ok(self.tables.read().organizations.get(&id).cloned())
    }

    async fn delete_organization(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables.write().organizations.remove(&id);
        Ok(())
    }

    async fn insert_campaign(&self, campaign: CampaignRecord) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        if t.campaigns.contains_key(&campaign.id) {
            return Err(StoreError::DuplicateId { entity: "campaign", id: campaign.id.to_string() });
        }
        t.campaigns.insert(campaign.id, campaign);
        Ok(())
    }

    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError> {
        Ok(self.tables.read().campaigns.get(&id).cloned())
    }

    async fn update_campaign(&self, campaign: CampaignRecord) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        if !t.campaigns.contains_key(&campaign.id) {
            return Err(StoreError::NotFound { entity: "campaign", id: campaign.id.to_string() });
        }
        t.campaigns.insert(campaign.id, campaign);
        Ok(())
    }

    async fn fetch_campaigns(&self, org_id: Uuid) -> Result<Vec<CampaignRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .campaigns
            .values()
            .filter(|c| c.organization_id == org_id)
            .cloned()
            .collect())
    }

    async fn delete_campaigns(&self, org_id: Uuid) -> Result<(), StoreError> {
        self.tables.write().campaigns.retain(|_, c| c.organization_id != org_id);
        Ok(())
    }

    async fn insert_respondents(&self, rows: &[RespondentRecord]) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        for row in rows {
            if t.respondents.contains_key(&row.id) {
                return Err(StoreError::DuplicateId {
                    entity: "respondent",
                    id: row.id.to_string(),
                });
            }
        }
        for row in rows {
            t.respondents.insert(row.id, row.clone());
        }
        Ok(())
    }

    async fn fetch_respondents(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<RespondentRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .respondents
            .values()
            .filter(|r| r.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn update_respondent_status(
        &self,
        id: Uuid,
        status: RespondentStatus,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.write();
        match t.respondents.get_mut(&id) {
            Some(row) => {
                row.status = status;
                Ok(())
            }
            None => Err(StoreError::NotFound { entity: "respondent", id: id.to_string() }),
        }
    }

    async fn delete_respondents(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        self.tables.write().respondents.retain(|_, r| r.campaign_id != campaign_id);
        Ok(())
    }

    async fn insert_participants(&self, rows: &[ParticipantRecord]) -> Result<(), StoreError> {
        self.tables.write().participants.extend_from_slice(rows);
        Ok(())
    }

    async fn fetch_participants(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<ParticipantRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .participants
            .iter()
            .filter(|p| p.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn delete_participants(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        self.tables.write().participants.retain(|p| p.campaign_id != campaign_id);
        Ok(())
    }

    async fn insert_responses(&self, rows: &[ResponseRecord]) -> Result<(), StoreError> {
        self.tables.write().responses.extend_from_slice(rows);
        Ok(())
    }

    async fn fetch_responses(
        &self,
        respondent_ids: &[Uuid],
    ) -> Result<Vec<ResponseRecord>, StoreError> {
        let wanted: HashSet<Uuid> = respondent_ids.iter().copied().collect();
        Ok(self
            .tables
            .read()
            .responses
            .iter()
            .filter(|r| wanted.contains(&r.respondent_id))
            .cloned()
            .collect())
    }

    async fn delete_responses(&self, respondent_ids: &[Uuid]) -> Result<(), StoreError> {
        let doomed: HashSet<Uuid> = respondent_ids.iter().copied().collect();
        self.tables.write().responses.retain(|r| !doomed.contains(&r.respondent_id));
        Ok(())
    }

    async fn insert_open_responses(&self, rows: &[OpenResponseRecord]) -> Result<(), StoreError> {
        self.tables.write().open_responses.extend_from_slice(rows);
        Ok(())
    }

    async fn fetch_open_responses(
        &self,
        respondent_ids: &[Uuid],
    ) -> Result<Vec<OpenResponseRecord>, StoreError> {
        let wanted: HashSet<Uuid> = respondent_ids.iter().copied().collect();
        Ok(self
            .tables
            .read()
            .open_responses
            .iter()
            .filter(|r| wanted.contains(&r.respondent_id))
            .cloned()
            .collect())
    }

    async fn delete_open_responses(&self, respondent_ids: &[Uuid]) -> Result<(), StoreError> {
        let doomed: HashSet<Uuid> = respondent_ids.iter().copied().collect();
        self.tables.write().open_responses.retain(|r| !doomed.contains(&r.respondent_id));
        Ok(())
    }

    async fn replace_results(
        &self,
        campaign_id: Uuid,
        rows: Vec<ResultRecord>,
    ) -> Result<(), StoreError> {
        self.tables.write().results.insert(campaign_id, rows);
        Ok(())
    }

    async fn fetch_results(&self, campaign_id: Uuid) -> Result<Vec<ResultRecord>, StoreError> {
        Ok(self.tables.read().results.get(&campaign_id).cloned().unwrap_or_default())
    }

    async fn delete_results(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        self.tables.write().results.remove(&campaign_id);
        Ok(())
    }

    async fn replace_analytics(
        &self,
        campaign_id: Uuid,
        rows: Vec<AnalyticsRecord>,
    ) -> Result<(), StoreError> {
        self.tables.write().analytics.insert(campaign_id, rows);
        Ok(())
    }

    async fn fetch_analytics(&self, campaign_id: Uuid) -> Result<Vec<AnalyticsRecord>, StoreError> {
        Ok(self.tables.read().analytics.get(&campaign_id).cloned().unwrap_or_default())
    }

    async fn delete_analytics(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        self.tables.write().analytics.remove(&campaign_id);
        Ok(())
    }

    async fn insert_business_indicators(
        &self,
        rows: &[BusinessIndicatorRecord],
    ) -> Result<(), StoreError> {
        self.tables.write().business_indicators.extend_from_slice(rows);
        Ok(())
    }

    async fn fetch_business_indicators(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<BusinessIndicatorRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .business_indicators
            .iter()
            .filter(|b| b.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn delete_business_indicators(&self, campaign_id: Uuid) -> Result<(), StoreError> {
        self.tables.write().business_indicators.retain(|b| b.campaign_id != campaign_id);
        Ok(())
    }
}
