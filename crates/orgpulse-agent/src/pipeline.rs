//! Lifecycle pipeline: the stages behind every CLI subcommand.
//!
//! Stages compose over a shared store, so a snapshot-backed store lets each
//! stage run in its own process invocation while `run-full` chains them all
//! in memory and tears everything down at the end.

use crate::error::PipelineError;
use crate::params::GenerationParams;
use crate::rng::SynthRng;
use crate::synth::{build_open_responses, build_organization, build_population, synthesize_scores};
use crate::verify::{run_checks, VerificationReport};
use chrono::Utc;
use orgpulse_engine::{ReferenceEngine, ResultsEngine};
use orgpulse_model::{
    items_for_campaign, CampaignRecord, CampaignStatus, EngineTotals, OrganizationRecord,
    ResponseRecord, CORE_INSTRUMENT_ID,
};
use orgpulse_store::SurveyStore;
use std::sync::Arc;
use uuid::Uuid;

/// Respondent rows written per store call.
const RESPONDENT_BATCH: usize = 25;
/// Response rows buffered before a flush. Flushes land on respondent
/// boundaries so a failed write never leaves a half-answered respondent.
const RESPONSE_CHUNK: usize = 100;

/// Knobs for `run-full`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub skip_verify: bool,
    /// Leave the generated data in place for inspection.
    pub skip_cleanup: bool,
}

/// Counts produced by the simulation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTotals {
    pub respondents: u32,
    pub responses: u32,
    pub open_responses: u32,
    /// Respondents generated to flunk the attention checks.
    pub planned_failers: u32,
}

/// All lifecycle stages over one store.
pub struct Pipeline {
    store: Arc<dyn SurveyStore>,
    engine: Arc<dyn ResultsEngine>,
}

impl Pipeline {
    /// Pipeline with the in-process reference engine.
    #[must_use]
    pub fn new(store: Arc<dyn SurveyStore>) -> Self {
        let engine = Arc::new(ReferenceEngine::new(Arc::clone(&store)));
        Self { store, engine }
    }

    /// Pipeline with a caller-supplied engine implementation.
    #[must_use]
    pub fn with_engine(store: Arc<dyn SurveyStore>, engine: Arc<dyn ResultsEngine>) -> Self {
        Self { store, engine }
    }

    pub async fn create_organization(
        &self,
        rng: &mut SynthRng,
        params: &GenerationParams,
    ) -> Result<OrganizationRecord, PipelineError> {
        params.validate()?;
        let org = build_organization(rng, params);
        self.store.insert_organization(org.clone()).await?;
        tracing::info!(org_id = %org.id, name = %org.name, "organization created");
        Ok(org)
    }

    pub async fn create_campaign(
        &self,
        rng: &mut SynthRng,
        organization_id: Uuid,
        name: &str,
        params: &GenerationParams,
    ) -> Result<CampaignRecord, PipelineError> {
        self.store
            .fetch_organization(organization_id)
            .await?
            .ok_or(PipelineError::MissingRecord { entity: "organization", id: organization_id })?;
        let campaign = CampaignRecord {
            id: rng.uuid(),
            organization_id,
            name: name.to_string(),
            status: CampaignStatus::Draft,
            instrument_id: CORE_INSTRUMENT_ID.to_string(),
            module_codes: params.modules.clone(),
            population_n: None,
            sample_n: None,
            response_rate: None,
            margin_of_error: None,
            created_at: Utc::now(),
        };
        self.store.insert_campaign(campaign.clone()).await?;
        tracing::info!(campaign_id = %campaign.id, modules = campaign.module_codes.len(), "campaign created");
        Ok(campaign)
    }

    pub async fn activate_campaign(&self, campaign_id: Uuid) -> Result<(), PipelineError> {
        self.set_status(campaign_id, CampaignStatus::Active).await
    }

    pub async fn close_campaign(&self, campaign_id: Uuid) -> Result<(), PipelineError> {
        self.set_status(campaign_id, CampaignStatus::Closed).await
    }

    async fn set_status(
        &self,
        campaign_id: Uuid,
        status: CampaignStatus,
    ) -> Result<(), PipelineError> {
        let mut campaign = self.fetch_campaign(campaign_id).await?;
        campaign.status = status;
        self.store.update_campaign(campaign).await?;
        tracing::info!(%campaign_id, ?status, "campaign status updated");
        Ok(())
    }

    /// Simulate the whole respondent population of an active campaign.
    /// Respondents land in batches, responses in chunks; a failure surfaces
    /// the batch index so a partial run can be diagnosed and cleaned up.
    pub async fn simulate_survey(
        &self,
        rng: &mut SynthRng,
        campaign_id: Uuid,
        params: &GenerationParams,
    ) -> Result<SimulationTotals, PipelineError> {
        params.validate()?;
        let campaign = self.fetch_campaign(campaign_id).await?;
        if campaign.status != CampaignStatus::Active {
            return Err(PipelineError::CampaignNotActive(campaign_id));
        }
        let org = self
            .store
            .fetch_organization(campaign.organization_id)
            .await?
            .ok_or(PipelineError::MissingRecord {
                entity: "organization",
                id: campaign.organization_id,
            })?;
        if org.employee_count < params.respondents {
            return Err(crate::params::ConfigError::InsufficientHeadcount {
                total: org.employee_count,
                respondents: params.respondents,
            }
            .into());
        }

        let items = items_for_campaign(&campaign);
        let targets = params.preset.targets();
        let population = build_population(rng, campaign_id, &org.departments, params);
        let planned_failers = population.iter().filter(|p| p.fails_attention).count() as u32;

        let mut totals = SimulationTotals {
            respondents: population.len() as u32,
            responses: 0,
            open_responses: 0,
            planned_failers,
        };

        let final_batch = (population.len().saturating_sub(1)) / RESPONDENT_BATCH;
        let mut response_buffer: Vec<ResponseRecord> = Vec::with_capacity(RESPONSE_CHUNK * 2);
        let mut open_buffer = Vec::new();
        for (batch_index, batch) in population.chunks(RESPONDENT_BATCH).enumerate() {
            let records: Vec<_> = batch.iter().map(|p| p.record.clone()).collect();
            let participants: Vec<_> = batch.iter().map(|p| p.participant.clone()).collect();
            self.store
                .insert_respondents(&records)
                .await
                .map_err(|source| PipelineError::BatchWrite { batch_index, source })?;
            self.store
                .insert_participants(&participants)
                .await
                .map_err(|source| PipelineError::BatchWrite { batch_index, source })?;

            for planned in batch {
                let answered_at = planned.record.completed_at;
                for (item_id, score) in
                    synthesize_scores(rng, &items, &targets, planned.fails_attention)
                {
                    response_buffer.push(ResponseRecord {
                        respondent_id: planned.record.id,
                        item_id,
                        score,
                        answered_at,
                    });
                }
                if !planned.fails_attention && rng.chance(params.open_text_rate) {
                    open_buffer.extend(build_open_responses(rng, planned.record.id));
                }
                if response_buffer.len() >= RESPONSE_CHUNK {
                    totals.responses += response_buffer.len() as u32;
                    self.store
                        .insert_responses(&std::mem::take(&mut response_buffer))
                        .await
                        .map_err(|source| PipelineError::BatchWrite { batch_index, source })?;
                }
            }
            tracing::info!(batch_index, batch_len = batch.len(), "respondent batch persisted");
        }
        if !response_buffer.is_empty() {
            totals.responses += response_buffer.len() as u32;
            self.store
                .insert_responses(&response_buffer)
                .await
                .map_err(|source| PipelineError::BatchWrite { batch_index: final_batch, source })?;
        }
        if !open_buffer.is_empty() {
            totals.open_responses = open_buffer.len() as u32;
            self.store
                .insert_open_responses(&open_buffer)
                .await
                .map_err(|source| PipelineError::BatchWrite { batch_index: final_batch, source })?;
        }

        tracing::info!(
            respondents = totals.respondents,
            responses = totals.responses,
            open_responses = totals.open_responses,
            planned_failers = totals.planned_failers,
            "survey simulated"
        );
        Ok(totals)
    }

    /// Run the results engine over a campaign.
    pub async fn calculate(&self, campaign_id: Uuid) -> Result<EngineTotals, PipelineError> {
        Ok(self.engine.compute_results(campaign_id).await?)
    }

    /// Run the verification battery against persisted output.
    pub async fn verify(
        &self,
        campaign_id: Uuid,
        params: &GenerationParams,
    ) -> Result<VerificationReport, PipelineError> {
        run_checks(self.store.as_ref(), self.engine.as_ref(), campaign_id, params).await
    }

    /// Delete everything owned by an organization, leaf tables first.
    pub async fn cleanup(&self, organization_id: Uuid) -> Result<(), PipelineError> {
        for campaign in self.store.fetch_campaigns(organization_id).await? {
            let respondent_ids: Vec<Uuid> = self
                .store
                .fetch_respondents(campaign.id)
                .await?
                .iter()
                .map(|r| r.id)
                .collect();
            self.store.delete_responses(&respondent_ids).await?;
            self.store.delete_open_responses(&respondent_ids).await?;
            self.store.delete_participants(campaign.id).await?;
            self.store.delete_respondents(campaign.id).await?;
            self.store.delete_results(campaign.id).await?;
            self.store.delete_analytics(campaign.id).await?;
            self.store.delete_business_indicators(campaign.id).await?;
        }
        self.store.delete_campaigns(organization_id).await?;
        self.store.delete_organization(organization_id).await?;
        tracing::info!(org_id = %organization_id, "organization data removed");
        Ok(())
    }

    /// The full lifecycle in one call: create, simulate, calculate, verify,
    /// then clean up. Cleanup runs even when an intermediate stage fails,
    /// unless `skip_cleanup` asks for the data to be kept.
    pub async fn run_full(
        &self,
        params: &GenerationParams,
        options: RunOptions,
    ) -> Result<(EngineTotals, Option<VerificationReport>), PipelineError> {
        params.validate()?;
        let mut rng = SynthRng::new(params.seed);
        let org = self.create_organization(&mut rng, params).await?;

        let outcome = self.run_stages(&mut rng, org.id, params, options).await;
        if options.skip_cleanup {
            return outcome;
        }
        if let Err(cleanup_err) = self.cleanup(org.id).await {
            tracing::warn!(error = %cleanup_err, "cleanup after run-full failed");
            outcome?;
            return Err(cleanup_err);
        }
        outcome
    }

    async fn run_stages(
        &self,
        rng: &mut SynthRng,
        organization_id: Uuid,
        params: &GenerationParams,
        options: RunOptions,
    ) -> Result<(EngineTotals, Option<VerificationReport>), PipelineError> {
        let campaign =
            self.create_campaign(rng, organization_id, "Climate Survey", params).await?;
        self.activate_campaign(campaign.id).await?;
        self.simulate_survey(rng, campaign.id, params).await?;
        self.close_campaign(campaign.id).await?;
        let totals = self.calculate(campaign.id).await?;
        if options.skip_verify {
            return Ok((totals, None));
        }
        let report = self.verify(campaign.id, params).await?;
        Ok((totals, Some(report)))
    }

    async fn fetch_campaign(&self, campaign_id: Uuid) -> Result<CampaignRecord, PipelineError> {
        self.store
            .fetch_campaign(campaign_id)
            .await?
            .ok_or(PipelineError::MissingRecord { entity: "campaign", id: campaign_id })
    }
}
