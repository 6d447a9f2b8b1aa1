//! Results-calculation contract.
//!
//! The platform's Results Calculation Engine is an external collaborator: it
//! reads raw item responses for a campaign and writes back aggregated result
//! rows and analytics records. The harness depends only on the call contract
//! in [`ResultsEngine`]. [`ReferenceEngine`] is a golden in-process
//! implementation of that contract, used as the default wiring of the CLI
//! and as the substitute engine in tests.

mod reference;

pub use reference::ReferenceEngine;

use async_trait::async_trait;
use orgpulse_model::EngineTotals;
use orgpulse_store::StoreError;
use uuid::Uuid;

/// Engine-contract failures. Propagated verbatim to the caller; the run
/// stops before verification.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No campaign with the given id.
    #[error("campaign not found: {0}")]
    CampaignNotFound(Uuid),

    /// The campaign's organization row is missing.
    #[error("organization not found: {0}")]
    OrganizationNotFound(Uuid),

    /// The campaign has no respondents with responses.
    #[error("no respondents with responses for campaign {0}")]
    NoRespondents(Uuid),

    /// Every respondent failed the attention checks.
    #[error("no valid respondents remain for campaign {0}")]
    NoValidRespondents(Uuid),

    /// Store failure surfaced through the engine.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The one operation the harness relies on: compute and persist aggregates
/// for a campaign, returning the contract counts.
///
/// Implementations must be a pure function of the persisted responses:
/// invoking the engine twice on unchanged raw data must yield identical
/// aggregates.
#[async_trait]
pub trait ResultsEngine: Send + Sync {
    async fn compute_results(&self, campaign_id: Uuid) -> Result<EngineTotals, EngineError>;
}
