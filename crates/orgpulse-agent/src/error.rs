//! Pipeline-level error taxonomy.

use orgpulse_engine::EngineError;
use orgpulse_store::StoreError;
use uuid::Uuid;

/// Failures surfacing from any pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Generation parameters failed validation before any write.
    #[error(transparent)]
    Config(#[from] crate::params::ConfigError),

    /// A store operation outside batched writes failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A batched respondent/response write failed; earlier batches are
    /// already persisted.
    #[error("batch {batch_index} write failed: {source}")]
    BatchWrite {
        batch_index: usize,
        #[source]
        source: StoreError,
    },

    /// Results calculation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A referenced record does not exist in the store.
    #[error("{entity} not found: {id}")]
    MissingRecord { entity: &'static str, id: Uuid },

    /// Simulation requires an active campaign.
    #[error("campaign {0} is not active")]
    CampaignNotActive(Uuid),

    /// Verification ran to completion but some checks failed.
    #[error("verification failed: {failed} of {total} checks")]
    VerificationFailed { failed: usize, total: usize },
}
