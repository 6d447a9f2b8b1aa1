//! Synthetic survey-data generator and verification harness.
//!
//! The agent drives the whole lifecycle against a [`orgpulse_store::SurveyStore`]:
//! create an organization and campaign, simulate a respondent population with
//! a known climate preset, run the results engine, then verify the persisted
//! output against the statistical properties the preset guarantees. Every
//! stage is reachable as a CLI subcommand and as a library call.

pub mod error;
pub mod params;
pub mod pipeline;
pub mod rng;
pub mod synth;
pub mod verify;

pub use error::PipelineError;
pub use params::{ConfigError, GenerationParams};
pub use pipeline::{Pipeline, RunOptions};
pub use rng::SynthRng;
pub use verify::{CheckOutcome, VerificationReport};
