//! Synthetic population and response generators.
//!
//! All generators are pure functions of a [`crate::SynthRng`] and the
//! generation parameters; they never touch the store.

mod open_text;
mod population;
mod responses;

pub use open_text::build_open_responses;
pub use population::{build_organization, build_population, PlannedRespondent};
pub use responses::synthesize_scores;
