//! Verification battery over persisted engine output.

mod checks;
mod report;

pub use checks::run_checks;
pub use report::{CheckOutcome, VerificationReport};
