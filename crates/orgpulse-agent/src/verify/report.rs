//! Verification report rendering.

use orgpulse_model::CheckCategory;
use serde::Serialize;
use std::fmt::Write as _;

/// Result of one verification check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub category: CheckCategory,
    pub passed: bool,
    /// Human-readable evidence, shown for failures and kept for audit.
    pub detail: String,
}

/// The full battery outcome, grouped by category for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<CheckOutcome>,
}

impl VerificationReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// Plain-text report grouped by category.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Verification Report");
        let _ = writeln!(out, "===================");
        for category in CheckCategory::ALL {
            let group: Vec<&CheckOutcome> =
                self.checks.iter().filter(|c| c.category == category).collect();
            if group.is_empty() {
                continue;
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{category}:");
            for check in group {
                let mark = if check.passed { "PASS" } else { "FAIL" };
                let _ = writeln!(out, "  [{mark}] {}", check.name);
                if !check.passed {
                    let _ = writeln!(out, "         {}", check.detail);
                }
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} checks, {} failed",
            self.checks.len(),
            self.failed_count()
        );
        out
    }
}
