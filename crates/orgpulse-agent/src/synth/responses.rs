//! Likert score synthesis.
//!
//! Each respondent carries a latent bias so their answers correlate across
//! dimensions, which is what gives the correlation matrix and Cronbach's
//! alpha realistic values downstream.

use crate::rng::SynthRng;
use orgpulse_model::{DimensionTargets, ItemDescriptor};

/// Spread of the per-respondent latent bias around zero.
const BIAS_SPAN: f64 = 0.8;
/// Spread of the per-item noise around zero.
const NOISE_SPAN: f64 = 2.0;
/// Fallback target when a dimension is missing from the preset table.
const DEFAULT_TARGET: f64 = 3.5;

/// Synthesize one respondent's answers to every item, in questionnaire order.
///
/// Attention checks bypass bias and noise entirely: passers answer the
/// expected score, failers answer a wrong one. Reverse items aim at the
/// mirrored target so they realign under engine inversion.
pub fn synthesize_scores(
    rng: &mut SynthRng,
    items: &[ItemDescriptor],
    targets: &DimensionTargets,
    fails_attention: bool,
) -> Vec<(String, u8)> {
    let bias = (rng.unit() - 0.5) * BIAS_SPAN;
    items
        .iter()
        .map(|item| {
            let score = if item.is_attention_check {
                attention_answer(item.expected_score.unwrap_or(4), fails_attention)
            } else {
                let target = targets.get(&item.dimension_code).copied().unwrap_or(DEFAULT_TARGET);
                let aim = if item.is_reverse { 6.0 - target } else { target };
                let raw = aim + bias + (rng.unit() - 0.5) * NOISE_SPAN;
                raw.round().clamp(1.0, 5.0) as u8
            };
            (item.id.clone(), score)
        })
        .collect()
}

fn attention_answer(expected: u8, fails: bool) -> u8 {
    if !fails {
        expected
    } else if expected == 4 {
        2
    } else {
        4
    }
}
