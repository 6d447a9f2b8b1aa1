//! Free-text comment synthesis.

use crate::rng::SynthRng;
use orgpulse_model::{OpenResponseRecord, QuestionType};
use uuid::Uuid;

const STRENGTHS: [&str; 6] = [
    "The team genuinely supports each other when deadlines pile up.",
    "My manager gives clear context for decisions that affect us.",
    "Flexible scheduling makes it possible to balance family and work.",
    "Onboarding for new joiners has improved a lot this year.",
    "Cross-team collaboration works better than anywhere I've been.",
    "Leadership shares company results openly every quarter.",
];

const IMPROVEMENTS: [&str; 6] = [
    "Compensation reviews feel opaque; publish the salary bands.",
    "Too many recurring meetings could be an email or a doc.",
    "Career paths for individual contributors need clearer steps.",
    "Recognition tends to reach the same few people every time.",
    "Tooling budgets take months to approve for small purchases.",
    "Internal mobility postings are hard to find before they close.",
];

const GENERAL: [&str; 6] = [
    "Overall a good place to work, with the usual growing pains.",
    "I'd like more visibility into the product roadmap.",
    "The office refurbishment made a real difference day to day.",
    "Survey results should come with a follow-up action plan.",
    "Hybrid policy works well for my team.",
    "Nothing else to add.",
];

/// Roll 1–3 comments for a respondent who chose to leave feedback.
pub fn build_open_responses(rng: &mut SynthRng, respondent_id: Uuid) -> Vec<OpenResponseRecord> {
    let count = rng.int_range(1, 3);
    (0..count)
        .map(|_| {
            let (question_type, pool): (QuestionType, &[&str]) = match rng.int_range(0, 2) {
                0 => (QuestionType::Strength, &STRENGTHS),
                1 => (QuestionType::Improvement, &IMPROVEMENTS),
                _ => (QuestionType::General, &GENERAL),
            };
            OpenResponseRecord {
                respondent_id,
                question_type,
                text: (*rng.pick(pool)).to_string(),
            }
        })
        .collect()
}
