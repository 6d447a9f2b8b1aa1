//! Organization and respondent population synthesis.

use crate::params::GenerationParams;
use crate::rng::SynthRng;
use chrono::{Duration, Utc};
use orgpulse_model::{
    Department, OrganizationRecord, ParticipantRecord, RespondentRecord, RespondentStatus,
};
use uuid::Uuid;

const TENURE_BUCKETS: [&str; 5] = ["<1", "1-3", "3-5", "5-10", "10+"];
const TENURE_WEIGHTS: [f64; 5] = [0.15, 0.25, 0.25, 0.20, 0.15];

const GENDERS: [&str; 4] = ["male", "female", "non_binary", "prefer_not_to_say"];
const GENDER_WEIGHTS: [f64; 4] = [0.44, 0.48, 0.04, 0.04];

const COUNTRIES: [&str; 4] = ["ES", "MX", "AR", "CO"];
const INDUSTRIES: [&str; 5] =
    ["Technology", "Retail", "Financial Services", "Healthcare", "Manufacturing"];

const FIRST_NAMES: [&str; 12] = [
    "Ana", "Luis", "Marta", "Jorge", "Lucia", "Pablo", "Sara", "Diego", "Elena", "Ivan", "Nora",
    "Hugo",
];
const LAST_NAMES: [&str; 12] = [
    "Garcia", "Lopez", "Martinez", "Sanchez", "Romero", "Torres", "Vargas", "Navarro", "Iglesias",
    "Castro", "Mendez", "Rios",
];

/// One synthesized respondent plus its side rows.
pub struct PlannedRespondent {
    pub record: RespondentRecord,
    pub participant: ParticipantRecord,
    /// Will answer both attention checks wrong.
    pub fails_attention: bool,
}

/// Build the organization record. The slug is derived from the name; the
/// employee count is the department headcount total.
pub fn build_organization(rng: &mut SynthRng, params: &GenerationParams) -> OrganizationRecord {
    OrganizationRecord {
        id: rng.uuid(),
        name: params.organization_name.clone(),
        slug: slugify(&params.organization_name),
        country: (*rng.pick(&COUNTRIES)).to_string(),
        industry: (*rng.pick(&INDUSTRIES)).to_string(),
        employee_count: params.employee_count(),
        departments: params.departments.clone(),
        created_at: Utc::now(),
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Synthesize the full respondent population for a campaign: each respondent
/// draws a department weighted by headcount share, then demographics, eNPS
/// rating, completion timestamps, and the attention-check failer flag.
pub fn build_population(
    rng: &mut SynthRng,
    campaign_id: Uuid,
    departments: &[Department],
    params: &GenerationParams,
) -> Vec<PlannedRespondent> {
    let weights: Vec<f64> = departments.iter().map(|d| f64::from(d.headcount)).collect();
    let mut planned = Vec::with_capacity(params.respondents as usize);
    for _ in 0..params.respondents {
        let department = &departments[rng.weighted_index(&weights)].name;
        planned.push(plan_respondent(rng, campaign_id, department, params.fail_rate));
    }
    planned
}

fn plan_respondent(
    rng: &mut SynthRng,
    campaign_id: Uuid,
    department: &str,
    fail_rate: f64,
) -> PlannedRespondent {
    let id = rng.uuid();
    let started_at = Utc::now() - Duration::minutes(i64::from(rng.int_range(30, 120)));
    let completed_at = started_at + Duration::minutes(i64::from(rng.int_range(6, 18)));

    let first = *rng.pick(&FIRST_NAMES);
    let last = *rng.pick(&LAST_NAMES);
    let email = format!(
        "{}.{}.{}@example.test",
        first.to_ascii_lowercase(),
        last.to_ascii_lowercase(),
        rng.int_range(10, 99)
    );

    PlannedRespondent {
        record: RespondentRecord {
            id,
            campaign_id,
            token: rng.token(),
            department: department.to_string(),
            tenure: TENURE_BUCKETS[rng.weighted_index(&TENURE_WEIGHTS)].to_string(),
            gender: GENDERS[rng.weighted_index(&GENDER_WEIGHTS)].to_string(),
            status: RespondentStatus::Completed,
            started_at,
            completed_at,
            enps_score: enps_rating(rng),
        },
        participant: ParticipantRecord {
            campaign_id,
            respondent_id: id,
            name: format!("{first} {last}"),
            email,
        },
        fails_attention: rng.chance(fail_rate),
    }
}

/// 0-10 recommend rating: about a quarter promoters, 45% passives, and a
/// long detractor tail over the remaining 30%.
fn enps_rating(rng: &mut SynthRng) -> u8 {
    let roll = rng.unit();
    if roll < 0.25 {
        rng.int_range(9, 10)
    } else if roll < 0.7 {
        rng.int_range(7, 8)
    } else {
        rng.int_range(0, 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgpulse_model::ClimatePreset;

    fn params() -> GenerationParams {
        GenerationParams::new("Acme Corp", ClimatePreset::Good, 150, 42)
    }

    #[test]
    fn slug_is_url_safe() {
        assert_eq!(slugify("Acme Corp S.A."), "acme-corp-s-a");
    }

    #[test]
    fn departments_follow_headcount_shares() {
        // Headcounts 40/30/30/30/20 out of 150. Over 2000 draws the observed
        // shares sit well within 4 sigma of the expected counts.
        let mut p = params();
        p.respondents = 2000;
        let pop = build_population(&mut SynthRng::new(42), Uuid::nil(), &p.departments, &p);
        let count = |name: &str| {
            pop.iter().filter(|r| r.record.department == name).count() as i64
        };
        assert!((count("Engineering") - 533).abs() < 80, "Engineering {}", count("Engineering"));
        assert!((count("People") - 267).abs() < 62, "People {}", count("People"));
        assert_eq!(pop.len(), 2000);
    }

    #[test]
    fn department_counts_vary_across_seeds() {
        let p = params();
        let engineering = |seed: u64| {
            build_population(&mut SynthRng::new(seed), Uuid::nil(), &p.departments, &p)
                .iter()
                .filter(|r| r.record.department == "Engineering")
                .count()
        };
        let counts: Vec<usize> = (1..=5).map(engineering).collect();
        assert!(counts.iter().any(|c| *c != counts[0]), "no sampling variation: {counts:?}");
    }

    #[test]
    fn population_is_deterministic_per_seed() {
        let campaign_id = Uuid::nil();
        let p = params();
        let a = build_population(&mut SynthRng::new(42), campaign_id, &p.departments, &p);
        let b = build_population(&mut SynthRng::new(42), campaign_id, &p.departments, &p);
        assert_eq!(a.len(), 150);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.record.id, y.record.id);
            assert_eq!(x.record.token, y.record.token);
            assert_eq!(x.fails_attention, y.fails_attention);
        }
    }

    #[test]
    fn demographics_come_from_closed_vocabularies() {
        let p = params();
        let pop = build_population(&mut SynthRng::new(7), Uuid::nil(), &p.departments, &p);
        for r in &pop {
            assert!(TENURE_BUCKETS.contains(&r.record.tenure.as_str()));
            assert!(GENDERS.contains(&r.record.gender.as_str()));
            assert!(r.record.enps_score <= 10);
            assert!(r.record.completed_at > r.record.started_at);
        }
    }
}
