//! Golden implementation of the results contract.
//!
//! Mirrors the production calculation pipeline: disqualify attention-check
//! failers, adjust reverse items, aggregate by dimension/segment/item, derive
//! eNPS and engagement profiles, compute the five analytics families, and
//! fill in the campaign tech sheet. Every output is derived from persisted
//! responses only, so recomputation on unchanged data is byte-identical.

use crate::{EngineError, ResultsEngine};
use async_trait::async_trait;
use orgpulse_model::{
    category_of, dimension_name, items_for_campaign, AnalysisType, AnalyticsRecord,
    CampaignRecord, EngineTotals, ItemDescriptor, RespondentRecord, RespondentStatus,
    ResultRecord, ResultType, SegmentType, CATEGORIES,
};
use orgpulse_stats::{
    cronbach_alpha, favorability, mean, pearson, round_dp, sample_std_dev, within_group_agreement,
};
use orgpulse_store::SurveyStore;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

/// In-process results engine over any [`SurveyStore`].
pub struct ReferenceEngine<S: ?Sized> {
    store: Arc<S>,
}

impl<S: SurveyStore + ?Sized> ReferenceEngine<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

/// Adjusted scores of one valid respondent, grouped for aggregation.
struct ScoredRespondent {
    department: String,
    /// Adjusted (reverse-inverted) score per non-attention item.
    item_scores: HashMap<String, f64>,
    /// Adjusted scores per dimension code.
    dim_scores: BTreeMap<String, Vec<f64>>,
    enps: u8,
}

impl ScoredRespondent {
    fn overall_mean(&self) -> Option<f64> {
        let all: Vec<f64> = self.dim_scores.values().flatten().copied().collect();
        if all.is_empty() {
            None
        } else {
            Some(mean(&all))
        }
    }

    fn dim_mean(&self, code: &str) -> Option<f64> {
        self.dim_scores.get(code).filter(|v| !v.is_empty()).map(|v| mean(v))
    }
}

#[async_trait]
impl<S: SurveyStore + ?Sized> ResultsEngine for ReferenceEngine<S> {
    async fn compute_results(&self, campaign_id: Uuid) -> Result<EngineTotals, EngineError> {
        tracing::info!(%campaign_id, "computing results");

        let mut campaign = self
            .store
            .fetch_campaign(campaign_id)
            .await?
            .ok_or(EngineError::CampaignNotFound(campaign_id))?;
        let org = self
            .store
            .fetch_organization(campaign.organization_id)
            .await?
            .ok_or(EngineError::OrganizationNotFound(campaign.organization_id))?;

        let items = items_for_campaign(&campaign);
        let attention_checks: Vec<(&str, u8)> = items
            .iter()
            .filter(|i| i.is_attention_check)
            .filter_map(|i| i.expected_score.map(|e| (i.id.as_str(), e)))
            .collect();
        let dim_order = dimension_order(&items);

        let respondents = self.store.fetch_respondents(campaign_id).await?;
        let respondent_ids: Vec<Uuid> = respondents.iter().map(|r| r.id).collect();
        let responses = self.store.fetch_responses(&respondent_ids).await?;

        let mut score_map: HashMap<Uuid, HashMap<String, u8>> = HashMap::new();
        for row in &responses {
            score_map.entry(row.respondent_id).or_default().insert(row.item_id.clone(), row.score);
        }
        if score_map.is_empty() {
            return Err(EngineError::NoRespondents(campaign_id));
        }

        // Attention-check gate. Evaluated from raw responses every run, so a
        // second invocation reaches the same verdicts.
        let mut valid: Vec<ScoredRespondent> = Vec::new();
        let mut disqualified_count: u32 = 0;
        for respondent in &respondents {
            let Some(scores) = score_map.get(&respondent.id) else {
                continue;
            };
            let passes = attention_checks
                .iter()
                .all(|(id, expected)| scores.get(*id).copied() == Some(*expected));

            let verdict =
                if passes { RespondentStatus::Completed } else { RespondentStatus::Disqualified };
            if verdict != respondent.status {
                self.store.update_respondent_status(respondent.id, verdict).await?;
            }

            if passes {
                valid.push(score_respondent(respondent, scores, &items));
            } else {
                disqualified_count += 1;
            }
        }
        if valid.is_empty() {
            return Err(EngineError::NoValidRespondents(campaign_id));
        }
        let valid_count = valid.len() as u32;
        tracing::debug!(valid_count, disqualified_count, "attention-check gate applied");

        let mut results: Vec<ResultRecord> = Vec::new();

        // Global dimension rows.
        for code in &dim_order {
            let scores = pooled_dim_scores(&valid, code);
            let n = valid.iter().filter(|r| r.dim_scores.contains_key(code)).count() as u32;
            results.push(dimension_row(campaign_id, code, SegmentType::Global, None, &scores, n));
        }

        // Department segment rows, n >= 5 anonymity floor.
        let mut by_department: BTreeMap<&str, Vec<&ScoredRespondent>> = BTreeMap::new();
        for r in &valid {
            by_department.entry(r.department.as_str()).or_default().push(r);
        }
        for (department, members) in &by_department {
            if members.len() < 5 {
                continue;
            }
            for code in &dim_order {
                let scores: Vec<f64> = members
                    .iter()
                    .flat_map(|r| r.dim_scores.get(code.as_str()).into_iter().flatten())
                    .copied()
                    .collect();
                let n = members.iter().filter(|r| r.dim_scores.contains_key(code)).count() as u32;
                results.push(dimension_row(
                    campaign_id,
                    code,
                    SegmentType::Department,
                    Some((*department).to_string()),
                    &scores,
                    n,
                ));
            }
        }

        // Item rows.
        for item in items.iter().filter(|i| !i.is_attention_check) {
            let scores: Vec<f64> =
                valid.iter().filter_map(|r| r.item_scores.get(&item.id)).copied().collect();
            if scores.is_empty() {
                continue;
            }
            results.push(ResultRecord {
                campaign_id,
                result_type: ResultType::Item,
                segment_type: SegmentType::Global,
                segment_value: None,
                dimension_code: Some(item.dimension_code.clone()),
                item_id: Some(item.id.clone()),
                avg_score: round_dp(mean(&scores), 2),
                std_dev: Some(round_dp(sample_std_dev(&scores), 2)),
                favorability_pct: Some(round_dp(favorability(&scores), 1)),
                respondent_count: scores.len() as u32,
                metadata: None,
            });
        }

        results.push(enps_row(campaign_id, &valid));
        results.push(engagement_row(campaign_id, &valid));

        let analytics = build_analytics(campaign_id, &valid, &dim_order, &items);

        apply_tech_sheet(&mut campaign, org.employee_count, valid_count);
        self.store.update_campaign(campaign).await?;

        let totals = EngineTotals {
            valid_count,
            disqualified_count,
            total_results: results.len() as u32,
            total_analytics: analytics.len() as u32,
        };
        self.store.replace_results(campaign_id, results).await?;
        self.store.replace_analytics(campaign_id, analytics).await?;

        tracing::info!(
            valid = totals.valid_count,
            disqualified = totals.disqualified_count,
            results = totals.total_results,
            analytics = totals.total_analytics,
            "results persisted"
        );
        Ok(totals)
    }
}

/// Dimension codes in questionnaire order, deduplicated.
fn dimension_order(items: &[ItemDescriptor]) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item.dimension_code) {
            seen.push(item.dimension_code.clone());
        }
    }
    seen
}

// Iterates the catalog, not the response map, so score vectors keep
// questionnaire order and repeated runs aggregate identically.
fn score_respondent(
    respondent: &RespondentRecord,
    scores: &HashMap<String, u8>,
    items: &[ItemDescriptor],
) -> ScoredRespondent {
    let mut item_scores = HashMap::new();
    let mut dim_scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for item in items {
        if item.is_attention_check {
            continue;
        }
        let Some(raw) = scores.get(&item.id) else {
            continue;
        };
        let adjusted = if item.is_reverse { 6.0 - f64::from(*raw) } else { f64::from(*raw) };
        item_scores.insert(item.id.clone(), adjusted);
        dim_scores.entry(item.dimension_code.clone()).or_default().push(adjusted);
    }
    ScoredRespondent {
        department: respondent.department.clone(),
        item_scores,
        dim_scores,
        enps: respondent.enps_score,
    }
}

fn pooled_dim_scores(valid: &[ScoredRespondent], code: &str) -> Vec<f64> {
    valid.iter().flat_map(|r| r.dim_scores.get(code).into_iter().flatten()).copied().collect()
}

fn dimension_row(
    campaign_id: Uuid,
    code: &str,
    segment_type: SegmentType,
    segment_value: Option<String>,
    scores: &[f64],
    respondent_count: u32,
) -> ResultRecord {
    let rwg = within_group_agreement(scores);
    ResultRecord {
        campaign_id,
        result_type: ResultType::Dimension,
        segment_type,
        segment_value,
        dimension_code: Some(code.to_string()),
        item_id: None,
        avg_score: round_dp(mean(scores), 2),
        std_dev: Some(round_dp(sample_std_dev(scores), 2)),
        favorability_pct: Some(round_dp(favorability(scores), 1)),
        respondent_count,
        metadata: Some(json!({ "rwg": rwg })),
    }
}

fn enps_row(campaign_id: Uuid, valid: &[ScoredRespondent]) -> ResultRecord {
    let total = valid.len() as f64;
    let promoters = valid.iter().filter(|r| r.enps >= 9).count();
    let passives = valid.iter().filter(|r| (7..=8).contains(&r.enps)).count();
    let detractors = valid.len() - promoters - passives;
    let enps = (promoters as f64 - detractors as f64) / total * 100.0;
    ResultRecord {
        campaign_id,
        result_type: ResultType::Enps,
        segment_type: SegmentType::Global,
        segment_value: None,
        dimension_code: None,
        item_id: None,
        avg_score: round_dp(enps, 1),
        std_dev: None,
        favorability_pct: None,
        respondent_count: valid.len() as u32,
        metadata: Some(json!({
            "promoters": promoters,
            "passives": passives,
            "detractors": detractors,
        })),
    }
}

fn engagement_row(campaign_id: Uuid, valid: &[ScoredRespondent]) -> ResultRecord {
    let mut ambassadors = 0u32;
    let mut committed = 0u32;
    let mut neutral = 0u32;
    let mut disengaged = 0u32;
    let mut overall: Vec<f64> = Vec::new();
    for r in valid {
        let Some(avg) = r.overall_mean() else {
            continue;
        };
        overall.push(avg);
        if avg >= 4.5 {
            ambassadors += 1;
        } else if avg >= 4.0 {
            committed += 1;
        } else if avg >= 3.0 {
            neutral += 1;
        } else {
            disengaged += 1;
        }
    }
    ResultRecord {
        campaign_id,
        result_type: ResultType::Engagement,
        segment_type: SegmentType::Global,
        segment_value: None,
        dimension_code: None,
        item_id: None,
        avg_score: round_dp(mean(&overall), 2),
        std_dev: Some(round_dp(sample_std_dev(&overall), 2)),
        favorability_pct: None,
        respondent_count: overall.len() as u32,
        metadata: Some(json!({
            "profiles": {
                "ambassadors": { "count": ambassadors },
                "committed": { "count": committed },
                "neutral": { "count": neutral },
                "disengaged": { "count": disengaged },
            }
        })),
    }
}

fn build_analytics(
    campaign_id: Uuid,
    valid: &[ScoredRespondent],
    dim_order: &[String],
    items: &[ItemDescriptor],
) -> Vec<AnalyticsRecord> {
    let mut analytics = Vec::with_capacity(AnalysisType::ALL.len());

    // Reliability: Cronbach's alpha per dimension from the item matrix.
    let reliability: Vec<serde_json::Value> = dim_order
        .iter()
        .map(|code| {
            let dim_items: Vec<&ItemDescriptor> = items
                .iter()
                .filter(|i| &i.dimension_code == code && !i.is_attention_check)
                .collect();
            let matrix: Vec<Vec<f64>> = valid
                .iter()
                .filter_map(|r| {
                    dim_items
                        .iter()
                        .map(|i| r.item_scores.get(&i.id).copied())
                        .collect::<Option<Vec<f64>>>()
                })
                .collect();
            json!({ "code": code, "alpha": cronbach_alpha(&matrix) })
        })
        .collect();
    analytics.push(AnalyticsRecord {
        campaign_id,
        analysis_type: AnalysisType::Reliability,
        data: serde_json::Value::Array(reliability),
    });

    // Per-respondent dimension means feed the correlation analyses.
    let dim_means: Vec<BTreeMap<&str, f64>> = valid
        .iter()
        .map(|r| {
            dim_order
                .iter()
                .filter_map(|code| r.dim_mean(code).map(|m| (code.as_str(), m)))
                .collect()
        })
        .collect();
    let series = |code: &str| -> Vec<f64> {
        dim_means.iter().filter_map(|m| m.get(code)).copied().collect()
    };

    let mut matrix = serde_json::Map::new();
    for a in dim_order {
        let mut row = serde_json::Map::new();
        let xs = series(a);
        for b in dim_order {
            let c = pearson(&xs, &series(b));
            row.insert(b.clone(), json!({ "r": c.r, "p_value": c.p_value }));
        }
        matrix.insert(a.clone(), serde_json::Value::Object(row));
    }
    analytics.push(AnalyticsRecord {
        campaign_id,
        analysis_type: AnalysisType::CorrelationMatrix,
        data: serde_json::Value::Object(matrix),
    });

    // Engagement drivers: every dimension against ENG, ENG itself excluded.
    let eng_series = series("ENG");
    let mut drivers: Vec<serde_json::Value> = dim_order
        .iter()
        .filter(|code| code.as_str() != "ENG")
        .map(|code| {
            let c = pearson(&series(code), &eng_series);
            json!({
                "code": code,
                "name": dimension_name(code),
                "r": c.r,
                "p_value": c.p_value,
                "n": c.n,
            })
        })
        .collect();
    drivers.sort_by(|a, b| {
        let ra = a["r"].as_f64().unwrap_or(0.0);
        let rb = b["r"].as_f64().unwrap_or(0.0);
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
    analytics.push(AnalyticsRecord {
        campaign_id,
        analysis_type: AnalysisType::EngagementDrivers,
        data: serde_json::Value::Array(drivers),
    });

    // Category scores over the four-way dimension grouping.
    let categories: Vec<serde_json::Value> = CATEGORIES
        .iter()
        .map(|category| {
            let scores: Vec<f64> = dim_order
                .iter()
                .filter(|code| category_of(code) == Some(*category))
                .flat_map(|code| pooled_dim_scores(valid, code))
                .collect();
            json!({
                "category": category,
                "avg_score": round_dp(mean(&scores), 2),
                "favorability_pct": round_dp(favorability(&scores), 1),
            })
        })
        .collect();
    analytics.push(AnalyticsRecord {
        campaign_id,
        analysis_type: AnalysisType::Categories,
        data: serde_json::Value::Array(categories),
    });

    // Alerts: dimensions under the attention thresholds.
    let alerts: Vec<serde_json::Value> = dim_order
        .iter()
        .filter_map(|code| {
            let scores = pooled_dim_scores(valid, code);
            if scores.is_empty() {
                return None;
            }
            let avg = round_dp(mean(&scores), 2);
            let fav = round_dp(favorability(&scores), 1);
            if avg < 3.0 || fav < 40.0 {
                let severity = if avg < 2.5 { "high" } else { "medium" };
                Some(json!({
                    "code": code,
                    "avg_score": avg,
                    "favorability_pct": fav,
                    "severity": severity,
                }))
            } else {
                None
            }
        })
        .collect();
    analytics.push(AnalyticsRecord {
        campaign_id,
        analysis_type: AnalysisType::Alerts,
        data: serde_json::Value::Array(alerts),
    });

    analytics
}

/// Fill in the campaign tech sheet: population, sample, response rate, and
/// finite-population margin of error at 95% confidence.
fn apply_tech_sheet(campaign: &mut CampaignRecord, employee_count: u32, valid_count: u32) {
    let population = employee_count.max(valid_count);
    let n = f64::from(valid_count);
    let pop = f64::from(population);
    campaign.population_n = Some(population);
    campaign.sample_n = Some(valid_count);
    campaign.response_rate = Some(round_dp(n / pop * 100.0, 1));
    let margin = if valid_count > 0 && population > 1 {
        round_dp(1.96 * (0.25 / n).sqrt() * ((pop - n) / (pop - 1.0)).sqrt() * 100.0, 2)
    } else {
        0.0
    };
    campaign.margin_of_error = Some(margin);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(department: &str, items: &[(&str, &str, f64)], enps: u8) -> ScoredRespondent {
        let mut item_scores = HashMap::new();
        let mut dim_scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (id, dim, score) in items {
            item_scores.insert((*id).to_string(), *score);
            dim_scores.entry((*dim).to_string()).or_default().push(*score);
        }
        ScoredRespondent { department: department.to_string(), item_scores, dim_scores, enps }
    }

    #[test]
    fn enps_row_balances_promoters_and_detractors() {
        let valid: Vec<ScoredRespondent> = (0..10)
            .map(|i| {
                // 4 promoters, 3 passives, 3 detractors -> eNPS = 10.
                let enps = if i < 4 {
                    9
                } else if i < 7 {
                    7
                } else {
                    4
                };
                scored("Ops", &[("ORG1", "ORG", 4.0)], enps)
            })
            .collect();
        let row = enps_row(Uuid::nil(), &valid);
        assert_eq!(row.avg_score, 10.0);
        assert_eq!(row.respondent_count, 10);
    }

    #[test]
    fn engagement_profiles_use_band_boundaries() {
        let valid = vec![
            scored("Ops", &[("ORG1", "ORG", 4.5)], 9),
            scored("Ops", &[("ORG1", "ORG", 4.0)], 8),
            scored("Ops", &[("ORG1", "ORG", 3.0)], 7),
            scored("Ops", &[("ORG1", "ORG", 2.0)], 2),
        ];
        let row = engagement_row(Uuid::nil(), &valid);
        let profiles = &row.metadata.unwrap()["profiles"];
        assert_eq!(profiles["ambassadors"]["count"], 1);
        assert_eq!(profiles["committed"]["count"], 1);
        assert_eq!(profiles["neutral"]["count"], 1);
        assert_eq!(profiles["disengaged"]["count"], 1);
    }

    #[test]
    fn tech_sheet_margin_of_error_formula() {
        let mut campaign = CampaignRecord {
            id: Uuid::nil(),
            organization_id: Uuid::nil(),
            name: "c".to_string(),
            status: orgpulse_model::CampaignStatus::Closed,
            instrument_id: orgpulse_model::CORE_INSTRUMENT_ID.to_string(),
            module_codes: vec![],
            population_n: None,
            sample_n: None,
            response_rate: None,
            margin_of_error: None,
            created_at: chrono::Utc::now(),
        };
        apply_tech_sheet(&mut campaign, 200, 100);
        assert_eq!(campaign.population_n, Some(200));
        assert_eq!(campaign.sample_n, Some(100));
        assert_eq!(campaign.response_rate, Some(50.0));
        let expected = round_dp(1.96 * (0.25f64 / 100.0).sqrt() * (100.0f64 / 199.0).sqrt() * 100.0, 2);
        assert_eq!(campaign.margin_of_error, Some(expected));
    }

    #[test]
    fn dimension_order_preserves_questionnaire_order() {
        let campaign = CampaignRecord {
            id: Uuid::nil(),
            organization_id: Uuid::nil(),
            name: "c".to_string(),
            status: orgpulse_model::CampaignStatus::Active,
            instrument_id: orgpulse_model::CORE_INSTRUMENT_ID.to_string(),
            module_codes: vec![orgpulse_model::ModuleCode::Dig],
            population_n: None,
            sample_n: None,
            response_rate: None,
            margin_of_error: None,
            created_at: chrono::Utc::now(),
        };
        let order = dimension_order(&items_for_campaign(&campaign));
        assert_eq!(order.first().map(String::as_str), Some("ORG"));
        assert_eq!(order.last().map(String::as_str), Some("DIG"));
        assert_eq!(order.len(), 23);
    }
}
