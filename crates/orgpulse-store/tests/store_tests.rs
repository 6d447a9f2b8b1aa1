use chrono::Utc;
use orgpulse_model::{
    AnalysisType, AnalyticsRecord, CampaignRecord, CampaignStatus, Department,
    OrganizationRecord, RespondentRecord, RespondentStatus, ResponseRecord,
};
use orgpulse_store::{JsonStore, MemoryStore, StoreError, SurveyStore};
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn org(id: Uuid) -> OrganizationRecord {
    OrganizationRecord {
        id,
        name: "Test Org".to_string(),
        slug: "test-org".to_string(),
        country: "PA".to_string(),
        industry: "Technology".to_string(),
        employee_count: 80,
        departments: vec![Department { name: "Engineering".to_string(), headcount: 80 }],
        created_at: Utc::now(),
    }
}

fn campaign(id: Uuid, org_id: Uuid) -> CampaignRecord {
    CampaignRecord {
        id,
        organization_id: org_id,
        name: "Wave 1".to_string(),
        status: CampaignStatus::Draft,
        instrument_id: orgpulse_model::CORE_INSTRUMENT_ID.to_string(),
        module_codes: vec![],
        population_n: None,
        sample_n: None,
        response_rate: None,
        margin_of_error: None,
        created_at: Utc::now(),
    }
}

fn respondent(id: Uuid, campaign_id: Uuid) -> RespondentRecord {
    RespondentRecord {
        id,
        campaign_id,
        token: format!("{:016x}", id.as_u128() as u64),
        department: "Engineering".to_string(),
        tenure: "1-3".to_string(),
        gender: "Female".to_string(),
        status: RespondentStatus::Completed,
        started_at: Utc::now(),
        completed_at: Utc::now(),
        enps_score: 8,
    }
}

#[tokio::test]
async fn memory_store_round_trips_records() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();

    store.insert_organization(org(org_id)).await.unwrap();
    store.insert_campaign(campaign(campaign_id, org_id)).await.unwrap();

    let rid = Uuid::new_v4();
    store.insert_respondents(&[respondent(rid, campaign_id)]).await.unwrap();
    store
        .insert_responses(&[ResponseRecord {
            respondent_id: rid,
            item_id: "ORG1".to_string(),
            score: 4,
            answered_at: Utc::now(),
        }])
        .await
        .unwrap();

    assert_eq!(store.fetch_respondents(campaign_id).await.unwrap().len(), 1);
    assert_eq!(store.fetch_responses(&[rid]).await.unwrap().len(), 1);
    assert!(store.fetch_organization(org_id).await.unwrap().is_some());
}

#[tokio::test]
async fn duplicate_respondent_batch_is_rejected_whole() {
    let store = MemoryStore::new();
    let campaign_id = Uuid::new_v4();
    let rid = Uuid::new_v4();

    store.insert_respondents(&[respondent(rid, campaign_id)]).await.unwrap();
    let fresh = Uuid::new_v4();
    let err = store
        .insert_respondents(&[respondent(fresh, campaign_id), respondent(rid, campaign_id)])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId { entity: "respondent", .. }));

    // The non-duplicate row in the same batch must not have landed.
    assert_eq!(store.fetch_respondents(campaign_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn respondent_status_update_requires_existing_row() {
    let store = MemoryStore::new();
    let err = store
        .update_respondent_status(Uuid::new_v4(), RespondentStatus::Disqualified)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "respondent", .. }));
}

#[tokio::test]
async fn json_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let org_id = Uuid::new_v4();
    let campaign_id = Uuid::new_v4();

    {
        let store = JsonStore::open(&path).unwrap();
        store.insert_organization(org(org_id)).await.unwrap();
        store.insert_campaign(campaign(campaign_id, org_id)).await.unwrap();
    }

    let reopened = JsonStore::open(&path).unwrap();
    let found = reopened.fetch_organization(org_id).await.unwrap().unwrap();
    assert_eq!(found.name, "Test Org");
    assert_eq!(reopened.fetch_campaigns(org_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn replace_results_is_idempotent() {
    let store = MemoryStore::new();
    let campaign_id = Uuid::new_v4();
    let row = orgpulse_model::ResultRecord {
        campaign_id,
        result_type: orgpulse_model::ResultType::Enps,
        segment_type: orgpulse_model::SegmentType::Global,
        segment_value: None,
        dimension_code: None,
        item_id: None,
        avg_score: 25.0,
        std_dev: None,
        favorability_pct: None,
        respondent_count: 42,
        metadata: None,
    };

    store.replace_results(campaign_id, vec![row.clone()]).await.unwrap();
    store.replace_results(campaign_id, vec![row.clone()]).await.unwrap();
    assert_eq!(store.fetch_results(campaign_id).await.unwrap(), vec![row]);
}

#[tokio::test]
async fn replace_analytics_swaps_the_whole_family_set() {
    let store = MemoryStore::new();
    let campaign_id = Uuid::new_v4();
    let row = |analysis_type, payload| AnalyticsRecord {
        campaign_id,
        analysis_type,
        data: serde_json::json!(payload),
    };

    store
        .replace_analytics(campaign_id, vec![row(AnalysisType::Alerts, vec!["stale"])])
        .await
        .unwrap();
    let fresh = vec![
        row(AnalysisType::Alerts, vec![]),
        row(AnalysisType::EngagementDrivers, vec!["LEA"]),
    ];
    store.replace_analytics(campaign_id, fresh.clone()).await.unwrap();
    assert_eq!(store.fetch_analytics(campaign_id).await.unwrap(), fresh);
}
