// Integration tests for Talent Algo

use std::sync::Arc;

use talent_algo::core::{MatchPipeline, PipelineError, ScoringConfig};
use talent_algo::models::{CandidateIn, JobIngestPayload, JobPostingIn};
use talent_algo::services::{MemoryStore, ProfileStore};

fn posting_json(title: &str, company: &str, skills: &[&str]) -> JobPostingIn {
    serde_json::from_value(serde_json::json!({
        "source": "jobspy",
        "title": title,
        "company": company,
        "skills_required": skills,
    }))
    .expect("valid posting payload")
}

fn candidate_json(name: &str, skills: &[&str]) -> CandidateIn {
    serde_json::from_value(serde_json::json!({
        "full_name": name,
        "skills_declared": skills,
    }))
    .expect("valid candidate payload")
}

#[tokio::test]
async fn test_end_to_end_matching_scenario() {
    let store = Arc::new(MemoryStore::new());

    // Ingest one posting and one candidate
    store
        .upsert_job(posting_json("Data Engineer", "Acme", &["python", "sql"]).into_posting())
        .await
        .unwrap();
    store
        .insert_candidate(candidate_json("J. Doe", &["python", "airflow"]).into_profile())
        .await
        .unwrap();

    let pipeline = MatchPipeline::new(store.clone(), ScoringConfig::default());
    let report = pipeline.run("Data Engineer", 100, 10).await.unwrap();

    assert_eq!(report.matched, 1);
    let row = &report.results[0];
    assert_eq!(row.matched_skills, vec!["python"]);
    assert_eq!(row.missing_skills, vec!["sql"]);
    // 0.5 base * 0.85 weight, no location bonus
    assert_eq!(row.score, 0.425);
    assert_eq!(row.rationale, "1 of 2 required skills matched");

    // The persisted rows read back score-descending
    let stored = store.matches_for_job(&report.job.id, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].candidate_ref, row.candidate_ref);
}

#[tokio::test]
async fn test_reingestion_is_idempotent() {
    let store = Arc::new(MemoryStore::new());

    // Same discriminator key, incidental whitespace differences
    let first = posting_json("Data Engineer", "Acme", &["python"]);
    let second = posting_json(" Data Engineer ", "  Acme ", &["python", "sql"]);

    store.upsert_job(first.into_posting()).await.unwrap();
    store.upsert_job(second.into_posting()).await.unwrap();

    assert_eq!(store.job_count(), 1);

    // Last write wins
    let job = store.find_job("Data Engineer").await.unwrap();
    assert_eq!(job.skills_required, vec!["python", "sql"]);
}

#[tokio::test]
async fn test_batch_ingest_payload() {
    let store = Arc::new(MemoryStore::new());

    let payload: JobIngestPayload = serde_json::from_value(serde_json::json!([
        {"title": "Data Engineer", "company": "Acme"},
        {"title": "ML Engineer", "company": "Acme"},
    ]))
    .unwrap();

    for posting in payload.into_postings() {
        store.upsert_job(posting.into_posting()).await.unwrap();
    }

    assert_eq!(store.job_count(), 2);
}

#[tokio::test]
async fn test_rerun_appends_new_rows() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_job(posting_json("Data Engineer", "Acme", &["python"]).into_posting())
        .await
        .unwrap();
    store
        .insert_candidate(candidate_json("J. Doe", &["python"]).into_profile())
        .await
        .unwrap();

    let pipeline = MatchPipeline::new(store.clone(), ScoringConfig::default());
    pipeline.run("Data Engineer", 100, 10).await.unwrap();
    pipeline.run("Data Engineer", 100, 10).await.unwrap();

    // Rows are append-only; a later run supersedes by recency, not deletion
    assert_eq!(store.match_count(), 2);
}

#[tokio::test]
async fn test_missing_job_surfaces_not_found() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = MatchPipeline::new(store, ScoringConfig::default());

    match pipeline.run("Ghost Job", 100, 10).await {
        Err(PipelineError::JobNotFound(title)) => assert_eq!(title, "Ghost Job"),
        other => panic!("expected JobNotFound, got {:?}", other.map(|r| r.matched)),
    }
}

#[tokio::test]
async fn test_empty_pool_is_success_with_zero_rows() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_job(posting_json("Data Engineer", "Acme", &["cobol"]).into_posting())
        .await
        .unwrap();

    let pipeline = MatchPipeline::new(store.clone(), ScoringConfig::default());
    let report = pipeline.run("Data Engineer", 100, 10).await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(store.match_count(), 0);
}

#[tokio::test]
async fn test_ranking_is_deterministic_across_runs() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_job(posting_json("Data Engineer", "Acme", &["python", "sql"]).into_posting())
        .await
        .unwrap();

    // Two candidates with identical skill overlap tie on score
    for name in ["First", "Second", "Third"] {
        store
            .insert_candidate(candidate_json(name, &["python", "sql"]).into_profile())
            .await
            .unwrap();
    }

    let pipeline = MatchPipeline::new(store.clone(), ScoringConfig::default());

    let first_run = pipeline.run("Data Engineer", 100, 10).await.unwrap();
    let second_run = pipeline.run("Data Engineer", 100, 10).await.unwrap();

    let first_order: Vec<&str> = first_run
        .results
        .iter()
        .map(|r| r.candidate_ref.as_str())
        .collect();
    let second_order: Vec<&str> = second_run
        .results
        .iter()
        .map(|r| r.candidate_ref.as_str())
        .collect();

    assert_eq!(first_order, second_order);
}

#[tokio::test]
async fn test_candidate_with_no_skills_still_flows() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_job(posting_json("Data Engineer", "Acme", &["python"]).into_posting())
        .await
        .unwrap();
    store
        .insert_candidate(candidate_json("Data Fan", &[]).into_profile())
        .await
        .unwrap();

    let pipeline = MatchPipeline::new(store, ScoringConfig::default());
    // "Data" token in the name still recalls the candidate; the score is 0
    let report = pipeline.run("Data Engineer", 100, 10).await.unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(report.results[0].score, 0.0);
    assert_eq!(report.results[0].missing_skills, vec!["python"]);
}
