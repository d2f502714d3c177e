use serde::{Deserialize, Serialize};

use crate::models::domain::MatchRecord;

/// Response for job ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub ingested: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Response for candidate creation (manual or CV upload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCandidateResponse {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "skillsDetected")]
    pub skills_detected: Vec<String>,
}

/// Response for a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMatchResponse {
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    #[serde(rename = "poolSize")]
    pub pool_size: usize,
    pub matched: usize,
    pub reranked: bool,
}

/// Response for reading persisted matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub items: Vec<MatchRecord>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
