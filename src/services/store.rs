use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CandidateProfile, JobPosting, MatchRecord, UpsertOutcome};

/// Errors that can occur when interacting with the profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Partial write: {written} rows written, {failed} unconfirmed")]
    PartialWrite {
        written: u64,
        failed: u64,
        #[source]
        source: Box<StoreError>,
    },
}

/// Durable keyed storage for candidates, job postings and match rows.
///
/// The store is the single owner of persistence and uniqueness
/// enforcement; every other component holds only transient in-memory
/// copies during a run. Handles are constructed explicitly at process
/// start and passed in, so tests can substitute [`super::MemoryStore`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or update a posting keyed by its discriminator
    /// (last-write-wins on all fields, `ingested_at` refreshed).
    /// Idempotent: repeated identical upserts keep exactly one record.
    async fn upsert_job(&self, posting: JobPosting) -> Result<UpsertOutcome, StoreError>;

    /// Resolve a posting by exact title. Duplicate titles resolve to the
    /// most recently ingested posting.
    async fn find_job(&self, title: &str) -> Result<JobPosting, StoreError>;

    /// Store a candidate profile, returning its id
    async fn insert_candidate(&self, candidate: CandidateProfile) -> Result<String, StoreError>;

    /// Text search over full_name, summary and declared skills, ranked by
    /// relevance. An empty query returns an unranked sample up to `limit`.
    async fn search_candidates(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, StoreError>;

    /// Bulk-append match rows. Must not fail on an empty list. A failure
    /// partway through reports the confirmed count via
    /// [`StoreError::PartialWrite`].
    async fn insert_matches(&self, rows: &[MatchRecord]) -> Result<u64, StoreError>;

    /// Persisted match rows for a job, score descending, up to `limit`
    async fn matches_for_job(
        &self,
        job_id: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, StoreError>;

    /// Connectivity probe
    async fn health_check(&self) -> Result<bool, StoreError>;
}
