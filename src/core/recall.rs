use crate::models::{CandidateProfile, JobPosting};
use crate::services::store::{ProfileStore, StoreError};

/// Default recall bound
pub const DEFAULT_TOP_K: usize = 100;

/// Build the recall query: required skills plus the title's tokens.
///
/// An empty result (no skills, blank title) signals the caller to fall
/// back to unranked sampling.
pub fn build_recall_query(job: &JobPosting) -> String {
    let mut terms: Vec<&str> = job.skills_required.iter().map(String::as_str).collect();
    terms.extend(job.title.split_whitespace());
    terms.join(" ")
}

/// Produce a bounded candidate pool likely to be relevant to the job.
///
/// Never fails for a sparse job description: a job with no skills and an
/// empty title falls back to an unranked sample rather than erroring.
/// Results carry no relevance score; ranking is the scorer's job.
pub async fn recall<S: ProfileStore + ?Sized>(
    store: &S,
    job: &JobPosting,
    k: usize,
) -> Result<Vec<CandidateProfile>, StoreError> {
    let query = build_recall_query(job);

    if query.trim().is_empty() {
        tracing::debug!("Empty recall query for job '{}', sampling up to {}", job.title, k);
    }

    let pool = store.search_candidates(&query, k).await?;

    tracing::debug!("Recalled {} candidates for job '{}'", pool.len(), job.title);
    Ok(pool)
}
