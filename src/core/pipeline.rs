use std::sync::Arc;
use thiserror::Error;

use crate::core::ranking::{apply_rerank, sort_ranked, RankedCandidate};
use crate::core::recall::recall;
use crate::core::scoring::{score_candidate, ScoringConfig};
use crate::models::{JobPosting, MatchRecord};
use crate::services::reranker::{RerankCandidate, RerankMode, Reranker};
use crate::services::store::{ProfileStore, StoreError};

/// Re-ranking policy for the pipeline
#[derive(Debug, Clone, Copy)]
pub struct RerankPolicy {
    pub mode: RerankMode,
    pub blend_weight: f64,
    /// Size of the slice handed to the external model, capped at 10
    pub shortlist_size: usize,
}

impl Default for RerankPolicy {
    fn default() -> Self {
        Self {
            mode: RerankMode::Blend,
            blend_weight: 0.5,
            shortlist_size: 10,
        }
    }
}

/// Errors surfaced to the caller of a matching run.
///
/// Recall sampling fallback, the zero-requirement scoring convention and
/// re-ranker soft-fail are local recoveries and never appear here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("persistence failure: {written} rows written, {failed} unconfirmed")]
    Persistence {
        written: u64,
        failed: u64,
        #[source]
        source: StoreError,
    },
}

/// Report for a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub job: JobPosting,
    /// Candidates recalled before scoring
    pub pool_size: usize,
    /// Rows persisted (bounded by top_n)
    pub matched: usize,
    /// Whether an external re-ranking signal was applied
    pub reranked: bool,
    pub results: Vec<MatchRecord>,
}

/// Drives a matching run: resolve job, recall, score, optionally re-rank
/// the top slice, sort, truncate, persist.
///
/// Runs are independent units of work keyed by job; the store is the only
/// shared state. Already-flushed rows are not rolled back on a partial
/// persistence failure and there is no automatic retry.
pub struct MatchPipeline {
    store: Arc<dyn ProfileStore>,
    reranker: Option<Arc<dyn Reranker>>,
    scoring: ScoringConfig,
    rerank_policy: RerankPolicy,
}

impl MatchPipeline {
    pub fn new(store: Arc<dyn ProfileStore>, scoring: ScoringConfig) -> Self {
        Self {
            store,
            reranker: None,
            scoring,
            rerank_policy: RerankPolicy::default(),
        }
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>, policy: RerankPolicy) -> Self {
        self.reranker = Some(reranker);
        self.rerank_policy = policy;
        self
    }

    /// Run the matching pipeline for the job with the given title.
    ///
    /// An empty candidate pool is a valid terminal state with zero rows,
    /// not an error. A missing job fails before any write.
    pub async fn run(
        &self,
        job_title: &str,
        top_k: usize,
        top_n: usize,
    ) -> Result<RunReport, PipelineError> {
        let job = match self.store.find_job(job_title).await {
            Ok(job) => job,
            Err(StoreError::NotFound(_)) => {
                return Err(PipelineError::JobNotFound(job_title.to_string()));
            }
            Err(e) => return Err(PipelineError::Store(e)),
        };

        let pool = recall(self.store.as_ref(), &job, top_k)
            .await
            .map_err(PipelineError::Store)?;
        let pool_size = pool.len();

        if pool.is_empty() {
            tracing::info!("Empty candidate pool for job '{}'", job.title);
            return Ok(RunReport {
                job,
                pool_size: 0,
                matched: 0,
                reranked: false,
                results: vec![],
            });
        }

        let mut ranked: Vec<RankedCandidate> = pool
            .into_iter()
            .enumerate()
            .map(|(idx, candidate)| {
                let breakdown = score_candidate(&job, &candidate, &self.scoring);
                RankedCandidate::new(idx, candidate, breakdown)
            })
            .collect();

        sort_ranked(&mut ranked);

        let reranked = self.rerank_top_slice(&job, &mut ranked).await;
        if reranked {
            sort_ranked(&mut ranked);
        }

        // Truncation strictly after any re-ranking
        ranked.truncate(top_n);

        let matched_at = chrono::Utc::now();
        let results: Vec<MatchRecord> = ranked
            .into_iter()
            .map(|entry| MatchRecord {
                id: uuid::Uuid::new_v4().to_string(),
                job_ref: job.id.clone(),
                candidate_ref: entry.candidate.id,
                score: entry.final_score,
                heuristic_score: entry.breakdown.score,
                matched_skills: entry.breakdown.matched_skills,
                missing_skills: entry.breakdown.missing_skills,
                rationale: entry.breakdown.rationale,
                matched_at,
            })
            .collect();

        match self.store.insert_matches(&results).await {
            Ok(written) => {
                tracing::info!(
                    "Run for job '{}' persisted {} of {} recalled candidates (reranked: {})",
                    job.title,
                    written,
                    pool_size,
                    reranked
                );
            }
            Err(StoreError::PartialWrite {
                written,
                failed,
                source,
            }) => {
                return Err(PipelineError::Persistence {
                    written,
                    failed,
                    source: *source,
                });
            }
            Err(e) => {
                return Err(PipelineError::Persistence {
                    written: 0,
                    failed: results.len() as u64,
                    source: e,
                });
            }
        }

        Ok(RunReport {
            job,
            pool_size,
            matched: results.len(),
            reranked,
            results,
        })
    }

    /// Apply the external signal to the current top slice. Returns whether
    /// a signal was obtained; all failures degrade to `false`.
    async fn rerank_top_slice(&self, job: &JobPosting, ranked: &mut [RankedCandidate]) -> bool {
        let Some(reranker) = &self.reranker else {
            return false;
        };

        let slice_len = self.rerank_policy.shortlist_size.min(10).min(ranked.len());
        if slice_len == 0 {
            return false;
        }

        let shortlist: Vec<RerankCandidate> = ranked[..slice_len]
            .iter()
            .map(|entry| RerankCandidate {
                id: entry.candidate.id.clone(),
                full_name: entry.candidate.full_name.clone(),
                skills: entry.candidate.skills_declared.clone(),
                summary: entry.candidate.summary.clone(),
                heuristic_score: entry.breakdown.score,
            })
            .collect();

        match reranker.rerank(job, &shortlist).await {
            Some(signal) => {
                apply_rerank(
                    &mut ranked[..slice_len],
                    &signal,
                    self.rerank_policy.mode,
                    self.rerank_policy.blend_weight,
                );
                true
            }
            None => false,
        }
    }
}
