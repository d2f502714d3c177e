// Core algorithm exports
pub mod pipeline;
pub mod ranking;
pub mod recall;
pub mod scoring;

pub use pipeline::{MatchPipeline, PipelineError, RerankPolicy, RunReport};
pub use ranking::{apply_rerank, sort_ranked, RankedCandidate};
pub use recall::{build_recall_query, recall, DEFAULT_TOP_K};
pub use scoring::{score_candidate, ScoreBreakdown, ScoringConfig};
