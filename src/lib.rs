//! Talent Algo - candidate/job matching service
//!
//! This library implements the matching pipeline used by the talent
//! platform: candidate recall, deterministic heuristic scoring, optional
//! external-model re-ranking, and idempotent persistence of postings and
//! match results.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchPipeline, PipelineError, RerankPolicy, RunReport, ScoringConfig};
pub use models::{CandidateProfile, JobPosting, MatchRecord};
pub use services::{MemoryStore, ProfileStore, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let config = ScoringConfig::default();
        assert_eq!(config.weight_base, 0.85);
    }
}
