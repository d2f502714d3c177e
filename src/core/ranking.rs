use crate::core::scoring::{round3, ScoreBreakdown};
use crate::models::CandidateProfile;
use crate::services::reranker::{RerankMode, RerankScore};

/// A scored candidate carrying its recall position for tie-breaking
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    /// Position in the recall output; ties on score preserve this order
    pub recall_idx: usize,
    pub candidate: CandidateProfile,
    pub breakdown: ScoreBreakdown,
    /// Ordering score: the heuristic score until a re-rank signal adjusts it
    pub final_score: f64,
}

impl RankedCandidate {
    pub fn new(recall_idx: usize, candidate: CandidateProfile, breakdown: ScoreBreakdown) -> Self {
        let final_score = breakdown.score;
        Self {
            recall_idx,
            candidate,
            breakdown,
            final_score,
        }
    }
}

/// Sort by final score descending; ties broken by recall input order.
/// Deterministic for repeated runs with unchanged data.
pub fn sort_ranked(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.recall_idx.cmp(&b.recall_idx))
    });
}

/// Merge an external re-ranking signal into the final scores.
///
/// Only candidates named by the signal are adjusted; the heuristic score
/// in the breakdown is untouched, so ranking stays explainable.
pub fn apply_rerank(
    ranked: &mut [RankedCandidate],
    signal: &[RerankScore],
    mode: RerankMode,
    blend_weight: f64,
) {
    for entry in ranked.iter_mut() {
        if let Some(rs) = signal.iter().find(|s| s.candidate_id == entry.candidate.id) {
            entry.final_score = match mode {
                RerankMode::Replace => round3(rs.score),
                RerankMode::Blend => round3(
                    blend_weight * rs.score + (1.0 - blend_weight) * entry.breakdown.score,
                ),
            };
        }
    }
}
