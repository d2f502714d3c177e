use std::collections::BTreeSet;

use crate::models::{CandidateProfile, JobPosting};

/// Scoring constants, set by configuration rather than computed
#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    /// Weight applied to the skill-overlap base
    pub weight_base: f64,
    /// Additive bonus when job and candidate city match
    pub location_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_base: 0.85,
            location_bonus: 0.1,
        }
    }
}

/// Score and explanation for one (job, candidate) pair
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    /// Final heuristic score in [0, 1], rounded to 3 decimals
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub rationale: String,
}

/// Round to 3 decimal places, the precision persisted for scores
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Compute the deterministic fit score for a candidate against a job.
///
/// Pure: no I/O, no randomness, no failure mode. Any well-formed pair
/// scores, including pairs with empty skill sets. A job with zero
/// required skills yields a zero base ("nothing to match"), never a
/// division error. Matched/missing lists come back sorted.
pub fn score_candidate(
    job: &JobPosting,
    candidate: &CandidateProfile,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let required: BTreeSet<String> = job
        .skills_required
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let declared: BTreeSet<String> = candidate
        .skills_declared
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let matched_skills: Vec<String> = required.intersection(&declared).cloned().collect();
    let missing_skills: Vec<String> = required.difference(&declared).cloned().collect();

    let base = matched_skills.len() as f64 / required.len().max(1) as f64;

    let bonus = match (job.city(), candidate.city()) {
        (Some(job_city), Some(cand_city))
            if job_city.eq_ignore_ascii_case(cand_city) =>
        {
            config.location_bonus
        }
        _ => 0.0,
    };

    let score = round3((base * config.weight_base + bonus).clamp(0.0, 1.0));

    let rationale = format!(
        "{} of {} required skills matched",
        matched_skills.len(),
        required.len()
    );

    ScoreBreakdown {
        score,
        matched_skills,
        missing_skills,
        rationale,
    }
}
