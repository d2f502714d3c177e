use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::JobPosting;
use crate::services::openrouter::{extract_json_fragment, OpenRouterClient};

/// How an external relevance score combines with the heuristic score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerankMode {
    /// `blend_weight * external + (1 - blend_weight) * heuristic`
    Blend,
    /// External score is authoritative for ordering
    Replace,
}

impl Default for RerankMode {
    fn default() -> Self {
        RerankMode::Blend
    }
}

/// Candidate summary sent to the re-ranking model, never raw documents
#[derive(Debug, Clone)]
pub struct RerankCandidate {
    pub id: String,
    pub full_name: String,
    pub skills: Vec<String>,
    pub summary: String,
    pub heuristic_score: f64,
}

/// One (identifier, score) pair from the external model
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RerankScore {
    #[serde(alias = "candidateId", alias = "identifier", alias = "id")]
    pub candidate_id: String,
    pub score: f64,
}

/// Secondary ordering signal over an already-scored short list.
///
/// Implementations are fail-soft: any transport error, timeout or
/// unparseable output yields `None` and the caller keeps the heuristic
/// order. Nothing may propagate an error past this boundary.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(
        &self,
        job: &JobPosting,
        shortlist: &[RerankCandidate],
    ) -> Option<Vec<RerankScore>>;
}

/// Re-ranker backed by an OpenRouter-compatible relevance model
pub struct RerankClient {
    gateway: OpenRouterClient,
    model: String,
}

const RERANK_SYSTEM_PROMPT: &str = "You are a ranking engine. Compare candidate skills \
     with the job description and rank candidates by fit.";

impl RerankClient {
    pub fn new(gateway: OpenRouterClient, model: String) -> Self {
        Self { gateway, model }
    }

    fn build_prompt(job: &JobPosting, shortlist: &[RerankCandidate]) -> String {
        let candidates_text = shortlist
            .iter()
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "CANDIDATE {} (id: {}):\nName: {}\nSkills: {}\nSummary: {}",
                    i + 1,
                    c.id,
                    c.full_name,
                    c.skills.join(", "),
                    c.summary
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Job:\nTitle: {}\nRequired skills: {}\nDescription: {}\n\n\
             Candidates to evaluate:\n{}\n\n\
             Return ONLY a JSON list of objects, one per candidate:\n\
             [\n  {{\"candidate_id\": \"<id>\", \"score\": 0.87}},\n  ...\n]\n\
             Scores must be between 0 and 1.",
            job.title,
            job.skills_required.join(", "),
            job.description_text,
            candidates_text
        )
    }
}

/// Decode the model output into score pairs.
///
/// Strict decode first; on failure, retry on the bracketed fragment; on a
/// second failure there is no re-ranking signal.
pub fn parse_rerank_output(raw: &str) -> Option<Vec<RerankScore>> {
    if let Ok(scores) = serde_json::from_str::<Vec<RerankScore>>(raw) {
        return Some(scores);
    }

    let fragment = extract_json_fragment(raw)?;
    serde_json::from_str::<Vec<RerankScore>>(fragment).ok()
}

/// Drop pairs referencing unknown candidates and clamp scores to [0, 1]
fn sanitize(scores: Vec<RerankScore>, shortlist: &[RerankCandidate]) -> Vec<RerankScore> {
    let known: HashSet<&str> = shortlist.iter().map(|c| c.id.as_str()).collect();

    scores
        .into_iter()
        .filter(|s| known.contains(s.candidate_id.as_str()) && s.score.is_finite())
        .map(|mut s| {
            s.score = s.score.clamp(0.0, 1.0);
            s
        })
        .collect()
}

#[async_trait]
impl Reranker for RerankClient {
    async fn rerank(
        &self,
        job: &JobPosting,
        shortlist: &[RerankCandidate],
    ) -> Option<Vec<RerankScore>> {
        if shortlist.is_empty() {
            return None;
        }

        let prompt = Self::build_prompt(job, shortlist);

        let raw = match self
            .gateway
            .chat(&self.model, RERANK_SYSTEM_PROMPT, &prompt, 700)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Re-ranker call failed, keeping heuristic order: {}", e);
                return None;
            }
        };

        let scores = match parse_rerank_output(&raw) {
            Some(scores) => scores,
            None => {
                tracing::warn!("Re-ranker output unparseable, keeping heuristic order");
                return None;
            }
        };

        let scores = sanitize(scores, shortlist);
        if scores.is_empty() {
            return None;
        }

        tracing::debug!("Re-ranker returned {} scores", scores.len());
        Some(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortlist() -> Vec<RerankCandidate> {
        vec![
            RerankCandidate {
                id: "c1".to_string(),
                full_name: "A".to_string(),
                skills: vec!["python".to_string()],
                summary: String::new(),
                heuristic_score: 0.5,
            },
            RerankCandidate {
                id: "c2".to_string(),
                full_name: "B".to_string(),
                skills: vec![],
                summary: String::new(),
                heuristic_score: 0.3,
            },
        ]
    }

    #[test]
    fn test_parse_strict_json() {
        let raw = r#"[{"candidate_id": "c1", "score": 0.9}]"#;
        let scores = parse_rerank_output(raw).unwrap();
        assert_eq!(scores[0].candidate_id, "c1");
        assert_eq!(scores[0].score, 0.9);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let raw = "Here is the ranking you asked for:\n\
                   [{\"candidate_id\": \"c1\", \"score\": 0.9},\n\
                    {\"candidate_id\": \"c2\", \"score\": 0.4}]\n\
                   Let me know if you need anything else!";
        let scores = parse_rerank_output(raw).unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_parse_accepts_identifier_alias() {
        let raw = r#"[{"identifier": "c1", "score": 0.7}]"#;
        let scores = parse_rerank_output(raw).unwrap();
        assert_eq!(scores[0].candidate_id, "c1");
    }

    #[test]
    fn test_parse_garbage_is_no_signal() {
        assert!(parse_rerank_output("I could not rank these candidates.").is_none());
        assert!(parse_rerank_output("[not json at all").is_none());
    }

    #[test]
    fn test_sanitize_drops_unknown_and_clamps() {
        let scores = vec![
            RerankScore {
                candidate_id: "c1".to_string(),
                score: 1.7,
            },
            RerankScore {
                candidate_id: "ghost".to_string(),
                score: 0.5,
            },
            RerankScore {
                candidate_id: "c2".to_string(),
                score: f64::NAN,
            },
        ];

        let clean = sanitize(scores, &shortlist());
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].candidate_id, "c1");
        assert_eq!(clean[0].score, 1.0);
    }

    #[test]
    fn test_prompt_contains_summaries_not_documents() {
        let job = JobPosting {
            id: "j".to_string(),
            source: "jobspy".to_string(),
            url: None,
            title: "Data Engineer".to_string(),
            company: None,
            location: Default::default(),
            contract_type: None,
            seniority: None,
            skills_required: vec!["python".to_string(), "sql".to_string()],
            skills_nice: vec![],
            description_text: "Build pipelines".to_string(),
            ingested_at: chrono::Utc::now(),
        };

        let prompt = RerankClient::build_prompt(&job, &shortlist());
        assert!(prompt.contains("Data Engineer"));
        assert!(prompt.contains("id: c1"));
        assert!(prompt.contains("python, sql"));
    }
}
