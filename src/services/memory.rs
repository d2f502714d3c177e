use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::models::{CandidateProfile, JobKey, JobPosting, MatchRecord, UpsertOutcome};
use crate::services::store::{ProfileStore, StoreError};

/// In-memory profile store.
///
/// Backs tests and local development; mirrors the Postgres store's
/// semantics (discriminator-keyed upserts, recency tie-break on title
/// lookup, token-overlap text ranking approximating ts_rank).
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    candidates: Vec<CandidateProfile>,
    jobs: Vec<JobPosting>,
    matches: Vec<MatchRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> StoreError {
        StoreError::InvalidInput("memory store lock poisoned".to_string())
    }

    /// Number of stored postings (test inspection)
    pub fn job_count(&self) -> usize {
        self.inner.read().map(|i| i.jobs.len()).unwrap_or(0)
    }

    /// Number of stored match rows (test inspection)
    pub fn match_count(&self) -> usize {
        self.inner.read().map(|i| i.matches.len()).unwrap_or(0)
    }
}

fn same_key(a: JobKey<'_>, b: JobKey<'_>) -> bool {
    a == b
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Relevance of a candidate to a query: count of distinct query tokens
/// present in the candidate's name, summary or skills
fn relevance(candidate: &CandidateProfile, query_tokens: &HashSet<String>) -> usize {
    let mut haystack: HashSet<String> = HashSet::new();
    haystack.extend(tokenize(&candidate.full_name));
    haystack.extend(tokenize(&candidate.summary));
    for skill in &candidate.skills_declared {
        haystack.extend(tokenize(skill));
    }

    query_tokens.iter().filter(|t| haystack.contains(*t)).count()
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn upsert_job(&self, posting: JobPosting) -> Result<UpsertOutcome, StoreError> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_poisoned())?;

        let existing = inner
            .jobs
            .iter_mut()
            .find(|j| same_key(j.discriminator(), posting.discriminator()));

        match existing {
            Some(stored) => {
                let id = stored.id.clone();
                *stored = JobPosting {
                    id: id.clone(),
                    ingested_at: chrono::Utc::now(),
                    ..posting
                };
                Ok(UpsertOutcome::Updated { id })
            }
            None => {
                let id = posting.id.clone();
                inner.jobs.push(posting);
                Ok(UpsertOutcome::Inserted { id })
            }
        }
    }

    async fn find_job(&self, title: &str) -> Result<JobPosting, StoreError> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;

        // Later inserts win ties on ingested_at, matching the Postgres
        // ORDER BY ingested_at DESC behavior deterministically.
        let mut best: Option<&JobPosting> = None;
        for job in inner.jobs.iter().filter(|j| j.title == title) {
            match best {
                Some(current) if job.ingested_at < current.ingested_at => {}
                _ => best = Some(job),
            }
        }

        best.cloned()
            .ok_or_else(|| StoreError::NotFound(format!("job with title '{}'", title)))
    }

    async fn insert_candidate(&self, candidate: CandidateProfile) -> Result<String, StoreError> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        let id = candidate.id.clone();
        inner.candidates.push(candidate);
        Ok(id)
    }

    async fn search_candidates(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;

        if query.trim().is_empty() {
            return Ok(inner.candidates.iter().take(limit).cloned().collect());
        }

        let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();

        let mut scored: Vec<(usize, &CandidateProfile)> = inner
            .candidates
            .iter()
            .map(|c| (relevance(c, &query_tokens), c))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable: equal relevance keeps insertion order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, c)| c.clone()).collect())
    }

    async fn insert_matches(&self, rows: &[MatchRecord]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut inner = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        inner.matches.extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn matches_for_job(
        &self,
        job_id: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;

        let mut rows: Vec<MatchRecord> = inner
            .matches
            .iter()
            .filter(|m| m.job_ref == job_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows.truncate(limit);

        Ok(rows)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn posting(title: &str, url: Option<&str>, company: Option<&str>) -> JobPosting {
        JobPosting {
            id: uuid::Uuid::new_v4().to_string(),
            source: "jobspy".to_string(),
            url: url.map(String::from),
            title: title.to_string(),
            company: company.map(String::from),
            location: Location::default(),
            contract_type: None,
            seniority: None,
            skills_required: vec!["python".to_string()],
            skills_nice: vec![],
            description_text: String::new(),
            ingested_at: chrono::Utc::now(),
        }
    }

    fn candidate(name: &str, skills: &[&str]) -> CandidateProfile {
        CandidateProfile {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: name.to_string(),
            email: None,
            location: Location::default(),
            skills_declared: skills.iter().map(|s| s.to_string()).collect(),
            summary: String::new(),
            experiences: vec![],
            education: vec![],
            languages: vec![],
            profile_source: "form".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_idempotent_by_url_key() {
        let store = MemoryStore::new();

        let first = store
            .upsert_job(posting("Data Engineer", Some("https://x.io/1"), Some("Acme")))
            .await
            .unwrap();
        let second = store
            .upsert_job(posting("Data Engineer", Some("https://x.io/1"), Some("Acme")))
            .await
            .unwrap();

        assert!(matches!(first, UpsertOutcome::Inserted { .. }));
        assert!(matches!(second, UpsertOutcome::Updated { .. }));
        assert_eq!(first.id(), second.id());
        assert_eq!(store.job_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_title_company_key_without_url() {
        let store = MemoryStore::new();

        store
            .upsert_job(posting("Data Engineer", None, Some("Acme")))
            .await
            .unwrap();
        store
            .upsert_job(posting("Data Engineer", None, Some("Acme")))
            .await
            .unwrap();
        store
            .upsert_job(posting("Data Engineer", None, Some("Globex")))
            .await
            .unwrap();

        assert_eq!(store.job_count(), 2);
    }

    #[tokio::test]
    async fn test_find_job_prefers_most_recent() {
        let store = MemoryStore::new();

        store
            .upsert_job(posting("Data Engineer", Some("https://x.io/old"), None))
            .await
            .unwrap();
        let newer = store
            .upsert_job(posting("Data Engineer", Some("https://x.io/new"), None))
            .await
            .unwrap();

        let found = store.find_job("Data Engineer").await.unwrap();
        assert_eq!(found.id, newer.id());
    }

    #[tokio::test]
    async fn test_find_job_not_found() {
        let store = MemoryStore::new();
        let err = store.find_job("Nonexistent").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_ranked_by_token_overlap() {
        let store = MemoryStore::new();
        store
            .insert_candidate(candidate("A", &["java"]))
            .await
            .unwrap();
        store
            .insert_candidate(candidate("B", &["python", "sql"]))
            .await
            .unwrap();
        store
            .insert_candidate(candidate("C", &["python"]))
            .await
            .unwrap();

        let results = store.search_candidates("python sql", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].full_name, "B");
        assert_eq!(results[1].full_name, "C");
    }

    #[tokio::test]
    async fn test_empty_query_returns_sample() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_candidate(candidate(&format!("C{}", i), &[]))
                .await
                .unwrap();
        }

        let results = store.search_candidates("  ", 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_insert_matches_empty_is_ok() {
        let store = MemoryStore::new();
        assert_eq!(store.insert_matches(&[]).await.unwrap(), 0);
    }
}
