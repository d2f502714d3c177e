use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{
    CandidateProfile, Education, Experience, JobPosting, Location, MatchRecord, UpsertOutcome,
};
use crate::services::store::{ProfileStore, StoreError};

/// Postgres-backed profile store.
///
/// Owns the three collections (candidates, job_postings, matches) and
/// their uniqueness rules. The discriminator-keyed job upsert is a
/// single INSERT .. ON CONFLICT statement, so concurrent upserts to the
/// same key cannot interleave partial field writes.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store from optional settings values
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    fn candidate_from_row(row: &PgRow) -> Result<CandidateProfile, StoreError> {
        let experiences: serde_json::Value = row.get("experiences");
        let education: serde_json::Value = row.get("education");

        let experiences: Vec<Experience> = serde_json::from_value(experiences)
            .map_err(|e| StoreError::Decode(format!("experiences: {}", e)))?;
        let education: Vec<Education> = serde_json::from_value(education)
            .map_err(|e| StoreError::Decode(format!("education: {}", e)))?;

        Ok(CandidateProfile {
            id: row.get("id"),
            full_name: row.get("full_name"),
            email: row.get("email"),
            location: Location {
                city: row.get("city"),
                country: row.get("country"),
                remote: row.get("remote"),
            },
            skills_declared: row.get("skills_declared"),
            summary: row.get("summary"),
            experiences,
            education,
            languages: row.get("languages"),
            profile_source: row.get("profile_source"),
            created_at: row.get("created_at"),
        })
    }

    fn job_from_row(row: &PgRow) -> JobPosting {
        JobPosting {
            id: row.get("id"),
            source: row.get("source"),
            url: row.get("url"),
            title: row.get("title"),
            company: row.get("company"),
            location: Location {
                city: row.get("city"),
                country: row.get("country"),
                remote: row.get("remote"),
            },
            contract_type: row.get("contract_type"),
            seniority: row.get("seniority"),
            skills_required: row.get("skills_required"),
            skills_nice: row.get("skills_nice"),
            description_text: row.get("description_text"),
            ingested_at: row.get("ingested_at"),
        }
    }

    fn match_from_row(row: &PgRow) -> MatchRecord {
        MatchRecord {
            id: row.get("id"),
            job_ref: row.get("job_ref"),
            candidate_ref: row.get("candidate_ref"),
            score: row.get("score"),
            heuristic_score: row.get("heuristic_score"),
            matched_skills: row.get("matched_skills"),
            missing_skills: row.get("missing_skills"),
            rationale: row.get("rationale"),
            matched_at: row.get("matched_at"),
        }
    }
}

const JOB_COLUMNS: &str = "id, source, url, title, company, city, country, remote, \
     contract_type, seniority, skills_required, skills_nice, description_text, ingested_at";

#[async_trait]
impl ProfileStore for PgStore {
    async fn upsert_job(&self, posting: JobPosting) -> Result<UpsertOutcome, StoreError> {
        // Two statements, one per discriminator shape; each targets the
        // matching partial unique index so the write is atomic per key.
        let has_url = posting
            .url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false);

        let query = if has_url {
            r#"
            INSERT INTO job_postings
                (id, source, url, title, company, city, country, remote,
                 contract_type, seniority, skills_required, skills_nice,
                 description_text, ingested_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
            ON CONFLICT (source, url) WHERE url IS NOT NULL
            DO UPDATE SET
                title = EXCLUDED.title,
                company = EXCLUDED.company,
                city = EXCLUDED.city,
                country = EXCLUDED.country,
                remote = EXCLUDED.remote,
                contract_type = EXCLUDED.contract_type,
                seniority = EXCLUDED.seniority,
                skills_required = EXCLUDED.skills_required,
                skills_nice = EXCLUDED.skills_nice,
                description_text = EXCLUDED.description_text,
                ingested_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#
        } else {
            r#"
            INSERT INTO job_postings
                (id, source, url, title, company, city, country, remote,
                 contract_type, seniority, skills_required, skills_nice,
                 description_text, ingested_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
            ON CONFLICT (source, title, COALESCE(company, '')) WHERE url IS NULL
            DO UPDATE SET
                url = EXCLUDED.url,
                city = EXCLUDED.city,
                country = EXCLUDED.country,
                remote = EXCLUDED.remote,
                contract_type = EXCLUDED.contract_type,
                seniority = EXCLUDED.seniority,
                skills_required = EXCLUDED.skills_required,
                skills_nice = EXCLUDED.skills_nice,
                description_text = EXCLUDED.description_text,
                ingested_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#
        };

        let url = if has_url { posting.url.clone() } else { None };

        let row = sqlx::query(query)
            .bind(&posting.id)
            .bind(&posting.source)
            .bind(url)
            .bind(&posting.title)
            .bind(&posting.company)
            .bind(&posting.location.city)
            .bind(&posting.location.country)
            .bind(&posting.location.remote)
            .bind(&posting.contract_type)
            .bind(&posting.seniority)
            .bind(&posting.skills_required)
            .bind(&posting.skills_nice)
            .bind(&posting.description_text)
            .fetch_one(&self.pool)
            .await?;

        let id: String = row.get("id");
        let inserted: bool = row.get("inserted");

        tracing::debug!(
            "Upserted job '{}' ({})",
            posting.title,
            if inserted { "inserted" } else { "updated" }
        );

        if inserted {
            Ok(UpsertOutcome::Inserted { id })
        } else {
            Ok(UpsertOutcome::Updated { id })
        }
    }

    async fn find_job(&self, title: &str) -> Result<JobPosting, StoreError> {
        let query = format!(
            "SELECT {} FROM job_postings WHERE title = $1 \
             ORDER BY ingested_at DESC LIMIT 1",
            JOB_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::job_from_row(&r))
            .ok_or_else(|| StoreError::NotFound(format!("job with title '{}'", title)))
    }

    async fn insert_candidate(&self, candidate: CandidateProfile) -> Result<String, StoreError> {
        let experiences = serde_json::to_value(&candidate.experiences)
            .map_err(|e| StoreError::Decode(format!("experiences: {}", e)))?;
        let education = serde_json::to_value(&candidate.education)
            .map_err(|e| StoreError::Decode(format!("education: {}", e)))?;

        let query = r#"
            INSERT INTO candidates
                (id, full_name, email, city, country, remote, skills_declared,
                 summary, experiences, education, languages, profile_source, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(&candidate.id)
            .bind(&candidate.full_name)
            .bind(&candidate.email)
            .bind(&candidate.location.city)
            .bind(&candidate.location.country)
            .bind(&candidate.location.remote)
            .bind(&candidate.skills_declared)
            .bind(&candidate.summary)
            .bind(experiences)
            .bind(education)
            .bind(&candidate.languages)
            .bind(&candidate.profile_source)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("id"))
    }

    async fn search_candidates(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let rows = if query.trim().is_empty() {
            sqlx::query(
                r#"
                SELECT id, full_name, email, city, country, remote, skills_declared,
                       summary, experiences, education, languages, profile_source, created_at
                FROM candidates
                ORDER BY created_at
                LIMIT $1
                "#,
            )
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                SELECT id, full_name, email, city, country, remote, skills_declared,
                       summary, experiences, education, languages, profile_source, created_at
                FROM candidates
                WHERE to_tsvector('simple',
                        full_name || ' ' || summary || ' ' || array_to_string(skills_declared, ' '))
                      @@ plainto_tsquery('simple', $1)
                ORDER BY ts_rank(
                        to_tsvector('simple',
                            full_name || ' ' || summary || ' ' || array_to_string(skills_declared, ' ')),
                        plainto_tsquery('simple', $1)) DESC,
                    created_at
                LIMIT $2
                "#,
            )
            .bind(query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(Self::candidate_from_row).collect()
    }

    async fn insert_matches(&self, rows: &[MatchRecord]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let query = r#"
            INSERT INTO matches
                (id, job_ref, candidate_ref, score, heuristic_score,
                 matched_skills, missing_skills, rationale, matched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;

        let mut written: u64 = 0;
        for record in rows {
            let result = sqlx::query(query)
                .bind(&record.id)
                .bind(&record.job_ref)
                .bind(&record.candidate_ref)
                .bind(record.score)
                .bind(record.heuristic_score)
                .bind(&record.matched_skills)
                .bind(&record.missing_skills)
                .bind(&record.rationale)
                .bind(record.matched_at)
                .execute(&self.pool)
                .await;

            match result {
                Ok(_) => written += 1,
                Err(e) => {
                    return Err(StoreError::PartialWrite {
                        written,
                        failed: (rows.len() as u64) - written,
                        source: Box::new(StoreError::Sqlx(e)),
                    });
                }
            }
        }

        tracing::debug!("Inserted {} match rows", written);
        Ok(written)
    }

    async fn matches_for_job(
        &self,
        job_id: &str,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, job_ref, candidate_ref, score, heuristic_score,
                   matched_skills, missing_skills, rationale, matched_at
            FROM matches
            WHERE job_ref = $1
            ORDER BY score DESC, matched_at DESC
            LIMIT $2
            "#,
        )
        .bind(job_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::match_from_row).collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
