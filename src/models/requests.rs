use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{
    normalize_skills, CandidateProfile, Education, Experience, JobPosting, Location,
};

/// Trim a string field, mapping blank values to None
fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Incoming job posting payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobPostingIn {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(alias = "contractType", default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(alias = "skillsRequired", default)]
    pub skills_required: Vec<String>,
    #[serde(alias = "skillsNice", default)]
    pub skills_nice: Vec<String>,
    #[serde(alias = "descriptionText", default)]
    pub description_text: String,
}

fn default_source() -> String {
    "jobspy".to_string()
}

impl JobPostingIn {
    /// Convert to a domain posting, applying boundary normalization.
    /// The id is provisional; the store keeps the existing id on update.
    pub fn into_posting(self) -> JobPosting {
        JobPosting {
            id: uuid::Uuid::new_v4().to_string(),
            source: self.source.trim().to_string(),
            url: clean(self.url),
            title: self.title.trim().to_string(),
            company: clean(self.company),
            location: self.location,
            contract_type: clean(self.contract_type),
            seniority: clean(self.seniority),
            skills_required: normalize_skills(self.skills_required),
            skills_nice: normalize_skills(self.skills_nice),
            description_text: self.description_text.trim().to_string(),
            ingested_at: chrono::Utc::now(),
        }
    }
}

/// Single posting or a batch, accepted on the same endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobIngestPayload {
    Batch(Vec<JobPostingIn>),
    Single(JobPostingIn),
}

impl JobIngestPayload {
    pub fn into_postings(self) -> Vec<JobPostingIn> {
        match self {
            JobIngestPayload::Single(posting) => vec![posting],
            JobIngestPayload::Batch(postings) => postings,
        }
    }
}

/// Incoming manual candidate payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CandidateIn {
    #[validate(length(min = 1))]
    #[serde(alias = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(alias = "skillsDeclared", default)]
    pub skills_declared: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(alias = "profileSource", default = "default_candidate_source")]
    pub profile_source: String,
}

fn default_candidate_source() -> String {
    "form".to_string()
}

impl CandidateIn {
    /// Convert to a domain profile, applying boundary normalization
    pub fn into_profile(self) -> CandidateProfile {
        CandidateProfile {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: self.full_name.trim().to_string(),
            email: clean(self.email),
            location: self.location,
            skills_declared: normalize_skills(self.skills_declared),
            summary: self.summary.trim().to_string(),
            experiences: self.experiences,
            education: self.education,
            languages: self.languages,
            profile_source: self.profile_source,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Query parameters for POST /match/run; absent bounds fall back to the
/// configured matching defaults
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunMatchQuery {
    #[validate(length(min = 1))]
    pub job_title: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Query parameters for GET /match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GetMatchesQuery {
    #[validate(length(min = 1))]
    pub job_title: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    10
}

/// Query parameters for POST /candidates/upload_cv (the PDF travels as the body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCvQuery {
    #[serde(default = "default_unknown")]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

fn default_unknown() -> String {
    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_payload_single_or_batch() {
        let single: JobIngestPayload =
            serde_json::from_str(r#"{"title": "Data Engineer"}"#).unwrap();
        assert_eq!(single.into_postings().len(), 1);

        let batch: JobIngestPayload =
            serde_json::from_str(r#"[{"title": "A"}, {"title": "B"}]"#).unwrap();
        assert_eq!(batch.into_postings().len(), 2);
    }

    #[test]
    fn test_posting_normalization() {
        let payload: JobPostingIn = serde_json::from_str(
            r#"{"title": "  Data Engineer ", "company": "  ", "url": "",
                "skills_required": ["Python", " SQL ", "python"]}"#,
        )
        .unwrap();

        let posting = payload.into_posting();
        assert_eq!(posting.title, "Data Engineer");
        assert_eq!(posting.company, None);
        assert_eq!(posting.url, None);
        assert_eq!(posting.skills_required, vec!["python", "sql"]);
        assert_eq!(posting.source, "jobspy");
    }

    #[test]
    fn test_candidate_normalization() {
        let payload: CandidateIn = serde_json::from_str(
            r#"{"full_name": "J. Doe", "skills_declared": [" Python", "Airflow "]}"#,
        )
        .unwrap();

        let profile = payload.into_profile();
        assert_eq!(profile.skills_declared, vec!["airflow", "python"]);
        assert_eq!(profile.profile_source, "form");
        assert!(!profile.id.is_empty());
    }

    #[test]
    fn test_run_match_bounds_optional() {
        let query: RunMatchQuery =
            serde_json::from_str(r#"{"job_title": "Data Engineer"}"#).unwrap();
        assert_eq!(query.top_k, None);
        assert_eq!(query.top_n, None);

        let query: RunMatchQuery =
            serde_json::from_str(r#"{"job_title": "Data Engineer", "top_k": 50}"#).unwrap();
        assert_eq!(query.top_k, Some(50));
    }
}
