use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Normalize a skill list: lower-case, trim, drop empties, dedup, sorted.
///
/// Every skill set in the system passes through this exactly once, at the
/// store boundary (request conversion or extraction output).
pub fn normalize_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Candidate or job location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// "full" | "hybrid" | "no"
    #[serde(default)]
    pub remote: Option<String>,
}

/// A professional experience entry on a candidate profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub years: Option<f64>,
}

/// An education entry on a candidate profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// A stored candidate profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Location,
    /// Invariant: normalized via [`normalize_skills`]
    #[serde(rename = "skillsDeclared", default)]
    pub skills_declared: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(rename = "profileSource", default = "default_profile_source")]
    pub profile_source: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn default_profile_source() -> String {
    "form".to_string()
}

impl CandidateProfile {
    /// City, treating blank strings as absent
    pub fn city(&self) -> Option<&str> {
        self.location.city.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// A stored job posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(rename = "contractType", default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    /// Invariant: normalized via [`normalize_skills`]
    #[serde(rename = "skillsRequired", default)]
    pub skills_required: Vec<String>,
    #[serde(rename = "skillsNice", default)]
    pub skills_nice: Vec<String>,
    #[serde(rename = "descriptionText", default)]
    pub description_text: String,
    #[serde(rename = "ingestedAt")]
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl JobPosting {
    /// City, treating blank strings as absent
    pub fn city(&self) -> Option<&str> {
        self.location.city.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// The upsert discriminator: URL-keyed when a non-empty URL exists,
    /// title+company keyed otherwise.
    pub fn discriminator(&self) -> JobKey<'_> {
        match self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => JobKey::SourceUrl {
                source: &self.source,
                url,
            },
            None => JobKey::SourceTitleCompany {
                source: &self.source,
                title: &self.title,
                company: self.company.as_deref().unwrap_or(""),
            },
        }
    }
}

/// Upsert discriminator key for a job posting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKey<'a> {
    SourceUrl {
        source: &'a str,
        url: &'a str,
    },
    SourceTitleCompany {
        source: &'a str,
        title: &'a str,
        company: &'a str,
    },
}

/// Outcome of a job upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted { id: String },
    Updated { id: String },
}

impl UpsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Inserted { id } | UpsertOutcome::Updated { id } => id,
        }
    }
}

/// A persisted match row: one (job, candidate) pair from a matching run.
///
/// Rows are append-only; a later run supersedes rather than mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    #[serde(rename = "jobRef")]
    pub job_ref: String,
    #[serde(rename = "candidateRef")]
    pub candidate_ref: String,
    /// Final ordering score in [0, 1] (heuristic, possibly adjusted by re-ranking)
    pub score: f64,
    /// The unblended heuristic score, always retained for explainability
    #[serde(rename = "heuristicScore")]
    pub heuristic_score: f64,
    #[serde(rename = "matchedSkills")]
    pub matched_skills: Vec<String>,
    #[serde(rename = "missingSkills")]
    pub missing_skills: Vec<String>,
    pub rationale: String,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}
