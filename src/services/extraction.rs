use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{normalize_skills, Education, Experience};
use crate::services::openrouter::{extract_json_fragment, OpenRouterClient};

/// Fixed vocabulary for the deterministic keyword fallback
const SKILL_VOCABULARY: [&str; 12] = [
    "python",
    "sql",
    "spark",
    "airflow",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "pyspark",
    "etl",
    "pandas",
];

/// Best-effort extraction of text from an uploaded PDF.
///
/// Extraction failure yields empty text; the rest of the pipeline must
/// tolerate a candidate with no declared skills.
pub fn extract_text(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("PDF text extraction failed, continuing with empty text: {}", e);
            String::new()
        }
    }
}

/// Detect skills from the fixed vocabulary by whole-token presence
pub fn keyword_skills(text: &str) -> Vec<String> {
    let tokens: HashSet<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    SKILL_VOCABULARY
        .iter()
        .filter(|kw| tokens.contains(**kw))
        .map(|kw| kw.to_string())
        .collect()
}

/// Structured profile returned by the extraction model.
///
/// Every field is defaulted: the model is best-effort and may return
/// partial or empty structures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProfile {
    #[serde(alias = "skills_detected", default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub summary: String,
}

impl ExtractedProfile {
    /// Supplement model skills with the keyword fallback and normalize
    pub fn with_keyword_fallback(mut self, text: &str) -> Self {
        let mut skills = self.skills;
        skills.extend(keyword_skills(text));
        self.skills = normalize_skills(skills);
        self
    }
}

const EXTRACT_SYSTEM_PROMPT: &str =
    "You are an ATS resume parser. Extract structured data from CV text.";

/// Client for the free-text-to-structured-profile extraction model
pub struct ProfileExtractor {
    gateway: OpenRouterClient,
    model: String,
}

impl ProfileExtractor {
    pub fn new(gateway: OpenRouterClient, model: String) -> Self {
        Self { gateway, model }
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Extract the CV into this EXACT JSON schema:\n\
             {{\n  \"skills\": [],\n  \"languages\": [],\n  \
             \"experiences\": [{{\"title\": \"\", \"company\": \"\", \"years\": 0}}],\n  \
             \"education\": [{{\"degree\": \"\", \"school\": \"\", \"year\": 0}}],\n  \
             \"summary\": \"\"\n}}\n\n\
             Return ONLY JSON.\nCV TEXT:\n{}",
            text
        )
    }

    /// Extract a structured profile from CV text.
    ///
    /// Never fails past this boundary: model errors or unparseable output
    /// degrade to an empty profile (the keyword fallback still applies).
    pub async fn extract_profile(&self, text: &str) -> ExtractedProfile {
        if text.trim().is_empty() {
            return ExtractedProfile::default();
        }

        let raw = match self
            .gateway
            .chat(&self.model, EXTRACT_SYSTEM_PROMPT, &Self::build_prompt(text), 1024)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Profile extraction call failed: {}", e);
                return ExtractedProfile::default();
            }
        };

        parse_extraction_output(&raw).unwrap_or_else(|| {
            tracing::warn!("Profile extraction output unparseable, using defaults");
            ExtractedProfile::default()
        })
    }
}

/// Strict decode, then bracketed-fragment retry, then no signal
pub fn parse_extraction_output(raw: &str) -> Option<ExtractedProfile> {
    if let Ok(profile) = serde_json::from_str::<ExtractedProfile>(raw) {
        return Some(profile);
    }

    let fragment = extract_json_fragment(raw)?;
    serde_json::from_str::<ExtractedProfile>(fragment).ok()
}
