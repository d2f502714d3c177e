use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from the external model gateway
#[derive(Debug, Error)]
pub enum OpenRouterError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Thin client for an OpenRouter-compatible chat-completions endpoint.
///
/// Both the re-ranking model and the profile-extraction model go through
/// here; callers own prompt construction and output parsing.
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenRouterClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Single chat-completions call, returning the raw message content
    pub async fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, OpenRouterError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OpenRouterError::Api(format!(
                "chat completion failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        // Unified parsing: OpenAI-style "choices", Ollama-style "response"
        if let Some(content) = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            return Ok(content.to_string());
        }

        if let Some(content) = json.get("response").and_then(|r| r.as_str()) {
            return Ok(content.to_string());
        }

        Err(OpenRouterError::InvalidResponse(
            "no message content in response".to_string(),
        ))
    }
}

/// Extract the first plausible JSON fragment from model prose.
///
/// Stage two of the decode policy: when strict decoding of the whole
/// response fails, take the substring from the first `[` to the last `]`
/// (or `{` to `}` when no array is present) and let the caller retry on
/// that. Bounded: one attempt per bracket kind, never a loop.
pub fn extract_json_fragment(raw: &str) -> Option<&str> {
    if let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) {
        if start < end {
            return Some(&raw[start..=end]);
        }
    }
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            return Some(&raw[start..=end]);
        }
    }
    None
}
