use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    parse_structured_reply, MoodModel, ProviderError, ProviderResult, RawMoodAnalysis, MOOD_PROMPT,
};

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiClient {
    /// Send one prompt and return the concatenated text of the first candidate.
    pub async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ProviderError::MissingApiKey {
            provider: self.provider_name().to_string(),
        })?;

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let generated = response
            .json::<GenerateResponse>()
            .await
            .map_err(|err| {
                ProviderError::format(format!("Failed to parse Gemini response: {}", err))
            })?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::format("Gemini returned no candidate text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl MoodModel for GeminiClient {
    async fn analyze_text(&self, text: &str) -> ProviderResult<RawMoodAnalysis> {
        let prompt = format!("{}\n\nJournal entry:\n{}", MOOD_PROMPT, text);
        let reply = self.generate(&prompt).await?;
        parse_structured_reply(&reply)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
