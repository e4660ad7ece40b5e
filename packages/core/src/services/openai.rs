use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    parse_structured_reply, MoodModel, ProviderError, ProviderResult, RawMoodAnalysis, MOOD_PROMPT,
};

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

/// Client for the OpenAI chat completions endpoint, JSON response mode.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    http: Client,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiClient {
    async fn complete(&self, text: &str) -> ProviderResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ProviderError::MissingApiKey {
            provider: self.provider_name().to_string(),
        })?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: format!("You are a mood analysis expert. {}", MOOD_PROMPT),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
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

        let chat = response
            .json::<ChatResponse>()
            .await
            .map_err(|err| {
                ProviderError::format(format!("Failed to parse OpenAI response: {}", err))
            })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::format("OpenAI returned no message content"))
    }
}

#[async_trait]
impl MoodModel for OpenAiClient {
    async fn analyze_text(&self, text: &str) -> ProviderResult<RawMoodAnalysis> {
        let reply = self.complete(text).await?;
        parse_structured_reply(&reply)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
