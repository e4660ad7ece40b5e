//! Mood Model Provider Interface
//!
//! Abstraction over the external text-understanding service. A provider
//! makes exactly one request per call and returns the reply still
//! unnormalised; clamping and truncation happen in the analyzer.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::error::{ProviderError, ProviderResult};

/// Instruction sent with every analysis request.
pub const MOOD_PROMPT: &str = "\
Analyze the sentiment and emotional energy in this journal entry.
Provide the following information:
1. A sentiment score from 0-100 (where 0 is very negative, 50 is neutral, 100 is very positive)
2. An energy level score from 0-100 (where 0 is very low energy, 50 is moderate, 100 is very high energy)
3. A brief 1-2 sentence summary of the emotional state
4. Up to 5 keywords that represent the main themes or emotions

Format your response as JSON with exactly these fields:
{
  \"sentiment\": number,
  \"energy\": number,
  \"summary\": \"string\",
  \"keywords\": [\"string\", \"string\", ...]
}";

/// Provider reply as parsed, before normalisation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMoodAnalysis {
    pub sentiment: f64,
    pub energy: f64,
    #[serde(default)]
    pub summary: Option<String>,
    /// Kept loose: a non-array value is treated as "no keywords".
    #[serde(default)]
    pub keywords: Value,
}

/// Trait for mood analysis providers to keep the analyzer provider-agnostic
#[async_trait]
pub trait MoodModel {
    /// Analyse plain text (markup already stripped).
    async fn analyze_text(&self, text: &str) -> ProviderResult<RawMoodAnalysis>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

/// Parse the JSON object embedded in a model reply.
///
/// Models sometimes wrap the object in prose or code fences, so the
/// outermost `{ ... }` span is extracted first.
pub fn parse_structured_reply(reply: &str) -> ProviderResult<RawMoodAnalysis> {
    let start = reply
        .find('{')
        .ok_or_else(|| ProviderError::format("Could not extract JSON from response"))?;
    let end = reply
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| ProviderError::format("Could not extract JSON from response"))?;

    serde_json::from_str(&reply[start..=end])
        .map_err(|e| ProviderError::format(format!("Unexpected analysis shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object() {
        let raw = parse_structured_reply(
            r#"{"sentiment": 72.4, "energy": 40, "summary": "Content.", "keywords": ["calm"]}"#,
        )
        .unwrap();
        assert_eq!(raw.sentiment, 72.4);
        assert_eq!(raw.summary.as_deref(), Some("Content."));
    }

    #[test]
    fn parses_object_wrapped_in_code_fence() {
        let reply = "Here you go:\n```json\n{\"sentiment\": 10, \"energy\": 20}\n```";
        let raw = parse_structured_reply(reply).unwrap();
        assert_eq!(raw.energy, 20.0);
        assert_eq!(raw.summary, None);
        assert!(raw.keywords.is_null());
    }

    #[test]
    fn reply_without_object_is_format_error() {
        let err = parse_structured_reply("I cannot help with that").unwrap_err();
        assert_eq!(err.kind(), "format");
    }

    #[test]
    fn object_missing_scores_is_format_error() {
        let err = parse_structured_reply(r#"{"summary": "no scores"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::FormatError { .. }));
    }
}
