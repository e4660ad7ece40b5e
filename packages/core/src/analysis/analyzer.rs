//! Mood analyzer.
//!
//! Wraps a [`MoodModel`] and turns whatever it returns into a
//! [`MoodAnalysis`] that always satisfies the score and keyword bounds.
//! Every provider failure (network, HTTP status, unparseable reply,
//! timeout) becomes the fixed fallback analysis; callers never see an error.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time;

use super::error::ProviderError;
use super::provider::{MoodModel, RawMoodAnalysis};
use crate::model::MoodAnalysis;

/// Default upper bound on a single provider call.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(15);

pub const MAX_KEYWORDS: usize = 5;
pub const FALLBACK_SCORE: u8 = 50;
pub const FALLBACK_SUMMARY: &str = "Could not analyze journal entry. Please try again later.";
pub const FALLBACK_KEYWORD: &str = "unavailable";
const MISSING_SUMMARY: &str = "No summary available";

/// What happened during one analysis attempt.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Analyzed(MoodAnalysis),
    Fallback {
        analysis: MoodAnalysis,
        cause: ProviderError,
    },
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> &MoodAnalysis {
        match self {
            AnalysisOutcome::Analyzed(analysis) => analysis,
            AnalysisOutcome::Fallback { analysis, .. } => analysis,
        }
    }

    pub fn into_analysis(self) -> MoodAnalysis {
        match self {
            AnalysisOutcome::Analyzed(analysis) => analysis,
            AnalysisOutcome::Fallback { analysis, .. } => analysis,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback { .. })
    }
}

pub struct MoodAnalyzer {
    model: Arc<dyn MoodModel + Send + Sync>,
    timeout: Duration,
}

impl MoodAnalyzer {
    pub fn new(model: Arc<dyn MoodModel + Send + Sync>) -> Self {
        Self {
            model,
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.model.provider_name()
    }

    /// Analyse `text`, always producing a schema-valid result.
    pub async fn analyze(&self, text: &str) -> MoodAnalysis {
        self.analyze_outcome(text).await.into_analysis()
    }

    /// Like [`Self::analyze`], but keeps the failure cause observable.
    pub async fn analyze_outcome(&self, text: &str) -> AnalysisOutcome {
        let plain = strip_markup(text);

        let result = match time::timeout(self.timeout, self.model.analyze_text(&plain)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(raw) => {
                tracing::debug!("Mood analysis succeeded via {}", self.provider_name());
                AnalysisOutcome::Analyzed(normalize(raw))
            }
            Err(cause) => {
                tracing::warn!(
                    "Mood analysis via {} failed, using fallback: {}",
                    self.provider_name(),
                    cause
                );
                AnalysisOutcome::Fallback {
                    analysis: fallback_analysis(),
                    cause,
                }
            }
        }
    }
}

/// The deterministic result used whenever the provider cannot be used.
pub fn fallback_analysis() -> MoodAnalysis {
    MoodAnalysis {
        sentiment: FALLBACK_SCORE,
        energy: FALLBACK_SCORE,
        summary: FALLBACK_SUMMARY.to_string(),
        keywords: vec![FALLBACK_KEYWORD.to_string()],
    }
}

/// Clamp and round scores into [0, 100], cap keywords at [`MAX_KEYWORDS`].
pub fn normalize(raw: RawMoodAnalysis) -> MoodAnalysis {
    let keywords = match raw.keywords {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(keyword) => Some(keyword),
                _ => None,
            })
            .take(MAX_KEYWORDS)
            .collect(),
        _ => Vec::new(),
    };

    let summary = raw
        .summary
        .filter(|summary| !summary.trim().is_empty())
        .unwrap_or_else(|| MISSING_SUMMARY.to_string());

    MoodAnalysis {
        sentiment: clamp_score(raw.sentiment),
        energy: clamp_score(raw.energy),
        summary,
        keywords,
    }
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return FALLBACK_SCORE;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Remove markup tags, leaving the text between them.
///
/// An unterminated `<` swallows the rest of the input.
pub fn strip_markup(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // keep words from adjacent blocks apart: "<p>a</p><p>b</p>"
                plain.push(' ');
            }
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}
