//! Mood analysis: provider abstraction and the normalising analyzer.

pub mod analyzer;
pub mod error;
pub mod provider;

pub use analyzer::{fallback_analysis, AnalysisOutcome, MoodAnalyzer, DEFAULT_ANALYSIS_TIMEOUT};
pub use error::{ProviderError, ProviderResult};
pub use provider::{parse_structured_reply, MoodModel, RawMoodAnalysis, MOOD_PROMPT};
