//! Core domain types for journal entries, users and mood analysis.
//!
//! Wire representation is camelCase JSON so the presentation layer can read
//! `userId` / `wordCount` directly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported mood attached to every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Neutral,
    Tired,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Calm, Mood::Neutral, Mood::Tired, Mood::Sad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Neutral => "neutral",
            Mood::Tired => "tired",
            Mood::Sad => "sad",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// A single dated journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub mood: Mood,
    pub content: String,
    pub user_id: i64,
    pub sentiment: Option<u8>,
    pub energy: Option<u8>,
    pub word_count: Option<u32>,
}

impl JournalEntry {
    /// Apply a partial update in place. `id`, `user_id` and `date` are never touched.
    pub fn apply(&mut self, update: &JournalEntryUpdate) {
        if let Some(mood) = update.mood {
            self.mood = mood;
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(sentiment) = update.sentiment {
            self.sentiment = sentiment;
        }
        if let Some(energy) = update.energy {
            self.energy = energy;
        }
        if let Some(word_count) = update.word_count {
            self.word_count = word_count;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalEntry {
    pub mood: Mood,
    pub content: String,
    pub user_id: i64,
}

/// Partial update of an entry.
///
/// The outer `Option` means "field supplied"; for the nullable analysis
/// fields the inner `Option` carries an explicit clear (`null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalEntryUpdate {
    pub mood: Option<Mood>,
    pub content: Option<String>,
    pub sentiment: Option<Option<u8>>,
    pub energy: Option<Option<u8>>,
    pub word_count: Option<Option<u32>>,
}

impl JournalEntryUpdate {
    /// Update carrying a fresh analysis for `content`, with a server-derived word count.
    pub fn enrichment(mood: Mood, content: &str, analysis: &MoodAnalysis) -> Self {
        Self {
            mood: Some(mood),
            content: Some(content.to_string()),
            sentiment: Some(Some(analysis.sentiment)),
            energy: Some(Some(analysis.energy)),
            word_count: Some(Some(word_count(content))),
        }
    }
}

/// Normalised result of a mood analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub sentiment: u8,
    pub energy: u8,
    pub summary: String,
    pub keywords: Vec<String>,
}

impl MoodAnalysis {
    /// The ephemeral part handed back to the caller alongside the entry.
    pub fn note(&self) -> AnalysisNote {
        AnalysisNote {
            summary: self.summary.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisNote {
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Number of non-empty whitespace-delimited tokens.
pub fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}
