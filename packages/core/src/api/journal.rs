//! Journal entry endpoints.
//!
//! Routes (nested under `/api`):
//! - `GET    /journal`                - all entries for the current user
//! - `POST   /journal`                - create and analyze an entry
//! - `GET    /journal/stats`          - aggregate stats for the current user
//! - `GET    /journal/recent/:limit`  - most recent entries
//! - `GET    /journal/:id`            - one entry
//! - `PUT    /journal/:id`            - partial update
//! - `DELETE /journal/:id`            - permanent delete
//! - `POST   /journal/:id/analyze`    - re-run mood analysis
//!
//! Input is validated here; malformed requests never reach the service.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer};

use super::ApiState;
use crate::error::AppError;
use crate::model::{JournalEntry, JournalEntryUpdate, Mood, NewJournalEntry};
use crate::service::{AnalyzedEntry, CreatedEntry, JournalStats};

/// Authentication is out of scope; every request acts as this user.
pub const CURRENT_USER_ID: i64 = 1;

/// Used when `/journal/recent/:limit` gets a non-numeric or zero limit.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

// ---- Request shapes ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub mood: Mood,
    pub content: String,
    pub user_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub mood: Option<Mood>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub sentiment: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub energy: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub word_count: Option<Option<i64>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---- Helpers ----

fn entry_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("Invalid journal entry ID".to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn score(field: &str, value: Option<Option<i64>>) -> Result<Option<Option<u8>>, AppError> {
    match value {
        Some(Some(v)) if (0..=100).contains(&v) => Ok(Some(Some(v as u8))),
        Some(Some(v)) => Err(AppError::Validation(format!(
            "{} must be between 0 and 100, got {}",
            field, v
        ))),
        Some(None) => Ok(Some(None)),
        None => Ok(None),
    }
}

impl UpdateEntryRequest {
    pub fn validate(self) -> Result<JournalEntryUpdate, AppError> {
        let word_count = match self.word_count {
            Some(Some(v)) => Some(Some(u32::try_from(v).map_err(|_| {
                AppError::Validation(format!("wordCount must be a non-negative integer, got {}", v))
            })?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(JournalEntryUpdate {
            mood: self.mood,
            content: self.content,
            sentiment: score("sentiment", self.sentiment)?,
            energy: score("energy", self.energy)?,
            word_count,
        })
    }
}

/// Non-numeric or zero → default; negative → nothing.
pub fn parse_recent_limit(raw: &str) -> usize {
    match raw.trim().parse::<i64>() {
        Ok(0) | Err(_) => DEFAULT_RECENT_LIMIT,
        Ok(n) if n < 0 => 0,
        Ok(n) => usize::try_from(n).unwrap_or(usize::MAX),
    }
}

// ---- Handlers ----

/// `GET /journal`
pub async fn list_entries(
    State(state): State<ApiState>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    Ok(Json(state.service.list(CURRENT_USER_ID).await?))
}

/// `GET /journal/:id`
pub async fn get_entry(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<JournalEntry>, AppError> {
    let id = entry_id(id)?;
    Ok(Json(state.service.get(id).await?))
}

/// `POST /journal` - 201 with the entry, plus `analysis` when enrichment ran.
pub async fn create_entry(
    State(state): State<ApiState>,
    body: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedEntry>), AppError> {
    let body = json_body(body)?;
    let created = state
        .service
        .create(NewJournalEntry {
            mood: body.mood,
            content: body.content,
            user_id: body.user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /journal/:id`
pub async fn update_entry(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Result<Json<JournalEntry>, AppError> {
    let id = entry_id(id)?;
    let update = json_body(body)?.validate()?;
    Ok(Json(state.service.update(id, update).await?))
}

/// `DELETE /journal/:id` - 204 on success.
pub async fn delete_entry(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = entry_id(id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /journal/recent/:limit`
pub async fn recent_entries(
    State(state): State<ApiState>,
    Path(limit): Path<String>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    let limit = parse_recent_limit(&limit);
    Ok(Json(state.service.recent(CURRENT_USER_ID, limit).await?))
}

/// `POST /journal/:id/analyze`
pub async fn analyze_entry(
    State(state): State<ApiState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AnalyzedEntry>, AppError> {
    let id = entry_id(id)?;
    Ok(Json(state.service.reanalyze(id).await?))
}

/// `GET /journal/stats`
pub async fn journal_stats(State(state): State<ApiState>) -> Result<Json<JournalStats>, AppError> {
    Ok(Json(state.service.stats(CURRENT_USER_ID).await?))
}
