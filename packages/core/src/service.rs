//! Journal service.
//!
//! Orchestrates the store and the mood analyzer for each entry lifecycle
//! event. Creation is strictly sequential: persist, analyze, write the
//! analysis back. Enrichment is best-effort; once the entry is persisted,
//! nothing that happens during analysis can fail the creation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::analysis::{AnalysisOutcome, MoodAnalyzer};
use crate::error::AppError;
use crate::metrics::AppMetrics;
use crate::model::{
    word_count, AnalysisNote, JournalEntry, JournalEntryUpdate, Mood, MoodAnalysis,
    NewJournalEntry,
};
use crate::store::JournalStore;

/// A created entry, plus the analysis annotation when enrichment ran.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEntry {
    #[serde(flatten)]
    pub entry: JournalEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisNote>,
}

/// Result of an explicit re-analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedEntry {
    pub entry: JournalEntry,
    pub analysis: AnalysisNote,
}

/// Aggregate view over one user's journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStats {
    pub entry_count: usize,
    pub average_sentiment: Option<u32>,
    pub average_energy: Option<u32>,
    pub total_words: u64,
    pub mood_breakdown: BTreeMap<String, usize>,
}

#[derive(Clone)]
pub struct JournalService {
    store: Arc<dyn JournalStore>,
    analyzer: Arc<MoodAnalyzer>,
    metrics: Option<Arc<AppMetrics>>,
}

impl JournalService {
    pub fn new(store: Arc<dyn JournalStore>, analyzer: Arc<MoodAnalyzer>) -> Self {
        Self {
            store,
            analyzer,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.analyzer.provider_name()
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<JournalEntry>, AppError> {
        self.store.get_journal_entries_by_user_id(user_id).await
    }

    pub async fn recent(&self, user_id: i64, limit: usize) -> Result<Vec<JournalEntry>, AppError> {
        self.store.get_recent_journal_entries(user_id, limit).await
    }

    pub async fn get(&self, id: i64) -> Result<JournalEntry, AppError> {
        self.store
            .get_journal_entry(id)
            .await?
            .ok_or_else(AppError::entry_not_found)
    }

    /// Persist a new entry, then enrich it when it has content.
    pub async fn create(&self, new_entry: NewJournalEntry) -> Result<CreatedEntry, AppError> {
        let entry = self.store.create_journal_entry(new_entry).await?;
        tracing::info!("Created journal entry {} for user {}", entry.id, entry.user_id);
        if let Some(metrics) = &self.metrics {
            metrics.entries_created_total.inc();
            metrics.entries_stored.inc();
        }

        if entry.content.is_empty() {
            return Ok(CreatedEntry {
                entry,
                analysis: None,
            });
        }

        let analysis = self.run_analysis(&entry.content).await;
        let update = JournalEntryUpdate::enrichment(entry.mood, &entry.content, &analysis);

        match self.store.update_journal_entry(entry.id, update).await {
            Ok(Some(enriched)) => Ok(CreatedEntry {
                entry: enriched,
                analysis: Some(analysis.note()),
            }),
            Ok(None) => {
                tracing::warn!("Journal entry {} vanished before enrichment", entry.id);
                Ok(CreatedEntry {
                    entry,
                    analysis: None,
                })
            }
            Err(err) => {
                tracing::error!("Failed to store analysis for entry {}: {}", entry.id, err);
                Ok(CreatedEntry {
                    entry,
                    analysis: None,
                })
            }
        }
    }

    /// Apply a caller-supplied partial update. Does not re-run analysis.
    ///
    /// New content without an explicit `wordCount` gets a server-derived count.
    pub async fn update(
        &self,
        id: i64,
        mut update: JournalEntryUpdate,
    ) -> Result<JournalEntry, AppError> {
        if let (Some(content), None) = (&update.content, update.word_count) {
            update.word_count = Some(Some(word_count(content)));
        }

        let updated = self
            .store
            .update_journal_entry(id, update)
            .await?
            .ok_or_else(AppError::entry_not_found)?;
        tracing::info!("Updated journal entry {}", id);
        Ok(updated)
    }

    /// Run analysis again on the stored content of `id`.
    pub async fn reanalyze(&self, id: i64) -> Result<AnalyzedEntry, AppError> {
        let entry = self.get(id).await?;
        let analysis = self.run_analysis(&entry.content).await;
        let update = JournalEntryUpdate::enrichment(entry.mood, &entry.content, &analysis);

        let entry = self
            .store
            .update_journal_entry(id, update)
            .await?
            .ok_or_else(AppError::entry_not_found)?;

        Ok(AnalyzedEntry {
            entry,
            analysis: analysis.note(),
        })
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_journal_entry(id).await? {
            return Err(AppError::entry_not_found());
        }
        tracing::info!("Deleted journal entry {}", id);
        if let Some(metrics) = &self.metrics {
            metrics.entries_stored.dec();
        }
        Ok(())
    }

    pub async fn stats(&self, user_id: i64) -> Result<JournalStats, AppError> {
        let entries = self.store.get_journal_entries_by_user_id(user_id).await?;
        Ok(compute_stats(&entries))
    }

    async fn run_analysis(&self, content: &str) -> MoodAnalysis {
        let outcome = self.analyzer.analyze_outcome(content).await;
        if let Some(metrics) = &self.metrics {
            metrics.analyses_total.inc();
            if let AnalysisOutcome::Fallback { cause, .. } = &outcome {
                metrics
                    .analysis_fallbacks_total
                    .with_label_values(&[cause.kind()])
                    .inc();
            }
        }
        outcome.into_analysis()
    }
}

fn rounded_mean(values: impl Iterator<Item = u8>) -> Option<u32> {
    let (sum, count) = values.fold((0u32, 0u32), |(sum, count), v| (sum + v as u32, count + 1));
    if count == 0 {
        None
    } else {
        Some(((sum as f64) / (count as f64)).round() as u32)
    }
}

pub fn compute_stats(entries: &[JournalEntry]) -> JournalStats {
    let mut mood_breakdown: BTreeMap<String, usize> =
        Mood::ALL.iter().map(|mood| (mood.to_string(), 0)).collect();
    for entry in entries {
        *mood_breakdown.entry(entry.mood.to_string()).or_default() += 1;
    }

    JournalStats {
        entry_count: entries.len(),
        average_sentiment: rounded_mean(entries.iter().filter_map(|e| e.sentiment)),
        average_energy: rounded_mean(entries.iter().filter_map(|e| e.energy)),
        total_words: entries
            .iter()
            .filter_map(|e| e.word_count)
            .map(u64::from)
            .sum(),
        mood_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    use crate::analysis::{MoodModel, ProviderError, ProviderResult, RawMoodAnalysis};
    use crate::store::MemStore;

    /// Provider double: fixed scores, or a network failure.
    struct FixedModel {
        reply: Option<(f64, f64)>,
        calls: AtomicUsize,
    }

    impl FixedModel {
        fn scores(sentiment: f64, energy: f64) -> Self {
            Self {
                reply: Some((sentiment, energy)),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MoodModel for FixedModel {
        async fn analyze_text(&self, _text: &str) -> ProviderResult<RawMoodAnalysis> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some((sentiment, energy)) => Ok(RawMoodAnalysis {
                    sentiment,
                    energy,
                    summary: Some("A bright, energetic day.".into()),
                    keywords: json!(["joy", "energy"]),
                }),
                None => Err(ProviderError::network("provider down")),
            }
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn service_with(model: Arc<FixedModel>) -> (JournalService, Arc<MemStore>) {
        let store = Arc::new(MemStore::new());
        let analyzer = Arc::new(MoodAnalyzer::new(model));
        (JournalService::new(store.clone(), analyzer), store)
    }

    fn happy(content: &str) -> NewJournalEntry {
        NewJournalEntry {
            mood: Mood::Happy,
            content: content.to_string(),
            user_id: 1,
        }
    }

    // ---- create ----

    #[tokio::test]
    async fn create_enriches_entry_with_analysis() {
        let (service, _) = service_with(Arc::new(FixedModel::scores(88.0, 73.0)));

        let created = service.create(happy("Great day today")).await.unwrap();

        assert_eq!(created.entry.sentiment, Some(88));
        assert_eq!(created.entry.energy, Some(73));
        assert_eq!(created.entry.word_count, Some(3));
        let note = created.analysis.unwrap();
        assert_eq!(note.keywords, ["joy", "energy"]);
    }

    #[tokio::test]
    async fn create_with_failing_provider_stores_fallback_scores() {
        let (service, store) = service_with(Arc::new(FixedModel::failing()));

        let created = service.create(happy("Great day today")).await.unwrap();

        assert_eq!(created.entry.sentiment, Some(50));
        assert_eq!(created.entry.energy, Some(50));
        assert_eq!(created.entry.word_count, Some(3));
        assert_eq!(created.analysis.unwrap().keywords, ["unavailable"]);

        let stored = store.get_journal_entry(created.entry.id).await.unwrap().unwrap();
        assert_eq!(stored.sentiment, Some(50));
    }

    #[tokio::test]
    async fn create_with_empty_content_skips_analysis() {
        let model = Arc::new(FixedModel::scores(90.0, 90.0));
        let (service, _) = service_with(model.clone());

        let created = service.create(happy("")).await.unwrap();

        assert!(created.analysis.is_none());
        assert_eq!(created.entry.sentiment, None);
        assert_eq!(created.entry.word_count, Some(0));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn created_entry_serialises_with_flattened_analysis() {
        let (service, _) = service_with(Arc::new(FixedModel::scores(60.0, 40.0)));
        let created = service.create(happy("steady")).await.unwrap();

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["sentiment"], 60);
        assert_eq!(json["analysis"]["summary"], "A bright, energetic day.");
    }

    // ---- update ----

    #[tokio::test]
    async fn update_does_not_trigger_analysis() {
        let model = Arc::new(FixedModel::scores(70.0, 70.0));
        let (service, _) = service_with(model.clone());
        let created = service.create(happy("first draft")).await.unwrap();

        let updated = service
            .update(
                created.entry.id,
                JournalEntryUpdate {
                    content: Some("second draft, longer".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "second draft, longer");
        assert_eq!(updated.date, created.entry.date);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_with_new_content_recomputes_word_count() {
        let (service, store) = service_with(Arc::new(FixedModel::scores(70.0, 70.0)));
        let created = service.create(happy("two words")).await.unwrap();
        assert_eq!(created.entry.word_count, Some(2));

        let updated = service
            .update(
                created.entry.id,
                JournalEntryUpdate {
                    content: Some("now there are five words".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.word_count, Some(5));
        assert_eq!(updated.sentiment, Some(70));
        let stored = store.get_journal_entry(created.entry.id).await.unwrap().unwrap();
        assert_eq!(stored.word_count, Some(5));
        assert_eq!(service.stats(1).await.unwrap().total_words, 5);
    }

    #[tokio::test]
    async fn update_keeps_explicit_word_count() {
        let (service, _) = service_with(Arc::new(FixedModel::scores(70.0, 70.0)));
        let created = service.create(happy("two words")).await.unwrap();

        let updated = service
            .update(
                created.entry.id,
                JournalEntryUpdate {
                    content: Some("now there are five words".into()),
                    word_count: Some(Some(9)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.word_count, Some(9));

        let untouched = service
            .update(
                created.entry.id,
                JournalEntryUpdate {
                    mood: Some(Mood::Calm),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(untouched.word_count, Some(9));
    }

    #[tokio::test]
    async fn update_unknown_entry_is_not_found() {
        let (service, store) = service_with(Arc::new(FixedModel::failing()));
        let err = service
            .update(999, JournalEntryUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.entry_count().await, 0);
    }

    // ---- reanalyze ----

    #[tokio::test]
    async fn reanalyze_twice_keeps_identity() {
        let (service, _) = service_with(Arc::new(FixedModel::scores(150.0, -3.0)));
        let created = service.create(happy("so much going on")).await.unwrap();

        let first = service.reanalyze(created.entry.id).await.unwrap();
        let second = service.reanalyze(created.entry.id).await.unwrap();

        for result in [&first, &second] {
            assert_eq!(result.entry.id, created.entry.id);
            assert_eq!(result.entry.user_id, created.entry.user_id);
            assert_eq!(result.entry.date, created.entry.date);
            assert_eq!(result.entry.sentiment, Some(100));
            assert_eq!(result.entry.energy, Some(0));
            assert_eq!(result.entry.word_count, Some(4));
        }
    }

    #[tokio::test]
    async fn reanalyze_unknown_entry_is_not_found() {
        let (service, _) = service_with(Arc::new(FixedModel::failing()));
        assert_err!(service.reanalyze(5).await);
    }

    // ---- delete ----

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (service, _) = service_with(Arc::new(FixedModel::failing()));
        let created = service.create(happy("temporary")).await.unwrap();

        assert_ok!(service.delete(created.entry.id).await);
        assert!(matches!(
            service.get(created.entry.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(created.entry.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    // ---- metrics ----

    #[tokio::test]
    async fn fallbacks_are_counted_by_cause() {
        let metrics = Arc::new(AppMetrics::new().unwrap());
        let (service, _) = service_with(Arc::new(FixedModel::failing()));
        let service = service.with_metrics(metrics.clone());

        service.create(happy("hello there")).await.unwrap();

        assert!((metrics.analyses_total.get() - 1.0).abs() < f64::EPSILON);
        let fallbacks = metrics
            .analysis_fallbacks_total
            .with_label_values(&["network"])
            .get();
        assert!((fallbacks - 1.0).abs() < f64::EPSILON);
        assert!((metrics.entries_stored.get() - 1.0).abs() < f64::EPSILON);
    }

    // ---- stats ----

    #[tokio::test]
    async fn stats_average_only_analysed_entries() {
        let (service, store) = service_with(Arc::new(FixedModel::scores(80.0, 30.0)));
        service.create(happy("one two")).await.unwrap();
        service.create(happy("")).await.unwrap();
        let third = service.create(happy("three four five")).await.unwrap();
        store
            .update_journal_entry(
                third.entry.id,
                JournalEntryUpdate {
                    mood: Some(Mood::Sad),
                    sentiment: Some(Some(41)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stats = service.stats(1).await.unwrap();

        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.average_sentiment, Some(61));
        assert_eq!(stats.average_energy, Some(30));
        assert_eq!(stats.total_words, 5);
        assert_eq!(stats.mood_breakdown["happy"], 2);
        assert_eq!(stats.mood_breakdown["sad"], 1);
        assert_eq!(stats.mood_breakdown["tired"], 0);
    }

    #[test]
    fn stats_of_empty_journal_have_no_averages() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.average_sentiment, None);
        assert_eq!(stats.mood_breakdown.len(), 5);
    }
}
