//! Feedback store - aggregate root for criteria and responses
//!
//! Same write-through pattern as the experiment store, under a single
//! fixed document key: every mutation validates first, then persists the
//! full snapshot.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::report::{ArticleScore, CriterionStats, FeedbackStats, TimeRange};
use super::{Criterion, FeedbackResponse, ScaleLevel};
use crate::persist::{DocumentStore, FsDocumentStore};
use crate::{stats, Error, Metadata, Result};

/// Fixed persistence key: the feedback store is not parametrized by name.
const FEEDBACK_DOCUMENT: &str = "feedback_data";

#[derive(Debug, Serialize, Deserialize)]
struct FeedbackSnapshot {
    criteria: BTreeMap<String, Criterion>,
    responses: Vec<FeedbackResponse>,
}

/// Manages human feedback collection and analysis.
///
/// Owns the registered [`Criterion`]s and the append-only
/// [`FeedbackResponse`] log; computes weighted per-article scores and
/// global descriptive statistics.
#[derive(Debug)]
pub struct FeedbackStore {
    criteria: BTreeMap<String, Criterion>,
    responses: Vec<FeedbackResponse>,
    store: Box<dyn DocumentStore>,
}

impl FeedbackStore {
    /// Open a feedback store backed by the given document store.
    ///
    /// # Errors
    /// Returns an error if a prior document exists but cannot be read or
    /// does not match the snapshot schema.
    pub fn open(store: Box<dyn DocumentStore>) -> Result<Self> {
        let mut feedback = Self {
            criteria: BTreeMap::new(),
            responses: Vec::new(),
            store,
        };
        feedback.load()?;
        Ok(feedback)
    }

    /// Open a feedback store persisted as `<dir>/feedback_data.json`,
    /// creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or a prior
    /// document cannot be restored.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let store = FsDocumentStore::new(dir)?;
        Self::open(Box::new(store))
    }

    /// Get all registered criteria, keyed by id.
    #[must_use]
    pub const fn criteria(&self) -> &BTreeMap<String, Criterion> {
        &self.criteria
    }

    /// Get one criterion by id.
    #[must_use]
    pub fn get_criterion(&self, criterion_id: &str) -> Option<&Criterion> {
        self.criteria.get(criterion_id)
    }

    /// Get all responses in submission order.
    #[must_use]
    pub fn responses(&self) -> &[FeedbackResponse] {
        &self.responses
    }

    /// Number of registered criteria.
    #[must_use]
    pub fn criterion_count(&self) -> usize {
        self.criteria.len()
    }

    /// Number of recorded responses.
    #[must_use]
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Register a feedback criterion and persist the store.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be persisted.
    pub fn add_criterion(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        scale: Vec<ScaleLevel>,
        weight: f64,
    ) -> Result<String> {
        let criterion_id = Uuid::new_v4().to_string();
        let criterion = Criterion::new(criterion_id.clone(), name, description, scale, weight);
        debug!(criterion_id = %criterion_id, name = criterion.name(), "registering criterion");
        self.criteria.insert(criterion_id.clone(), criterion);
        self.save()?;
        Ok(criterion_id)
    }

    /// Record one rater's feedback for an article and persist the store.
    ///
    /// Validation happens before any mutation, so a rejected submission
    /// leaves both the in-memory and on-disk state untouched.
    ///
    /// # Errors
    /// - [`Error::MissingRatings`] if any registered criterion is absent
    ///   from `ratings` (the missing ids are enumerated).
    /// - [`Error::UnknownCriterion`] if a rated criterion id is not
    ///   registered.
    /// - [`Error::InvalidRating`] if a value is outside the criterion's
    ///   declared scale.
    /// - Persistence errors from the backing store.
    pub fn record_feedback(
        &mut self,
        article_id: &str,
        evaluator_id: &str,
        ratings: BTreeMap<String, i64>,
        comments: &str,
        metadata: Metadata,
    ) -> Result<String> {
        // BTreeMap keys are ascending, so the enumeration is already sorted
        let missing: Vec<String> = self
            .criteria
            .keys()
            .filter(|id| !ratings.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingRatings { missing });
        }

        for (criterion_id, rating) in &ratings {
            let criterion = self
                .criteria
                .get(criterion_id)
                .ok_or_else(|| Error::UnknownCriterion(criterion_id.clone()))?;
            if !criterion.allows(*rating) {
                return Err(Error::InvalidRating {
                    criterion: criterion.name().to_string(),
                    rating: *rating,
                    allowed: criterion.allowed_values(),
                });
            }
        }

        let response_id = Uuid::new_v4().to_string();
        let response = FeedbackResponse::builder(
            response_id.clone(),
            article_id,
            evaluator_id,
            self.next_timestamp(),
            ratings,
        )
        .comments(comments)
        .metadata(metadata)
        .build();
        self.responses.push(response);
        self.save()?;
        Ok(response_id)
    }

    /// All responses for an article, in submission order.
    #[must_use]
    pub fn get_article_feedback(&self, article_id: &str) -> Vec<&FeedbackResponse> {
        self.responses
            .iter()
            .filter(|response| response.article_id() == article_id)
            .collect()
    }

    /// All responses from a rater, in submission order.
    #[must_use]
    pub fn get_evaluator_feedback(&self, evaluator_id: &str) -> Vec<&FeedbackResponse> {
        self.responses
            .iter()
            .filter(|response| response.evaluator_id() == evaluator_id)
            .collect()
    }

    /// Weighted average scores for an article.
    ///
    /// Per criterion with at least one rating for the article: the
    /// arithmetic mean across responses. The overall score divides the
    /// weighted sum by the total weight of **all** registered criteria,
    /// including criteria with no data for this article.
    ///
    /// `None` when the article has no responses or no criterion has data.
    #[must_use]
    pub fn calculate_article_score(&self, article_id: &str) -> Option<ArticleScore> {
        let responses = self.get_article_feedback(article_id);
        if responses.is_empty() {
            return None;
        }

        let total_weight: f64 = self.criteria.values().map(Criterion::weight).sum();

        let mut per_criterion = BTreeMap::new();
        let mut weighted_sum = 0.0;
        for criterion in self.criteria.values() {
            let ratings: Vec<f64> = responses
                .iter()
                .filter_map(|response| response.rating(criterion.id()))
                .map(|value| value as f64)
                .collect();
            let Some(average) = stats::mean(&ratings) else {
                continue;
            };
            weighted_sum += average * criterion.weight();
            per_criterion.insert(criterion.name().to_string(), average);
        }

        if per_criterion.is_empty() {
            return None;
        }
        Some(ArticleScore::new(per_criterion, weighted_sum / total_weight))
    }

    /// Global statistics over all collected feedback.
    ///
    /// `None` when no responses exist.
    #[must_use]
    pub fn get_feedback_stats(&self) -> Option<FeedbackStats> {
        if self.responses.is_empty() {
            return None;
        }

        let unique_articles: HashSet<&str> = self
            .responses
            .iter()
            .map(FeedbackResponse::article_id)
            .collect();
        let unique_evaluators: HashSet<&str> = self
            .responses
            .iter()
            .map(FeedbackResponse::evaluator_id)
            .collect();
        let start = self
            .responses
            .iter()
            .map(FeedbackResponse::timestamp)
            .min()?;
        let end = self
            .responses
            .iter()
            .map(FeedbackResponse::timestamp)
            .max()?;

        let mut criteria_stats = BTreeMap::new();
        for criterion in self.criteria.values() {
            let ratings: Vec<i64> = self
                .responses
                .iter()
                .filter_map(|response| response.rating(criterion.id()))
                .collect();
            if ratings.is_empty() {
                continue;
            }
            let sum: i64 = ratings.iter().sum();
            let mean = sum as f64 / ratings.len() as f64;
            let min = ratings.iter().copied().min()?;
            let max = ratings.iter().copied().max()?;
            criteria_stats.insert(
                criterion.name().to_string(),
                CriterionStats::new(ratings.len(), mean, min, max),
            );
        }

        Some(FeedbackStats::new(
            self.responses.len(),
            unique_articles.len(),
            unique_evaluators.len(),
            criteria_stats,
            TimeRange::new(start, end),
        ))
    }

    // Response timestamps never run backwards within a process, even when
    // the wall clock does.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.responses.last() {
            Some(last) if last.timestamp() > now => last.timestamp(),
            _ => now,
        }
    }

    fn save(&self) -> Result<()> {
        let snapshot = FeedbackSnapshot {
            criteria: self.criteria.clone(),
            responses: self.responses.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        self.store.save(FEEDBACK_DOCUMENT, &json)
    }

    fn load(&mut self) -> Result<()> {
        let Some(json) = self.store.load(FEEDBACK_DOCUMENT)? else {
            return Ok(());
        };
        let snapshot: FeedbackSnapshot = serde_json::from_str(&json)?;
        debug!(
            criteria = snapshot.criteria.len(),
            responses = snapshot.responses.len(),
            "restored feedback snapshot"
        );
        self.criteria = snapshot.criteria;
        self.responses = snapshot.responses;
        Ok(())
    }
}
