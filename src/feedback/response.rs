//! Feedback response record - one human rating submission

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Metadata;

/// One rater's submitted ratings for one article.
///
/// Append-only: the store assigns the id and timestamp at submission time
/// and never mutates or deletes the record. The ratings map is required to
/// cover every criterion registered at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackResponse {
    id: String,
    article_id: String,
    evaluator_id: String,
    timestamp: DateTime<Utc>,
    ratings: BTreeMap<String, i64>,
    #[serde(default)]
    comments: String,
    #[serde(default)]
    metadata: Metadata,
}

impl FeedbackResponse {
    /// Create a new response with empty comments and metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        article_id: impl Into<String>,
        evaluator_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        ratings: BTreeMap<String, i64>,
    ) -> Self {
        Self {
            id: id.into(),
            article_id: article_id.into(),
            evaluator_id: evaluator_id.into(),
            timestamp,
            ratings,
            comments: String::new(),
            metadata: Metadata::new(),
        }
    }

    /// Create a builder for constructing a response with optional fields.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        article_id: impl Into<String>,
        evaluator_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        ratings: BTreeMap<String, i64>,
    ) -> FeedbackResponseBuilder {
        FeedbackResponseBuilder::new(id, article_id, evaluator_id, timestamp, ratings)
    }

    /// Get the response id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the rated article's identifier.
    #[must_use]
    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    /// Get the rater's identifier.
    #[must_use]
    pub fn evaluator_id(&self) -> &str {
        &self.evaluator_id
    }

    /// Get the submission timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get all ratings, keyed by criterion id.
    #[must_use]
    pub const fn ratings(&self) -> &BTreeMap<String, i64> {
        &self.ratings
    }

    /// Get the rating for one criterion, if present.
    #[must_use]
    pub fn rating(&self, criterion_id: &str) -> Option<i64> {
        self.ratings.get(criterion_id).copied()
    }

    /// Get the free-text comments.
    #[must_use]
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Get the response metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Builder for [`FeedbackResponse`].
#[derive(Debug)]
pub struct FeedbackResponseBuilder {
    id: String,
    article_id: String,
    evaluator_id: String,
    timestamp: DateTime<Utc>,
    ratings: BTreeMap<String, i64>,
    comments: String,
    metadata: Metadata,
}

impl FeedbackResponseBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        article_id: impl Into<String>,
        evaluator_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        ratings: BTreeMap<String, i64>,
    ) -> Self {
        Self {
            id: id.into(),
            article_id: article_id.into(),
            evaluator_id: evaluator_id.into(),
            timestamp,
            ratings,
            comments: String::new(),
            metadata: Metadata::new(),
        }
    }

    /// Set the free-text comments.
    #[must_use]
    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    /// Set the response metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build the [`FeedbackResponse`].
    #[must_use]
    pub fn build(self) -> FeedbackResponse {
        FeedbackResponse {
            id: self.id,
            article_id: self.article_id,
            evaluator_id: self.evaluator_id,
            timestamp: self.timestamp,
            ratings: self.ratings,
            comments: self.comments,
            metadata: self.metadata,
        }
    }
}
