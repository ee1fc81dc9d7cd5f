//! Aggregated feedback views: per-article scores and global statistics

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Weighted average scores for one article.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArticleScore {
    per_criterion: BTreeMap<String, f64>,
    overall: f64,
}

impl ArticleScore {
    pub(crate) const fn new(per_criterion: BTreeMap<String, f64>, overall: f64) -> Self {
        Self {
            per_criterion,
            overall,
        }
    }

    /// Average rating per criterion name. Criteria with no ratings for the
    /// article are omitted.
    #[must_use]
    pub const fn per_criterion(&self) -> &BTreeMap<String, f64> {
        &self.per_criterion
    }

    /// Average for one criterion by display name.
    #[must_use]
    pub fn criterion(&self, name: &str) -> Option<f64> {
        self.per_criterion.get(name).copied()
    }

    /// Weighted overall score. The divisor is the total weight of all
    /// registered criteria, including those with no data for this article.
    #[must_use]
    pub const fn overall(&self) -> f64 {
        self.overall
    }
}

/// Descriptive statistics for one criterion across all responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CriterionStats {
    count: usize,
    mean: f64,
    min: i64,
    max: i64,
}

impl CriterionStats {
    pub(crate) const fn new(count: usize, mean: f64, min: i64, max: i64) -> Self {
        Self {
            count,
            mean,
            min,
            max,
        }
    }

    /// Number of ratings submitted for the criterion.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Mean rating.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Lowest submitted rating.
    #[must_use]
    pub const fn min(&self) -> i64 {
        self.min
    }

    /// Highest submitted rating.
    #[must_use]
    pub const fn max(&self) -> i64 {
        self.max
    }
}

/// First and last response timestamps.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub(crate) const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Earliest response timestamp.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Latest response timestamp.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Global statistics over all collected feedback.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackStats {
    total_responses: usize,
    unique_articles: usize,
    unique_evaluators: usize,
    criteria_stats: BTreeMap<String, CriterionStats>,
    time_range: TimeRange,
}

impl FeedbackStats {
    pub(crate) const fn new(
        total_responses: usize,
        unique_articles: usize,
        unique_evaluators: usize,
        criteria_stats: BTreeMap<String, CriterionStats>,
        time_range: TimeRange,
    ) -> Self {
        Self {
            total_responses,
            unique_articles,
            unique_evaluators,
            criteria_stats,
            time_range,
        }
    }

    /// Total number of responses.
    #[must_use]
    pub const fn total_responses(&self) -> usize {
        self.total_responses
    }

    /// Number of distinct rated articles.
    #[must_use]
    pub const fn unique_articles(&self) -> usize {
        self.unique_articles
    }

    /// Number of distinct raters.
    #[must_use]
    pub const fn unique_evaluators(&self) -> usize {
        self.unique_evaluators
    }

    /// Per-criterion statistics, keyed by criterion name. Criteria with no
    /// ratings are omitted.
    #[must_use]
    pub const fn criteria_stats(&self) -> &BTreeMap<String, CriterionStats> {
        &self.criteria_stats
    }

    /// First and last response timestamps.
    #[must_use]
    pub const fn time_range(&self) -> TimeRange {
        self.time_range
    }
}
