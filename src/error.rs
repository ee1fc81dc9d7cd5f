//! Error types for Ensayo-DB
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for
//! People). Validation errors enumerate the offending names so the caller
//! can fix the insert without re-reading the schema.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Ensayo-DB error types
#[derive(Error, Debug)]
pub enum Error {
    /// Trial insert is missing one or more of the experiment's declared metrics
    #[error("missing required metrics: {}", .missing.join(", "))]
    MissingMetrics {
        /// Declared metric names absent from the insert, sorted
        missing: Vec<String>,
    },

    /// Referenced variant id is not registered with the experiment
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// Requested metric is not in the experiment's declared metric list
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// Analysis requested against a variant with no recorded trials
    #[error("no trial data for variant: {0}")]
    NoTrialData(String),

    /// Analysis requested but no variant has any trials
    #[error("no trials recorded for any variant")]
    NoTrials,

    /// Feedback insert is missing ratings for registered criteria
    #[error("missing ratings for criteria: {}", .missing.join(", "))]
    MissingRatings {
        /// Registered criterion ids absent from the insert, sorted
        missing: Vec<String>,
    },

    /// Rated criterion id is not registered with the feedback store
    #[error("unknown criterion: {0}")]
    UnknownCriterion(String),

    /// Rating value outside the criterion's declared scale
    #[error("invalid rating {rating} for criterion {criterion}: must be one of {allowed:?}")]
    InvalidRating {
        /// Criterion display name
        criterion: String,
        /// The rejected value
        rating: i64,
        /// Allowed scale values, in scale order
        allowed: Vec<i64>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document failed to serialize or parse
    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
