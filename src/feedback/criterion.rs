//! Feedback criterion - a named human-rating axis with a discrete scale

use serde::{Deserialize, Serialize};

/// One allowed rating value and its human-readable label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScaleLevel {
    value: i64,
    label: String,
}

impl ScaleLevel {
    /// Create a scale level.
    #[must_use]
    pub fn new(value: i64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }

    /// The rating value raters submit.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// The label shown to raters (e.g. "Poor", "Excellent").
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A named axis of human evaluation with a discrete rating scale and a
/// weight used in weighted aggregation.
///
/// Criteria are registered once and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Criterion {
    id: String,
    name: String,
    description: String,
    scale: Vec<ScaleLevel>,
    #[serde(default = "default_weight")]
    weight: f64,
}

const fn default_weight() -> f64 {
    1.0
}

impl Criterion {
    /// Create a criterion record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        scale: Vec<ScaleLevel>,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            scale,
            weight,
        }
    }

    /// Get the criterion id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description shown to raters.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the rating scale in declaration order.
    #[must_use]
    pub fn scale(&self) -> &[ScaleLevel] {
        &self.scale
    }

    /// Get the aggregation weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// The allowed rating values, in scale order.
    #[must_use]
    pub fn allowed_values(&self) -> Vec<i64> {
        self.scale.iter().map(ScaleLevel::value).collect()
    }

    /// Whether `rating` belongs to the declared scale.
    #[must_use]
    pub fn allows(&self, rating: i64) -> bool {
        self.scale.iter().any(|level| level.value() == rating)
    }
}
