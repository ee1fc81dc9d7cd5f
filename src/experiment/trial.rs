//! Trial record - one observed outcome of a variant

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Metadata;

/// One recorded outcome (metric values) attributable to a variant.
///
/// Trials are append-only: the store assigns the id and timestamp at record
/// time and never mutates or deletes the record. The metric map is required
/// to cover every metric the owning experiment declares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trial {
    id: String,
    variant_id: String,
    timestamp: DateTime<Utc>,
    metrics: BTreeMap<String, f64>,
    #[serde(default)]
    metadata: Metadata,
}

impl Trial {
    /// Create a new trial record with empty metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        variant_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            id: id.into(),
            variant_id: variant_id.into(),
            timestamp,
            metrics,
            metadata: Metadata::new(),
        }
    }

    /// Create a builder for constructing a trial with optional fields.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        variant_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        metrics: BTreeMap<String, f64>,
    ) -> TrialBuilder {
        TrialBuilder::new(id, variant_id, timestamp, metrics)
    }

    /// Get the trial id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the owning variant id.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the record timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get all metric values.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    /// Get one metric value, if the trial carries it.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Get the trial metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Builder for [`Trial`].
#[derive(Debug)]
pub struct TrialBuilder {
    id: String,
    variant_id: String,
    timestamp: DateTime<Utc>,
    metrics: BTreeMap<String, f64>,
    metadata: Metadata,
}

impl TrialBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        variant_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            id: id.into(),
            variant_id: variant_id.into(),
            timestamp,
            metrics,
            metadata: Metadata::new(),
        }
    }

    /// Set the trial metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build the [`Trial`].
    #[must_use]
    pub fn build(self) -> Trial {
        Trial {
            id: self.id,
            variant_id: self.variant_id,
            timestamp: self.timestamp,
            metrics: self.metrics,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("structure_score".to_string(), 8.0),
            ("content_score".to_string(), 7.5),
        ])
    }

    #[test]
    fn test_trial_new() {
        let trial = Trial::new("trial-1", "var-1", Utc::now(), metrics());
        assert_eq!(trial.id(), "trial-1");
        assert_eq!(trial.variant_id(), "var-1");
        assert_eq!(trial.metric("structure_score"), Some(8.0));
        assert_eq!(trial.metric("absent"), None);
    }

    #[test]
    fn test_trial_serialization_round_trip() {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), serde_json::json!("AC Maintenance"));

        let trial = Trial::builder("trial-2", "var-1", Utc::now(), metrics())
            .metadata(metadata)
            .build();

        let json = serde_json::to_string(&trial).expect("serialization failed");
        let deserialized: Trial = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(trial, deserialized);
    }

    #[test]
    fn test_trial_timestamp_serializes_as_rfc3339() {
        let trial = Trial::new("trial-3", "var-1", Utc::now(), metrics());
        let value = serde_json::to_value(&trial).expect("serialization failed");
        let raw = value["timestamp"].as_str().expect("timestamp not a string");
        assert!(DateTime::parse_from_rfc3339(raw).is_ok());
    }
}
