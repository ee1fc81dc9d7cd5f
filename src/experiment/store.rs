//! Experiment store - aggregate root for variants and trials
//!
//! Owns the record collections, validates inserts before any mutation,
//! persists a full snapshot after every mutation (write-through, no
//! batching), and runs the statistical comparison routines.
//!
//! ## Persistence
//!
//! One JSON document per experiment name. On open, an existing document's
//! variants and trials replace the in-memory collections; the name,
//! description, and declared metric list supplied by the caller stay
//! authoritative. Concurrent writers are unsupported (last write wins).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::analysis::{
    AnalysisSummary, BaselineReport, ControlSummary, MetricAnalysis, VariantComparison,
};
use super::{Trial, Variant};
use crate::persist::{DocumentStore, FsDocumentStore};
use crate::{stats, Error, Metadata, Result};

/// Significance threshold for the two-sample t-test.
const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Persisted document shape: minimal record schema, variants keyed by id.
/// Deserialization is strict on the collections and fails loudly on shape
/// mismatch.
#[derive(Debug, Serialize, Deserialize)]
struct ExperimentSnapshot {
    name: String,
    description: String,
    metrics: Vec<String>,
    variants: BTreeMap<String, Variant>,
    trials: Vec<Trial>,
}

/// Manages A/B testing experiments for article generation.
///
/// The aggregate root of the experiment schema: registers [`Variant`]s,
/// records append-only [`Trial`]s, and compares variant performance.
#[derive(Debug)]
pub struct Experiment {
    name: String,
    description: String,
    metrics: Vec<String>,
    variants: BTreeMap<String, Variant>,
    trials: Vec<Trial>,
    store: Box<dyn DocumentStore>,
}

impl Experiment {
    /// Open an experiment backed by the given document store.
    ///
    /// If a document named after the experiment already exists, its
    /// variants and trials are restored.
    ///
    /// # Errors
    /// Returns an error if a prior document exists but cannot be read or
    /// does not match the snapshot schema.
    pub fn open(
        name: impl Into<String>,
        description: impl Into<String>,
        metrics: Vec<String>,
        store: Box<dyn DocumentStore>,
    ) -> Result<Self> {
        let mut experiment = Self {
            name: name.into(),
            description: description.into(),
            metrics,
            variants: BTreeMap::new(),
            trials: Vec::new(),
            store,
        };
        experiment.load()?;
        Ok(experiment)
    }

    /// Open an experiment persisted as `<dir>/<name>.json`, creating the
    /// directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or a prior
    /// document cannot be restored.
    pub fn open_dir(
        name: impl Into<String>,
        description: impl Into<String>,
        metrics: Vec<String>,
        dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let store = FsDocumentStore::new(dir)?;
        Self::open(name, description, metrics, Box::new(store))
    }

    /// Get the experiment name (also the persistence key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the experiment description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the declared metric list.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Get all registered variants, keyed by id.
    #[must_use]
    pub const fn variants(&self) -> &BTreeMap<String, Variant> {
        &self.variants
    }

    /// Get one variant by id.
    #[must_use]
    pub fn get_variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.get(variant_id)
    }

    /// Get all trials in insertion order.
    #[must_use]
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Number of registered variants.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Number of recorded trials.
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Register a variant and persist the experiment.
    ///
    /// Names need not be unique; the id is generated and returned.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be persisted.
    pub fn add_variant(
        &mut self,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
        metadata: Metadata,
    ) -> Result<String> {
        let variant_id = Uuid::new_v4().to_string();
        let variant = Variant::builder(variant_id.clone(), name, prompt_template)
            .metadata(metadata)
            .build();
        debug!(variant_id = %variant_id, name = variant.name(), "registering variant");
        self.variants.insert(variant_id.clone(), variant);
        self.save()?;
        Ok(variant_id)
    }

    /// Record a trial for a variant and persist the experiment.
    ///
    /// Validation happens before any mutation, so a rejected insert leaves
    /// both the in-memory and on-disk state untouched.
    ///
    /// # Errors
    /// - [`Error::MissingMetrics`] if any declared metric is absent from
    ///   `metrics` (the missing names are enumerated).
    /// - [`Error::UnknownVariant`] if `variant_id` is not registered.
    /// - Persistence errors from the backing store.
    pub fn record_trial(
        &mut self,
        variant_id: &str,
        metrics: BTreeMap<String, f64>,
        metadata: Metadata,
    ) -> Result<String> {
        let mut missing: Vec<String> = self
            .metrics
            .iter()
            .filter(|name| !metrics.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(Error::MissingMetrics { missing });
        }
        if !self.variants.contains_key(variant_id) {
            return Err(Error::UnknownVariant(variant_id.to_string()));
        }

        let trial_id = Uuid::new_v4().to_string();
        let trial = Trial::builder(trial_id.clone(), variant_id, self.next_timestamp(), metrics)
            .metadata(metadata)
            .build();
        self.trials.push(trial);
        self.save()?;
        Ok(trial_id)
    }

    /// Analyze all metrics against an automatically selected baseline.
    ///
    /// Baseline selection: a registered variant named `"baseline"`
    /// (case-insensitive) that has at least one trial; otherwise the
    /// variant with the most trials. Ties break on ascending variant id.
    ///
    /// For every other variant with trial data, each declared metric is
    /// reported as the relative change `(variant_mean / baseline_mean) - 1`.
    /// A (variant, metric) pair with no data on either side is skipped.
    ///
    /// # Errors
    /// Returns [`Error::NoTrials`] if trials exist but none can serve as a
    /// baseline. With zero trials the report is empty rather than an error.
    pub fn analyze_results(&self) -> Result<BaselineReport> {
        if self.trials.is_empty() {
            return Ok(BaselineReport::empty());
        }

        let trial_counts = self.trial_counts();
        let baseline_id = self.select_baseline(&trial_counts)?;
        let baseline_trials = self.trials_for(&baseline_id);
        let baseline_name = self
            .variants
            .get(&baseline_id)
            .map_or(baseline_id.as_str(), Variant::name)
            .to_string();

        let mut performance: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (variant_id, variant) in &self.variants {
            if *variant_id == baseline_id {
                continue;
            }
            let variant_trials = self.trials_for(variant_id);
            if variant_trials.is_empty() {
                continue;
            }

            let mut per_metric = BTreeMap::new();
            for metric in &self.metrics {
                let baseline_values = metric_values(&baseline_trials, metric);
                let variant_values = metric_values(&variant_trials, metric);
                let (Some(baseline_mean), Some(variant_mean)) =
                    (stats::mean(&baseline_values), stats::mean(&variant_values))
                else {
                    continue;
                };
                per_metric.insert(metric.clone(), variant_mean / baseline_mean - 1.0);
            }
            performance.insert(variant.name().to_string(), per_metric);
        }

        Ok(BaselineReport::new(
            self.trials.len(),
            Some(baseline_name),
            performance,
        ))
    }

    /// Analyze one metric against an explicitly supplied control variant.
    ///
    /// Every other variant with data for the metric is compared with a
    /// two-sample Student's t-test, a pooled-std effect size, and the
    /// percentage improvement over the control mean.
    ///
    /// # Errors
    /// - [`Error::UnknownMetric`] if `metric` is not declared.
    /// - [`Error::NoTrialData`] if the control variant has no data for it.
    pub fn analyze_metric(&self, metric: &str, control_variant_id: &str) -> Result<MetricAnalysis> {
        if !self.metrics.iter().any(|name| name == metric) {
            return Err(Error::UnknownMetric(metric.to_string()));
        }

        let control_values = metric_values(&self.trials_for(control_variant_id), metric);
        let Some(control_mean) = stats::mean(&control_values) else {
            return Err(Error::NoTrialData(control_variant_id.to_string()));
        };
        let control_std = stats::population_std(&control_values).unwrap_or_default();
        let control_name = self
            .variants
            .get(control_variant_id)
            .map_or(control_variant_id, Variant::name);
        let control = ControlSummary::new(
            control_name,
            control_values.len(),
            control_mean,
            control_std,
        );

        let mut variants = BTreeMap::new();
        let mut significant_improvements = 0;
        for (variant_id, variant) in &self.variants {
            if variant_id == control_variant_id {
                continue;
            }
            let values = metric_values(&self.trials_for(variant_id), metric);
            let Some(variant_mean) = stats::mean(&values) else {
                continue;
            };
            let variant_std = stats::population_std(&values).unwrap_or_default();
            let p_value = stats::students_t_test(&control_values, &values)
                .map_or(f64::NAN, |test| test.p_value);
            let effect_size =
                stats::pooled_effect_size(&control_values, &values).unwrap_or(f64::NAN);
            let significant = p_value < SIGNIFICANCE_LEVEL;
            let improvement = (variant_mean / control_mean - 1.0) * 100.0;
            if significant && improvement > 0.0 {
                significant_improvements += 1;
            }

            variants.insert(
                variant_id.clone(),
                VariantComparison::new(
                    variant.name(),
                    values.len(),
                    variant_mean,
                    variant_std,
                    p_value,
                    effect_size,
                    significant,
                    improvement,
                ),
            );
        }

        // trials are non-empty here: the control variant has data
        let start_date = self
            .trials
            .iter()
            .map(Trial::timestamp)
            .min()
            .ok_or(Error::NoTrials)?;
        let end_date = self
            .trials
            .iter()
            .map(Trial::timestamp)
            .max()
            .ok_or(Error::NoTrials)?;
        let summary = AnalysisSummary::new(
            self.trials.len(),
            start_date,
            end_date,
            significant_improvements,
        );

        Ok(MetricAnalysis::new(
            metric,
            control_variant_id,
            control,
            variants,
            summary,
        ))
    }

    /// Get the variant id with the highest mean for `metric`.
    ///
    /// Only variants with at least one trial carrying the metric are
    /// considered; ties break on ascending variant id. `None` when no
    /// trials exist or no variant has data for the metric.
    #[must_use]
    pub fn get_best_variant(&self, metric: &str) -> Option<&str> {
        if self.trials.is_empty() {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for variant_id in self.variants.keys() {
            let values = metric_values(&self.trials_for(variant_id), metric);
            let Some(variant_mean) = stats::mean(&values) else {
                continue;
            };
            // strictly greater keeps the earliest id on ties
            if best.map_or(true, |(_, best_mean)| variant_mean > best_mean) {
                best = Some((variant_id, variant_mean));
            }
        }
        best.map(|(variant_id, _)| variant_id)
    }

    /// Project all trials into a row-per-trial Arrow [`RecordBatch`] for
    /// downstream analysis tooling.
    ///
    /// Columns: `trial_id`, `variant_id`, `variant_name`, `timestamp`
    /// (RFC 3339), then one nullable `Float64` column per declared metric.
    ///
    /// # Errors
    /// Returns [`Error::UnknownVariant`] if a trial references a variant id
    /// that is no longer registered.
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![
            Field::new("trial_id", DataType::Utf8, false),
            Field::new("variant_id", DataType::Utf8, false),
            Field::new("variant_name", DataType::Utf8, false),
            Field::new("timestamp", DataType::Utf8, false),
        ];
        for metric in &self.metrics {
            fields.push(Field::new(metric, DataType::Float64, true));
        }
        let schema = Arc::new(Schema::new(fields));

        let mut trial_ids = Vec::with_capacity(self.trials.len());
        let mut variant_ids = Vec::with_capacity(self.trials.len());
        let mut variant_names = Vec::with_capacity(self.trials.len());
        let mut timestamps = Vec::with_capacity(self.trials.len());
        for trial in &self.trials {
            let variant = self
                .variants
                .get(trial.variant_id())
                .ok_or_else(|| Error::UnknownVariant(trial.variant_id().to_string()))?;
            trial_ids.push(trial.id().to_string());
            variant_ids.push(trial.variant_id().to_string());
            variant_names.push(variant.name().to_string());
            timestamps.push(trial.timestamp().to_rfc3339());
        }

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(trial_ids)),
            Arc::new(StringArray::from(variant_ids)),
            Arc::new(StringArray::from(variant_names)),
            Arc::new(StringArray::from(timestamps)),
        ];
        for metric in &self.metrics {
            let values: Vec<Option<f64>> =
                self.trials.iter().map(|trial| trial.metric(metric)).collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        RecordBatch::try_new(schema, columns).map_err(Error::from)
    }

    // Trial timestamps never run backwards within a process, even when the
    // wall clock does.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.trials.last() {
            Some(last) if last.timestamp() > now => last.timestamp(),
            _ => now,
        }
    }

    fn trial_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for trial in &self.trials {
            *counts.entry(trial.variant_id().to_string()).or_insert(0_usize) += 1;
        }
        counts
    }

    fn select_baseline(&self, trial_counts: &BTreeMap<String, usize>) -> Result<String> {
        // BTreeMap iteration is ascending by id, so the first hit settles
        // the choice among several "baseline"-named variants.
        let named_baseline = self
            .variants
            .iter()
            .find(|(id, variant)| variant.is_baseline() && trial_counts.contains_key(*id))
            .map(|(id, _)| id.clone());
        if let Some(id) = named_baseline {
            return Ok(id);
        }

        trial_counts
            .iter()
            .max_by(|(id_a, count_a), (id_b, count_b)| {
                // greatest count; ascending id on ties
                count_a.cmp(count_b).then_with(|| id_b.cmp(id_a))
            })
            .map(|(id, _)| id.clone())
            .ok_or(Error::NoTrials)
    }

    fn trials_for(&self, variant_id: &str) -> Vec<&Trial> {
        self.trials
            .iter()
            .filter(|trial| trial.variant_id() == variant_id)
            .collect()
    }

    fn save(&self) -> Result<()> {
        let snapshot = ExperimentSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            metrics: self.metrics.clone(),
            variants: self.variants.clone(),
            trials: self.trials.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        self.store.save(&self.name, &json)
    }

    fn load(&mut self) -> Result<()> {
        let Some(json) = self.store.load(&self.name)? else {
            return Ok(());
        };
        let snapshot: ExperimentSnapshot = serde_json::from_str(&json)?;
        if snapshot.metrics != self.metrics {
            warn!(
                experiment = %self.name,
                "declared metrics differ from persisted snapshot; constructor list stays authoritative"
            );
        }
        debug!(
            experiment = %self.name,
            variants = snapshot.variants.len(),
            trials = snapshot.trials.len(),
            "restored experiment snapshot"
        );
        self.variants = snapshot.variants;
        self.trials = snapshot.trials;
        Ok(())
    }
}

fn metric_values(trials: &[&Trial], metric: &str) -> Vec<f64> {
    trials
        .iter()
        .filter_map(|trial| trial.metric(metric))
        .collect()
}
