//! Analysis report types for experiment comparison
//!
//! Two report shapes exist because two analysis contracts exist:
//! [`BaselineReport`] is produced by the parameterless automatic-baseline
//! analysis, [`MetricAnalysis`] by the parameterized-control form with full
//! inferential statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Baseline-relative performance report, keyed by variant name.
///
/// `variant_performance[name][metric]` holds the relative change
/// `(variant_mean / baseline_mean) - 1`; the baseline itself is not listed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BaselineReport {
    total_trials: usize,
    baseline_variant: Option<String>,
    variant_performance: BTreeMap<String, BTreeMap<String, f64>>,
}

impl BaselineReport {
    pub(crate) const fn new(
        total_trials: usize,
        baseline_variant: Option<String>,
        variant_performance: BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Self {
        Self {
            total_trials,
            baseline_variant,
            variant_performance,
        }
    }

    pub(crate) const fn empty() -> Self {
        Self::new(0, None, BTreeMap::new())
    }

    /// Total number of trials across all variants.
    #[must_use]
    pub const fn total_trials(&self) -> usize {
        self.total_trials
    }

    /// Name of the variant selected as the baseline, absent when no trials
    /// have been recorded.
    #[must_use]
    pub fn baseline_variant(&self) -> Option<&str> {
        self.baseline_variant.as_deref()
    }

    /// Per-variant, per-metric relative change against the baseline.
    #[must_use]
    pub const fn variant_performance(&self) -> &BTreeMap<String, BTreeMap<String, f64>> {
        &self.variant_performance
    }

    /// Relative change for one (variant name, metric) pair.
    #[must_use]
    pub fn relative_change(&self, variant_name: &str, metric: &str) -> Option<f64> {
        self.variant_performance
            .get(variant_name)
            .and_then(|metrics| metrics.get(metric))
            .copied()
    }
}

/// Descriptive statistics for the control variant in a metric analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ControlSummary {
    name: String,
    sample_size: usize,
    mean: f64,
    std_dev: f64,
}

impl ControlSummary {
    pub(crate) fn new(name: impl Into<String>, sample_size: usize, mean: f64, std_dev: f64) -> Self {
        Self {
            name: name.into(),
            sample_size,
            mean,
            std_dev,
        }
    }

    /// Control variant display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of control trials with data for the metric.
    #[must_use]
    pub const fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Control sample mean.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Control population standard deviation.
    #[must_use]
    pub const fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

/// One variant's comparison against the control for a single metric.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VariantComparison {
    name: String,
    sample_size: usize,
    mean: f64,
    std_dev: f64,
    p_value: f64,
    effect_size: f64,
    significant: bool,
    improvement: f64,
}

impl VariantComparison {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: impl Into<String>,
        sample_size: usize,
        mean: f64,
        std_dev: f64,
        p_value: f64,
        effect_size: f64,
        significant: bool,
        improvement: f64,
    ) -> Self {
        Self {
            name: name.into(),
            sample_size,
            mean,
            std_dev,
            p_value,
            effect_size,
            significant,
            improvement,
        }
    }

    /// Variant display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of variant trials with data for the metric.
    #[must_use]
    pub const fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Variant sample mean.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Variant population standard deviation.
    #[must_use]
    pub const fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Two-sided p-value of the two-sample t-test against the control.
    /// NaN when there are not enough observations for a test.
    #[must_use]
    pub const fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Pooled-standard-deviation effect size (Cohen's d form).
    #[must_use]
    pub const fn effect_size(&self) -> f64 {
        self.effect_size
    }

    /// Whether the difference is significant at p < 0.05.
    #[must_use]
    pub const fn significant(&self) -> bool {
        self.significant
    }

    /// Percentage improvement over the control mean:
    /// `((variant_mean / control_mean) - 1) * 100`.
    #[must_use]
    pub const fn improvement(&self) -> f64 {
        self.improvement
    }
}

/// Roll-up block of a metric analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisSummary {
    total_trials: usize,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    significant_improvements: usize,
}

impl AnalysisSummary {
    pub(crate) const fn new(
        total_trials: usize,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        significant_improvements: usize,
    ) -> Self {
        Self {
            total_trials,
            start_date,
            end_date,
            significant_improvements,
        }
    }

    /// Total number of trials across all variants.
    #[must_use]
    pub const fn total_trials(&self) -> usize {
        self.total_trials
    }

    /// Earliest trial timestamp.
    #[must_use]
    pub const fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Latest trial timestamp.
    #[must_use]
    pub const fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Count of variants that are both significant and positive-improving.
    #[must_use]
    pub const fn significant_improvements(&self) -> usize {
        self.significant_improvements
    }
}

/// Full analysis of one metric against an explicitly chosen control variant.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricAnalysis {
    metric: String,
    control_id: String,
    control: ControlSummary,
    variants: BTreeMap<String, VariantComparison>,
    summary: AnalysisSummary,
}

impl MetricAnalysis {
    pub(crate) fn new(
        metric: impl Into<String>,
        control_id: impl Into<String>,
        control: ControlSummary,
        variants: BTreeMap<String, VariantComparison>,
        summary: AnalysisSummary,
    ) -> Self {
        Self {
            metric: metric.into(),
            control_id: control_id.into(),
            control,
            variants,
            summary,
        }
    }

    /// The analyzed metric name.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Id of the control variant the comparison ran against.
    #[must_use]
    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    /// Control variant statistics.
    #[must_use]
    pub const fn control(&self) -> &ControlSummary {
        &self.control
    }

    /// Per-variant comparisons, keyed by variant id. Variants with no data
    /// for the metric are omitted.
    #[must_use]
    pub const fn variants(&self) -> &BTreeMap<String, VariantComparison> {
        &self.variants
    }

    /// Summary block.
    #[must_use]
    pub const fn summary(&self) -> &AnalysisSummary {
        &self.summary
    }
}
