//! Experiment store integration tests
//!
//! Exercises the full aggregate against a real temp-directory-backed
//! document store: round-trip persistence, insert validation, baseline
//! selection, and both analysis contracts.

use std::collections::BTreeMap;

use arrow::array::{Float64Array, StringArray};
use ensayo_db::experiment::Experiment;
use ensayo_db::{Error, Metadata};
use tempfile::TempDir;

fn metrics() -> Vec<String> {
    vec!["structure_score".to_string(), "content_score".to_string()]
}

fn scores(structure: f64, content: f64) -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("structure_score".to_string(), structure),
        ("content_score".to_string(), content),
    ])
}

fn open(dir: &TempDir) -> Experiment {
    Experiment::open_dir("test_experiment", "Test experiment", metrics(), dir.path()).unwrap()
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_round_trip_persistence() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    let mut metadata = Metadata::new();
    metadata.insert("model".to_string(), serde_json::json!("claude-3-opus"));
    let variant_id = experiment
        .add_variant("baseline", "Write about {title}.", metadata)
        .unwrap();
    let trial_id = experiment
        .record_trial(&variant_id, scores(7.0, 8.0), Metadata::new())
        .unwrap();

    let reloaded = open(&dir);

    assert_eq!(reloaded.variant_count(), 1);
    assert_eq!(reloaded.trial_count(), 1);
    assert_eq!(
        reloaded.variants(),
        experiment.variants(),
        "variants changed across reload"
    );
    assert_eq!(
        reloaded.trials(),
        experiment.trials(),
        "trials changed across reload"
    );

    let variant = reloaded.get_variant(&variant_id).unwrap();
    assert_eq!(variant.name(), "baseline");
    assert_eq!(variant.metadata()["model"], serde_json::json!("claude-3-opus"));

    let trial = &reloaded.trials()[0];
    assert_eq!(trial.id(), trial_id);
    assert_eq!(trial.metric("structure_score"), Some(7.0));
    assert_eq!(trial.metric("content_score"), Some(8.0));
}

#[test]
fn test_persisted_document_shape() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);
    let variant_id = experiment
        .add_variant("baseline", "Write about {title}.", Metadata::new())
        .unwrap();
    experiment
        .record_trial(&variant_id, scores(7.0, 8.0), Metadata::new())
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("test_experiment.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(doc["name"], "test_experiment");
    assert_eq!(doc["metrics"], serde_json::json!(["structure_score", "content_score"]));
    assert_eq!(doc["variants"][&variant_id]["name"], "baseline");
    assert_eq!(doc["trials"][0]["variant_id"], serde_json::json!(variant_id));
    // RFC 3339 timestamp on disk
    let raw_timestamp = doc["trials"][0]["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(raw_timestamp).is_ok());
}

#[test]
fn test_corrupt_document_fails_loudly() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("test_experiment.json"), "{\"not\": \"a snapshot\"}").unwrap();

    let result = Experiment::open_dir("test_experiment", "d", metrics(), dir.path());
    assert!(matches!(result, Err(Error::Document(_))));
}

// =============================================================================
// Insert validation
// =============================================================================

#[test]
fn test_missing_metric_rejected_and_not_persisted() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);
    let variant_id = experiment
        .add_variant("baseline", "p", Metadata::new())
        .unwrap();

    let err = experiment
        .record_trial(
            &variant_id,
            BTreeMap::from([("structure_score".to_string(), 8.0)]),
            Metadata::new(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::MissingMetrics { .. }));
    assert!(err.to_string().contains("content_score"));
    assert_eq!(experiment.trial_count(), 0);

    // the rejected insert must not have reached the document either
    let reloaded = open(&dir);
    assert_eq!(reloaded.trial_count(), 0);
}

#[test]
fn test_unknown_variant_rejected() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    let err = experiment
        .record_trial("no-such-variant", scores(8.0, 7.0), Metadata::new())
        .unwrap_err();

    assert!(matches!(err, Error::UnknownVariant(_)));
    assert_eq!(experiment.trial_count(), 0);
}

// =============================================================================
// Automatic-baseline analysis
// =============================================================================

#[test]
fn test_analyze_results_empty() {
    let dir = TempDir::new().unwrap();
    let experiment = open(&dir);

    let report = experiment.analyze_results().unwrap();
    assert_eq!(report.total_trials(), 0);
    assert!(report.baseline_variant().is_none());
    assert!(report.variant_performance().is_empty());
}

#[test]
fn test_baseline_without_trials_falls_back_to_most_trials() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    // "baseline" is registered but never generates an article
    experiment
        .add_variant("baseline", "p", Metadata::new())
        .unwrap();
    let a = experiment.add_variant("A", "p", Metadata::new()).unwrap();
    let b = experiment.add_variant("B", "p", Metadata::new()).unwrap();

    experiment.record_trial(&a, scores(8.0, 8.0), Metadata::new()).unwrap();
    experiment.record_trial(&a, scores(8.0, 8.0), Metadata::new()).unwrap();
    experiment.record_trial(&b, scores(9.0, 9.0), Metadata::new()).unwrap();

    let report = experiment.analyze_results().unwrap();
    assert_eq!(report.total_trials(), 3);
    assert_eq!(report.baseline_variant(), Some("A"));
    assert!(report.variant_performance().contains_key("B"));
    assert!(!report.variant_performance().contains_key("A"));
    assert!(!report.variant_performance().contains_key("baseline"));
}

#[test]
fn test_relative_performance_arithmetic() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    let baseline = experiment
        .add_variant("baseline", "p", Metadata::new())
        .unwrap();
    let variant = experiment
        .add_variant("structured", "p", Metadata::new())
        .unwrap();

    for _ in 0..2 {
        experiment
            .record_trial(&baseline, scores(10.0, 10.0), Metadata::new())
            .unwrap();
        experiment
            .record_trial(&variant, scores(12.0, 10.0), Metadata::new())
            .unwrap();
    }

    let report = experiment.analyze_results().unwrap();
    assert_eq!(report.baseline_variant(), Some("baseline"));

    let change = report.relative_change("structured", "structure_score").unwrap();
    assert!((change - 0.2).abs() < 1e-9, "relative change was {change}");

    let unchanged = report.relative_change("structured", "content_score").unwrap();
    assert!(unchanged.abs() < 1e-9);
}

// =============================================================================
// Parameterized-control analysis
// =============================================================================

#[test]
fn test_analyze_metric_detects_significant_improvement() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    let control = experiment
        .add_variant("control", "Control prompt", Metadata::new())
        .unwrap();
    let variant = experiment
        .add_variant("test", "Test prompt", Metadata::new())
        .unwrap();

    for score in [7.0, 8.0, 7.0, 8.0, 7.0] {
        experiment
            .record_trial(&control, scores(score, score), Metadata::new())
            .unwrap();
    }
    for score in [8.0, 9.0, 8.0, 9.0, 8.0] {
        experiment
            .record_trial(&variant, scores(score, score), Metadata::new())
            .unwrap();
    }

    let analysis = experiment.analyze_metric("structure_score", &control).unwrap();

    assert_eq!(analysis.metric(), "structure_score");
    assert_eq!(analysis.control_id(), control);
    assert_eq!(analysis.control().sample_size(), 5);
    assert!((analysis.control().mean() - 7.4).abs() < 1e-9);

    let comparison = &analysis.variants()[&variant];
    assert_eq!(comparison.name(), "test");
    assert_eq!(comparison.sample_size(), 5);
    assert!(comparison.mean() > analysis.control().mean());
    assert!(comparison.significant(), "p = {}", comparison.p_value());
    assert!(comparison.p_value() < 0.05);
    assert!(comparison.effect_size() > 0.0);
    // ((8.4 / 7.4) - 1) * 100
    assert!((comparison.improvement() - 13.513_513_513_513_5).abs() < 1e-6);

    assert_eq!(analysis.summary().total_trials(), 10);
    assert_eq!(analysis.summary().significant_improvements(), 1);
    assert!(analysis.summary().start_date() <= analysis.summary().end_date());
}

#[test]
fn test_analyze_metric_unknown_metric() {
    let dir = TempDir::new().unwrap();
    let experiment = open(&dir);
    let err = experiment.analyze_metric("seo_score", "any").unwrap_err();
    assert!(matches!(err, Error::UnknownMetric(_)));
}

#[test]
fn test_analyze_metric_requires_control_data() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);
    let control = experiment.add_variant("control", "p", Metadata::new()).unwrap();

    let err = experiment
        .analyze_metric("structure_score", &control)
        .unwrap_err();
    assert!(matches!(err, Error::NoTrialData(_)));
}

// =============================================================================
// Best-variant selection
// =============================================================================

#[test]
fn test_get_best_variant() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    let variant1 = experiment.add_variant("variant1", "Prompt 1", Metadata::new()).unwrap();
    let variant2 = experiment.add_variant("variant2", "Prompt 2", Metadata::new()).unwrap();

    experiment
        .record_trial(&variant1, scores(9.0, 9.0), Metadata::new())
        .unwrap();
    experiment
        .record_trial(&variant2, scores(7.0, 7.0), Metadata::new())
        .unwrap();

    assert_eq!(experiment.get_best_variant("structure_score"), Some(variant1.as_str()));
}

// =============================================================================
// Tabular projection
// =============================================================================

#[test]
fn test_to_batch_row_per_trial() {
    let dir = TempDir::new().unwrap();
    let mut experiment = open(&dir);

    let baseline = experiment
        .add_variant("baseline", "p", Metadata::new())
        .unwrap();
    experiment
        .record_trial(&baseline, scores(7.0, 8.0), Metadata::new())
        .unwrap();
    experiment
        .record_trial(&baseline, scores(9.0, 6.5), Metadata::new())
        .unwrap();

    let batch = experiment.to_batch().unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 6);
    let schema = batch.schema();
    let names: Vec<&str> = schema
        .fields()
        .iter()
        .map(|field| field.name().as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "trial_id",
            "variant_id",
            "variant_name",
            "timestamp",
            "structure_score",
            "content_score"
        ]
    );

    let variant_names = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(variant_names.value(0), "baseline");
    assert_eq!(variant_names.value(1), "baseline");

    let structure = batch
        .column(4)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((structure.value(0) - 7.0).abs() < 1e-9);
    assert!((structure.value(1) - 9.0).abs() < 1e-9);
}

#[test]
fn test_to_batch_empty_experiment() {
    let dir = TempDir::new().unwrap();
    let experiment = open(&dir);

    let batch = experiment.to_batch().unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 6);
}
