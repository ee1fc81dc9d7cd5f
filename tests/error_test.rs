//! Error message tests
//!
//! Validation errors must name the offending metrics, criteria, and scale
//! values so callers can act without re-reading the schema.

use ensayo_db::Error;

#[test]
fn test_missing_metrics_enumerates_names() {
    let err = Error::MissingMetrics {
        missing: vec!["content_score".to_string(), "seo_score".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "missing required metrics: content_score, seo_score"
    );
}

#[test]
fn test_missing_ratings_enumerates_ids() {
    let err = Error::MissingRatings {
        missing: vec!["criterion-a".to_string(), "criterion-b".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "missing ratings for criteria: criterion-a, criterion-b"
    );
}

#[test]
fn test_invalid_rating_names_criterion_and_scale() {
    let err = Error::InvalidRating {
        criterion: "Quality".to_string(),
        rating: 7,
        allowed: vec![1, 3, 5],
    };
    let message = err.to_string();
    assert!(message.contains("invalid rating 7"));
    assert!(message.contains("Quality"));
    assert!(message.contains("[1, 3, 5]"));
}

#[test]
fn test_lookup_errors_name_the_subject() {
    assert_eq!(
        Error::UnknownVariant("var-9".to_string()).to_string(),
        "unknown variant: var-9"
    );
    assert_eq!(
        Error::UnknownMetric("bounce_rate".to_string()).to_string(),
        "unknown metric: bounce_rate"
    );
    assert_eq!(
        Error::NoTrialData("var-9".to_string()).to_string(),
        "no trial data for variant: var-9"
    );
    assert_eq!(
        Error::NoTrials.to_string(),
        "no trials recorded for any variant"
    );
}
