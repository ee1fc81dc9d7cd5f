//! Feedback Collection Example
//!
//! Demonstrates the human-rating side of the experimentation subsystem:
//! registering weighted criteria with discrete scales, validating and
//! recording rater submissions, and producing weighted article scores and
//! global statistics.
//!
//! Run with: cargo run --example feedback_collection

use std::collections::BTreeMap;

use anyhow::Result;
use ensayo_db::feedback::{FeedbackStore, ScaleLevel};
use ensayo_db::persist::MemoryDocumentStore;
use ensayo_db::Metadata;

fn five_point_scale() -> Vec<ScaleLevel> {
    vec![
        ScaleLevel::new(1, "Poor"),
        ScaleLevel::new(2, "Below average"),
        ScaleLevel::new(3, "Average"),
        ScaleLevel::new(4, "Good"),
        ScaleLevel::new(5, "Excellent"),
    ]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Ensayo-DB Feedback Collection ===\n");

    let mut feedback = FeedbackStore::open(Box::new(MemoryDocumentStore::new()))?;

    // -------------------------------------------------------------------------
    // 1. Register rating criteria
    // -------------------------------------------------------------------------
    println!("1. Registering criteria...");

    let quality = feedback.add_criterion(
        "Content Quality",
        "Accuracy, depth, and usefulness of the content",
        five_point_scale(),
        2.0,
    )?;
    let structure = feedback.add_criterion(
        "Structure",
        "Logical organization and readability",
        five_point_scale(),
        1.0,
    )?;
    let seo = feedback.add_criterion(
        "SEO",
        "Keyword usage and search friendliness",
        five_point_scale(),
        1.5,
    )?;

    for criterion in feedback.criteria().values() {
        println!(
            "   {} (weight {:.1}): {} levels",
            criterion.name(),
            criterion.weight(),
            criterion.scale().len()
        );
    }

    // -------------------------------------------------------------------------
    // 2. Collect rater submissions
    // -------------------------------------------------------------------------
    println!("\n2. Recording feedback...");

    let submissions = [
        ("article-ac-maintenance", "rater-1", [4, 5, 3], "Clear and well organized"),
        ("article-ac-maintenance", "rater-2", [5, 4, 4], "Strong keyword coverage"),
        ("article-safety", "rater-1", [3, 3, 2], "Thin on concrete examples"),
        ("article-safety", "rater-3", [4, 3, 3], ""),
    ];

    for (article, rater, [q, s, o], comments) in submissions {
        let ratings = BTreeMap::from([
            (quality.clone(), q),
            (structure.clone(), s),
            (seo.clone(), o),
        ]);
        feedback.record_feedback(article, rater, ratings, comments, Metadata::new())?;
        println!("   {rater} rated {article}");
    }

    // An out-of-scale value is rejected before anything mutates
    let rejected = feedback.record_feedback(
        "article-safety",
        "rater-2",
        BTreeMap::from([
            (quality.clone(), 9),
            (structure.clone(), 3),
            (seo.clone(), 3),
        ]),
        "",
        Metadata::new(),
    );
    println!("   Out-of-scale submission: {}", rejected.unwrap_err());

    // -------------------------------------------------------------------------
    // 3. Weighted article scores
    // -------------------------------------------------------------------------
    println!("\n3. Article scores:");

    for article in ["article-ac-maintenance", "article-safety"] {
        if let Some(score) = feedback.calculate_article_score(article) {
            println!("   {article}:");
            for (criterion_name, average) in score.per_criterion() {
                println!("     {criterion_name}: {average:.2}");
            }
            println!("     overall (weighted): {:.2}", score.overall());
        }
    }

    // -------------------------------------------------------------------------
    // 4. Global statistics
    // -------------------------------------------------------------------------
    println!("\n4. Feedback statistics:");

    if let Some(stats) = feedback.get_feedback_stats() {
        println!("   Responses: {}", stats.total_responses());
        println!("   Articles rated: {}", stats.unique_articles());
        println!("   Raters: {}", stats.unique_evaluators());
        for (criterion_name, criterion_stats) in stats.criteria_stats() {
            println!(
                "   {criterion_name}: mean {:.2} (min {}, max {}, n = {})",
                criterion_stats.mean(),
                criterion_stats.min(),
                criterion_stats.max(),
                criterion_stats.count()
            );
        }
    }

    println!("\n=== Feedback Collection Complete ===");
    Ok(())
}
