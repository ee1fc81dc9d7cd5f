//! A/B experiment tracking: variants, trials, and statistical comparison
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< Variant (N)
//!       │
//!       └──< Trial (N) [append-only, one per generated article]
//! ```
//!
//! The [`Experiment`] aggregate owns both record collections, validates
//! inserts, persists a full snapshot after every mutation, and runs the
//! two analysis contracts: automatic-baseline ([`Experiment::analyze_results`])
//! and parameterized-control ([`Experiment::analyze_metric`]).
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use ensayo_db::experiment::Experiment;
//! use ensayo_db::persist::MemoryDocumentStore;
//! use ensayo_db::Metadata;
//!
//! # fn main() -> ensayo_db::Result<()> {
//! let mut experiment = Experiment::open(
//!     "prompt_optimization",
//!     "Testing prompt structures",
//!     vec!["structure_score".to_string()],
//!     Box::new(MemoryDocumentStore::new()),
//! )?;
//!
//! let baseline = experiment.add_variant("baseline", "Write about {title}.", Metadata::new())?;
//! experiment.record_trial(
//!     &baseline,
//!     BTreeMap::from([("structure_score".to_string(), 7.5)]),
//!     Metadata::new(),
//! )?;
//!
//! assert_eq!(experiment.trial_count(), 1);
//! # Ok(())
//! # }
//! ```

mod analysis;
mod store;
mod trial;
mod variant;

pub use analysis::{
    AnalysisSummary, BaselineReport, ControlSummary, MetricAnalysis, VariantComparison,
};
pub use store::Experiment;
pub use trial::{Trial, TrialBuilder};
pub use variant::{Variant, VariantBuilder};
