//! # Ensayo-DB: Embedded A/B Experiment Tracking Store
//!
//! Ensayo-DB is the experimentation subsystem of an LLM content-generation
//! pipeline: an append-only record store for prompt variants, trial
//! outcomes, and human feedback ratings, with write-through JSON
//! persistence and a statistical comparison engine for baseline-relative
//! analysis.
//!
//! The generation pipeline itself (prompt construction, model calls,
//! article evaluation) lives outside this crate; it only feeds metric
//! values and metadata into the stores defined here.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: records are validated before any state mutates
//! - **Poka-Yoke**: snapshots are schema-validated and fail loudly on
//!   shape mismatch
//! - **Genchi Genbutsu**: analysis reports carry sample sizes and p-values,
//!   not just means
//!
//! ## Example Usage
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
//!     "Testing prompt structures for article generation",
//!     vec!["structure_score".to_string(), "content_score".to_string()],
//!     Box::new(MemoryDocumentStore::new()),
//! )?;
//!
//! let baseline = experiment.add_variant("baseline", "Write about {title}.", Metadata::new())?;
//! let variant = experiment.add_variant("structured", "Write a sectioned article about {title}.", Metadata::new())?;
//!
//! for (id, score) in [(&baseline, 7.0), (&variant, 8.5)] {
//!     experiment.record_trial(
//!         id,
//!         BTreeMap::from([
//!             ("structure_score".to_string(), score),
//!             ("content_score".to_string(), score - 0.5),
//!         ]),
//!         Metadata::new(),
//!     )?;
//! }
//!
//! let report = experiment.analyze_results()?;
//! assert_eq!(report.baseline_variant(), Some("baseline"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod experiment;
pub mod feedback;
pub mod persist;
pub mod stats;

pub use error::{Error, Result};

/// Arbitrary JSON-object metadata attached to records.
///
/// Callers use this for anything the store does not interpret: model names,
/// temperatures, article titles, keyword lists.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
