//! Human feedback collection: criteria, responses, and weighted scoring
//!
//! ## Schema Overview
//!
//! ```text
//! FeedbackStore (1) ──< Criterion (N)  [discrete rating scales]
//!        │
//!        └──< FeedbackResponse (N)  [append-only, one per rater submission]
//! ```
//!
//! A [`Criterion`] defines one axis of human evaluation (a discrete
//! [`ScaleLevel`] list plus an aggregation weight); a [`FeedbackResponse`]
//! carries one rater's values for every registered criterion. The
//! [`FeedbackStore`] validates submissions against the scales, persists
//! write-through under a single fixed document key, and computes weighted
//! per-article scores and global descriptive statistics.

mod criterion;
mod report;
mod response;
mod store;

pub use criterion::{Criterion, ScaleLevel};
pub use report::{ArticleScore, CriterionStats, FeedbackStats, TimeRange};
pub use response::{FeedbackResponse, FeedbackResponseBuilder};
pub use store::FeedbackStore;
