//! Priority scoring and case management for wrongful-conviction review.
//!
//! Flagged cases collect innocence indicators from a weighted catalog. Each change to a
//! case's indicators rescores it through [`scoring::PriorityScorer`], and the stored score
//! drives the review queue ordering.

pub mod cases;
pub mod catalog;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod mock;
pub mod scoring;
pub mod telemetry;

pub use scoring::{calculate_priority_score, ranking_explanation, PriorityScorer};
