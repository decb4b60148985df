//! Priority scoring for flagged cases.
//!
//! A case's score is a pure function of the indicator records attached to it when the
//! scorer runs: each indicator contributes `weight x category weight x severity
//! multiplier x confidence`, and the sum is scaled by corroboration (indicator count),
//! combination and critical-severity bonuses before being clamped to 100.

mod combination;
mod explanation;
mod severity;


pub use combination::{
    AppliedCombination, Combination, CombinationStrategy, ResolvedCombination, COMBINATIONS,
};
pub use explanation::{ranking_explanation, PriorityTier, ScoreExplanation, SeverityBreakdown};
pub use severity::Severity;

use serde::{Deserialize, Serialize};
use std::fmt;

const COUNT_STEP: f64 = 0.1;
const MAX_COUNT_BOOST: f64 = 1.0;
const CRITICAL_BONUS: f64 = 1.2;
const MAX_SCORE: f64 = 100.0;

/// Identifier of an indicator definition in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndicatorId(pub u32);

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One indicator attached to a case, joined with its definition and category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub indicator_id: IndicatorId,
    pub severity: Severity,
    pub weight: f64,
    pub category_weight: f64,
    pub confidence_score: f64,
}

impl IndicatorScore {
    pub fn contribution(&self) -> f64 {
        self.weight * self.category_weight * self.severity.multiplier() * self.confidence_score
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("unknown severity '{0}': expected one of low, medium, high, critical")]
    UnknownSeverity(String),
}

/// Intermediate factors of a score, kept for audit output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub count_multiplier: f64,
    pub combination_bonus: f64,
    pub combinations: Vec<AppliedCombination>,
    pub critical_bonus: f64,
    pub raw_score: f64,
    pub score: f64,
}

/// Stateless scorer; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct PriorityScorer {
    strategy: CombinationStrategy,
}

impl PriorityScorer {
    pub fn new(strategy: CombinationStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &CombinationStrategy {
        &self.strategy
    }

    pub fn score(&self, indicators: &[IndicatorScore]) -> f64 {
        self.breakdown(indicators).score
    }

    pub fn breakdown(&self, indicators: &[IndicatorScore]) -> ScoreBreakdown {
        if indicators.is_empty() {
            return ScoreBreakdown {
                base_score: 0.0,
                count_multiplier: 1.0,
                combination_bonus: 1.0,
                combinations: Vec::new(),
                critical_bonus: 1.0,
                raw_score: 0.0,
                score: 0.0,
            };
        }

        let base_score: f64 = indicators.iter().map(IndicatorScore::contribution).sum();
        let count_multiplier =
            1.0 + (indicators.len() as f64 * COUNT_STEP).min(MAX_COUNT_BOOST);

        let combinations = self.strategy.applied(indicators);
        let combination_bonus = CombinationStrategy::bonus(&combinations);

        let critical_bonus = if indicators
            .iter()
            .any(|indicator| indicator.severity == Severity::Critical)
        {
            CRITICAL_BONUS
        } else {
            1.0
        };

        let raw_score = base_score * count_multiplier * combination_bonus * critical_bonus;
        let score = round_to_cents(raw_score.min(MAX_SCORE));

        ScoreBreakdown {
            base_score,
            count_multiplier,
            combination_bonus,
            combinations,
            critical_bonus,
            raw_score,
            score,
        }
    }

    pub fn explain(&self, indicators: &[IndicatorScore]) -> ScoreExplanation {
        ranking_explanation(self.score(indicators), indicators)
    }
}

/// Score an indicator set with the count-based combination check.
pub fn calculate_priority_score(indicators: &[IndicatorScore]) -> f64 {
    PriorityScorer::default().score(indicators)
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
