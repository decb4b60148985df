use serde::{Deserialize, Serialize};

use super::{IndicatorScore, Severity};

/// Coarse triage bucket derived from a priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Lower,
    Medium,
    High,
    Urgent,
}

impl PriorityTier {
    /// Thresholds are inclusive and checked from the top down.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            PriorityTier::Urgent
        } else if score >= 50.0 {
            PriorityTier::High
        } else if score >= 25.0 {
            PriorityTier::Medium
        } else {
            PriorityTier::Lower
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PriorityTier::Urgent => "Urgent Priority",
            PriorityTier::High => "High Priority",
            PriorityTier::Medium => "Medium Priority",
            PriorityTier::Lower => "Lower Priority",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            PriorityTier::Urgent => {
                "Immediate investigation recommended - multiple strong indicators present"
            }
            PriorityTier::High => {
                "Priority investigation recommended - significant indicators present"
            }
            PriorityTier::Medium => "Investigation warranted - review indicators carefully",
            PriorityTier::Lower => "Further review may be needed depending on resources",
        }
    }
}

/// Indicator counts per severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub indicator_count: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
}

impl SeverityBreakdown {
    pub fn from_indicators(indicators: &[IndicatorScore]) -> Self {
        let count = |severity: Severity| {
            indicators
                .iter()
                .filter(|indicator| indicator.severity == severity)
                .count()
        };

        Self {
            indicator_count: indicators.len(),
            critical_count: count(Severity::Critical),
            high_count: count(Severity::High),
            medium_count: count(Severity::Medium),
            low_count: count(Severity::Low),
        }
    }
}

/// Human-readable account of a priority score for dashboards and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub score: f64,
    pub tier: PriorityTier,
    pub level: String,
    pub recommendation: String,
    pub breakdown: SeverityBreakdown,
}

/// Explain a score previously computed for the same indicator set. The score is
/// echoed, never recomputed.
pub fn ranking_explanation(score: f64, indicators: &[IndicatorScore]) -> ScoreExplanation {
    let tier = PriorityTier::from_score(score);

    ScoreExplanation {
        score,
        tier,
        level: tier.label().to_string(),
        recommendation: tier.recommendation().to_string(),
        breakdown: SeverityBreakdown::from_indicators(indicators),
    }
}
