use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{IndicatorId, IndicatorScore};

/// High-value indicator pairing that raises a case's priority when present together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combination {
    pub label: &'static str,
    pub indicators: &'static [&'static str],
    pub bonus: f64,
}

pub static COMBINATIONS: [Combination; 3] = [
    Combination {
        label: "DNA + Misconduct",
        indicators: &["DNA Not Tested", "Brady Violations"],
        bonus: 1.5,
    },
    Combination {
        label: "Recantation + Weak Evidence",
        indicators: &["Witness Recantation", "Weak Prosecution Evidence"],
        bonus: 1.3,
    },
    Combination {
        label: "Multiple Appeals + New Evidence",
        indicators: &["Multiple Appeals", "New Exculpatory Evidence"],
        bonus: 1.4,
    },
];

/// A built-in combination mapped onto concrete catalog identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCombination {
    pub label: String,
    pub members: Vec<IndicatorId>,
    pub bonus: f64,
}

/// How the scorer decides that a combination is present in an indicator set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CombinationStrategy {
    /// A combination applies once the set holds at least as many indicators as the
    /// combination names, regardless of which indicators they are. Matches the
    /// scores already persisted by the legacy ranking service.
    #[default]
    IndicatorCount,
    /// A combination applies only when every member indicator is attached.
    NamedIndicators(Vec<ResolvedCombination>),
}

/// Combination that contributed a bonus candidate during scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedCombination {
    pub label: String,
    pub bonus: f64,
}

impl CombinationStrategy {
    pub fn applied(&self, indicators: &[IndicatorScore]) -> Vec<AppliedCombination> {
        match self {
            CombinationStrategy::IndicatorCount => COMBINATIONS
                .iter()
                .filter(|combination| indicators.len() >= combination.indicators.len())
                .map(|combination| AppliedCombination {
                    label: combination.label.to_string(),
                    bonus: combination.bonus,
                })
                .collect(),
            CombinationStrategy::NamedIndicators(rules) => {
                let present: HashSet<IndicatorId> =
                    indicators.iter().map(|score| score.indicator_id).collect();
                rules
                    .iter()
                    .filter(|rule| {
                        !rule.members.is_empty()
                            && rule.members.iter().all(|id| present.contains(id))
                    })
                    .map(|rule| AppliedCombination {
                        label: rule.label.clone(),
                        bonus: rule.bonus,
                    })
                    .collect()
            }
        }
    }

    /// Largest applicable bonus, never below 1.0.
    pub fn bonus(applied: &[AppliedCombination]) -> f64 {
        applied
            .iter()
            .fold(1.0_f64, |current, combination| current.max(combination.bonus))
    }

    pub fn label(&self) -> &'static str {
        match self {
            CombinationStrategy::IndicatorCount => "count",
            CombinationStrategy::NamedIndicators(_) => "named",
        }
    }
}
