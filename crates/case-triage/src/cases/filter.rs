use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::domain::{CaseRecord, CaseStatus};

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Listing criteria for the case dashboard. Results are always ranked by priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFilter {
    #[serde(default)]
    pub status: Option<CaseStatus>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub min_priority: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for CaseFilter {
    fn default() -> Self {
        Self {
            status: None,
            county: None,
            min_priority: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

impl CaseFilter {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &CaseRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }

        if let Some(county) = &self.county {
            if !record.county.eq_ignore_ascii_case(county.trim()) {
                return false;
            }
        }

        if let Some(min_priority) = self.min_priority {
            match record.priority_score {
                Some(score) if score >= min_priority => {}
                _ => return false,
            }
        }

        true
    }

    /// Filter, rank (highest priority first, unscored cases last), then page.
    pub fn apply<I>(&self, records: I) -> Vec<CaseRecord>
    where
        I: IntoIterator<Item = CaseRecord>,
    {
        let mut matching: Vec<CaseRecord> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        matching.sort_by(rank_order);

        matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

pub(crate) fn rank_order(a: &CaseRecord, b: &CaseRecord) -> Ordering {
    match (a.priority_score, b.priority_score) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}
