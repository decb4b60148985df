//! Indicator definitions and the categories that weight them.

mod standard;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::scoring::{IndicatorId, IndicatorScore, ResolvedCombination, Severity, COMBINATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

/// Grouping of indicators sharing a category-level weight multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub weight: f64,
}

/// A named risk factor that can be attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    pub id: IndicatorId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub weight: f64,
}

/// An indicator joined with its category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorView<'a> {
    #[serde(flatten)]
    pub definition: &'a IndicatorDefinition,
    pub category_name: &'a str,
    pub category_weight: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate category id {0:?}")]
    DuplicateCategory(CategoryId),
    #[error("duplicate indicator id {0:?}")]
    DuplicateIndicator(IndicatorId),
    #[error("indicator '{indicator}' references unknown category {category:?}")]
    UnknownCategory {
        indicator: String,
        category: CategoryId,
    },
    #[error("'{name}' has invalid weight {weight}: weights must be positive and finite")]
    InvalidWeight { name: String, weight: f64 },
}

#[derive(Debug, Clone)]
pub struct IndicatorCatalog {
    categories: Vec<IndicatorCategory>,
    indicators: Vec<IndicatorDefinition>,
}

impl IndicatorCatalog {
    pub fn new(
        categories: Vec<IndicatorCategory>,
        indicators: Vec<IndicatorDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut category_ids = HashSet::new();
        for category in &categories {
            check_weight(&category.name, category.weight)?;
            if !category_ids.insert(category.id) {
                return Err(CatalogError::DuplicateCategory(category.id));
            }
        }

        let mut indicator_ids = HashSet::new();
        for indicator in &indicators {
            check_weight(&indicator.name, indicator.weight)?;
            if !category_ids.contains(&indicator.category_id) {
                return Err(CatalogError::UnknownCategory {
                    indicator: indicator.name.clone(),
                    category: indicator.category_id,
                });
            }
            if !indicator_ids.insert(indicator.id) {
                return Err(CatalogError::DuplicateIndicator(indicator.id));
            }
        }

        Ok(Self {
            categories,
            indicators,
        })
    }

    /// Built-in catalog covering confessions, eyewitness identification, forensics,
    /// official misconduct, and post-conviction developments.
    pub fn standard() -> Self {
        Self {
            categories: standard::categories(),
            indicators: standard::indicators(),
        }
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = IndicatorId> + '_ {
        self.indicators.iter().map(|indicator| indicator.id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&IndicatorCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Categories ordered by name.
    pub fn categories(&self) -> Vec<&IndicatorCategory> {
        let mut categories: Vec<_> = self.categories.iter().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    pub fn find(&self, id: IndicatorId) -> Option<IndicatorView<'_>> {
        self.indicators
            .iter()
            .find(|indicator| indicator.id == id)
            .and_then(|indicator| self.view(indicator))
    }

    pub fn find_by_name(&self, name: &str) -> Option<IndicatorView<'_>> {
        let needle = name.trim();
        self.indicators
            .iter()
            .find(|indicator| indicator.name.eq_ignore_ascii_case(needle))
            .and_then(|indicator| self.view(indicator))
    }

    /// Every indicator, ordered by category name, severity (most severe first), then name.
    pub fn all(&self) -> Vec<IndicatorView<'_>> {
        let mut views: Vec<_> = self
            .indicators
            .iter()
            .filter_map(|indicator| self.view(indicator))
            .collect();
        views.sort_by(|a, b| {
            a.category_name
                .cmp(b.category_name)
                .then_with(|| b.definition.severity.cmp(&a.definition.severity))
                .then_with(|| a.definition.name.cmp(&b.definition.name))
        });
        views
    }

    /// Indicators in one category, most severe first.
    pub fn by_category(&self, category_id: CategoryId) -> Vec<IndicatorView<'_>> {
        let mut views: Vec<_> = self
            .indicators
            .iter()
            .filter(|indicator| indicator.category_id == category_id)
            .filter_map(|indicator| self.view(indicator))
            .collect();
        views.sort_by(|a, b| {
            b.definition
                .severity
                .cmp(&a.definition.severity)
                .then_with(|| a.definition.name.cmp(&b.definition.name))
        });
        views
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<IndicatorView<'_>> {
        let mut views: Vec<_> = self
            .indicators
            .iter()
            .filter(|indicator| indicator.severity == severity)
            .filter_map(|indicator| self.view(indicator))
            .collect();
        views.sort_by(|a, b| {
            a.category_name
                .cmp(b.category_name)
                .then_with(|| a.definition.name.cmp(&b.definition.name))
        });
        views
    }

    /// Join an attached indicator with its definition and category for scoring.
    pub fn score_input(&self, id: IndicatorId, confidence: f64) -> Option<IndicatorScore> {
        self.find(id).map(|view| IndicatorScore {
            indicator_id: id,
            severity: view.definition.severity,
            weight: view.definition.weight,
            category_weight: view.category_weight,
            confidence_score: confidence,
        })
    }

    /// Map the built-in combinations onto this catalog's identifiers.
    pub fn resolve_combinations(&self) -> Vec<ResolvedCombination> {
        COMBINATIONS
            .iter()
            .filter_map(|combination| {
                let mut members = Vec::with_capacity(combination.indicators.len());
                for name in combination.indicators {
                    match self.find_by_name(name) {
                        Some(view) => members.push(view.definition.id),
                        None => {
                            warn!(
                                combination = combination.label,
                                indicator = name,
                                "combination skipped: indicator missing from catalog"
                            );
                            return None;
                        }
                    }
                }

                Some(ResolvedCombination {
                    label: combination.label.to_string(),
                    members,
                    bonus: combination.bonus,
                })
            })
            .collect()
    }

    fn view<'a>(&'a self, indicator: &'a IndicatorDefinition) -> Option<IndicatorView<'a>> {
        self.category(indicator.category_id)
            .map(|category| IndicatorView {
                definition: indicator,
                category_name: &category.name,
                category_weight: category.weight,
            })
    }
}

fn check_weight(name: &str, weight: f64) -> Result<(), CatalogError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidWeight {
            name: name.to_string(),
            weight,
        })
    }
}
