//! Pattern scan of court documents for innocence indicators.
//!
//! Each rule is a set of case-insensitive patterns tied to one catalog indicator. The
//! first matching pattern flags the indicator at the rule's confidence, and up to three
//! hits are kept as excerpts that can be recorded as citations.

mod rules;

pub use rules::DetectorFamily;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cases::{DocumentType, EvidenceCitation};
use crate::catalog::IndicatorCatalog;
use crate::scoring::IndicatorId;

use rules::{
    Rule, EXTENDED_INTERROGATION_CONFIDENCE, EXTENDED_INTERROGATION_HOURS, INTERROGATION_HOURS,
    LONG_INTERROGATION, RULES,
};

const CONTEXT_CHARS: usize = 100;
const MAX_EXCERPTS: usize = 3;
const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("pattern '{pattern}' for '{indicator}' does not compile: {source}")]
    Pattern {
        indicator: &'static str,
        pattern: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Document text to scan. Form feeds separate pages.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDocument {
    pub document_type: DocumentType,
    pub content: String,
}

impl CaseDocument {
    pub fn new(document_type: DocumentType, content: impl Into<String>) -> Self {
        Self {
            document_type,
            content: content.into(),
        }
    }
}

/// A pattern hit with up to 100 characters of surrounding text on each side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excerpt {
    pub document_type: DocumentType,
    pub page_number: u32,
    pub line_number: u32,
    pub quoted_text: String,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
}

impl Excerpt {
    pub fn to_citation(&self) -> EvidenceCitation {
        EvidenceCitation {
            document_type: self.document_type,
            page_number: self.page_number,
            line_number: Some(self.line_number),
            quoted_text: self.quoted_text.clone(),
            context_before: self.context_before.clone(),
            context_after: self.context_after.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub family: DetectorFamily,
    pub indicator_id: IndicatorId,
    pub indicator: String,
    pub confidence: f64,
    pub excerpts: Vec<Excerpt>,
}

struct CompiledRule {
    family: DetectorFamily,
    indicator_id: IndicatorId,
    indicator: &'static str,
    confidence: f64,
    patterns: Vec<Regex>,
}

pub struct TranscriptAnalyzer {
    rules: Vec<CompiledRule>,
    interrogation_hours: Regex,
}

impl TranscriptAnalyzer {
    /// Compile the built-in rules against `catalog`. Rules naming an indicator the
    /// catalog lacks are skipped with a warning.
    pub fn new(catalog: &IndicatorCatalog) -> Result<Self, DetectError> {
        let mut compiled = Vec::with_capacity(RULES.len());

        for rule in RULES {
            let Some(view) = catalog.find_by_name(rule.indicator) else {
                warn!(
                    indicator = rule.indicator,
                    "detection rule names an indicator missing from the catalog; skipped"
                );
                continue;
            };

            let patterns = rule
                .patterns
                .iter()
                .map(|&pattern| compile(rule, pattern))
                .collect::<Result<Vec<_>, _>>()?;

            compiled.push(CompiledRule {
                family: rule.family,
                indicator_id: view.definition.id,
                indicator: rule.indicator,
                confidence: rule.confidence,
                patterns,
            });
        }

        let interrogation_hours = RegexBuilder::new(INTERROGATION_HOURS)
            .case_insensitive(true)
            .build()
            .map_err(|source| DetectError::Pattern {
                indicator: LONG_INTERROGATION,
                pattern: INTERROGATION_HOURS,
                source,
            })?;

        Ok(Self {
            rules: compiled,
            interrogation_hours,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Indicators flagged by a single document, in rule order.
    pub fn analyze_document(&self, document: &CaseDocument) -> Vec<Detection> {
        let text = document.content.as_str();
        let detections: Vec<Detection> = self
            .rules
            .iter()
            .filter(|rule| rule.patterns.iter().any(|pattern| pattern.is_match(text)))
            .map(|rule| Detection {
                family: rule.family,
                indicator_id: rule.indicator_id,
                indicator: rule.indicator.to_string(),
                confidence: self.confidence(rule, text),
                excerpts: excerpts(document, &rule.patterns),
            })
            .collect();

        debug!(
            document_type = ?document.document_type,
            detections = detections.len(),
            "document analyzed"
        );
        detections
    }

    /// Scan every document and merge repeat detections of the same indicator. Each
    /// repeat averages its confidence into the running value and appends its excerpts.
    pub fn analyze_case(&self, documents: &[CaseDocument]) -> Vec<Detection> {
        let mut merged: Vec<Detection> = Vec::new();

        for detection in documents
            .iter()
            .flat_map(|document| self.analyze_document(document))
        {
            match merged
                .iter_mut()
                .find(|existing| existing.indicator_id == detection.indicator_id)
            {
                Some(existing) => {
                    existing.confidence = (existing.confidence + detection.confidence) / 2.0;
                    existing.excerpts.extend(detection.excerpts);
                }
                None => merged.push(detection),
            }
        }

        merged
    }

    fn confidence(&self, rule: &CompiledRule, text: &str) -> f64 {
        if rule.indicator != LONG_INTERROGATION {
            return rule.confidence;
        }

        let hours = self
            .interrogation_hours
            .captures(text)
            .and_then(|captures| captures.get(1));
        match hours {
            // digits that overflow u32 are still a long interrogation
            Some(hours) => match hours.as_str().parse::<u32>() {
                Ok(hours) if hours < EXTENDED_INTERROGATION_HOURS => rule.confidence,
                _ => EXTENDED_INTERROGATION_CONFIDENCE,
            },
            None => rule.confidence,
        }
    }
}

fn compile(rule: &Rule, pattern: &'static str) -> Result<Regex, DetectError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| DetectError::Pattern {
            indicator: rule.indicator,
            pattern,
            source,
        })
}

fn excerpts(document: &CaseDocument, patterns: &[Regex]) -> Vec<Excerpt> {
    let text = document.content.as_str();

    patterns
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .take(MAX_EXCERPTS)
        .map(|hit| {
            let (page_number, line_number) = position(text, hit.start());
            Excerpt {
                document_type: document.document_type,
                page_number,
                line_number,
                quoted_text: hit.as_str().to_string(),
                context_before: non_empty(&text[window_start(text, hit.start())..hit.start()]),
                context_after: non_empty(&text[hit.end()..window_end(text, hit.end())]),
            }
        })
        .collect()
}

fn window_start(text: &str, at: usize) -> usize {
    text[..at]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(index, _)| index)
}

fn window_end(text: &str, at: usize) -> usize {
    text[at..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(text.len(), |(index, _)| at + index)
}

/// One-based page (form-feed separated) and line within that page.
fn position(text: &str, at: usize) -> (u32, u32) {
    let before = &text[..at];
    let page_start = before.rfind(PAGE_BREAK).map_or(0, |index| index + 1);
    let page = before.matches(PAGE_BREAK).count() + 1;
    let line = before[page_start..].matches('\n').count() + 1;
    (
        u32::try_from(page).unwrap_or(u32::MAX),
        u32::try_from(line).unwrap_or(u32::MAX),
    )
}

fn non_empty(context: &str) -> Option<String> {
    let trimmed = context.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
