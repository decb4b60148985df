//! CSV scoring worksheets: fully specified indicator rows grouped by case number.
//!
//! Expected header: `case_number,indicator_id,severity,weight,category_weight,confidence`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::scoring::{
    IndicatorId, IndicatorScore, PriorityScorer, ScoreBreakdown, ScoreExplanation, ScoringError,
    Severity,
};

#[derive(Debug)]
pub enum WorksheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, problem: RowProblem },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowProblem {
    MissingCaseNumber,
    Severity(ScoringError),
    Weight(f64),
    CategoryWeight(f64),
    Confidence(f64),
}

impl fmt::Display for RowProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowProblem::MissingCaseNumber => write!(f, "case_number is empty"),
            RowProblem::Severity(err) => write!(f, "{}", err),
            RowProblem::Weight(value) => {
                write!(f, "weight {} must be finite and non-negative", value)
            }
            RowProblem::CategoryWeight(value) => {
                write!(f, "category_weight {} must be finite and non-negative", value)
            }
            RowProblem::Confidence(value) => {
                write!(f, "confidence {} must be within [0, 1]", value)
            }
        }
    }
}

impl fmt::Display for WorksheetImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorksheetImportError::Io(err) => write!(f, "failed to read worksheet: {}", err),
            WorksheetImportError::Csv(err) => write!(f, "invalid worksheet CSV data: {}", err),
            WorksheetImportError::InvalidRow { line, problem } => {
                write!(f, "worksheet line {}: {}", line, problem)
            }
        }
    }
}

impl std::error::Error for WorksheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorksheetImportError::Io(err) => Some(err),
            WorksheetImportError::Csv(err) => Some(err),
            WorksheetImportError::InvalidRow {
                problem: RowProblem::Severity(err),
                ..
            } => Some(err),
            WorksheetImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for WorksheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for WorksheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct WorksheetRow {
    case_number: String,
    indicator_id: u32,
    severity: String,
    weight: f64,
    category_weight: f64,
    confidence: f64,
}

impl WorksheetRow {
    fn into_score(self) -> Result<(String, IndicatorScore), RowProblem> {
        if self.case_number.is_empty() {
            return Err(RowProblem::MissingCaseNumber);
        }
        let severity = self
            .severity
            .parse::<Severity>()
            .map_err(RowProblem::Severity)?;
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(RowProblem::Weight(self.weight));
        }
        if !(self.category_weight.is_finite() && self.category_weight >= 0.0) {
            return Err(RowProblem::CategoryWeight(self.category_weight));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(RowProblem::Confidence(self.confidence));
        }

        Ok((
            self.case_number,
            IndicatorScore {
                indicator_id: IndicatorId(self.indicator_id),
                severity,
                weight: self.weight,
                category_weight: self.category_weight,
                confidence_score: self.confidence,
            },
        ))
    }
}

/// Indicator rows for one case, in worksheet order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorksheetCase {
    pub case_number: String,
    pub indicators: Vec<IndicatorScore>,
}

/// Scored worksheet case ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorksheetResult {
    pub case_number: String,
    pub breakdown: ScoreBreakdown,
    pub explanation: ScoreExplanation,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoringWorksheet {
    pub cases: Vec<WorksheetCase>,
}

impl ScoringWorksheet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WorksheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, WorksheetImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut worksheet = ScoringWorksheet::default();

        for (index, row) in csv_reader.deserialize::<WorksheetRow>().enumerate() {
            // header occupies line 1
            let line = index + 2;
            let (case_number, score) = row?
                .into_score()
                .map_err(|problem| WorksheetImportError::InvalidRow { line, problem })?;

            match worksheet
                .cases
                .iter_mut()
                .find(|case| case.case_number == case_number)
            {
                Some(case) => case.indicators.push(score),
                None => worksheet.cases.push(WorksheetCase {
                    case_number,
                    indicators: vec![score],
                }),
            }
        }

        Ok(worksheet)
    }

    pub fn score(&self, scorer: &PriorityScorer) -> Vec<WorksheetResult> {
        self.cases
            .iter()
            .map(|case| {
                let breakdown = scorer.breakdown(&case.indicators);
                let explanation =
                    crate::scoring::ranking_explanation(breakdown.score, &case.indicators);
                WorksheetResult {
                    case_number: case.case_number.clone(),
                    breakdown,
                    explanation,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "case_number,indicator_id,severity,weight,category_weight,confidence\n";

    fn worksheet(rows: &str) -> Result<ScoringWorksheet, WorksheetImportError> {
        ScoringWorksheet::from_reader(Cursor::new(format!("{HEADER}{rows}")))
    }

    #[test]
    fn groups_rows_by_case_in_first_seen_order() {
        let sheet = worksheet(
            "CR2019-00001, 15, critical, 2.0, 1.5, 0.9\n\
             CR2017-00420, 5, high, 1.6, 1.3, 0.8\n\
             CR2019-00001, 14, Critical, 1.9, 1.5, 1.0\n",
        )
        .expect("worksheet parses");

        assert_eq!(sheet.cases.len(), 2);
        assert_eq!(sheet.cases[0].case_number, "CR2019-00001");
        assert_eq!(sheet.cases[0].indicators.len(), 2);
        assert_eq!(sheet.cases[0].indicators[1].severity, Severity::Critical);
        assert_eq!(sheet.cases[1].indicators[0].indicator_id, IndicatorId(5));
    }

    #[test]
    fn unknown_severity_fails_with_line_number() {
        let err = worksheet(
            "CR2019-00001,15,critical,2.0,1.5,0.9\n\
             CR2019-00001,14,severe,1.9,1.5,1.0\n",
        )
        .expect_err("unknown severity rejected");

        match err {
            WorksheetImportError::InvalidRow {
                line,
                problem: RowProblem::Severity(ScoringError::UnknownSeverity(value)),
            } => {
                assert_eq!(line, 3);
                assert_eq!(value, "severe");
            }
            other => panic!("expected severity error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_confidence_and_negative_weights() {
        let confidence = worksheet("CR1,1,low,1.0,1.0,1.5\n").expect_err("confidence rejected");
        assert!(matches!(
            confidence,
            WorksheetImportError::InvalidRow {
                problem: RowProblem::Confidence(_),
                ..
            }
        ));

        let weight = worksheet("CR1,1,low,-1.0,1.0,0.5\n").expect_err("weight rejected");
        assert!(matches!(
            weight,
            WorksheetImportError::InvalidRow {
                problem: RowProblem::Weight(_),
                ..
            }
        ));
    }

    #[test]
    fn malformed_numbers_surface_as_csv_errors() {
        let err = worksheet("CR1,one,low,1.0,1.0,0.5\n").expect_err("bad id rejected");

        assert!(matches!(err, WorksheetImportError::Csv(_)));
    }

    #[test]
    fn scores_each_case_with_matching_explanation() {
        let sheet = worksheet("CR2020-00001,7,high,2.0,1.0,1.0\n").expect("worksheet parses");

        let results = sheet.score(&PriorityScorer::default());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].breakdown.score, 4.4);
        assert_eq!(results[0].explanation.score, 4.4);
        assert_eq!(results[0].explanation.level, "Lower Priority");
    }

    #[test]
    fn empty_worksheet_has_no_cases() {
        let sheet = worksheet("").expect("header only parses");

        assert!(sheet.cases.is_empty());
    }
}
