use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scoring::{IndicatorId, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub u64);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Review lifecycle of a flagged case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Flagged,
    Claimed,
    UnderInvestigation,
    Closed,
    Exonerated,
}

impl CaseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CaseStatus::Flagged => "flagged",
            CaseStatus::Claimed => "claimed",
            CaseStatus::UnderInvestigation => "under_investigation",
            CaseStatus::Closed => "closed",
            CaseStatus::Exonerated => "exonerated",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid case status '{0}'")]
pub struct InvalidStatus(pub String);

impl FromStr for CaseStatus {
    type Err = InvalidStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "flagged" => Ok(CaseStatus::Flagged),
            "claimed" => Ok(CaseStatus::Claimed),
            "under_investigation" => Ok(CaseStatus::UnderInvestigation),
            "closed" => Ok(CaseStatus::Closed),
            "exonerated" => Ok(CaseStatus::Exonerated),
            _ => Err(InvalidStatus(value.to_string())),
        }
    }
}

/// Defendant details kept for disparity reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Demographics {
    pub age_at_conviction: Option<u8>,
    pub race: Option<String>,
    pub gender: Option<String>,
}

/// Organization and investigator that took ownership of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseClaim {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub claimed_at: DateTime<Utc>,
}

/// Intake payload for a newly flagged case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCase {
    pub case_number: String,
    pub defendant_name: String,
    pub conviction_date: Option<NaiveDate>,
    pub sentence: Option<String>,
    pub crime_charged: String,
    pub county: String,
    pub court_name: Option<String>,
    pub demographics: Option<Demographics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: CaseId,
    pub case_number: String,
    pub defendant_name: String,
    pub conviction_date: Option<NaiveDate>,
    pub sentence: Option<String>,
    pub crime_charged: String,
    pub county: String,
    pub court_name: Option<String>,
    pub status: CaseStatus,
    pub priority_score: Option<f64>,
    pub claim: Option<CaseClaim>,
    pub demographics: Option<Demographics>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CaseRecord {
    pub(crate) fn flagged(id: CaseId, intake: NewCase, now: DateTime<Utc>) -> Self {
        let NewCase {
            case_number,
            defendant_name,
            conviction_date,
            sentence,
            crime_charged,
            county,
            court_name,
            demographics,
        } = intake;

        Self {
            id,
            case_number,
            defendant_name,
            conviction_date,
            sentence,
            crime_charged,
            county,
            court_name,
            status: CaseStatus::Flagged,
            priority_score: None,
            claim: None,
            demographics,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Transcript,
    PoliceReport,
    CourtRuling,
    AppellateBrief,
    Other,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::Transcript => "transcript",
            DocumentType::PoliceReport => "police_report",
            DocumentType::CourtRuling => "court_ruling",
            DocumentType::AppellateBrief => "appellate_brief",
            DocumentType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid document type '{0}'")]
pub struct InvalidDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = InvalidDocumentType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "transcript" => Ok(DocumentType::Transcript),
            "police_report" => Ok(DocumentType::PoliceReport),
            "court_ruling" => Ok(DocumentType::CourtRuling),
            "appellate_brief" => Ok(DocumentType::AppellateBrief),
            "other" => Ok(DocumentType::Other),
            _ => Err(InvalidDocumentType(value.to_string())),
        }
    }
}

/// Pointer into a source document supporting an indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCitation {
    pub document_type: DocumentType,
    pub page_number: u32,
    pub line_number: Option<u32>,
    pub quoted_text: String,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
}

/// An indicator attached to a case with the strength of evidence for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseIndicator {
    pub indicator_id: IndicatorId,
    pub confidence_score: f64,
    pub citations: Vec<EvidenceCitation>,
}

/// Aggregate persisted by repositories: the case plus its attached indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFile {
    pub record: CaseRecord,
    pub indicators: Vec<CaseIndicator>,
}

impl CaseFile {
    pub fn indicator(&self, id: IndicatorId) -> Option<&CaseIndicator> {
        self.indicators
            .iter()
            .find(|indicator| indicator.indicator_id == id)
    }

    pub(crate) fn indicator_mut(&mut self, id: IndicatorId) -> Option<&mut CaseIndicator> {
        self.indicators
            .iter_mut()
            .find(|indicator| indicator.indicator_id == id)
    }
}

/// Attached indicator joined with its catalog definition for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseIndicatorView {
    pub indicator_id: IndicatorId,
    pub name: String,
    pub severity: Severity,
    pub category: String,
    pub confidence_score: f64,
    pub citations: Vec<EvidenceCitation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub record: CaseRecord,
    pub indicators: Vec<CaseIndicatorView>,
}

/// Case listed for an organization together with how many indicators it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimedCaseSummary {
    #[serde(flatten)]
    pub record: CaseRecord,
    pub indicator_count: usize,
}
