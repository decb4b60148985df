//! Case records, their attached indicators, and the service that keeps each case's
//! priority score current.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CaseClaim, CaseDetail, CaseFile, CaseId, CaseIndicator, CaseIndicatorView, CaseRecord,
    CaseStatus, ClaimedCaseSummary, Demographics, DocumentType, EvidenceCitation,
    InvalidDocumentType, InvalidStatus, NewCase, OrganizationId, UserId,
};
pub use filter::{CaseFilter, DEFAULT_LIST_LIMIT};
pub use repository::{CaseRepository, RepositoryError};
pub use service::{CaseServiceError, CaseTriageService};
