use super::domain::{CaseFile, CaseId, CaseRecord};
use super::filter::CaseFilter;

/// Storage abstraction so the service can run against any case store.
pub trait CaseRepository: Send + Sync {
    /// Store a new case file. Duplicate ids or case numbers conflict.
    fn insert(&self, file: CaseFile) -> Result<CaseFile, RepositoryError>;
    fn update(&self, file: CaseFile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: CaseId) -> Result<Option<CaseFile>, RepositoryError>;
    fn list(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("case already exists")]
    Conflict,
    #[error("case not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
