use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;

use crate::catalog::IndicatorCatalog;
use crate::cases::domain::{
    CaseFile, CaseId, CaseRecord, Demographics, DocumentType, EvidenceCitation, NewCase,
};
use crate::cases::filter::CaseFilter;
use crate::cases::repository::{CaseRepository, RepositoryError};
use crate::cases::CaseTriageService;
use crate::scoring::{IndicatorId, PriorityScorer};

pub(super) fn intake(case_number: &str, county: &str) -> NewCase {
    NewCase {
        case_number: case_number.to_string(),
        defendant_name: "Marcus Johnson".to_string(),
        conviction_date: NaiveDate::from_ymd_opt(2017, 6, 14),
        sentence: Some("25 years to life".to_string()),
        crime_charged: "Armed robbery".to_string(),
        county: county.to_string(),
        court_name: Some(format!("{county} County Superior Court")),
        demographics: Some(Demographics {
            age_at_conviction: Some(19),
            race: Some("Black".to_string()),
            gender: Some("Male".to_string()),
        }),
    }
}

pub(super) fn citation(page: u32, line: Option<u32>) -> EvidenceCitation {
    EvidenceCitation {
        document_type: DocumentType::Transcript,
        page_number: page,
        line_number: line,
        quoted_text: "The identification was made from a single photograph.".to_string(),
        context_before: Some("Detective testimony, direct examination".to_string()),
        context_after: None,
    }
}

pub(super) fn indicator_id(name: &str) -> IndicatorId {
    IndicatorCatalog::standard()
        .find_by_name(name)
        .map(|view| view.definition.id)
        .expect("indicator in standard catalog")
}

pub(super) fn build_service() -> (CaseTriageService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = CaseTriageService::new(
        repository.clone(),
        Arc::new(IndicatorCatalog::standard()),
        PriorityScorer::default(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) files: Arc<Mutex<HashMap<CaseId, CaseFile>>>,
}

impl CaseRepository for MemoryRepository {
    fn insert(&self, file: CaseFile) -> Result<CaseFile, RepositoryError> {
        let mut guard = self.files.lock().expect("repository mutex poisoned");
        if guard.contains_key(&file.record.id)
            || guard
                .values()
                .any(|existing| existing.record.case_number == file.record.case_number)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(file.record.id, file.clone());
        Ok(file)
    }

    fn update(&self, file: CaseFile) -> Result<(), RepositoryError> {
        let mut guard = self.files.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&file.record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(file.record.id, file);
        Ok(())
    }

    fn fetch(&self, id: CaseId) -> Result<Option<CaseFile>, RepositoryError> {
        let guard = self.files.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, RepositoryError> {
        let guard = self.files.lock().expect("repository mutex poisoned");
        Ok(filter.apply(guard.values().map(|file| file.record.clone())))
    }
}

pub(super) struct UnavailableRepository;

impl CaseRepository for UnavailableRepository {
    fn insert(&self, _file: CaseFile) -> Result<CaseFile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _file: CaseFile) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: CaseId) -> Result<Option<CaseFile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &CaseFilter) -> Result<Vec<CaseRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Memory repository whose reads stall, widening the gap between a service's read and
/// its write.
#[derive(Default, Clone)]
pub(super) struct SlowReadRepository {
    pub(super) inner: MemoryRepository,
    pub(super) fetch_delay: Duration,
}

impl CaseRepository for SlowReadRepository {
    fn insert(&self, file: CaseFile) -> Result<CaseFile, RepositoryError> {
        self.inner.insert(file)
    }

    fn update(&self, file: CaseFile) -> Result<(), RepositoryError> {
        self.inner.update(file)
    }

    fn fetch(&self, id: CaseId) -> Result<Option<CaseFile>, RepositoryError> {
        thread::sleep(self.fetch_delay);
        self.inner.fetch(id)
    }

    fn list(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, RepositoryError> {
        self.inner.list(filter)
    }
}
