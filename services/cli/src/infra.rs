use case_triage::cases::{
    CaseFile, CaseFilter, CaseId, CaseRecord, CaseRepository, RepositoryError,
};
use case_triage::config::CombinationMode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local case store backing the CLI commands.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCaseRepository {
    files: Arc<Mutex<HashMap<CaseId, CaseFile>>>,
}

impl InMemoryCaseRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CaseId, CaseFile>>, RepositoryError> {
        self.files
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl CaseRepository for InMemoryCaseRepository {
    fn insert(&self, file: CaseFile) -> Result<CaseFile, RepositoryError> {
        let mut guard = self.lock()?;
        let duplicate_number = guard
            .values()
            .any(|existing| existing.record.case_number == file.record.case_number);
        if guard.contains_key(&file.record.id) || duplicate_number {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(file.record.id, file.clone());
        Ok(file)
    }

    fn update(&self, file: CaseFile) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&file.record.id) {
            guard.insert(file.record.id, file);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: CaseId) -> Result<Option<CaseFile>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(filter.apply(guard.values().map(|file| file.record.clone())))
    }
}

pub(crate) fn parse_combination_mode(raw: &str) -> Result<CombinationMode, String> {
    CombinationMode::parse(raw)
        .ok_or_else(|| format!("unknown combination mode '{raw}' (expected count or named)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_triage::catalog::IndicatorCatalog;
    use case_triage::cases::{CaseTriageService, NewCase};
    use case_triage::scoring::PriorityScorer;

    fn intake(case_number: &str) -> NewCase {
        NewCase {
            case_number: case_number.to_string(),
            defendant_name: "Jordan Doe".to_string(),
            conviction_date: None,
            sentence: None,
            crime_charged: "Burglary".to_string(),
            county: "Fresno".to_string(),
            court_name: None,
            demographics: None,
        }
    }

    #[test]
    fn repository_rejects_duplicate_case_numbers() {
        let repository = Arc::new(InMemoryCaseRepository::default());
        let service = CaseTriageService::new(
            repository.clone(),
            Arc::new(IndicatorCatalog::standard()),
            PriorityScorer::default(),
        );

        service.flag(intake("CR2019-00042")).expect("first intake");
        let err = service.flag(intake("CR2019-00042")).unwrap_err();

        assert_eq!(err.to_string(), "case already exists");
        assert_eq!(
            repository
                .list(&CaseFilter::default())
                .expect("list")
                .len(),
            1
        );
    }

    #[test]
    fn update_requires_existing_case() {
        let repository = InMemoryCaseRepository::default();
        let service = CaseTriageService::new(
            Arc::new(repository.clone()),
            Arc::new(IndicatorCatalog::standard()),
            PriorityScorer::default(),
        );
        let record = service.flag(intake("CR2020-00001")).expect("intake");
        let mut file = repository
            .fetch(record.id)
            .expect("fetch")
            .expect("stored");

        file.record.id = CaseId(99);
        assert!(matches!(
            repository.update(file),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn combination_mode_parser_reports_choices() {
        assert_eq!(parse_combination_mode("Named"), Ok(CombinationMode::Named));
        let err = parse_combination_mode("pairs").unwrap_err();
        assert!(err.contains("count or named"));
    }
}
