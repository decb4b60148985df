use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use case_triage::cases::{
    CaseFile, CaseFilter, CaseId, CaseRecord, CaseRepository, CaseStatus, CaseTriageService,
    DocumentType, EvidenceCitation, NewCase, OrganizationId, RepositoryError, UserId,
};
use case_triage::catalog::IndicatorCatalog;
use case_triage::config::{CombinationMode, ScoringConfig};
use case_triage::import::ScoringWorksheet;
use case_triage::mock::MockCaseGenerator;
use case_triage::scoring::{IndicatorId, PriorityTier};

#[derive(Default)]
struct SharedRepository {
    files: Mutex<HashMap<CaseId, CaseFile>>,
    fetch_delay: Duration,
}

impl CaseRepository for SharedRepository {
    fn insert(&self, file: CaseFile) -> Result<CaseFile, RepositoryError> {
        let mut guard = self.files.lock().expect("repository mutex poisoned");
        if guard
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
        match guard.get_mut(&file.record.id) {
            Some(existing) => {
                *existing = file;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: CaseId) -> Result<Option<CaseFile>, RepositoryError> {
        std::thread::sleep(self.fetch_delay);
        Ok(self
            .files
            .lock()
            .expect("repository mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn list(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, RepositoryError> {
        let guard = self.files.lock().expect("repository mutex poisoned");
        Ok(filter.apply(guard.values().map(|file| file.record.clone())))
    }
}

fn service(mode: CombinationMode) -> CaseTriageService<SharedRepository> {
    CaseTriageService::from_config(
        Arc::new(SharedRepository::default()),
        Arc::new(IndicatorCatalog::standard()),
        &ScoringConfig {
            combination_mode: mode,
        },
    )
}

fn intake(case_number: &str, county: &str) -> NewCase {
    NewCase {
        case_number: case_number.to_string(),
        defendant_name: "Luis Garcia".to_string(),
        conviction_date: chrono::NaiveDate::from_ymd_opt(2016, 3, 2),
        sentence: Some("15 years to life".to_string()),
        crime_charged: "Manslaughter".to_string(),
        county: county.to_string(),
        court_name: Some(format!("{county} County Superior Court")),
        demographics: None,
    }
}

fn citation(page_number: u32) -> EvidenceCitation {
    EvidenceCitation {
        document_type: DocumentType::Transcript,
        page_number,
        line_number: None,
        quoted_text: "Counsel did not object.".to_string(),
        context_before: None,
        context_after: None,
    }
}

fn id(catalog: &IndicatorCatalog, name: &str) -> IndicatorId {
    catalog
        .find_by_name(name)
        .map(|view| view.definition.id)
        .expect("indicator in standard catalog")
}

#[test]
fn flagged_case_moves_through_scoring_and_review() {
    let service = service(CombinationMode::Count);
    let dna = id(service.catalog(), "DNA Not Tested");
    let brady = id(service.catalog(), "Brady Violations");
    let appeals = id(service.catalog(), "Multiple Appeals");

    let record = service
        .flag(intake("CR2016-01234", "Alameda"))
        .expect("case flagged");
    assert_eq!(record.priority_score, None);

    service.attach_indicator(record.id, dna, 1.0).expect("dna");
    let scored = service
        .attach_indicator(record.id, brady, 1.0)
        .expect("brady");
    assert_eq!(scored.priority_score, Some(37.91));

    let explanation = service.explain(record.id).expect("explanation");
    assert_eq!(explanation.tier, PriorityTier::Medium);
    assert_eq!(explanation.breakdown.critical_count, 2);

    let rescored = service
        .attach_indicator(record.id, appeals, 1.0)
        .expect("appeals");
    assert_eq!(rescored.priority_score, Some(43.31));

    let claimed = service
        .claim(record.id, OrganizationId(3), UserId(12))
        .expect("claim");
    assert_eq!(claimed.status, CaseStatus::Claimed);

    let summaries = service.claimed_by(OrganizationId(3)).expect("claimed list");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].indicator_count, 3);

    service
        .update_status(record.id, CaseStatus::UnderInvestigation)
        .expect("investigating");
    assert!(service.get(record.id).expect("case").claim.is_some());

    let released = service
        .update_status(record.id, CaseStatus::Flagged)
        .expect("released");
    assert!(released.claim.is_none());
    assert!(service
        .claimed_by(OrganizationId(3))
        .expect("claimed list")
        .is_empty());
    assert_eq!(released.priority_score, Some(43.31));
}

#[test]
fn combination_mode_changes_bonus_for_unrelated_pairs() {
    let counted = service(CombinationMode::Count);
    let named = service(CombinationMode::Named);

    for service in [&counted, &named] {
        let dna = id(service.catalog(), "DNA Not Tested");
        let uncertainty = id(service.catalog(), "Witness Uncertainty");
        let record = service
            .flag(intake("CR2019-00077", "Kern"))
            .expect("case flagged");
        service.attach_indicator(record.id, dna, 1.0).expect("dna");
        service
            .attach_indicator(record.id, uncertainty, 1.0)
            .expect("uncertainty");
    }

    let counted_breakdown = counted.breakdown(CaseId(1)).expect("breakdown");
    let named_breakdown = named.breakdown(CaseId(1)).expect("breakdown");

    assert_eq!(counted_breakdown.combination_bonus, 1.5);
    assert_eq!(named_breakdown.combination_bonus, 1.0);
    assert!(named_breakdown.combinations.is_empty());
    assert!(counted_breakdown.score > named_breakdown.score);
}

#[test]
fn mock_population_produces_ranked_queue() {
    let service = service(CombinationMode::Count);
    let mut generator = MockCaseGenerator::seeded(2024);

    let ids = generator.populate(&service, 25).expect("populate");
    assert_eq!(ids.len(), 25);

    let queue = service.list(&CaseFilter::default()).expect("queue");
    assert_eq!(queue.len(), 25);
    assert!(queue.iter().all(|record| record.priority_score.is_some()));
    assert!(queue.windows(2).all(|pair| {
        pair[0].priority_score.unwrap_or_default() >= pair[1].priority_score.unwrap_or_default()
    }));

    for record in &queue {
        let detail = service.detail(record.id).expect("detail");
        assert!((2..=6).contains(&detail.indicators.len()));
        assert!(detail
            .indicators
            .iter()
            .all(|indicator| !indicator.citations.is_empty()));
    }
}

#[test]
fn worksheet_scores_match_service_scores() {
    let service = service(CombinationMode::Count);
    let dna = id(service.catalog(), "DNA Not Tested");
    let brady = id(service.catalog(), "Brady Violations");
    let record = service
        .flag(intake("CR2016-01234", "Alameda"))
        .expect("case flagged");
    service.attach_indicator(record.id, dna, 1.0).expect("dna");
    let scored = service
        .attach_indicator(record.id, brady, 1.0)
        .expect("brady");

    let csv = "\
case_number,indicator_id,severity,weight,category_weight,confidence
CR2016-01234,14,critical,1.9,1.5,1.0
CR2016-01234,15,critical,2.0,1.5,1.0
";
    let worksheet = ScoringWorksheet::from_reader(csv.as_bytes()).expect("worksheet parses");
    let results = worksheet.score(service.scorer());

    assert_eq!(results.len(), 1);
    assert_eq!(Some(results[0].explanation.score), scored.priority_score);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_to_one_case_are_not_lost() {
    let repository = SharedRepository {
        fetch_delay: Duration::from_millis(5),
        ..SharedRepository::default()
    };
    let service = Arc::new(CaseTriageService::from_config(
        Arc::new(repository),
        Arc::new(IndicatorCatalog::standard()),
        &ScoringConfig::default(),
    ));
    let record = service
        .flag(intake("CR2020-00500", "Fresno"))
        .expect("case flagged");
    let indicators: Vec<IndicatorId> = [
        "Coerced or False Confession",
        "Suggestive Lineup Procedures",
        "Official Misconduct",
        "DNA Not Tested",
        "Weak Prosecution Evidence",
        "Jailhouse Informant Testimony",
        "Witness Uncertainty",
        "Incentivized Witness",
    ]
    .iter()
    .map(|name| id(service.catalog(), name))
    .collect();
    let barrier = Arc::new(Barrier::new(indicators.len()));
    let case_id = record.id;

    let mut handles = Vec::new();
    for indicator in indicators.iter().copied() {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::task::spawn_blocking(move || {
            barrier.wait();
            service
                .attach_indicator(case_id, indicator, 0.75)
                .expect("indicator attached");
            service
                .add_citation(case_id, indicator, citation(indicator.0))
                .expect("citation added");
        }));
    }
    for handle in handles {
        handle.await.expect("task completes");
    }

    let detail = service.detail(record.id).expect("detail");
    assert_eq!(detail.indicators.len(), indicators.len());
    assert!(detail
        .indicators
        .iter()
        .all(|indicator| indicator.citations.len() == 1));
    assert_eq!(
        detail.record.priority_score,
        Some(service.breakdown(record.id).expect("breakdown").score)
    );
}
