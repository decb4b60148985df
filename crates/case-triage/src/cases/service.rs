use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    CaseClaim, CaseDetail, CaseFile, CaseId, CaseIndicator, CaseIndicatorView, CaseRecord,
    CaseStatus, ClaimedCaseSummary, EvidenceCitation, NewCase, OrganizationId, UserId,
};
use super::filter::{rank_order, CaseFilter};
use super::repository::{CaseRepository, RepositoryError};
use crate::catalog::IndicatorCatalog;
use crate::config::ScoringConfig;
use crate::detect::{Detection, Excerpt};
use crate::scoring::{
    IndicatorId, IndicatorScore, PriorityScorer, ScoreBreakdown, ScoreExplanation,
};

/// Case-management facade: stores cases, attaches indicators, and keeps each case's
/// persisted priority score in step with its indicators.
pub struct CaseTriageService<R> {
    repository: Arc<R>,
    catalog: Arc<IndicatorCatalog>,
    scorer: PriorityScorer,
    sequence: AtomicU64,
    locks: CaseLocks,
}

/// One mutex per case; read-modify-write cycles on the same case run one at a time.
#[derive(Default)]
struct CaseLocks {
    cases: Mutex<HashMap<CaseId, Arc<Mutex<()>>>>,
}

impl CaseLocks {
    fn for_case(&self, case_id: CaseId) -> Arc<Mutex<()>> {
        // the guarded data is `()`, so a poisoned lock carries no broken state
        let mut cases = self.cases.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cases.entry(case_id).or_default())
    }
}

impl<R> CaseTriageService<R>
where
    R: CaseRepository + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<IndicatorCatalog>, scorer: PriorityScorer) -> Self {
        Self {
            repository,
            catalog,
            scorer,
            sequence: AtomicU64::new(1),
            locks: CaseLocks::default(),
        }
    }

    pub fn from_config(
        repository: Arc<R>,
        catalog: Arc<IndicatorCatalog>,
        config: &ScoringConfig,
    ) -> Self {
        let scorer = config.scorer(&catalog);
        Self::new(repository, catalog, scorer)
    }

    pub fn catalog(&self) -> &IndicatorCatalog {
        &self.catalog
    }

    pub fn scorer(&self) -> &PriorityScorer {
        &self.scorer
    }

    /// Register a newly flagged case. It carries no score until indicators are attached.
    pub fn flag(&self, intake: NewCase) -> Result<CaseRecord, CaseServiceError> {
        let id = CaseId(self.sequence.fetch_add(1, Ordering::Relaxed));
        let record = CaseRecord::flagged(id, intake, Utc::now());

        let stored = self.repository.insert(CaseFile {
            record,
            indicators: Vec::new(),
        })?;

        info!(
            case_id = %stored.record.id,
            case_number = %stored.record.case_number,
            "case flagged"
        );
        Ok(stored.record)
    }

    /// Attach an indicator (or replace its confidence) and rescore the case.
    pub fn attach_indicator(
        &self,
        case_id: CaseId,
        indicator_id: IndicatorId,
        confidence: f64,
    ) -> Result<CaseRecord, CaseServiceError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CaseServiceError::InvalidConfidence(confidence));
        }
        if self.catalog.find(indicator_id).is_none() {
            return Err(CaseServiceError::UnknownIndicator(indicator_id));
        }

        let file = self.modify(case_id, |file| {
            match file.indicator_mut(indicator_id) {
                Some(existing) => existing.confidence_score = confidence,
                None => file.indicators.push(CaseIndicator {
                    indicator_id,
                    confidence_score: confidence,
                    citations: Vec::new(),
                }),
            }
            self.apply_score(file);
            Ok(())
        })?;
        Ok(file.record)
    }

    /// Record a document citation supporting an attached indicator.
    pub fn add_citation(
        &self,
        case_id: CaseId,
        indicator_id: IndicatorId,
        citation: EvidenceCitation,
    ) -> Result<(), CaseServiceError> {
        self.modify(case_id, |file| {
            let indicator = file.indicator_mut(indicator_id).ok_or(
                CaseServiceError::IndicatorNotAttached {
                    case: case_id,
                    indicator: indicator_id,
                },
            )?;

            indicator.citations.push(citation);
            indicator
                .citations
                .sort_by_key(|citation| (citation.page_number, citation.line_number));
            file.record.updated_at = Utc::now();
            Ok(())
        })?;
        Ok(())
    }

    /// Attach everything a transcript scan found in one write. An indicator that is
    /// already attached keeps the higher of its current and detected confidence, and
    /// every excerpt becomes a citation.
    pub fn attach_detections(
        &self,
        case_id: CaseId,
        detections: &[Detection],
    ) -> Result<CaseRecord, CaseServiceError> {
        for detection in detections {
            if !(0.0..=1.0).contains(&detection.confidence) {
                return Err(CaseServiceError::InvalidConfidence(detection.confidence));
            }
            if self.catalog.find(detection.indicator_id).is_none() {
                return Err(CaseServiceError::UnknownIndicator(detection.indicator_id));
            }
        }

        let file = self.modify(case_id, |file| {
            for detection in detections {
                let citations = detection.excerpts.iter().map(Excerpt::to_citation);
                match file.indicator_mut(detection.indicator_id) {
                    Some(existing) => {
                        existing.confidence_score =
                            existing.confidence_score.max(detection.confidence);
                        existing.citations.extend(citations);
                        existing
                            .citations
                            .sort_by_key(|citation| (citation.page_number, citation.line_number));
                    }
                    None => {
                        let mut citations: Vec<_> = citations.collect();
                        citations
                            .sort_by_key(|citation| (citation.page_number, citation.line_number));
                        file.indicators.push(CaseIndicator {
                            indicator_id: detection.indicator_id,
                            confidence_score: detection.confidence,
                            citations,
                        });
                    }
                }
            }
            self.apply_score(file);
            Ok(())
        })?;

        info!(
            case_id = %case_id,
            detections = detections.len(),
            score = file.record.priority_score,
            "transcript detections attached"
        );
        Ok(file.record)
    }

    /// Recompute the case's score from its attached indicators and persist it.
    pub fn rescore(&self, case_id: CaseId) -> Result<f64, CaseServiceError> {
        let mut score = 0.0;
        self.modify(case_id, |file| {
            score = self.apply_score(file);
            Ok(())
        })?;
        Ok(score)
    }

    /// Rescore every stored case, returning how many were updated.
    pub fn rescore_all(&self) -> Result<usize, CaseServiceError> {
        let records = self.repository.list(&CaseFilter::with_limit(usize::MAX))?;
        for record in &records {
            self.rescore(record.id)?;
        }

        info!(cases = records.len(), "rescored all cases");
        Ok(records.len())
    }

    pub fn explain(&self, case_id: CaseId) -> Result<ScoreExplanation, CaseServiceError> {
        let file = self.load(case_id)?;
        let inputs = self.score_inputs(&file);
        Ok(self.scorer.explain(&inputs))
    }

    pub fn breakdown(&self, case_id: CaseId) -> Result<ScoreBreakdown, CaseServiceError> {
        let file = self.load(case_id)?;
        let inputs = self.score_inputs(&file);
        Ok(self.scorer.breakdown(&inputs))
    }

    /// The case with its indicators joined to the catalog, most severe and most
    /// confident first.
    pub fn detail(&self, case_id: CaseId) -> Result<CaseDetail, CaseServiceError> {
        let file = self.load(case_id)?;

        let mut indicators: Vec<CaseIndicatorView> = file
            .indicators
            .iter()
            .filter_map(|attached| {
                self.catalog
                    .find(attached.indicator_id)
                    .map(|view| CaseIndicatorView {
                        indicator_id: attached.indicator_id,
                        name: view.definition.name.clone(),
                        severity: view.definition.severity,
                        category: view.category_name.to_string(),
                        confidence_score: attached.confidence_score,
                        citations: attached.citations.clone(),
                    })
            })
            .collect();
        indicators.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.confidence_score.total_cmp(&a.confidence_score))
        });

        Ok(CaseDetail {
            record: file.record,
            indicators,
        })
    }

    pub fn get(&self, case_id: CaseId) -> Result<CaseRecord, CaseServiceError> {
        self.load(case_id).map(|file| file.record)
    }

    pub fn list(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, CaseServiceError> {
        Ok(self.repository.list(filter)?)
    }

    pub fn claim(
        &self,
        case_id: CaseId,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<CaseRecord, CaseServiceError> {
        let file = self.modify(case_id, |file| {
            let now = Utc::now();
            file.record.status = CaseStatus::Claimed;
            file.record.claim = Some(CaseClaim {
                organization_id,
                user_id,
                claimed_at: now,
            });
            file.record.updated_at = now;
            Ok(())
        })?;

        info!(case_id = %case_id, organization = organization_id.0, "case claimed");
        Ok(file.record)
    }

    /// Move a case through its review lifecycle. Returning a case to `Flagged`
    /// releases any claim on it.
    pub fn update_status(
        &self,
        case_id: CaseId,
        status: CaseStatus,
    ) -> Result<CaseRecord, CaseServiceError> {
        let file = self.modify(case_id, |file| {
            file.record.status = status;
            if status == CaseStatus::Flagged {
                file.record.claim = None;
            }
            file.record.updated_at = Utc::now();
            Ok(())
        })?;

        info!(case_id = %case_id, status = %status, "case status updated");
        Ok(file.record)
    }

    /// Cases claimed by an organization, highest priority first.
    pub fn claimed_by(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<ClaimedCaseSummary>, CaseServiceError> {
        let records = self.repository.list(&CaseFilter::with_limit(usize::MAX))?;
        let mut claimed = Vec::new();

        for record in records.into_iter().filter(|record| {
            record
                .claim
                .as_ref()
                .is_some_and(|claim| claim.organization_id == organization_id)
        }) {
            let indicator_count = self.load(record.id)?.indicators.len();
            claimed.push(ClaimedCaseSummary {
                record,
                indicator_count,
            });
        }

        claimed.sort_by(|a, b| rank_order(&a.record, &b.record));
        Ok(claimed)
    }

    /// Load, change and store a case while holding its lock, so concurrent changes to
    /// the same case are applied one after another instead of overwriting each other.
    fn modify<F>(&self, case_id: CaseId, change: F) -> Result<CaseFile, CaseServiceError>
    where
        F: FnOnce(&mut CaseFile) -> Result<(), CaseServiceError>,
    {
        let lock = self.locks.for_case(case_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = self.load(case_id)?;
        change(&mut file)?;
        self.repository.update(file.clone())?;
        Ok(file)
    }

    fn load(&self, case_id: CaseId) -> Result<CaseFile, CaseServiceError> {
        self.repository
            .fetch(case_id)?
            .ok_or(CaseServiceError::CaseNotFound(case_id))
    }

    fn score_inputs(&self, file: &CaseFile) -> Vec<IndicatorScore> {
        file.indicators
            .iter()
            .filter_map(|attached| {
                let input = self
                    .catalog
                    .score_input(attached.indicator_id, attached.confidence_score);
                if input.is_none() {
                    warn!(
                        case_id = %file.record.id,
                        indicator = attached.indicator_id.0,
                        "attached indicator missing from catalog; excluded from score"
                    );
                }
                input
            })
            .collect()
    }

    fn apply_score(&self, file: &mut CaseFile) -> f64 {
        let inputs = self.score_inputs(file);
        let score = self.scorer.score(&inputs);

        file.record.priority_score = Some(score);
        file.record.updated_at = Utc::now();

        debug!(
            case_id = %file.record.id,
            indicators = inputs.len(),
            score,
            "case rescored"
        );
        score
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaseServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("case {0} not found")]
    CaseNotFound(CaseId),
    #[error("indicator {0} is not in the catalog")]
    UnknownIndicator(IndicatorId),
    #[error("confidence {0} must be within [0, 1]")]
    InvalidConfidence(f64),
    #[error("indicator {indicator} is not attached to case {case}")]
    IndicatorNotAttached {
        case: CaseId,
        indicator: IndicatorId,
    },
}
