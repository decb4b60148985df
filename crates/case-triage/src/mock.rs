//! Synthetic case generation for demos and local testing.

use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::cases::{
    CaseId, CaseRecord, CaseRepository, CaseServiceError, CaseTriageService, Demographics,
    DocumentType, EvidenceCitation, NewCase, RepositoryError,
};
use crate::catalog::IndicatorCatalog;
use crate::scoring::IndicatorId;

const COUNTIES: [&str; 10] = [
    "Los Angeles",
    "San Francisco",
    "San Diego",
    "Orange",
    "Riverside",
    "Sacramento",
    "Alameda",
    "Contra Costa",
    "Fresno",
    "Kern",
];

const CRIMES: [&str; 10] = [
    "First-degree murder",
    "Armed robbery",
    "Sexual assault",
    "Aggravated assault",
    "Drug trafficking",
    "Burglary",
    "Kidnapping",
    "Manslaughter",
    "Arson",
    "Grand theft auto",
];

const FIRST_NAMES: [&str; 12] = [
    "Marcus", "DeShawn", "Jamal", "Michael", "James", "Robert", "Carlos", "Jose", "Luis", "David",
    "Anthony", "Kevin",
];

const LAST_NAMES: [&str; 12] = [
    "Johnson", "Williams", "Brown", "Jones", "Garcia", "Martinez", "Rodriguez", "Davis", "Miller",
    "Wilson", "Moore", "Taylor",
];

const RACES: [&str; 5] = ["Black", "Hispanic", "White", "Asian", "Other"];
const GENDERS: [&str; 2] = ["Male", "Female"];

const MAX_CASE_NUMBER_ATTEMPTS: usize = 8;

/// Indicator to attach to a generated case.
#[derive(Debug, Clone, PartialEq)]
pub struct MockIndicator {
    pub indicator_id: IndicatorId,
    pub confidence: f64,
    pub citations: Vec<EvidenceCitation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockCase {
    pub intake: NewCase,
    pub indicators: Vec<MockIndicator>,
}

pub struct MockCaseGenerator {
    rng: StdRng,
}

impl MockCaseGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }

    pub fn generate(&mut self, catalog: &IndicatorCatalog) -> MockCase {
        let defendant_name = format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES));
        let conviction_year = 2015 + self.rng.random_range(0..8);
        let conviction_date = NaiveDate::from_ymd_opt(conviction_year, 1, 1)
            .and_then(|start| start.checked_add_days(Days::new(self.rng.random_range(0..365))));
        let county = self.pick(&COUNTIES).to_string();

        let intake = NewCase {
            case_number: self.case_number(conviction_year),
            defendant_name,
            conviction_date,
            sentence: Some(format!("{} years to life", 10 + self.rng.random_range(0..40))),
            crime_charged: self.pick(&CRIMES).to_string(),
            court_name: Some(format!("{county} County Superior Court")),
            county,
            demographics: Some(Demographics {
                age_at_conviction: Some(18 + self.rng.random_range(0..40)),
                race: Some(self.pick(&RACES).to_string()),
                gender: Some(self.pick(&GENDERS).to_string()),
            }),
        };

        let mut available: Vec<IndicatorId> = catalog.ids().collect();
        let wanted = (2 + self.rng.random_range(0..5)).min(available.len());
        let mut indicators = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let indicator_id = available.swap_remove(self.rng.random_range(0..available.len()));
            let confidence = self.rng.random_range(0.6..1.0);
            let citation_count = 1 + self.rng.random_range(0..3);
            let citations = (0..citation_count)
                .map(|_| self.citation(catalog, indicator_id))
                .collect();

            indicators.push(MockIndicator {
                indicator_id,
                confidence,
                citations,
            });
        }

        MockCase { intake, indicators }
    }

    /// Flag `count` generated cases through the service so every score comes from the
    /// scorer, returning the new case ids.
    pub fn populate<R>(
        &mut self,
        service: &CaseTriageService<R>,
        count: usize,
    ) -> Result<Vec<CaseId>, CaseServiceError>
    where
        R: CaseRepository + 'static,
    {
        info!(count, "generating mock cases");
        let mut ids = Vec::with_capacity(count);

        for generated in 1..=count {
            let mock = self.generate(service.catalog());
            let record = self.flag_with_unique_number(service, mock.intake)?;

            for indicator in mock.indicators {
                service.attach_indicator(record.id, indicator.indicator_id, indicator.confidence)?;
                for citation in indicator.citations {
                    service.add_citation(record.id, indicator.indicator_id, citation)?;
                }
            }
            ids.push(record.id);

            if generated % 10 == 0 {
                info!(generated, count, "mock case generation progress");
            }
        }

        info!(count = ids.len(), "mock cases generated");
        Ok(ids)
    }

    fn flag_with_unique_number<R>(
        &mut self,
        service: &CaseTriageService<R>,
        mut intake: NewCase,
    ) -> Result<CaseRecord, CaseServiceError>
    where
        R: CaseRepository + 'static,
    {
        let year = intake
            .conviction_date
            .map(|date| date.year())
            .unwrap_or(2015);
        let mut attempts = 0;

        loop {
            match service.flag(intake.clone()) {
                Err(CaseServiceError::Repository(RepositoryError::Conflict))
                    if attempts < MAX_CASE_NUMBER_ATTEMPTS =>
                {
                    attempts += 1;
                    intake.case_number = self.case_number(year);
                }
                result => return result,
            }
        }
    }

    fn case_number(&mut self, year: i32) -> String {
        format!("CR{year}-{:05}", self.rng.random_range(0..99_999))
    }

    fn citation(
        &mut self,
        catalog: &IndicatorCatalog,
        indicator_id: IndicatorId,
    ) -> EvidenceCitation {
        let quoted_text = catalog
            .find(indicator_id)
            .map(|view| transcript_excerpt(&view.definition.name))
            .unwrap_or_else(|| "Relevant quoted text from document".to_string());

        EvidenceCitation {
            document_type: DocumentType::Transcript,
            page_number: 1 + self.rng.random_range(0..200),
            line_number: Some(1 + self.rng.random_range(0..50)),
            quoted_text,
            context_before: Some("Context before the quoted text".to_string()),
            context_after: Some("Context after the quoted text".to_string()),
        }
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.random_range(0..values.len())]
    }
}

fn transcript_excerpt(indicator: &str) -> String {
    match indicator {
        "Long High-Pressure Interrogation" => {
            "Defense counsel raised concerns about the interrogation lasting over 12 hours without breaks."
                .to_string()
        }
        "Single Unreliable Eyewitness" | "Suggestive Lineup Procedures" => {
            "The identification was made from a single photograph, and the witness expressed uncertainty."
                .to_string()
        }
        "Brady Violations" => {
            "The court notes a Brady violation as exculpatory evidence was withheld from the defense."
                .to_string()
        }
        other => format!("Transcript excerpt supporting '{other}'."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seeded_generators_are_reproducible() {
        let catalog = IndicatorCatalog::standard();

        let first = MockCaseGenerator::seeded(42).generate(&catalog);
        let second = MockCaseGenerator::seeded(42).generate(&catalog);

        assert_eq!(first, second);
    }

    #[test]
    fn generated_cases_stay_within_documented_ranges() {
        let catalog = IndicatorCatalog::standard();
        let mut generator = MockCaseGenerator::seeded(7);

        for _ in 0..200 {
            let case = generator.generate(&catalog);

            assert!(case.intake.case_number.starts_with("CR20"));
            assert!((2..=6).contains(&case.indicators.len()));
            let distinct: HashSet<_> = case
                .indicators
                .iter()
                .map(|indicator| indicator.indicator_id)
                .collect();
            assert_eq!(distinct.len(), case.indicators.len());

            for indicator in &case.indicators {
                assert!(catalog.find(indicator.indicator_id).is_some());
                assert!((0.6..1.0).contains(&indicator.confidence));
                assert!((1..=3).contains(&indicator.citations.len()));
            }

            let year = case
                .intake
                .conviction_date
                .map(|date| date.year())
                .expect("conviction date");
            assert!((2015..=2022).contains(&year));
            let age = case
                .intake
                .demographics
                .as_ref()
                .and_then(|demographics| demographics.age_at_conviction)
                .expect("age");
            assert!((18..58).contains(&age));
        }
    }
}
