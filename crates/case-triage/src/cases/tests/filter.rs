use chrono::{TimeZone, Utc};

use super::common::intake;
use crate::cases::domain::{CaseId, CaseRecord, CaseStatus, DocumentType};
use crate::cases::CaseFilter;

fn record(id: u64, county: &str, status: CaseStatus, score: Option<f64>) -> CaseRecord {
    let created = Utc
        .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let mut record =
        CaseRecord::flagged(CaseId(id), intake(&format!("CR2020-{id:05}"), county), created);
    record.status = status;
    record.priority_score = score;
    record
}

#[test]
fn default_filter_pages_fifty_records() {
    let filter = CaseFilter::default();
    let records = (1..=60).map(|id| record(id, "Kern", CaseStatus::Flagged, Some(id as f64)));

    let listed = filter.apply(records);

    assert_eq!(listed.len(), 50);
    assert_eq!(listed[0].id, CaseId(60));
}

#[test]
fn ties_fall_back_to_case_id() {
    let records = vec![
        record(3, "Kern", CaseStatus::Flagged, Some(40.0)),
        record(1, "Kern", CaseStatus::Flagged, Some(40.0)),
        record(2, "Kern", CaseStatus::Flagged, None),
        record(4, "Kern", CaseStatus::Flagged, Some(80.5)),
    ];

    let listed = CaseFilter::default().apply(records);

    let ids: Vec<_> = listed.iter().map(|record| record.id.0).collect();
    assert_eq!(ids, vec![4, 1, 3, 2]);
}

#[test]
fn status_filter_matches_exactly() {
    let records = vec![
        record(1, "Kern", CaseStatus::Flagged, Some(10.0)),
        record(2, "Kern", CaseStatus::Claimed, Some(20.0)),
        record(3, "Kern", CaseStatus::Exonerated, Some(30.0)),
    ];
    let filter = CaseFilter {
        status: Some(CaseStatus::Claimed),
        ..CaseFilter::default()
    };

    let listed = filter.apply(records);

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, CaseId(2));
}

#[test]
fn deserializes_with_defaults() {
    let filter: CaseFilter =
        serde_json::from_str(r#"{"status":"under_investigation","min_priority":25}"#)
            .expect("valid filter");

    assert_eq!(filter.status, Some(CaseStatus::UnderInvestigation));
    assert_eq!(filter.min_priority, Some(25.0));
    assert_eq!(filter.limit, 50);
    assert_eq!(filter.offset, 0);
}

#[test]
fn status_labels_round_trip_through_from_str() {
    for status in [
        CaseStatus::Flagged,
        CaseStatus::Claimed,
        CaseStatus::UnderInvestigation,
        CaseStatus::Closed,
        CaseStatus::Exonerated,
    ] {
        assert_eq!(status.label().parse::<CaseStatus>(), Ok(status));
    }
    assert!("reopened".parse::<CaseStatus>().is_err());
}

#[test]
fn document_types_parse_from_their_labels() {
    assert_eq!(
        DocumentType::PoliceReport.label().parse::<DocumentType>(),
        Ok(DocumentType::PoliceReport)
    );
    assert_eq!(" transcript ".parse::<DocumentType>(), Ok(DocumentType::Transcript));
    assert!("deposition".parse::<DocumentType>().is_err());
}
