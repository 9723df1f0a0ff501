//! Serde round-trip tests for audit export types (requires the `serde`
//! feature).

#![cfg(feature = "serde")]

use blot_core::{
    AuditOutcome, AuditRecord, AuditTrail, BBox, ExtractionMethod, FlagReason,
};

fn sample_record(outcome: AuditOutcome) -> AuditRecord {
    AuditRecord {
        page_index: 1,
        entity_kind: "EMAIL".to_string(),
        confidence: 0.85,
        span_start: 19,
        span_end: 36,
        boxes: vec![BBox::new(10.0, 100.0, 120.0, 113.5)],
        method: Some(ExtractionMethod::Native),
        low_confidence: false,
        outcome,
    }
}

#[test]
fn applied_record_round_trips() {
    let record = sample_record(AuditOutcome::Applied);
    let json = serde_json::to_string(&record).unwrap();
    let back: AuditRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn flagged_record_round_trips_with_reason() {
    let record = sample_record(AuditOutcome::Flagged(FlagReason::InvalidSpan {
        start: 5,
        end: 200,
        text_len: 50,
    }));
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("INVALID_SPAN") || json.contains("InvalidSpan"));
    let back: AuditRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn trail_serializes_all_records() {
    let mut trail = AuditTrail::new();
    trail.push(sample_record(AuditOutcome::Applied));
    trail.push(sample_record(AuditOutcome::Flagged(
        FlagReason::ResolutionEmpty,
    )));

    let json = serde_json::to_string_pretty(&trail).unwrap();
    let back: AuditTrail = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.applied_count(), 1);
    assert_eq!(back.flagged_count(), 1);
}
