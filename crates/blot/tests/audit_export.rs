//! JSON export of the audit trail (serde feature).

#![cfg(feature = "serde")]

mod common;

use blot::{AuditTrail, CancelToken, EntitySpan, Redactor};
use blot_document::ModelDocument;

use common::span_over;

#[test]
fn trail_serializes_without_redacted_text() {
    let line = "Patient: Jane Doe, SSN 123-45-6789";
    let mut doc = ModelDocument::new();
    doc.add_page(612.0, 792.0)
        .add_text_line(72.0, 100.0, 12.0, line);

    let spans = vec![vec![
        span_over(line, "PERSON", "Jane Doe", 0.92),
        span_over(line, "US_SSN", "123-45-6789", 0.85),
        EntitySpan::new("PERSON", 0.5, 100, 400),
    ]];
    let trail = Redactor::default()
        .redact(&mut doc, &spans, None, &CancelToken::new())
        .unwrap();

    let json = serde_json::to_string_pretty(&trail).unwrap();
    assert!(json.contains("\"PERSON\""));
    assert!(json.contains("\"INVALID_SPAN\"") || json.contains("InvalidSpan"));
    // The trail must never leak what was redacted
    assert!(!json.contains("Jane Doe"));
    assert!(!json.contains("123-45-6789"));

    let restored: AuditTrail = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), trail.len());
    assert_eq!(restored.applied_count(), trail.applied_count());
}
