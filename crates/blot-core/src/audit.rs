//! Audit trail: one immutable record per redaction decision.
//!
//! Records are written for every input span regardless of applicator
//! outcome, so the trail reflects reality — including flagged and
//! unredacted cases — for compliance review. Records carry geometry and
//! classification, never the redacted text itself.

use crate::error::FlagReason;
use crate::geometry::BBox;
use crate::index::ExtractionMethod;

/// Final outcome of one redaction region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "outcome", content = "reason")
)]
pub enum AuditOutcome {
    /// Marker drawn and underlying content removed.
    Applied,
    /// Not (or not fully) removed; the reason records why.
    Flagged(FlagReason),
}

impl AuditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, AuditOutcome::Applied)
    }
}

/// One redaction decision and its result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuditRecord {
    /// 0-based page index.
    pub page_index: usize,
    /// Entity kind from the detector.
    pub entity_kind: String,
    /// Detector confidence.
    pub confidence: f64,
    /// Original span offsets, used for deterministic ordering.
    pub span_start: usize,
    pub span_end: usize,
    /// Final region geometry; empty when resolution failed.
    pub boxes: Vec<BBox>,
    /// Extraction path that produced the page's text, when one ran.
    pub method: Option<ExtractionMethod>,
    /// Whether any covered text came from a low-confidence recognition
    /// result.
    pub low_confidence: bool,
    /// Applied, or flagged with a reason.
    pub outcome: AuditOutcome,
}

/// Append-only, immutable collection of audit records.
///
/// Workers append through a single serialized path; canonical ordering
/// (page index, then original span order) is restored once the run
/// completes.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuditTrail {
    records: Vec<AuditRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    scrub_timed_out: bool,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. Records are never modified or removed once
    /// appended.
    pub fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of regions whose content was confirmed removed.
    pub fn applied_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_applied())
            .count()
    }

    /// Number of regions that require reviewer attention.
    pub fn flagged_count(&self) -> usize {
        self.len() - self.applied_count()
    }

    /// Record that the metadata scrub overran its deadline. The scrub
    /// still completed; reviewers should treat document metadata as
    /// needing manual verification.
    pub fn mark_scrub_timeout(&mut self) {
        self.scrub_timed_out = true;
    }

    /// Whether the metadata scrub overran the per-operation deadline.
    pub fn scrub_timed_out(&self) -> bool {
        self.scrub_timed_out
    }

    /// Iterate over flagged records so a reviewer can see exactly what was
    /// not removed.
    pub fn flagged(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records
            .iter()
            .filter(|r| !r.outcome.is_applied())
    }

    /// Restore canonical ordering: page index, then span start, then span
    /// end. Stable, so equal keys keep append order.
    pub fn sort_canonical(&mut self) {
        self.records.sort_by(|a, b| {
            a.page_index
                .cmp(&b.page_index)
                .then(a.span_start.cmp(&b.span_start))
                .then(a.span_end.cmp(&b.span_end))
        });
    }
}
