//! The redaction pipeline: extract, resolve, apply, audit.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use blot_core::{
    AuditOutcome, AuditRecord, AuditTrail, EntitySpan, FlagReason, RedactError, RedactOptions,
    RedactionRegion, RegionState, narrow_label_prefix, resolve_span,
};
use blot_document::{DocumentAccess, PageAccess, PageEdit, RecognitionEngine};

use crate::apply::plan_region;
use crate::cancel::CancelToken;
use crate::fallback::{PageIndex, acquire_text_index};

/// The redaction engine.
///
/// One `Redactor` is cheap to build and reusable across documents. A run
/// takes exclusive ownership of the document for its duration, processes
/// pages in parallel, and returns an [`AuditTrail`] with exactly one
/// record per submitted span.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    options: RedactOptions,
}

/// Per-span processing state for one page.
struct WorkItem {
    span: EntitySpan,
    region: Option<RedactionRegion>,
    state: RegionState,
}

#[derive(Default)]
struct PageOutcome {
    records: Vec<AuditRecord>,
    /// Text of applied regions, fed to the targeted metadata scrub. Held
    /// transiently for the run only; never written to the audit trail.
    applied_texts: Vec<String>,
}

impl Redactor {
    pub fn new(options: RedactOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RedactOptions {
        &self.options
    }

    /// Redact `spans_by_page[p]` on page `p` of `document`.
    ///
    /// Spans addressed to pages the document does not have are audited as
    /// flagged, never silently dropped. The only fatal errors are
    /// document-level (corruption, I/O); everything span- or page-scoped
    /// is recovered into the trail.
    pub fn redact<D: DocumentAccess>(
        &self,
        document: &mut D,
        spans_by_page: &[Vec<EntitySpan>],
        recognizer: Option<&(dyn RecognitionEngine + Sync)>,
        cancel: &CancelToken,
    ) -> Result<AuditTrail, RedactError> {
        let page_count = document.page_count();
        let total_spans: usize = spans_by_page.iter().map(Vec::len).sum();
        info!(pages = page_count, spans = total_spans, "redaction run started");

        let outcomes: Vec<PageOutcome> = document
            .pages_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(page_index, page)| {
                let spans = spans_by_page
                    .get(page_index)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                self.process_page(page_index, page, spans, recognizer, cancel)
            })
            .collect::<Result<_, RedactError>>()?;

        let mut trail = AuditTrail::new();
        let mut applied_texts = Vec::new();
        for outcome in outcomes {
            for record in outcome.records {
                trail.push(record);
            }
            applied_texts.extend(outcome.applied_texts);
        }

        for (page_index, spans) in spans_by_page.iter().enumerate().skip(page_count) {
            for span in spans {
                trail.push(flagged_record(
                    page_index,
                    span,
                    FlagReason::InvalidSpan {
                        start: span.start,
                        end: span.end,
                        text_len: 0,
                    },
                ));
            }
        }

        if self.scrub_metadata(document, applied_texts) {
            trail.mark_scrub_timeout();
        }

        trail.sort_canonical();
        info!(
            applied = trail.applied_count(),
            flagged = trail.flagged_count(),
            "redaction run finished"
        );
        Ok(trail)
    }

    /// Clear metadata fields that verbatim-contain an applied region's
    /// text. The collected strings live only for this call. Returns
    /// `true` when the scrub overran the per-operation deadline; the
    /// scrub itself always completes.
    fn scrub_metadata<D: DocumentAccess>(&self, document: &mut D, mut texts: Vec<String>) -> bool {
        texts.retain(|t| !t.trim().is_empty());
        texts.sort();
        texts.dedup();
        if texts.is_empty() {
            return false;
        }
        let started = Instant::now();
        let scrubbed = document.scrub_metadata(&texts);
        debug!(scrubbed, "metadata fields scrubbed");
        match self.options.op_timeout {
            Some(limit) if started.elapsed() >= limit => {
                warn!("metadata scrub exceeded its deadline");
                true
            }
            _ => false,
        }
    }

    fn process_page<P: PageAccess>(
        &self,
        page_index: usize,
        page: &mut P,
        spans: &[EntitySpan],
        recognizer: Option<&(dyn RecognitionEngine + Sync)>,
        cancel: &CancelToken,
    ) -> Result<PageOutcome, RedactError> {
        if spans.is_empty() {
            return Ok(PageOutcome::default());
        }
        if cancel.is_cancelled() {
            return Ok(PageOutcome {
                records: spans
                    .iter()
                    .map(|span| flagged_record(page_index, span, FlagReason::Cancelled))
                    .collect(),
                applied_texts: Vec::new(),
            });
        }

        let deadline = self.options.op_timeout.map(|t| Instant::now() + t);
        let recognizer = recognizer.map(|r| r as &dyn RecognitionEngine);
        let index = match acquire_text_index(page, recognizer, &self.options, deadline)? {
            PageIndex::Ready(index) => index,
            PageIndex::Flagged(reason) => {
                return Ok(PageOutcome {
                    records: spans
                        .iter()
                        .map(|span| flagged_record(page_index, span, reason.clone()))
                        .collect(),
                    applied_texts: Vec::new(),
                });
            }
        };

        // Resolve in offset order so overlapping spans behave
        // deterministically.
        let mut narrowed: Vec<EntitySpan> = spans
            .iter()
            .map(|span| narrow_label_prefix(span, index.text()))
            .collect();
        narrowed.sort_by_key(|span| (span.start, span.end));

        let mut items: Vec<WorkItem> = narrowed
            .into_iter()
            .map(|span| match resolve_span(page_index, &span, &index, &self.options) {
                Ok(region) => WorkItem {
                    span,
                    region: Some(region),
                    state: RegionState::Pending,
                },
                Err(reason) => WorkItem {
                    span,
                    region: None,
                    state: RegionState::Flagged(reason),
                },
            })
            .collect();

        // Cancellation between resolution and removal: resolved regions
        // still get audit records, content stays untouched.
        if cancel.is_cancelled() {
            for item in &mut items {
                if item.region.is_some() {
                    item.state = RegionState::Flagged(FlagReason::Cancelled);
                }
            }
        } else {
            let mut edit = PageEdit::new();
            for item in &mut items {
                let Some(region) = &item.region else {
                    continue;
                };
                item.state = RegionState::Applying;
                let plan = plan_region(page, region, &self.options);
                edit.merge(plan.edit);
                if let Some(flag) = plan.flag {
                    item.state = RegionState::Flagged(flag);
                }
            }

            if !edit.is_empty() {
                match page.apply_edit(&edit) {
                    Ok(()) => {
                        for item in &mut items {
                            if item.state == RegionState::Applying {
                                item.state = RegionState::Applied;
                            }
                        }
                    }
                    Err(err) => {
                        // Atomic rejection: the page is unmodified, every
                        // region of it is flagged.
                        warn!(page = page_index, error = %err, "page edit rejected");
                        let reason = FlagReason::PageMutationFailure {
                            detail: err.to_string(),
                        };
                        for item in &mut items {
                            if item.region.is_some() {
                                item.state = RegionState::Flagged(reason.clone());
                            }
                        }
                    }
                }
            }
        }

        let mut outcome = PageOutcome::default();
        for item in items {
            if item.state.is_applied() {
                if let Some(text) = index.slice(item.span.start, item.span.end) {
                    outcome.applied_texts.push(text.to_string());
                }
            }
            let audit_outcome = match item.state {
                RegionState::Applied => AuditOutcome::Applied,
                RegionState::Flagged(reason) => AuditOutcome::Flagged(reason),
                // Unreachable in practice: every region reaches a terminal
                // state above.
                RegionState::Pending | RegionState::Applying => {
                    AuditOutcome::Flagged(FlagReason::Cancelled)
                }
            };
            outcome.records.push(AuditRecord {
                page_index,
                entity_kind: item.span.kind,
                confidence: item.span.confidence,
                span_start: item.span.start,
                span_end: item.span.end,
                boxes: item
                    .region
                    .as_ref()
                    .map(|r| r.line_boxes().to_vec())
                    .unwrap_or_default(),
                method: Some(index.method()),
                low_confidence: item
                    .region
                    .as_ref()
                    .is_some_and(RedactionRegion::low_confidence),
                outcome: audit_outcome,
            });
        }
        debug!(
            page = page_index,
            spans = outcome.records.len(),
            method = index.method().as_str(),
            "page processed"
        );
        Ok(outcome)
    }
}

fn flagged_record(page_index: usize, span: &EntitySpan, reason: FlagReason) -> AuditRecord {
    AuditRecord {
        page_index,
        entity_kind: span.kind.clone(),
        confidence: span.confidence,
        span_start: span.start,
        span_end: span.end,
        boxes: Vec::new(),
        method: None,
        low_confidence: false,
        outcome: AuditOutcome::Flagged(reason),
    }
}
