//! Entity spans supplied by the external detector.
//!
//! Spans are untrusted input: offsets may be inverted or out of range and
//! are validated by the resolver, never silently truncated.

/// A character range classified as sensitive by the external detector.
///
/// `start`/`end` are byte offsets into the page's concatenated text
/// (the detector consumes exactly the text the [`TextIndex`] exposes, so
/// offsets line up by construction).
///
/// [`TextIndex`]: crate::index::TextIndex
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitySpan {
    /// Entity kind as reported by the detector (e.g., "PERSON", "US_SSN").
    pub kind: String,
    /// Detector confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Start byte offset, inclusive.
    pub start: usize,
    /// End byte offset, exclusive.
    pub end: usize,
}

impl EntitySpan {
    pub fn new(kind: impl Into<String>, confidence: f64, start: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            confidence,
            start,
            end,
        }
    }

    /// Length of the span in bytes. Zero when the offsets are inverted.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the two spans share at least one offset.
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Field labels that must survive redaction when a detector span includes
/// them (e.g., a span covering `"Email: jane@example.com"` should only
/// redact the address).
const PRESERVED_LABELS: &[&str] = &["Address:", "Email:", "Phone:", "Name:", "SSN:", "MRN:"];

/// Narrow a span so it excludes a leading field label and surrounding
/// whitespace.
///
/// `page_text` is the concatenated text the span indexes into. Returns the
/// span unchanged when it carries no recognized label prefix or its offsets
/// do not address valid text. A span that contains only a label collapses
/// to an empty span (and will be flagged by the resolver).
pub fn narrow_label_prefix(span: &EntitySpan, page_text: &str) -> EntitySpan {
    let Some(covered) = page_text.get(span.start..span.end.min(page_text.len())) else {
        return span.clone();
    };

    let leading_ws = covered.len() - covered.trim_start().len();
    let trimmed = covered.trim_start();

    for label in PRESERVED_LABELS {
        if let Some(rest) = trimmed.strip_prefix(label) {
            let value_ws = rest.len() - rest.trim_start().len();
            let new_start = span.start + leading_ws + label.len() + value_ws;
            return EntitySpan {
                kind: span.kind.clone(),
                confidence: span.confidence,
                start: new_start.min(span.end),
                end: span.end,
            };
        }
    }
    span.clone()
}
