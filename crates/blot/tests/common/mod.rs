#![allow(dead_code)]

use blot::EntitySpan;
use blot_document::{ModelDocument, PageAccess};
use regex::Regex;

/// Re-extract a page's concatenated text.
pub fn page_text(doc: &ModelDocument, page: usize) -> String {
    doc.page(page)
        .unwrap()
        .extract_text_index()
        .unwrap()
        .text()
        .to_string()
}

/// Build spans from a detector-style regex over the page text.
pub fn spans_matching(text: &str, kind: &str, pattern: &str, confidence: f64) -> Vec<EntitySpan> {
    let re = Regex::new(pattern).unwrap();
    re.find_iter(text)
        .map(|m| EntitySpan::new(kind, confidence, m.start(), m.end()))
        .collect()
}

/// One span covering `needle` within `text`. Panics when absent.
pub fn span_over(text: &str, kind: &str, needle: &str, confidence: f64) -> EntitySpan {
    let start = text
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not in page text"));
    EntitySpan::new(kind, confidence, start, start + needle.len())
}
