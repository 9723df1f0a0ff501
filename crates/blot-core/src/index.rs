//! Per-page text index: concatenated text with per-offset geometry.
//!
//! The index binds every byte of a page's concatenated text to exactly one
//! character entry carrying a bounding box and a Content Model reference.
//! It is built once per page and never mutated afterwards, so offset math
//! stays valid while pages are processed concurrently. The external
//! detector consumes [`TextIndex::text`] verbatim, which is what makes its
//! span offsets line up with geometry by construction.

use unicode_normalization::UnicodeNormalization;

use crate::content::PrimitiveRef;
use crate::geometry::{BBox, Rotation};

/// Which extraction path produced a page's text index.
///
/// The resolver never branches on this; it exists so the audit trail can
/// report how each page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtractionMethod {
    /// Characters came from the page's native text layer.
    Native,
    /// Characters came from image-based recognition of a rasterized page.
    Recognized,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Native => "NATIVE",
            ExtractionMethod::Recognized => "RECOGNIZED",
        }
    }
}

/// One character of page text with its geometry and content reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CharEntry {
    /// The character's text (one scalar value, NFC-normalized; may expand
    /// to multiple scalars after normalization of composed input).
    pub text: String,
    /// Bounding box in page coordinates. Degenerate for separators that
    /// have an offset but no renderable geometry (line breaks, synthesized
    /// spaces between runs).
    pub bbox: BBox,
    /// The primitive that rendered this character.
    pub primitive: PrimitiveRef,
    /// Set when the character came from a recognition result below the
    /// configured confidence threshold.
    pub low_confidence: bool,
}

impl CharEntry {
    /// Whether this entry contributes geometry to a redaction region.
    ///
    /// Whitespace and degenerate boxes are kept in the index so offsets
    /// stay contiguous, but they never produce redaction geometry on
    /// their own.
    pub fn is_renderable(&self) -> bool {
        !self.bbox.is_degenerate() && !self.text.chars().all(char::is_whitespace)
    }
}

/// Immutable per-page mapping from character offsets to geometry.
///
/// Invariants, upheld by [`TextIndexBuilder`]:
/// - every byte offset in `text` maps to exactly one [`CharEntry`];
/// - offsets are contiguous and monotonic;
/// - the index is never mutated after [`TextIndexBuilder::finish`].
#[derive(Debug, Clone)]
pub struct TextIndex {
    text: String,
    entries: Vec<CharEntry>,
    /// byte offset in `text` → index into `entries` (arena-style, aligned
    /// with the text rather than keyed by lookup).
    byte_to_entry: Vec<usize>,
    method: ExtractionMethod,
    page_bounds: BBox,
    rotation: Rotation,
}

impl TextIndex {
    /// The page's concatenated text. This exact string is what the
    /// external detector consumes.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte length of the concatenated text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// `true` when the page yielded no characters at all — the signal that
    /// the recognition fallback is required. A normal condition, not an
    /// error.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    /// `true` when the native path produced no characters and the
    /// recognition fallback should run.
    pub fn needs_recognition(&self) -> bool {
        self.method == ExtractionMethod::Native && self.is_empty()
    }

    pub fn page_bounds(&self) -> BBox {
        self.page_bounds
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Number of character entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All character entries in content-stream emission order.
    pub fn entries(&self) -> &[CharEntry] {
        &self.entries
    }

    /// The text covered by a byte range, or `None` when the range is out
    /// of bounds or splits a character.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.text.get(start..end)
    }

    /// Unique entry indices covered by the byte range `[start, end)`, in
    /// emission order.
    ///
    /// Offsets that land inside a multi-byte character map to that
    /// character's single entry. Returns `None` when the range is inverted
    /// or extends past the text.
    pub fn entry_indices(&self, start: usize, end: usize) -> Option<Vec<usize>> {
        if start >= end || end > self.byte_to_entry.len() {
            return None;
        }
        let mut indices = Vec::new();
        for offset in start..end {
            let idx = self.byte_to_entry[offset];
            if indices.last() != Some(&idx) {
                indices.push(idx);
            }
        }
        Some(indices)
    }

    /// The entries covered by `[start, end)`; see [`entry_indices`].
    ///
    /// [`entry_indices`]: TextIndex::entry_indices
    pub fn entries_in(&self, start: usize, end: usize) -> Option<Vec<&CharEntry>> {
        self.entry_indices(start, end)
            .map(|indices| indices.into_iter().map(|i| &self.entries[i]).collect())
    }
}

/// Builder that upholds the text/geometry alignment invariant.
#[derive(Debug)]
pub struct TextIndexBuilder {
    text: String,
    entries: Vec<CharEntry>,
    byte_to_entry: Vec<usize>,
    method: ExtractionMethod,
    page_bounds: BBox,
    rotation: Rotation,
}

impl TextIndexBuilder {
    pub fn new(method: ExtractionMethod, page_bounds: BBox, rotation: Rotation) -> Self {
        Self {
            text: String::new(),
            entries: Vec::new(),
            byte_to_entry: Vec::new(),
            method,
            page_bounds,
            rotation,
        }
    }

    /// Append one character with its geometry and content reference.
    ///
    /// The text is NFC-normalized before insertion so both extraction
    /// paths expose identical byte offsets for the same visible text.
    pub fn push(
        &mut self,
        text: &str,
        bbox: BBox,
        primitive: PrimitiveRef,
        low_confidence: bool,
    ) -> &mut Self {
        let normalized: String = text.nfc().collect();
        if normalized.is_empty() {
            return self;
        }
        let entry_idx = self.entries.len();
        self.text.push_str(&normalized);
        for _ in 0..normalized.len() {
            self.byte_to_entry.push(entry_idx);
        }
        self.entries.push(CharEntry {
            text: normalized,
            bbox,
            primitive,
            low_confidence,
        });
        self
    }

    /// Append a separator (space or line break) that owns an offset but no
    /// renderable geometry.
    pub fn push_separator(&mut self, text: &str, primitive: PrimitiveRef) -> &mut Self {
        self.push(text, BBox::new(0.0, 0.0, 0.0, 0.0), primitive, false)
    }

    pub fn finish(self) -> TextIndex {
        debug_assert_eq!(self.text.len(), self.byte_to_entry.len());
        TextIndex {
            text: self.text,
            entries: self.entries,
            byte_to_entry: self.byte_to_entry,
            method: self.method,
            page_bounds: self.page_bounds,
            rotation: self.rotation,
        }
    }
}
