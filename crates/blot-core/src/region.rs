//! Redaction regions: the resolved geometric unit the applicator acts on.

use crate::content::PrimitiveRef;
use crate::error::FlagReason;
use crate::geometry::BBox;
use crate::span::EntitySpan;

/// The resolved geometry for one entity span.
///
/// A region holds one merged box per text line the span touches, plus the
/// Content Model references of every character it covers. Regions are
/// immutable once built — the resolver constructs them, the applicator
/// only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionRegion {
    page_index: usize,
    line_boxes: Vec<BBox>,
    span: EntitySpan,
    primitives: Vec<PrimitiveRef>,
    low_confidence: bool,
}

impl RedactionRegion {
    /// Build a region. `line_boxes` must be non-empty and in top-to-bottom
    /// order; `primitives` must be deduplicated. Both are the resolver's
    /// responsibility.
    pub fn new(
        page_index: usize,
        line_boxes: Vec<BBox>,
        span: EntitySpan,
        primitives: Vec<PrimitiveRef>,
        low_confidence: bool,
    ) -> Self {
        debug_assert!(!line_boxes.is_empty());
        Self {
            page_index,
            line_boxes,
            span,
            primitives,
            low_confidence,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// One merged box per covered text line, top to bottom. A span that
    /// crosses a line break yields multiple boxes, never one box spanning
    /// the gap.
    pub fn line_boxes(&self) -> &[BBox] {
        &self.line_boxes
    }

    /// The originating entity span.
    pub fn span(&self) -> &EntitySpan {
        &self.span
    }

    /// Content Model primitives covered by the span's characters.
    pub fn primitives(&self) -> &[PrimitiveRef] {
        &self.primitives
    }

    /// Whether any covered character came from a low-confidence
    /// recognition result.
    pub fn low_confidence(&self) -> bool {
        self.low_confidence
    }

    /// Union of all line boxes (for audit summaries; the applicator always
    /// works per line box).
    pub fn bounding_box(&self) -> BBox {
        let mut union = self.line_boxes[0];
        for bbox in &self.line_boxes[1..] {
            union = union.union(bbox);
        }
        union
    }
}

/// Application state of one region, tracked explicitly so partial failure
/// is an inspectable value rather than a side effect of error propagation.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionState {
    /// Resolved, not yet applied.
    Pending,
    /// Content removal in progress.
    Applying,
    /// Marker drawn and underlying content removed.
    Applied,
    /// Marker drawn (where geometry existed) but underlying content could
    /// not be confirmed removed.
    Flagged(FlagReason),
}

impl RegionState {
    /// Whether the region has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RegionState::Applied | RegionState::Flagged(_))
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, RegionState::Applied)
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, RegionState::Flagged(_))
    }
}
