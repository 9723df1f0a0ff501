//! Document access traits — the boundary where the engine talks to a
//! document format.
//!
//! Backends implement [`DocumentAccess`] and [`PageAccess`] to expose page
//! enumeration, native text/geometry extraction, rasterization, atomic
//! page mutation, and metadata scrubbing. Everything above this boundary
//! is format-agnostic.

use blot_core::{BBox, PrimitiveId, PrimitiveRef, Rotation, TextIndex};

use crate::error::DocumentError;

/// A rasterized page, handed to the external recognition engine.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixels per point used for rasterization; the engine's pixel-space
    /// output is mapped back through exactly this factor.
    pub scale: f64,
    /// 8-bit grayscale pixel data, row-major.
    pub pixels: Vec<u8>,
}

/// A primitive's geometry as exposed for overlap analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveGeom {
    pub primitive: PrimitiveRef,
    pub bbox: BBox,
}

/// One removal instruction inside a page edit.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveRemoval {
    /// Remove the primitive entirely.
    Whole(PrimitiveId),
    /// Remove a subset of a glyph run's glyphs, by glyph position.
    Glyphs {
        id: PrimitiveId,
        /// Glyph positions within the run, as they were when the edit was
        /// planned. May be unsorted; duplicates are tolerated.
        indices: Vec<usize>,
    },
}

impl PrimitiveRemoval {
    pub fn id(&self) -> PrimitiveId {
        match self {
            PrimitiveRemoval::Whole(id) => *id,
            PrimitiveRemoval::Glyphs { id, .. } => *id,
        }
    }
}

/// All mutations for one page, committed atomically.
///
/// Either every marker is drawn and every removal performed, or the page
/// is left untouched and the backend reports
/// [`DocumentError::EditRejected`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEdit {
    /// Opaque marker rectangles drawn over redacted regions.
    pub markers: Vec<BBox>,
    /// Primitives (or glyph subsets) to strip from the renderable set.
    pub removals: Vec<PrimitiveRemoval>,
}

impl PageEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.removals.is_empty()
    }

    /// Fold another edit into this one (used to build the single atomic
    /// edit for a page from per-region plans).
    pub fn merge(&mut self, other: PageEdit) {
        self.markers.extend(other.markers);
        self.removals.extend(other.removals);
    }
}

/// One page of an open document.
///
/// A page is exclusively owned by the worker processing it; nothing here
/// needs interior synchronization.
pub trait PageAccess {
    /// Page bounds in points, top-left origin, unrotated frame.
    fn bounds(&self) -> BBox;

    /// Page rotation inherited from the document.
    fn rotation(&self) -> Rotation;

    /// Extract the native text layer into a [`TextIndex`].
    ///
    /// Content-stream emission order is preserved; no visual reordering.
    /// A page with no extractable text yields an empty index — the signal
    /// that the recognition fallback is required, not an error.
    fn extract_text_index(&self) -> Result<TextIndex, DocumentError>;

    /// Rasterize the page at `scale` pixels per point, with the page
    /// rotation applied so the recognizer sees upright text.
    fn rasterize(&self, scale: f64) -> Result<RasterImage, DocumentError>;

    /// Geometry of every renderable primitive on the page.
    fn primitives(&self) -> Vec<PrimitiveGeom>;

    /// Per-glyph boxes for a glyph-run primitive, in glyph order.
    /// `None` for unknown ids or non-run primitives.
    fn glyph_boxes(&self, id: PrimitiveId) -> Option<Vec<BBox>>;

    /// Commit an edit atomically: validate everything first, then apply.
    /// On rejection the page is guaranteed unmodified.
    fn apply_edit(&mut self, edit: &PageEdit) -> Result<(), DocumentError>;
}

/// A document-level metadata field (info entry, outline title, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

/// An open document: pages plus document-level metadata.
pub trait DocumentAccess {
    type Page: PageAccess + Send;

    fn page_count(&self) -> usize;

    fn pages(&self) -> &[Self::Page];

    /// Mutable access to all pages. Disjoint pages may be mutated
    /// concurrently; each page has a single writer at a time.
    fn pages_mut(&mut self) -> &mut [Self::Page];

    /// Enumerate document-level metadata fields.
    fn metadata_fields(&self) -> Vec<MetadataField>;

    /// Clear every metadata field (including outline titles and
    /// annotation text) that verbatim-contains one of `needles`.
    /// Returns the number of fields scrubbed.
    fn scrub_metadata(&mut self, needles: &[String]) -> usize;
}
