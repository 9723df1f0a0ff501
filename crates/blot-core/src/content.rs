//! References into a page's Content Model.
//!
//! The Content Model itself (glyph runs, image placements, annotations)
//! lives behind the document boundary; the core only handles opaque
//! references so the resolver and audit trail stay backend-independent.

use std::fmt;

/// Stable identifier of a renderable primitive within one page.
///
/// Identifiers are assigned by the document backend and are never reused
/// within a page, so a reference held by a redaction region stays valid
/// after other primitives are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimitiveId(pub u32);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of renderable primitive a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    /// A run of positioned glyphs sharing one font state.
    GlyphRun,
    /// A placed raster image.
    Image,
    /// An annotation object with renderable appearance.
    Annotation,
}

impl PrimitiveKind {
    /// Returns the string tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::GlyphRun => "GLYPH_RUN",
            PrimitiveKind::Image => "IMAGE",
            PrimitiveKind::Annotation => "ANNOTATION",
        }
    }

    /// Whether primitives of this kind can be partially removed.
    ///
    /// Glyph runs split at glyph granularity; images and annotations are
    /// all-or-nothing.
    pub fn splittable(&self) -> bool {
        matches!(self, PrimitiveKind::GlyphRun)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference to one Content Model primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimitiveRef {
    pub id: PrimitiveId,
    pub kind: PrimitiveKind,
}

impl PrimitiveRef {
    pub fn new(id: PrimitiveId, kind: PrimitiveKind) -> Self {
        Self { id, kind }
    }
}

impl fmt::Display for PrimitiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.id)
    }
}
