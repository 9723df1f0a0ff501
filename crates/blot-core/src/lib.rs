//! blot-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types of the blot redaction engine
//! (bounding boxes, text indexes, entity spans, redaction regions, audit
//! records) and the offset-to-region resolver. It knows nothing about any
//! concrete document format — the document boundary lives in
//! `blot-document`, and the pipeline in `blot`.

pub mod audit;
pub mod content;
pub mod error;
pub mod geometry;
pub mod index;
pub mod options;
pub mod raster;
pub mod region;
pub mod resolve;
pub mod span;

pub use audit::{AuditOutcome, AuditRecord, AuditTrail};
pub use content::{PrimitiveId, PrimitiveKind, PrimitiveRef};
pub use error::{FlagReason, RedactError};
pub use geometry::{BBox, Rotation};
pub use index::{CharEntry, ExtractionMethod, TextIndex, TextIndexBuilder};
pub use options::RedactOptions;
pub use raster::{RasterTransform, RecognizedWord, build_recognized_index};
pub use region::{RedactionRegion, RegionState};
pub use resolve::resolve_span;
pub use span::{EntitySpan, narrow_label_prefix};
