//! blot: a redaction coordinate and content-removal engine.
//!
//! Given a paginated document and detector-supplied entity spans (character
//! offsets into each page's extracted text), blot resolves the spans to
//! page geometry, draws opaque markers, removes the underlying renderable
//! content non-recoverably, scrubs matching metadata, and returns an
//! append-only audit trail with one record per span.
//!
//! ```
//! use blot::{CancelToken, EntitySpan, Redactor};
//! use blot_document::{ModelDocument, PageAccess};
//!
//! let mut doc = ModelDocument::new();
//! doc.add_page(612.0, 792.0)
//!     .add_text_line(72.0, 100.0, 12.0, "Contact: Jane Doe");
//!
//! let redactor = Redactor::default();
//! let spans = vec![vec![EntitySpan::new("PERSON", 0.92, 9, 17)]];
//! let trail = redactor
//!     .redact(&mut doc, &spans, None, &CancelToken::new())
//!     .unwrap();
//!
//! assert_eq!(trail.applied_count(), 1);
//! let text = doc.page(0).unwrap().extract_text_index().unwrap().text().to_string();
//! assert!(!text.contains("Jane Doe"));
//! ```

mod apply;
mod cancel;
mod engine;
mod fallback;

pub use cancel::CancelToken;
pub use engine::Redactor;

pub use blot_core::{
    AuditOutcome, AuditRecord, AuditTrail, BBox, EntitySpan, ExtractionMethod, FlagReason,
    RecognizedWord, RedactError, RedactOptions, Rotation,
};
pub use blot_document::{DocumentAccess, PageAccess, RecognitionEngine};
