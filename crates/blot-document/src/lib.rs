//! Document boundary for the blot redaction engine.
//!
//! This crate defines the traits a document backend implements
//! ([`DocumentAccess`], [`PageAccess`], [`RecognitionEngine`]) and ships
//! an in-memory reference backend ([`ModelDocument`]) used for testing
//! and for pipelines that build documents programmatically.

pub mod access;
pub mod error;
pub mod model;
pub mod recognize;

pub use access::{
    DocumentAccess, MetadataField, PageAccess, PageEdit, PrimitiveGeom, PrimitiveRemoval,
    RasterImage,
};
pub use error::DocumentError;
pub use model::{Glyph, ModelDocument, ModelPage};
pub use recognize::{RecognitionEngine, ScriptedRecognizer};
