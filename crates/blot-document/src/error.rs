//! Errors crossing the document boundary.

use blot_core::RedactError;
use thiserror::Error;

/// Errors reported by a document backend.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A page index outside the document was addressed.
    #[error("page index {index} out of range (0..{count})")]
    PageOutOfRange { index: usize, count: usize },

    /// The backend rejected an atomic page edit; the page was left
    /// unmodified.
    #[error("page edit rejected: {0}")]
    EditRejected(String),

    /// The page could not be rasterized for recognition.
    #[error("rasterization failed: {0}")]
    RasterFailed(String),

    /// The external recognition engine reported a failure.
    #[error("recognition failed: {0}")]
    RecognitionFailed(String),

    /// The document is too damaged to process.
    #[error("document is corrupt: {0}")]
    Corrupt(String),
}

impl From<DocumentError> for RedactError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Corrupt(msg) => RedactError::CorruptDocument(msg),
            DocumentError::PageOutOfRange { index, count } => RedactError::PageOutOfRange {
                index,
                page_count: count,
            },
            other => RedactError::IoError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = DocumentError::PageOutOfRange { index: 4, count: 2 };
        assert_eq!(err.to_string(), "page index 4 out of range (0..2)");

        let err = DocumentError::EditRejected("page is locked".to_string());
        assert_eq!(err.to_string(), "page edit rejected: page is locked");
    }

    #[test]
    fn corrupt_maps_to_fatal_redact_error() {
        let err: RedactError = DocumentError::Corrupt("no page tree".to_string()).into();
        assert!(matches!(err, RedactError::CorruptDocument(_)));
    }

    #[test]
    fn edit_rejection_maps_to_io_error() {
        let err: RedactError = DocumentError::EditRejected("locked".to_string()).into();
        assert!(matches!(err, RedactError::IoError(_)));
    }
}
