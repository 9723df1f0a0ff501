//! Error and flag types for the redaction engine.
//!
//! Provides [`RedactError`] for fatal errors that stop processing of a
//! whole document, and [`FlagReason`] for per-region conditions that are
//! recovered locally and surfaced through the audit trail instead of
//! aborting the run.

use std::fmt;

use crate::content::PrimitiveRef;

/// Fatal error types for document redaction.
///
/// Only conditions that prevent enumerating or addressing pages are fatal;
/// everything that affects a single span, region, or page is a
/// [`FlagReason`] and keeps the run going.
#[derive(Debug, Clone, PartialEq)]
pub enum RedactError {
    /// The document is too damaged to enumerate pages.
    CorruptDocument(String),
    /// I/O error reading or writing document data.
    IoError(String),
    /// A page index outside the document was addressed internally.
    PageOutOfRange {
        /// The requested 0-based page index.
        index: usize,
        /// Number of pages in the document.
        page_count: usize,
    },
}

impl fmt::Display for RedactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedactError::CorruptDocument(msg) => write!(f, "corrupt document: {msg}"),
            RedactError::IoError(msg) => write!(f, "I/O error: {msg}"),
            RedactError::PageOutOfRange { index, page_count } => {
                write!(f, "page index {index} out of range (0..{page_count})")
            }
        }
    }
}

impl std::error::Error for RedactError {}

impl From<std::io::Error> for RedactError {
    fn from(err: std::io::Error) -> Self {
        RedactError::IoError(err.to_string())
    }
}

/// Reason a region (or every region of a page) could not be fully redacted.
///
/// A flagged region always still produces an audit record, and where
/// geometry was resolved an opaque marker is still drawn; the flag records
/// that the underlying content could not be confirmed removed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum FlagReason {
    /// Span offsets are inverted or fall outside the page text.
    InvalidSpan {
        start: usize,
        end: usize,
        /// Byte length of the page's concatenated text.
        text_len: usize,
    },
    /// The span resolved to no renderable geometry (e.g., pure whitespace).
    ResolutionEmpty,
    /// A covered primitive cannot be partially removed and extends outside
    /// the region.
    RemovalUnsupported {
        primitive: PrimitiveRef,
    },
    /// The document backend rejected the page's atomic edit; the page was
    /// left unmodified.
    PageMutationFailure {
        detail: String,
    },
    /// A recognition or scrub operation exceeded its deadline.
    Timeout {
        operation: String,
    },
    /// The run was cancelled after this region was resolved but before its
    /// content was removed.
    Cancelled,
}

impl FlagReason {
    /// Returns the string tag for this flag, used in audit exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagReason::InvalidSpan { .. } => "INVALID_SPAN",
            FlagReason::ResolutionEmpty => "RESOLUTION_EMPTY",
            FlagReason::RemovalUnsupported { .. } => "REMOVAL_UNSUPPORTED",
            FlagReason::PageMutationFailure { .. } => "PAGE_MUTATION_FAILURE",
            FlagReason::Timeout { .. } => "TIMEOUT",
            FlagReason::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagReason::InvalidSpan {
                start,
                end,
                text_len,
            } => write!(
                f,
                "invalid span: [{start}, {end}) against text of length {text_len}"
            ),
            FlagReason::ResolutionEmpty => write!(f, "span resolved to no geometry"),
            FlagReason::RemovalUnsupported { primitive } => {
                write!(f, "primitive {primitive} cannot be partially removed")
            }
            FlagReason::PageMutationFailure { detail } => {
                write!(f, "page mutation rejected: {detail}")
            }
            FlagReason::Timeout { operation } => write!(f, "{operation} timed out"),
            FlagReason::Cancelled => write!(f, "run cancelled before content removal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PrimitiveId, PrimitiveKind};

    #[test]
    fn redact_error_display() {
        let err = RedactError::CorruptDocument("xref table missing".to_string());
        assert_eq!(err.to_string(), "corrupt document: xref table missing");

        let err = RedactError::PageOutOfRange {
            index: 9,
            page_count: 3,
        };
        assert_eq!(err.to_string(), "page index 9 out of range (0..3)");
    }

    #[test]
    fn redact_error_implements_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(RedactError::IoError("disk full".to_string()));
        assert_eq!(err.to_string(), "I/O error: disk full");
    }

    #[test]
    fn redact_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: RedactError = io_err.into();
        assert!(matches!(err, RedactError::IoError(_)));
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn flag_reason_tags() {
        assert_eq!(
            FlagReason::InvalidSpan {
                start: 5,
                end: 200,
                text_len: 50
            }
            .as_str(),
            "INVALID_SPAN"
        );
        assert_eq!(FlagReason::ResolutionEmpty.as_str(), "RESOLUTION_EMPTY");
        assert_eq!(FlagReason::Cancelled.as_str(), "CANCELLED");
        assert_eq!(
            FlagReason::Timeout {
                operation: "recognition".to_string()
            }
            .as_str(),
            "TIMEOUT"
        );
    }

    #[test]
    fn flag_reason_display() {
        let flag = FlagReason::InvalidSpan {
            start: 5,
            end: 200,
            text_len: 50,
        };
        assert_eq!(
            flag.to_string(),
            "invalid span: [5, 200) against text of length 50"
        );

        let flag = FlagReason::RemovalUnsupported {
            primitive: PrimitiveRef::new(PrimitiveId(2), PrimitiveKind::Image),
        };
        assert_eq!(
            flag.to_string(),
            "primitive IMAGE#2 cannot be partially removed"
        );
    }

    #[test]
    fn flag_reason_clone_and_eq() {
        let flag = FlagReason::PageMutationFailure {
            detail: "page is locked".to_string(),
        };
        assert_eq!(flag.clone(), flag);
    }
}
