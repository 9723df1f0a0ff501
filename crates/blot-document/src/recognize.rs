//! External recognition engine boundary.

use std::time::Duration;

use blot_core::RecognizedWord;

use crate::access::RasterImage;
use crate::error::DocumentError;

/// An image-based text recognition engine.
///
/// The engine is an external collaborator and is not trusted to emit page
/// coordinates: it reports word polygons in image-pixel space, and the
/// caller maps them back through the exact raster transform. A `timeout`
/// is advisory for the engine itself; the caller enforces the deadline
/// regardless and treats overruns as a flagged (never fatal) condition.
pub trait RecognitionEngine {
    fn recognize(
        &self,
        image: &RasterImage,
        timeout: Option<Duration>,
    ) -> Result<Vec<RecognizedWord>, DocumentError>;
}

/// An engine that returns a fixed word list, ignoring pixels.
///
/// Used in tests and as a stand-in wherever recognition output is known
/// up front (e.g., replaying a previous engine run).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRecognizer {
    words: Vec<RecognizedWord>,
}

impl ScriptedRecognizer {
    pub fn new(words: Vec<RecognizedWord>) -> Self {
        Self { words }
    }
}

impl RecognitionEngine for ScriptedRecognizer {
    fn recognize(
        &self,
        _image: &RasterImage,
        _timeout: Option<Duration>,
    ) -> Result<Vec<RecognizedWord>, DocumentError> {
        Ok(self.words.clone())
    }
}
