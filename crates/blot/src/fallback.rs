//! Native-first text acquisition with image-recognition fallback.
//!
//! The native text layer is always tried first. Only a page with zero
//! extractable characters is rasterized and handed to the external
//! recognition engine; the recognizer's pixel-space output is mapped back
//! through the exact raster transform. Fallback failures never abort the
//! run: they flag every span on the affected page instead.

use std::time::{Duration, Instant};

use tracing::warn;

use blot_core::{
    FlagReason, PrimitiveKind, RasterTransform, RedactError, RedactOptions, TextIndex,
    build_recognized_index,
};
use blot_document::{PageAccess, RecognitionEngine};

/// Outcome of acquiring a page's text index.
pub(crate) enum PageIndex {
    Ready(TextIndex),
    /// No index could be produced; every span on the page gets this flag.
    Flagged(FlagReason),
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

/// Extract a page's text index, running the recognition fallback when the
/// native layer is empty and a recognizer is available.
pub(crate) fn acquire_text_index<P: PageAccess>(
    page: &P,
    recognizer: Option<&dyn RecognitionEngine>,
    options: &RedactOptions,
    deadline: Option<Instant>,
) -> Result<PageIndex, RedactError> {
    let native = page.extract_text_index().map_err(RedactError::from)?;
    if !native.needs_recognition() {
        return Ok(PageIndex::Ready(native));
    }
    let Some(engine) = recognizer else {
        return Ok(PageIndex::Ready(native));
    };

    // Recognized text is anchored to the page's image primitive; a blank
    // page without one has nothing to recognize.
    let Some(image_primitive) = page
        .primitives()
        .iter()
        .find(|g| g.primitive.kind == PrimitiveKind::Image)
        .map(|g| g.primitive)
    else {
        return Ok(PageIndex::Ready(native));
    };

    if expired(deadline) {
        return Ok(PageIndex::Flagged(FlagReason::Timeout {
            operation: "recognition".to_string(),
        }));
    }

    let image = match page.rasterize(options.raster_scale) {
        Ok(image) => image,
        Err(err) => {
            warn!(error = %err, "rasterization failed; page spans will be flagged");
            return Ok(PageIndex::Flagged(FlagReason::ResolutionEmpty));
        }
    };

    let words = match engine.recognize(&image, remaining(deadline)) {
        Ok(words) => words,
        Err(err) => {
            warn!(error = %err, "recognition failed; page spans will be flagged");
            return Ok(PageIndex::Flagged(FlagReason::ResolutionEmpty));
        }
    };

    if expired(deadline) {
        return Ok(PageIndex::Flagged(FlagReason::Timeout {
            operation: "recognition".to_string(),
        }));
    }

    let transform = RasterTransform::new(image.scale, page.rotation(), page.bounds());
    Ok(PageIndex::Ready(build_recognized_index(
        &words,
        &transform,
        options.vertical_overlap,
        options.low_confidence_threshold,
        page.bounds(),
        image_primitive,
    )))
}
