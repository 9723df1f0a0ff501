//! Pixel-space to page-space mapping for the recognition fallback.
//!
//! The recognition engine is not trusted to emit page coordinates: it sees
//! only the rasterized image and reports word polygons in image pixels.
//! [`RasterTransform`] holds the exact scale and rotation the page was
//! rasterized with and inverts them as a fixed affine map — never an
//! approximation.

use crate::content::PrimitiveRef;
use crate::geometry::{BBox, Rotation};
use crate::index::{ExtractionMethod, TextIndex, TextIndexBuilder};

/// A word produced by the external recognition engine, in image-pixel
/// space.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    /// Recognized text.
    pub text: String,
    /// Engine confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Bounding polygon in image pixels, top-left origin.
    pub polygon: Vec<(f64, f64)>,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, confidence: f64, polygon: Vec<(f64, f64)>) -> Self {
        Self {
            text: text.into(),
            confidence,
            polygon,
        }
    }

    /// Axis-aligned pixel-space bounding box of the polygon.
    pub fn pixel_bbox(&self) -> Option<BBox> {
        let mut points = self.polygon.iter();
        let &(x, y) = points.next()?;
        let (mut x0, mut top, mut x1, mut bottom) = (x, y, x, y);
        for &(x, y) in points {
            x0 = x0.min(x);
            top = top.min(y);
            x1 = x1.max(x);
            bottom = bottom.max(y);
        }
        Some(BBox::new(x0, top, x1, bottom))
    }
}

/// The exact affine map from raster pixels back to page coordinates.
///
/// Rasterization renders the page at `scale` pixels per point after
/// applying the page rotation (a rotated page is rasterized upright so the
/// recognizer sees readable text). The inverse is applied here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterTransform {
    scale: f64,
    rotation: Rotation,
    page_width: f64,
    page_height: f64,
}

impl RasterTransform {
    /// Build a transform for a page of the given size (points, unrotated
    /// frame) rasterized at `scale` pixels per point with `rotation`
    /// applied.
    pub fn new(scale: f64, rotation: Rotation, page_bounds: BBox) -> Self {
        Self {
            scale,
            rotation,
            page_width: page_bounds.width(),
            page_height: page_bounds.height(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Pixel dimensions of the raster image this transform describes.
    pub fn image_size(&self) -> (u32, u32) {
        let (w, h) = if self.rotation.swaps_axes() {
            (self.page_height, self.page_width)
        } else {
            (self.page_width, self.page_height)
        };
        ((w * self.scale).round() as u32, (h * self.scale).round() as u32)
    }

    /// Map one pixel-space point back to page coordinates.
    pub fn point_to_page(&self, px: f64, py: f64) -> (f64, f64) {
        // Undo the scale, then the rotation. Display coordinates are the
        // rotated frame the image was rendered in.
        let u = px / self.scale;
        let v = py / self.scale;
        match self.rotation {
            Rotation::None => (u, v),
            Rotation::Cw90 => (v, self.page_height - u),
            Rotation::Cw180 => (self.page_width - u, self.page_height - v),
            Rotation::Cw270 => (self.page_width - v, u),
        }
    }

    /// Map a pixel-space box back to a page-space box.
    pub fn to_page(&self, pixel_box: &BBox) -> BBox {
        let corners = [
            self.point_to_page(pixel_box.x0, pixel_box.top),
            self.point_to_page(pixel_box.x1, pixel_box.top),
            self.point_to_page(pixel_box.x1, pixel_box.bottom),
            self.point_to_page(pixel_box.x0, pixel_box.bottom),
        ];
        let mut x0 = f64::INFINITY;
        let mut top = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for (x, y) in corners {
            x0 = x0.min(x);
            top = top.min(y);
            x1 = x1.max(x);
            bottom = bottom.max(y);
        }
        BBox::new(x0, top, x1, bottom)
    }
}

/// Build a page text index from recognition output.
///
/// Words are ordered into reading order (lines top to bottom, words left
/// to right within a line, using the same vertical-overlap rule the
/// resolver applies), joined with spaces within a line and newlines
/// between lines — exactly how the native path assigns offsets, so the
/// resolver never needs to know which path ran. Words below
/// `low_confidence_threshold` keep their geometry and are tagged, never
/// dropped.
pub fn build_recognized_index(
    words: &[RecognizedWord],
    transform: &RasterTransform,
    vertical_overlap: f64,
    low_confidence_threshold: f64,
    page_bounds: BBox,
    image_primitive: PrimitiveRef,
) -> TextIndex {
    let mut placed: Vec<(BBox, &RecognizedWord)> = words
        .iter()
        .filter(|w| !w.text.is_empty())
        .filter_map(|w| w.pixel_bbox().map(|b| (transform.to_page(&b), w)))
        .collect();

    // Cluster into lines by vertical overlap, then order for reading.
    let mut lines: Vec<(BBox, Vec<(BBox, &RecognizedWord)>)> = Vec::new();
    for (bbox, word) in placed.drain(..) {
        match lines
            .iter_mut()
            .find(|(extent, _)| extent.vertical_overlap_fraction(&bbox) > vertical_overlap)
        {
            Some((extent, members)) => {
                *extent = extent.union(&bbox);
                members.push((bbox, word));
            }
            None => lines.push((bbox, vec![(bbox, word)])),
        }
    }
    // total_cmp: recognizer geometry is untrusted and may carry NaN
    lines.sort_by(|(a, _), (b, _)| a.top.total_cmp(&b.top));

    let mut builder = TextIndexBuilder::new(
        ExtractionMethod::Recognized,
        page_bounds,
        transform.rotation(),
    );

    for (line_no, (_, mut members)) in lines.into_iter().enumerate() {
        members.sort_by(|(a, _), (b, _)| a.x0.total_cmp(&b.x0));
        if line_no > 0 {
            builder.push_separator("\n", image_primitive);
        }
        for (word_no, (bbox, word)) in members.iter().enumerate() {
            if word_no > 0 {
                builder.push_separator(" ", image_primitive);
            }
            push_word_chars(&mut builder, word, bbox, low_confidence_threshold, image_primitive);
        }
    }

    builder.finish()
}

/// Split a word box into equal horizontal slices, one per character.
///
/// Recognizers report word-level geometry only; per-character slices keep
/// the offset→geometry invariant without inventing precision the engine
/// never provided.
fn push_word_chars(
    builder: &mut TextIndexBuilder,
    word: &RecognizedWord,
    bbox: &BBox,
    low_confidence_threshold: f64,
    image_primitive: PrimitiveRef,
) {
    let low_confidence = word.confidence < low_confidence_threshold;
    let chars: Vec<char> = word.text.chars().collect();
    let slice_width = bbox.width() / chars.len() as f64;
    for (i, ch) in chars.iter().enumerate() {
        let x0 = bbox.x0 + i as f64 * slice_width;
        builder.push(
            &ch.to_string(),
            BBox::new(x0, bbox.top, x0 + slice_width, bbox.bottom),
            image_primitive,
            low_confidence,
        );
    }
}
