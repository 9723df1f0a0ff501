//! In-memory document model backend.
//!
//! `ModelDocument` is the reference implementation of [`DocumentAccess`]:
//! pages own their Content Model (glyph runs with per-glyph geometry,
//! image placements, annotations) directly, page edits are validated
//! before any mutation so commits are atomic, and re-extraction after an
//! edit reflects exactly what remains renderable. Rasterization produces a
//! blank canvas at the exact requested geometry — the model does not
//! paint glyphs, so recognition flows are exercised with scripted engines.

use std::collections::{BTreeSet, HashMap};

use blot_core::{
    BBox, ExtractionMethod, PrimitiveId, PrimitiveKind, PrimitiveRef, RasterTransform, Rotation,
    TextIndex, TextIndexBuilder,
};

use crate::access::{
    DocumentAccess, MetadataField, PageAccess, PageEdit, PrimitiveGeom, PrimitiveRemoval,
    RasterImage,
};
use crate::error::DocumentError;

/// Width of one glyph cell relative to the font size.
const GLYPH_ADVANCE_EM: f64 = 0.6;

/// One positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub bbox: BBox,
}

#[derive(Debug, Clone)]
struct GlyphRun {
    id: PrimitiveId,
    glyphs: Vec<Glyph>,
}

#[derive(Debug, Clone)]
struct PlacedImage {
    id: PrimitiveId,
    bbox: BBox,
}

#[derive(Debug, Clone)]
struct ModelAnnotation {
    id: PrimitiveId,
    bbox: BBox,
    contents: String,
}

/// One page of a [`ModelDocument`].
#[derive(Debug, Clone)]
pub struct ModelPage {
    bounds: BBox,
    rotation: Rotation,
    runs: Vec<GlyphRun>,
    images: Vec<PlacedImage>,
    annotations: Vec<ModelAnnotation>,
    markers: Vec<BBox>,
    locked: bool,
    next_id: u32,
}

impl ModelPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            bounds: BBox::new(0.0, 0.0, width, height),
            rotation: Rotation::None,
            runs: Vec::new(),
            images: Vec::new(),
            annotations: Vec::new(),
            markers: Vec::new(),
            locked: false,
            next_id: 0,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    fn take_id(&mut self) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place a line of text as one glyph run. Each character gets a
    /// fixed-advance cell of `GLYPH_ADVANCE_EM * font_size` points.
    /// Returns the run's primitive id.
    pub fn add_text_line(
        &mut self,
        x0: f64,
        top: f64,
        font_size: f64,
        text: &str,
    ) -> PrimitiveId {
        let id = self.take_id();
        let advance = GLYPH_ADVANCE_EM * font_size;
        let glyphs = text
            .chars()
            .enumerate()
            .map(|(i, ch)| Glyph {
                text: ch.to_string(),
                bbox: BBox::new(
                    x0 + i as f64 * advance,
                    top,
                    x0 + (i + 1) as f64 * advance,
                    top + font_size,
                ),
            })
            .collect();
        self.runs.push(GlyphRun { id, glyphs });
        id
    }

    /// Place an image.
    pub fn add_image(&mut self, bbox: BBox) -> PrimitiveId {
        let id = self.take_id();
        self.images.push(PlacedImage { id, bbox });
        id
    }

    /// Place an annotation with renderable text contents.
    pub fn add_annotation(&mut self, bbox: BBox, contents: impl Into<String>) -> PrimitiveId {
        let id = self.take_id();
        self.annotations.push(ModelAnnotation {
            id,
            bbox,
            contents: contents.into(),
        });
        id
    }

    /// Lock the page against mutation (e.g., a digitally signed page).
    /// Edits against a locked page are rejected atomically.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Opaque markers drawn so far.
    pub fn markers(&self) -> &[BBox] {
        &self.markers
    }

    /// Total glyph count across all runs.
    pub fn glyph_count(&self) -> usize {
        self.runs.iter().map(|r| r.glyphs.len()).sum()
    }

    /// Annotation contents by primitive id, if the annotation exists.
    pub fn annotation_contents(&self, id: PrimitiveId) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.contents.as_str())
    }

    fn run(&self, id: PrimitiveId) -> Option<&GlyphRun> {
        self.runs.iter().find(|r| r.id == id)
    }

    fn has_primitive(&self, id: PrimitiveId) -> bool {
        self.runs.iter().any(|r| r.id == id)
            || self.images.iter().any(|i| i.id == id)
            || self.annotations.iter().any(|a| a.id == id)
    }

    fn scrub_annotations(&mut self, needles: &[String]) -> usize {
        let mut scrubbed = 0;
        for annotation in &mut self.annotations {
            if annotation.contents.is_empty() {
                continue;
            }
            if needles.iter().any(|n| annotation.contents.contains(n)) {
                annotation.contents.clear();
                scrubbed += 1;
            }
        }
        scrubbed
    }

    fn validate_edit(&self, edit: &PageEdit) -> Result<(), DocumentError> {
        if self.locked {
            return Err(DocumentError::EditRejected("page is locked".to_string()));
        }
        for removal in &edit.removals {
            match removal {
                PrimitiveRemoval::Whole(id) => {
                    if !self.has_primitive(*id) {
                        return Err(DocumentError::EditRejected(format!(
                            "unknown primitive {id}"
                        )));
                    }
                }
                PrimitiveRemoval::Glyphs { id, indices } => {
                    let Some(run) = self.run(*id) else {
                        return Err(DocumentError::EditRejected(format!(
                            "unknown glyph run {id}"
                        )));
                    };
                    if let Some(&bad) = indices.iter().find(|&&i| i >= run.glyphs.len()) {
                        return Err(DocumentError::EditRejected(format!(
                            "glyph index {bad} out of range for run {id}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl PageAccess for ModelPage {
    fn bounds(&self) -> BBox {
        self.bounds
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn extract_text_index(&self) -> Result<TextIndex, DocumentError> {
        let mut builder =
            TextIndexBuilder::new(ExtractionMethod::Native, self.bounds, self.rotation);

        let mut prev: Option<(&GlyphRun, &Glyph)> = None;
        for run in &self.runs {
            let Some(first) = run.glyphs.first() else {
                continue;
            };
            let run_ref = PrimitiveRef::new(run.id, PrimitiveKind::GlyphRun);
            if let Some((prev_run, last)) = prev {
                let prev_ref = PrimitiveRef::new(prev_run.id, PrimitiveKind::GlyphRun);
                // Same line continues with a space; a vertical jump is a
                // line break. Emission order is preserved either way.
                if last.bbox.vertical_overlap_fraction(&first.bbox) > 0.5 {
                    builder.push_separator(" ", prev_ref);
                } else {
                    builder.push_separator("\n", prev_ref);
                }
            }
            for glyph in &run.glyphs {
                builder.push(&glyph.text, glyph.bbox, run_ref, false);
            }
            prev = Some((run, run.glyphs.last().unwrap_or(first)));
        }

        Ok(builder.finish())
    }

    fn rasterize(&self, scale: f64) -> Result<RasterImage, DocumentError> {
        if !(scale > 0.0) {
            return Err(DocumentError::RasterFailed(format!(
                "non-positive scale {scale}"
            )));
        }
        let transform = RasterTransform::new(scale, self.rotation, self.bounds);
        let (width, height) = transform.image_size();
        Ok(RasterImage {
            width,
            height,
            scale,
            pixels: vec![0xFF; width as usize * height as usize],
        })
    }

    fn primitives(&self) -> Vec<PrimitiveGeom> {
        let mut out = Vec::new();
        for run in &self.runs {
            let Some(first) = run.glyphs.first() else {
                continue;
            };
            let bbox = run
                .glyphs
                .iter()
                .skip(1)
                .fold(first.bbox, |acc, g| acc.union(&g.bbox));
            out.push(PrimitiveGeom {
                primitive: PrimitiveRef::new(run.id, PrimitiveKind::GlyphRun),
                bbox,
            });
        }
        for image in &self.images {
            out.push(PrimitiveGeom {
                primitive: PrimitiveRef::new(image.id, PrimitiveKind::Image),
                bbox: image.bbox,
            });
        }
        for annotation in &self.annotations {
            out.push(PrimitiveGeom {
                primitive: PrimitiveRef::new(annotation.id, PrimitiveKind::Annotation),
                bbox: annotation.bbox,
            });
        }
        out
    }

    fn glyph_boxes(&self, id: PrimitiveId) -> Option<Vec<BBox>> {
        self.run(id)
            .map(|run| run.glyphs.iter().map(|g| g.bbox).collect())
    }

    fn apply_edit(&mut self, edit: &PageEdit) -> Result<(), DocumentError> {
        self.validate_edit(edit)?;

        let mut whole: BTreeSet<PrimitiveId> = BTreeSet::new();
        let mut per_run: HashMap<PrimitiveId, BTreeSet<usize>> = HashMap::new();
        for removal in &edit.removals {
            match removal {
                PrimitiveRemoval::Whole(id) => {
                    whole.insert(*id);
                }
                PrimitiveRemoval::Glyphs { id, indices } => {
                    per_run.entry(*id).or_default().extend(indices.iter());
                }
            }
        }

        self.runs.retain(|r| !whole.contains(&r.id));
        self.images.retain(|i| !whole.contains(&i.id));
        self.annotations.retain(|a| !whole.contains(&a.id));

        for run in &mut self.runs {
            if let Some(doomed) = per_run.get(&run.id) {
                let mut position = 0;
                run.glyphs.retain(|_| {
                    let keep = !doomed.contains(&position);
                    position += 1;
                    keep
                });
            }
        }

        self.markers.extend(edit.markers.iter().copied());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            markers = edit.markers.len(),
            removals = edit.removals.len(),
            "page edit committed"
        );

        Ok(())
    }
}

/// An in-memory document: pages plus info/outline metadata.
#[derive(Debug, Clone, Default)]
pub struct ModelDocument {
    pages: Vec<ModelPage>,
    info: Vec<MetadataField>,
    outline: Vec<String>,
}

impl ModelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and return a mutable handle for populating it.
    pub fn add_page(&mut self, width: f64, height: f64) -> &mut ModelPage {
        self.pages.push(ModelPage::new(width, height));
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn push_page(&mut self, page: ModelPage) {
        self.pages.push(page);
    }

    pub fn page(&self, index: usize) -> Option<&ModelPage> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut ModelPage> {
        self.pages.get_mut(index)
    }

    /// Set a document info field, replacing any existing field of the
    /// same name.
    pub fn set_info(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.info.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.info.push(MetadataField { name, value }),
        }
    }

    /// Append an outline (table of contents) entry.
    pub fn add_outline_entry(&mut self, title: impl Into<String>) {
        self.outline.push(title.into());
    }

    pub fn outline(&self) -> &[String] {
        &self.outline
    }
}

impl DocumentAccess for ModelDocument {
    type Page = ModelPage;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn pages(&self) -> &[ModelPage] {
        &self.pages
    }

    fn pages_mut(&mut self) -> &mut [ModelPage] {
        &mut self.pages
    }

    fn metadata_fields(&self) -> Vec<MetadataField> {
        let mut fields = self.info.clone();
        for title in &self.outline {
            fields.push(MetadataField {
                name: "Outline".to_string(),
                value: title.clone(),
            });
        }
        fields
    }

    fn scrub_metadata(&mut self, needles: &[String]) -> usize {
        let needles: Vec<&String> = needles.iter().filter(|n| !n.is_empty()).collect();
        if needles.is_empty() {
            return 0;
        }

        let mut scrubbed = 0;
        for field in &mut self.info {
            if field.value.is_empty() {
                continue;
            }
            if needles.iter().any(|n| field.value.contains(n.as_str())) {
                field.value.clear();
                scrubbed += 1;
            }
        }
        for title in &mut self.outline {
            if title.is_empty() {
                continue;
            }
            if needles.iter().any(|n| title.contains(n.as_str())) {
                title.clear();
                scrubbed += 1;
            }
        }
        let owned: Vec<String> = needles.into_iter().cloned().collect();
        for page in &mut self.pages {
            scrubbed += page.scrub_annotations(&owned);
        }
        scrubbed
    }
}
