//! Content removal planning.
//!
//! Planning is read-only: each region is turned into a [`PageEdit`]
//! fragment (markers plus removals) and an optional flag, and the engine
//! commits the merged fragments for a page in one atomic edit. Glyph runs
//! are split at glyph granularity; images and annotations are removed
//! whole when the region fully contains them and flagged otherwise.

use blot_core::{BBox, FlagReason, RedactOptions, RedactionRegion};
use blot_document::{PageAccess, PageEdit, PrimitiveRemoval};

/// Tolerance in points for whole-primitive containment checks.
const CONTAINMENT_TOLERANCE: f64 = 0.5;

/// Fraction of a glyph's area that must fall under a region line box for
/// the glyph to be removed. Glyphs merely grazed by padding stay.
const GLYPH_COVER_FRACTION: f64 = 0.5;

/// The planned mutation for one region.
pub(crate) struct RegionPlan {
    pub edit: PageEdit,
    /// Set when some covered content could not be scheduled for removal.
    /// The markers in `edit` are still drawn.
    pub flag: Option<FlagReason>,
}

/// Plan markers and removals for one resolved region.
///
/// Every primitive the region's characters reference is considered
/// covered, as is any page primitive whose area overlaps the region's
/// line boxes beyond `options.partial_overlap_threshold`.
pub(crate) fn plan_region<P: PageAccess>(
    page: &P,
    region: &RedactionRegion,
    options: &RedactOptions,
) -> RegionPlan {
    let mut edit = PageEdit::new();
    edit.markers.extend(region.line_boxes().iter().copied());

    let mut flag = None;

    for geom in page.primitives() {
        let referenced = region.primitives().contains(&geom.primitive);
        // Coverage is judged against the actual line boxes, never their
        // bounding union: a multi-line region's union includes dead space
        // no line box touches, and content there must not be disturbed.
        let line_coverage: f64 = region
            .line_boxes()
            .iter()
            .map(|line| geom.bbox.overlap_fraction(line))
            .sum();
        let covered = referenced || line_coverage >= options.partial_overlap_threshold;
        if !covered {
            continue;
        }

        if geom.primitive.kind.splittable() {
            let Some(boxes) = page.glyph_boxes(geom.primitive.id) else {
                flag.get_or_insert(FlagReason::RemovalUnsupported {
                    primitive: geom.primitive,
                });
                continue;
            };
            let indices: Vec<usize> = boxes
                .iter()
                .enumerate()
                .filter(|(_, glyph)| covered_by_lines(glyph, region.line_boxes()))
                .map(|(i, _)| i)
                .collect();
            if !indices.is_empty() {
                edit.removals.push(PrimitiveRemoval::Glyphs {
                    id: geom.primitive.id,
                    indices,
                });
            }
        } else if region
            .line_boxes()
            .iter()
            .any(|line| line.contains(&geom.bbox, CONTAINMENT_TOLERANCE))
        {
            edit.removals.push(PrimitiveRemoval::Whole(geom.primitive.id));
        } else {
            // Partial removal of an image or annotation is not expressible;
            // the marker covers it visually but the content remains.
            flag.get_or_insert(FlagReason::RemovalUnsupported {
                primitive: geom.primitive,
            });
        }
    }

    RegionPlan { edit, flag }
}

fn covered_by_lines(glyph: &BBox, lines: &[BBox]) -> bool {
    lines
        .iter()
        .any(|line| glyph.overlap_fraction(line) >= GLYPH_COVER_FRACTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blot_core::{EntitySpan, resolve_span};
    use blot_document::ModelPage;

    fn resolve(
        page: &ModelPage,
        span: EntitySpan,
        options: &RedactOptions,
    ) -> RedactionRegion {
        let index = page.extract_text_index().unwrap();
        resolve_span(0, &span, &index, options).unwrap()
    }

    #[test]
    fn glyph_run_is_split_at_glyph_granularity() {
        let mut page = ModelPage::new(612.0, 792.0);
        let run = page.add_text_line(10.0, 100.0, 12.0, "Contact: Jane Doe");
        let options = RedactOptions::default();
        let region = resolve(&page, EntitySpan::new("PERSON", 0.9, 9, 17), &options);

        let plan = plan_region(&page, &region, &options);
        assert!(plan.flag.is_none());
        assert_eq!(plan.edit.markers.len(), 1);
        assert_eq!(plan.edit.removals.len(), 1);
        match &plan.edit.removals[0] {
            PrimitiveRemoval::Glyphs { id, indices } => {
                assert_eq!(*id, run);
                // "Jane Doe" is glyphs 9..17
                assert_eq!(indices.as_slice(), &[9, 10, 11, 12, 13, 14, 15, 16]);
            }
            other => panic!("expected glyph removal, got {other:?}"),
        }
    }

    #[test]
    fn untouched_run_is_left_alone() {
        let mut page = ModelPage::new(612.0, 792.0);
        page.add_text_line(10.0, 100.0, 12.0, "redact me");
        let other = page.add_text_line(10.0, 400.0, 12.0, "keep me");
        let options = RedactOptions::default();
        let region = resolve(&page, EntitySpan::new("PERSON", 0.9, 0, 9), &options);

        let plan = plan_region(&page, &region, &options);
        assert!(
            plan.edit
                .removals
                .iter()
                .all(|removal| removal.id() != other)
        );
    }

    #[test]
    fn contained_annotation_is_removed_whole() {
        let mut page = ModelPage::new(612.0, 792.0);
        page.add_text_line(10.0, 100.0, 12.0, "0123456789");
        // Annotation sitting inside the text's footprint
        let note = page.add_annotation(BBox::new(12.0, 101.0, 40.0, 111.0), "inline note");
        let options = RedactOptions::default();
        let region = resolve(&page, EntitySpan::new("PERSON", 0.9, 0, 10), &options);

        let plan = plan_region(&page, &region, &options);
        assert!(plan.flag.is_none());
        assert!(
            plan.edit
                .removals
                .contains(&PrimitiveRemoval::Whole(note))
        );
    }

    #[test]
    fn overlapping_image_flags_removal_unsupported() {
        let mut page = ModelPage::new(612.0, 792.0);
        page.add_text_line(10.0, 100.0, 12.0, "0123456789");
        // Image mostly inside the region but extending below it
        page.add_image(BBox::new(30.0, 95.0, 70.0, 130.0));
        let options = RedactOptions::default();
        let region = resolve(&page, EntitySpan::new("PERSON", 0.9, 0, 10), &options);

        let plan = plan_region(&page, &region, &options);
        assert!(matches!(
            plan.flag,
            Some(FlagReason::RemovalUnsupported { .. })
        ));
        // The marker is still drawn
        assert!(!plan.edit.markers.is_empty());
    }

    #[test]
    fn dead_zone_between_line_boxes_is_untouched() {
        let mut page = ModelPage::new(612.0, 792.0);
        page.add_text_line(72.0, 100.0, 12.0, "John Wilson");
        page.add_text_line(72.0, 118.0, 12.0, "Smith");
        // Right of "Smith": inside the union of the two line boxes but
        // intersecting neither
        let note_box = BBox::new(120.0, 118.0, 150.0, 130.0);
        let note = page.add_annotation(note_box, "margin note");
        let options = RedactOptions::default();
        let region = resolve(&page, EntitySpan::new("PERSON", 0.9, 0, 17), &options);

        assert_eq!(region.line_boxes().len(), 2);
        assert!(region.line_boxes().iter().all(|b| !b.intersects(&note_box)));
        assert!(region.bounding_box().contains(&note_box, 0.5));

        let plan = plan_region(&page, &region, &options);
        assert!(plan.flag.is_none());
        assert!(
            plan.edit.removals.iter().all(|r| r.id() != note),
            "content touching no line box must not be removed"
        );
    }

    #[test]
    fn distant_image_is_not_covered() {
        let mut page = ModelPage::new(612.0, 792.0);
        page.add_text_line(10.0, 100.0, 12.0, "0123456789");
        page.add_image(BBox::new(400.0, 600.0, 500.0, 700.0));
        let options = RedactOptions::default();
        let region = resolve(&page, EntitySpan::new("PERSON", 0.9, 0, 10), &options);

        let plan = plan_region(&page, &region, &options);
        assert!(plan.flag.is_none());
        assert_eq!(plan.edit.removals.len(), 1);
    }
}
