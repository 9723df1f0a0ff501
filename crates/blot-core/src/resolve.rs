//! Offset-to-region resolution.
//!
//! Turns one validated entity span plus a page's [`TextIndex`] into a
//! [`RedactionRegion`]: geometry is collected per character, clustered into
//! text lines by vertical overlap, merged horizontally within each line,
//! padded, and clipped. The resolver is agnostic to which extraction path
//! built the index.

use std::collections::HashSet;

use crate::error::FlagReason;
use crate::geometry::BBox;
use crate::index::{CharEntry, TextIndex};
use crate::options::RedactOptions;
use crate::region::RedactionRegion;
use crate::span::EntitySpan;

/// Gap between two same-line boxes, in multiples of the font-size
/// estimate, below which they are considered contiguous and merged.
/// Covers ordinary inter-word spaces; column gaps stay separate.
const MERGE_GAP_EM: f64 = 1.0;

/// Resolve one entity span against a page's text index.
///
/// Offsets are validated, never silently truncated: an inverted or
/// out-of-range span is rejected with [`FlagReason::InvalidSpan`], and a
/// span covering no renderable geometry (pure whitespace) is rejected with
/// [`FlagReason::ResolutionEmpty`].
pub fn resolve_span(
    page_index: usize,
    span: &EntitySpan,
    index: &TextIndex,
    options: &RedactOptions,
) -> Result<RedactionRegion, FlagReason> {
    if span.start >= span.end || span.end > index.len() {
        return Err(FlagReason::InvalidSpan {
            start: span.start,
            end: span.end,
            text_len: index.len(),
        });
    }

    let covered = index
        .entry_indices(span.start, span.end)
        .ok_or(FlagReason::InvalidSpan {
            start: span.start,
            end: span.end,
            text_len: index.len(),
        })?;

    let renderable: Vec<&CharEntry> = covered
        .iter()
        .map(|&i| &index.entries()[i])
        .filter(|e| e.is_renderable())
        .collect();
    if renderable.is_empty() {
        return Err(FlagReason::ResolutionEmpty);
    }

    let font_size = font_size_estimate(&renderable);
    let lines = cluster_lines(&renderable, options.vertical_overlap);

    let mut primitives = Vec::new();
    let mut seen = HashSet::new();
    for entry in &renderable {
        if seen.insert(entry.primitive) {
            primitives.push(entry.primitive);
        }
    }

    let covered_set: HashSet<usize> = covered.iter().copied().collect();
    let pad = options.padding_factor * font_size;
    let bounds = index.page_bounds();

    let mut line_boxes = Vec::new();
    for line in &lines {
        for merged in merge_line(line, font_size) {
            let padded = pad_box(&merged, pad, index, &covered_set);
            line_boxes.push(padded.clip_to(&bounds));
        }
    }
    // total_cmp throughout: backend geometry is untrusted and may carry NaN
    line_boxes.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let low_confidence = renderable.iter().any(|e| e.low_confidence);

    Ok(RedactionRegion::new(
        page_index,
        line_boxes,
        span.clone(),
        primitives,
        low_confidence,
    ))
}

/// Median box height of the covered characters, used as the font-size
/// estimate for padding and merge tolerances.
fn font_size_estimate(entries: &[&CharEntry]) -> f64 {
    let mut heights: Vec<f64> = entries.iter().map(|e| e.bbox.height()).collect();
    heights.sort_by(|a, b| a.total_cmp(b));
    heights[heights.len() / 2]
}

/// Group covered characters into line clusters.
///
/// Two boxes belong to the same line when their vertical extents overlap
/// by more than `vertical_overlap` of the shorter box. Characters are
/// visited in emission order, so a wrapped span naturally produces one
/// cluster per visual line.
fn cluster_lines<'a>(entries: &[&'a CharEntry], vertical_overlap: f64) -> Vec<Vec<&'a CharEntry>> {
    let mut lines: Vec<(BBox, Vec<&CharEntry>)> = Vec::new();

    for &entry in entries {
        let placed = lines.iter_mut().find(|(extent, _)| {
            extent.vertical_overlap_fraction(&entry.bbox) > vertical_overlap
        });
        match placed {
            Some((extent, members)) => {
                *extent = extent.union(&entry.bbox);
                members.push(entry);
            }
            None => lines.push((entry.bbox, vec![entry])),
        }
    }

    lines.sort_by(|(a, _), (b, _)| a.top.total_cmp(&b.top));
    lines.into_iter().map(|(_, members)| members).collect()
}

/// Merge the boxes of one line cluster into as few boxes as possible.
///
/// Boxes that overlap or sit within the merge gap are unioned; larger
/// gaps (separate columns hit by one span) produce separate boxes.
fn merge_line(entries: &[&CharEntry], font_size: f64) -> Vec<BBox> {
    let mut boxes: Vec<BBox> = entries.iter().map(|e| e.bbox).collect();
    boxes.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    let max_gap = MERGE_GAP_EM * font_size;
    let mut merged: Vec<BBox> = Vec::new();
    for bbox in boxes {
        match merged.last_mut() {
            Some(last) if bbox.x0 - last.x1 <= max_gap => *last = last.union(&bbox),
            _ => merged.push(bbox),
        }
    }
    merged
}

/// Pad a merged box without crossing into unrelated adjacent text.
///
/// Each side is expanded by `pad`, truncated at the midpoint of the gap to
/// the nearest renderable character outside the span in that direction.
fn pad_box(merged: &BBox, pad: f64, index: &TextIndex, covered: &HashSet<usize>) -> BBox {
    let mut left_limit = pad;
    let mut right_limit = pad;
    let mut top_limit = pad;
    let mut bottom_limit = pad;

    for (i, entry) in index.entries().iter().enumerate() {
        if covered.contains(&i) || !entry.is_renderable() {
            continue;
        }
        let neighbor = &entry.bbox;

        let vertical_neighbor = neighbor.bottom > merged.top && neighbor.top < merged.bottom;
        if vertical_neighbor {
            if neighbor.x1 <= merged.x0 {
                left_limit = left_limit.min((merged.x0 - neighbor.x1) / 2.0);
            }
            if neighbor.x0 >= merged.x1 {
                right_limit = right_limit.min((neighbor.x0 - merged.x1) / 2.0);
            }
        }

        let horizontal_neighbor = neighbor.x1 > merged.x0 && neighbor.x0 < merged.x1;
        if horizontal_neighbor {
            if neighbor.bottom <= merged.top {
                top_limit = top_limit.min((merged.top - neighbor.bottom) / 2.0);
            }
            if neighbor.top >= merged.bottom {
                bottom_limit = bottom_limit.min((neighbor.top - merged.bottom) / 2.0);
            }
        }
    }

    BBox::new(
        merged.x0 - left_limit.max(0.0),
        merged.top - top_limit.max(0.0),
        merged.x1 + right_limit.max(0.0),
        merged.bottom + bottom_limit.max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PrimitiveId, PrimitiveKind, PrimitiveRef};
    use crate::geometry::Rotation;
    use crate::index::{ExtractionMethod, TextIndexBuilder};

    const CHAR_W: f64 = 6.0;
    const CHAR_H: f64 = 12.0;

    fn run_ref(id: u32) -> PrimitiveRef {
        PrimitiveRef::new(PrimitiveId(id), PrimitiveKind::GlyphRun)
    }

    /// Lay out lines of text starting at (10, 100), one run per line,
    /// 6pt-wide chars on 12pt-tall lines with 4pt leading.
    fn index_from_lines(lines: &[&str]) -> TextIndex {
        index_from_lines_at(lines, 10.0, 100.0)
    }

    fn index_from_lines_at(lines: &[&str], x_origin: f64, y_origin: f64) -> TextIndex {
        let bounds = BBox::new(0.0, 0.0, 612.0, 792.0);
        let mut builder = TextIndexBuilder::new(ExtractionMethod::Native, bounds, Rotation::None);
        for (line_no, line) in lines.iter().enumerate() {
            if line_no > 0 {
                builder.push_separator("\n", run_ref(line_no as u32));
            }
            let top = y_origin + line_no as f64 * (CHAR_H + 4.0);
            for (i, ch) in line.chars().enumerate() {
                let x0 = x_origin + i as f64 * CHAR_W;
                builder.push(
                    &ch.to_string(),
                    BBox::new(x0, top, x0 + CHAR_W, top + CHAR_H),
                    run_ref(line_no as u32),
                    false,
                );
            }
        }
        builder.finish()
    }

    fn span(start: usize, end: usize) -> EntitySpan {
        EntitySpan::new("PERSON", 0.9, start, end)
    }

    #[test]
    fn single_line_span_resolves_to_one_box() {
        let index = index_from_lines(&["Contact: Jane Doe"]);
        let region =
            resolve_span(0, &span(9, 17), &index, &RedactOptions::default()).unwrap();

        assert_eq!(region.line_boxes().len(), 1);
        let bbox = region.line_boxes()[0];
        // "Jane Doe" spans chars 9..17; padding may extend slightly
        let raw_x0 = 10.0 + 9.0 * CHAR_W;
        let raw_x1 = 10.0 + 17.0 * CHAR_W;
        assert!(bbox.x0 <= raw_x0 && bbox.x0 > raw_x0 - CHAR_H);
        assert!(bbox.x1 >= raw_x1 && bbox.x1 < raw_x1 + CHAR_H);
    }

    #[test]
    fn span_crossing_line_break_yields_two_line_boxes() {
        let index = index_from_lines(&["John", "Smith"]);
        assert_eq!(index.text(), "John\nSmith");

        let region = resolve_span(0, &span(0, 10), &index, &RedactOptions::default()).unwrap();
        assert_eq!(region.line_boxes().len(), 2);

        let first = region.line_boxes()[0];
        let second = region.line_boxes()[1];
        assert!(first.bottom <= second.top, "line boxes must not span the gap");
        // Padding is truncated at the midpoint of the 4pt leading
        assert!(second.top - first.bottom <= 4.0 + 1e-9);
    }

    #[test]
    fn interword_space_is_bridged_into_one_box() {
        let index = index_from_lines(&["Jane Doe"]);
        let region = resolve_span(0, &span(0, 8), &index, &RedactOptions::default()).unwrap();
        assert_eq!(region.line_boxes().len(), 1);
    }

    #[test]
    fn wide_column_gap_stays_split() {
        // Two columns on the same line, 200pt apart
        let bounds = BBox::new(0.0, 0.0, 612.0, 792.0);
        let mut builder = TextIndexBuilder::new(ExtractionMethod::Native, bounds, Rotation::None);
        for (i, ch) in "left".chars().enumerate() {
            let x0 = 10.0 + i as f64 * CHAR_W;
            builder.push(
                &ch.to_string(),
                BBox::new(x0, 100.0, x0 + CHAR_W, 100.0 + CHAR_H),
                run_ref(0),
                false,
            );
        }
        builder.push_separator(" ", run_ref(0));
        for (i, ch) in "right".chars().enumerate() {
            let x0 = 300.0 + i as f64 * CHAR_W;
            builder.push(
                &ch.to_string(),
                BBox::new(x0, 100.0, x0 + CHAR_W, 100.0 + CHAR_H),
                run_ref(1),
                false,
            );
        }
        let index = builder.finish();

        let region =
            resolve_span(0, &span(0, index.len()), &index, &RedactOptions::default()).unwrap();
        assert_eq!(region.line_boxes().len(), 2, "column gap must not be bridged");
    }

    #[test]
    fn inverted_span_is_rejected() {
        let index = index_from_lines(&["hello world"]);
        let err = resolve_span(0, &span(7, 3), &index, &RedactOptions::default()).unwrap_err();
        assert!(matches!(err, FlagReason::InvalidSpan { start: 7, end: 3, .. }));
    }

    #[test]
    fn out_of_range_span_is_rejected_not_truncated() {
        // Span [5, 200) against 50 chars of text
        let line = "a".repeat(50);
        let index = index_from_lines(&[&line]);
        let err = resolve_span(0, &span(5, 200), &index, &RedactOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FlagReason::InvalidSpan {
                start: 5,
                end: 200,
                text_len: 50
            }
        );
    }

    #[test]
    fn zero_length_span_is_rejected() {
        let index = index_from_lines(&["hello"]);
        let err = resolve_span(0, &span(2, 2), &index, &RedactOptions::default()).unwrap_err();
        assert!(matches!(err, FlagReason::InvalidSpan { .. }));
    }

    #[test]
    fn whitespace_only_span_is_resolution_empty() {
        let index = index_from_lines(&["ab   cd"]);
        let err = resolve_span(0, &span(2, 5), &index, &RedactOptions::default()).unwrap_err();
        assert_eq!(err, FlagReason::ResolutionEmpty);
    }

    #[test]
    fn padding_truncated_at_midpoint_to_adjacent_text() {
        let index = index_from_lines(&["ab cd"]);
        // Generous padding would reach into "ab"; the box may not cross
        // the midpoint of the space gap.
        let options = RedactOptions {
            padding_factor: 0.5,
            ..RedactOptions::default()
        };
        let region = resolve_span(0, &span(3, 5), &index, &options).unwrap();
        let bbox = region.line_boxes()[0];

        let ab_right = 10.0 + 2.0 * CHAR_W;
        let cd_left = 10.0 + 3.0 * CHAR_W;
        let midpoint = (ab_right + cd_left) / 2.0;
        assert!(bbox.x0 >= midpoint - 1e-9, "padding crossed into adjacent text");
        assert!(bbox.x0 < cd_left, "some padding should still be applied");
    }

    #[test]
    fn padding_clipped_at_page_bounds() {
        let index = index_from_lines_at(&["edge"], 0.0, 0.0);
        let region = resolve_span(0, &span(0, 4), &index, &RedactOptions::default()).unwrap();
        let bbox = region.line_boxes()[0];
        assert!(bbox.x0 >= 0.0);
        assert!(bbox.top >= 0.0);
    }

    #[test]
    fn low_confidence_entry_taints_region() {
        let bounds = BBox::new(0.0, 0.0, 612.0, 792.0);
        let mut builder =
            TextIndexBuilder::new(ExtractionMethod::Recognized, bounds, Rotation::None);
        builder.push("a", BBox::new(10.0, 100.0, 16.0, 112.0), run_ref(0), false);
        builder.push("b", BBox::new(16.0, 100.0, 22.0, 112.0), run_ref(0), true);
        let index = builder.finish();

        let region = resolve_span(0, &span(0, 2), &index, &RedactOptions::default()).unwrap();
        assert!(region.low_confidence());
    }

    #[test]
    fn primitives_are_deduplicated_in_order() {
        let index = index_from_lines(&["John", "Smith"]);
        let region = resolve_span(0, &span(0, 10), &index, &RedactOptions::default()).unwrap();
        let ids: Vec<u32> = region.primitives().iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn region_carries_originating_span() {
        let index = index_from_lines(&["Jane Doe"]);
        let s = span(0, 4);
        let region = resolve_span(3, &s, &index, &RedactOptions::default()).unwrap();
        assert_eq!(region.span(), &s);
        assert_eq!(region.page_index(), 3);
    }

    #[test]
    fn nan_geometry_resolves_without_panicking() {
        // A backend emitting NaN coordinates must not take the resolver
        // down; the malformed entry sorts deterministically via total_cmp.
        let bounds = BBox::new(0.0, 0.0, 612.0, 792.0);
        let mut builder = TextIndexBuilder::new(ExtractionMethod::Native, bounds, Rotation::None);
        builder.push("a", BBox::new(10.0, 100.0, 16.0, 112.0), run_ref(0), false);
        builder.push(
            "b",
            BBox::new(16.0, f64::NAN, 22.0, f64::NAN),
            run_ref(0),
            false,
        );
        builder.push("c", BBox::new(22.0, 100.0, 28.0, 112.0), run_ref(0), false);
        let index = builder.finish();

        let region = resolve_span(0, &span(0, 3), &index, &RedactOptions::default()).unwrap();
        assert!(!region.line_boxes().is_empty());
        // The well-formed characters still produce a usable box
        assert!(
            region
                .line_boxes()
                .iter()
                .any(|b| b.x0.is_finite() && b.top.is_finite())
        );
    }

    #[test]
    fn offsets_inside_multibyte_char_resolve_to_its_geometry() {
        let bounds = BBox::new(0.0, 0.0, 612.0, 792.0);
        let mut builder = TextIndexBuilder::new(ExtractionMethod::Native, bounds, Rotation::None);
        builder.push("é", BBox::new(10.0, 100.0, 16.0, 112.0), run_ref(0), false);
        let index = builder.finish();

        // Range covering only the second byte of "é"
        let region = resolve_span(0, &span(1, 2), &index, &RedactOptions::default()).unwrap();
        assert_eq!(region.line_boxes().len(), 1);
    }
}
