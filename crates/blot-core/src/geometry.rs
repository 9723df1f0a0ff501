/// Bounding box with top-left origin coordinate system.
///
/// Coordinates are in page points:
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Area of the bounding box. Zero for degenerate boxes.
    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// Returns `true` if the box has no positive extent in either axis.
    ///
    /// Degenerate boxes are used as placeholders for characters that have
    /// a text-index offset but no renderable geometry (line breaks,
    /// synthesized separators).
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Compute the intersection of two bounding boxes, if any.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let x0 = self.x0.max(other.x0);
        let top = self.top.max(other.top);
        let x1 = self.x1.min(other.x1);
        let bottom = self.bottom.min(other.bottom);
        if x0 < x1 && top < bottom {
            Some(BBox::new(x0, top, x1, bottom))
        } else {
            None
        }
    }

    /// Returns `true` if the boxes overlap with positive area.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.intersection(other).is_some()
    }

    /// Fraction of this box's area covered by `other`.
    ///
    /// Returns 0.0 when this box is degenerate or the boxes do not overlap.
    pub fn overlap_fraction(&self, other: &BBox) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        match self.intersection(other) {
            Some(inter) => inter.area() / area,
            None => 0.0,
        }
    }

    /// Fraction of vertical extent shared with `other`, relative to the
    /// shorter of the two boxes.
    ///
    /// Two character boxes on the same text line typically share most of
    /// their vertical extent; boxes on different lines share little or none.
    pub fn vertical_overlap_fraction(&self, other: &BBox) -> f64 {
        let overlap = self.bottom.min(other.bottom) - self.top.max(other.top);
        if overlap <= 0.0 {
            return 0.0;
        }
        let min_height = self.height().min(other.height());
        if min_height <= 0.0 {
            return 0.0;
        }
        overlap / min_height
    }

    /// Returns `true` if `other` lies entirely within this box, with a
    /// small tolerance on every edge.
    pub fn contains(&self, other: &BBox, tolerance: f64) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.top >= self.top - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.bottom <= self.bottom + tolerance
    }

    /// Clip this box to the given bounds. Degenerate results collapse to a
    /// zero-area box at the nearest edge.
    pub fn clip_to(&self, bounds: &BBox) -> BBox {
        BBox {
            x0: self.x0.clamp(bounds.x0, bounds.x1),
            top: self.top.clamp(bounds.top, bounds.bottom),
            x1: self.x1.clamp(bounds.x0, bounds.x1),
            bottom: self.bottom.clamp(bounds.top, bounds.bottom),
        }
    }

    /// Expand the box by `amount` on every side.
    pub fn expand(&self, amount: f64) -> BBox {
        BBox {
            x0: self.x0 - amount,
            top: self.top - amount,
            x1: self.x1 + amount,
            bottom: self.bottom + amount,
        }
    }
}

/// Page rotation inherited from the document, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalize an arbitrary degree value to one of the four supported
    /// rotations. Values that are not multiples of 90 fall back to `None`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Cw90,
            180 => Rotation::Cw180,
            270 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    /// The rotation angle in degrees (0, 90, 180, or 270).
    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}
