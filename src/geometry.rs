//! Bounding-box geometry shared by table reconstruction and block assembly.
//!
//! Boxes use image coordinates: origin top-left, `y` growing downwards.
//! Table detections are in pixels; layout blocks are normalized to 0..1.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle `(x0, y0)`-`(x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from its edges.
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width; negative for inverted boxes.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height; negative for inverted boxes.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area, or 0 for degenerate boxes.
    pub fn area(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    /// True when the box has no positive area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Intersection with `other`, if it has positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let rect = Rect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Grow every edge outward by `amount`.
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }

    /// Clamp to `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f32, height: f32) -> Rect {
        Rect::new(
            self.x0.clamp(0.0, width),
            self.y0.clamp(0.0, height),
            self.x1.clamp(0.0, width),
            self.y1.clamp(0.0, height),
        )
    }

    /// Union of all boxes, or `None` for an empty iterator.
    pub fn enclosing<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(u) => Some(u.union(r)),
        })
    }
}

/// Fraction of `inner`'s area that lies inside `outer`.
pub fn containment_ratio(inner: &Rect, outer: &Rect) -> f32 {
    let area = inner.area();
    if area <= 0.0 {
        return 0.0;
    }
    inner
        .intersection(outer)
        .map(|i| i.area() / area)
        .unwrap_or(0.0)
}

/// Whether more than `threshold` of `inner`'s area lies inside `outer`.
pub fn is_contained(inner: &Rect, outer: &Rect, threshold: f32) -> bool {
    containment_ratio(inner, outer) > threshold
}

/// Vertical overlap divided by the smaller of the two heights.
pub fn overlap_y(a: &Rect, b: &Rect) -> f32 {
    let overlap = (a.y1.min(b.y1) - a.y0.max(b.y0)).max(0.0);
    let min_h = a.height().min(b.height());
    if min_h <= 0.0 {
        0.0
    } else {
        overlap / min_h
    }
}

/// Horizontal overlap divided by the smaller of the two widths.
pub fn overlap_x(a: &Rect, b: &Rect) -> f32 {
    let overlap = (a.x1.min(b.x1) - a.x0.max(b.x0)).max(0.0);
    let min_w = a.width().min(b.width());
    if min_w <= 0.0 {
        0.0
    } else {
        overlap / min_w
    }
}

/// Whether every edge of `a` is within `tolerance` of the same edge of `b`.
pub fn is_same_box(a: &Rect, b: &Rect, tolerance: f32) -> bool {
    (a.x0 - b.x0).abs() <= tolerance
        && (a.y0 - b.y0).abs() <= tolerance
        && (a.x1 - b.x1).abs() <= tolerance
        && (a.y1 - b.y1).abs() <= tolerance
}
