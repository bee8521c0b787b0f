/// Viewport geometry for visibility decisions
///
/// The loader and feed decide when to act based on where an element sits
/// relative to the viewport. The host (whatever renders the gallery) reports
/// element and viewport rectangles; everything here is plain math.

/// An axis-aligned rectangle in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Grow the rectangle outward by `margin` on every side.
    ///
    /// This is how a proximity margin is applied: instead of shrinking the
    /// distance to the element, the viewport is inflated before the overlap
    /// test (same effect as an observer root margin).
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Area of overlap between two rectangles (0.0 when disjoint).
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 {
            return 0.0;
        }
        w * h
    }

    /// Whether two rectangles overlap at all (shared edges count).
    pub fn touches(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

/// Fraction of `element` that is visible inside `viewport` (0.0 to 1.0).
///
/// Zero-area elements (a collapsed sentinel div, for example) count as fully
/// visible the moment they touch the viewport, matching observer semantics.
pub fn intersection_ratio(element: &Rect, viewport: &Rect) -> f32 {
    let element_area = element.area();
    if element_area <= 0.0 {
        return if element.touches(viewport) { 1.0 } else { 0.0 };
    }
    element.intersection_area(viewport) / element_area
}

/// Whether `element` is within `margin` pixels of entering `viewport`.
pub fn within_margin(element: &Rect, viewport: &Rect, margin: f32) -> bool {
    element.touches(&viewport.inflate(margin))
}
