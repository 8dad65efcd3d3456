//! Geometric primitives for layout regions.
//!
//! Boxes are expressed in page pixel coordinates with the origin at the
//! top-left corner and `y` growing downward, which is how rendered page
//! images and layout detectors report them.

/// An axis-aligned rectangle stored as its four edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge x-coordinate
    pub left: f32,
    /// Top edge y-coordinate
    pub top: f32,
    /// Right edge x-coordinate
    pub right: f32,
    /// Bottom edge y-coordinate
    pub bottom: f32,
}

impl Rect {
    /// Create a rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use scholar_extract::geometry::Rect;
    ///
    /// let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
    /// assert_eq!(rect.right, 110.0);
    /// assert_eq!(rect.bottom, 70.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// Create a rectangle from its `(left, top, right, bottom)` edges.
    ///
    /// No normalization is applied: a box whose right edge lies left of its
    /// left edge stays malformed and is reported by [`Rect::is_well_formed`].
    ///
    /// # Examples
    ///
    /// ```
    /// use scholar_extract::geometry::Rect;
    ///
    /// let rect = Rect::from_points(0.0, 60.0, 50.0, 95.0);
    /// assert_eq!(rect.height(), 35.0);
    /// ```
    pub fn from_points(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the rectangle (`right - left`).
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle (`bottom - top`).
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Area of the rectangle, zero for malformed boxes.
    pub fn area(&self) -> f32 {
        if self.is_well_formed() {
            self.width() * self.height()
        } else {
            0.0
        }
    }

    /// True when every edge is finite and the edges are ordered.
    ///
    /// Degenerate boxes (zero width or zero height) are well formed.
    pub fn is_well_formed(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
            && self.right >= self.left
            && self.bottom >= self.top
    }

    /// True when this rectangle lies entirely above `other`.
    ///
    /// Touching edges count as above.
    ///
    /// # Examples
    ///
    /// ```
    /// use scholar_extract::geometry::Rect;
    ///
    /// let figure = Rect::from_points(0.0, 100.0, 50.0, 150.0);
    /// let heading = Rect::from_points(0.0, 60.0, 50.0, 100.0);
    /// assert!(heading.is_above(&figure));
    /// assert!(!figure.is_above(&heading));
    /// ```
    pub fn is_above(&self, other: &Rect) -> bool {
        self.bottom <= other.top
    }

    /// True when this rectangle lies entirely below `other`.
    pub fn is_below(&self, other: &Rect) -> bool {
        self.top >= other.bottom
    }

    /// Vertical gap between this rectangle's bottom edge and `other`'s top edge.
    pub fn gap_above(&self, other: &Rect) -> f32 {
        (other.top - self.bottom).abs()
    }

    /// Vertical gap between `other`'s bottom edge and this rectangle's top edge.
    pub fn gap_below(&self, other: &Rect) -> f32 {
        (self.top - other.bottom).abs()
    }

    /// Overlapping region of two rectangles, if they intersect with positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if right > left && bottom > top {
            Some(Rect::from_points(left, top, right, bottom))
        } else {
            None
        }
    }

    /// Scale every edge by `factor` (e.g. PDF points to pixels at a given DPI).
    pub fn scale(&self, factor: f32) -> Rect {
        Rect::from_points(
            self.left * factor,
            self.top * factor,
            self.right * factor,
            self.bottom * factor,
        )
    }

    /// Integer pixel window `(x, y, width, height)` clamped to an image of the
    /// given size, suitable for cropping.
    ///
    /// Returns `None` when the box is malformed or falls outside the image.
    pub fn pixel_window(&self, image_width: u32, image_height: u32) -> Option<(u32, u32, u32, u32)> {
        if !self.is_well_formed() {
            return None;
        }
        let max_x = image_width as f32;
        let max_y = image_height as f32;
        let x0 = self.left.floor().clamp(0.0, max_x) as u32;
        let y0 = self.top.floor().clamp(0.0, max_y) as u32;
        let x1 = self.right.ceil().clamp(0.0, max_x) as u32;
        let y1 = self.bottom.ceil().clamp(0.0, max_y) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }
}
