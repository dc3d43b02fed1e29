//! Screen and client-area geometry.
//!
//! Host toolkits report client sizes as signed integers: a window that is
//! minimized or dragged through zero size may report `0` or even a negative
//! extent. [`Size`] keeps that signed representation so the view host can
//! detect degenerate geometry, and only converts to unsigned pixels through
//! [`Size::to_pixels`] once the size is known to be positive.
//!
//! ```
//! use gosub_viewhost::geometry::{Point, Rect, Size};
//!
//! let rect = Rect::new(Point::new(10, 20), Size::new(640, 480));
//! assert!(!rect.is_empty());
//! assert_eq!(rect.size.to_pixels(), Some((640, 480)));
//! assert_eq!(Size::new(0, 480).to_pixels(), None);
//! ```

use serde::{Deserialize, Serialize};

/// A position in pixels. Host-local or screen coordinates depending on context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when this is the `(0, 0)` point.
    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns true when either dimension is zero or negative.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns true when both dimensions are exactly zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Converts to unsigned pixel dimensions, or `None` for degenerate sizes.
    pub fn to_pixels(&self) -> Option<(u32, u32)> {
        if self.is_degenerate() {
            return None;
        }

        Some((self.width as u32, self.height as u32))
    }
}

/// A rectangle made of an origin and a size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    /// Returns true when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.size.is_degenerate()
    }

    fn right(&self) -> i32 {
        self.origin.x.saturating_add(self.size.width)
    }

    fn bottom(&self) -> i32 {
        self.origin.y.saturating_add(self.size.height)
    }

    /// Clips this rectangle to `bounds`. Returns `None` when nothing remains.
    pub fn intersect(&self, bounds: &Rect) -> Option<Rect> {
        let left = self.origin.x.max(bounds.origin.x);
        let top = self.origin.y.max(bounds.origin.y);
        let right = self.right().min(bounds.right());
        let bottom = self.bottom().min(bounds.bottom());

        let clipped = Rect::from_xywh(left, top, right.saturating_sub(left), bottom.saturating_sub(top));
        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }
}
