use crate::core::data::point::Point;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ViewportError {
    #[error("viewport size must be positive: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

/// The rectangle of the plane mapped onto the pixel grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    center: Point,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(center: Point, width: f64, height: f64) -> Result<Self, ViewportError> {
        // NaN fails both comparisons, so it lands here too
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(ViewportError::InvalidSize { width, height });
        }

        Ok(Self {
            center,
            width,
            height,
        })
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    #[must_use]
    pub fn bottom_left(&self) -> Point {
        Point::new(self.left(), self.bottom())
    }

    /// Half-open containment: the right and top edges are outside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.left() <= p.x && p.x < self.right() && self.bottom() <= p.y && p.y < self.top()
    }
}
