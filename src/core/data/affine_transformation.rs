use crate::core::data::point::Point;

/// An affine map of the plane, `(x, y) -> (ax + by + c, dx + ey + f)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineTransformation {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Default for AffineTransformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransformation {
    pub const IDENTITY: AffineTransformation = AffineTransformation {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[must_use]
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, dx, 0.0, 1.0, dy)
    }

    /// Counter-clockwise rotation about the origin, angle in radians.
    #[must_use]
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, -sin, 0.0, sin, cos, 0.0)
    }

    #[must_use]
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    #[must_use]
    pub fn shear_x(k: f64) -> Self {
        Self::new(1.0, k, 0.0, 0.0, 1.0, 0.0)
    }

    #[must_use]
    pub fn shear_y(k: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, k, 1.0, 0.0)
    }

    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.b * p.y + self.c,
            y: self.d * p.x + self.e * p.y + self.f,
        }
    }

    /// Returns the transformation that applies `other` first, then `self`.
    #[must_use]
    pub fn compose_with(&self, other: &AffineTransformation) -> Self {
        Self {
            a: self.a * other.a + self.b * other.d,
            b: self.a * other.b + self.b * other.e,
            c: self.a * other.c + self.b * other.f + self.c,
            d: self.d * other.a + self.e * other.d,
            e: self.d * other.b + self.e * other.e,
            f: self.d * other.c + self.e * other.f + self.f,
        }
    }

    /// Coefficients in `[a, b, c, d, e, f]` order.
    #[must_use]
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    #[must_use]
    pub fn translation_x(&self) -> f64 {
        self.c
    }

    #[must_use]
    pub fn translation_y(&self) -> f64 {
        self.f
    }
}
