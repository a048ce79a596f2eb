use crate::core::data::point::Point;

pub const VARIATION_COUNT: usize = 6;

/// The fixed registry of nonlinear warps blended inside a flame
/// transformation. Radius-dependent variations divide by zero at the
/// origin; the resulting NaN/Inf is propagated, not special-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variation {
    Linear,
    Sinusoidal,
    Spherical,
    Swirl,
    Horseshoe,
    Bubble,
}

impl Variation {
    /// Registry order; a variation's position here is its index.
    pub const ALL: [Self; VARIATION_COUNT] = [
        Self::Linear,
        Self::Sinusoidal,
        Self::Spherical,
        Self::Swirl,
        Self::Horseshoe,
        Self::Bubble,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Linear => 0,
            Self::Sinusoidal => 1,
            Self::Spherical => 2,
            Self::Swirl => 3,
            Self::Horseshoe => 4,
            Self::Bubble => 5,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Sinusoidal => "Sinusoidal",
            Self::Spherical => "Spherical",
            Self::Swirl => "Swirl",
            Self::Horseshoe => "Horseshoe",
            Self::Bubble => "Bubble",
        }
    }

    #[must_use]
    pub fn transform_point(self, p: Point) -> Point {
        match self {
            Self::Linear => p,
            Self::Sinusoidal => Point::new(p.x.sin(), p.y.sin()),
            Self::Spherical => {
                let r2 = p.r_squared();
                Point::new(p.x / r2, p.y / r2)
            }
            Self::Swirl => {
                let (sin, cos) = p.r_squared().sin_cos();
                Point::new(p.x * sin - p.y * cos, p.x * cos + p.y * sin)
            }
            Self::Horseshoe => {
                let r = p.r();
                Point::new((p.x - p.y) * (p.x + p.y) / r, 2.0 * p.x * p.y / r)
            }
            Self::Bubble => {
                let scale = 4.0 / (p.r_squared() + 4.0);
                Point::new(p.x * scale, p.y * scale)
            }
        }
    }
}

impl std::fmt::Display for Variation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).display_name())
    }
}
