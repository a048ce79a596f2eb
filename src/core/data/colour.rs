/// An RGB colour with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Colour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Colour {
    pub const BLACK: Colour = Colour {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Colour = Colour {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Components are clamped into `[0, 1]`.
    #[must_use]
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Blends `self` over `other`; `proportion` is the share of `self`.
    #[must_use]
    pub fn mix_with(&self, other: Colour, proportion: f64) -> Colour {
        let p = proportion.clamp(0.0, 1.0);
        let q = 1.0 - p;

        Colour::new(
            self.r * p + other.r * q,
            self.g * p + other.g * q,
            self.b * p + other.b * q,
        )
    }

    #[must_use]
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }
}
