use std::ops::{Add, Mul};

/// A point of the plane in which flames are computed.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to the origin.
    #[must_use]
    pub fn r(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle in `(-π, π]`.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[must_use]
    pub fn r_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_r_of_three_four_is_five() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.r(), 5.0);
        assert_eq!(p.r_squared(), 25.0);
    }

    #[test]
    fn test_r_of_origin_is_zero() {
        assert_eq!(Point::ORIGIN.r(), 0.0);
    }

    #[test]
    fn test_theta_quadrants() {
        assert_eq!(Point::new(1.0, 0.0).theta(), 0.0);
        assert_eq!(Point::new(0.0, 1.0).theta(), FRAC_PI_2);
        assert_eq!(Point::new(1.0, 1.0).theta(), FRAC_PI_4);
        assert_eq!(Point::new(-1.0, 0.0).theta(), PI);
    }

    #[test]
    fn test_add() {
        let result = Point::new(1.0, 2.0) + Point::new(-3.0, 4.5);
        assert_eq!(result, Point::new(-2.0, 6.5));
    }

    #[test]
    fn test_scalar_mul() {
        let result = Point::new(1.5, -2.0) * 2.0;
        assert_eq!(result, Point::new(3.0, -4.0));
    }
}
