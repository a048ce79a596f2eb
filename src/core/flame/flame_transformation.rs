use crate::core::data::affine_transformation::AffineTransformation;
use crate::core::data::point::Point;
use crate::core::flame::errors::FlameError;
use crate::core::flame::variation::{VARIATION_COUNT, Variation};

/// One affine map followed by a weighted blend of the variations.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameTransformation {
    affine: AffineTransformation,
    weights: [f64; VARIATION_COUNT],
}

impl FlameTransformation {
    /// Fails unless `weights` holds exactly one weight per variation.
    pub fn new(affine: AffineTransformation, weights: &[f64]) -> Result<Self, FlameError> {
        let weights: [f64; VARIATION_COUNT] =
            weights
                .try_into()
                .map_err(|_| FlameError::WrongWeightCount {
                    expected: VARIATION_COUNT,
                    actual: weights.len(),
                })?;

        Ok(Self { affine, weights })
    }

    #[must_use]
    pub fn affine(&self) -> AffineTransformation {
        self.affine
    }

    #[must_use]
    pub fn weights(&self) -> &[f64; VARIATION_COUNT] {
        &self.weights
    }

    pub fn weight(&self, variation_index: usize) -> Result<f64, FlameError> {
        self.weights
            .get(variation_index)
            .copied()
            .ok_or(FlameError::VariationIndexOutOfRange {
                index: variation_index,
                count: VARIATION_COUNT,
            })
    }

    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        let mapped = self.affine.transform_point(p);

        Variation::ALL
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, weight)| **weight != 0.0)
            .fold(Point::ORIGIN, |sum, (variation, weight)| {
                sum + variation.transform_point(mapped) * *weight
            })
    }
}

/// Mutable staging copy of a [`FlameTransformation`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlameTransformationBuilder {
    affine: AffineTransformation,
    weights: [f64; VARIATION_COUNT],
}

impl Default for FlameTransformationBuilder {
    fn default() -> Self {
        let mut weights = [0.0; VARIATION_COUNT];
        weights[Variation::Linear.index()] = 1.0;

        Self {
            affine: AffineTransformation::IDENTITY,
            weights,
        }
    }
}

impl From<&FlameTransformation> for FlameTransformationBuilder {
    fn from(transformation: &FlameTransformation) -> Self {
        Self {
            affine: transformation.affine,
            weights: transformation.weights,
        }
    }
}

impl FlameTransformationBuilder {
    #[must_use]
    pub fn affine(&self) -> AffineTransformation {
        self.affine
    }

    pub fn set_affine(&mut self, affine: AffineTransformation) {
        self.affine = affine;
    }

    pub fn weight(&self, variation_index: usize) -> Result<f64, FlameError> {
        self.weights
            .get(variation_index)
            .copied()
            .ok_or(FlameError::VariationIndexOutOfRange {
                index: variation_index,
                count: VARIATION_COUNT,
            })
    }

    pub fn set_weight(&mut self, variation_index: usize, weight: f64) -> Result<(), FlameError> {
        let slot = self
            .weights
            .get_mut(variation_index)
            .ok_or(FlameError::VariationIndexOutOfRange {
                index: variation_index,
                count: VARIATION_COUNT,
            })?;

        *slot = weight;
        Ok(())
    }

    #[must_use]
    pub fn build(&self) -> FlameTransformation {
        FlameTransformation {
            affine: self.affine,
            weights: self.weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_new_rejects_wrong_weight_count() {
        let short = FlameTransformation::new(AffineTransformation::IDENTITY, &[1.0, 0.0]);
        let long = FlameTransformation::new(AffineTransformation::IDENTITY, &[0.0; 7]);

        assert_eq!(
            short,
            Err(FlameError::WrongWeightCount {
                expected: 6,
                actual: 2
            })
        );
        assert_eq!(
            long,
            Err(FlameError::WrongWeightCount {
                expected: 6,
                actual: 7
            })
        );
    }

    #[test]
    fn test_weight_out_of_range() {
        let t = FlameTransformation::new(AffineTransformation::IDENTITY, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .unwrap();

        assert_eq!(t.weight(0), Ok(1.0));
        assert_eq!(
            t.weight(6),
            Err(FlameError::VariationIndexOutOfRange { index: 6, count: 6 })
        );
    }

    #[test]
    fn test_transform_point_is_weighted_sum() {
        let affine = AffineTransformation::new(0.5, 0.1, 0.2, -0.3, 0.9, -0.4);
        let weights = [0.25, 0.5, 0.0, 0.1, 0.0, 0.15];
        let t = FlameTransformation::new(affine, &weights).unwrap();
        let p = Point::new(0.7, -0.2);

        let mapped = affine.transform_point(p);
        let expected = Variation::ALL
            .iter()
            .zip(weights.iter())
            .fold(Point::ORIGIN, |sum, (v, w)| {
                if *w == 0.0 { sum } else { sum + v.transform_point(mapped) * *w }
            });

        assert_eq!(t.transform_point(p), expected);
    }

    #[test]
    fn test_zero_weight_variations_never_affect_output() {
        // Spherical at the origin is NaN; a zero weight must keep it out
        let t = FlameTransformation::new(
            AffineTransformation::IDENTITY,
            &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        )
        .unwrap();

        assert_eq!(t.transform_point(Point::ORIGIN), Point::ORIGIN);

        let mut rng = StdRng::seed_from_u64(11);
        let affine = AffineTransformation::new(0.3, -0.4, 0.1, 0.6, 0.2, -0.5);
        let with_zeros = FlameTransformation::new(affine, &[0.4, 0.0, 0.0, 0.6, 0.0, 0.0]).unwrap();
        for _ in 0..50 {
            let p = Point::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
            let mapped = affine.transform_point(p);
            let expected = Variation::Linear.transform_point(mapped) * 0.4
                + Variation::Swirl.transform_point(mapped) * 0.6;

            assert_eq!(with_zeros.transform_point(p), expected);
        }
    }

    #[test]
    fn test_builder_round_trips_weights() {
        let weights = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let t = FlameTransformation::new(AffineTransformation::scaling(2.0, 3.0), &weights).unwrap();

        let rebuilt = FlameTransformationBuilder::from(&t).build();

        assert_eq!(rebuilt.weights(), &weights);
        assert_eq!(rebuilt, t);
    }

    #[test]
    fn test_builder_setters() {
        let mut builder = FlameTransformationBuilder::default();
        builder.set_affine(AffineTransformation::translation(1.0, 2.0));
        builder.set_weight(3, 0.75).unwrap();

        assert_eq!(builder.weight(3), Ok(0.75));
        assert_eq!(builder.affine(), AffineTransformation::translation(1.0, 2.0));
        assert_eq!(
            builder.set_weight(9, 1.0),
            Err(FlameError::VariationIndexOutOfRange { index: 9, count: 6 })
        );
    }
}
