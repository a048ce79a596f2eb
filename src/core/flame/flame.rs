use std::sync::Arc;

use crate::core::flame::errors::FlameError;
use crate::core::flame::flame_transformation::FlameTransformation;

pub const MAX_TRANSFORMATION_COUNT: usize = 16;

/// Immutable, ordered set of 1..=16 transformations defining a fractal.
///
/// Cloning is cheap; the transformations are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Flame {
    transformations: Arc<[FlameTransformation]>,
}

impl Flame {
    pub fn new(transformations: Vec<FlameTransformation>) -> Result<Self, FlameError> {
        if transformations.is_empty() {
            return Err(FlameError::EmptyFlame);
        }

        if transformations.len() > MAX_TRANSFORMATION_COUNT {
            return Err(FlameError::TooManyTransformations {
                max: MAX_TRANSFORMATION_COUNT,
            });
        }

        Ok(Self {
            transformations: transformations.into(),
        })
    }

    #[must_use]
    pub fn transformations(&self) -> &[FlameTransformation] {
        &self.transformations
    }

    #[must_use]
    pub fn transformations_count(&self) -> usize {
        self.transformations.len()
    }

    pub fn transformation(&self, index: usize) -> Result<&FlameTransformation, FlameError> {
        self.transformations
            .get(index)
            .ok_or(FlameError::TransformationIndexOutOfRange {
                index,
                count: self.transformations.len(),
            })
    }
}
