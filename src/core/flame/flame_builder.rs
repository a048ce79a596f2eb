use std::sync::Arc;

use crate::core::data::affine_transformation::AffineTransformation;
use crate::core::flame::errors::FlameError;
use crate::core::flame::flame::{Flame, MAX_TRANSFORMATION_COUNT};
use crate::core::flame::flame_transformation::{FlameTransformation, FlameTransformationBuilder};
use crate::core::flame::ports::change_listener::{FlameChange, FlameChangeListener};

/// Mutable staging area for editing a transformation set.
///
/// Not synchronised against renders: callers serialise edits against
/// `build()` themselves.
#[derive(Default)]
pub struct FlameBuilder {
    transformations: Vec<FlameTransformationBuilder>,
    listeners: Vec<Arc<dyn FlameChangeListener>>,
}

impl std::fmt::Debug for FlameBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlameBuilder")
            .field("transformations", &self.transformations)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl From<&Flame> for FlameBuilder {
    fn from(flame: &Flame) -> Self {
        Self::from_flame(flame)
    }
}

impl FlameBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_flame(flame: &Flame) -> Self {
        Self {
            transformations: flame
                .transformations()
                .iter()
                .map(FlameTransformationBuilder::from)
                .collect(),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn FlameChangeListener>) {
        self.listeners.push(listener);
    }

    /// Returns whether `listener` was registered.
    pub fn remove_listener(&mut self, listener: &Arc<dyn FlameChangeListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    #[must_use]
    pub fn transformations_count(&self) -> usize {
        self.transformations.len()
    }

    pub fn transformations(&self) -> impl Iterator<Item = &FlameTransformationBuilder> {
        self.transformations.iter()
    }

    pub fn add_transformation(&mut self, transformation: &FlameTransformation) -> Result<(), FlameError> {
        if self.transformations.len() >= MAX_TRANSFORMATION_COUNT {
            return Err(FlameError::TooManyTransformations {
                max: MAX_TRANSFORMATION_COUNT,
            });
        }

        self.transformations
            .push(FlameTransformationBuilder::from(transformation));
        self.notify(FlameChange::TransformationAdded {
            index: self.transformations.len() - 1,
        });
        Ok(())
    }

    pub fn remove_transformation(&mut self, index: usize) -> Result<(), FlameError> {
        self.check_index(index)?;

        self.transformations.remove(index);
        self.notify(FlameChange::TransformationRemoved { index });
        Ok(())
    }

    pub fn affine_transformation(&self, index: usize) -> Result<AffineTransformation, FlameError> {
        self.check_index(index)?;
        Ok(self.transformations[index].affine())
    }

    pub fn set_affine_transformation(
        &mut self,
        index: usize,
        affine: AffineTransformation,
    ) -> Result<(), FlameError> {
        self.check_index(index)?;

        self.transformations[index].set_affine(affine);
        self.notify(FlameChange::AffineChanged { index });
        Ok(())
    }

    pub fn variation_weight(&self, index: usize, variation_index: usize) -> Result<f64, FlameError> {
        self.check_index(index)?;
        self.transformations[index].weight(variation_index)
    }

    pub fn set_variation_weight(
        &mut self,
        index: usize,
        variation_index: usize,
        weight: f64,
    ) -> Result<(), FlameError> {
        self.check_index(index)?;

        self.transformations[index].set_weight(variation_index, weight)?;
        self.notify(FlameChange::WeightChanged {
            index,
            variation_index,
        });
        Ok(())
    }

    /// Compiles the staged transformations into an immutable [`Flame`].
    pub fn build(&self) -> Result<Flame, FlameError> {
        Flame::new(
            self.transformations
                .iter()
                .map(FlameTransformationBuilder::build)
                .collect(),
        )
    }

    fn check_index(&self, index: usize) -> Result<(), FlameError> {
        if index >= self.transformations.len() {
            return Err(FlameError::TransformationIndexOutOfRange {
                index,
                count: self.transformations.len(),
            });
        }
        Ok(())
    }

    fn notify(&self, change: FlameChange) {
        for listener in &self.listeners {
            listener.flame_changed(change);
        }
    }
}
