/// A successful edit applied to a [`FlameBuilder`](crate::core::flame::flame_builder::FlameBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlameChange {
    TransformationAdded { index: usize },
    TransformationRemoved { index: usize },
    AffineChanged { index: usize },
    WeightChanged { index: usize, variation_index: usize },
}

/// Notified synchronously, on the editing thread, after every successful
/// builder mutation.
pub trait FlameChangeListener: Send + Sync {
    fn flame_changed(&self, change: FlameChange);
}
