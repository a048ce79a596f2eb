use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlameError {
    #[error("expected {expected} variation weights, got {actual}")]
    WrongWeightCount { expected: usize, actual: usize },

    #[error("variation index {index} out of range (0..{count})")]
    VariationIndexOutOfRange { index: usize, count: usize },

    #[error("transformation index {index} out of range (0..{count})")]
    TransformationIndexOutOfRange { index: usize, count: usize },

    #[error("a flame holds at most {max} transformations")]
    TooManyTransformations { max: usize },

    #[error("a flame needs at least one transformation")]
    EmptyFlame,
}
