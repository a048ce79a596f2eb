use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorError {
    #[error("cell at x:{x}, y:{y} outside of {width}x{height} grid")]
    CellOutsideBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("grid size must be positive: {width}x{height}")]
    InvalidSize { width: usize, height: usize },

    #[error("grid of {width}x{height} cells cannot be allocated")]
    GridTooLarge { width: usize, height: usize },

    #[error("readback holds {actual} cells, grid holds {expected}")]
    ReadbackSizeMismatch { expected: usize, actual: usize },
}
