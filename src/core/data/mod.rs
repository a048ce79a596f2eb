pub mod affine_transformation;
pub mod colour;
pub mod point;
pub mod viewport;
