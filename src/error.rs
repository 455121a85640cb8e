//! Error type shared by the slicing, blending and projection operations.

use thiserror::Error;

use crate::enums::Axis;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Unsupported axis '{0}', expected one of x, y, z")]
    InvalidAxis(String),

    #[error("Subsample strides must be at least 1, got {0:?}")]
    InvalidSubsample((usize, usize, usize)),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Shape mismatch: first image has shape {first:?}, second has shape {second:?}")]
    ShapeMismatch {
        first: Vec<usize>,
        second: Vec<usize>,
    },

    #[error("Index {index} out of bounds for array dimension {dim} of length {len}")]
    IndexOutOfBounds { dim: usize, index: usize, len: usize },

    #[error("Slice index {index} out of bounds for axis {axis} of length {len}")]
    SliceOutOfBounds { axis: Axis, index: usize, len: usize },

    #[error("Rotation axis {0:?} has zero length")]
    InvalidRotationAxis([f64; 3]),

    #[error("Volume geometry (direction x spacing) is not invertible")]
    SingularGeometry,
}

pub type Result<T> = std::result::Result<T, ViewError>;

impl ViewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_names_both_shapes() {
        let err = ViewError::ShapeMismatch {
            first: vec![4, 5],
            second: vec![4, 6],
        };
        let msg = err.to_string();
        assert!(msg.contains("[4, 5]"));
        assert!(msg.contains("[4, 6]"));
    }

    #[test]
    fn helpers_build_matching_variants() {
        assert!(matches!(ViewError::validation("x"), ViewError::Validation(_)));
        assert_eq!(ViewError::lookup("nope").to_string(), "Lookup error: nope");
    }
}
