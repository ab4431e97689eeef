//! Error types for DNN layers.

use thiserror::Error;

use crate::backend::Backend;

/// Result type for DNN layer operations.
pub type Result<T> = std::result::Result<T, DnnError>;

/// Error types that can occur while building or running a layer.
#[derive(Error, Debug)]
pub enum DnnError {
    /// The combination of layer parameters is not legal.
    #[error("Invalid layer configuration: {0}")]
    InvalidConfiguration(String),

    /// A single layer parameter has an illegal value.
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter key
        name: String,
        /// Offending value, as written by the host
        value: String,
        /// What the value violates
        reason: String,
    },

    /// The requested feature is recognized but not implemented.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A shape has the wrong number of dimensions.
    #[error("Invalid shape rank: expected {expected} dimensions, got {actual}")]
    InvalidRank {
        /// Expected rank
        expected: usize,
        /// Actual rank
        actual: usize,
    },

    /// An inferred dimension does not fit in `usize`.
    #[error("Shape overflow: {0}")]
    ShapeOverflow(String),

    /// The tensors handed to a layer do not match its inferred shapes.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid buffer size or dimensions.
    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize {
        /// Expected buffer size
        expected: usize,
        /// Actual buffer size
        actual: usize,
    },

    /// There is no input pixel to sample from.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The layer output dimensions have not been resolved yet.
    #[error("Layer not finalized: {0}")]
    NotFinalized(String),

    /// The layer cannot run on the requested backend.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(Backend),

    /// Tensor error from kornia-tensor.
    #[error("Tensor error: {0}")]
    TensorError(#[from] kornia_tensor::TensorError),
}

impl DnnError {
    /// Build an [`DnnError::InvalidParameter`] from any displayable value.
    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
