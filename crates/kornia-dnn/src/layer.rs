//! The interface a host pipeline drives every layer through.

use kornia_tensor::{Tensor, TensorAllocator};

use crate::backend::{Backend, BackendNode};
use crate::error::{DnnError, Result};

/// Result of a shape query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeInference {
    /// Output shape `(N, C, H, W)`.
    pub output: [usize; 4],
    /// The output equals the input, so the host may alias the two buffers
    /// and skip allocation.
    pub in_place: bool,
}

/// Lifecycle of a layer inside a pipeline.
///
/// The host calls [`infer_shape`](Layer::infer_shape) before any buffer
/// exists, [`finalize`](Layer::finalize) once after allocation, and then
/// either [`forward`](Layer::forward) for local execution or
/// [`init_backend_node`](Layer::init_backend_node) when an accelerated backend
/// was negotiated through [`supports_backend`](Layer::supports_backend).
pub trait Layer {
    /// Layer instance name.
    fn name(&self) -> &str;

    /// Compute the output shape for an input shape.
    fn infer_shape(&self, input: &[usize]) -> Result<ShapeInference>;

    /// Fix any parameter that depends on the allocated output.
    fn finalize(&mut self, output: &[usize]) -> Result<()>;

    /// Run the layer on the CPU.
    fn forward<T, A>(&self, input: &Tensor<T, 4, A>, output: &mut Tensor<T, 4, A>) -> Result<()>
    where
        T: Copy + Send + Sync,
        A: TensorAllocator;

    /// Whether the layer can run on `backend` in this process.
    fn supports_backend(&self, backend: Backend) -> bool;

    /// Describe the layer to the accelerated backend.
    ///
    /// `Ok(None)` means the backend runtime is not available and the host
    /// should run [`forward`](Layer::forward) instead.
    fn init_backend_node(&self) -> Result<Option<BackendNode>>;
}

/// Check that a shape is `(N, C, H, W)`.
pub(crate) fn rank4(shape: &[usize]) -> Result<[usize; 4]> {
    <[usize; 4]>::try_from(shape).map_err(|_| DnnError::InvalidRank {
        expected: 4,
        actual: shape.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank4() {
        assert_eq!(rank4(&[1, 2, 3, 4]).unwrap(), [1, 2, 3, 4]);
        assert!(matches!(
            rank4(&[2, 3, 4]),
            Err(DnnError::InvalidRank { expected: 4, actual: 3 })
        ));
    }
}
