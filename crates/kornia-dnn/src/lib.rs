//! Neural network inference layers for kornia.
//!
//! This crate provides layers that a host inference pipeline drives through the
//! [`Layer`] trait: shape inference before allocation, a one-time finalize
//! step, CPU forward passes, and backend negotiation for handing a declarative
//! [`BackendNode`] to an accelerated runtime instead.
//!
//! # Feature Flags
//!
//! - `inference-engine`: the accelerated inference runtime is linked into the
//!   process; layers may describe themselves as [`BackendNode`]s
//!
//! # Examples
//!
//! ```rust
//! use kornia_dnn::{Layer, LayerParams, ResizeNearestNeighborLayer};
//! use kornia_tensor::{CpuAllocator, Tensor};
//!
//! let params = LayerParams::new("upsample").with("zoom_factor", 2);
//! let mut layer = ResizeNearestNeighborLayer::new(&params)?;
//!
//! let data = vec![1.0, 2.0, 3.0, 4.0];
//! let input = Tensor::<f32, 4, _>::from_shape_vec([1, 1, 2, 2], data, CpuAllocator)?;
//! let shapes = layer.infer_shape(&input.shape)?;
//! let mut output =
//!     Tensor::<f32, 4, _>::from_shape_vec(shapes.output, vec![0.0; 16], CpuAllocator)?;
//!
//! layer.finalize(&output.shape)?;
//! layer.forward(&input, &mut output)?;
//! assert_eq!(&output.as_slice()[..4], &[1.0, 1.0, 2.0, 2.0]);
//! # Ok::<(), kornia_dnn::DnnError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod kernels;
pub mod layer;
pub mod layers;
pub mod parallel;
pub mod params;

#[cfg(test)]
mod tests;

// Re-exports
pub use backend::{AcceleratorRuntime, Backend, BackendNode, InferenceEngineRuntime, Precision};
pub use error::{DnnError, Result};
pub use layer::{Layer, ShapeInference};
pub use layers::{resize_nearest, ResizeNearestNeighborLayer, SizingMode};
pub use parallel::ExecutionStrategy;
pub use params::{LayerParams, ParamValue};
