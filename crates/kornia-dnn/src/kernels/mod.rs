//! CPU kernel implementations used by the layers.
//!
//! Kernels operate on plain slices so they can be reused by any tensor
//! container that exposes contiguous storage.

pub mod resize;

pub use resize::*;
