//! Layer implementations.

pub mod resize_nearest;

pub use resize_nearest::{resize_nearest, ResizeNearestNeighborLayer, SizingMode};
