//! Nearest-neighbor resize over contiguous planes.
//!
//! Layout: each plane is a row-major `height * width` slice, and a tensor is a
//! sequence of such planes (NCHW with N and C flattened).

use std::fmt;

use rayon::prelude::*;

use crate::error::{DnnError, Result};
use crate::parallel::ExecutionStrategy;

/// Spatial size of a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl Size {
    /// Create a size from width and height.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels in a plane of this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Source index for every destination index along one axis.
///
/// Destination `i` samples source `floor(i * src_len / dst_len)`, which is
/// always `< src_len`.
fn nearest_indices(src_len: usize, dst_len: usize) -> Vec<usize> {
    (0..dst_len)
        .map(|i| (i as u128 * src_len as u128 / dst_len as u128) as usize)
        .collect()
}

/// Precomputed row and column lookup tables for one resize.
struct NearestMap {
    src_size: Size,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl NearestMap {
    fn new(src_size: Size, dst_size: Size) -> Self {
        Self {
            src_size,
            rows: nearest_indices(src_size.height, dst_size.height),
            cols: nearest_indices(src_size.width, dst_size.width),
        }
    }

    fn apply<T: Copy>(&self, src: &[T], dst: &mut [T]) {
        let src_w = self.src_size.width;
        let dst_w = self.cols.len();
        for (dst_row, &sy) in dst.chunks_exact_mut(dst_w).zip(&self.rows) {
            let src_row = &src[sy * src_w..(sy + 1) * src_w];
            for (d, &sx) in dst_row.iter_mut().zip(&self.cols) {
                *d = src_row[sx];
            }
        }
    }
}

/// Resize a single plane with nearest-neighbor sampling.
///
/// Output pixel `(y, x)` takes input pixel
/// `(floor(y * src_h / dst_h), floor(x * src_w / dst_w))`. No smoothing or
/// anti-aliasing is applied.
///
/// # Arguments
///
/// * `src` - Source plane, row-major, `src_size.area()` elements
/// * `src_size` - Source plane size
/// * `dst` - Destination plane, row-major, `dst_size.area()` elements
/// * `dst_size` - Destination plane size
///
/// # Example
///
/// ```
/// use kornia_dnn::kernels::resize::{resize_nearest_plane, Size};
///
/// let src = [1u8, 2, 3, 4];
/// let mut dst = [0u8; 16];
/// resize_nearest_plane(&src, Size::new(2, 2), &mut dst, Size::new(4, 4)).unwrap();
/// assert_eq!(&dst[..4], &[1, 1, 2, 2]);
/// ```
pub fn resize_nearest_plane<T: Copy + Send + Sync>(
    src: &[T],
    src_size: Size,
    dst: &mut [T],
    dst_size: Size,
) -> Result<()> {
    resize_nearest_planes(src, src_size, dst, dst_size, 1, ExecutionStrategy::Serial)
}

/// Resize `num_planes` consecutive planes with nearest-neighbor sampling.
///
/// The lookup tables are computed once and shared by every plane. With
/// [`ExecutionStrategy::ParallelPlanes`] each rayon task owns whole output
/// planes.
pub fn resize_nearest_planes<T: Copy + Send + Sync>(
    src: &[T],
    src_size: Size,
    dst: &mut [T],
    dst_size: Size,
    num_planes: usize,
    strategy: ExecutionStrategy,
) -> Result<()> {
    let src_area = src_size.area();
    let dst_area = dst_size.area();

    if src.len() != src_area * num_planes {
        return Err(DnnError::InvalidBufferSize {
            expected: src_area * num_planes,
            actual: src.len(),
        });
    }
    if dst.len() != dst_area * num_planes {
        return Err(DnnError::InvalidBufferSize {
            expected: dst_area * num_planes,
            actual: dst.len(),
        });
    }

    if dst_area == 0 || num_planes == 0 {
        return Ok(());
    }
    if src_area == 0 {
        return Err(DnnError::EmptyInput(format!(
            "cannot sample a {dst_size} plane from a {src_size} plane"
        )));
    }

    if src_size == dst_size {
        dst.copy_from_slice(src);
        return Ok(());
    }

    let map = NearestMap::new(src_size, dst_size);

    match strategy {
        ExecutionStrategy::Serial => {
            for (src_plane, dst_plane) in src
                .chunks_exact(src_area)
                .zip(dst.chunks_exact_mut(dst_area))
            {
                map.apply(src_plane, dst_plane);
            }
        }
        ExecutionStrategy::ParallelPlanes => {
            src.par_chunks_exact(src_area)
                .zip(dst.par_chunks_exact_mut(dst_area))
                .for_each(|(src_plane, dst_plane)| map.apply(src_plane, dst_plane));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_indices_floor() {
        assert_eq!(nearest_indices(2, 4), vec![0, 0, 1, 1]);
        assert_eq!(nearest_indices(4, 2), vec![0, 2]);
        assert_eq!(nearest_indices(3, 1), vec![0]);
        assert_eq!(nearest_indices(3, 5), vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn test_upscale_2x() {
        #[rustfmt::skip]
        let src = [
            10, 20,
            30, 40,
        ];
        let mut dst = [0; 16];
        resize_nearest_plane(&src, Size::new(2, 2), &mut dst, Size::new(4, 4)).unwrap();

        #[rustfmt::skip]
        let expected = [
            10, 10, 20, 20,
            10, 10, 20, 20,
            30, 30, 40, 40,
            30, 30, 40, 40,
        ];
        assert_eq!(dst, expected);
    }

    fn upscale_generic<T: Copy + Send + Sync + Default>(src: &[T]) -> Vec<T> {
        let mut dst = vec![T::default(); 4];
        resize_nearest_plane(src, Size::new(1, 1), &mut dst, Size::new(2, 2)).unwrap();
        dst
    }

    #[test]
    fn test_plane_from_generic_caller() {
        assert_eq!(upscale_generic(&[7u16]), vec![7, 7, 7, 7]);
        assert_eq!(upscale_generic(&[0.5f64]), vec![0.5; 4]);
    }

    #[test]
    fn test_non_uniform_resize() {
        // 3 wide, 2 tall -> 2 wide, 3 tall
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [0; 6];
        resize_nearest_plane(&src, Size::new(3, 2), &mut dst, Size::new(2, 3)).unwrap();
        assert_eq!(dst, [1, 2, 1, 2, 4, 5]);
    }

    #[test]
    fn test_same_size_is_copy() {
        let src: Vec<f32> = (0..12).map(|v| v as f32 * 0.5).collect();
        let mut dst = vec![0.0; 12];
        resize_nearest_plane(&src, Size::new(4, 3), &mut dst, Size::new(4, 3)).unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let src = [0u8; 3];
        let mut dst = [0u8; 4];
        let err =
            resize_nearest_plane(&src, Size::new(2, 2), &mut dst, Size::new(2, 2)).unwrap_err();
        assert!(matches!(err, DnnError::InvalidBufferSize { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_empty_source() {
        let src: [u8; 0] = [];
        let mut dst = [0u8; 4];
        let err =
            resize_nearest_plane(&src, Size::new(0, 2), &mut dst, Size::new(2, 2)).unwrap_err();
        assert!(matches!(err, DnnError::EmptyInput(_)));

        let mut empty: [u8; 0] = [];
        resize_nearest_plane(&src, Size::new(0, 2), &mut empty, Size::new(0, 4)).unwrap();
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let planes = 6;
        let src_size = Size::new(7, 5);
        let dst_size = Size::new(16, 11);
        let src: Vec<u32> = (0..(src_size.area() * planes) as u32).collect();

        let mut serial = vec![0; dst_size.area() * planes];
        let mut parallel = vec![0; dst_size.area() * planes];
        resize_nearest_planes(
            &src,
            src_size,
            &mut serial,
            dst_size,
            planes,
            ExecutionStrategy::Serial,
        )
        .unwrap();
        resize_nearest_planes(
            &src,
            src_size,
            &mut parallel,
            dst_size,
            planes,
            ExecutionStrategy::ParallelPlanes,
        )
        .unwrap();

        assert_eq!(serial, parallel);
        // first pixel of every plane is the first pixel of its source plane
        for p in 0..planes {
            assert_eq!(serial[p * dst_size.area()], src[p * src_size.area()]);
        }
    }
}
