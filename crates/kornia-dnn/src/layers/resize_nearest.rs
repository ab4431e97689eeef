//! Nearest-neighbor resize layer.
//!
//! Resizes the spatial dimensions of an NCHW tensor either to an explicit
//! `width` x `height` or by an integer `zoom_factor`. Each `(n, c)` plane is
//! resampled independently.

use kornia_tensor::{Tensor, TensorAllocator};
use num_traits::Zero;
use tracing::{debug, instrument, trace};

use crate::backend::{AcceleratorRuntime, Backend, BackendNode, InferenceEngineRuntime};
use crate::error::{DnnError, Result};
use crate::kernels::resize::{resize_nearest_planes, Size};
use crate::layer::{rank4, Layer, ShapeInference};
use crate::params::LayerParams;
use crate::parallel::ExecutionStrategy;

/// How the output size is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingMode {
    /// Fixed output size. A zero dimension keeps the input dimension.
    Explicit {
        /// Output width
        width: usize,
        /// Output height
        height: usize,
    },
    /// Both spatial dimensions are multiplied by the factor.
    Zoom(usize),
}

/// Resize an NCHW tensor with nearest-neighbor sampling.
///
/// Recognized parameters:
///
/// * `width`, `height` - explicit output size, both required together
/// * `zoom_factor` - integer multiplier, exclusive with `width` / `height`
/// * `align_corners` - must be `false`
///
/// # Examples
///
/// ```
/// use kornia_dnn::{Layer, LayerParams, ResizeNearestNeighborLayer};
///
/// let params = LayerParams::new("up").with("zoom_factor", 2);
/// let layer = ResizeNearestNeighborLayer::new(&params).unwrap();
///
/// let shapes = layer.infer_shape(&[1, 3, 4, 4]).unwrap();
/// assert_eq!(shapes.output, [1, 3, 8, 8]);
/// assert!(!shapes.in_place);
/// ```
#[derive(Debug, Clone)]
pub struct ResizeNearestNeighborLayer {
    name: String,
    sizing: SizingMode,
    resolved: Option<Size>,
    backend: Backend,
    strategy: ExecutionStrategy,
}

impl ResizeNearestNeighborLayer {
    /// Layer type name used in model files.
    pub const TYPE: &'static str = "ResizeNearestNeighbor";

    /// Create the layer from host parameters.
    ///
    /// # Errors
    ///
    /// * [`DnnError::InvalidConfiguration`] unless exactly one of
    ///   {`width` + `height`, `zoom_factor`} is given
    /// * [`DnnError::InvalidParameter`] for negative sizes or a zoom below 1
    /// * [`DnnError::NotImplemented`] for `align_corners = true`
    pub fn new(params: &LayerParams) -> Result<Self> {
        let has_width = params.has("width");
        let has_height = params.has("height");
        let has_zoom = params.has("zoom_factor");

        if !(has_width && has_height) && !has_zoom {
            return Err(DnnError::InvalidConfiguration(format!(
                "layer `{}` needs both `width` and `height`, or `zoom_factor`",
                params.name
            )));
        }
        if (has_width || has_height) && has_zoom {
            return Err(DnnError::InvalidConfiguration(format!(
                "layer `{}` sets `zoom_factor` together with `width`/`height`",
                params.name
            )));
        }

        if params.get_bool("align_corners")?.unwrap_or(false) {
            return Err(DnnError::NotImplemented(
                "nearest-neighbor resize with align_corners=true".to_string(),
            ));
        }

        let sizing = if has_zoom {
            let zoom = params.get_i64("zoom_factor")?.unwrap_or(1);
            if zoom < 1 {
                return Err(DnnError::invalid_parameter("zoom_factor", zoom, "must be at least 1"));
            }
            SizingMode::Zoom(to_usize("zoom_factor", zoom)?)
        } else {
            SizingMode::Explicit {
                width: non_negative(params, "width")?,
                height: non_negative(params, "height")?,
            }
        };

        let resolved = match sizing {
            SizingMode::Explicit { width, height } if width > 0 && height > 0 => {
                Some(Size::new(width, height))
            }
            _ => None,
        };

        debug!(name = %params.name, ?sizing, "created {} layer", Self::TYPE);

        Ok(Self {
            name: params.name.clone(),
            sizing,
            resolved,
            backend: Backend::Cpu,
            strategy: ExecutionStrategy::default(),
        })
    }

    /// Schedule the planes with the given strategy.
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The sizing mode chosen at construction.
    pub fn sizing(&self) -> SizingMode {
        self.sizing
    }

    /// Output plane size, once known.
    pub fn resolved_size(&self) -> Option<Size> {
        self.resolved
    }

    /// The backend selected by [`set_preferable_backend`](Self::set_preferable_backend).
    pub fn preferable_backend(&self) -> Backend {
        self.backend
    }

    /// Current plane scheduling strategy.
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Select the backend this layer runs on.
    ///
    /// On [`DnnError::UnsupportedBackend`] the layer stays on [`Backend::Cpu`].
    pub fn set_preferable_backend(&mut self, backend: Backend) -> Result<()> {
        self.set_preferable_backend_with::<InferenceEngineRuntime>(backend)
    }

    /// [`set_preferable_backend`](Self::set_preferable_backend) against an
    /// explicit accelerator runtime.
    pub fn set_preferable_backend_with<R: AcceleratorRuntime>(
        &mut self,
        backend: Backend,
    ) -> Result<()> {
        if self.supports_backend_with::<R>(backend) {
            self.backend = backend;
            Ok(())
        } else {
            debug!(name = %self.name, %backend, "backend refused, staying on cpu");
            self.backend = Backend::Cpu;
            Err(DnnError::UnsupportedBackend(backend))
        }
    }

    /// [`Layer::supports_backend`] against an explicit accelerator runtime.
    pub fn supports_backend_with<R: AcceleratorRuntime>(&self, backend: Backend) -> bool {
        match backend {
            Backend::Cpu => true,
            Backend::InferenceEngine => R::is_available(),
            Backend::Cuda | Backend::Wgpu => false,
        }
    }

    /// [`Layer::init_backend_node`] against an explicit accelerator runtime.
    #[instrument(
        name = "ResizeNearestNeighbor::init_backend_node",
        skip_all,
        fields(name = %self.name)
    )]
    pub fn init_backend_node_with<R: AcceleratorRuntime>(&self) -> Result<Option<BackendNode>> {
        if !R::is_available() {
            debug!(runtime = R::name(), "runtime unavailable, falling back to local execution");
            return Ok(None);
        }

        let size = self.resolved.ok_or_else(|| {
            DnnError::NotFinalized(format!("output size of layer `{}` is not resolved", self.name))
        })?;

        let node = BackendNode::new(self.name.as_str(), "Resample")
            .with_param("type", "NEAREST")
            .with_param("antialias", "0")
            .with_param("width", size.width)
            .with_param("height", size.height);

        debug!(runtime = R::name(), %size, "emitted backend node");
        Ok(Some(node))
    }
}

impl Layer for ResizeNearestNeighborLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer_shape(&self, input: &[usize]) -> Result<ShapeInference> {
        let [n, c, h, w] = rank4(input)?;

        let (width, height, zoom) = match self.sizing {
            SizingMode::Explicit { width, height } => (width, height, 1),
            SizingMode::Zoom(zoom) => (0, 0, zoom),
        };
        let out_h = scaled("height", height, h, zoom)?;
        let out_w = scaled("width", width, w, zoom)?;

        Ok(ShapeInference {
            output: [n, c, out_h, out_w],
            in_place: out_h == h && out_w == w,
        })
    }

    fn finalize(&mut self, output: &[usize]) -> Result<()> {
        let [_, _, h, w] = rank4(output)?;
        if self.resolved.is_none() {
            let size = Size::new(w, h);
            debug!(name = %self.name, %size, "resolved output size");
            self.resolved = Some(size);
        }
        Ok(())
    }

    #[instrument(name = "ResizeNearestNeighbor::forward", skip_all, fields(name = %self.name))]
    fn forward<T, A>(&self, input: &Tensor<T, 4, A>, output: &mut Tensor<T, 4, A>) -> Result<()>
    where
        T: Copy + Send + Sync,
        A: TensorAllocator,
    {
        let size = self.resolved.ok_or_else(|| {
            DnnError::NotFinalized(format!("layer `{}` ran forward before finalize", self.name))
        })?;

        let [n, c, h, w] = input.shape;
        if size.height == h && size.width == w {
            trace!("output size equals input size, nothing to do");
            return Ok(());
        }

        let expected = [n, c, size.height, size.width];
        if output.shape != expected {
            return Err(DnnError::ShapeMismatch(format!(
                "expected output {:?}, got {:?}",
                expected, output.shape
            )));
        }

        resize_nearest_planes(
            input.as_slice(),
            Size::new(w, h),
            output.as_slice_mut(),
            size,
            n * c,
            self.strategy,
        )
    }

    fn supports_backend(&self, backend: Backend) -> bool {
        self.supports_backend_with::<InferenceEngineRuntime>(backend)
    }

    fn init_backend_node(&self) -> Result<Option<BackendNode>> {
        self.init_backend_node_with::<InferenceEngineRuntime>()
    }
}

/// Run a nearest-neighbor resize end to end.
///
/// Builds the layer from `params`, allocates the output with `alloc` and runs
/// the forward pass. When the layer is a no-op the input is copied.
///
/// # Example
///
/// ```
/// use kornia_dnn::{resize_nearest, LayerParams};
/// use kornia_tensor::{CpuAllocator, Tensor};
///
/// let input =
///     Tensor::<u8, 4, _>::from_shape_vec([1, 1, 2, 2], vec![1, 2, 3, 4], CpuAllocator).unwrap();
/// let params = LayerParams::new("up").with("zoom_factor", 2);
/// let output = resize_nearest(&input, &params, CpuAllocator).unwrap();
/// assert_eq!(output.shape, [1, 1, 4, 4]);
/// ```
pub fn resize_nearest<T, A>(
    input: &Tensor<T, 4, A>,
    params: &LayerParams,
    alloc: A,
) -> Result<Tensor<T, 4, A>>
where
    T: Copy + Send + Sync + Zero,
    A: TensorAllocator,
{
    let mut layer = ResizeNearestNeighborLayer::new(params)?;
    let shapes = layer.infer_shape(&input.shape)?;

    if shapes.in_place {
        return Ok(Tensor::from_shape_vec(input.shape, input.as_slice().to_vec(), alloc)?);
    }

    let numel = element_count(&shapes.output)?;
    let mut output = Tensor::from_shape_vec(shapes.output, vec![T::zero(); numel], alloc)?;
    layer.finalize(&output.shape)?;
    layer.forward(input, &mut output)?;

    Ok(output)
}

fn non_negative(params: &LayerParams, key: &str) -> Result<usize> {
    let value = params.get_i64(key)?.unwrap_or(0);
    if value < 0 {
        return Err(DnnError::invalid_parameter(key, value, "must not be negative"));
    }
    to_usize(key, value)
}

fn to_usize(key: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| DnnError::invalid_parameter(key, value, "does not fit in usize"))
}

/// Number of elements of a tensor with the given shape.
fn element_count(shape: &[usize; 4]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| DnnError::ShapeOverflow(format!("{shape:?} has too many elements")))
}

/// Configured dimension if set, else the input dimension times the zoom.
fn scaled(axis: &str, configured: usize, input: usize, zoom: usize) -> Result<usize> {
    if configured > 0 {
        return Ok(configured);
    }
    input
        .checked_mul(zoom)
        .ok_or_else(|| DnnError::ShapeOverflow(format!("{axis} {input} * zoom {zoom}")))
}
