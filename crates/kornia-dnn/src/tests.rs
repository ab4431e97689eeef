//! Integration tests for the layer lifecycle.

#[cfg(test)]
mod integration {
    use crate::{Backend, Layer, LayerParams, ResizeNearestNeighborLayer};

    #[test]
    fn test_host_lifecycle_on_cpu() {
        let params = LayerParams::new("up").with("zoom_factor", 2);
        let mut layer = ResizeNearestNeighborLayer::new(&params).expect("Failed to create layer");

        assert!(layer.supports_backend(Backend::Cpu));
        layer.set_preferable_backend(Backend::Cpu).unwrap();

        let shapes = layer.infer_shape(&[1, 1, 3, 3]).unwrap();
        layer.finalize(&shapes.output).unwrap();
        assert_eq!(layer.resolved_size().map(|s| (s.width, s.height)), Some((6, 6)));
    }

    #[test]
    fn test_inference_engine_follows_build() {
        let params = LayerParams::new("up").with("width", 4).with("height", 4);
        let layer = ResizeNearestNeighborLayer::new(&params).unwrap();

        // KORNIA_DNN_INFERENCE_ENGINE is unset here; its values are covered in `backend`
        let linked = cfg!(feature = "inference-engine");
        assert_eq!(layer.supports_backend(Backend::InferenceEngine), linked);
        assert_eq!(layer.init_backend_node().unwrap().is_some(), linked);
    }
}
