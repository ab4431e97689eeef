//! Execution backends and the descriptors handed to accelerated runtimes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable that disables the inference engine runtime when set to
/// `0`, `false` or `off`.
pub const INFERENCE_ENGINE_ENV: &str = "KORNIA_DNN_INFERENCE_ENGINE";

/// Backends a host may ask a layer to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Backend {
    /// Local CPU execution through the layer's own `forward`.
    #[default]
    Cpu,
    /// External inference engine fed with a [`BackendNode`] description.
    InferenceEngine,
    /// CUDA backend (NVIDIA GPUs)
    Cuda,
    /// WGPU backend (Vulkan/Metal/DirectX12)
    Wgpu,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Cpu => "cpu",
            Backend::InferenceEngine => "inference-engine",
            Backend::Cuda => "cuda",
            Backend::Wgpu => "wgpu",
        };
        f.write_str(name)
    }
}

/// Trait representing an accelerated runtime linked into the process.
///
/// Layers never drive the runtime themselves; they only ask whether it is
/// there before promising a [`BackendNode`].
pub trait AcceleratorRuntime {
    /// Get the name of the runtime.
    fn name() -> &'static str;

    /// Check if the runtime is available in this process.
    fn is_available() -> bool;
}

/// The inference engine runtime.
///
/// Available when the crate is built with the `inference-engine` feature and
/// the runtime has not been switched off through [`INFERENCE_ENGINE_ENV`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceEngineRuntime;

impl AcceleratorRuntime for InferenceEngineRuntime {
    fn name() -> &'static str {
        "InferenceEngine"
    }

    fn is_available() -> bool {
        cfg!(feature = "inference-engine") && !disabled_by_env()
    }
}

fn disabled_by_env() -> bool {
    std::env::var(INFERENCE_ENGINE_ENV)
        .map(|value| is_disabled_value(&value))
        .unwrap_or(false)
}

/// Whether a value of [`INFERENCE_ENGINE_ENV`] switches the runtime off.
fn is_disabled_value(value: &str) -> bool {
    matches!(value.trim(), "0" | "false" | "off")
}

/// Numeric precision requested for a backend node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// Single-precision float
    Fp32,
}

/// Declarative description of a layer for an external backend.
///
/// The node carries no code: the backend owns the interpretation of `kind` and
/// `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendNode {
    /// Layer instance name.
    pub name: String,
    /// Operator kind understood by the backend (e.g. `"Resample"`).
    pub kind: String,
    /// Numeric precision of the node.
    pub precision: Precision,
    /// Operator parameters, string encoded.
    pub params: BTreeMap<String, String>,
}

impl BackendNode {
    /// Create a single-precision node without parameters.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            precision: Precision::Fp32,
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn with_param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Look up a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_display() {
        assert_eq!(Backend::Cpu.to_string(), "cpu");
        assert_eq!(Backend::InferenceEngine.to_string(), "inference-engine");
        assert_eq!(Backend::default(), Backend::Cpu);
    }

    #[test]
    #[cfg(not(feature = "inference-engine"))]
    fn test_inference_engine_compiled_out() {
        assert!(!InferenceEngineRuntime::is_available());
        assert_eq!(InferenceEngineRuntime::name(), "InferenceEngine");
    }

    #[test]
    fn test_env_override_values() {
        assert!(is_disabled_value("0"));
        assert!(is_disabled_value("false"));
        assert!(is_disabled_value(" off "));

        assert!(!is_disabled_value("1"));
        assert!(!is_disabled_value("on"));
        assert!(!is_disabled_value(""));
    }

    #[test]
    fn test_env_override_unset() {
        // the variable is never set by the test suite
        assert!(std::env::var(INFERENCE_ENGINE_ENV).is_err());
        assert!(!disabled_by_env());
    }

    #[test]
    fn test_backend_node_serializes() {
        let node = BackendNode::new("up1", "Resample")
            .with_param("width", 8)
            .with_param("antialias", "0");

        assert_eq!(node.param("width"), Some("8"));
        assert_eq!(node.param("height"), None);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["name"], "up1");
        assert_eq!(value["precision"], "Fp32");
        assert_eq!(value["params"]["antialias"], "0");
    }
}
