//! Layer parameters supplied by the host when constructing a layer.
//!
//! A [`LayerParams`] is a named bag of loosely typed values, as they come out of
//! a model file. Layers read them through the typed accessors, which report the
//! offending key and value on failure.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DnnError, Result};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Text value
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Real(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Parameters of one layer instance.
///
/// # Examples
///
/// ```
/// use kornia_dnn::LayerParams;
///
/// let params = LayerParams::new("upsample")
///     .with("zoom_factor", 2)
///     .with("align_corners", false);
///
/// assert!(params.has("zoom_factor"));
/// assert_eq!(params.get_i64("zoom_factor").unwrap(), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    /// Layer instance name, unique within a network.
    #[serde(default)]
    pub name: String,
    /// Layer type as written in the model file.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    params: BTreeMap<String, ParamValue>,
}

impl LayerParams {
    /// Create an empty parameter set for the named layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Whether the key was supplied at all.
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Raw access to a value.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Read an integer value.
    ///
    /// Integral reals (`4.0`) and numeric strings are accepted since model
    /// formats do not agree on how sizes are written.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Real(v)
                if v.is_finite()
                    && v.fract() == 0.0
                    && *v >= i64::MIN as f64
                    && *v <= i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            ParamValue::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| DnnError::invalid_parameter(key, value, "expected an integer"))
    }

    /// Read a boolean value. `0` / `1` and `"true"` / `"false"` are accepted.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            ParamValue::Bool(v) => Some(*v),
            ParamValue::Int(0) => Some(false),
            ParamValue::Int(1) => Some(true),
            ParamValue::Str(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| DnnError::invalid_parameter(key, value, "expected a boolean"))
    }

    /// Iterate over all supplied keys and values, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let params = LayerParams::new("resize")
            .with("width", 4.0)
            .with("height", "8")
            .with("align_corners", 0);

        assert_eq!(params.get_i64("width").unwrap(), Some(4));
        assert_eq!(params.get_i64("height").unwrap(), Some(8));
        assert_eq!(params.get_bool("align_corners").unwrap(), Some(false));
        assert_eq!(params.get_i64("zoom_factor").unwrap(), None);
    }

    #[test]
    fn test_bad_values_name_the_key() {
        let params = LayerParams::new("resize")
            .with("width", 2.5)
            .with("align_corners", "maybe");

        match params.get_i64("width") {
            Err(DnnError::InvalidParameter { name, value, .. }) => {
                assert_eq!(name, "width");
                assert_eq!(value, "2.5");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(params.get_bool("align_corners").is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let params: LayerParams = serde_json::from_str(
            r#"{
                "name": "up1",
                "type": "ResizeNearestNeighbor",
                "params": {"zoom_factor": 2, "align_corners": false}
            }"#,
        )
        .unwrap();

        assert_eq!(params.name, "up1");
        assert_eq!(params.kind, "ResizeNearestNeighbor");
        assert_eq!(params.get("zoom_factor"), Some(&ParamValue::Int(2)));
        assert_eq!(params.get_bool("align_corners").unwrap(), Some(false));
        assert_eq!(params.iter().count(), 2);
    }
}
