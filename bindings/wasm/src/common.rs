use anyhow::{anyhow, Result};
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::JsValue;

use favormap_core::{Boundary, WeightedPoint};

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Convert a JS array of { lat, lng, weight } objects.
pub(crate) fn js_points(points: JsValue) -> Result<Vec<WeightedPoint>> {
    serde_wasm_bindgen::from_value(points)
        .map_err(|e| anyhow!("points must be an array of {{lat, lng, weight}}: {e}"))
}

/// Convert an optional GeoJSON object. Null, undefined and unusable
/// geometries all mean "no boundary".
pub(crate) fn js_boundary(boundary: JsValue) -> Option<Boundary> {
    if boundary.is_null() || boundary.is_undefined() {
        return None;
    }
    let value: serde_json::Value = serde_wasm_bindgen::from_value(boundary).ok()?;
    favormap_core::parse_boundary(&value)
}

/// Convert an optional parameter object, falling back to defaults for
/// missing fields or a missing object.
pub(crate) fn js_params<T: DeserializeOwned + Default>(params: JsValue) -> Result<T> {
    if params.is_null() || params.is_undefined() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(params).map_err(|e| anyhow!("invalid parameters: {e}"))
}

/// Serialize to a plain JS object; masked cells and missing bounds become `null`.
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).map_err(js_err)
}
