use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use favormap_core::{Grid, InverseDistance, KernelDensity};

use crate::common::*;

/// Kernel density grid.
/// points: [{ lat, lng, weight }, ...]
/// boundary: GeoJSON Polygon / MultiPolygon / Feature / FeatureCollection, or null
/// params: { bandwidth, cellSize, maxCells, ringRule, support }, all optional
#[wasm_bindgen]
pub fn density(points: JsValue, boundary: JsValue, params: JsValue) -> Result<JsValue, JsValue> {
    let points = js_points(points).map_err(js_err)?;
    let boundary = js_boundary(boundary);
    let mut params: KernelDensity = js_params(params).map_err(js_err)?;
    // no worker threads in the browser build
    params.grid.parallel = false;

    let grid = favormap_core::density(&points, boundary.as_ref(), &params).map_err(js_err)?;
    to_js(&grid)
}

/// IDW score grid.
/// params: { power, snapDistance, cellSize, maxCells, ringRule }, all optional
#[wasm_bindgen(js_name = "idwSurface")]
pub fn idw_surface(points: JsValue, boundary: JsValue, params: JsValue) -> Result<JsValue, JsValue> {
    let points = js_points(points).map_err(js_err)?;
    let boundary = js_boundary(boundary);
    let mut params: InverseDistance = js_params(params).map_err(js_err)?;
    params.grid.parallel = false;

    let grid = favormap_core::idw_surface(&points, boundary.as_ref(), &params).map_err(js_err)?;
    to_js(&grid)
}

/// IDW score at one location; undefined when there are no usable points.
#[wasm_bindgen]
pub fn idw(lat: f64, lng: f64, points: JsValue, power: Option<f64>) -> Result<Option<f64>, JsValue> {
    let points = js_points(points).map_err(js_err)?;
    Ok(favormap_core::idw(lat, lng, &points, power.unwrap_or(favormap_core::DEFAULT_POWER)))
}

/// Rescale a grid returned by `density` or `idwSurface` onto [newMin, newMax] (default [0, 1]).
#[wasm_bindgen]
pub fn normalize(grid: JsValue, new_min: Option<f64>, new_max: Option<f64>) -> Result<JsValue, JsValue> {
    let grid: Grid = serde_wasm_bindgen::from_value(grid)
        .map_err(|e| js_err(format!("grid must come from density or idwSurface: {e}")))?;
    to_js(&grid.normalized(new_min.unwrap_or(0.0), new_max.unwrap_or(1.0)))
}
