use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString};
use serde_json::Value;
use tracing::warn;

use crate::boundary::Boundary;

/// Parse a GeoJSON `Polygon`, `MultiPolygon`, `Feature` or `FeatureCollection`
/// into a [`Boundary`].
///
/// Only the first feature of a collection is used. Anything unusable is logged
/// as a warning and yields `None`, so the caller proceeds without a boundary.
pub fn parse_boundary(geometry: &Value) -> Option<Boundary> {
    match Boundary::try_from_geojson(geometry) {
        Ok(boundary) => Some(boundary),
        Err(e) => {
            warn!("ignoring boundary, surface will be unrestricted: {e}");
            None
        }
    }
}

/// Like [`parse_boundary`], from GeoJSON text.
pub fn parse_boundary_str(text: &str) -> Option<Boundary> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => parse_boundary(&value),
        Err(e) => {
            warn!("ignoring boundary, surface will be unrestricted: malformed GeoJSON: {e}");
            None
        }
    }
}

impl Boundary {
    /// Strict variant of [`parse_boundary`] that reports why the geometry was rejected.
    pub fn try_from_geojson(geometry: &Value) -> crate::Result<Self> {
        let rings = collect_rings(geometry).map_err(|e| crate::Error::Boundary(format!("{e:#}")))?;
        Self::from_rings(rings).ok_or_else(|| crate::Error::Boundary("no usable ring".into()))
    }
}

/// Flatten a GeoJSON object into its rings, in document order.
fn collect_rings(value: &Value) -> Result<Vec<LineString<f64>>> {
    let kind = value["type"].as_str()
        .ok_or_else(|| anyhow!("missing \"type\" member"))?;

    match kind {
        "FeatureCollection" => {
            let first = value["features"].as_array()
                .and_then(|features| features.first())
                .ok_or_else(|| anyhow!("FeatureCollection has no features"))?;
            collect_rings(first).context("first feature")
        }
        "Feature" => collect_rings(&value["geometry"]).context("feature geometry"),
        "Polygon" => parse_polygon_coords(coordinates(value)?),
        "MultiPolygon" => {
            let mut rings = Vec::new();
            for (i, polygon) in coordinates(value)?.iter().enumerate() {
                let polygon = polygon.as_array()
                    .ok_or_else(|| anyhow!("MultiPolygon member {i} is not an array"))?;
                rings.extend(parse_polygon_coords(polygon).with_context(|| format!("MultiPolygon member {i}"))?);
            }
            Ok(rings)
        }
        other => bail!("unsupported geometry type {other:?}"),
    }
}

fn coordinates(value: &Value) -> Result<&Vec<Value>> {
    value["coordinates"].as_array()
        .ok_or_else(|| anyhow!("missing \"coordinates\" array"))
}

/// Parse polygon coordinates: `[exterior, hole, hole, ...]`.
fn parse_polygon_coords(coords: &[Value]) -> Result<Vec<LineString<f64>>> {
    coords.iter().enumerate()
        .map(|(i, ring)| {
            let ring = ring.as_array()
                .ok_or_else(|| anyhow!("ring {i} is not an array"))?;
            parse_ring_coords(ring).with_context(|| format!("ring {i}"))
        })
        .collect()
}

/// Parse a ring: `[[lng, lat], [lng, lat], ...]`.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());

    for pair in coords {
        let pair = pair.as_array()
            .filter(|pair| pair.len() >= 2)
            .ok_or_else(|| anyhow!("position must be an array of at least two numbers"))?;
        let x = pair[0].as_f64().ok_or_else(|| anyhow!("invalid coordinate: lng must be a number"))?;
        let y = pair[1].as_f64().ok_or_else(|| anyhow!("invalid coordinate: lat must be a number"))?;
        points.push(Coord { x, y });
    }

    Ok(LineString(points))
}
