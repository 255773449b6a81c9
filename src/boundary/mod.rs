mod geojson;

pub use geojson::{parse_boundary, parse_boundary_str};

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Edges whose latitude span is below this are skipped by the ray cast.
const EDGE_EPSILON: f64 = 1e-12;

/// How inclusion in several rings combines into inclusion in the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RingRule {
    /// Inside if inside at least one ring. Rings are independent inclusion regions.
    #[default]
    Any,
    /// Inside if inside an odd number of rings, so nested rings act as holes.
    EvenOdd,
}

/// A study-area boundary: closed rings in lon/lat plus their cached bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    rings: Vec<LineString<f64>>,
    bbox: Rect<f64>,
}

impl Boundary {
    /// Build a boundary from rings of (lng, lat) vertices.
    ///
    /// Open rings are closed. Rings with fewer than three distinct vertices are
    /// dropped. Returns `None` if no usable ring remains.
    pub fn from_rings(rings: impl IntoIterator<Item = LineString<f64>>) -> Option<Self> {
        let rings: Vec<LineString<f64>> = rings.into_iter().filter_map(close_ring).collect();
        let bbox = rings.iter()
            .filter_map(|ring| ring.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))?;

        Some(Self { rings, bbox })
    }

    /// Flatten a polygon's exterior and interior rings, in that order.
    pub fn from_polygon(polygon: &Polygon<f64>) -> Option<Self> {
        Self::from_rings(polygon_rings(polygon))
    }

    /// Flatten every ring of every polygon, in order.
    pub fn from_multi_polygon(multi: &MultiPolygon<f64>) -> Option<Self> {
        Self::from_rings(multi.0.iter().flat_map(polygon_rings))
    }

    /// Get the closed rings, in input order.
    #[inline] pub fn rings(&self) -> &[LineString<f64>] { &self.rings }

    /// Get the bounding box in lon/lat (x = lng, y = lat).
    #[inline] pub fn bbox(&self) -> &Rect<f64> { &self.bbox }

    /// Test whether (lat, lng) lies inside the boundary.
    pub fn contains(&self, lat: f64, lng: f64, rule: RingRule) -> bool {
        let (min, max) = (self.bbox.min(), self.bbox.max());
        if lng < min.x || lng > max.x || lat < min.y || lat > max.y {
            return false;
        }

        match rule {
            RingRule::Any => self.rings.iter().any(|ring| ring_contains(ring, lng, lat)),
            RingRule::EvenOdd => self.rings.iter().filter(|ring| ring_contains(ring, lng, lat)).count() % 2 == 1,
        }
    }
}

/// Test (lat, lng) against an optional boundary; everything is inside when there is none.
#[inline]
pub fn is_inside(lat: f64, lng: f64, boundary: Option<&Boundary>, rule: RingRule) -> bool {
    boundary.is_none_or(|boundary| boundary.contains(lat, lng, rule))
}

fn polygon_rings(polygon: &Polygon<f64>) -> impl Iterator<Item = LineString<f64>> + '_ {
    std::iter::once(polygon.exterior().clone()).chain(polygon.interiors().iter().cloned())
}

/// Ensure first and last vertex are equal; reject rings that cannot enclose anything.
fn close_ring(mut ring: LineString<f64>) -> Option<LineString<f64>> {
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return None;
    }
    ring.0.dedup();
    if ring.0.len() > 1 && ring.0.first() == ring.0.last() {
        ring.0.pop();
    }
    if ring.0.len() < 3 {
        return None;
    }
    ring.close();
    Some(ring)
}

/// Ray-casting test over one closed ring (x = lng, y = lat).
fn ring_contains(ring: &LineString<f64>, x: f64, y: f64) -> bool {
    let mut inside = false;
    for line in ring.lines() {
        let (a, b) = (line.start, line.end);
        let dy = b.y - a.y;
        if dy.abs() < EDGE_EPSILON {
            continue;
        }
        if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / dy + a.x {
            inside = !inside;
        }
    }
    inside
}
