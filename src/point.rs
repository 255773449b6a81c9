use geo::{Coord, Rect};
use serde::{Deserialize, Deserializer, Serialize};

/// A single geo-located rating.
///
/// Records with a missing or null coordinate deserialize to NaN and are
/// skipped by the surface builders rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    #[serde(default = "nan", deserialize_with = "null_as_nan")]
    pub lat: f64,
    #[serde(default = "nan", deserialize_with = "null_as_nan")]
    pub lng: f64,
    #[serde(default = "nan", deserialize_with = "null_as_nan")]
    pub weight: f64,
}

impl WeightedPoint {
    #[inline] pub fn new(lat: f64, lng: f64, weight: f64) -> Self { Self { lat, lng, weight } }

    /// True if the point has finite coordinates and a finite, non-negative weight.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.weight.is_finite() && self.weight >= 0.0
    }

    /// Position as a lon/lat coordinate.
    #[inline] pub fn coord(&self) -> Coord<f64> { Coord { x: self.lng, y: self.lat } }
}

/// Bounding rectangle (lon/lat) of a set of points, or `None` if empty.
pub(crate) fn points_bounds(points: &[WeightedPoint]) -> Option<Rect<f64>> {
    let first = points.first()?.coord();
    let (min, max) = points.iter().skip(1).fold((first, first), |(min, max), p| {
        (
            Coord { x: min.x.min(p.lng), y: min.y.min(p.lat) },
            Coord { x: max.x.max(p.lng), y: max.y.max(p.lat) },
        )
    });
    Some(Rect::new(min, max))
}

fn nan() -> f64 { f64::NAN }

fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
