use geo::{Coord, Rect};

/// Meters per degree of latitude, and of longitude at the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Equirectangular projection onto a local meter plane.
///
/// Good to a few meters over a city-scale extent. Not meant for polar
/// regions or extents of more than a few hundred kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    ref_lat: f64,
    ref_lng: f64,
    lng_scale: f64, // meters per degree of longitude at ref_lat
}

impl LocalProjection {
    /// Anchor the plane at (`ref_lat`, `ref_lng`).
    pub fn new(ref_lat: f64, ref_lng: f64) -> Self {
        Self { ref_lat, ref_lng, lng_scale: METERS_PER_DEGREE * ref_lat.to_radians().cos() }
    }

    /// Anchor the plane at the center of a lon/lat rectangle.
    pub fn centered_on(rect: &Rect<f64>) -> Self {
        let center = rect.center();
        Self::new(center.y, center.x)
    }

    /// Reference point as (lat, lng).
    #[inline] pub fn reference(&self) -> (f64, f64) { (self.ref_lat, self.ref_lng) }

    /// Project (lat, lng) in degrees to planar (x, y) in meters.
    #[inline]
    pub fn to_meters(&self, lat: f64, lng: f64) -> Coord<f64> {
        Coord {
            x: (lng - self.ref_lng) * self.lng_scale,
            y: (lat - self.ref_lat) * METERS_PER_DEGREE,
        }
    }

    /// Inverse of [`to_meters`](Self::to_meters), returning (lat, lng).
    #[inline]
    pub fn to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        (y / METERS_PER_DEGREE + self.ref_lat, x / self.lng_scale + self.ref_lng)
    }
}
