//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates a score at a location as a weighted average of the sample
//! weights, where each sample counts `1 / d^power`. Distance is measured in
//! raw degrees (lat, lng), unlike the kernel density estimate which works in
//! projected meters, so the field is slightly stretched east-west away from
//! the equator.

use serde::{Deserialize, Serialize};

use crate::boundary::Boundary;
use crate::error::{ensure_positive, Error, Result};
use crate::grid::Grid;
use crate::point::WeightedPoint;
use crate::proj::LocalProjection;
use crate::surface::{rasterize, CellEstimator, CellSample, GridParams, RasterOptions, SurfaceEstimator};

/// Default distance exponent.
pub const DEFAULT_POWER: f64 = 2.0;

/// Samples closer than this (in degrees) are treated as coincident.
pub const DEFAULT_SNAP_DISTANCE: f64 = 1e-10;

/// IDW estimate at (`lat`, `lng`).
///
/// A sample closer than [`DEFAULT_SNAP_DISTANCE`] returns its own weight
/// directly. Returns `None` when there are no valid samples.
pub fn idw(lat: f64, lng: f64, points: &[WeightedPoint], power: f64) -> Option<f64> {
    idw_at(lat, lng, points.iter().filter(|p| p.is_valid()), power, DEFAULT_SNAP_DISTANCE)
}

fn idw_at<'a>(
    lat: f64,
    lng: f64,
    points: impl Iterator<Item = &'a WeightedPoint>,
    power: f64,
    snap_distance: f64,
) -> Option<f64> {
    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;

    for p in points {
        let d = (p.lat - lat).hypot(p.lng - lng);
        if d < snap_distance {
            return Some(p.weight);
        }
        let w = 1.0 / d.powf(power);
        sum_w += w;
        sum_wz += w * p.weight;
    }

    (sum_w > 0.0).then(|| sum_wz / sum_w)
}

/// IDW surface parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InverseDistance {
    /// Distance exponent. Higher values give more weight to nearby samples.
    pub power: f64,
    /// Coincidence threshold in degrees.
    pub snap_distance: f64,
    #[serde(flatten)]
    pub grid: GridParams,
}

impl Default for InverseDistance {
    fn default() -> Self {
        Self { power: DEFAULT_POWER, snap_distance: DEFAULT_SNAP_DISTANCE, grid: GridParams::default() }
    }
}

impl InverseDistance {
    pub fn new(cell_size: f64) -> Self {
        Self { grid: GridParams::new(cell_size), ..Self::default() }
    }

    #[inline] pub fn with_power(self, power: f64) -> Self { Self { power, ..self } }

    #[inline] pub fn with_grid(self, grid: GridParams) -> Self { Self { grid, ..self } }
}

impl SurfaceEstimator for InverseDistance {
    #[inline] fn grid_params(&self) -> &GridParams { &self.grid }

    fn validate(&self) -> Result<()> {
        ensure_positive("power", self.power)?;
        if !(self.snap_distance >= 0.0 && self.snap_distance.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "snap_distance",
                value: self.snap_distance.to_string(),
                reason: "must be finite and >= 0",
            });
        }
        Ok(())
    }

    /// One cell, so samples on the edge of the extent still get a cell around them.
    #[inline] fn padding(&self, cell_size: f64) -> f64 { cell_size }

    fn bind<'a>(&'a self, points: &'a [WeightedPoint], _projection: &LocalProjection) -> Box<dyn CellEstimator + 'a> {
        Box::new(BoundIdw { points, power: self.power, snap_distance: self.snap_distance })
    }
}

struct BoundIdw<'a> {
    points: &'a [WeightedPoint],
    power: f64,
    snap_distance: f64,
}

impl CellEstimator for BoundIdw<'_> {
    #[inline]
    fn estimate(&self, cell: &CellSample) -> Option<f64> {
        idw_at(cell.lat, cell.lng, self.points.iter(), self.power, self.snap_distance)
    }
}

/// IDW surface over `points`, masked to `boundary`.
pub fn idw_surface(points: &[WeightedPoint], boundary: Option<&Boundary>, params: &InverseDistance) -> Result<Grid> {
    idw_surface_with(points, boundary, params, &RasterOptions::default())
}

/// [`idw_surface`] with progress reporting and cancellation.
#[inline]
pub fn idw_surface_with(
    points: &[WeightedPoint],
    boundary: Option<&Boundary>,
    params: &InverseDistance,
    options: &RasterOptions,
) -> Result<Grid> {
    rasterize(points, boundary, params, options)
}
