//! Rasterization of point sets into masked grids.
//!
//! A [`SurfaceEstimator`] decides what value a cell gets; [`rasterize`] owns
//! everything else: point filtering, extent, the cell-count ceiling, boundary
//! masking, progress and cancellation.

mod extent;
mod idw;
mod index;
mod kde;

pub use idw::{idw, idw_surface, idw_surface_with, InverseDistance, DEFAULT_POWER, DEFAULT_SNAP_DISTANCE};
pub use kde::{density, density_with, gaussian_kernel, KernelDensity, KernelSupport};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::{Boundary, RingRule};
use crate::error::{ensure_positive, Error, Result};
use crate::grid::{Grid, GridBounds};
use crate::point::{points_bounds, WeightedPoint};
use crate::proj::LocalProjection;

use extent::GridLayout;

/// Default ceiling on `width * height`.
pub const DEFAULT_MAX_CELLS: usize = 500_000;

/// Grid parameters shared by every estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridParams {
    /// Requested cell edge length in meters. Coarsened if the grid would exceed `max_cells`.
    pub cell_size: f64,
    /// Ceiling on the number of cells.
    pub max_cells: usize,
    /// How multiple boundary rings combine.
    pub ring_rule: RingRule,
    /// Distribute rows over the rayon thread pool.
    pub parallel: bool,
}

impl Default for GridParams {
    fn default() -> Self {
        Self { cell_size: 100.0, max_cells: DEFAULT_MAX_CELLS, ring_rule: RingRule::Any, parallel: true }
    }
}

impl GridParams {
    pub fn new(cell_size: f64) -> Self { Self { cell_size, ..Self::default() } }

    #[inline] pub fn with_max_cells(self, max_cells: usize) -> Self { Self { max_cells, ..self } }

    #[inline] pub fn with_ring_rule(self, ring_rule: RingRule) -> Self { Self { ring_rule, ..self } }

    #[inline] pub fn with_parallel(self, parallel: bool) -> Self { Self { parallel, ..self } }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure_positive("cell_size", self.cell_size)?;
        if self.max_cells == 0 {
            return Err(Error::InvalidParameter { name: "max_cells", value: "0".into(), reason: "must be > 0" });
        }
        Ok(())
    }
}

/// A grid cell center in both planar meters and degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub x: f64,
    pub y: f64,
    pub lat: f64,
    pub lng: f64,
}

/// A strategy for assigning a value to each unmasked cell.
pub trait SurfaceEstimator {
    /// Grid parameters for this estimator.
    fn grid_params(&self) -> &GridParams;

    /// Reject invalid estimator parameters before any work is done.
    fn validate(&self) -> Result<()>;

    /// Margin in meters added around the point extent when no boundary is given.
    fn padding(&self, cell_size: f64) -> f64;

    /// Prepare per-pass state. `points` are already filtered to valid ones.
    fn bind<'a>(&'a self, points: &'a [WeightedPoint], projection: &LocalProjection) -> Box<dyn CellEstimator + 'a>;
}

/// Per-pass estimator state, queried once per unmasked cell from any thread.
pub trait CellEstimator: Sync {
    /// Value at a cell center; `None` leaves the cell masked.
    fn estimate(&self, cell: &CellSample) -> Option<f64>;
}

/// Row-level progress of a rasterization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub rows_done: usize,
    pub rows_total: usize,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.rows_total == 0 { 1.0 } else { self.rows_done as f64 / self.rows_total as f64 }
    }
}

/// Optional hooks for long computations.
#[derive(Clone, Copy, Default)]
pub struct RasterOptions<'a> {
    /// Called once per finished row, possibly from a worker thread.
    pub progress: Option<&'a (dyn Fn(Progress) + Sync)>,
    /// Checked once per row; when set the computation stops with [`Error::Cancelled`].
    pub cancel: Option<&'a AtomicBool>,
}

/// Rasterize `points` with `estimator`, masking cells outside `boundary`.
///
/// Invalid points (non-finite coordinates, negative or non-finite weight) are
/// skipped. Returns [`Grid::empty`] when no valid point remains or when every
/// cell is masked.
pub fn rasterize<E: SurfaceEstimator + ?Sized>(
    points: &[WeightedPoint],
    boundary: Option<&Boundary>,
    estimator: &E,
    options: &RasterOptions,
) -> Result<Grid> {
    let params = estimator.grid_params();
    params.validate()?;
    estimator.validate()?;

    let started = Instant::now();
    let valid: Vec<WeightedPoint> = points.iter().filter(|p| p.is_valid()).copied().collect();
    if valid.len() < points.len() {
        debug!("skipped {} of {} points with missing coordinates or invalid weight", points.len() - valid.len(), points.len());
    }

    if valid.is_empty() {
        return Ok(Grid::empty(params.cell_size));
    }

    let Some(extent) = boundary.map(|b| *b.bbox()).or_else(|| points_bounds(&valid)) else {
        return Ok(Grid::empty(params.cell_size));
    };

    let projection = LocalProjection::centered_on(&extent);
    let layout = match boundary {
        Some(_) => GridLayout::fit(&projection, &extent, |_| 0.0, params.cell_size, params.max_cells)?,
        None => GridLayout::fit(&projection, &extent, |cell_size| estimator.padding(cell_size), params.cell_size, params.max_cells)?,
    };
    if layout.cells() == 0 {
        return Ok(Grid::empty(layout.cell_size));
    }
    debug!("rasterizing {} points onto {}x{} cells of {:.1} m", valid.len(), layout.width, layout.height, layout.cell_size);

    let cell_estimator = estimator.bind(&valid, &projection);
    let rows_done = AtomicUsize::new(0);

    let fill_row = |(row, cells): (usize, &mut [Option<f64>])| -> Result<()> {
        if options.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Error::Cancelled);
        }

        let y = layout.row_center(row);
        for (col, slot) in cells.iter_mut().enumerate() {
            let x = layout.col_center(col);
            let (lat, lng) = projection.to_geo(x, y);
            if boundary.is_some_and(|b| !b.contains(lat, lng, params.ring_rule)) {
                continue;
            }
            *slot = cell_estimator.estimate(&CellSample { x, y, lat, lng });
        }

        let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = options.progress {
            progress(Progress { rows_done: done, rows_total: layout.height });
        }
        Ok(())
    };

    let mut data = vec![None; layout.cells()];
    if params.parallel {
        data.par_chunks_mut(layout.width).enumerate().try_for_each(&fill_row)?;
    } else {
        data.chunks_mut(layout.width).enumerate().try_for_each(&fill_row)?;
    }

    let grid = Grid::from_cells(layout.width, layout.height, layout.cell_size, data, layout.bounds(&projection));
    debug!("rasterized {} unmasked cells in {:.2?}", grid.unmasked_count(), started.elapsed());
    Ok(grid)
}

impl GridLayout {
    /// Geographic rectangle covered by the full grid of cells.
    fn bounds(&self, projection: &LocalProjection) -> GridBounds {
        let (south, west) = projection.to_geo(self.min.x, self.max.y - self.height as f64 * self.cell_size);
        let (north, east) = projection.to_geo(self.min.x + self.width as f64 * self.cell_size, self.max.y);
        GridBounds { south, west, north, east }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(GridParams);

    struct Bound;

    impl CellEstimator for Bound {
        fn estimate(&self, _: &CellSample) -> Option<f64> { Some(1.0) }
    }

    impl SurfaceEstimator for Constant {
        fn grid_params(&self) -> &GridParams { &self.0 }
        fn validate(&self) -> Result<()> { Ok(()) }
        fn padding(&self, _: f64) -> f64 { 1_000.0 }
        fn bind<'a>(&'a self, _: &'a [WeightedPoint], _: &LocalProjection) -> Box<dyn CellEstimator + 'a> { Box::new(Bound) }
    }

    fn points() -> Vec<WeightedPoint> {
        vec![WeightedPoint::new(35.70, 51.40, 1.0), WeightedPoint::new(35.72, 51.43, 2.0)]
    }

    #[test]
    fn progress_reports_every_row() {
        let calls = AtomicUsize::new(0);
        let last = AtomicUsize::new(0);
        let progress = |p: Progress| {
            calls.fetch_add(1, Ordering::Relaxed);
            last.fetch_max(p.rows_done, Ordering::Relaxed);
            assert!(p.fraction() <= 1.0);
        };
        let options = RasterOptions { progress: Some(&progress), cancel: None };

        let grid = rasterize(&points(), None, &Constant(GridParams::new(250.0)), &options).unwrap();
        assert!(grid.height() > 0);
        assert_eq!(calls.load(Ordering::Relaxed), grid.height());
        assert_eq!(last.load(Ordering::Relaxed), grid.height());
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let options = RasterOptions { progress: None, cancel: Some(&cancel) };
        let err = rasterize(&points(), None, &Constant(GridParams::new(250.0)), &options).unwrap_err();
        assert_eq!(err, Error::Cancelled);
    }

    #[test]
    fn invalid_grid_params() {
        for cell_size in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = rasterize(&points(), None, &Constant(GridParams::new(cell_size)), &RasterOptions::default()).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { name: "cell_size", .. }));
        }
        let params = GridParams::new(100.0).with_max_cells(0);
        assert!(rasterize(&points(), None, &Constant(params), &RasterOptions::default()).is_err());
    }

    #[test]
    fn padding_applies_without_boundary() {
        // 1 km of padding on each side around a single point
        let grid = rasterize(&points()[..1], None, &Constant(GridParams::new(100.0)), &RasterOptions::default()).unwrap();
        assert_eq!((grid.width(), grid.height()), (20, 20));
        assert_eq!(grid.unmasked_count(), 400);
    }

    #[test]
    fn bounds_enclose_points() {
        let grid = rasterize(&points(), None, &Constant(GridParams::new(100.0)), &RasterOptions::default()).unwrap();
        let b = grid.bounds().unwrap();
        for p in points() {
            assert!(b.south < p.lat && p.lat < b.north);
            assert!(b.west < p.lng && p.lng < b.east);
        }
    }

    #[test]
    fn serial_and_parallel_agree() {
        let serial = GridParams::new(100.0).with_parallel(false);
        let a = rasterize(&points(), None, &Constant(serial), &RasterOptions::default()).unwrap();
        let b = rasterize(&points(), None, &Constant(serial.with_parallel(true)), &RasterOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
