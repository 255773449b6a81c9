use geo::{Coord, Rect};
use tracing::warn;

use crate::error::{Error, Result};
use crate::proj::LocalProjection;

/// Coarsening passes allowed before the ceiling is treated as an invariant failure.
const MAX_COARSEN_PASSES: usize = 2;

/// Planar extent and integer dimensions of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GridLayout {
    pub(crate) min: Coord<f64>, // south-west corner in meters
    pub(crate) max: Coord<f64>, // north-east corner in meters
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cell_size: f64,
}

impl GridLayout {
    /// Lay out cells of `cell_size` meters over `extent` (lon/lat) grown by
    /// `padding(cell_size)` meters on every side.
    fn with_cell_size(projection: &LocalProjection, extent: &Rect<f64>, padding: f64, cell_size: f64) -> Self {
        let lo = projection.to_meters(extent.min().y, extent.min().x);
        let hi = projection.to_meters(extent.max().y, extent.max().x);
        let min = Coord { x: lo.x - padding, y: lo.y - padding };
        let max = Coord { x: hi.x + padding, y: hi.y + padding };

        // `as` saturates, so absurdly small cells cannot wrap around
        let width = ((max.x - min.x) / cell_size).ceil() as usize;
        let height = ((max.y - min.y) / cell_size).ceil() as usize;

        Self { min, max, width, height, cell_size }
    }

    /// Lay out the grid, coarsening `cell_size` if it would exceed `max_cells`.
    ///
    /// Each pass scales the cell size by `sqrt((w + 1)(h + 1) / max_cells)`.
    /// The first pass can land a few cells over the ceiling; the second lands under it.
    pub(crate) fn fit(
        projection: &LocalProjection,
        extent: &Rect<f64>,
        padding: impl Fn(f64) -> f64,
        cell_size: f64,
        max_cells: usize,
    ) -> Result<Self> {
        let mut layout = Self::with_cell_size(projection, extent, padding(cell_size), cell_size);

        for _ in 0..MAX_COARSEN_PASSES {
            if layout.cells() <= max_cells {
                return Ok(layout);
            }
            // (w + 1)(h + 1), not w * h: rounding each scaled dimension up adds up to one
            // cell per axis, and with w * h alone that overshoot never shrinks between passes
            let scale = ((layout.width as f64 + 1.0) * (layout.height as f64 + 1.0) / max_cells as f64).sqrt();
            let coarser = layout.cell_size * scale;
            warn!(
                "{}x{} grid exceeds {max_cells} cells; coarsening cell size from {:.2} m to {:.2} m",
                layout.width, layout.height, layout.cell_size, coarser,
            );
            layout = Self::with_cell_size(projection, extent, padding(coarser), coarser);
        }

        if layout.cells() <= max_cells {
            Ok(layout)
        } else {
            Err(Error::CellCeiling { width: layout.width, height: layout.height, ceiling: max_cells })
        }
    }

    /// Total number of cells.
    #[inline] pub(crate) fn cells(&self) -> usize { self.width.saturating_mul(self.height) }

    /// Planar y of the center of `row`; row 0 is the northern edge.
    #[inline] pub(crate) fn row_center(&self, row: usize) -> f64 { self.max.y - (row as f64 + 0.5) * self.cell_size }

    /// Planar x of the center of `col`.
    #[inline] pub(crate) fn col_center(&self, col: usize) -> f64 { self.min.x + (col as f64 + 0.5) * self.cell_size }
}
