mod normalize;

pub use normalize::normalize;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Geographic rectangle covered by a grid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// A dense row-major raster. Row 0 is the northern edge; `None` marks a masked cell.
///
/// `min` and `max` are observed over unmasked cells. The empty grid has no
/// cells, `min == max == 0` and no bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGrid")]
pub struct Grid {
    width: usize,
    height: usize,
    cell_size: f64,
    #[serde(rename = "gridData")]
    data: Vec<Option<f64>>,
    min: f64,
    max: f64,
    bounds: Option<GridBounds>,
}

impl Grid {
    /// The grid returned when there is nothing to display.
    pub fn empty(cell_size: f64) -> Self {
        Self { width: 0, height: 0, cell_size, data: Vec::new(), min: 0.0, max: 0.0, bounds: None }
    }

    /// Assemble a grid from row-major cells, computing the observed range.
    ///
    /// Collapses to [`Grid::empty`] when every cell is masked.
    pub(crate) fn from_cells(width: usize, height: usize, cell_size: f64, data: Vec<Option<f64>>, bounds: GridBounds) -> Self {
        debug_assert_eq!(data.len(), width * height);
        match value_range(&data) {
            Some((min, max)) => Self { width, height, cell_size, data, min, max, bounds: Some(bounds) },
            None => Self::empty(cell_size),
        }
    }

    #[inline] pub fn width(&self) -> usize { self.width }

    #[inline] pub fn height(&self) -> usize { self.height }

    /// Edge length of one cell in meters.
    #[inline] pub fn cell_size(&self) -> f64 { self.cell_size }

    /// Row-major cells.
    #[inline] pub fn data(&self) -> &[Option<f64>] { &self.data }

    #[inline] pub fn into_data(self) -> Vec<Option<f64>> { self.data }

    #[inline] pub fn min(&self) -> f64 { self.min }

    #[inline] pub fn max(&self) -> f64 { self.max }

    #[inline] pub fn bounds(&self) -> Option<&GridBounds> { self.bounds.as_ref() }

    /// Check if the grid has no cells at all.
    #[inline] pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Get the value at (`row`, `col`); `None` if masked or out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width { return None }
        self.data[row * self.width + col]
    }

    /// Iterate over rows from north to south.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.data.chunks(self.width.max(1))
    }

    /// Number of cells holding a value.
    pub fn unmasked_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }

    /// Geographic (lat, lng) of the center of cell (`row`, `col`).
    pub fn cell_center(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        let bounds = self.bounds.as_ref()?;
        if row >= self.height || col >= self.width { return None }

        let lat = bounds.north - (row as f64 + 0.5) * (bounds.north - bounds.south) / self.height as f64;
        let lng = bounds.west + (col as f64 + 0.5) * (bounds.east - bounds.west) / self.width as f64;
        Some((lat, lng))
    }
}

/// Wire form of [`Grid`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGrid {
    width: usize,
    height: usize,
    cell_size: f64,
    grid_data: Vec<Option<f64>>,
    min: f64,
    max: f64,
    bounds: Option<GridBounds>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        let cells = raw.width.checked_mul(raw.height);
        if cells != Some(raw.grid_data.len()) {
            return Err(Error::InvalidParameter {
                name: "gridData",
                value: format!("{} cells for {}x{}", raw.grid_data.len(), raw.width, raw.height),
                reason: "length must equal width * height",
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            cell_size: raw.cell_size,
            data: raw.grid_data,
            min: raw.min,
            max: raw.max,
            bounds: raw.bounds,
        })
    }
}

/// Observed (min, max) over unmasked cells, or `None` if all are masked.
pub(crate) fn value_range(data: &[Option<f64>]) -> Option<(f64, f64)> {
    data.iter().flatten().fold(None, |range, &v| match range {
        None => Some((v, v)),
        Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> GridBounds {
        GridBounds { south: 0.0, west: 10.0, north: 2.0, east: 13.0 }
    }

    #[test]
    fn empty_grid_serialization() {
        let json = serde_json::to_value(Grid::empty(100.0)).unwrap();
        assert_eq!(json, serde_json::json!({
            "width": 0, "height": 0, "cellSize": 100.0, "gridData": [], "min": 0.0, "max": 0.0, "bounds": null,
        }));
    }

    #[test]
    fn observed_range_skips_masked() {
        let grid = Grid::from_cells(3, 2, 50.0, vec![None, Some(2.0), Some(-1.0), Some(4.0), None, Some(3.0)], bounds());
        assert_eq!((grid.min(), grid.max()), (-1.0, 4.0));
        assert_eq!(grid.unmasked_count(), 4);
    }

    #[test]
    fn all_masked_collapses_to_empty() {
        let grid = Grid::from_cells(2, 2, 50.0, vec![None; 4], bounds());
        assert_eq!(grid, Grid::empty(50.0));
    }

    #[test]
    fn indexing_and_rows() {
        let grid = Grid::from_cells(3, 2, 50.0, vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)], bounds());
        assert_eq!(grid.get(1, 0), Some(3.0));
        assert_eq!(grid.get(1, 1), None);
        assert_eq!(grid.get(2, 0), None);
        let rows: Vec<_> = grid.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], &[Some(0.0), Some(1.0), Some(2.0)]);
        assert_eq!(Grid::empty(1.0).rows().count(), 0);
    }

    #[test]
    fn cell_centers() {
        let grid = Grid::from_cells(3, 2, 50.0, vec![Some(1.0); 6], bounds());
        assert_eq!(grid.cell_center(0, 0), Some((1.5, 10.5)));
        assert_eq!(grid.cell_center(1, 2), Some((0.5, 12.5)));
        assert_eq!(grid.cell_center(2, 0), None);
    }

    #[test]
    fn deserialize_checks_cell_count() {
        let grid = Grid::from_cells(2, 1, 50.0, vec![Some(1.5), None], bounds());
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), grid);

        let short = serde_json::json!({
            "width": 3, "height": 2, "cellSize": 50.0, "gridData": [1.0, null], "min": 1.0, "max": 1.0, "bounds": null,
        });
        let err = serde_json::from_value::<Grid>(short).unwrap_err();
        assert!(err.to_string().contains("gridData"));

        let empty = serde_json::to_value(Grid::empty(100.0)).unwrap();
        assert_eq!(serde_json::from_value::<Grid>(empty).unwrap(), Grid::empty(100.0));
    }

    #[test]
    fn serialized_masked_cells_are_null() {
        let grid = Grid::from_cells(2, 1, 50.0, vec![Some(1.5), None], bounds());
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["gridData"], serde_json::json!([1.5, null]));
        assert_eq!(json["bounds"]["west"], 10.0);
    }
}
