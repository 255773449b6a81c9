use crate::grid::{value_range, Grid};

/// Affinely map unmasked values from `[old_min, old_max]` onto `[new_min, new_max]`.
///
/// Masked cells stay masked. A constant field (`old_min == old_max`) maps every
/// unmasked cell to `new_min`. The returned grid's range is re-observed from the
/// rescaled values.
pub fn normalize(grid: &Grid, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> Grid {
    let span = old_max - old_min;
    let rescale = |v: f64| if span == 0.0 { new_min } else { new_min + (v - old_min) / span * (new_max - new_min) };

    let data: Vec<Option<f64>> = grid.data.iter()
        .map(|cell| cell.map(rescale))
        .collect();

    let (min, max) = value_range(&data).unwrap_or((grid.min, grid.max));
    Grid { data, min, max, ..grid.clone_shape() }
}

impl Grid {
    /// Rescale this grid's own observed range onto `[new_min, new_max]`.
    #[inline]
    pub fn normalized(&self, new_min: f64, new_max: f64) -> Grid {
        normalize(self, self.min, self.max, new_min, new_max)
    }

    /// Rescale this grid's own observed range onto `[0, 1]`.
    #[inline] pub fn to_unit_range(&self) -> Grid { self.normalized(0.0, 1.0) }

    /// Copy everything except the cell data.
    fn clone_shape(&self) -> Grid {
        Grid { data: Vec::new(), ..*self }
    }
}
