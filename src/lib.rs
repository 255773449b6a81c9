#![doc = "favormap: favorability surfaces from geo-located ratings"]
mod boundary;
mod error;
mod grid;
mod point;
mod proj;
mod surface;

#[doc(inline)]
pub use boundary::{is_inside, parse_boundary, parse_boundary_str, Boundary, RingRule};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use grid::{normalize, Grid, GridBounds};

#[doc(inline)]
pub use point::WeightedPoint;

#[doc(inline)]
pub use proj::{LocalProjection, METERS_PER_DEGREE};

#[doc(inline)]
pub use surface::{
    density, density_with, gaussian_kernel, idw, idw_surface, idw_surface_with, rasterize,
    CellEstimator, CellSample, GridParams, InverseDistance, KernelDensity, KernelSupport,
    Progress, RasterOptions, SurfaceEstimator, DEFAULT_MAX_CELLS, DEFAULT_POWER, DEFAULT_SNAP_DISTANCE,
};
