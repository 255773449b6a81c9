use anyhow::Result;
use favormap::{idw_surface_with, InverseDistance, RasterOptions};

use crate::commands::{finish, progress_logger, GridInput};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::IdwArgs) -> Result<()> {
    let input = GridInput::load(&args.grid)?;
    let params = InverseDistance::new(args.grid.cell_size)
        .with_power(args.power)
        .with_grid(input.params);

    let progress = progress_logger("idw");
    let options = RasterOptions { progress: Some(&progress), cancel: None };

    tracing::info!("[idw] {} points, power {}", input.points.len(), params.power);
    let grid = idw_surface_with(&input.points, input.boundary.as_ref(), &params, &options)?;

    finish("idw", &args.grid, grid)
}
