use anyhow::Result;
use favormap::{density_with, KernelDensity, KernelSupport, RasterOptions};

use crate::commands::{finish, progress_logger, GridInput};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::DensityArgs) -> Result<()> {
    let input = GridInput::load(&args.grid)?;

    let support = match args.truncate {
        Some(sigmas) => KernelSupport::Truncated { sigmas },
        None => KernelSupport::Unbounded,
    };
    let params = KernelDensity::new(args.bandwidth, args.grid.cell_size)
        .with_support(support)
        .with_grid(input.params);

    let progress = progress_logger("density");
    let options = RasterOptions { progress: Some(&progress), cancel: None };

    tracing::info!("[density] {} points, bandwidth {} m", input.points.len(), params.bandwidth);
    let grid = density_with(&input.points, input.boundary.as_ref(), &params, &options)?;

    finish("density", &args.grid, grid)
}
