pub mod density;
pub mod idw;
pub mod sample;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use favormap::{Boundary, Grid, GridParams, Progress, RingRule, WeightedPoint};
use tracing::{debug, info};

use crate::cli::GridArgs;
use crate::io;

/// Points, boundary and grid parameters loaded from the shared arguments.
pub(crate) struct GridInput {
    pub points: Vec<WeightedPoint>,
    pub boundary: Option<Boundary>,
    pub params: GridParams,
}

impl GridInput {
    pub(crate) fn load(args: &GridArgs) -> Result<Self> {
        info!("loading points from {}", args.points.display());
        let points = io::read_points(&args.points)?;

        let boundary = match &args.boundary {
            Some(path) => {
                info!("loading boundary from {}", path.display());
                io::read_boundary(path)?
            }
            None => None,
        };

        let ring_rule = if args.even_odd { RingRule::EvenOdd } else { RingRule::Any };
        let params = GridParams::new(args.cell_size)
            .with_max_cells(args.max_cells)
            .with_ring_rule(ring_rule)
            .with_parallel(!args.serial);

        Ok(Self { points, boundary, params })
    }
}

/// Log progress at most once per ten percent.
pub(crate) fn progress_logger(tag: &'static str) -> impl Fn(Progress) + Sync {
    let last_decile = AtomicUsize::new(0);
    move |p: Progress| {
        let decile = (p.fraction() * 10.0) as usize;
        if last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            debug!("[{tag}] {}/{} rows", p.rows_done, p.rows_total);
        }
    }
}

/// Optionally normalize, then write the grid to the requested output.
pub(crate) fn finish(tag: &str, args: &GridArgs, grid: Grid) -> Result<()> {
    if grid.is_empty() {
        info!("[{tag}] nothing to display: every cell is masked or there are no usable points");
    } else {
        info!("[{tag}] {}x{} cells of {:.1} m, range [{}, {}]", grid.width(), grid.height(), grid.cell_size(), grid.min(), grid.max());
    }

    let grid = if args.normalize { grid.to_unit_range() } else { grid };
    let out_path = args.output.clone().unwrap_or_else(|| PathBuf::from("./grid.json"));

    info!("[{tag}] writing grid to {}", out_path.display());
    io::write_grid(&out_path, &grid, args.force)
}
