use anyhow::{anyhow, Result};

use crate::io;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SampleArgs) -> Result<()> {
    let points = io::read_points(&args.points)?;
    let score = favormap::idw(args.lat, args.lng, &points, args.power)
        .ok_or_else(|| anyhow!("[sample] no usable points in {}", args.points.display()))?;

    println!("{score}");
    Ok(())
}
