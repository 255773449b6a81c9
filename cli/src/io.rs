use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use favormap::{Boundary, Grid, WeightedPoint};

pub fn assert_not_stdout(path: &Path) -> Result<()> {
    if path == Path::new("-") {
        bail!("stdout is not supported; provide a real file path.");
    }
    Ok(())
}

/// Read a JSON array of {lat, lng, weight} records.
pub fn read_points(path: &Path) -> Result<Vec<WeightedPoint>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read points {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse points {}", path.display()))
}

/// Read a GeoJSON boundary. A file that cannot be used as a boundary is
/// logged by the parser and treated as no boundary; a file that cannot be
/// read at all is an error.
pub fn read_boundary(path: &Path) -> Result<Option<Boundary>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read boundary {}", path.display()))?;
    Ok(favormap::parse_boundary_str(&text))
}

/// Serialize `grid` as JSON via write-then-rename, so a failed run never
/// leaves a truncated file behind.
pub fn write_grid(target: &Path, grid: &Grid, force: bool) -> Result<()> {
    assert_not_stdout(target)?;
    let parent = target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("create dir {}", parent.display()))?;
    if !force && target.exists() {
        bail!("Refusing to overwrite existing file: {} (use --force)", target.display());
    }

    let tmp = NamedTempFile::new_in(parent).context("create temp file")?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, grid).context("serialize grid")?;
        writer.flush().context("flush grid")?;
    }
    tmp.as_file().sync_all().ok(); // best-effort fsync file
    tmp.persist(target)
        .with_context(|| format!("rename to {}", target.display()))?;
    let _ = File::open(parent).and_then(|f| f.sync_all());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("grid.json");
        let grid = Grid::empty(100.0);

        write_grid(&target, &grid, false).unwrap();
        assert!(write_grid(&target, &grid, false).is_err());
        write_grid(&target, &grid, true).unwrap();

        let text = fs::read_to_string(&target).unwrap();
        let back: Grid = serde_json::from_str(&text).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn stdout_is_rejected() {
        assert!(write_grid(Path::new("-"), &Grid::empty(1.0), true).is_err());
    }

    #[test]
    fn reads_points_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.json");
        fs::write(&path, r#"[{"lat": 35.7, "lng": 51.4, "weight": 5}]"#).unwrap();
        let points = read_points(&path).unwrap();
        assert_eq!(points, vec![WeightedPoint::new(35.7, 51.4, 5.0)]);
    }

    #[test]
    fn unusable_boundary_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundary.geojson");
        fs::write(&path, r#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap();
        assert!(read_boundary(&path).unwrap().is_none());
        assert!(read_boundary(&dir.path().join("missing.geojson")).is_err());
    }
}
