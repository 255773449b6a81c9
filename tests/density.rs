use std::sync::atomic::{AtomicBool, Ordering};

use favormap::{
    density, density_with, Error, Grid, GridParams, KernelDensity, KernelSupport, LocalProjection, Progress,
    RasterOptions, WeightedPoint,
};

fn tehran_votes() -> Vec<WeightedPoint> {
    vec![
        WeightedPoint::new(35.700, 51.400, 5.0),
        WeightedPoint::new(35.712, 51.389, 4.0),
        WeightedPoint::new(35.689, 51.421, 1.0),
        WeightedPoint::new(35.731, 51.447, 3.0),
        WeightedPoint::new(35.695, 51.362, 2.0),
    ]
}

#[test]
fn empty_input_gives_empty_grid() {
    let grid = density(&[], None, &KernelDensity::new(1_000.0, 100.0)).unwrap();
    assert_eq!(grid, Grid::empty(100.0));
    assert_eq!(
        serde_json::to_value(&grid).unwrap(),
        serde_json::json!({"width": 0, "height": 0, "cellSize": 100.0, "gridData": [], "min": 0.0, "max": 0.0, "bounds": null}),
    );
}

#[test]
fn invalid_points_are_skipped() {
    let points = [
        WeightedPoint::new(f64::NAN, 51.4, 5.0),
        WeightedPoint::new(35.7, 51.4, -2.0),
    ];
    let grid = density(&points, None, &KernelDensity::new(1_000.0, 100.0)).unwrap();
    assert!(grid.is_empty());

    let mut points = points.to_vec();
    points.push(WeightedPoint::new(35.70, 51.40, 5.0));
    let with_junk = density(&points, None, &KernelDensity::new(1_000.0, 250.0)).unwrap();
    let clean = density(&points[2..], None, &KernelDensity::new(1_000.0, 250.0)).unwrap();
    assert_eq!(with_junk, clean);
}

#[test]
fn single_point_peaks_at_nearest_cell() {
    let point = WeightedPoint::new(35.70, 51.40, 5.0);
    let grid = density(&[point], None, &KernelDensity::new(1_000.0, 500.0)).unwrap();

    // 2 bandwidths of padding on each side of a single point
    assert_eq!((grid.width(), grid.height()), (8, 8));
    assert_eq!(grid.unmasked_count(), 64);
    assert!(grid.bounds().is_some());

    let projection = LocalProjection::new(point.lat, point.lng);
    let distance = |row: usize, col: usize| {
        let (lat, lng) = grid.cell_center(row, col).unwrap();
        let c = projection.to_meters(lat, lng);
        c.x.hypot(c.y)
    };

    let (peak, _) = (0..64)
        .map(|i| (i, grid.data()[i].unwrap()))
        .fold((0, f64::MIN), |best, (i, v)| if v > best.1 { (i, v) } else { best });
    let nearest = (0..64)
        .map(|i| distance(i / 8, i % 8))
        .fold(f64::MAX, f64::min);
    assert!((distance(peak / 8, peak % 8) - nearest).abs() < 1e-6);
    assert_eq!(grid.get(peak / 8, peak % 8), Some(grid.max()));

    // the point sits on the corner shared by cells (3, 3), (3, 4), (4, 3), (4, 4)
    for (row, step) in [(3usize, 1isize), (3, -1), (4, 1), (4, -1)] {
        let mut col = if step > 0 { 4isize } else { 3 };
        let mut previous = grid.get(row, col as usize).unwrap();
        col += step;
        while (0..8).contains(&col) {
            let value = grid.get(row, col as usize).unwrap();
            assert!(value < previous, "row {row} col {col}: {value} >= {previous}");
            previous = value;
            col += step;
        }
    }

    // and along the diagonal from (4, 4) to the south-east corner
    for i in 4..7 {
        assert!(grid.get(i + 1, i + 1).unwrap() < grid.get(i, i).unwrap());
    }
}

#[test]
fn deterministic() {
    let params = KernelDensity::new(800.0, 150.0);
    let a = density(&tehran_votes(), None, &params).unwrap();
    let b = density(&tehran_votes(), None, &params).unwrap();
    assert_eq!(a, b);
    assert!(a.data().iter().zip(b.data()).all(|(x, y)| x.map(f64::to_bits) == y.map(f64::to_bits)));

    let serial = params.with_grid(params.grid.with_parallel(false));
    let c = density(&tehran_votes(), None, &serial).unwrap();
    assert_eq!(a, c);
}

#[test]
fn range_covers_every_cell() {
    let grid = density(&tehran_votes(), None, &KernelDensity::new(600.0, 200.0)).unwrap();
    assert!(grid.min() > 0.0);
    assert!(grid.min() < grid.max());
    for v in grid.data().iter().flatten() {
        assert!(grid.min() <= *v && *v <= grid.max());
    }
}

#[test]
fn heavier_weight_raises_density() {
    let light = density(&[WeightedPoint::new(35.7, 51.4, 1.0)], None, &KernelDensity::new(1_000.0, 500.0)).unwrap();
    let heavy = density(&[WeightedPoint::new(35.7, 51.4, 4.0)], None, &KernelDensity::new(1_000.0, 500.0)).unwrap();
    assert_eq!(light.width(), heavy.width());
    assert!((heavy.max() - 4.0 * light.max()).abs() < 1e-15);
}

#[test]
fn ceiling_is_enforced() {
    let params = KernelDensity::new(500.0, 10.0);
    let grid = density(&tehran_votes(), None, &params).unwrap();
    assert!(grid.width() * grid.height() <= favormap::DEFAULT_MAX_CELLS);
    assert!(grid.cell_size() > 10.0);

    let small = params.with_grid(GridParams::new(10.0).with_max_cells(2_000));
    let grid = density(&tehran_votes(), None, &small).unwrap();
    assert!(grid.width() * grid.height() <= 2_000);
}

#[test]
fn truncated_support_tracks_exact_surface() {
    let exact = KernelDensity::new(500.0, 250.0);
    let truncated = exact.with_support(KernelSupport::Truncated { sigmas: 6.0 });
    let a = density(&tehran_votes(), None, &exact).unwrap();
    let b = density(&tehran_votes(), None, &truncated).unwrap();

    assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    for (x, y) in a.data().iter().zip(b.data()) {
        let (x, y) = (x.unwrap(), y.unwrap());
        assert!(y <= x);
        assert!(x - y <= 1e-7 * a.max());
    }
}

#[test]
fn progress_and_cancellation() {
    let cancel = AtomicBool::new(false);
    let stop_after_first_row = |p: Progress| {
        if p.rows_done >= 1 {
            cancel.store(true, Ordering::Relaxed);
        }
    };
    let params = KernelDensity::new(1_000.0, 250.0);
    let params = params.with_grid(params.grid.with_parallel(false));
    let options = RasterOptions { progress: Some(&stop_after_first_row), cancel: Some(&cancel) };

    let err = density_with(&tehran_votes(), None, &params, &options).unwrap_err();
    assert_eq!(err, Error::Cancelled);
}
