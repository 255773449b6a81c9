use geo::Coord;
use rstar::{primitives::GeomWithData, RTree};
use smallvec::SmallVec;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Neighbor list returned by [`PointIndex::within`], inline for typical densities.
pub(crate) type Neighbors = SmallVec<[usize; 32]>;

/// R-tree over projected points, answering fixed-radius queries.
#[derive(Debug, Clone)]
pub(crate) struct PointIndex {
    rtree: RTree<IndexedPoint>,
}

impl PointIndex {
    /// Index `points` (planar meters) by their position in the slice.
    pub(crate) fn new(points: &[Coord<f64>]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                points.iter().enumerate()
                    .map(|(i, c)| IndexedPoint::new([c.x, c.y], i))
                    .collect()
            ),
        }
    }

    /// Indices of points within `radius` of `center`, in ascending order so that
    /// sums over them are reproducible.
    pub(crate) fn within(&self, center: Coord<f64>, radius: f64) -> Neighbors {
        let mut found: Neighbors = self.rtree
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|p| p.data)
            .collect();
        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_query_sorted() {
        let points = [
            Coord { x: 5.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 100.0, y: 0.0 },
            Coord { x: 0.0, y: -9.0 },
        ];
        let index = PointIndex::new(&points);
        assert_eq!(index.within(Coord { x: 0.0, y: 0.0 }, 10.0).as_slice(), &[0, 1, 3]);
        assert_eq!(index.within(Coord { x: 100.0, y: 1.0 }, 2.0).as_slice(), &[2]);
        assert!(index.within(Coord { x: 50.0, y: 50.0 }, 1.0).is_empty());
    }
}
