use rayon::prelude::*;

/// A trait to find which face of a planar subdivision contains query points.
///
/// Faces are identified by their index. For a [`TrapezoidalMap`](crate::TrapezoidalMap), the only
/// face is the polygon, with index [`POLYGON_FACE`](crate::POLYGON_FACE).
pub trait PointLocator {
    /// Locates one query point.
    ///
    /// Returns [`None`] if the query point does not lie in any face. Points on the boundary of a
    /// face belong to it.
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize>;

    /// Locates several query points.
    fn locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<usize>> {
        points.iter().map(|point| self.locate_one(point)).collect()
    }

    /// Locates several query points in parallel.
    ///
    /// Queries only read the search structure, so they can be shared between threads.
    fn par_locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<usize>>
    where
        Self: Sync,
    {
        points
            .par_iter()
            .map(|point| self.locate_one(point))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildConfig, TrapezoidalMap};
    use anyhow::Result;
    use itertools::Itertools;

    #[test]
    fn locate_many_agrees_with_locate_one() -> Result<()> {
        let hexagon = (0..6).map(|i| {
            let angle = std::f64::consts::PI * i as f64 / 3.;
            [angle.cos(), angle.sin()]
        });
        let trap_map = TrapezoidalMap::from_polygon(hexagon, BuildConfig::default())?;
        let points = (-12..=12)
            .cartesian_product(-12..=12)
            .map(|(i, j)| [i as f64 / 10. + 0.01, j as f64 / 10. + 0.01])
            .collect_vec();

        let expected = points
            .iter()
            .map(|point| trap_map.locate_one(point))
            .collect_vec();

        assert_eq!(trap_map.locate_many(&points), expected);
        assert_eq!(trap_map.par_locate_many(&points), expected);
        assert!(expected.contains(&Some(0)));
        assert!(expected.contains(&None));

        Ok(())
    }
}
