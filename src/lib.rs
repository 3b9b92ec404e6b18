//! Point location in simple polygons using Seidel's trapezoidal map.
//!
//! A [`TrapezoidalMap`] divides the plane around a polygon into trapezoids, and keeps a search
//! structure to find the trapezoid containing any query point in expected *O*(log(*n*)) time.
//! It is built by inserting the edges of the polygon one at a time in random order.
//!
//! ```
//! use seidel::{PointLocator, TrapezoidalMap, BuildConfig};
//!
//! let square = vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.]];
//! let trap_map = TrapezoidalMap::from_polygon(square, BuildConfig::default())?;
//!
//! assert_eq!(trap_map.locate_one(&[0.5, 0.5]), Some(0));
//! assert_eq!(trap_map.locate_one(&[1.05, 0.5]), None);
//! # Ok::<(), seidel::Error>(())
//! ```
//!
//! Degenerate polygons, for instance with a vertex lying on an edge or two overlapping edges, are
//! rejected with [`Error::InvalidTriangulation`].

mod bounding_box;
mod edge;
mod error;
mod point;
mod point_locator;
mod shuffle;
mod trapezoidal_map;

pub use bounding_box::BoundingBox;
pub use edge::Edge;
pub use error::{Degeneracy, Error};
pub use point::{Point, Positioning};
pub use point_locator::PointLocator;
pub use shuffle::{Lcg, Shuffle, DEFAULT_SEED};
pub use trapezoidal_map::{
    BuildConfig, BuildState, Location, Node, NodeId, NodeKind, Stats, Trapezoid, TrapezoidalMap,
    POLYGON_FACE,
};

/// Builds the trapezoidal map of a polygon given by its vertices, in order.
///
/// The edges are shuffled with the default [`Shuffle`] strategy if `shuffle` is `true`, and
/// inserted in the order of the polygon otherwise.
pub fn build_graph<I, P>(points: I, shuffle: bool) -> Result<TrapezoidalMap, Error>
where
    I: IntoIterator<Item = P>,
    P: Into<Point>,
{
    let shuffle = if shuffle {
        Shuffle::default()
    } else {
        Shuffle::None
    };
    TrapezoidalMap::from_polygon(points, BuildConfig::default().shuffle(shuffle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn build_graph_with_and_without_shuffle() -> Result<()> {
        let points = vec![[0., 0.], [2., 0.], [2., 1.], [1., 2.], [0., 1.]];

        let shuffled = build_graph(points.clone(), true)?;
        let in_order = build_graph(points.clone(), false)?;

        assert_eq!(shuffled.config().shuffle, Shuffle::default());
        assert_eq!(in_order.config().shuffle, Shuffle::None);
        assert_eq!(in_order.edges()[2].left(), Point::new(0., 0.));
        for point in [[1., 1.], [0.1, 1.5], [1.9, 1.5], [3., 3.]] {
            assert_eq!(shuffled.locate_one(&point), in_order.locate_one(&point));
        }

        Ok(())
    }

    #[test]
    fn build_graph_rejects_degenerate_polygons() {
        let result = build_graph(vec![(0., 0.), (1., 1.), (2., 2.)], true);

        assert!(matches!(result, Err(Error::InvalidTriangulation(..))));
    }
}
