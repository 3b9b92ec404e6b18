use anyhow::{anyhow, ensure};
use std::fmt::Display;

use super::dag::{Dag, NodeId};
use crate::edge::Edge;
use crate::error::Error;
use crate::point::{Point, Positioning};

/// A cell of the trapezoidal map.
///
/// A trapezoid is bounded by two edges, `below` and `above`, and by the vertical lines through two
/// points, `left` and `right`. Triangles are trapezoids whose left or right side has zero length.
///
/// A trapezoid shares its left and right sides with at most two trapezoids each: the lower
/// neighbours have the same `below` edge and the upper neighbours the same `above` edge. Neighbour
/// links are always kept reciprocal, see [`Dag::set_lower_left`] and its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct Trapezoid {
    pub(crate) left: Point,
    pub(crate) right: Point,
    pub(crate) below: Edge,
    pub(crate) above: Edge,
    pub(crate) lower_left: Option<NodeId>,
    pub(crate) upper_left: Option<NodeId>,
    pub(crate) lower_right: Option<NodeId>,
    pub(crate) upper_right: Option<NodeId>,
}

impl Trapezoid {
    pub(crate) fn new(left: Point, right: Point, below: Edge, above: Edge) -> Self {
        Self {
            left,
            right,
            below,
            above,
            lower_left: None,
            upper_left: None,
            lower_right: None,
            upper_right: None,
        }
    }

    pub fn left(&self) -> Point {
        self.left
    }

    pub fn right(&self) -> Point {
        self.right
    }

    pub fn below(&self) -> &Edge {
        &self.below
    }

    pub fn above(&self) -> &Edge {
        &self.above
    }

    pub fn lower_left(&self) -> Option<NodeId> {
        self.lower_left
    }

    pub fn upper_left(&self) -> Option<NodeId> {
        self.upper_left
    }

    pub fn lower_right(&self) -> Option<NodeId> {
        self.lower_right
    }

    pub fn upper_right(&self) -> Option<NodeId> {
        self.upper_right
    }

    pub fn lower_left_point(&self) -> Result<Point, Error> {
        Ok(Point::new(self.left.x, self.below.y_at_x(self.left.x)?))
    }

    pub fn upper_left_point(&self) -> Result<Point, Error> {
        Ok(Point::new(self.left.x, self.above.y_at_x(self.left.x)?))
    }

    pub fn lower_right_point(&self) -> Result<Point, Error> {
        Ok(Point::new(self.right.x, self.below.y_at_x(self.right.x)?))
    }

    pub fn upper_right_point(&self) -> Result<Point, Error> {
        Ok(Point::new(self.right.x, self.above.y_at_x(self.right.x)?))
    }

    /// Area of the trapezoid, computed from its four corners.
    pub fn area(&self) -> Result<f64, Error> {
        let width = self.right.x - self.left.x;
        let left_height = self.upper_left_point()?.y - self.lower_left_point()?.y;
        let right_height = self.upper_right_point()?.y - self.lower_right_point()?.y;
        Ok(0.5 * width * (left_height + right_height))
    }

    /// Returns `true` if `point` lies in the closed trapezoid.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.left.x
            && point.x <= self.right.x
            && self.below.point_orientation(point) != Positioning::Right
            && self.above.point_orientation(point) != Positioning::Left
    }

    /// Returns `true` if both trapezoids cover the same region, regardless of their neighbours.
    pub(crate) fn same_bounds(&self, other: &Trapezoid) -> bool {
        self.left == other.left
            && self.right == other.right
            && self.below == other.below
            && self.above == other.above
    }
}

impl Display for Trapezoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trapezoid {} {} below {} above {}",
            self.left, self.right, self.below, self.above
        )
    }
}

/// Tolerance used when comparing corners computed from different edges.
fn close(a: f64, b: f64) -> bool {
    let scale = 1f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= 1e-10 * scale
}

fn close_points(a: Point, b: Point) -> bool {
    close(a.x, b.x) && close(a.y, b.y)
}

impl Dag {
    pub(crate) fn set_lower_left(
        &mut self,
        id: NodeId,
        neighbor: Option<NodeId>,
    ) -> Result<(), Error> {
        self.trap_mut(id)?.lower_left = neighbor;
        if let Some(neighbor) = neighbor {
            self.trap_mut(neighbor)?.lower_right = Some(id);
        }
        Ok(())
    }

    pub(crate) fn set_upper_left(
        &mut self,
        id: NodeId,
        neighbor: Option<NodeId>,
    ) -> Result<(), Error> {
        self.trap_mut(id)?.upper_left = neighbor;
        if let Some(neighbor) = neighbor {
            self.trap_mut(neighbor)?.upper_right = Some(id);
        }
        Ok(())
    }

    pub(crate) fn set_lower_right(
        &mut self,
        id: NodeId,
        neighbor: Option<NodeId>,
    ) -> Result<(), Error> {
        self.trap_mut(id)?.lower_right = neighbor;
        if let Some(neighbor) = neighbor {
            self.trap_mut(neighbor)?.lower_left = Some(id);
        }
        Ok(())
    }

    pub(crate) fn set_upper_right(
        &mut self,
        id: NodeId,
        neighbor: Option<NodeId>,
    ) -> Result<(), Error> {
        self.trap_mut(id)?.upper_right = neighbor;
        if let Some(neighbor) = neighbor {
            self.trap_mut(neighbor)?.upper_left = Some(id);
        }
        Ok(())
    }

    /// Checks the trapezoid `id` against its neighbours.
    pub(crate) fn validate_trap(&self, id: NodeId) -> anyhow::Result<()> {
        let trap = self.trap(id)?;
        ensure!(
            trap.right.is_right_of(&trap.left),
            "{} of node {} has its right point left of its left point",
            trap,
            id
        );
        let below_or_close = |lower: f64, upper: f64| lower <= upper || close(lower, upper);
        ensure!(
            below_or_close(trap.lower_left_point()?.y, trap.upper_left_point()?.y)
                && below_or_close(trap.lower_right_point()?.y, trap.upper_right_point()?.y),
            "{} of node {} is upside down",
            trap,
            id
        );

        let neighbor = |neighbor: NodeId| {
            self.get(neighbor)
                .and_then(|node| node.trapezoid())
                .ok_or_else(|| anyhow!("Neighbour {} of node {} is not a trapezoid", neighbor, id))
        };

        if let Some(lower_left) = trap.lower_left {
            let other = neighbor(lower_left)?;
            ensure!(other.lower_right == Some(id), "Lower left of {} is not reciprocal", id);
            ensure!(other.below == trap.below, "Lower left of {} has another bottom", id);
            ensure!(
                close_points(other.lower_right_point()?, trap.lower_left_point()?),
                "Lower left of {} has mismatched corners",
                id
            );
        }
        if let Some(upper_left) = trap.upper_left {
            let other = neighbor(upper_left)?;
            ensure!(other.upper_right == Some(id), "Upper left of {} is not reciprocal", id);
            ensure!(other.above == trap.above, "Upper left of {} has another top", id);
            ensure!(
                close_points(other.upper_right_point()?, trap.upper_left_point()?),
                "Upper left of {} has mismatched corners",
                id
            );
        }
        if let Some(lower_right) = trap.lower_right {
            let other = neighbor(lower_right)?;
            ensure!(other.lower_left == Some(id), "Lower right of {} is not reciprocal", id);
            ensure!(other.below == trap.below, "Lower right of {} has another bottom", id);
            ensure!(
                close_points(other.lower_left_point()?, trap.lower_right_point()?),
                "Lower right of {} has mismatched corners",
                id
            );
        }
        if let Some(upper_right) = trap.upper_right {
            let other = neighbor(upper_right)?;
            ensure!(other.upper_left == Some(id), "Upper right of {} is not reciprocal", id);
            ensure!(other.above == trap.above, "Upper right of {} has another top", id);
            ensure!(
                close_points(other.upper_left_point()?, trap.upper_right_point()?),
                "Upper right of {} has mismatched corners",
                id
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use approx::assert_relative_eq;

    fn point(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn edge(left: [f64; 2], right: [f64; 2]) -> Edge {
        Edge::new(left.into(), right.into()).unwrap()
    }

    #[test]
    fn corners_and_area() -> Result<()> {
        let trap = Trapezoid::new(
            point(1., 0.),
            point(3., 0.),
            edge([0., 0.], [4., 0.]),
            edge([0., 1.], [4., 3.]),
        );

        assert_eq!(trap.lower_left_point()?, point(1., 0.));
        assert_eq!(trap.upper_left_point()?, point(1., 1.5));
        assert_eq!(trap.lower_right_point()?, point(3., 0.));
        assert_eq!(trap.upper_right_point()?, point(3., 2.5));
        assert_relative_eq!(trap.area()?, 4.);

        Ok(())
    }

    #[test]
    fn triangle_area() -> Result<()> {
        let trap = Trapezoid::new(
            point(0., 0.),
            point(2., 0.),
            edge([0., 0.], [2., 0.]),
            edge([0., 0.], [2., 2.]),
        );

        assert_relative_eq!(trap.area()?, 2.);

        Ok(())
    }

    #[test]
    fn contains() {
        let trap = Trapezoid::new(
            point(0., 0.),
            point(2., 0.),
            edge([0., 0.], [2., 0.]),
            edge([0., 1.], [2., 2.]),
        );

        assert!(trap.contains(&point(1., 1.)));
        assert!(trap.contains(&point(1., 1.5)));
        assert!(trap.contains(&point(0., 0.)));
        assert!(!trap.contains(&point(1., 1.6)));
        assert!(!trap.contains(&point(2.1, 1.)));
        assert!(!trap.contains(&point(1., -0.1)));
    }

    #[test]
    fn area_fails_outside_of_edges() {
        let trap = Trapezoid::new(
            point(0., 0.),
            point(3., 0.),
            edge([0., 0.], [2., 0.]),
            edge([0., 1.], [2., 1.]),
        );

        assert!(matches!(trap.area(), Err(Error::OutsideEdge { .. })));
    }

    #[test]
    fn neighbors_are_reciprocal() -> Result<()> {
        let below = edge([0., 0.], [2., 0.]);
        let above = edge([0., 1.], [2., 1.]);
        let mut dag = Dag::new(Trapezoid::new(point(0., 0.), point(1., 0.5), below, above));
        let left = dag.root();
        let right = dag.add_trap(Trapezoid::new(point(1., 0.5), point(2., 0.), below, above));

        dag.set_lower_right(left, Some(right))?;
        dag.set_upper_left(right, Some(left))?;

        assert_eq!(dag.trap(left)?.lower_right(), Some(right));
        assert_eq!(dag.trap(left)?.upper_right(), Some(right));
        assert_eq!(dag.trap(right)?.lower_left(), Some(left));
        assert_eq!(dag.trap(right)?.upper_left(), Some(left));
        dag.validate_trap(left)?;
        dag.validate_trap(right)?;

        dag.set_lower_right(left, None)?;
        assert_eq!(dag.trap(left)?.lower_right(), None);
        assert!(dag.validate_trap(right).is_err());

        Ok(())
    }

    #[test]
    fn neighbors_must_share_edges() -> Result<()> {
        let below = edge([0., 0.], [2., 0.]);
        let above = edge([0., 1.], [2., 1.]);
        let other = edge([0., -1.], [2., -1.]);
        let mut dag = Dag::new(Trapezoid::new(point(0., 0.), point(1., 0.5), below, above));
        let left = dag.root();
        let right = dag.add_trap(Trapezoid::new(point(1., 0.5), point(2., 0.), other, above));

        dag.set_lower_right(left, Some(right))?;

        assert!(dag.validate_trap(left).is_err());

        Ok(())
    }
}
