use anyhow::ensure;
use itertools::Itertools;
use std::fmt::Display;
use tracing::{debug, trace, warn};

use super::dag::{Dag, Node, NodeId, NodeKind};
use super::stats::Stats;
use super::trapezoid::Trapezoid;
use crate::bounding_box::BoundingBox;
use crate::edge::Edge;
use crate::error::{Degeneracy, Error};
use crate::point::{Point, Positioning};
use crate::point_locator::PointLocator;
use crate::shuffle::Shuffle;

/// Index of the polygon in the faces recorded on its edges.
pub const POLYGON_FACE: usize = 0;

/// Trapezoidal map of a simple polygon.
///
/// The plane inside an enclosing rectangle is divided into trapezoids by the edges of the polygon
/// and by vertical walls going up and down from each vertex, until they hit an edge or the
/// rectangle. Finding the trapezoid containing a point is done with a search structure, a
/// directed acyclic graph (a.k.a. a DAG) where the nodes can be one of three kinds:
/// - an x-node (associated with a vertex of the polygon)
/// - a y-node (associated with an edge of the polygon)
/// - a trapezoid-node (associated with... a trapezoid!)
///
/// This is Seidel's construction: it is a *randomized incremental* algorithm, meaning that the
/// edges are added one at a time in random order, and at each step of the process we have a
/// search structure that can answer point location queries. When an edge is added, the trapezoids
/// it crosses are found with the search structure, split along the edge, and their nodes are
/// replaced with small sub-graphs of new nodes. Trapezoids on one side of the edge that are only
/// separated by walls blocked by the new edge are merged on the fly.
///
/// The expected construction time is *O*(*n* \* log(*n*)), the expected storage *O*(*n*) and the
/// expected query time *O*(log(*n*)) (see [De Berg et al.] and [Seidel]). All of these only hold
/// for a random insertion order, which is why the edges are shuffled by default. The shuffle is
/// seeded, so building a map twice from the same polygon yields identical search structures.
///
/// [De Berg et al.]: https://doi.org/10.1007/978-3-540-77974-2
/// [Seidel]: https://doi.org/10.1016/0925-7721(91)90012-4
#[derive(Debug, Clone)]
pub struct TrapezoidalMap {
    pub(crate) dag: Dag,
    points: Vec<Point>,
    n_points: usize,
    edges: Vec<Edge>,
    bbox: BoundingBox,
    rect: BoundingBox,
    config: BuildConfig,
    state: BuildState,
}

/// Where a trapezoidal map is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// The map only holds the enclosing rectangle.
    NotBuilt,
    /// All the edges of the polygon have been inserted.
    Built,
    /// The build was aborted by a degenerate polygon. The map is consistent but only holds the
    /// edges inserted before the failure.
    Invalid,
}

impl Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildState::NotBuilt => write!(f, "not built"),
            BuildState::Built => write!(f, "built"),
            BuildState::Invalid => write!(f, "invalid"),
        }
    }
}

/// Options controlling how a trapezoidal map is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildConfig {
    /// Order in which the edges are inserted.
    pub shuffle: Shuffle,
    /// Validate the whole map after each inserted edge. This is slow and meant for debugging.
    pub check_invariants: bool,
}

impl BuildConfig {
    pub fn shuffle(mut self, shuffle: Shuffle) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn check_invariants(mut self, check_invariants: bool) -> Self {
        self.check_invariants = check_invariants;
        self
    }
}

/// Result of a point location query.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<'a> {
    /// The point lies in the trapezoid, possibly on one of its vertical sides.
    Trapezoid(&'a Trapezoid),
    /// The point is a vertex of the polygon.
    Vertex(Point),
    /// The point lies on an edge of the polygon.
    Edge(Edge),
}

#[derive(Clone, Copy)]
enum Orientation {
    Counterclockwise,
    Clockwise,
}

impl TrapezoidalMap {
    /// Creates a trapezoidal map for a polygon, without inserting its edges yet.
    ///
    /// The map holds a single trapezoid covering the enclosing rectangle, see [`Self::build`].
    pub fn new<I, P>(points: I, config: BuildConfig) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let mut points: Vec<Point> = points
            .into_iter()
            .map(|point| point.into().normalized())
            .collect();
        let n_points = points.len();
        // Non-finite vertices are rejected by `build`, the rectangle is computed without them.
        let bbox = BoundingBox::from_points(points.iter().filter(|point| point.is_finite()));
        let rect = bbox.enclosing_rectangle();

        let sw = rect.lower;
        let se = Point::new(rect.upper.x, rect.lower.y);
        let nw = Point::new(rect.lower.x, rect.upper.y);
        let ne = rect.upper;
        points.extend([sw, se, nw, ne]);

        let bottom = Edge::new_unchecked(sw, se);
        let top = Edge::new_unchecked(nw, ne);
        let dag = Dag::new(Trapezoid::new(sw, se, bottom, top));

        Self {
            dag,
            points,
            n_points,
            edges: vec![bottom, top],
            bbox,
            rect,
            config,
            state: BuildState::NotBuilt,
        }
    }

    /// Creates an empty trapezoidal map, made of a single trapezoid: the unit square.
    pub fn empty() -> Self {
        Self::new(Vec::<Point>::new(), BuildConfig::default())
    }

    /// Creates a trapezoidal map for a polygon and inserts all of its edges.
    pub fn from_polygon<I, P>(points: I, config: BuildConfig) -> Result<Self, Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        let mut trap_map = Self::new(points, config);
        trap_map.build()?;
        Ok(trap_map)
    }

    /// Inserts the edges of the polygon, in the order given by the [`Shuffle`] strategy.
    ///
    /// On failure the map becomes [`BuildState::Invalid`]. It stays usable for queries, which are
    /// answered for the edges inserted so far.
    pub fn build(&mut self) -> Result<(), Error> {
        if self.state != BuildState::NotBuilt {
            return Err(Error::AlreadyBuilt(self.state));
        }
        debug!(
            points = self.n_points,
            edges = self.n_points,
            shuffle = %self.config.shuffle,
            "building trapezoidal map"
        );
        match self.insert_polygon() {
            Ok(()) => {
                self.state = BuildState::Built;
                debug!(
                    edges = self.edges.len() - 2,
                    trapezoids = self.trap_count(),
                    nodes = self.dag.count(),
                    "trapezoidal map built"
                );
                Ok(())
            }
            Err(err) => {
                self.state = BuildState::Invalid;
                warn!(%err, "trapezoidal map build aborted");
                Err(err)
            }
        }
    }

    fn insert_polygon(&mut self) -> Result<(), Error> {
        if let Some(point) = self.polygon().iter().find(|point| !point.is_finite()) {
            return Err(Error::NonFinitePoint(*point));
        }
        let polygon_edges = self.polygon_edges()?;
        self.edges.extend(polygon_edges);

        // Mix the edges to get good performance (this is a randomized incremental algorithm after all!)
        // The edges of the rectangle stay at the front, they are already in the map.
        self.config.shuffle.apply(&mut self.edges[2..]);

        for index in 2..self.edges.len() {
            let edge = self.edges[index];
            let crossed = self.add_edge(edge)?;
            trace!(index, %edge, crossed, "inserted edge");
            if self.config.check_invariants {
                self.validate()
                    .map_err(|err| Error::Corrupted(format!("{:#}", err)))?;
            }
        }
        Ok(())
    }

    /// The edges of the polygon, each one knowing on which side the polygon lies.
    fn polygon_edges(&self) -> Result<Vec<Edge>, Error> {
        let polygon = self.polygon();
        if polygon.is_empty() {
            return Ok(Vec::new());
        }

        // We need to determine the orientation of the polygon in order to know if it is above or
        // below each of its edges.
        // To do so, we find the leftmost point (and pick the bottommost one in case of ties),
        // and then determine the sign of the angle at that point.
        // See: https://en.wikipedia.org/wiki/Curve_orientation#Orientation_of_a_simple_polygon
        let orientation = {
            let n = polygon.len();
            let b = polygon
                .iter()
                .position_min_by(|p1, p2| p1.x.total_cmp(&p2.x).then_with(|| p1.y.total_cmp(&p2.y)))
                .unwrap_or(0);
            let a = if b == 0 { n - 1 } else { b - 1 };
            let c = if b == n - 1 { 0 } else { b + 1 };
            let (pa, pb, pc) = (polygon[a], polygon[b], polygon[c]);
            let det = (pb - pa).cross_z(&(pc - pa));
            if det > 0. {
                Orientation::Counterclockwise
            } else {
                Orientation::Clockwise
            }
        };

        polygon
            .iter()
            .circular_tuple_windows()
            .map(|(&start, &end)| {
                let (edge, forward) = if end.is_right_of(&start) {
                    (Edge::new(start, end)?, true)
                } else if start.is_right_of(&end) {
                    (Edge::new(end, start)?, false)
                } else {
                    return Err(Degeneracy::ZeroLengthEdge(start).into());
                };
                // The polygon is on the left of its edges when it winds counterclockwise, which is
                // above the edges that go right
                let above = match orientation {
                    Orientation::Counterclockwise => forward,
                    Orientation::Clockwise => !forward,
                };
                Ok(if above {
                    edge.with_faces(Some(POLYGON_FACE), None)
                } else {
                    edge.with_faces(None, Some(POLYGON_FACE))
                })
            })
            .collect()
    }

    /// Inserts an edge, splitting the trapezoids it crosses. Returns the number of crossed
    /// trapezoids.
    ///
    /// Every degeneracy is detected while looking for the crossed trapezoids, so a failure leaves
    /// the map untouched.
    fn add_edge(&mut self, edge: Edge) -> Result<usize, Error> {
        let trap_ids = self.find_trapezoids_intersecting_edge(&edge)?;
        let trap_count = trap_ids.len();

        let (p, q) = (edge.left, edge.right);
        // Trapezoids replacing the previous old trapezoid
        let mut left_old: Option<NodeId> = None;
        let mut left_below: Option<NodeId> = None;
        let mut left_above: Option<NodeId> = None;

        // Each old trapezoid is replaced by up to 4 new trapezoids:
        // - `left` is the new trapezoid to the left of p, if it exists
        // - `below` is the new trapezoid below the inserted edge
        // - `above` is the new trapezoid above the inserted edge
        // - `right` is the new trapezoid to the right of q, if it exists
        for (i, &old_id) in trap_ids.iter().enumerate() {
            let old = self.dag.trap(old_id)?.clone();
            let start = i == 0;
            let end = i == trap_count - 1;
            let have_left = start && p != old.left;
            let have_right = end && q != old.right;
            let right_point = if end { q } else { old.right };

            let mut left = None;
            let below;
            let above;
            match (left_below, left_above) {
                (Some(prev_below), Some(prev_above)) if !start => {
                    // Extend the trapezoids from the previous step when they are only separated
                    // from the old one by a wall that the edge now blocks
                    if self.dag.trap(prev_below)?.below == old.below {
                        self.dag.trap_mut(prev_below)?.right = right_point;
                        below = prev_below;
                    } else {
                        below = self.dag.add_trap(Trapezoid::new(
                            old.left,
                            right_point,
                            old.below,
                            edge,
                        ));
                        self.dag.set_upper_left(below, Some(prev_below))?;
                        if old.lower_left == left_old {
                            self.dag.set_lower_left(below, Some(prev_below))?;
                        } else {
                            self.dag.set_lower_left(below, old.lower_left)?;
                        }
                    }

                    if self.dag.trap(prev_above)?.above == old.above {
                        self.dag.trap_mut(prev_above)?.right = right_point;
                        above = prev_above;
                    } else {
                        above = self.dag.add_trap(Trapezoid::new(
                            old.left,
                            right_point,
                            edge,
                            old.above,
                        ));
                        self.dag.set_lower_left(above, Some(prev_above))?;
                        if old.upper_left == left_old {
                            self.dag.set_upper_left(above, Some(prev_above))?;
                        } else {
                            self.dag.set_upper_left(above, old.upper_left)?;
                        }
                    }
                }
                _ => {
                    if !start {
                        return Err(Error::Corrupted(format!(
                            "no trapezoids to the left of {} while inserting {}",
                            old_id, edge
                        )));
                    }
                    below = self
                        .dag
                        .add_trap(Trapezoid::new(p, right_point, old.below, edge));
                    above = self
                        .dag
                        .add_trap(Trapezoid::new(p, right_point, edge, old.above));
                    if have_left {
                        let left_id = self.dag.add_trap(Trapezoid::new(
                            old.left,
                            p,
                            old.below,
                            old.above,
                        ));
                        self.dag.set_lower_left(left_id, old.lower_left)?;
                        self.dag.set_upper_left(left_id, old.upper_left)?;
                        self.dag.set_lower_right(left_id, Some(below))?;
                        self.dag.set_upper_right(left_id, Some(above))?;
                        left = Some(left_id);
                    } else {
                        self.dag.set_lower_left(below, old.lower_left)?;
                        self.dag.set_upper_left(above, old.upper_left)?;
                    }
                }
            }

            let right = if have_right {
                let right_id = self.dag.add_trap(Trapezoid::new(
                    q,
                    old.right,
                    old.below,
                    old.above,
                ));
                self.dag.set_lower_right(right_id, old.lower_right)?;
                self.dag.set_upper_right(right_id, old.upper_right)?;
                self.dag.set_lower_right(below, Some(right_id))?;
                self.dag.set_upper_right(above, Some(right_id))?;
                Some(right_id)
            } else {
                self.dag.set_lower_right(below, old.lower_right)?;
                self.dag.set_upper_right(above, old.upper_right)?;
                None
            };

            // Build the sub-graph replacing the old trapezoid-node. Extended trapezoids already
            // have a node, which becomes shared.
            let mut top = self.dag.add(NodeKind::Y { edge, below, above })?;
            if let Some(right) = right {
                top = self.dag.add(NodeKind::X {
                    point: q,
                    left: top,
                    right,
                })?;
            }
            if let Some(left) = left {
                top = self.dag.add(NodeKind::X {
                    point: p,
                    left,
                    right: top,
                })?;
            }

            if old_id == self.dag.root() {
                self.dag.set_root(top)?;
            } else {
                self.dag.replace_with(old_id, top)?;
            }

            left_old = Some(old_id);
            left_below = Some(below);
            left_above = Some(above);
        }

        // The old trapezoid-nodes have no parents left. They are released last so that their ids
        // are not recycled while the neighbours are being connected.
        for old_id in trap_ids {
            self.dag.release(old_id)?;
        }

        Ok(trap_count)
    }

    /// Finds the trapezoids crossed by an edge, from left to right.
    pub fn find_trapezoids_intersecting_edge(&self, edge: &Edge) -> Result<Vec<NodeId>, Error> {
        let mut id = self.dag.search_edge(edge)?;
        let mut trap_ids = vec![id];
        loop {
            let trap = self.dag.trap(id)?;
            if !edge.right.is_right_of(&trap.right) {
                break;
            }
            id = match edge.point_orientation(&trap.right) {
                Positioning::Left => trap.lower_right.ok_or(Degeneracy::MissingNeighbor {
                    side: "lower right",
                    point: trap.right,
                })?,
                Positioning::Right => trap.upper_right.ok_or(Degeneracy::MissingNeighbor {
                    side: "upper right",
                    point: trap.right,
                })?,
                Positioning::On => {
                    return Err(Degeneracy::PointOnEdge {
                        point: trap.right,
                        edge: *edge,
                    }
                    .into())
                }
            };
            trap_ids.push(id);
        }
        Ok(trap_ids)
    }

    /// Finds the node where the search for `point` stops.
    ///
    /// This is a trapezoid-node, unless `point` is a vertex (x-node) or lies on an edge (y-node).
    /// Points with a NaN or infinite coordinate cannot be located.
    pub fn locate_node(&self, point: &Point) -> Result<NodeId, Error> {
        if !point.is_finite() {
            return Err(Error::NonFinitePoint(*point));
        }
        self.dag.search_point(&point.normalized())
    }

    /// Locates a point in the map.
    pub fn locate(&self, point: &Point) -> Result<Location<'_>, Error> {
        let id = self.locate_node(point)?;
        Ok(match &self.dag.node(id)?.kind {
            NodeKind::X { point, .. } => Location::Vertex(*point),
            NodeKind::Y { edge, .. } => Location::Edge(*edge),
            NodeKind::Trap(trap) => Location::Trapezoid(trap),
        })
    }

    /// The vertices of the polygon followed by the 4 corners of the enclosing rectangle, in the
    /// order: south-west, south-east, north-west, north-east.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The vertices of the polygon.
    pub fn polygon(&self) -> &[Point] {
        &self.points[..self.n_points]
    }

    /// The bottom and top edges of the enclosing rectangle followed by the edges of the polygon,
    /// in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The extent of the polygon.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// The rectangle covered by the map.
    pub fn enclosing_rectangle(&self) -> &BoundingBox {
        &self.rect
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn root(&self) -> NodeId {
        self.dag.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.dag.get(id)
    }

    /// An iterator over the trapezoids of the map.
    pub fn trapezoids(&self) -> impl Iterator<Item = &Trapezoid> {
        self.dag.iter().filter_map(|(_, node)| node.trapezoid())
    }

    /// Returns the number of x-nodes, y-nodes and trapezoid-nodes.
    pub fn node_count(&self) -> (usize, usize, usize) {
        self.dag
            .iter()
            .fold((0, 0, 0), |(x, y, trap), (_, node)| match node.kind {
                NodeKind::X { .. } => (x + 1, y, trap),
                NodeKind::Y { .. } => (x, y + 1, trap),
                NodeKind::Trap(..) => (x, y, trap + 1),
            })
    }

    pub fn x_node_count(&self) -> usize {
        self.node_count().0
    }

    pub fn y_node_count(&self) -> usize {
        self.node_count().1
    }

    pub fn trap_count(&self) -> usize {
        self.node_count().2
    }

    /// Statistics about the shape of the search structure.
    pub fn stats(&self) -> Result<Stats, Error> {
        self.dag.stats()
    }

    /// Textual representation of the search structure, one node per line.
    pub fn dump(&self) -> Result<String, Error> {
        self.dag.dump()
    }

    /// Checks the consistency of the whole map.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.dag.validate()?;

        for edge in &self.edges {
            ensure!(
                edge.right.is_right_of(&edge.left),
                "Edge {} is not ordered",
                edge
            );
        }

        // The trapezoids must tile the enclosing rectangle
        let size = self.rect.upper - self.rect.lower;
        let expected = size.x * size.y;
        let area = self
            .trapezoids()
            .map(Trapezoid::area)
            .sum::<Result<f64, Error>>()?;
        ensure!(
            (area - expected).abs() <= 1e-9 * expected.max(1.),
            "Trapezoids cover an area of {} instead of {}",
            area,
            expected
        );

        Ok(())
    }
}

impl PartialEq for TrapezoidalMap {
    fn eq(&self, other: &Self) -> bool {
        self.dag.structurally_eq(&other.dag)
    }
}

impl PointLocator for TrapezoidalMap {
    fn locate_one(&self, point: &[f64; 2]) -> Option<usize> {
        match self.locate(&Point::from(point)).ok()? {
            Location::Trapezoid(trap) => trap.below.face_above,
            Location::Vertex(_) => Some(POLYGON_FACE),
            Location::Edge(edge) => edge.face_above.or(edge.face_below),
        }
    }
}
