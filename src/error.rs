use crate::edge::Edge;
use crate::point::Point;
use crate::trapezoidal_map::BuildState;

/// Errors raised while building or querying a trapezoidal map.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An edge could not be inserted because the input is not a valid subdivision.
    #[error("Triangulation is invalid: {0}")]
    InvalidTriangulation(#[from] Degeneracy),

    /// An edge was created with endpoints in the wrong order.
    #[error("Edge endpoints are not ordered: {right} is not right of {left}")]
    UnorderedEndpoints { left: Point, right: Point },

    /// An edge was evaluated outside of its x-range.
    #[error("x = {x} is outside of edge {edge}")]
    OutsideEdge { x: f64, edge: Edge },

    /// A polygon vertex or a query point has a NaN or infinite coordinate.
    #[error("Point {0} has a non-finite coordinate")]
    NonFinitePoint(Point),

    /// The map cannot be built from its current state.
    #[error("Cannot build a trapezoidal map that is {0}")]
    AlreadyBuilt(BuildState),

    /// The search structure is internally inconsistent.
    #[error("Search structure is corrupted: {0}")]
    Corrupted(String),
}

/// The reason why an edge could not be inserted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Degeneracy {
    #[error("point {point} lies on edge {edge}")]
    PointOnEdge { point: Point, edge: Edge },

    #[error("edges {first} and {second} share an endpoint and have the same slope")]
    CollinearEdges { first: Edge, second: Edge },

    #[error("trapezoid to the {side} of {point} has no neighbour")]
    MissingNeighbor { side: &'static str, point: Point },

    #[error("polygon has a zero-length side at {0}")]
    ZeroLengthEdge(Point),
}
