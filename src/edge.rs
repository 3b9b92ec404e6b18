use std::fmt::Display;

use crate::error::Error;
use crate::point::{Point, Positioning};

/// An oriented segment between two [`Point`]s.
///
/// The right endpoint is always [right of](Point::is_right_of) the left one, which is checked when
/// the edge is created.
///
/// Edges of a polygon also remember on which side the polygon lies, using face indices like in
/// a mesh: `face_above` is the face found just above the edge, and `face_below` the one just
/// below. Edges of the enclosing rectangle have no faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub(crate) left: Point,
    pub(crate) right: Point,
    pub(crate) face_above: Option<usize>,
    pub(crate) face_below: Option<usize>,
}

impl Edge {
    /// Creates a new edge without faces.
    ///
    /// Fails if `right` is not right of `left`.
    pub fn new(left: Point, right: Point) -> Result<Self, Error> {
        if !right.is_right_of(&left) {
            return Err(Error::UnorderedEndpoints { left, right });
        }
        Ok(Self {
            left,
            right,
            face_above: None,
            face_below: None,
        })
    }

    /// Creates an edge whose endpoints are ordered by construction.
    pub(crate) fn new_unchecked(left: Point, right: Point) -> Self {
        debug_assert!(right.is_right_of(&left));
        Self {
            left,
            right,
            face_above: None,
            face_below: None,
        }
    }

    /// Sets the faces found above and below the edge.
    pub fn with_faces(mut self, face_above: Option<usize>, face_below: Option<usize>) -> Self {
        self.face_above = face_above;
        self.face_below = face_below;
        self
    }

    pub fn left(&self) -> Point {
        self.left
    }

    pub fn right(&self) -> Point {
        self.right
    }

    pub fn face_above(&self) -> Option<usize> {
        self.face_above
    }

    pub fn face_below(&self) -> Option<usize> {
        self.face_below
    }

    /// Returns `true` if `point` is one of the endpoints.
    pub fn has_point(&self, point: &Point) -> bool {
        self.left == *point || self.right == *point
    }

    /// Position of `point` with respect to the edge, seen as a line directed from left to right.
    ///
    /// Since edges always point to the right, [`Positioning::Left`] means the point is above the
    /// edge and [`Positioning::Right`] that it is below.
    pub fn point_orientation(&self, point: &Point) -> Positioning {
        let cross_z = (*point - self.left).cross_z(&(self.right - self.left));
        if cross_z > 0. {
            Positioning::Right
        } else if cross_z < 0. {
            Positioning::Left
        } else {
            Positioning::On
        }
    }

    /// Slope of the edge, which is infinite when the edge is vertical.
    pub fn slope(&self) -> f64 {
        let diff = self.right - self.left;
        diff.y / diff.x
    }

    /// The y-coordinate of the point of the edge with the given x-coordinate.
    ///
    /// Vertical edges yield the y-coordinate of their lowest point. Fails if `x` is outside of the
    /// x-range of the edge.
    pub fn y_at_x(&self, x: f64) -> Result<f64, Error> {
        let Self { left, right, .. } = self;
        if left.x == right.x {
            if x != left.x {
                return Err(Error::OutsideEdge { x, edge: *self });
            }
            return Ok(left.y);
        }
        if x == left.x {
            return Ok(left.y);
        } else if x == right.x {
            return Ok(right.y);
        }
        // Equation of the line: left + lambda * (right - left)
        let lambda = (x - left.x) / (right.x - left.x);
        if !(0. ..=1.).contains(&lambda) {
            return Err(Error::OutsideEdge { x, edge: *self });
        }
        Ok(left.y + lambda * (right.y - left.y))
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.left, self.right)
    }
}
