#[cfg(test)]
use itertools::Itertools;
use std::{
    fmt::Display,
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
};

/// A point of the 2D plane.
///
/// Points are plain values: two points are the same point when their coordinates are equal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if `self` comes after `other` in the left-to-right order of the plane.
    ///
    /// Points are compared by `x` first, and ties are broken with `y`, so that a point directly
    /// above another one is "to the right" of it. This is the single total order used for every
    /// left/right decision of the trapezoidal map.
    pub fn is_right_of(&self, other: &Point) -> bool {
        if self.x == other.x {
            self.y > other.y
        } else {
            self.x > other.x
        }
    }

    /// The z-component of the cross product of `self` and `other` seen as vectors.
    pub fn cross_z(&self, other: &Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Replaces negative zeros with positive ones so that the left-to-right order stays
    /// consistent with `==`.
    pub(crate) fn normalized(self) -> Self {
        Self {
            x: if self.x == 0. { 0. } else { self.x },
            y: if self.y == 0. { 0. } else { self.y },
        }
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
impl Point {
    /// Computes the winding number of a polygon around the point.
    ///
    /// It is `0` if the point is outside of the polygon. For more information, see
    /// <https://web.archive.org/web/20130126163405/http://geomalgorithms.com/a03-_inclusion.html>.
    pub(crate) fn winding_number(&self, polygon: &[Point]) -> isize {
        polygon
            .iter()
            .circular_tuple_windows()
            .fold(0, |wn, (a, b)| {
                let side = (*b - *a).cross_z(&(*self - *a));
                if a.y <= self.y && b.y > self.y && side > 0. {
                    // an upward crossing
                    wn + 1
                } else if a.y > self.y && b.y <= self.y && side < 0. {
                    // a downward crossing
                    wn - 1
                } else {
                    wn
                }
            })
    }

    pub(crate) fn is_inside(&self, polygon: &[Point]) -> bool {
        self.winding_number(polygon) != 0
    }
}

/// Positioning of a [`Point`] with respect to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    Left,
    On,
    Right,
}

impl Positioning {
    /// The classic sign of the orientation test: `-1` to the left, `0` on the line, `+1` to the
    /// right.
    pub fn sign(self) -> i8 {
        match self {
            Positioning::Left => -1,
            Positioning::On => 0,
            Positioning::Right => 1,
        }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<&Point> for [f64; 2] {
    fn from(val: &Point) -> Self {
        [val.x, val.y]
    }
}

impl From<Point> for [f64; 2] {
    fn from(val: Point) -> Self {
        (&val).into()
    }
}

impl From<&[f64; 2]> for Point {
    fn from(value: &[f64; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Self::from(&value)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn is_right_of_breaks_ties_with_y() {
        let p = Point::new(1., 1.);

        assert!(Point::new(2., 0.).is_right_of(&p));
        assert!(Point::new(1., 2.).is_right_of(&p));
        assert!(!Point::new(1., 0.).is_right_of(&p));
        assert!(!Point::new(0., 5.).is_right_of(&p));
        // Strict order
        assert!(!p.is_right_of(&p));
    }

    #[test]
    fn arithmetic() {
        let mut p = Point::new(1., 2.);
        let q = Point::new(0.5, -1.);

        assert_eq!(p + q, Point::new(1.5, 1.));
        assert_eq!(p - q, Point::new(0.5, 3.));
        assert_eq!(p * 2., Point::new(2., 4.));
        assert_eq!(p.cross_z(&q), -2.);

        p += q;
        assert_eq!(p, Point::new(1.5, 1.));
        p -= q;
        assert_eq!(p, Point::new(1., 2.));
    }

    #[test]
    fn negative_zeros_are_normalized() {
        let p = Point::new(-0., -0.).normalized();

        assert!(p.x.is_sign_positive());
        assert!(p.y.is_sign_positive());
        assert!(!p.is_right_of(&Point::new(0., 0.)));
    }

    #[test]
    fn winding_number_square() {
        //
        //            2
        //
        //     +------6------+
        //     |             |
        //     3      0      5      1
        //     |             |
        //     +------4------+
        //
        let poly = [
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
        ];

        assert_eq!(Point::new(0.5, 0.5).winding_number(&poly), 1);
        assert_eq!(Point::new(1.5, 0.5).winding_number(&poly), 0);
        assert_eq!(Point::new(0.5, 1.5).winding_number(&poly), 0);
        assert_eq!(Point::new(0., 0.5).winding_number(&poly), 1); // Left edges are included
        assert_eq!(Point::new(0.5, 0.).winding_number(&poly), 1); // Bottom edges are included
        assert_eq!(Point::new(1., 0.5).winding_number(&poly), 0); // Right edges are not included
        assert_eq!(Point::new(0.5, 1.).winding_number(&poly), 0); // Top edges are not included
    }

    #[test]
    fn winding_number_clockwise_square() {
        let poly: Vec<Point> = [[0., 0.], [0., 1.], [1., 1.], [1., 0.]]
            .iter()
            .map(Point::from)
            .collect();

        assert_eq!(Point::new(0.5, 0.5).winding_number(&poly), -1);
        assert!(Point::new(0.5, 0.5).is_inside(&poly));
        assert!(!Point::new(2., 0.5).is_inside(&poly));
    }

    #[test]
    fn finite_points() {
        assert!(Point::new(1., -2.).is_finite());
        assert!(!Point::new(f64::NAN, 0.).is_finite());
        assert!(!Point::new(0., f64::INFINITY).is_finite());
    }

    proptest! {
        #[test]
        fn is_right_of_is_a_strict_total_order(
            x1 in -10i32..10, y1 in -10i32..10, x2 in -10i32..10, y2 in -10i32..10
        ) {
            let a = Point::new(x1 as f64, y1 as f64);
            let b = Point::new(x2 as f64, y2 as f64);
            let count = [a.is_right_of(&b), b.is_right_of(&a), a == b]
                .iter()
                .filter(|&&holds| holds)
                .count();
            prop_assert_eq!(count, 1);
        }
    }
}
