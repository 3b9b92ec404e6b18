use crate::point::Point;

/// The extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub(crate) empty: bool,
    pub(crate) lower: Point,
    pub(crate) upper: Point,
}

impl BoundingBox {
    /// Creates an empty bounding box.
    pub fn new() -> Self {
        Self {
            empty: true,
            lower: Point::new(0., 0.),
            upper: Point::new(0., 0.),
        }
    }

    /// Computes the bounding box of some points.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut bbox = Self::new();
        for point in points {
            bbox.add(point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn lower(&self) -> Point {
        self.lower
    }

    pub fn upper(&self) -> Point {
        self.upper
    }

    /// Grows the bounding box so that it contains `point`.
    pub fn add(&mut self, point: &Point) {
        if self.empty {
            self.empty = false;
            self.lower = *point;
            self.upper = *point;
            return;
        }
        let Point { x, y } = *point;
        if x < self.lower.x {
            self.lower.x = x;
        } else if x > self.upper.x {
            self.upper.x = x;
        }
        if y < self.lower.y {
            self.lower.y = y;
        } else if y > self.upper.y {
            self.upper.y = y;
        }
    }

    /// Moves the lower corner by `-delta` and the upper corner by `+delta`.
    ///
    /// Empty bounding boxes are left untouched.
    pub fn expand(&mut self, delta: Point) {
        if !self.empty {
            self.lower -= delta;
            self.upper += delta;
        }
    }

    /// The rectangle enclosing the points, used as the outer boundary of a trapezoidal map.
    ///
    /// It is made 10% larger than the bounding box in every direction so that input points never
    /// lie on it, and defaults to the unit square when there are no points. A box that is flat
    /// along one axis borrows the margin of the other axis, or a unit margin if it is a single
    /// point, so the rectangle always has a positive area.
    pub(crate) fn enclosing_rectangle(&self) -> Self {
        let mut rect = *self;
        if rect.empty {
            rect.add(&Point::new(0., 0.));
            rect.add(&Point::new(1., 1.));
        } else {
            let small = 0.1;
            let mut delta = (rect.upper - rect.lower) * small;
            let fallback = match delta.x.max(delta.y) {
                margin if margin > 0. => margin,
                _ => 1.,
            };
            if delta.x <= 0. {
                delta.x = fallback;
            }
            if delta.y <= 0. {
                delta.y = fallback;
            }
            rect.expand(delta);
        }
        rect
    }

    /// Returns `true` if `point` lies in the closed box.
    pub fn contains(&self, point: &Point) -> bool {
        !self.empty
            && point.x >= self.lower.x
            && point.x <= self.upper.x
            && point.y >= self.lower.y
            && point.y <= self.upper.y
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_bounding_box() {
        let mut bbox = BoundingBox::new();

        assert!(bbox.is_empty());
        bbox.expand(Point::new(1., 1.));
        assert_eq!(bbox, BoundingBox::default());
        assert!(!bbox.contains(&Point::new(0., 0.)));
    }

    #[test]
    fn add_points() {
        let points: Vec<Point> = [[1., 2.], [-1., 0.5], [3., -2.]]
            .iter()
            .map(Point::from)
            .collect();

        let bbox = BoundingBox::from_points(&points);

        assert!(!bbox.is_empty());
        assert_eq!(bbox.lower(), Point::new(-1., -2.));
        assert_eq!(bbox.upper(), Point::new(3., 2.));
        assert!(points.iter().all(|point| bbox.contains(point)));
    }

    #[test]
    fn single_point() {
        let bbox = BoundingBox::from_points(&[Point::new(1., 2.)]);

        assert_eq!(bbox.lower(), bbox.upper());
    }

    #[test]
    fn enclosing_rectangle_of_unit_square() {
        let points: Vec<Point> = [[0., 0.], [1., 0.], [1., 1.], [0., 1.]]
            .iter()
            .map(Point::from)
            .collect();
        let bbox = BoundingBox::from_points(&points);

        let rect = bbox.enclosing_rectangle();

        assert_eq!(bbox.lower(), Point::new(0., 0.));
        assert_eq!(bbox.upper(), Point::new(1., 1.));
        assert_relative_eq!(rect.lower().x, -0.1);
        assert_relative_eq!(rect.lower().y, -0.1);
        assert_relative_eq!(rect.upper().x, 1.1);
        assert_relative_eq!(rect.upper().y, 1.1);
    }

    #[test]
    fn enclosing_rectangle_of_flat_boxes() {
        let horizontal = BoundingBox::from_points(&[Point::new(0., 0.), Point::new(2., 0.)]);
        let rect = horizontal.enclosing_rectangle();
        assert_relative_eq!(rect.lower().x, -0.2);
        assert_relative_eq!(rect.lower().y, -0.2);
        assert_relative_eq!(rect.upper().y, 0.2);

        let single = BoundingBox::from_points(&[Point::new(1., 1.)]);
        let rect = single.enclosing_rectangle();
        assert_eq!(rect.lower(), Point::new(0., 0.));
        assert_eq!(rect.upper(), Point::new(2., 2.));
    }

    #[test]
    fn enclosing_rectangle_without_points() {
        let rect = BoundingBox::new().enclosing_rectangle();

        assert_eq!(rect.lower(), Point::new(0., 0.));
        assert_eq!(rect.upper(), Point::new(1., 1.));
    }
}
