use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point as PixelPoint;
use serde::{Deserialize, Serialize};

/// A point in floating-point image coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        distance(*self, *other)
    }
}

impl From<PixelPoint<i32>> for Point {
    fn from(p: PixelPoint<i32>) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Index of the smallest value. Ties resolve to the first occurrence; an empty
/// slice yields 0.
pub fn min_index(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value < values[best] {
            best = i;
        }
    }
    best
}

/// Index of the largest value. Ties resolve to the first occurrence; an empty
/// slice yields 0.
pub fn max_index(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// An ordered quadrilateral: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn points(&self) -> [Point; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Length of the bottom and top edges.
    pub fn widths(&self) -> (f32, f32) {
        (
            distance(self.bottom_right, self.bottom_left),
            distance(self.top_right, self.top_left),
        )
    }

    /// Length of the right and left edges.
    pub fn heights(&self) -> (f32, f32) {
        (
            distance(self.top_right, self.bottom_right),
            distance(self.top_left, self.bottom_left),
        )
    }

    /// The longer edge of each opposite pair, as (width, height).
    pub fn output_size(&self) -> (f32, f32) {
        let (width_a, width_b) = self.widths();
        let (height_a, height_b) = self.heights();
        (width_a.max(width_b), height_a.max(height_b))
    }

    pub fn area(&self) -> f32 {
        let pts = self.points();
        let mut twice_area = 0.0f32;
        for i in 0..pts.len() {
            let j = (i + 1) % pts.len();
            twice_area += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
        }
        twice_area.abs() / 2.0
    }

    /// Shift every corner one position: the old top-right becomes the
    /// top-left. Turns a landscape reading of the quad into a portrait one.
    pub fn rotated(&self) -> Self {
        Self::new(self.top_right, self.bottom_right, self.bottom_left, self.top_left)
    }

    /// True when the four corners are exactly `points` in some order.
    pub fn is_permutation_of(&self, points: &[Point; 4]) -> bool {
        let mut used = [false; 4];
        for corner in self.points() {
            match (0..4).find(|&i| !used[i] && points[i] == corner) {
                Some(i) => used[i] = true,
                None => return false,
            }
        }
        true
    }

    pub(crate) fn control_points(&self) -> [(f32, f32); 4] {
        self.points().map(Into::into)
    }
}

/// Area enclosed by a closed polygon (shoelace formula).
pub fn polygon_area(points: &[PixelPoint<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

fn squared_distance(a: PixelPoint<i32>, b: PixelPoint<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

fn farthest_from(points: &[PixelPoint<i32>], origin: PixelPoint<i32>) -> (usize, i64) {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, squared_distance(*p, origin)))
        .fold((0, 0), |best, candidate| if candidate.1 > best.1 { candidate } else { best })
}

/// Douglas–Peucker simplification of a closed polygon.
///
/// The ring is cut at two mutually distant vertices so that neither cut point
/// is an arbitrary mid-edge pixel, then each half is simplified as an open
/// curve. Polygons with fewer than three points are returned unchanged.
pub fn approximate_closed_polygon(
    ring: &[PixelPoint<i32>],
    epsilon: f64,
) -> Vec<PixelPoint<i32>> {
    if ring.len() < 3 || epsilon <= 0.0 {
        return ring.to_vec();
    }

    let (start, _) = farthest_from(ring, ring[0]);
    let rotated: Vec<PixelPoint<i32>> = ring[start..].iter().chain(&ring[..start]).copied().collect();
    let (split, spread) = farthest_from(&rotated, rotated[0]);
    if spread == 0 {
        return vec![rotated[0]];
    }

    let mut closing: Vec<PixelPoint<i32>> = rotated[split..].to_vec();
    closing.push(rotated[0]);

    let mut simplified = approximate_polygon_dp(&rotated[..=split], epsilon, false);
    simplified.pop();
    simplified.extend(approximate_polygon_dp(&closing, epsilon, false));
    simplified.pop();
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(x: i32, y: i32) -> PixelPoint<i32> {
        PixelPoint::new(x, y)
    }

    #[test]
    fn index_selection_prefers_first_occurrence() {
        let values = [3.0, 1.0, 5.0, 1.0, 5.0];
        assert_eq!(min_index(&values), 1);
        assert_eq!(max_index(&values), 2);
        assert_eq!(min_index(&[]), 0);
    }

    #[test]
    fn quad_sizes_use_the_longer_edge() {
        let quad = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(90.0, 50.0),
            Point::new(10.0, 50.0),
        );
        let (width, height) = quad.output_size();
        assert_eq!(width, 100.0);
        assert!((height - 50.99).abs() < 0.01);
    }

    #[test]
    fn quad_area_of_rectangle() {
        let quad = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 5.0),
        );
        assert!((quad.area() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_keeps_the_same_corners() {
        let quad = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 5.0),
        );
        let rotated = quad.rotated();
        assert_eq!(rotated.top_left, quad.top_right);
        assert!(rotated.is_permutation_of(&quad.points()));
    }

    #[test]
    fn permutation_check_rejects_duplicates() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(1.0, 1.0);
        let d = Point::new(0.0, 1.0);
        let collapsed = Quad::new(a, a, c, d);
        assert!(!collapsed.is_permutation_of(&[a, b, c, d]));
    }

    #[test]
    fn polygon_area_of_square() {
        let square = [px(0, 0), px(4, 0), px(4, 4), px(0, 4)];
        assert_eq!(polygon_area(&square), 16.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn closed_approximation_drops_edge_points() {
        // Rectangle outline with extra points along every edge.
        let mut ring = Vec::new();
        for x in 0..=40 {
            ring.push(px(x, 0));
        }
        for y in 1..=20 {
            ring.push(px(40, y));
        }
        for x in (0..40).rev() {
            ring.push(px(x, 20));
        }
        for y in (1..20).rev() {
            ring.push(px(0, y));
        }

        let simplified = approximate_closed_polygon(&ring, 2.0);
        assert_eq!(simplified.len(), 4);
        for corner in [px(0, 0), px(40, 0), px(40, 20), px(0, 20)] {
            assert!(simplified.contains(&corner), "missing corner {:?}", corner);
        }
    }

    #[test]
    fn closed_approximation_of_a_single_point() {
        let ring = vec![px(3, 3); 4];
        assert_eq!(approximate_closed_polygon(&ring, 1.0), vec![px(3, 3)]);
    }
}
