//! Closest-point queries between points, segments and triangles.
//!
//! Pure functions with no state. The capsule is reduced to its axis segment
//! everywhere in this crate, so the segment/triangle query is the one the
//! contact generator leans on.

use glam::Vec3;

use super::triangle::Triangle;

/// Closest point on the segment `[a, b]` to `point`.
///
/// A zero-length segment returns `a`.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return a;
    }

    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether `point` lies inside the triangle's prism.
///
/// Uses the same-side test: the point must be on the inner side of all three
/// edges with respect to the face normal. Points on an edge count as inside.
/// Degenerate triangles contain nothing.
pub fn point_in_triangle(triangle: &Triangle, point: Vec3) -> bool {
    if triangle.is_degenerate() {
        return false;
    }

    let normal = triangle.normal();
    triangle
        .edges()
        .iter()
        .all(|&(start, end)| (end - start).cross(point - start).dot(normal) >= 0.0)
}

/// Closest point on the triangle to `point`.
///
/// Projects onto the plane and keeps the projection when it falls inside.
/// Otherwise the closest edge point wins; on an exact tie the edge listed
/// first (`p0p1`, `p1p2`, `p2p0`) is kept.
pub fn closest_point_on_triangle(triangle: &Triangle, point: Vec3) -> Vec3 {
    let projected = triangle.plane().project_point(point);
    if point_in_triangle(triangle, projected) {
        return projected;
    }

    let mut closest = Vec3::ZERO;
    let mut closest_distance = f32::INFINITY;

    for (start, end) in triangle.edges() {
        let candidate = closest_point_on_segment(start, end, point);
        let distance = candidate.distance_squared(point);
        if distance < closest_distance {
            closest = candidate;
            closest_distance = distance;
        }
    }

    closest
}

/// Approximate point on the segment `[a, b]` closest to the triangle.
///
/// Intersects the segment's line with the triangle plane, clamps the
/// intersection onto the triangle, then clamps that back onto the segment.
/// This is not an exact segment/triangle distance; the solver iterates over
/// the residual. A segment parallel to the plane returns `a`.
pub fn closest_point_between_segment_and_triangle(triangle: &Triangle, a: Vec3, b: Vec3) -> Vec3 {
    let direction = (b - a).normalize_or_zero();
    let alignment = triangle.normal().dot(direction);

    if alignment.abs() <= f32::EPSILON {
        return a;
    }

    let t = -triangle.plane().signed_distance(a) / alignment;
    let intersection = a + direction * t;

    let on_triangle = closest_point_on_triangle(triangle, intersection);
    closest_point_on_segment(a, b, on_triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        // Lies in y=0, normal +Y
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        )
    }

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);

        assert_eq!(closest_point_on_segment(a, b, Vec3::new(1.0, 5.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(-3.0, 1.0, 0.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(9.0, 0.0, 1.0)), b);
    }

    #[test]
    fn test_closest_point_on_degenerate_segment() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(closest_point_on_segment(a, a, Vec3::ZERO), a);
    }

    #[test]
    fn test_point_in_triangle() {
        let triangle = unit_triangle();
        assert!(point_in_triangle(&triangle, Vec3::new(0.25, 0.0, 0.25)));
        assert!(point_in_triangle(&triangle, Vec3::new(0.5, 0.0, 0.0)));
        assert!(!point_in_triangle(&triangle, Vec3::new(0.75, 0.0, 0.75)));
        assert!(!point_in_triangle(&triangle, Vec3::new(-0.1, 0.0, 0.5)));
    }

    #[test]
    fn test_closest_point_on_triangle_interior() {
        let triangle = unit_triangle();
        let closest = closest_point_on_triangle(&triangle, Vec3::new(0.2, 3.0, 0.3));
        assert!(approx_eq(closest, Vec3::new(0.2, 0.0, 0.3)));
    }

    #[test]
    fn test_closest_point_on_triangle_edge_and_vertex() {
        let triangle = unit_triangle();

        // Beyond the hypotenuse
        let closest = closest_point_on_triangle(&triangle, Vec3::new(1.0, 1.0, 1.0));
        assert!(approx_eq(closest, Vec3::new(0.5, 0.0, 0.5)));

        // Beyond the p2 corner
        let closest = closest_point_on_triangle(&triangle, Vec3::new(2.0, -1.0, -1.0));
        assert!(approx_eq(closest, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_segment_triangle_crossing() {
        let triangle = unit_triangle();
        let a = Vec3::new(0.25, -0.5, 0.25);
        let b = Vec3::new(0.25, 0.5, 0.25);

        let closest = closest_point_between_segment_and_triangle(&triangle, a, b);
        assert!(approx_eq(closest, Vec3::new(0.25, 0.0, 0.25)));
    }

    #[test]
    fn test_segment_triangle_above_clamps_to_segment() {
        let triangle = unit_triangle();
        let a = Vec3::new(0.25, 0.3, 0.25);
        let b = Vec3::new(0.25, 0.9, 0.25);

        // The plane intersection is below the segment, so the lower end wins
        let closest = closest_point_between_segment_and_triangle(&triangle, a, b);
        assert!(approx_eq(closest, a));
    }

    #[test]
    fn test_segment_parallel_to_triangle_returns_start() {
        let triangle = unit_triangle();
        let a = Vec3::new(0.0, 1.0, 0.0);
        let b = Vec3::new(1.0, 1.0, 0.0);

        assert_eq!(closest_point_between_segment_and_triangle(&triangle, a, b), a);
    }
}
