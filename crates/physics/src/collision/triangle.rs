//! Planes and triangles, the only collider the controller understands.

use glam::Vec3;
use parry3d::bounding_volume::Aabb;
use parry3d::math::Point;
use serde::{Deserialize, Serialize};

/// An infinite plane in Hessian normal form.
///
/// `distance` is `normal · p` for any point `p` on the plane, so the signed
/// distance of a point is `normal · point - distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Offset along the normal from the origin.
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal and its offset.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Create the plane with the given normal passing through `point`.
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// Signed distance of `point` from the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Orthogonal projection of `point` onto the plane.
    #[inline]
    pub fn project_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }
}

/// A static world-space triangle with its plane cached.
///
/// Triangles are owned by whatever supplies the collision world. The
/// controller copies them into contacts but never keeps a triangle set
/// between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    plane: Plane,
}

impl Triangle {
    /// Build a triangle and cache its plane.
    ///
    /// The normal follows the winding `(p1 - p0) × (p2 - p0)`. A degenerate
    /// triangle gets a zero normal, see [`Triangle::is_degenerate`].
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        Self {
            p0,
            p1,
            p2,
            plane: Plane::from_normal_and_point(normal, p0),
        }
    }

    /// The triangle's supporting plane.
    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Face normal (zero for degenerate triangles).
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.plane.normal
    }

    /// Vertices in winding order.
    #[inline]
    pub fn points(&self) -> [Vec3; 3] {
        [self.p0, self.p1, self.p2]
    }

    /// Edges as `(start, end)` pairs in winding order.
    #[inline]
    pub fn edges(&self) -> [(Vec3, Vec3); 3] {
        [(self.p0, self.p1), (self.p1, self.p2), (self.p2, self.p0)]
    }

    /// Whether the vertices are collinear (or coincident).
    pub fn is_degenerate(&self) -> bool {
        self.plane.normal == Vec3::ZERO
    }

    /// Axis-aligned bounds of the triangle.
    pub fn aabb(&self) -> Aabb {
        let min = self.p0.min(self.p1).min(self.p2);
        let max = self.p0.max(self.p1).max(self.p2);
        aabb_from_min_max(min, max)
    }
}

/// Build a parry bounding box from glam corners.
pub fn aabb_from_min_max(min: Vec3, max: Vec3) -> Aabb {
    Aabb::new(Point::new(min.x, min.y, min.z), Point::new(max.x, max.y, max.z))
}
