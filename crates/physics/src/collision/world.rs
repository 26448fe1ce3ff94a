//! Collision world holding the static triangles of the level.
//!
//! The world is the triangle supplier for the controller: given a query box
//! around the character it returns the triangles that could touch it. Block
//! geometry is added as boxes and ramps, arbitrary geometry as triangle
//! meshes.

use glam::Vec3;
use parry3d::bounding_volume::{Aabb, BoundingVolume};

use super::triangle::Triangle;

/// Anything that can hand out the triangles overlapping a region.
///
/// The controller treats the returned set as complete and authoritative for
/// the duration of one move.
pub trait TriangleSource {
    /// Append every triangle whose bounds intersect `region` to `out`.
    fn collect_triangles(&self, region: &Aabb, out: &mut Vec<Triangle>);
}

impl TriangleSource for [Triangle] {
    fn collect_triangles(&self, region: &Aabb, out: &mut Vec<Triangle>) {
        out.extend(self.iter().filter(|triangle| triangle.aabb().intersects(region)));
    }
}

impl TriangleSource for Vec<Triangle> {
    fn collect_triangles(&self, region: &Aabb, out: &mut Vec<Triangle>) {
        self.as_slice().collect_triangles(region, out);
    }
}

/// Static triangle soup with cached per-triangle bounds.
///
/// # Thread Safety
///
/// The world is immutable while queried and can be shared across threads for
/// parallel queries from several controllers.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    triangles: Vec<Triangle>,
    bounds: Vec<Aabb>,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single triangle. Degenerate triangles are dropped.
    ///
    /// Returns whether the triangle was added.
    pub fn add_triangle(&mut self, p0: Vec3, p1: Vec3, p2: Vec3) -> bool {
        let triangle = Triangle::new(p0, p1, p2);
        if triangle.is_degenerate() {
            log::debug!("skipping degenerate triangle {p0} {p1} {p2}");
            return false;
        }

        self.bounds.push(triangle.aabb());
        self.triangles.push(triangle);
        true
    }

    /// Add a quad as the two triangles `(a, b, c)` and `(a, c, d)`.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }

    /// Add an indexed triangle mesh.
    ///
    /// Triangles referencing a vertex out of range are skipped.
    ///
    /// # Returns
    ///
    /// The number of triangles added.
    pub fn add_triangle_mesh(&mut self, vertices: &[Vec3], indices: &[[u32; 3]]) -> usize {
        let mut added = 0;

        for &[i0, i1, i2] in indices {
            let corners = (
                vertices.get(i0 as usize),
                vertices.get(i1 as usize),
                vertices.get(i2 as usize),
            );

            match corners {
                (Some(&p0), Some(&p1), Some(&p2)) => {
                    if self.add_triangle(p0, p1, p2) {
                        added += 1;
                    }
                }
                _ => log::debug!("skipping triangle with out-of-range index {i0} {i1} {i2}"),
            }
        }

        added
    }

    /// Add an axis-aligned box (a full block) with outward-facing triangles.
    ///
    /// # Arguments
    ///
    /// * `min` - Lowest corner
    /// * `max` - Highest corner
    pub fn add_box(&mut self, min: Vec3, max: Vec3) {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let v = Vec3::new;

        // Bottom, top
        self.add_quad(v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1), v(x0, y0, z1));
        self.add_quad(v(x0, y1, z0), v(x0, y1, z1), v(x1, y1, z1), v(x1, y1, z0));
        // -X, +X
        self.add_quad(v(x0, y0, z0), v(x0, y0, z1), v(x0, y1, z1), v(x0, y1, z0));
        self.add_quad(v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1), v(x1, y0, z1));
        // -Z, +Z
        self.add_quad(v(x0, y0, z0), v(x0, y1, z0), v(x1, y1, z0), v(x1, y0, z0));
        self.add_quad(v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1), v(x0, y1, z1));
    }

    /// Add a wedge (ramp block) rising along +X.
    ///
    /// The slope runs from `min.y` at `x = min.x` up to `max.y` at `x = max.x`.
    pub fn add_ramp(&mut self, min: Vec3, max: Vec3) {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let v = Vec3::new;

        // Slope, bottom, tall back face
        self.add_quad(v(x0, y0, z0), v(x0, y0, z1), v(x1, y1, z1), v(x1, y1, z0));
        self.add_quad(v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1), v(x0, y0, z1));
        self.add_quad(v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1), v(x1, y0, z1));
        // Side wedges
        self.add_triangle(v(x0, y0, z0), v(x1, y1, z0), v(x1, y0, z0));
        self.add_triangle(v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1));
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.bounds.clear();
    }

    /// Number of triangles in the world.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// All triangles in insertion order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangles overlapping `region`, as a fresh vector.
    pub fn query(&self, region: &Aabb) -> Vec<Triangle> {
        let mut out = Vec::new();
        self.collect_triangles(region, &mut out);
        out
    }
}

impl TriangleSource for CollisionWorld {
    fn collect_triangles(&self, region: &Aabb, out: &mut Vec<Triangle>) {
        out.extend(
            self.triangles
                .iter()
                .zip(&self.bounds)
                .filter(|(_, bounds)| bounds.intersects(region))
                .map(|(triangle, _)| *triangle),
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
