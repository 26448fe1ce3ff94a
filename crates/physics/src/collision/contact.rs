//! Capsule shape and capsule/triangle contact generation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::query::{closest_point_between_segment_and_triangle, closest_point_on_triangle};
use super::triangle::Triangle;

/// A capsule standing along an up axis.
///
/// The controller position is the centre of the lower cap (`A`). The collision
/// shape is the axis segment `[A, B]` inflated by `radius`, where
/// `B = A + up * (height - 2 * radius)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    /// Radius of the caps and the cylinder.
    pub radius: f32,
    /// Total height from the bottom of the lower cap to the top of the upper cap.
    pub height: f32,
    /// Unit axis direction.
    pub up: Vec3,
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            radius: 0.25,
            height: 0.8,
            up: Vec3::Y,
        }
    }
}

impl Capsule {
    /// Create a capsule. Callers must keep `height > 2 * radius`.
    pub fn new(radius: f32, height: f32, up: Vec3) -> Self {
        Self { radius, height, up }
    }

    /// Length of the axis segment between the cap centres.
    #[inline]
    pub fn axis_length(&self) -> f32 {
        self.height - 2.0 * self.radius
    }

    /// Axis segment endpoints for a capsule based at `position`.
    #[inline]
    pub fn segment(&self, position: Vec3) -> (Vec3, Vec3) {
        (position, position + self.up * self.axis_length())
    }

    /// Axis-aligned box enclosing the capsule based at `position`.
    pub fn bounding_box(&self, position: Vec3) -> (Vec3, Vec3) {
        let (a, b) = self.segment(position);
        let extent = Vec3::splat(self.radius);
        (a.min(b) - extent, a.max(b) + extent)
    }
}

/// Overlap between the capsule and one triangle.
///
/// Contacts are derived data: they are recomputed from scratch on every query
/// and hold a copy of the triangle that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// `world_point - axis_point`, pointing from the axis into the surface.
    pub displacement: Vec3,
    /// Unit direction pushing the capsule out of the surface.
    pub normal: Vec3,
    /// How far the surface reaches inside the capsule radius.
    pub penetration: f32,
    /// Closest point on the triangle.
    pub world_point: Vec3,
    /// Closest point on the capsule axis.
    pub axis_point: Vec3,
    /// The triangle touched.
    pub triangle: Triangle,
}

impl Contact {
    /// Build the contact between a capsule axis point and a triangle point.
    ///
    /// Returns `None` when the surface lies outside the radius.
    pub fn between(capsule: &Capsule, axis_point: Vec3, world_point: Vec3, triangle: &Triangle) -> Option<Self> {
        let displacement = world_point - axis_point;
        let penetration = capsule.radius - displacement.length();
        if penetration <= 0.0 {
            return None;
        }

        // Axis touching the surface: fall back to the face normal facing the axis
        let normal = match (-displacement).try_normalize() {
            Some(normal) => normal,
            None => {
                let face = triangle.normal();
                if face.dot(capsule.up) < 0.0 { -face } else { face }
            }
        };

        Some(Self {
            displacement,
            normal,
            penetration,
            world_point,
            axis_point,
            triangle: *triangle,
        })
    }
}

/// Collect every contact between the capsule based at `position` and `triangles`.
///
/// Clears `out` first. This is O(triangles): narrow the set before calling.
pub fn collect_contacts(capsule: &Capsule, position: Vec3, triangles: &[Triangle], out: &mut Vec<Contact>) {
    out.clear();

    let (a, b) = capsule.segment(position);
    for triangle in triangles {
        let center = closest_point_between_segment_and_triangle(triangle, a, b);
        let closest = closest_point_on_triangle(triangle, center);

        if let Some(contact) = Contact::between(capsule, center, closest, triangle) {
            out.push(contact);
        }
    }
}

/// Contacts between the capsule based at `position` and `triangles`.
pub fn generate_contacts(capsule: &Capsule, position: Vec3, triangles: &[Triangle]) -> Vec<Contact> {
    let mut contacts = Vec::new();
    collect_contacts(capsule, position, triangles, &mut contacts);
    contacts
}
