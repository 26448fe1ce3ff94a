//! Collision primitives for the character controller.
//!
//! This module knows about exactly one moving shape (a vertical capsule) and
//! exactly one kind of collider (static triangles).
//!
//! # Key Types
//!
//! - [`Triangle`] / [`Plane`]: static geometry with cached planes
//! - [`Capsule`]: the character shape, reduced to an axis segment
//! - [`Contact`]: one capsule/triangle overlap
//! - [`CollisionWorld`]: triangle supplier answering box queries
//!
//! # Contact Generation
//!
//! For every triangle the capsule axis is intersected with the triangle
//! plane, the intersection is clamped onto the triangle and back onto the
//! axis, and the distance between the two points is compared with the
//! radius. Contacts are never cached; every query starts from scratch.

mod contact;
mod query;
mod triangle;
mod world;

pub use contact::{collect_contacts, generate_contacts, Capsule, Contact};
pub use query::{
    closest_point_between_segment_and_triangle, closest_point_on_segment, closest_point_on_triangle,
    point_in_triangle,
};
pub use triangle::{aabb_from_min_max, Plane, Triangle};
pub use world::{CollisionWorld, TriangleSource};
