//! Separating planes ("bounds") built from contacts.
//!
//! The slide and step solvers never work on contacts directly. Each contact
//! found at a probe position becomes a plane the capsule base must stay in
//! front of; solving the planes one by one moves the capsule out of the
//! geometry.

use glam::Vec3;

use crate::collision::{Contact, Plane};

use super::config::ControllerConfig;

/// The bound a contact imposes when found at `probe`.
///
/// The plane passes through `probe + normal * penetration`, which is where
/// the capsule base would just touch the surface.
pub fn contact_bound(contact: &Contact, probe: Vec3) -> Plane {
    let point = probe + contact.normal * contact.penetration;
    Plane::from_normal_and_point(contact.normal, point)
}

/// Add the bounds for `contacts` found at `probe`.
///
/// Exact duplicates are skipped. Walls (surfaces steeper than the maximum
/// slope) go to the front of the list and walkable slopes to the back; the
/// solvers walk the list in order, and resolving a ramp before a wall can push
/// the capsule back into the wall.
pub fn add_contact_bounds(bounds: &mut Vec<Plane>, contacts: &[Contact], probe: Vec3, config: &ControllerConfig) {
    for contact in contacts {
        let plane = contact_bound(contact, probe);
        if bounds.contains(&plane) {
            continue;
        }

        if config.is_allowed_slope(plane.normal) {
            bounds.push(plane);
        } else {
            bounds.insert(0, plane);
        }
    }
}
