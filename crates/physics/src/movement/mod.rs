//! Character movement for the block world.
//!
//! This module implements a kinematic capsule controller with:
//!
//! - Gravity and jump integration along a configurable up axis
//! - Iterative plane-constrained sliding
//! - Stepping up ledges and down stairs
//! - Walkable slope classification
//! - A free-fly mode when gravity is zero
//!
//! # Design
//!
//! Movement is driven by [`KinematicController::update`], which takes the
//! desired velocity for one tick and resolves it against a borrowed triangle
//! set. Contacts found at a candidate position are turned into bounds (planes)
//! by [`add_contact_bounds`] and the solvers push the candidate in front of
//! them.
//!
//! All movement is deterministic: the same position, inputs and triangles
//! always produce the same result.

mod bounds;
mod config;
mod controller;
mod slide_move;

pub use bounds::{add_contact_bounds, contact_bound};
pub use config::{ConfigError, ControllerConfig};
pub use controller::KinematicController;
