//! Sketchblocks Physics
//!
//! Kinematic character movement for a block-based world. A capsule is moved
//! through static triangle geometry one tick at a time, sliding along walls,
//! climbing steps and slopes, and reporting whether it stands on the ground.
//!
//! # Architecture
//!
//! The crate is split into two systems:
//!
//! - **Collision**: Geometry queries and capsule/triangle contact generation
//! - **Movement**: Uses contacts to implement the character controller
//!
//! # Design Principles
//!
//! 1. **Never stuck**: Every solver rolls back instead of leaving the capsule inside geometry
//! 2. **Stateless geometry**: Triangles are borrowed per tick, contacts are never cached
//! 3. **Determinism**: Same inputs always produce the same position

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::{Capsule, CollisionWorld, Contact, Plane, Triangle, TriangleSource};
pub use movement::{ConfigError, ControllerConfig, KinematicController};
