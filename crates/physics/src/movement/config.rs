//! Controller configuration.
//!
//! All tunables are grouped here for easy tuning. Values use metric units
//! (meters, seconds, radians) and default to the platformer feel of the
//! block world.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::Capsule;

/// Slack applied when comparing a normal against the maximum slope, so a
/// surface tilted exactly at the limit still counts as walkable.
const SLOPE_EPSILON: f32 = 1e-5;

/// Errors reported when a configuration cannot drive a controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("capsule radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("capsule height {height} must exceed twice the radius {radius}")]
    DegenerateCapsule { radius: f32, height: f32 },

    #[error("up vector must be unit length, got {0}")]
    NonUnitUp(Vec3),

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("max velocity must be positive, got {0}")]
    NonPositiveMaxVelocity(f32),

    #[error("max slope angle must lie within [0, pi/2], got {0}")]
    SlopeOutOfRange(f32),
}

/// Configuration for the kinematic controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // ========================================================================
    // Capsule
    // ========================================================================
    /// Capsule radius (meters).
    pub radius: f32,

    /// Capsule total height (meters). Must exceed `2 * radius`.
    pub height: f32,

    /// Unit up axis. Gravity pulls along `-up`.
    pub up: Vec3,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration (meters/second²). Zero switches to fly mode.
    pub gravity: f32,

    /// Speed cap for both the fall speed and the per-tick motion (meters/second).
    pub max_velocity: f32,

    // ========================================================================
    // Slopes and Steps
    // ========================================================================
    /// Steepest walkable surface, measured from `up` (radians).
    pub max_slope_angle: f32,

    /// Tallest ledge the character steps onto without jumping (meters).
    pub step_height: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Penetration tolerated before a contact blocks motion (meters).
    pub allowed_penetration: f32,

    /// Extra padding around the capsule when querying triangles (meters).
    pub query_margin: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            radius: 0.25,
            height: 0.8,
            up: Vec3::Y,

            gravity: 9.0,
            max_velocity: 10.0,

            max_slope_angle: std::f32::consts::FRAC_PI_2 * 0.55, // ~49.5 degrees
            step_height: 0.6,

            allowed_penetration: 0.01,
            query_margin: 0.5,
        }
    }
}

impl ControllerConfig {
    /// Tuning used by the block level demo: slightly lower steps, faster falls.
    pub fn platformer() -> Self {
        Self {
            step_height: 0.55,
            max_velocity: 20.0,
            ..Default::default()
        }
    }

    /// The capsule described by this configuration.
    pub fn capsule(&self) -> Capsule {
        Capsule::new(self.radius, self.height, self.up)
    }

    /// Cosine of the maximum slope angle, the smallest walkable `up · normal`.
    #[inline]
    pub fn min_ground_normal(&self) -> f32 {
        self.max_slope_angle.cos()
    }

    /// Whether a surface with this normal is walkable.
    #[inline]
    pub fn is_allowed_slope(&self, normal: Vec3) -> bool {
        self.up.dot(normal) >= self.min_ground_normal() - SLOPE_EPSILON
    }

    /// Check that the configuration can drive a controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        if !(self.height > 2.0 * self.radius) {
            return Err(ConfigError::DegenerateCapsule {
                radius: self.radius,
                height: self.height,
            });
        }
        if (self.up.length() - 1.0).abs() > 1e-4 {
            return Err(ConfigError::NonUnitUp(self.up));
        }
        if !(0.0..=std::f32::consts::FRAC_PI_2).contains(&self.max_slope_angle) {
            return Err(ConfigError::SlopeOutOfRange(self.max_slope_angle));
        }
        if !(self.max_velocity > 0.0) {
            return Err(ConfigError::NonPositiveMaxVelocity(self.max_velocity));
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("step height", self.step_height),
            ("allowed penetration", self.allowed_penetration),
            ("query margin", self.query_margin),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        Ok(())
    }
}
