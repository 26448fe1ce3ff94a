//! Kinematic character controller.
//!
//! This is the main entry point for character movement. Each tick it takes a
//! desired velocity and a jump request, integrates gravity, and resolves the
//! resulting motion against the triangles near the character.

use glam::Vec3;
use parry3d::bounding_volume::Aabb;

use crate::collision::{aabb_from_min_max, collect_contacts, Capsule, Contact, Plane, Triangle, TriangleSource};

use super::config::{ConfigError, ControllerConfig};
use super::slide_move::STEP_DOWN_REACH;

/// Kinematic capsule controller.
///
/// Handles:
/// - Gravity and jump integration
/// - Sliding along walls and slopes
/// - Stepping up ledges and down stairs
/// - Ground contact tracking
///
/// Only `prev_position` survives between ticks as authoritative state; the
/// working positions and flags are recomputed by every [`update`] call. Triangles
/// are borrowed per call and never retained.
///
/// The controller does not sub-step. Fast vertical motion can tunnel through
/// thin geometry, so callers falling quickly should run several updates with a
/// fractional time step (see [`step_substepped`]).
///
/// # Example
///
/// ```ignore
/// let mut controller = KinematicController::new(ControllerConfig::default())?;
/// controller.teleport(spawn_position);
///
/// // Each tick:
/// controller.step(&world, desired_velocity, jump_speed, delta_time);
/// ```
///
/// [`update`]: KinematicController::update
/// [`step_substepped`]: KinematicController::step_substepped
#[derive(Debug, Clone)]
pub struct KinematicController {
    pub(super) config: ControllerConfig,
    pub(super) capsule: Capsule,

    /// Last committed position.
    pub(super) prev_position: Vec3,
    /// Working candidate during one update.
    pub(super) test_position: Vec3,
    /// Result of the last update, pending commit.
    pub(super) next_position: Vec3,

    pub(super) had_ground_contact: bool,
    pub(super) is_stepping_up: bool,
    pub(super) is_stepping_down: bool,
    pub(super) is_climbing: bool,

    /// Carried jump velocity (along up).
    pub(super) jump_velocity: Vec3,
    /// Accumulated gravity velocity (along -up).
    pub(super) gravity_velocity: Vec3,

    pub(super) contacts: Vec<Contact>,
    pub(super) ground_contacts: Vec<Contact>,

    // Scratch buffers reused across calls
    pub(super) bounds: Vec<Plane>,
    pub(super) probe_contacts: Vec<Contact>,
    triangles: Vec<Triangle>,
}

impl KinematicController {
    /// Create a controller at the origin with the given configuration.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Create a controller with default configuration.
    pub fn with_default_config() -> Self {
        Self::from_valid_config(ControllerConfig::default())
    }

    fn from_valid_config(config: ControllerConfig) -> Self {
        Self {
            capsule: config.capsule(),
            config,
            prev_position: Vec3::ZERO,
            test_position: Vec3::ZERO,
            next_position: Vec3::ZERO,
            had_ground_contact: false,
            is_stepping_up: false,
            is_stepping_down: false,
            is_climbing: false,
            jump_velocity: Vec3::ZERO,
            gravity_velocity: Vec3::ZERO,
            contacts: Vec::new(),
            ground_contacts: Vec::new(),
            bounds: Vec::new(),
            probe_contacts: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Place the controller at `position` and forget all motion state.
    ///
    /// Used at spawn and when respawning after falling out of the world.
    pub fn teleport(&mut self, position: Vec3) {
        self.prev_position = position;
        self.test_position = position;
        self.next_position = position;

        self.had_ground_contact = false;
        self.is_stepping_up = false;
        self.is_stepping_down = false;
        self.jump_velocity = Vec3::ZERO;
        self.gravity_velocity = Vec3::ZERO;

        self.contacts.clear();
        self.ground_contacts.clear();
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Current configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replace the configuration. The capsule follows the new dimensions.
    pub fn set_config(&mut self, config: ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.capsule = config.capsule();
        self.config = config;
        Ok(())
    }

    /// Change gravity between ticks. Zero switches to fly mode.
    pub fn set_gravity(&mut self, gravity: f32) {
        self.config.gravity = gravity.max(0.0);
    }

    /// Change the step height between ticks.
    pub fn set_step_height(&mut self, step_height: f32) {
        self.config.step_height = step_height.max(0.0);
    }

    /// Mark the character as climbing (ladders, vines).
    ///
    /// A climbing character is supported like a grounded one while it is not
    /// moving upward, and never snaps down to the ground.
    pub fn set_climbing(&mut self, climbing: bool) {
        self.is_climbing = climbing;
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Advance the controller by one tick.
    ///
    /// # Arguments
    ///
    /// * `triangles` - Every triangle that may touch the capsule this tick
    /// * `desired_velocity` - Intended velocity (meters/second)
    /// * `jump_speed` - Upward launch speed, zero when not jumping
    /// * `delta_time` - Time step in seconds
    pub fn update(&mut self, triangles: &[Triangle], desired_velocity: Vec3, jump_speed: f32, delta_time: f32) {
        let up = self.config.up;
        let mut target_motion = desired_velocity * delta_time;

        if self.config.gravity == 0.0 {
            self.fly(triangles, target_motion);
            self.prev_position = self.next_position;
            return;
        }

        let climbing = self.is_climbing && up.dot(self.jump_velocity + self.gravity_velocity) <= 0.0;
        let airborne = !self.had_ground_contact && !climbing && !self.is_stepping_up;

        if !airborne {
            // Supported: leaving the ground is just starting with jump speed
            self.gravity_velocity = Vec3::ZERO;
            self.jump_velocity = up * jump_speed;
            target_motion += self.jump_velocity * delta_time;
        } else {
            target_motion -= up * up.dot(target_motion);

            let carried = up.dot(self.jump_velocity).max(jump_speed);
            self.jump_velocity = up * carried;
            target_motion += self.jump_velocity * delta_time;

            if jump_speed > 0.0 {
                self.gravity_velocity = Vec3::ZERO;
            } else {
                // v' = v + g∙t, s' = s + 1/2∙(v' + v)∙t
                let last_gravity = self.gravity_velocity;
                self.gravity_velocity -= up * (self.config.gravity * delta_time);
                self.gravity_velocity = self.gravity_velocity.clamp_length_max(self.config.max_velocity);
                target_motion += (self.gravity_velocity + last_gravity) * (0.5 * delta_time);
            }
        }

        target_motion = target_motion.clamp_length_max(self.config.max_velocity * delta_time);

        self.test_position = self.prev_position;
        self.update_contacts(triangles);

        let stop_at_obstacle = self.had_ground_contact || self.is_stepping_up;
        self.is_stepping_up = false;

        let blocked = !self.slide(triangles, target_motion, stop_at_obstacle);

        if blocked {
            self.test_position = self.prev_position;

            self.is_stepping_up = jump_speed == 0.0 && self.step_up(triangles, target_motion);
            if !self.is_stepping_up && !self.slide(triangles, target_motion, false) {
                log::debug!("update: slide failed, holding {}", self.test_position);
            }
        }

        let jumping = self.jump_velocity != Vec3::ZERO || jump_speed > 0.0;
        let grounded = self.had_ground_contact || self.is_stepping_down;

        if !self.is_stepping_up && grounded && !jumping && !self.is_climbing {
            let reach = self.config.step_height * STEP_DOWN_REACH;
            self.is_stepping_down = self.step_down(triangles, !self.is_stepping_down, reach);
        } else {
            self.is_stepping_down = false;
        }

        self.update_contacts(triangles);
        self.had_ground_contact = self.has_ground_contact();

        // Pushed upward by geometry (stairs, ramps): don't carry gravity over
        let actual_motion = self.test_position - self.prev_position;
        if !jumping && up.dot(actual_motion) > 0.0 {
            self.gravity_velocity = Vec3::ZERO;
        }

        self.next_position = self.test_position;
        self.prev_position = self.next_position;
    }

    /// Query `source` around the character and advance one tick.
    pub fn step<S: TriangleSource + ?Sized>(
        &mut self,
        source: &S,
        desired_velocity: Vec3,
        jump_speed: f32,
        delta_time: f32,
    ) {
        let region = self.query_bounds();

        let mut triangles = std::mem::take(&mut self.triangles);
        triangles.clear();
        source.collect_triangles(&region, &mut triangles);

        self.update(&triangles, desired_velocity, jump_speed, delta_time);
        self.triangles = triangles;
    }

    /// Advance one frame split into [`recommended_substeps`] ticks.
    ///
    /// # Returns
    ///
    /// The number of sub-steps taken.
    ///
    /// [`recommended_substeps`]: KinematicController::recommended_substeps
    pub fn step_substepped<S: TriangleSource + ?Sized>(
        &mut self,
        source: &S,
        desired_velocity: Vec3,
        jump_speed: f32,
        delta_time: f32,
    ) -> u32 {
        let substeps = self.recommended_substeps();
        let sub_delta = delta_time / substeps as f32;

        for _ in 0..substeps {
            self.step(source, desired_velocity, jump_speed, sub_delta);
        }

        substeps
    }

    /// Sub-steps per frame needed to keep a fall from skipping over floors.
    ///
    /// Three at rest, plus one per meter/second of fall speed.
    pub fn recommended_substeps(&self) -> u32 {
        let fall_speed = (-self.config.up.dot(self.gravity_velocity)).max(0.0);
        3 + fall_speed.ceil() as u32
    }

    /// Box around the last committed position to fetch triangles from.
    ///
    /// Padded by the step height (step-up probes reach that far) plus the
    /// configured query margin, which must cover the motion of one tick.
    pub fn query_bounds(&self) -> Aabb {
        let (min, max) = self.capsule.bounding_box(self.prev_position);
        let padding = Vec3::splat(self.config.step_height + self.config.query_margin);
        aabb_from_min_max(min - padding, max + padding)
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    /// Recompute contacts at the working position.
    pub(super) fn update_contacts(&mut self, triangles: &[Triangle]) {
        collect_contacts(&self.capsule, self.test_position, triangles, &mut self.contacts);
    }

    /// Whether any current contact forbids `motion`.
    pub(super) fn has_forbidden_contact(&self, motion: Vec3) -> bool {
        let tolerance = self.config.allowed_penetration;
        self.contacts
            .iter()
            .any(|contact| is_forbidden(contact, motion, tolerance))
    }

    /// Refresh the ground contact list from the current contacts.
    pub(super) fn has_ground_contact(&mut self) -> bool {
        self.ground_contacts.clear();
        let config = &self.config;
        self.ground_contacts
            .extend(self.contacts.iter().filter(|contact| config.is_allowed_slope(contact.normal)));
        !self.ground_contacts.is_empty()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Committed position (centre of the lower cap).
    pub fn position(&self) -> Vec3 {
        self.prev_position
    }

    /// Position chosen by the last update or fly pass.
    ///
    /// Equals [`position`](Self::position) once the update has committed it;
    /// only differs while a tick is in progress.
    pub fn next_position(&self) -> Vec3 {
        self.next_position
    }

    /// The collision capsule.
    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    /// Whether the character stood on walkable ground after the last update.
    pub fn had_ground_contact(&self) -> bool {
        self.had_ground_contact
    }

    /// Whether the last update climbed a ledge.
    pub fn is_stepping_up(&self) -> bool {
        self.is_stepping_up
    }

    /// Whether the last update snapped down onto lower ground.
    pub fn is_stepping_down(&self) -> bool {
        self.is_stepping_down
    }

    /// Whether the character is marked as climbing.
    pub fn is_climbing(&self) -> bool {
        self.is_climbing
    }

    /// Neither grounded, climbing nor mid step-up.
    pub fn is_airborne(&self) -> bool {
        !self.had_ground_contact && !self.is_climbing && !self.is_stepping_up
    }

    /// Contacts at the committed position, for debug drawing.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Walkable contacts at the committed position.
    pub fn ground_contacts(&self) -> &[Contact] {
        &self.ground_contacts
    }

    /// Carried jump velocity.
    pub fn jump_velocity(&self) -> Vec3 {
        self.jump_velocity
    }

    /// Accumulated gravity velocity.
    pub fn gravity_velocity(&self) -> Vec3 {
        self.gravity_velocity
    }

    /// Signed speed along up from jump and gravity combined.
    pub fn vertical_speed(&self) -> f32 {
        self.config.up.dot(self.jump_velocity + self.gravity_velocity)
    }

    /// Up direction averaged over the ground contacts, or `up` in the air.
    ///
    /// Cameras use this to lean with sloped ground.
    pub fn ground_up(&self) -> Vec3 {
        let sum: Vec3 = self.ground_contacts.iter().map(|contact| contact.normal).sum();
        sum.try_normalize().unwrap_or(self.config.up)
    }
}

/// A contact blocks motion when it penetrates beyond the tolerance and opposes
/// the motion. Without motion every over-tolerance contact blocks.
pub(super) fn is_forbidden(contact: &Contact, motion: Vec3, tolerance: f32) -> bool {
    let stationary = motion == Vec3::ZERO;
    let opposing = stationary || motion.dot(contact.normal) < 0.0;
    contact.penetration > tolerance && opposing
}

// ============================================================================
// Tests
// ============================================================================
