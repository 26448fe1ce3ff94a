//! Bound solvers behind the controller: slide, step up, step down and fly.
//!
//! All four work the same way. The capsule is placed at a candidate position,
//! the contacts found there become bounds (see [`add_contact_bounds`]), and the
//! candidate is pushed in front of every bound it violates. Contacts are then
//! regenerated at the corrected candidate and the process repeats until no
//! contact blocks the motion or the pass budget runs out.
//!
//! Penetrations are never resolved to zero. A corrected capsule keeps
//! `allowed_penetration * CONTACT_SKIN` of overlap, so resting contacts survive
//! from tick to tick and ground detection does not flicker.
//!
//! [`add_contact_bounds`]: super::bounds::add_contact_bounds

use glam::Vec3;

use crate::collision::{collect_contacts, Triangle};

use super::bounds::add_contact_bounds;
use super::controller::{is_forbidden, KinematicController};

/// Times contacts are regenerated during one slide or fly.
const OUTER_PASSES: usize = 4;

/// Sweeps over the bound list per set of contacts.
const INNER_PASSES: usize = 4;

/// Maximum drop attempts (initial drop plus bisections) in a step down.
const STEP_DOWN_ITERATIONS: usize = 8;

/// Fraction of the step height probed below a walking character.
pub(super) const STEP_DOWN_REACH: f32 = 0.6;

/// Fraction of the allowed penetration left in place after a correction.
const CONTACT_SKIN: f32 = 0.5;

/// Slack for "straight down" and "no drop" comparisons.
const DIRECTION_EPSILON: f32 = 1e-5;

impl KinematicController {
    // ========================================================================
    // Slide
    // ========================================================================

    /// Move from the working position by `target_motion`, sliding along
    /// whatever is in the way.
    ///
    /// Only bounds the accumulated motion runs into are resolved; overlaps the
    /// motion leaves alone make the slide roll back.
    ///
    /// With `stop_at_obstacle`, walls are not slid along: the motion is cut
    /// back along its own direction and the slide reports a block, giving the
    /// caller a chance to step up instead.
    ///
    /// # Returns
    ///
    /// `false` when the motion was blocked. If the capsule could not be freed
    /// at all it is left at the starting position.
    pub(super) fn slide(&mut self, triangles: &[Triangle], target_motion: Vec3, stop_at_obstacle: bool) -> bool {
        let up = self.config.up;
        let tolerance = self.config.allowed_penetration;

        let origin = self.test_position;
        let started_on_ground = self.had_ground_contact;
        let target_direction = target_motion.normalize_or_zero();
        let target_horizontal = (target_motion - up * up.dot(target_motion)).normalize_or_zero();
        let pure_fall = up.dot(target_direction) <= -1.0 + DIRECTION_EPSILON;

        let mut candidate = origin + target_motion;
        let mut blocked = false;

        self.bounds.clear();
        self.test_position = candidate;
        self.update_contacts(triangles);

        for pass in 0..OUTER_PASSES {
            add_contact_bounds(&mut self.bounds, &self.contacts, candidate, &self.config);

            for _ in 0..INNER_PASSES {
                let mut moved = false;

                for i in 0..self.bounds.len() {
                    let plane = self.bounds[i];
                    if plane.normal.dot(candidate - origin) >= 0.0 {
                        continue;
                    }

                    let distance = plane.signed_distance(candidate);
                    if distance + tolerance >= 0.0 {
                        continue;
                    }

                    let depth = distance + tolerance * CONTACT_SKIN;
                    let mut correction = plane.normal * -depth;

                    if !self.config.is_allowed_slope(plane.normal) {
                        let approach = plane.normal.dot(target_direction);

                        if stop_at_obstacle {
                            if approach < 0.0 {
                                correction = target_direction * (-depth / approach);
                                blocked = true;
                            }
                        } else if correction.dot(up) > 0.0 {
                            // Steep surfaces push sideways only, never up
                            let lateral = plane.normal - up * plane.normal.dot(up);
                            if let Some(lateral_direction) = lateral.try_normalize() {
                                correction = lateral_direction * (-depth / plane.normal.dot(lateral_direction));
                            }
                        }
                    }

                    candidate += correction;
                    moved = true;
                }

                if !moved {
                    break;
                }
            }

            let actual_motion = candidate - origin;
            self.test_position = candidate;
            self.update_contacts(triangles);
            log::trace!("slide: pass {pass} at {candidate}, {} bounds", self.bounds.len());

            if started_on_ground && target_horizontal.dot(actual_motion) <= -tolerance {
                // Pushed backwards while walking: treat as blocked
                blocked = true;
                break;
            }

            let solved = !self.has_forbidden_contact(actual_motion);

            if solved && started_on_ground && pure_fall && up.dot(actual_motion) <= 0.0 {
                // Falling straight down onto ground: don't slide down the slope
                log::trace!("slide: pure fall onto ground at {candidate}");
                break;
            }

            if solved {
                break;
            }
        }

        if self.has_forbidden_contact(Vec3::ZERO) {
            log::debug!("slide: stuck at {candidate}, rolling back to {origin}");
            self.test_position = origin;
            self.update_contacts(triangles);
            return false;
        }

        !blocked
    }

    // ========================================================================
    // Step Up
    // ========================================================================

    /// Try to climb onto a ledge in the horizontal direction of `motion`.
    ///
    /// The capsule is lifted by the step height and nudged forward by almost
    /// its radius. If it fits there it is dropped back onto the ledge.
    ///
    /// # Returns
    ///
    /// Whether the character now stands on the ledge. On failure the working
    /// position is unchanged.
    pub(super) fn step_up(&mut self, triangles: &[Triangle], motion: Vec3) -> bool {
        let up = self.config.up;
        let tolerance = self.config.allowed_penetration;
        let origin = self.test_position;

        let horizontal = motion - up * up.dot(motion);
        let Some(forward) = horizontal.try_normalize() else {
            return false;
        };

        let reach = self.capsule.radius - 2.0 * tolerance;
        let probe = origin + forward * reach + up * self.config.step_height;

        collect_contacts(&self.capsule, probe, triangles, &mut self.probe_contacts);
        let clear = !self
            .probe_contacts
            .iter()
            .any(|contact| is_forbidden(contact, Vec3::ZERO, tolerance));

        if clear {
            self.test_position = probe;
            if self.step_down(triangles, true, self.config.step_height) {
                log::debug!("step_up: {origin} -> {}", self.test_position);
                return true;
            }
        }

        log::trace!("step_up: rejected at {probe}");
        self.test_position = origin;
        self.update_contacts(triangles);
        false
    }

    // ========================================================================
    // Step Down
    // ========================================================================

    /// Snap the capsule down onto ground below it.
    ///
    /// Probes a drop of `reach` and lifts the capsule back out of whatever it
    /// lands in. If the landing spot is blocked the drop is
    /// bisected between the deepest free drop and the shallowest blocked one.
    ///
    /// # Arguments
    ///
    /// * `only_allowed_slopes` - Require walkable ground under the landing spot
    /// * `reach` - Deepest drop probed (meters)
    ///
    /// # Returns
    ///
    /// Whether the capsule stands on ground afterwards. On failure the working
    /// position is unchanged.
    pub(super) fn step_down(&mut self, triangles: &[Triangle], only_allowed_slopes: bool, reach: f32) -> bool {
        let up = self.config.up;
        let tolerance = self.config.allowed_penetration;

        self.update_contacts(triangles);
        if reach <= 0.0 || self.touches_ground() {
            return true;
        }

        let start = self.test_position;
        let mut unsafe_drop = -up * reach;
        let mut safe_drop = Vec3::ZERO;
        let mut drop = unsafe_drop;

        let mut bisect = false;
        let mut has_bottom = false;
        let mut found_allowed = false;
        let mut has_forbidden = false;

        self.test_position = start + drop;
        self.update_contacts(triangles);
        self.bounds.clear();

        for iteration in 0..STEP_DOWN_ITERATIONS {
            if iteration > 0 {
                let unresolved = has_forbidden || !has_bottom || (bisect && self.contacts.is_empty());
                if !unresolved || !bisect {
                    break;
                }

                drop = (safe_drop + unsafe_drop) * 0.5;
                self.test_position = start + drop;
                self.update_contacts(triangles);
                self.bounds.clear();
            }

            let probe = self.test_position;
            add_contact_bounds(&mut self.bounds, &self.contacts, probe, &self.config);

            let mut candidate = probe;
            let mut solved = false;

            for _ in 0..INNER_PASSES {
                let mut moved = false;

                for i in 0..self.bounds.len() {
                    let plane = self.bounds[i];
                    let up_dot = up.dot(plane.normal);
                    if up_dot <= 0.0 {
                        continue;
                    }

                    let allowed = self.config.is_allowed_slope(plane.normal);
                    let distance = plane.signed_distance(candidate);
                    if distance < 0.0 {
                        has_bottom = true;
                        found_allowed |= allowed;
                    }
                    if distance + tolerance >= 0.0 {
                        continue;
                    }

                    let depth = distance + tolerance * CONTACT_SKIN;
                    candidate += if allowed {
                        // Lift straight up so walkable ground does not shove sideways
                        up * (-depth / up_dot)
                    } else {
                        plane.normal * -depth
                    };
                    moved = true;
                }

                if !moved {
                    solved = true;
                    break;
                }
            }

            let progress = up.dot(candidate - start) < -DIRECTION_EPSILON;
            if !solved || !progress {
                has_bottom = false;
                bisect = true;
                unsafe_drop = drop;
                continue;
            }

            self.test_position = candidate;
            self.update_contacts(triangles);

            has_forbidden = self.has_forbidden_contact(Vec3::ZERO);
            bisect |= has_forbidden;
            if has_forbidden {
                unsafe_drop = drop;
            } else {
                safe_drop = drop;
            }
        }

        if has_forbidden || !has_bottom || (only_allowed_slopes && !found_allowed) {
            log::debug!("step_down: no ground within {reach} below {start}");
            self.test_position = start;
            self.update_contacts(triangles);
            return false;
        }

        log::debug!("step_down: {start} -> {}", self.test_position);
        true
    }

    /// Whether any current contact is walkable ground.
    fn touches_ground(&self) -> bool {
        self.contacts
            .iter()
            .any(|contact| self.config.is_allowed_slope(contact.normal))
    }

    // ========================================================================
    // Fly
    // ========================================================================

    /// Move by `target_motion` ignoring gravity, slopes and steps.
    ///
    /// Every bound the motion runs into is resolved by pushing along its
    /// normal. If the capsule cannot be freed it stays where it was.
    pub(super) fn fly(&mut self, triangles: &[Triangle], target_motion: Vec3) {
        let tolerance = self.config.allowed_penetration;
        let origin = self.prev_position;

        let mut candidate = origin + target_motion;

        self.bounds.clear();
        self.test_position = candidate;
        self.update_contacts(triangles);

        for _ in 0..OUTER_PASSES {
            add_contact_bounds(&mut self.bounds, &self.contacts, candidate, &self.config);

            for _ in 0..INNER_PASSES {
                let mut moved = false;

                for i in 0..self.bounds.len() {
                    let plane = self.bounds[i];
                    if plane.normal.dot(candidate - origin) >= 0.0 {
                        continue;
                    }

                    let distance = plane.signed_distance(candidate);
                    if distance + tolerance >= 0.0 {
                        continue;
                    }

                    candidate += plane.normal * -(distance + tolerance * CONTACT_SKIN);
                    moved = true;
                }

                if !moved {
                    break;
                }
            }

            let actual_motion = candidate - origin;
            self.test_position = candidate;
            self.update_contacts(triangles);

            if !self.has_forbidden_contact(actual_motion) || target_motion.dot(actual_motion) <= 0.0 {
                break;
            }
        }

        let free = !self.has_forbidden_contact(Vec3::ZERO);
        if !free {
            log::debug!("fly: stuck at {candidate}, staying at {origin}");
        }
        self.next_position = if free { candidate } else { origin };
        self.test_position = self.next_position;
        self.update_contacts(triangles);
    }
}

// ============================================================================
// Tests
// ============================================================================
