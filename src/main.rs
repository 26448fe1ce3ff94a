//! Sketchblocks - Headless Movement Demo
//!
//! Builds a small block level and walks a character through it with a
//! scripted input sequence, logging where it ends up. Run with
//! `RUST_LOG=debug` to see every step-up and step-down.

use glam::Vec3;
use sketchblocks_physics::{CollisionWorld, ConfigError, ControllerConfig, KinematicController};

/// Simulation rate of the demo (ticks/second).
const TICK_RATE: f32 = 60.0;

/// Below this height the character is put back at the spawn point.
const KILL_HEIGHT: f32 = -20.0;

/// One segment of the scripted input.
struct ScriptedInput {
    /// How long the segment lasts (seconds).
    duration: f32,
    /// Desired velocity (meters/second).
    velocity: Vec3,
    /// Jump speed held during the segment.
    jump_speed: f32,
}

impl ScriptedInput {
    fn walk(duration: f32, velocity: Vec3) -> Self {
        Self {
            duration,
            velocity,
            jump_speed: 0.0,
        }
    }

    fn jump(velocity: Vec3, jump_speed: f32) -> Self {
        Self {
            duration: 1.0 / TICK_RATE,
            velocity,
            jump_speed,
        }
    }
}

/// Floor, a half-block step, a ramp and a wall along +X.
fn build_level() -> CollisionWorld {
    let mut world = CollisionWorld::new();

    world.add_box(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(30.0, 0.0, 10.0));
    world.add_box(Vec3::new(3.0, 0.0, -2.0), Vec3::new(5.0, 0.5, 2.0));
    world.add_ramp(Vec3::new(5.0, 0.5, -2.0), Vec3::new(9.0, 2.0, 2.0));
    world.add_box(Vec3::new(9.0, 0.0, -2.0), Vec3::new(12.0, 2.0, 2.0));
    world.add_box(Vec3::new(16.0, 0.0, -10.0), Vec3::new(17.0, 4.0, 10.0));

    log::info!("Level built with {} triangles", world.triangle_count());
    world
}

fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let world = build_level();
    let spawn = Vec3::new(0.0, 2.0, 0.0);

    let mut controller = KinematicController::new(ControllerConfig::platformer())?;
    controller.teleport(spawn);

    let forward = Vec3::new(4.0, 0.0, 0.0);
    let script = [
        ScriptedInput::walk(1.0, Vec3::ZERO),
        ScriptedInput::walk(4.0, forward),
        ScriptedInput::jump(forward, 5.0),
        ScriptedInput::walk(2.0, forward),
        ScriptedInput::walk(1.5, Vec3::new(0.0, 0.0, 3.0)),
    ];

    let delta_time = 1.0 / TICK_RATE;
    let mut tick = 0u32;

    for input in &script {
        let ticks = (input.duration * TICK_RATE).round() as u32;

        for _ in 0..ticks {
            let substeps = controller.step_substepped(&world, input.velocity, input.jump_speed, delta_time);

            if controller.position().y < KILL_HEIGHT {
                log::warn!("Fell out of the world at {}, respawning", controller.position());
                controller.teleport(spawn);
            }

            if tick % 30 == 0 {
                log::info!(
                    "tick {:4} pos={:.3} grounded={} vy={:.2} substeps={}",
                    tick,
                    controller.position(),
                    controller.had_ground_contact(),
                    controller.vertical_speed(),
                    substeps
                );
            }
            tick += 1;
        }
    }

    log::info!(
        "Finished after {} ticks at {:.3} (grounded: {})",
        tick,
        controller.position(),
        controller.had_ground_contact()
    );

    Ok(())
}
