//! End-to-end movement scenarios in small block levels.

use glam::Vec3;
use sketchblocks_physics::{CollisionWorld, ControllerConfig, KinematicController};

const DT: f32 = 1.0 / 60.0;

fn floor_world() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world.add_box(Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0));
    world
}

fn controller_at(position: Vec3) -> KinematicController {
    let mut controller = KinematicController::new(ControllerConfig::default()).unwrap();
    controller.teleport(position);
    controller
}

fn settle(controller: &mut KinematicController, world: &CollisionWorld) {
    for _ in 0..90 {
        controller.step(world, Vec3::ZERO, 0.0, DT);
    }
    assert!(controller.had_ground_contact(), "failed to settle at {}", controller.position());
}

fn walk(controller: &mut KinematicController, world: &CollisionWorld, velocity: Vec3, ticks: usize) {
    for _ in 0..ticks {
        controller.step(world, velocity, 0.0, DT);
    }
}

/// Plane through the origin tilted `angle` radians from horizontal around Z.
fn tilted_world(angle: f32) -> CollisionWorld {
    let tangent = Vec3::new(angle.cos(), angle.sin(), 0.0);
    let p = |u: f32, w: f32| tangent * u + Vec3::Z * w;

    let mut world = CollisionWorld::new();
    world.add_quad(p(-5.0, -5.0), p(-5.0, 5.0), p(5.0, 5.0), p(5.0, -5.0));
    world
}

// ============================================================================
// Resting and falling
// ============================================================================

#[test]
fn test_falls_and_settles_on_floor() {
    let world = floor_world();
    let mut controller = controller_at(Vec3::new(0.0, 2.0, 0.0));

    settle(&mut controller, &world);

    let position = controller.position();
    assert!(position.y > 0.24 && position.y <= 0.25, "y={}", position.y);
    assert_eq!(position.x, 0.0);
    assert_eq!(position.z, 0.0);
    assert_eq!(controller.gravity_velocity(), Vec3::ZERO);
}

#[test]
fn test_zero_motion_is_idempotent() {
    let world = floor_world();
    let mut controller = controller_at(Vec3::new(0.0, 1.0, 0.0));
    settle(&mut controller, &world);

    let rest = controller.position();
    for _ in 0..30 {
        controller.step(&world, Vec3::ZERO, 0.0, DT);
        assert_eq!(controller.position(), rest);
        assert!(controller.had_ground_contact());
    }
}

#[test]
fn test_free_fall_matches_kinematics() {
    let mut controller = controller_at(Vec3::new(0.0, 10.0, 0.0));

    for _ in 0..30 {
        controller.update(&[], Vec3::ZERO, 0.0, DT);
    }

    // y = y0 - 1/2 g t², t = 0.5s
    let expected = 10.0 - 0.5 * 9.0 * 0.25;
    assert!((controller.position().y - expected).abs() < 1e-3, "y={}", controller.position().y);
    assert!((controller.vertical_speed() + 4.5).abs() < 1e-3);
}

#[test]
fn test_fall_speed_is_clamped() {
    let mut controller = controller_at(Vec3::new(0.0, 100.0, 0.0));

    for _ in 0..300 {
        let before = controller.position();
        controller.update(&[], Vec3::new(100.0, 0.0, 0.0), 0.0, DT);
        let moved = controller.position() - before;
        assert!(moved.length() <= 10.0 * DT + 1e-5, "moved {moved}");
    }

    assert!((controller.vertical_speed() + 10.0).abs() < 1e-3);
}

// ============================================================================
// Steps
// ============================================================================

fn step_world(height: f32) -> CollisionWorld {
    let mut world = floor_world();
    world.add_box(Vec3::new(1.0, 0.0, -5.0), Vec3::new(4.0, height, 5.0));
    world
}

#[test]
fn test_step_up_gains_step_height() {
    for height in [0.2, 0.3, 0.5] {
        let world = step_world(height);
        let mut controller = controller_at(Vec3::new(0.0, 0.5, 0.0));
        settle(&mut controller, &world);
        let start_y = controller.position().y;

        walk(&mut controller, &world, Vec3::new(3.0, 0.0, 0.0), 60);

        let gain = controller.position().y - start_y;
        assert!((gain - height).abs() < 0.05, "step {height}: gained {gain}");
        assert!(controller.position().x > 1.5, "step {height}: x={}", controller.position().x);
        assert!(controller.had_ground_contact());
    }
}

#[test]
fn test_tall_obstacle_blocks() {
    let world = step_world(1.0);
    let mut controller = controller_at(Vec3::new(0.0, 0.5, 0.0));
    settle(&mut controller, &world);
    let start_y = controller.position().y;

    walk(&mut controller, &world, Vec3::new(3.0, 0.0, 0.0), 60);

    assert!((controller.position().y - start_y).abs() < 0.01);
    assert!(controller.position().x < 0.76);
    assert!(!controller.is_stepping_up());
}

#[test]
fn test_jump_onto_tall_block() {
    let world = step_world(1.0);
    let mut controller = controller_at(Vec3::new(0.0, 0.5, 0.0));
    settle(&mut controller, &world);

    controller.step(&world, Vec3::new(3.0, 0.0, 0.0), 6.0, DT);
    walk(&mut controller, &world, Vec3::new(3.0, 0.0, 0.0), 29);
    assert!(controller.position().x > 1.4);

    // Release the stick mid-air and drop onto the block
    walk(&mut controller, &world, Vec3::ZERO, 90);

    let position = controller.position();
    assert!(position.y > 1.2, "should land on top, y={}", position.y);
    assert!(controller.had_ground_contact());
}

// ============================================================================
// Slopes
// ============================================================================

#[test]
fn test_walks_up_ramp() {
    let mut world = floor_world();
    world.add_ramp(Vec3::new(1.0, 0.0, -5.0), Vec3::new(3.0, 1.0, 5.0));

    let mut controller = controller_at(Vec3::new(0.0, 0.5, 0.0));
    settle(&mut controller, &world);

    walk(&mut controller, &world, Vec3::new(2.0, 0.0, 0.0), 45);

    let position = controller.position();
    assert!(position.x > 1.2, "x={}", position.x);
    assert!(position.y > 0.3, "should climb, y={}", position.y);
    assert!(controller.had_ground_contact());

    let ground_up = controller.ground_up();
    assert!(ground_up.x < 0.0, "ground normal should lean back down the ramp");
}

#[test]
fn test_slope_at_limit_is_ground() {
    let config = ControllerConfig::default();
    let limit = config.max_slope_angle;

    for (angle, walkable) in [(limit, true), (limit - 1e-3, true), (limit + 1e-3, false)] {
        let world = tilted_world(angle);
        let normal = Vec3::new(-angle.sin(), angle.cos(), 0.0);

        let mut controller = controller_at(normal * (config.radius - 0.003));
        controller.step(&world, Vec3::ZERO, 0.0, DT);

        assert_eq!(
            controller.had_ground_contact(),
            walkable,
            "angle {angle} should be walkable={walkable}"
        );
    }
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_never_rests_inside_geometry() {
    let mut world = floor_world();
    world.add_box(Vec3::new(2.0, 0.0, -3.0), Vec3::new(4.0, 0.4, 3.0));
    world.add_ramp(Vec3::new(4.0, 0.4, -3.0), Vec3::new(7.0, 1.4, 3.0));
    world.add_box(Vec3::new(7.0, 0.0, -3.0), Vec3::new(9.0, 1.4, 3.0));
    world.add_box(Vec3::new(11.0, 0.0, -10.0), Vec3::new(12.0, 3.0, 10.0));

    let mut controller = controller_at(Vec3::new(0.0, 1.0, 0.0));
    let tolerance = controller.config().allowed_penetration;

    let inputs = [
        (Vec3::new(3.0, 0.0, 0.0), 0.0, 240),
        (Vec3::new(0.0, 0.0, 3.0), 0.0, 40),
        (Vec3::new(3.0, 0.0, -1.0), 5.0, 1),
        (Vec3::new(-3.0, 0.0, 0.5), 0.0, 200),
    ];

    for (velocity, jump_speed, ticks) in inputs {
        for _ in 0..ticks {
            controller.step(&world, velocity, jump_speed, DT);

            for contact in controller.contacts() {
                assert!(
                    contact.penetration <= tolerance + 1e-5,
                    "penetration {} at {}",
                    contact.penetration,
                    controller.position()
                );
            }
        }
    }
}

#[test]
fn test_identical_inputs_give_identical_results() {
    let mut world = step_world(0.3);
    world.add_ramp(Vec3::new(4.0, 0.3, -5.0), Vec3::new(6.0, 1.3, 5.0));

    let mut a = controller_at(Vec3::new(0.0, 2.0, 0.0));
    let mut b = controller_at(Vec3::new(0.0, 2.0, 0.0));

    for i in 0..200 {
        let velocity = Vec3::new(3.0, 0.0, (i as f32 * 0.1).sin());
        let jump = if i == 120 { 4.0 } else { 0.0 };
        a.step(&world, velocity, jump, DT);
        b.step(&world, velocity, jump, DT);
        assert_eq!(a.position(), b.position());
    }
}

#[test]
fn test_substepping_lands_fast_fall() {
    let world = floor_world();
    let mut controller = controller_at(Vec3::new(0.0, 30.0, 0.0));

    let mut frames = 0;
    while !controller.had_ground_contact() && frames < 600 {
        controller.step_substepped(&world, Vec3::ZERO, 0.0, DT);
        frames += 1;
    }

    assert!(controller.had_ground_contact());
    let y = controller.position().y;
    assert!(y > 0.24 && y <= 0.25, "y={y}");
}

// ============================================================================
// Climbing
// ============================================================================

#[test]
fn test_climbing_holds_position_until_released() {
    let world = floor_world();
    let mut controller = controller_at(Vec3::new(0.0, 1.0, 0.0));
    settle(&mut controller, &world);
    let rest_y = controller.position().y;

    controller.set_climbing(true);
    walk(&mut controller, &world, Vec3::new(0.0, 2.0, 0.0), 6);

    let held = controller.position();
    assert!((held.y - (rest_y + 0.2)).abs() < 1e-3, "y={}", held.y);

    // Supported without ground, no gravity and no snap back down
    for _ in 0..30 {
        controller.step(&world, Vec3::ZERO, 0.0, DT);
        assert_eq!(controller.position(), held);
        assert_eq!(controller.gravity_velocity(), Vec3::ZERO);
        assert!(!controller.is_stepping_down());
        assert!(!controller.had_ground_contact());
        assert!(!controller.is_airborne());
    }

    controller.set_climbing(false);
    walk(&mut controller, &world, Vec3::ZERO, 60);

    assert!(controller.had_ground_contact());
    assert!((controller.position().y - rest_y).abs() < 0.01);
}

// ============================================================================
// Fly mode
// ============================================================================

#[test]
fn test_fly_mode_moves_freely_and_collides() {
    let mut world = floor_world();
    world.add_box(Vec3::new(2.0, 0.0, -5.0), Vec3::new(3.0, 5.0, 5.0));

    let config = ControllerConfig {
        gravity: 0.0,
        ..Default::default()
    };
    let mut controller = KinematicController::new(config).unwrap();
    controller.teleport(Vec3::new(0.0, 1.0, 0.0));

    walk(&mut controller, &world, Vec3::new(0.0, 1.0, 0.0), 60);
    assert!((controller.position().y - 2.0).abs() < 1e-3);

    walk(&mut controller, &world, Vec3::new(3.0, 0.0, 0.0), 60);
    let position = controller.position();
    assert!(position.x < 1.76 && position.x > 1.7, "x={}", position.x);
    assert!((position.y - 2.0).abs() < 1e-3, "fly should not fall or climb");
    assert!(!controller.had_ground_contact());
}
