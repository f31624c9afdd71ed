//! # Physics Module
//!
//! Kinematic movement of the viewer: a point-sized eye carried by an axis-aligned box
//! that walks, falls and jumps through the voxel grid.
//!
//! ## Integration order
//!
//! Each call to [`MovementIntegrator::step`] runs, in order:
//!
//! 1. Clamp the delta time to `max_dt`
//! 2. Horizontal friction
//! 3. Gravity
//! 4. Acceleration along the yaw-rotated input direction
//! 5. `sub_steps` equal slices, each moving along X, then Z, then Y; an axis whose move
//!    would collide is reverted and its velocity zeroed
//! 6. Jump, if requested while grounded
//! 7. Respawn, if the viewer fell below the floor
//!
//! Horizontal moves ignore the lower `step_height` of the box; vertical moves test the
//! full height.
//!
//! ## Grounded state
//!
//! [`MotionState`] is set to `Grounded` by a blocked downward move and cleared only by a
//! jump or a respawn. Walking off a ledge keeps it set, so a single mid-air jump is
//! possible after stepping off an edge.

use cgmath::{InnerSpace, Point3, Vector3};

pub mod collision;

use collision::{check_collision, PlayerBounds};

use crate::config::PhysicsConfig;
use crate::engine_state::voxels::VoxelQuery;

/// Whether the viewer may jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    /// In the air since the last jump or respawn.
    #[default]
    Airborne,
    /// Stopped by the ground since the last jump.
    Grounded,
}

/// The simulated viewer. `position` is the eye; the feet are `player_height` below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerBody {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub motion: MotionState,
}

impl ViewerBody {
    /// A motionless airborne body at `position`.
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            motion: MotionState::Airborne,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.motion == MotionState::Grounded
    }
}

/// Movement intent for one tick.
///
/// `yaw` is the viewer's heading in radians: at zero, forward is −Z and right is +X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub yaw: f32,
}

impl MovementInput {
    /// Unit horizontal direction of the held movement keys, or zero when they cancel out.
    pub fn direction(&self) -> Vector3<f32> {
        let (sin, cos) = self.yaw.sin_cos();
        let forward = Vector3::new(-sin, 0.0, -cos);
        let right = Vector3::new(cos, 0.0, -sin);

        let axis = |positive: bool, negative: bool| (positive as i32 - negative as i32) as f32;
        let wish = forward * axis(self.forward, self.backward) + right * axis(self.right, self.left);
        if wish.magnitude2() > 0.0 {
            wish.normalize()
        } else {
            wish
        }
    }
}

/// Advances a [`ViewerBody`] through a voxel world.
#[derive(Debug, Clone)]
pub struct MovementIntegrator {
    config: PhysicsConfig,
    bounds: PlayerBounds,
}

impl MovementIntegrator {
    pub fn new(config: PhysicsConfig) -> Self {
        let bounds = PlayerBounds::from(&config);
        Self { config, bounds }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn bounds(&self) -> &PlayerBounds {
        &self.bounds
    }

    /// Where the viewer respawns.
    pub fn spawn(&self) -> Point3<f32> {
        Point3::from(self.config.spawn)
    }

    /// Integrates one tick of `dt` seconds and returns the new body.
    ///
    /// # Arguments
    ///
    /// * `body` - State at the start of the tick
    /// * `dt` - Elapsed seconds; clamped to `0..=max_dt`
    /// * `input` - Movement intent
    /// * `query` - The voxels to collide with
    pub fn step<Q>(&self, body: ViewerBody, dt: f32, input: &MovementInput, query: &Q) -> ViewerBody
    where
        Q: VoxelQuery + ?Sized,
    {
        let config = &self.config;
        let dt = if dt.is_finite() { dt.clamp(0.0, config.max_dt) } else { 0.0 };
        let mut body = body;

        let damping = (1.0 - config.friction * dt).max(0.0);
        body.velocity.x *= damping;
        body.velocity.z *= damping;

        body.velocity.y -= config.gravity * dt;
        body.velocity += input.direction() * config.move_acceleration * dt;

        let sub_dt = dt / config.sub_steps as f32;
        for _ in 0..config.sub_steps {
            self.move_horizontal(&mut body, sub_dt, query);
            self.move_vertical(&mut body, sub_dt, query);
        }

        if input.jump && body.is_grounded() {
            body.velocity.y = config.jump_speed;
            body.motion = MotionState::Airborne;
        }

        if body.position.y < config.fall_floor {
            log::warn!(
                "viewer fell below {} at ({:.2}, {:.2}), respawning",
                config.fall_floor,
                body.position.x,
                body.position.z
            );
            body = ViewerBody::at(self.spawn());
        }

        body
    }

    fn move_horizontal<Q>(&self, body: &mut ViewerBody, sub_dt: f32, query: &Q)
    where
        Q: VoxelQuery + ?Sized,
    {
        if body.velocity.x != 0.0 {
            let mut candidate = body.position;
            candidate.x += body.velocity.x * sub_dt;
            if check_collision(query, candidate, false, &self.bounds) {
                body.velocity.x = 0.0;
            } else {
                body.position = candidate;
            }
        }

        if body.velocity.z != 0.0 {
            let mut candidate = body.position;
            candidate.z += body.velocity.z * sub_dt;
            if check_collision(query, candidate, false, &self.bounds) {
                body.velocity.z = 0.0;
            } else {
                body.position = candidate;
            }
        }
    }

    fn move_vertical<Q>(&self, body: &mut ViewerBody, sub_dt: f32, query: &Q)
    where
        Q: VoxelQuery + ?Sized,
    {
        if body.velocity.y == 0.0 {
            return;
        }
        let mut candidate = body.position;
        candidate.y += body.velocity.y * sub_dt;
        if check_collision(query, candidate, true, &self.bounds) {
            if body.velocity.y < 0.0 {
                body.motion = MotionState::Grounded;
            }
            body.velocity.y = 0.0;
        } else {
            body.position = candidate;
        }
    }
}
