//! # Player Movement
//!
//! First-person movement against the voxel grid. The player is a point at eye
//! height; collision samples one cell at the feet (1.6 below the eye) and one
//! at the head (0.2 above it), resolving X, then Z, then Y independently.
//! Flight skips collision entirely.

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use log::debug;
use web_time::Duration;

use crate::config::PlayerConfig;

use super::voxels::world::VoxelQuery;

/// Offset from the eye to the sampled feet cell.
pub const FEET_OFFSET: f32 = 1.6;
/// Offset from the eye to the sampled head cell.
pub const HEAD_OFFSET: f32 = 0.2;

/// Directional intent for one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MovementInput {
    /// +1 forward, -1 backward
    pub forward: f32,
    /// +1 right, -1 left
    pub strafe: f32,
    /// Jump while walking, rise while flying
    pub up: bool,
    /// Sink while flying
    pub down: bool,
}

/// Position, velocity and movement mode of the player.
#[derive(Debug, Clone)]
pub struct PlayerController {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Current velocity in blocks per second
    pub velocity: Vector3<f32>,
    on_ground: bool,
    flying: bool,
    /// Time of the last jump press that did not toggle flight.
    last_jump_tap: Option<Duration>,
    config: PlayerConfig,
}

impl PlayerController {
    /// Creates a walking player at rest.
    pub fn new(position: Point3<f32>, config: PlayerConfig) -> Self {
        PlayerController {
            position,
            velocity: Vector3::zero(),
            on_ground: false,
            flying: false,
            last_jump_tap: None,
            config,
        }
    }

    /// Whether the last walking step ended standing on something.
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether flight mode is on.
    pub fn is_flying(&self) -> bool {
        self.flying
    }

    /// Movement tuning in use.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Records a jump key press at simulation time `now`.
    ///
    /// A second press within the double-tap window toggles flight and zeroes
    /// vertical velocity.
    ///
    /// # Returns
    /// `true` if flight was toggled.
    pub fn register_jump_press(&mut self, now: Duration) -> bool {
        let window = Duration::from_millis(self.config.double_tap_window_ms);
        match self.last_jump_tap {
            Some(last) if now.saturating_sub(last) < window => {
                self.flying = !self.flying;
                self.velocity.y = 0.0;
                self.last_jump_tap = None;
                debug!("Flight {}", if self.flying { "enabled" } else { "disabled" });
                true
            }
            _ => {
                self.last_jump_tap = Some(now);
                false
            }
        }
    }

    /// Advances the player by `dt` seconds.
    ///
    /// # Arguments
    /// * `dt` - Frame step in seconds, already clamped by the caller
    /// * `input` - Directional intent
    /// * `forward` - Horizontal view direction
    /// * `right` - Horizontal direction to the right of the view
    /// * `world` - Solidity source for collision
    pub fn update<Q: VoxelQuery + ?Sized>(
        &mut self,
        dt: f32,
        input: &MovementInput,
        forward: Vector3<f32>,
        right: Vector3<f32>,
        world: &Q,
    ) {
        let speed = if self.flying {
            self.config.fly_speed
        } else {
            self.config.walk_speed
        };

        let intent = forward * input.forward + right * input.strafe;
        if intent.magnitude2() > 0.0 {
            let accel = intent.normalize() * speed * dt;
            self.velocity.x += accel.x;
            self.velocity.z += accel.z;
        }

        if self.flying {
            let vertical = (input.up as i32 - input.down as i32) as f32;
            self.velocity.y = vertical * speed;
        } else {
            self.velocity.y -= self.config.gravity * dt;
            if self.on_ground && input.up {
                self.velocity.y = self.config.jump_velocity;
            }
        }

        let next = self.position + self.velocity * dt;
        if self.flying {
            self.position = next;
            self.on_ground = false;
        } else {
            self.resolve_collisions(next, world);
        }

        let damping = if self.flying {
            self.config.fly_damping
        } else {
            self.config.walk_damping
        };
        self.velocity.x *= damping;
        self.velocity.z *= damping;
        if self.flying {
            self.velocity.y *= self.config.fly_damping;
        }
    }

    fn resolve_collisions<Q: VoxelQuery + ?Sized>(&mut self, next: Point3<f32>, world: &Q) {
        let try_x = Point3::new(next.x, self.position.y, self.position.z);
        if Self::collides(try_x, world) {
            self.velocity.x = 0.0;
        } else {
            self.position.x = next.x;
        }

        let try_z = Point3::new(self.position.x, self.position.y, next.z);
        if Self::collides(try_z, world) {
            self.velocity.z = 0.0;
        } else {
            self.position.z = next.z;
        }

        let try_y = Point3::new(self.position.x, next.y, self.position.z);
        let collides_y = Self::collides(try_y, world);
        if collides_y {
            self.velocity.y = self.velocity.y.max(0.0);
        } else {
            self.position.y = next.y;
        }
        self.on_ground = collides_y && self.velocity.y <= 0.0;
    }

    /// Whether an eye at `eye` would put the feet or head inside a solid cell.
    fn collides<Q: VoxelQuery + ?Sized>(eye: Point3<f32>, world: &Q) -> bool {
        let solid = |y: f32| {
            world.is_solid_at(eye.x.floor() as i32, y.floor() as i32, eye.z.floor() as i32)
        };
        solid(eye.y - FEET_OFFSET) || solid(eye.y + HEAD_OFFSET)
    }
}
