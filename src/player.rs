//! Embodied player: key state, facing, jumping and kinematic movement.

use glam::{Quat, Vec3};

use crate::config::PlayerConfig;
use crate::physics::BodyHandle;

/// Who owns the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Orbit camera, no player.
    FreeCamera,
    /// Full-screen play: the camera follows the player.
    Embodied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

/// Held movement keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    /// Direction in the player's local frame, forward being -Z.  Not normalised.
    pub fn local_direction(&self) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if self.forward {
            dir.z -= 1.0;
        }
        if self.backward {
            dir.z += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

pub struct Player {
    /// Centre of the player box.
    pub position: Vec3,
    pub velocity: Vec3,
    /// Facing around +Y, radians.
    pub yaw: f32,
    pub jumps_used: u32,
    pub grounded: bool,
    /// Physics body when locomotion goes through the backend.
    pub body: Option<BodyHandle>,
    pub half_extents: Vec3,
    keys: MoveKeys,
    jump_requested: bool,
}

impl Player {
    pub fn new(position: Vec3, cfg: &PlayerConfig) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            jumps_used: 0,
            grounded: false,
            body: None,
            half_extents: Vec3::from_array(cfg.half_extents),
            keys: MoveKeys::default(),
            jump_requested: false,
        }
    }

    pub fn set_key(&mut self, key: Key, down: bool) {
        match key {
            Key::Forward => self.keys.forward = down,
            Key::Backward => self.keys.backward = down,
            Key::Left => self.keys.left = down,
            Key::Right => self.keys.right = down,
            Key::Jump => {
                if down {
                    self.jump_requested = true;
                }
            }
        }
    }

    /// Pointer drag turns the player (and the follow camera with it).
    pub fn drag(&mut self, dx: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
    }

    /// Unit world-space movement direction, or zero when no key is held.
    pub fn move_direction(&self) -> Vec3 {
        let local = self.keys.local_direction();
        if local == Vec3::ZERO {
            return Vec3::ZERO;
        }
        Quat::from_rotation_y(self.yaw) * local.normalize()
    }

    /// Visual orientation of the player box.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// A first jump needs ground; further jumps are allowed mid-air until
    /// `max_jumps` is spent.
    pub fn can_jump(&self, max_jumps: u32) -> bool {
        self.jumps_used < max_jumps && (self.grounded || self.jumps_used > 0)
    }

    /// Starts a jump if allowed.  Returns whether it happened; a refused jump
    /// changes nothing.
    pub fn try_jump(&mut self, cfg: &PlayerConfig) -> bool {
        if !self.can_jump(cfg.max_jumps) {
            return false;
        }
        self.jumps_used += 1;
        self.grounded = false;
        self.velocity.y = cfg.jump_velocity;
        true
    }

    /// Takes the pending jump request, if any.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Grounding event: resets the jump count.
    pub fn land(&mut self) {
        self.grounded = true;
        self.jumps_used = 0;
    }

    /// Moves the player without a physics engine.
    ///
    /// * `ground`: standing height under `(x, z)` for a ray starting at
    ///   `from_y`, or `None` when nothing is below.
    ///
    /// Horizontal steps onto ground higher than the top of the player box are
    /// refused.
    pub fn update_kinematic(
        &mut self,
        dt: f32,
        cfg: &PlayerConfig,
        ground: impl Fn(f32, f32, f32) -> Option<f32>,
    ) {
        if self.take_jump_request() {
            self.try_jump(cfg);
        }

        let walk = self.move_direction() * cfg.speed;
        let step = walk * dt;
        if step != Vec3::ZERO {
            let top = self.position.y + self.half_extents.y;
            let (nx, nz) = (self.position.x + step.x, self.position.z + step.z);
            let blocked = ground(nx, f32::INFINITY, nz).is_some_and(|h| h > top);
            if !blocked {
                self.position.x = nx;
                self.position.z = nz;
            }
        }
        self.velocity.x = walk.x;
        self.velocity.z = walk.z;

        self.velocity.y -= cfg.gravity * dt;
        self.position.y += self.velocity.y * dt;

        let from = self.position.y + self.half_extents.y;
        match ground(self.position.x, from, self.position.z) {
            Some(h) if self.position.y - self.half_extents.y <= h => {
                self.position.y = h + self.half_extents.y;
                self.velocity.y = self.velocity.y.max(0.0);
                self.land();
            }
            _ => self.grounded = false,
        }
    }
}
