//! Cameras: a damped orbit camera for free viewing and a follow camera for the
//! embodied player.

use glam::{Mat4, Quat, Vec3};

use crate::config::CameraConfig;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, cfg: &CameraConfig) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            aspect: cfg.aspect,
            fovy: cfg.fovy_degrees.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

/// Orbit around a target with pointer-driven, exponentially damped motion.
///
/// Input accumulates into pending yaw/pitch deltas; each [`update`](Self::update)
/// applies `damping` of what is pending and keeps the rest for later frames.
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    damping: f32,
    min_distance: f32,
    max_distance: f32,
}

const MAX_PITCH: f32 = 1.5;

impl OrbitCamera {
    pub fn new(cfg: &CameraConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.6155, // atan(1/√2): the classic (1, 1, 1) diagonal view
            distance: cfg.initial_distance.clamp(cfg.min_distance, cfg.max_distance),
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            damping: cfg.damping,
            min_distance: cfg.min_distance,
            max_distance: cfg.max_distance,
        }
    }

    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.pending_yaw += d_yaw;
        self.pending_pitch += d_pitch;
    }

    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn update(&mut self) {
        let dy = self.pending_yaw * self.damping;
        let dp = self.pending_pitch * self.damping;
        self.yaw += dy;
        self.pitch = (self.pitch + dp).clamp(-MAX_PITCH, MAX_PITCH);
        self.pending_yaw -= dy;
        self.pending_pitch -= dp;
    }

    /// Rotation still waiting to be applied.
    pub fn pending(&self) -> (f32, f32) {
        (self.pending_yaw, self.pending_pitch)
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    pub fn camera(&self, cfg: &CameraConfig) -> Camera {
        Camera::look_at(self.eye(), self.target, cfg)
    }
}

/// Third-person camera: `offset` rotated by `yaw` around +Y, looking at the player.
pub fn follow_camera(player: Vec3, yaw: f32, cfg: &CameraConfig) -> Camera {
    let offset = Quat::from_rotation_y(yaw) * Vec3::from_array(cfg.follow_offset);
    Camera::look_at(player + offset, player, cfg)
}
