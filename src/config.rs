//! Generation and simulation settings.
//!
//! Every section deserialises with `#[serde(default)]`, so a config file only has
//! to name the values it changes.  The defaults reproduce the classic demo: a
//! 50-unit island at 64×64 vertices, 15 units tall, four octaves of noise and a
//! linear radial mask.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bands::BandTable;
use crate::error::{Error, Result};
use crate::noise::NoiseParams;

/// Radial falloff turning an infinite noise field into a bounded landmass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IslandMask {
    /// `max(0, 1 - d * falloff)`
    Linear { falloff: f32 },
    /// `max(0, 1 - d * falloff) ^ exponent`
    Power { falloff: f32, exponent: f32 },
}

/// Flattens low masked heights into a playable shelf.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plateau {
    /// Masked heights in `(0, threshold)` are replaced by `level`.
    pub threshold: f32,
    pub level: f32,
}

/// What happens to scaled heights just above the waterline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShorePolicy {
    None,
    /// Heights below `threshold` are multiplied by `factor`.
    Flatten { threshold: f32, factor: f32 },
    /// Heights below `threshold` drop to the sea floor.
    Cut { threshold: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Edge length of the square patch in world units.
    pub size: f32,
    /// Vertices per edge.
    pub resolution: usize,
    pub noise: NoiseParams,
    pub mask: IslandMask,
    pub plateau: Option<Plateau>,
    /// Height of a fully unmasked noise value of 1.0.
    pub max_height: f32,
    pub shore: ShorePolicy,
    /// How far below sea level terrain may sink before it is floored.
    /// `0.0` keeps every vertex at or above the water plane.
    pub underwater_allowance: f32,
    /// Height of the water plane.
    pub sea_level: f32,
    /// When set, a flat sea-bottom layer is added this far below sea level.
    pub sea_bottom_depth: Option<f32>,
    pub bands: BandTable,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            resolution: 64,
            noise: NoiseParams::default(),
            mask: IslandMask::Linear { falloff: 1.5 },
            plateau: None,
            max_height: 15.0,
            shore: ShorePolicy::None,
            underwater_allowance: 0.0,
            sea_level: 0.0,
            sea_bottom_depth: None,
            bands: BandTable::default(),
        }
    }
}

impl TerrainConfig {
    /// Copy of this config shrunk by `factor`, keeping vertex density.
    pub fn scaled(&self, factor: f32) -> Self {
        let resolution = ((self.resolution as f32 * factor).round() as usize).max(8);
        Self {
            size: self.size * factor,
            resolution,
            max_height: self.max_height * factor,
            ..self.clone()
        }
    }

    /// Distance between neighbouring vertices.
    pub fn cell_size(&self) -> f32 {
        self.size / (self.resolution as f32 - 1.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return invalid(format!("terrain.size must be positive, got {}", self.size));
        }
        if self.resolution < 2 {
            return invalid(format!(
                "terrain.resolution must be at least 2, got {}",
                self.resolution
            ));
        }
        if !(1..=8).contains(&self.noise.octaves) {
            return invalid(format!(
                "terrain.noise.octaves must be in 1..=8, got {}",
                self.noise.octaves
            ));
        }
        if !(self.noise.lacunarity > 1.0 && self.noise.lacunarity <= 4.0) {
            return invalid(format!(
                "terrain.noise.lacunarity must be in (1, 4], got {}",
                self.noise.lacunarity
            ));
        }
        if !(self.noise.persistence > 0.0 && self.noise.persistence < 1.0) {
            return invalid(format!(
                "terrain.noise.persistence must be in (0, 1), got {}",
                self.noise.persistence
            ));
        }
        if !(self.max_height.is_finite() && self.max_height > 0.0) {
            return invalid(format!(
                "terrain.max_height must be positive, got {}",
                self.max_height
            ));
        }
        if self.underwater_allowance < 0.0 {
            return invalid("terrain.underwater_allowance must not be negative".into());
        }
        match self.mask {
            IslandMask::Linear { falloff } | IslandMask::Power { falloff, .. } if falloff <= 0.0 => {
                return invalid(format!("terrain.mask.falloff must be positive, got {falloff}"));
            }
            IslandMask::Power { exponent, .. } if exponent <= 0.0 => {
                return invalid(format!("terrain.mask.exponent must be positive, got {exponent}"));
            }
            _ => {}
        }
        self.bands.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchipelagoConfig {
    /// Upper bound of the uniform satellite count (inclusive).
    pub max_satellites: u32,
    /// Satellite size range as a fraction of the main island size.
    pub min_size_factor: f32,
    pub max_size_factor: f32,
    /// Angular jitter as a fraction of one sector (`2π / N`), centred on zero.
    pub angle_jitter: f32,
    /// Satellite distance range as a multiple of the main island size.
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ArchipelagoConfig {
    fn default() -> Self {
        Self {
            max_satellites: 3,
            min_size_factor: 0.15,
            max_size_factor: 0.40,
            angle_jitter: 0.5,
            min_distance: 0.55,
            max_distance: 0.8,
        }
    }
}

impl ArchipelagoConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0 < self.min_size_factor && self.min_size_factor <= self.max_size_factor) {
            return invalid("archipelago size factors must satisfy 0 < min <= max".into());
        }
        if !(0.0..=1.0).contains(&self.angle_jitter) {
            return invalid(format!(
                "archipelago.angle_jitter must be in [0, 1], got {}",
                self.angle_jitter
            ));
        }
        if !(0.0 < self.min_distance && self.min_distance <= self.max_distance) {
            return invalid("archipelago distances must satisfy 0 < min <= max".into());
        }
        Ok(())
    }
}

/// How the embodied player moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locomotion {
    /// Position deltas plus hand-integrated gravity.
    Kinematic,
    /// Velocities handed to the physics backend.
    Physics,
}

/// How the standing height under the player is found in kinematic locomotion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Downward ray against the terrain triangles.
    Raycast,
    /// Axis-aligned box over each island footprint, topped at its highest vertex.
    Footprint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed in units per second.
    pub speed: f32,
    pub jump_velocity: f32,
    /// Downward acceleration used by kinematic locomotion.
    pub gravity: f32,
    /// Jumps allowed before touching ground again.
    pub max_jumps: u32,
    pub half_extents: [f32; 3],
    pub mass: f32,
    /// Spawn height above the ground at the origin.
    pub spawn_clearance: f32,
    pub locomotion: Locomotion,
    pub collision: CollisionMode,
    /// Treat the water plane as solid ground.
    pub water_is_floor: bool,
    /// Radians of yaw per pixel of pointer drag.
    pub drag_sensitivity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            jump_velocity: 7.0,
            gravity: 20.0,
            max_jumps: 2,
            half_extents: [0.5, 0.5, 0.25],
            mass: 1.0,
            spawn_clearance: 2.0,
            locomotion: Locomotion::Kinematic,
            collision: CollisionMode::Raycast,
            water_is_floor: true,
            drag_sensitivity: 0.01,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration applied to dynamic bodies.
    pub gravity: f32,
    /// Step used by the headless loop driver.
    pub fixed_dt: f32,
    /// Depth of the static ground plane below sea level.
    pub sea_floor_depth: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.82,
            fixed_dt: 1.0 / 60.0,
            sea_floor_depth: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub size: f32,
    pub resolution: usize,
    pub amplitude: f32,
    pub wavelength: f32,
    pub speed: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            resolution: 32,
            amplitude: 0.15,
            wavelength: 8.0,
            speed: 1.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fraction of the pending orbit motion consumed per update.
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub initial_distance: f32,
    /// Follow-camera offset from the player before yaw rotation.
    pub follow_offset: [f32; 3],
    pub fovy_degrees: f32,
    pub aspect: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            damping: 0.05,
            min_distance: 10.0,
            max_distance: 100.0,
            initial_distance: 52.0,
            follow_offset: [0.0, 20.0, 30.0],
            fovy_degrees: 75.0,
            aspect: 800.0 / 600.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub terrain: TerrainConfig,
    pub archipelago: ArchipelagoConfig,
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub water: WaterConfig,
    pub camera: CameraConfig,
}

impl Config {
    /// Reads a JSON config file and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.archipelago.validate()?;
        if self.player.max_jumps == 0 {
            return invalid("player.max_jumps must be at least 1".into());
        }
        if self.player.half_extents.iter().any(|&e| !(e > 0.0)) {
            return invalid("player.half_extents must all be positive".into());
        }
        if !(self.physics.fixed_dt > 0.0) {
            return invalid("physics.fixed_dt must be positive".into());
        }
        if self.water.resolution < 2 {
            return invalid("water.resolution must be at least 2".into());
        }
        if !(0.0 < self.camera.damping && self.camera.damping <= 1.0) {
            return invalid("camera.damping must be in (0, 1]".into());
        }
        if self.camera.min_distance > self.camera.max_distance {
            return invalid("camera.min_distance exceeds camera.max_distance".into());
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Result<()> {
    Err(Error::InvalidConfig(msg))
}
