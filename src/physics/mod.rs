//! Rigid-body capability interface.
//!
//! The simulation talks to physics only through [`PhysicsBackend`]: create static
//! or dynamic bodies from a [`Shape`], step the world, read transforms back for
//! the visuals, and push velocities or impulses for player input.  Any engine
//! that can do those things can sit behind it; [`SimpleWorld`] is the bundled one.

mod simple;

pub use simple::SimpleWorld;

use std::sync::Arc;

use glam::{Quat, Vec3};
use thiserror::Error;

use crate::heightfield::Heightfield;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

#[derive(Clone, Debug)]
pub enum Shape {
    Box { half_extents: Vec3 },
    /// Infinite horizontal plane through the body position, solid below.
    Plane,
    /// Terrain grid centred on the body position.
    Heightfield(Arc<Heightfield>),
}

impl Shape {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match self {
            Shape::Box { half_extents } => {
                let ok = half_extents.is_finite() && half_extents.min_element() > 0.0;
                if !ok {
                    return Err(PhysicsError::InvalidShape(format!(
                        "box half extents must be positive and finite, got {half_extents}"
                    )));
                }
            }
            Shape::Plane => {}
            Shape::Heightfield(hf) => {
                if hf.resolution < 2 || hf.heights.iter().any(|h| !h.is_finite()) {
                    return Err(PhysicsError::InvalidShape(
                        "heightfield needs at least 2×2 finite samples".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid mass {0}")]
    InvalidMass(f32),
    #[error("body {0:?} is static")]
    StaticBody(BodyHandle),
}

pub trait PhysicsBackend {
    /// Adds an immovable body (terrain, ground plane).
    fn create_static_body(&mut self, shape: Shape, position: Vec3)
    -> Result<BodyHandle, PhysicsError>;

    /// Adds a body moved by the simulation.
    fn create_dynamic_body(
        &mut self,
        shape: Shape,
        mass: f32,
        position: Vec3,
    ) -> Result<BodyHandle, PhysicsError>;

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError>;

    /// Advances the world by `dt` seconds.
    fn step(&mut self, dt: f32);

    fn transform(&self, body: BodyHandle) -> Option<Transform>;

    fn velocity(&self, body: BodyHandle) -> Option<Vec3>;

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), PhysicsError>;

    /// Teleports a dynamic body.
    fn set_translation(&mut self, body: BodyHandle, translation: Vec3)
    -> Result<(), PhysicsError>;

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError>;

    /// Whether the body rested on something during the last step.
    fn is_grounded(&self, body: BodyHandle) -> bool;

    fn body_count(&self) -> usize;
}
