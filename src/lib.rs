//! Procedural island archipelagos: fractal terrain shaped into islands, baked
//! into coloured meshes, and walked on by an embodied player.

pub mod app;
pub mod archipelago;
pub mod bands;
pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod heightfield;
pub mod island;
pub mod mesh;
pub mod noise;
pub mod physics;
pub mod player;
pub mod render;
pub mod water;

pub use app::{App, InputEvent};
pub use config::Config;
pub use error::{Error, Result};
