//! Animated sea surface.

use std::f32::consts::TAU;

use crate::bands::Band;
use crate::config::WaterConfig;
use crate::mesh::{MeshData, grid_indices};

/// Square wave grid at sea level.  Animation rewrites vertex heights in place;
/// the buffers are sized once.
pub struct Water {
    cfg: WaterConfig,
    sea_level: f32,
    mesh: MeshData,
}

impl Water {
    pub fn new(cfg: WaterConfig, sea_level: f32) -> Self {
        let n = cfg.resolution;
        let step = cfg.size / (n as f32 - 1.0);
        let half = cfg.size * 0.5;
        let mut positions = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                positions.push([i as f32 * step - half, sea_level, j as f32 * step - half]);
            }
        }
        let mesh = MeshData {
            positions,
            normals: vec![[0.0, 1.0, 0.0]; n * n],
            colors: vec![Band::Water.color_f32(); n * n],
            indices: grid_indices(n),
        };
        Self {
            cfg,
            sea_level,
            mesh,
        }
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Analytic surface height at world `(x, z)` and time `t` seconds.
    pub fn height_at(&self, x: f32, z: f32, t: f32) -> f32 {
        let k = TAU / self.cfg.wavelength;
        let w = self.cfg.speed;
        self.sea_level + self.cfg.amplitude * (k * x + w * t).sin() * (k * z + w * t).cos()
    }

    /// Moves every vertex to the surface at time `t` and refreshes normals.
    pub fn animate(&mut self, t: f32) {
        let k = TAU / self.cfg.wavelength;
        let w = self.cfg.speed;
        let a = self.cfg.amplitude;
        for (p, n) in self.mesh.positions.iter_mut().zip(self.mesh.normals.iter_mut()) {
            let (x, z) = (p[0], p[2]);
            let (sx, cx) = (k * x + w * t).sin_cos();
            let (sz, cz) = (k * z + w * t).sin_cos();
            p[1] = self.sea_level + a * sx * cz;
            // analytic partial derivatives of the surface
            let dx = a * k * cx * cz;
            let dz = -a * k * sx * sz;
            let len = (dx * dx + 1.0 + dz * dz).sqrt();
            *n = [-dx / len, 1.0 / len, -dz / len];
        }
    }
}
