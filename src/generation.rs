use glam::Vec3;
use serde::Serialize;

use crate::config::TerrainConfig;
use crate::heightfield::Heightfield;
use crate::island::shape_height;
use crate::mesh::{MeshData, build_terrain_mesh};
use crate::noise::HeightSampler;

/// One generated landmass.
#[derive(Clone, Debug, Serialize)]
pub struct Island {
    pub seed: u32,
    /// World-space position of the patch centre (sea level at `y = 0`).
    pub offset: Vec3,
    pub config: TerrainConfig,
    pub heightfield: Heightfield,
    #[serde(skip)]
    pub mesh: MeshData,
}

impl Island {
    /// Terrain height under world `(x, z)`, `None` off this island's patch.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.heightfield
            .height_at(x - self.offset.x, z - self.offset.z)
            .map(|h| h + self.offset.y)
    }

    /// Downward ray against this island's triangles in world space.
    pub fn raycast_down(&self, x: f32, from_y: f32, z: f32) -> Option<f32> {
        self.heightfield
            .raycast_down(x - self.offset.x, from_y - self.offset.y, z - self.offset.z)
            .map(|h| h + self.offset.y)
    }

    /// Footprint box `(min, max)` in world space.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let h = self.heightfield.half_extent();
        let min = Vec3::new(-h, self.heightfield.min_height(), -h) + self.offset;
        let max = Vec3::new(h, self.heightfield.max_height(), h) + self.offset;
        (min, max)
    }

    /// Share of vertices above sea level.
    pub fn land_fraction(&self) -> f32 {
        let above = self
            .heightfield
            .heights
            .iter()
            .filter(|&&h| h > self.config.sea_level)
            .count();
        above as f32 / self.heightfield.heights.len() as f32
    }
}

/// Normalised `(nx, nz)` of every grid vertex, row-major, each in `[-0.5, 0.5]`.
pub fn patch_coords(cfg: &TerrainConfig) -> impl Iterator<Item = (f32, f32)> + use<> {
    let n = cfg.resolution;
    let step = cfg.cell_size();
    let half = cfg.size * 0.5;
    let size = cfg.size;
    (0..n).flat_map(move |j| {
        (0..n).map(move |i| ((i as f32 * step - half) / size, (j as f32 * step - half) / size))
    })
}

/// Samples the shaped heightfield for one patch without building a mesh.
pub fn generate_heightfield(cfg: &TerrainConfig, seed: u32) -> Heightfield {
    let sampler = HeightSampler::new(seed, cfg.noise);
    let heights = patch_coords(cfg)
        .map(|(nx, nz)| {
            let raw = sampler.sample(nx as f64, nz as f64);
            shape_height(raw, nx, nz, cfg)
        })
        .collect();
    Heightfield::new(cfg.size, cfg.resolution, heights)
}

/// Generates one island: heightfield, normals, band colours and index buffer.
pub fn generate_island(cfg: &TerrainConfig, seed: u32, offset: Vec3) -> Island {
    let heightfield = generate_heightfield(cfg, seed);
    let sea_bottom = cfg.sea_bottom_depth.map(|d| cfg.sea_level - d);
    let mesh = build_terrain_mesh(&heightfield, &cfg.bands, cfg.max_height, sea_bottom);
    log::debug!(
        "island seed={seed} size={} res={} peak={:.2} verts={}",
        cfg.size,
        cfg.resolution,
        heightfield.max_height(),
        mesh.vertex_count()
    );
    Island {
        seed,
        offset,
        config: cfg.clone(),
        heightfield,
        mesh,
    }
}
