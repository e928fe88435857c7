//! Square height grid centred on its patch origin.

use glam::Vec3;
use serde::Serialize;

/// Row-major grid: `heights[j * resolution + i]`, `i` along +X and `j` along +Z.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Heightfield {
    /// Edge length in world units.
    pub size: f32,
    /// Samples per edge.
    pub resolution: usize,
    pub heights: Vec<f32>,
}

impl Heightfield {
    pub fn new(size: f32, resolution: usize, heights: Vec<f32>) -> Self {
        assert_eq!(heights.len(), resolution * resolution);
        Self {
            size,
            resolution,
            heights,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.size / (self.resolution as f32 - 1.0)
    }

    pub fn half_extent(&self) -> f32 {
        self.size * 0.5
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.heights[j * self.resolution + i]
    }

    /// Local (patch-relative) position of grid vertex `(i, j)`.
    pub fn vertex_position(&self, i: usize, j: usize) -> Vec3 {
        let step = self.cell_size();
        Vec3::new(
            i as f32 * step - self.half_extent(),
            self.get(i, j),
            j as f32 * step - self.half_extent(),
        )
    }

    pub fn min_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Whether local `(x, z)` lies over the grid.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let h = self.half_extent();
        (-h..=h).contains(&x) && (-h..=h).contains(&z)
    }

    /// Surface height at local `(x, z)`, following the same two-triangle split
    /// per cell as the mesh index buffer.  `None` outside the grid.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if !self.contains(x, z) {
            return None;
        }
        let n = self.resolution;
        let step = self.cell_size();
        let gx = (x + self.half_extent()) / step;
        let gz = (z + self.half_extent()) / step;
        let i = (gx.floor() as usize).min(n - 2);
        let j = (gz.floor() as usize).min(n - 2);
        let tx = (gx - i as f32).clamp(0.0, 1.0);
        let tz = (gz - j as f32).clamp(0.0, 1.0);

        let h00 = self.get(i, j);
        let h10 = self.get(i + 1, j);
        let h01 = self.get(i, j + 1);
        let h11 = self.get(i + 1, j + 1);

        // Cells are split along the (i+1, j)–(i, j+1) diagonal.
        let h = if tx + tz <= 1.0 {
            h00 + tx * (h10 - h00) + tz * (h01 - h00)
        } else {
            h11 + (1.0 - tx) * (h01 - h11) + (1.0 - tz) * (h10 - h11)
        };
        Some(h)
    }

    /// Casts a ray straight down from local `(x, from_y, z)` and returns the hit
    /// height, or `None` if the ray misses the grid or starts below the surface.
    pub fn raycast_down(&self, x: f32, from_y: f32, z: f32) -> Option<f32> {
        self.height_at(x, z).filter(|&h| h <= from_y)
    }

    /// Per-vertex normals by central differences (clamped at the border).
    pub fn normals(&self) -> Vec<[f32; 3]> {
        let n = self.resolution;
        let step = self.cell_size();
        let idx = |i: isize, j: isize| -> f32 {
            let ii = i.clamp(0, (n - 1) as isize) as usize;
            let jj = j.clamp(0, (n - 1) as isize) as usize;
            self.get(ii, jj)
        };
        let mut out = Vec::with_capacity(n * n);
        for j in 0..n as isize {
            for i in 0..n as isize {
                let sx = (idx(i + 1, j) - idx(i - 1, j)) / (2.0 * step);
                let sz = (idx(i, j + 1) - idx(i, j - 1)) / (2.0 * step);
                let nrm = Vec3::new(-sx, 1.0, -sz).normalize();
                out.push(nrm.to_array());
            }
        }
        out
    }
}
