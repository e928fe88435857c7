//! CPU-side mesh buffers handed to the renderer.

use glam::Vec3;
use serde::Serialize;

use crate::bands::BandTable;
use crate::heightfield::Heightfield;

/// Flat vertex streams plus a triangle list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bytes a renderer would allocate for these streams.
    pub fn byte_len(&self) -> usize {
        self.positions.len() * 3 * 4 * 3 + self.indices.len() * 4
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.colors.extend_from_slice(&other.colors);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

/// Two counter-clockwise (seen from +Y) triangles per grid cell.
pub fn grid_indices(n: usize) -> Vec<u32> {
    let quads = (n - 1) * (n - 1);
    let mut indices = Vec::with_capacity(quads * 6);
    for j in 0..(n - 1) {
        for i in 0..(n - 1) {
            let i0 = (j * n + i) as u32;
            let i1 = (j * n + (i + 1)) as u32;
            let i2 = ((j + 1) * n + i) as u32;
            let i3 = ((j + 1) * n + (i + 1)) as u32;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
    indices
}

/// Builds the coloured terrain surface for one island.
///
/// * `max_height`: peak height used to normalise band ratios.
/// * `sea_bottom`: when set, a flat layer at this height is added under the
///   surface with reversed winding so it faces down.
pub fn build_terrain_mesh(
    hf: &Heightfield,
    bands: &BandTable,
    max_height: f32,
    sea_bottom: Option<f32>,
) -> MeshData {
    let n = hf.resolution;
    let mut positions = Vec::with_capacity(n * n);
    let mut colors = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let p = hf.vertex_position(i, j);
            positions.push(p.to_array());
            colors.push(bands.classify_height(p.y, max_height).color_f32());
        }
    }

    let mut mesh = MeshData {
        positions,
        normals: hf.normals(),
        colors,
        indices: grid_indices(n),
    };

    if let Some(y) = sea_bottom {
        let flat = Heightfield::new(hf.size, n, vec![y; n * n]);
        let mut bottom = MeshData {
            positions: (0..n * n)
                .map(|k| flat.vertex_position(k % n, k / n).to_array())
                .collect(),
            normals: vec![[0.0, -1.0, 0.0]; n * n],
            colors: vec![[0.0, 0.0, 0.0]; n * n],
            indices: grid_indices(n),
        };
        for tri in bottom.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        mesh.append(&bottom);
    }

    mesh
}

/// Axis-aligned box centred on the origin, one flat-shaded quad per face.
pub fn box_mesh(half_extents: Vec3, color: [f32; 3]) -> MeshData {
    let h = half_extents;
    // (normal, tangent u, tangent v) with u × v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * h;
            mesh.positions.push(p.to_array());
            mesh.normals.push(normal.to_array());
            mesh.colors.push(color);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_two_triangles_per_cell() {
        let idx = grid_indices(4);
        assert_eq!(idx.len(), 3 * 3 * 6);
        assert!(idx.iter().all(|&i| i < 16));
    }

    #[test]
    fn grid_triangles_face_up() {
        let hf = Heightfield::new(3.0, 4, vec![0.0; 16]);
        let mesh = build_terrain_mesh(&hf, &BandTable::default(), 1.0, None);
        for tri in mesh.indices.chunks_exact(3) {
            let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
            let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
            let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn sea_bottom_doubles_vertices_and_faces_down() {
        let hf = Heightfield::new(3.0, 4, vec![0.5; 16]);
        let mesh = build_terrain_mesh(&hf, &BandTable::default(), 1.0, Some(-0.3));
        assert_eq!(mesh.vertex_count(), 32);
        assert_eq!(mesh.triangle_count(), 36);
        let tri = &mesh.indices[54..57];
        let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
        let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
        let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
        assert_eq!(a.y, -0.3);
        assert!((b - a).cross(c - a).y < 0.0);
    }

    #[test]
    fn box_faces_point_outward() {
        let mesh = box_mesh(Vec3::new(0.5, 0.5, 0.25), [1.0, 0.6, 0.0]);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for tri in mesh.indices.chunks_exact(3) {
            let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
            let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
            let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
            let n = Vec3::from_array(mesh.normals[tri[0] as usize]);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }
}
