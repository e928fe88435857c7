//! Renderer seam.
//!
//! The simulation needs three things from a renderer: put a mesh on the GPU,
//! move it, and draw a frame.  [`HeadlessRenderer`] implements the trait with
//! bookkeeping only, so the loop runs in tests and from the CLI.

use std::collections::BTreeMap;

use glam::Mat4;
use thiserror::Error;

use crate::camera::Camera;
use crate::mesh::MeshData;
use crate::physics::Transform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown mesh {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("mesh {0:?} has no vertices")]
    EmptyMesh(&'static str),
}

pub trait Renderer {
    fn upload_mesh(&mut self, mesh: &MeshData, label: &'static str) -> Result<MeshHandle, RenderError>;

    /// Replaces the vertex data of an existing mesh in place.
    fn update_mesh(&mut self, handle: MeshHandle, mesh: &MeshData) -> Result<(), RenderError>;

    /// Frees every buffer owned by the mesh.
    fn release_mesh(&mut self, handle: MeshHandle) -> Result<(), RenderError>;

    fn set_transform(&mut self, handle: MeshHandle, transform: Transform) -> Result<(), RenderError>;

    /// Submits exactly one frame.
    fn draw(&mut self, camera: &Camera);
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshRecord {
    pub label: &'static str,
    pub vertex_count: usize,
    pub index_count: usize,
    pub bytes: usize,
    pub transform: Transform,
}

#[derive(Default)]
pub struct HeadlessRenderer {
    meshes: BTreeMap<MeshHandle, MeshRecord>,
    next_id: u32,
    frames: u64,
    uploads: u64,
    releases: u64,
    last_view_proj: Option<Mat4>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_bytes(&self) -> usize {
        self.meshes.values().map(|m| m.bytes).sum()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// View-projection matrix of the most recent frame.
    pub fn last_view_proj(&self) -> Option<Mat4> {
        self.last_view_proj
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshRecord> {
        self.meshes.get(&handle)
    }

    pub fn count_labelled(&self, label: &str) -> usize {
        self.meshes.values().filter(|m| m.label == label).count()
    }
}

impl Renderer for HeadlessRenderer {
    fn upload_mesh(&mut self, mesh: &MeshData, label: &'static str) -> Result<MeshHandle, RenderError> {
        if mesh.vertex_count() == 0 {
            return Err(RenderError::EmptyMesh(label));
        }
        self.next_id += 1;
        let handle = MeshHandle(self.next_id);
        self.meshes.insert(
            handle,
            MeshRecord {
                label,
                vertex_count: mesh.vertex_count(),
                index_count: mesh.indices.len(),
                bytes: mesh.byte_len(),
                transform: Transform::IDENTITY,
            },
        );
        self.uploads += 1;
        log::trace!("upload {label} as {handle:?} ({} bytes)", mesh.byte_len());
        Ok(handle)
    }

    fn update_mesh(&mut self, handle: MeshHandle, mesh: &MeshData) -> Result<(), RenderError> {
        let record = self
            .meshes
            .get_mut(&handle)
            .ok_or(RenderError::UnknownMesh(handle))?;
        record.vertex_count = mesh.vertex_count();
        record.index_count = mesh.indices.len();
        record.bytes = mesh.byte_len();
        Ok(())
    }

    fn release_mesh(&mut self, handle: MeshHandle) -> Result<(), RenderError> {
        self.meshes
            .remove(&handle)
            .ok_or(RenderError::UnknownMesh(handle))?;
        self.releases += 1;
        Ok(())
    }

    fn set_transform(&mut self, handle: MeshHandle, transform: Transform) -> Result<(), RenderError> {
        let record = self
            .meshes
            .get_mut(&handle)
            .ok_or(RenderError::UnknownMesh(handle))?;
        record.transform = transform;
        Ok(())
    }

    fn draw(&mut self, camera: &Camera) {
        self.last_view_proj = Some(camera.view_proj());
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::box_mesh;
    use glam::Vec3;

    #[test]
    fn upload_release_bookkeeping() {
        let mut r = HeadlessRenderer::new();
        let mesh = box_mesh(Vec3::ONE, [1.0, 0.0, 0.0]);
        let a = r.upload_mesh(&mesh, "box").unwrap();
        let b = r.upload_mesh(&mesh, "box").unwrap();
        assert_ne!(a, b);
        assert_eq!(r.live_meshes(), 2);
        assert_eq!(r.live_bytes(), 2 * mesh.byte_len());
        r.release_mesh(a).unwrap();
        assert_eq!(r.live_meshes(), 1);
        assert_eq!(r.release_mesh(a), Err(RenderError::UnknownMesh(a)));
        assert_eq!(
            r.set_transform(a, Transform::IDENTITY),
            Err(RenderError::UnknownMesh(a))
        );
    }

    #[test]
    fn empty_mesh_rejected() {
        let mut r = HeadlessRenderer::new();
        assert_eq!(
            r.upload_mesh(&MeshData::default(), "nothing"),
            Err(RenderError::EmptyMesh("nothing"))
        );
        assert_eq!(r.live_meshes(), 0);
    }
}
