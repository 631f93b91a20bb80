//! Headless rendering backend.
//!
//! Keeps every installed mesh in memory instead of uploading it. Used by the
//! headless driver and by tests, which inspect what the runtime installed.

use std::collections::HashMap;

use log::{debug, warn};

use crate::engine_state::voxels::block::RenderPass;

use super::{meshing::mesh::CompiledMesh, MeshHandle, RenderBackend};

/// A [`RenderBackend`] that stores meshes in a map.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    meshes: HashMap<MeshHandle, (RenderPass, CompiledMesh)>,
    next_handle: u64,
    created: usize,
    released: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mesh behind `handle`, if it is still live.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&CompiledMesh> {
        self.meshes.get(&handle).map(|(_, mesh)| mesh)
    }

    /// The pass `handle` was created for.
    pub fn pass(&self, handle: MeshHandle) -> Option<RenderPass> {
        self.meshes.get(&handle).map(|(pass, _)| *pass)
    }

    pub fn live_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Meshes created since construction, including released ones.
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Quads across all live meshes.
    pub fn live_face_count(&self) -> usize {
        self.meshes.values().map(|(_, mesh)| mesh.face_count()).sum()
    }
}

impl RenderBackend for HeadlessRenderer {
    fn create_mesh(&mut self, mesh: CompiledMesh, pass: RenderPass) -> MeshHandle {
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.created += 1;

        debug!(
            "Created {:?} mesh {:?}: {} vertices, {} triangles",
            pass,
            handle,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.meshes.insert(handle, (pass, mesh));
        handle
    }

    fn release_mesh(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_some() {
            self.released += 1;
        } else {
            warn!("Release of unknown mesh {:?}", handle);
        }
    }
}
