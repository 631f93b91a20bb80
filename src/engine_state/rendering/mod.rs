//! Rendering side of the runtime.
//!
//! The runtime does not own a GPU. It builds [`CompiledMesh`]es and hands them to a
//! [`RenderBackend`], which turns them into whatever resource it draws with and
//! gives back an opaque [`MeshHandle`]. Sections store only those handles.
//!
//! Backends are called exclusively from the owning thread: when a mesh job's
//! completion is drained, when an edit forces an immediate rebuild, and when a
//! column is unloaded.

use crate::engine_state::voxels::block::RenderPass;

use meshing::mesh::CompiledMesh;

pub mod meshing;
pub mod renderer;
pub mod tasks;
pub mod vertex;

pub use renderer::HeadlessRenderer;

/// Opaque identifier of a mesh owned by a [`RenderBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Receives compiled section meshes and releases them again.
pub trait RenderBackend {
    /// Takes ownership of `mesh` and creates the backend resource for it.
    fn create_mesh(&mut self, mesh: CompiledMesh, pass: RenderPass) -> MeshHandle;

    /// Destroys the resource behind `handle`. Unknown handles are ignored.
    fn release_mesh(&mut self, handle: MeshHandle);
}
