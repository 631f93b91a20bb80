//! Task for rebuilding the meshes of one section in a background thread.
//!
//! The task captures everything the build reads when it is created on the owning
//! thread: handles to the column's cell storage and to its loaded neighbours, the
//! section revision, and the block catalog. The worker only takes read guards.

use std::sync::Arc;

use log::debug;
use web_time::Instant;

use crate::engine_state::{
    rendering::{
        meshing::{MeshBuilder, SectionMeshes},
        RenderBackend,
    },
    task_management::task::{Task, TaskKey},
    voxels::{
        block::BlockCatalog,
        column::{ColumnNeighborhood, SectionId},
    },
    RuntimeContext,
};

/// A task that builds the meshes of one section.
///
/// Runs on the mesh service, whose load worker lends it its [`MeshBuilder`].
pub struct SectionMeshTask {
    /// The section being rebuilt
    section: SectionId,
    /// The section revision this rebuild was started for
    revision: u64,
    /// The column and its loaded neighbours at dispatch time
    neighborhood: ColumnNeighborhood,
    /// Block properties
    catalog: Arc<dyn BlockCatalog>,
    /// Set by `load`
    meshes: SectionMeshes,
}

impl SectionMeshTask {
    /// Creates a mesh task.
    ///
    /// # Arguments
    /// * `section` - Which section to rebuild
    /// * `revision` - Revision returned by [`Section::begin_rebuild`](crate::engine_state::voxels::column::Section::begin_rebuild)
    /// * `neighborhood` - Captured from the World on the owning thread
    /// * `catalog` - Shared block catalog
    pub fn new(
        section: SectionId,
        revision: u64,
        neighborhood: ColumnNeighborhood,
        catalog: Arc<dyn BlockCatalog>,
    ) -> Self {
        SectionMeshTask {
            section,
            revision,
            neighborhood,
            catalog,
            meshes: SectionMeshes::default(),
        }
    }
}

impl<R: RenderBackend + 'static> Task<RuntimeContext<R>, MeshBuilder> for SectionMeshTask {
    fn key(&self) -> TaskKey {
        TaskKey::SectionMesh(self.section)
    }

    fn load(&mut self, builder: &mut MeshBuilder) {
        let started = Instant::now();
        self.meshes = builder.build_section(
            self.neighborhood.center(),
            &self.neighborhood,
            self.section.index,
            self.catalog.as_ref(),
        );
        debug!(
            "Meshed {:?} revision {}: {} faces in {:?}",
            self.section,
            self.revision,
            self.meshes.face_count(),
            started.elapsed()
        );
    }

    fn complete(self: Box<Self>, context: &mut RuntimeContext<R>) {
        let SectionMeshTask {
            section,
            revision,
            neighborhood,
            meshes,
            ..
        } = *self;
        context.world.install_section_meshes(
            section,
            neighborhood.generation(),
            revision,
            meshes,
            true,
            &mut context.renderer,
        );
    }
}
