//! # Section Module
//!
//! A `Section` is the render-side view of one 16-layer horizontal slice of a column.
//! It owns the backend handles of at most one opaque and one translucent mesh and
//! tracks whether those meshes still match the column's block data.
//!
//! ## Lifecycle
//!
//! ```text
//! Unbuilt --mark_dirty--> dirty --begin_rebuild--> building --install--> Meshed / Empty
//!    ^                                                                       |
//!    +------------------------- release (column unload) <--------------------+
//! ```
//!
//! Every `mark_dirty` bumps a revision counter. A rebuild is tagged with the revision
//! it was started for, and `install` refuses results that are older than what the
//! section already shows. This is what lets a synchronous edit rebuild overtake a mesh
//! job that was already in flight.

use std::ops::Range;

use crate::engine_state::rendering::{MeshHandle, RenderBackend};

use super::{COLUMN_HEIGHT, SECTIONS_PER_COLUMN, SECTION_HEIGHT};

/// Coarse state of a section, mostly for diagnostics and tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SectionState {
    /// No mesh has ever been installed.
    Unbuilt,
    /// The last rebuild produced no faces.
    Empty,
    /// At least one of the two passes has a mesh.
    Meshed,
}

/// Render state of one horizontal slice of a column.
#[derive(Debug)]
pub struct Section {
    index: usize,
    dirty: bool,
    building: bool,
    revision: u64,
    built_revision: Option<u64>,
    opaque: Option<MeshHandle>,
    translucent: Option<MeshHandle>,
}

impl Section {
    /// Creates an unbuilt, clean section.
    ///
    /// # Arguments
    /// * `index` - Position of the section in its column, `0` is the bottom
    pub fn new(index: usize) -> Self {
        debug_assert!(index < SECTIONS_PER_COLUMN);
        Self {
            index,
            dirty: false,
            building: false,
            revision: 0,
            built_revision: None,
            opaque: None,
            translucent: None,
        }
    }

    /// Position of the section in its column.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The half-open range of world y covered by this section.
    pub fn y_range(&self) -> Range<i32> {
        let bottom = (self.index * SECTION_HEIGHT) as i32;
        bottom..(bottom + SECTION_HEIGHT as i32).min(COLUMN_HEIGHT as i32)
    }

    /// Flags the section for regeneration.
    ///
    /// Marking an already dirty section again does not queue a second rebuild.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Whether the section waits for a rebuild.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a background rebuild for this section is in flight.
    pub fn is_building(&self) -> bool {
        self.building
    }

    /// Current revision. Increases on every `mark_dirty`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Claims the section for a background rebuild.
    ///
    /// # Returns
    /// The revision the rebuild must be tagged with, or `None` if the section is
    /// clean or already being rebuilt.
    pub fn begin_rebuild(&mut self) -> Option<u64> {
        if !self.dirty || self.building {
            return None;
        }
        self.dirty = false;
        self.building = true;
        Some(self.revision)
    }

    /// Returns a claimed section to the dirty set after its job could not be queued.
    pub fn abort_rebuild(&mut self) {
        self.building = false;
        self.dirty = true;
    }

    /// Claims the section for a rebuild done right now on the owning thread.
    ///
    /// Unlike [`begin_rebuild`](Self::begin_rebuild) this ignores an in-flight job;
    /// that job's result becomes stale once this rebuild is installed.
    pub fn begin_synchronous_rebuild(&mut self) -> u64 {
        self.dirty = false;
        self.revision
    }

    /// Records that the background job for this section has returned.
    pub fn finish_job(&mut self) {
        self.building = false;
    }

    /// Whether a result built for `revision` is older than what is installed.
    pub fn is_stale(&self, revision: u64) -> bool {
        self.built_revision.is_some_and(|built| built >= revision)
    }

    /// Replaces the section's meshes, releasing the previous handles.
    ///
    /// # Returns
    /// `false` (and releases the new handles instead) if the result is stale.
    pub fn install(
        &mut self,
        revision: u64,
        opaque: Option<MeshHandle>,
        translucent: Option<MeshHandle>,
        renderer: &mut dyn RenderBackend,
    ) -> bool {
        if self.is_stale(revision) {
            opaque.into_iter().chain(translucent).for_each(|handle| renderer.release_mesh(handle));
            return false;
        }

        self.release_meshes(renderer);
        self.opaque = opaque;
        self.translucent = translucent;
        self.built_revision = Some(revision);
        true
    }

    /// Releases the section's backend meshes. Used on column unload.
    pub fn release(&mut self, renderer: &mut dyn RenderBackend) {
        self.release_meshes(renderer);
        self.built_revision = None;
    }

    fn release_meshes(&mut self, renderer: &mut dyn RenderBackend) {
        if let Some(handle) = self.opaque.take() {
            renderer.release_mesh(handle);
        }
        if let Some(handle) = self.translucent.take() {
            renderer.release_mesh(handle);
        }
    }

    /// Handle of the opaque-pass mesh, if any.
    pub fn opaque_mesh(&self) -> Option<MeshHandle> {
        self.opaque
    }

    /// Handle of the translucent-pass mesh, if any.
    pub fn translucent_mesh(&self) -> Option<MeshHandle> {
        self.translucent
    }

    pub fn state(&self) -> SectionState {
        match (self.built_revision, self.opaque, self.translucent) {
            (None, _, _) => SectionState::Unbuilt,
            (Some(_), None, None) => SectionState::Empty,
            _ => SectionState::Meshed,
        }
    }
}
