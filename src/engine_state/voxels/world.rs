//! # World Module
//!
//! This module provides the `World` struct, the sparse map of loaded columns and the
//! single place that knows which coordinates are loaded, loading or failed.
//!
//! ## Architecture
//!
//! Columns are stored by value in a hash map keyed by [`ChunkCoord`]. Columns never
//! hold references to each other; every cross-column read goes back through the map
//! (the World implements [`ColumnSource`]), so unloading a column can never leave a
//! dangling neighbour.
//!
//! A coordinate is in at most one of three states: loaded, load pending, or failed.
//! Anything else is "not yet loaded", which is a valid, stable answer: reads there see
//! air with no light.
//!
//! ## Threading
//!
//! The World lives on the owning thread. Only the cell arrays of its columns are
//! shared with workers, as copy-on-write [`MtResource`] snapshots: an edit never
//! waits for a mesh job that is still reading the column.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use cgmath::Point3;
use log::{debug, info, warn};

use crate::core::MtResource;
use crate::engine_state::{
    error::ColumnLoadError,
    rendering::{meshing::SectionMeshes, RenderBackend},
    task_management::{task::TaskKey, AsyncLoadService},
    RuntimeContext,
};

use super::{
    block::{BlockTypeSize, RenderPass, AIR},
    column::{
        above_world_light, lighting, ChunkCoord, ColumnData, ColumnNeighborhood, ColumnSource,
        LightChannel, SectionId, VoxelColumn, COLUMN_HEIGHT, COLUMN_WIDTH, SECTION_HEIGHT,
    },
    tasks::column_load_task::ColumnLoadTask,
};

/// Result of moving the viewer, see [`World::update_viewer`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewerUpdate {
    /// Columns a load was requested for, nearest first
    pub requested: Vec<ChunkCoord>,
    /// Columns dropped for being out of range
    pub unloaded: Vec<ChunkCoord>,
}

/// The sparse map of loaded columns.
#[derive(Debug)]
pub struct World {
    root: PathBuf,
    columns: HashMap<ChunkCoord, VoxelColumn>,
    pending_loads: HashSet<ChunkCoord>,
    failed_loads: HashMap<ChunkCoord, ColumnLoadError>,
    next_generation: u64,
}

impl World {
    /// Creates an empty world reading column files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            columns: HashMap::new(),
            pending_loads: HashSet::new(),
            failed_loads: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Root directory of the column save tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded column at `coord`. Never blocks and never triggers a load.
    pub fn column_at(&self, coord: ChunkCoord) -> Option<&VoxelColumn> {
        self.columns.get(&coord)
    }

    pub fn column_at_mut(&mut self, coord: ChunkCoord) -> Option<&mut VoxelColumn> {
        self.columns.get_mut(&coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.columns.contains_key(&coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.columns.len()
    }

    /// Coordinates of every loaded column, in no particular order.
    pub fn loaded_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.columns.keys().copied()
    }

    pub fn is_load_pending(&self, coord: ChunkCoord) -> bool {
        self.pending_loads.contains(&coord)
    }

    /// The error the last load of `coord` failed with, if it failed.
    pub fn load_failure(&self, coord: ChunkCoord) -> Option<&ColumnLoadError> {
        self.failed_loads.get(&coord)
    }

    pub fn failed_count(&self) -> usize {
        self.failed_loads.len()
    }

    /// Asks `loader` to load `coord`.
    ///
    /// Does nothing for coordinates that are loaded, already loading, or whose last
    /// load failed (use [`retry_load`](Self::retry_load) for those). A job still in
    /// flight from a load that was cancelled by [`unload`](Self::unload) is adopted
    /// again instead of submitting a second one.
    ///
    /// # Returns
    /// `true` if the coordinate is now loading.
    pub fn request_load<R: RenderBackend + 'static>(
        &mut self,
        coord: ChunkCoord,
        loader: &mut AsyncLoadService<RuntimeContext<R>>,
    ) -> bool {
        if self.columns.contains_key(&coord)
            || self.pending_loads.contains(&coord)
            || self.failed_loads.contains_key(&coord)
        {
            return false;
        }

        if loader.is_in_flight(&TaskKey::ColumnLoad(coord)) {
            debug!("Re-adopting in-flight load of column {}", coord);
            self.pending_loads.insert(coord);
            return true;
        }
        if !loader.submit(Box::new(ColumnLoadTask::new(&self.root, coord))) {
            return false;
        }
        debug!("Requested load of column {}", coord);
        self.pending_loads.insert(coord);
        true
    }

    /// Forgets a recorded failure for `coord` and requests the load again.
    pub fn retry_load<R: RenderBackend + 'static>(
        &mut self,
        coord: ChunkCoord,
        loader: &mut AsyncLoadService<RuntimeContext<R>>,
    ) -> bool {
        self.failed_loads.remove(&coord);
        self.request_load(coord, loader)
    }

    /// Applies the outcome of a load job. Called from the job's completion.
    ///
    /// Results for coordinates that are no longer pending (unloaded meanwhile) are
    /// dropped.
    ///
    /// # Returns
    /// `true` if a column was registered.
    pub fn finish_load(&mut self, coord: ChunkCoord, result: Result<ColumnData, ColumnLoadError>) -> bool {
        if !self.pending_loads.remove(&coord) {
            debug!("Discarding load result for cancelled column {}", coord);
            return false;
        }

        match result {
            Ok(data) => {
                if self.insert_column(data).is_some() {
                    warn!("Load of column {} replaced a loaded column", coord);
                }
                true
            }
            Err(err) => {
                warn!("Failed to load column {}: {}", coord, err);
                self.failed_loads.insert(coord, err);
                false
            }
        }
    }

    /// Registers a column, replacing any column at the same coordinate.
    ///
    /// All of its sections start dirty, and so do those of its loaded neighbours,
    /// whose boundary faces may now be hidden.
    ///
    /// # Returns
    /// The replaced column. Its meshes are still live; release them with
    /// [`VoxelColumn::release`].
    pub fn insert_column(&mut self, data: ColumnData) -> Option<VoxelColumn> {
        let coord = data.coord();
        let mut column = VoxelColumn::new(data, self.next_generation);
        self.next_generation += 1;
        column.mark_all_dirty();

        self.pending_loads.remove(&coord);
        self.failed_loads.remove(&coord);
        let replaced = self.columns.insert(coord, column);
        self.mark_neighbors_dirty(coord);
        debug!("Registered column {}", coord);
        replaced
    }

    /// Drops the column at `coord`, cancels a pending load for it and forgets a
    /// recorded load failure, so the coordinate is loaded afresh when next wanted.
    ///
    /// Releases the backend meshes of its sections. Mesh jobs already in flight keep
    /// their own handles to the cell data, and their results are discarded when they
    /// complete.
    ///
    /// # Returns
    /// `true` if there was a column or a pending load to drop.
    pub fn unload(&mut self, coord: ChunkCoord, renderer: &mut dyn RenderBackend) -> bool {
        self.failed_loads.remove(&coord);
        let cancelled = self.pending_loads.remove(&coord);
        let Some(mut column) = self.columns.remove(&coord) else {
            return cancelled;
        };

        column.release(renderer);
        self.mark_neighbors_dirty(coord);
        debug!("Unloaded column {}", coord);
        true
    }

    /// Loads every column within `view_radius` of `center`, nearest first, and
    /// unloads loaded or pending columns farther than `unload_radius`. Failures
    /// recorded farther than `unload_radius` are forgotten.
    pub fn update_viewer<R: RenderBackend + 'static>(
        &mut self,
        center: ChunkCoord,
        view_radius: i32,
        unload_radius: i32,
        loader: &mut AsyncLoadService<RuntimeContext<R>>,
        renderer: &mut dyn RenderBackend,
    ) -> ViewerUpdate {
        let unload_radius = unload_radius.max(view_radius).max(0) as u32;
        let mut update = ViewerUpdate::default();

        let mut far: Vec<ChunkCoord> = self
            .columns
            .keys()
            .chain(self.pending_loads.iter())
            .copied()
            .filter(|coord| coord.distance(center) > unload_radius)
            .collect();
        far.sort_unstable();
        far.dedup();
        for coord in far {
            if self.unload(coord, renderer) {
                update.unloaded.push(coord);
            }
        }
        self.failed_loads
            .retain(|coord, _| coord.distance(center) <= unload_radius);

        let radius = view_radius.max(0);
        let mut wanted: Vec<ChunkCoord> = (-radius..=radius)
            .flat_map(|dx| (-radius..=radius).map(move |dz| (dx, dz)))
            .filter_map(|(dx, dz)| center.offset(dx, dz))
            .collect();
        wanted.sort_by_key(|coord| {
            let (dx, dz) = (
                i64::from(coord.x) - i64::from(center.x),
                i64::from(coord.z) - i64::from(center.z),
            );
            (dx * dx + dz * dz, *coord)
        });
        for coord in wanted {
            if self.request_load(coord, loader) {
                update.requested.push(coord);
            }
        }

        if !update.requested.is_empty() || !update.unloaded.is_empty() {
            info!(
                "Viewer at column {}: {} loads requested, {} columns unloaded",
                center,
                update.requested.len(),
                update.unloaded.len()
            );
        }
        update
    }

    /// Writes a block at world position `pos`.
    ///
    /// Clearing a cell to air applies the one-step relight rule there. The owning
    /// section is marked dirty, and so are sections across any boundary the cell
    /// touches, in this column or in loaded neighbours.
    ///
    /// # Returns
    /// The section that owns the cell, or `None` if its column is not loaded or `y` is
    /// outside the world.
    pub fn set_block_type(&mut self, pos: Point3<i32>, block: BlockTypeSize) -> Option<SectionId> {
        if !(0..COLUMN_HEIGHT as i32).contains(&pos.y) {
            return None;
        }
        let coord = ChunkCoord::containing(pos.x, pos.z);
        let width = COLUMN_WIDTH as i32;
        let (x, y, z) = (
            pos.x.rem_euclid(width) as usize,
            pos.y as usize,
            pos.z.rem_euclid(width) as usize,
        );

        self.columns
            .get_mut(&coord)?
            .data_mut()
            .set_local_block_type(x, y, z, block);
        let relit = match (block, self.columns.get(&coord)) {
            (AIR, Some(column)) => lighting::relight_cleared_cell(column.data().get(), &*self, x, y, z),
            _ => None,
        };

        let column = self.columns.get_mut(&coord)?;
        if let Some(level) = relit {
            column
                .data_mut()
                .set_local_light(LightChannel::Block, x, y, z, level);
            debug!("Relit cleared cell {:?} to {}", pos, level);
        }
        let neighbors = column.mark_edit_dirty(x, y, z);
        for id in neighbors {
            if let Some(section) = self
                .columns
                .get_mut(&id.column)
                .and_then(|neighbor| neighbor.section_mut(id.index))
            {
                section.mark_dirty();
            }
        }

        Some(SectionId::new(coord, y / SECTION_HEIGHT))
    }

    /// Block at world position `pos`. Unloaded or out-of-world cells read as air.
    pub fn block_type_at(&self, pos: Point3<i32>) -> BlockTypeSize {
        let coord = ChunkCoord::containing(pos.x, pos.z);
        let width = COLUMN_WIDTH as i32;
        self.columns.get(&coord).map_or(AIR, |column| {
            column.block_type_at(self, pos.x.rem_euclid(width), pos.y, pos.z.rem_euclid(width))
        })
    }

    /// Light at world position `pos`, with the same rules as
    /// [`ColumnData::light_at`]. Above the world reads the same whether the column is
    /// loaded or not. Other cells of unloaded columns read 0.
    pub fn light_at(&self, channel: LightChannel, pos: Point3<i32>) -> u8 {
        if pos.y >= COLUMN_HEIGHT as i32 {
            return above_world_light(channel);
        }
        let coord = ChunkCoord::containing(pos.x, pos.z);
        let width = COLUMN_WIDTH as i32;
        self.columns.get(&coord).map_or(0, |column| {
            column.light_at(channel, self, pos.x.rem_euclid(width), pos.y, pos.z.rem_euclid(width))
        })
    }

    /// Sections that wait for a rebuild and have no job in flight.
    pub fn dirty_sections(&self) -> Vec<SectionId> {
        let mut dirty: Vec<SectionId> = self
            .columns
            .values()
            .flat_map(VoxelColumn::dirty_sections)
            .collect();
        dirty.sort_unstable();
        dirty
    }

    /// Whether any section waits for a rebuild or has one in flight.
    pub fn has_pending_rebuilds(&self) -> bool {
        self.columns
            .values()
            .flat_map(|column| column.sections().iter())
            .any(|section| section.is_dirty() || section.is_building())
    }

    /// Captures what a mesh job for a section of `coord` needs to read.
    pub fn neighborhood(&self, coord: ChunkCoord) -> Option<ColumnNeighborhood> {
        self.columns
            .get(&coord)
            .map(|column| ColumnNeighborhood::capture(column, self))
    }

    /// Installs rebuilt meshes into a section.
    ///
    /// The result is dropped when the section's column is gone, was replaced by a
    /// fresh load since the job started (its generation differs), or the section has
    /// since installed a newer revision. Meshes built from a snapshot that an edit
    /// has since overtaken may still be shown; the edit left the section dirty, so
    /// it is rebuilt again.
    ///
    /// # Arguments
    /// * `id` - The section the meshes were built for
    /// * `generation` - Generation of the column the meshes were built from
    /// * `revision` - The section revision the rebuild was started for
    /// * `meshes` - The rebuild output; moved into `renderer` when installed
    /// * `from_job` - Whether this completes a background job for the section
    ///
    /// # Returns
    /// `true` if the meshes were installed.
    pub fn install_section_meshes(
        &mut self,
        id: SectionId,
        generation: u64,
        revision: u64,
        meshes: SectionMeshes,
        from_job: bool,
        renderer: &mut dyn RenderBackend,
    ) -> bool {
        let Some(column) = self.columns.get_mut(&id.column) else {
            debug!("Discarding meshes for unloaded column {}", id.column);
            return false;
        };
        if column.generation() != generation {
            debug!("Discarding meshes built from replaced column {}", id.column);
            return false;
        }
        let Some(section) = column.section_mut(id.index) else {
            return false;
        };
        if from_job {
            section.finish_job();
        }
        if section.is_stale(revision) {
            debug!("Discarding stale meshes for {:?} (revision {})", id, revision);
            return false;
        }

        let opaque = meshes
            .opaque
            .map(|mesh| renderer.create_mesh(mesh, RenderPass::Opaque));
        let translucent = meshes
            .translucent
            .map(|mesh| renderer.create_mesh(mesh, RenderPass::Translucent));
        section.install(revision, opaque, translucent, renderer)
    }

    fn mark_neighbors_dirty(&mut self, coord: ChunkCoord) {
        for neighbor in coord.neighbors() {
            if let Some(column) = self.columns.get_mut(&neighbor) {
                column.mark_all_dirty();
            }
        }
    }
}

impl ColumnSource for World {
    fn column_data(&self, coord: ChunkCoord) -> Option<&MtResource<ColumnData>> {
        self.columns.get(&coord).map(VoxelColumn::data)
    }
}
