//! # Engine State Module
//!
//! The runtime that owns the world and drives its two background services.
//!
//! ## Key Components
//!
//! * `EngineState` - The owning-thread runtime: world, renderer, services, viewer
//! * `config` - Start-up settings read from JSON
//! * `error` - Error types shared by the subsystems
//! * `rendering` - Backend seam, mesh building and the mesh job
//! * `task_management` - The load / post-process / complete pipeline
//! * `voxels` - Columns, sections, the world map and column files
//!
//! ## Frame Model
//!
//! Everything that touches the world happens on the thread that constructed the
//! `EngineState`. Each [`EngineState::frame`] call:
//!
//! 1. moves the load window to the viewer, requesting and unloading columns
//! 2. drains finished column loads, registering their columns
//! 3. drains finished mesh jobs, installing their meshes into the renderer
//! 4. dispatches rebuilds for dirty sections, up to the per-frame limit
//!
//! Block edits bypass the queue: [`EngineState::set_block`] rebuilds the edited
//! section before it returns.

use std::{sync::Arc, thread, time::Duration};

use cgmath::Point3;
use log::{debug, info};
use web_time::Instant;

use config::EngineConfig;
use error::EngineError;
use rendering::{
    meshing::{MeshBuilder, SectionMeshes},
    tasks::section_mesh_task::SectionMeshTask,
    HeadlessRenderer, RenderBackend,
};
use task_management::AsyncLoadService;
use voxels::{
    block::{BlockCatalog, BlockTypeSize},
    column::{ChunkCoord, ColumnData, Section, SectionId},
    world::World,
};

pub mod config;
pub mod error;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// What job completions get to mutate.
pub struct RuntimeContext<R> {
    pub world: World,
    pub renderer: R,
}

/// Counters for one [`EngineState::frame`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Column loads requested for the viewer
    pub loads_requested: usize,
    /// Columns dropped for being out of range
    pub columns_unloaded: usize,
    /// Load jobs drained, successful or not
    pub loads_completed: usize,
    /// Mesh jobs drained, installed or discarded
    pub meshes_completed: usize,
    /// Mesh jobs queued
    pub meshes_dispatched: usize,
    /// Sections with no blocks, installed empty without a job
    pub sections_emptied: usize,
}

/// The owning-thread runtime.
///
/// # Type Parameters
/// - `R`: The rendering backend meshes are handed to
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use voxel_runtime::engine_state::{config::EngineConfig, EngineState};
/// use voxel_runtime::engine_state::rendering::HeadlessRenderer;
/// use voxel_runtime::engine_state::voxels::block::ClassicBlockCatalog;
///
/// let mut engine = EngineState::new(
///     EngineConfig::default(),
///     Arc::new(ClassicBlockCatalog::new()),
///     HeadlessRenderer::new(),
/// )?;
/// engine.set_viewer_position(cgmath::Point3::new(0.0, 64.0, 0.0));
/// loop {
///     engine.frame();
/// }
/// # Ok::<(), voxel_runtime::engine_state::error::EngineError>(())
/// ```
pub struct EngineState<R: RenderBackend + 'static = HeadlessRenderer> {
    config: EngineConfig,
    context: RuntimeContext<R>,
    column_loader: AsyncLoadService<RuntimeContext<R>>,
    mesh_service: AsyncLoadService<RuntimeContext<R>, MeshBuilder>,
    /// Builder for synchronous rebuilds on the owning thread
    edit_mesher: MeshBuilder,
    catalog: Arc<dyn BlockCatalog>,
    viewer_column: Option<ChunkCoord>,
}

impl<R: RenderBackend + 'static> EngineState<R> {
    /// Creates the world and starts both background services.
    ///
    /// The calling thread becomes the owning thread.
    ///
    /// # Errors
    /// [`EngineError::Spawn`] if a worker thread cannot be started.
    pub fn new(config: EngineConfig, catalog: Arc<dyn BlockCatalog>, renderer: R) -> Result<Self, EngineError> {
        let column_loader = AsyncLoadService::new("column-loader", ())?;
        let mesh_service = AsyncLoadService::new("section-mesher", MeshBuilder::new())?;
        let world = World::new(config.world_dir.clone());

        info!(
            "Engine started for {} (view radius {})",
            config.world_dir.display(),
            config.load_radius()
        );

        Ok(Self {
            config,
            context: RuntimeContext { world, renderer },
            column_loader,
            mesh_service,
            edit_mesher: MeshBuilder::new(),
            catalog,
            viewer_column: None,
        })
    }

    pub fn world(&self) -> &World {
        &self.context.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.context.world
    }

    pub fn renderer(&self) -> &R {
        &self.context.renderer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Moves the viewer. The load window follows on the next [`frame`](Self::frame).
    pub fn set_viewer_position(&mut self, position: Point3<f32>) {
        let column = ChunkCoord::containing(position.x.floor() as i32, position.z.floor() as i32);
        if self.viewer_column != Some(column) {
            debug!("Viewer entered column {}", column);
        }
        self.viewer_column = Some(column);
    }

    /// Stops following a viewer; loaded columns stay loaded.
    pub fn clear_viewer(&mut self) {
        self.viewer_column = None;
    }

    /// See [`World::request_load`].
    pub fn request_load(&mut self, coord: ChunkCoord) -> bool {
        self.context.world.request_load(coord, &mut self.column_loader)
    }

    /// See [`World::retry_load`].
    pub fn retry_load(&mut self, coord: ChunkCoord) -> bool {
        self.context.world.retry_load(coord, &mut self.column_loader)
    }

    /// See [`World::unload`].
    pub fn unload(&mut self, coord: ChunkCoord) -> bool {
        self.context.world.unload(coord, &mut self.context.renderer)
    }

    /// Registers a column built in memory, releasing the meshes of any column it
    /// replaces.
    pub fn insert_column(&mut self, data: ColumnData) {
        if let Some(mut replaced) = self.context.world.insert_column(data) {
            replaced.release(&mut self.context.renderer);
        }
    }

    /// Writes a block at world position `pos` and rebuilds the edited section
    /// before returning. Sections the edit dirtied across boundaries are rebuilt in
    /// the background.
    ///
    /// # Returns
    /// The edited section, or `None` if nothing was written.
    pub fn set_block(&mut self, pos: Point3<i32>, block: BlockTypeSize) -> Option<SectionId> {
        let id = self.context.world.set_block_type(pos, block)?;
        self.rebuild_section_now(id);
        Some(id)
    }

    /// Rebuilds one section on this thread with the engine's own builder.
    ///
    /// Any job in flight for the section becomes stale.
    ///
    /// # Returns
    /// `true` if new meshes were installed; `false` if the column is not loaded or
    /// the section already shows its current revision.
    pub fn rebuild_section_now(&mut self, id: SectionId) -> bool {
        let world = &mut self.context.world;
        let Some(neighborhood) = world.neighborhood(id.column) else {
            return false;
        };
        let Some(revision) = world
            .column_at_mut(id.column)
            .and_then(|column| column.section_mut(id.index))
            .map(Section::begin_synchronous_rebuild)
        else {
            return false;
        };

        let meshes = self.edit_mesher.build_section(
            neighborhood.center(),
            &neighborhood,
            id.index,
            self.catalog.as_ref(),
        );
        world.install_section_meshes(
            id,
            neighborhood.generation(),
            revision,
            meshes,
            false,
            &mut self.context.renderer,
        )
    }

    /// Runs one frame on the owning thread. Never waits for the workers.
    pub fn frame(&mut self) -> FrameStats {
        let mut stats = FrameStats::default();

        if let Some(center) = self.viewer_column {
            let update = self.context.world.update_viewer(
                center,
                self.config.load_radius(),
                self.config.unload_radius(),
                &mut self.column_loader,
                &mut self.context.renderer,
            );
            stats.loads_requested = update.requested.len();
            stats.columns_unloaded = update.unloaded.len();
        }

        stats.loads_completed = self.column_loader.drain_completed(&mut self.context);
        stats.meshes_completed = self.mesh_service.drain_completed(&mut self.context);
        self.dispatch_rebuilds(&mut stats);

        stats
    }

    fn dispatch_rebuilds(&mut self, stats: &mut FrameStats) {
        let budget = self.config.max_mesh_dispatch_per_frame;
        let world = &mut self.context.world;

        for id in world.dirty_sections() {
            if stats.meshes_dispatched >= budget {
                break;
            }

            let Some(column) = world.column_at_mut(id.column) else {
                continue;
            };
            let generation = column.generation();
            let empty = column.data().get().is_section_empty(id.index);
            let Some(revision) = column.section_mut(id.index).and_then(Section::begin_rebuild) else {
                continue;
            };

            if empty {
                world.install_section_meshes(
                    id,
                    generation,
                    revision,
                    SectionMeshes::default(),
                    true,
                    &mut self.context.renderer,
                );
                stats.sections_emptied += 1;
                continue;
            }

            let queued = world.neighborhood(id.column).is_some_and(|neighborhood| {
                let task = SectionMeshTask::new(id, revision, neighborhood, Arc::clone(&self.catalog));
                self.mesh_service.submit(Box::new(task))
            });
            if queued {
                stats.meshes_dispatched += 1;
            } else if let Some(section) = world
                .column_at_mut(id.column)
                .and_then(|column| column.section_mut(id.index))
            {
                section.abort_rebuild();
            }
        }
    }

    /// Whether no load or mesh job is in flight and no section waits for a rebuild.
    pub fn is_idle(&self) -> bool {
        self.column_loader.in_flight_count() == 0
            && self.mesh_service.in_flight_count() == 0
            && !self.context.world.has_pending_rebuilds()
    }

    /// Runs frames until [`is_idle`](Self::is_idle) or `timeout` passes.
    ///
    /// # Returns
    /// `true` if the engine became idle in time.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            self.frame();
            if self.is_idle() {
                return true;
            }
            if started.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Stops both services. Undrained results are dropped; loaded columns and their
    /// meshes stay as they are.
    pub fn shutdown(&mut self) {
        self.column_loader.shutdown();
        self.mesh_service.shutdown();
    }
}

