//! # Column Load Task
//!
//! This module defines the `ColumnLoadTask`, which reads one column file from disk.
//! It is submitted by [`World::request_load`](crate::engine_state::voxels::world::World::request_load)
//! for every coordinate that comes into range.

use std::path::{Path, PathBuf};

use log::debug;
use web_time::Instant;

use crate::engine_state::{
    error::ColumnLoadError,
    rendering::RenderBackend,
    task_management::task::{Task, TaskKey},
    voxels::{column::{ChunkCoord, ColumnData}, storage},
    RuntimeContext,
};

/// Loads the column at one coordinate.
///
/// Stages:
/// 1. `load` reads and decodes the file (blocking I/O)
/// 2. `post_process` counts the non-air cells of each section, so that empty
///    sections can be installed without a mesh job
/// 3. `complete` hands the column, or the error, to the World
pub struct ColumnLoadTask {
    /// The column to load
    coord: ChunkCoord,
    /// Where its file is expected
    path: PathBuf,
    /// Set by `load`
    result: Option<Result<ColumnData, ColumnLoadError>>,
}

impl ColumnLoadTask {
    /// Creates a load task for `coord` under the save tree at `root`.
    pub fn new(root: &Path, coord: ChunkCoord) -> Self {
        ColumnLoadTask {
            coord,
            path: storage::column_path(root, coord),
            result: None,
        }
    }

    /// Path of the file this task reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: RenderBackend + 'static> Task<RuntimeContext<R>> for ColumnLoadTask {
    fn key(&self) -> TaskKey {
        TaskKey::ColumnLoad(self.coord)
    }

    fn load(&mut self, _worker: &mut ()) {
        let started = Instant::now();
        self.result = Some(storage::read_column(&self.path, self.coord));
        debug!(
            "Read column {} from {} in {:?}",
            self.coord,
            self.path.display(),
            started.elapsed()
        );
    }

    fn post_process(&mut self) {
        if let Some(Ok(column)) = &mut self.result {
            column.recompute_occupancy();
        }
    }

    fn complete(self: Box<Self>, context: &mut RuntimeContext<R>) {
        let ColumnLoadTask { coord, result, .. } = *self;
        let result = result.unwrap_or_else(|| Err(ColumnLoadError::Incomplete(coord)));
        context.world.finish_load(coord, result);
    }
}
