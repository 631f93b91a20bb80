//! # Task System Core Traits
//!
//! This module defines the unit of work run by an
//! [`AsyncLoadService`](super::AsyncLoadService).
//!
//! ## Task Lifecycle
//! 1. A `Task` is created on the owning thread and submitted to a service
//! 2. `load()` runs on the service's load worker; it may block on I/O
//! 3. `post_process()` runs on the service's post-process worker
//! 4. `complete()` runs on the owning thread when the service is drained
//!
//! ## Thread Safety
//! - `Task` must be `Send` to travel between the three threads
//! - `complete()` is the only stage that sees the completion context, so nothing
//!   the owning thread owns is ever touched by a worker

use std::fmt;

use crate::engine_state::voxels::column::{ChunkCoord, SectionId};

/// Identity of a job. At most one job per key is in flight in a service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Loading the column at a coordinate
    ColumnLoad(ChunkCoord),
    /// Rebuilding the meshes of one section
    SectionMesh(SectionId),
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKey::ColumnLoad(coord) => write!(f, "load {coord}"),
            TaskKey::SectionMesh(section) => {
                write!(f, "mesh {} section {}", section.column, section.index)
            }
        }
    }
}

/// A unit of work that runs through the stages of an
/// [`AsyncLoadService`](super::AsyncLoadService).
///
/// # Type Parameters
/// - `C`: The completion context, only reachable from the owning thread
/// - `W`: Private state of the load worker, e.g. reusable scratch buffers
///
/// # Implementation Guidelines
/// - Own everything the worker stages need; share column data through
///   [`MtResource`](crate::core::MtResource) snapshots only
/// - Keep `complete()` cheap, it runs inside the frame
pub trait Task<C, W = ()>: Send {
    /// The key this job is deduplicated under.
    fn key(&self) -> TaskKey;

    /// The heavy stage. Runs on the load worker.
    fn load(&mut self, worker: &mut W);

    /// Light CPU work on the load result. Runs on the post-process worker.
    fn post_process(&mut self) {}

    /// Applies the result. Runs on the owning thread during
    /// [`drain_completed`](super::AsyncLoadService::drain_completed).
    fn complete(self: Box<Self>, context: &mut C);
}
