//! # Voxel Data
//!
//! Everything about what the world is made of, independent of how it is drawn.
//!
//! ## Architecture
//!
//! * **Block**: Block ids and the catalog of their rendering properties
//! * **Column**: 16×16×128 cell arrays with two light channels, split into eight
//!   sections that each carry their own meshes and dirty state
//! * **World**: The sparse coordinate map of loaded columns
//! * **Storage**: Where column files live on disk and how they decode
//! * **Tasks**: The background job that loads a column file
//!
//! ## Data Flow
//!
//! 1. The world asks the column loader for a coordinate
//! 2. The load job reads and decodes the file off-thread
//! 3. Its completion registers the column and marks its sections dirty
//! 4. Dirty sections are rebuilt by the mesh service (see `rendering`)
//!
//! ## Thread Safety
//!
//! Cell arrays sit behind [`MtResource`](crate::core::MtResource) handles. Workers
//! read cloned snapshots without locking; an edit on the owning thread copies the
//! arrays if a snapshot is still alive. Sections and the coordinate map never leave
//! the owning thread.

pub mod block;
pub mod column;
pub mod storage;
pub mod tasks;
pub mod world;
