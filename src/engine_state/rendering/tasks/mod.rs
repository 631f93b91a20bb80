//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `SectionMeshTask`: Rebuilds the meshes of one section on the mesh worker

pub mod section_mesh_task;
