//! Mesh data structures for section rendering.
//!
//! # Architecture
//! - [`Face`]: One lit quad placed in world space
//! - [`GeometryBuilder`]: Reusable scratch buffers a worker appends faces to
//! - [`CompiledMesh`]: The immutable, exactly-sized buffers handed to the backend

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
