//! Mesh buffers for section rendering.
//!
//! [`GeometryBuilder`] is the growable scratch a worker appends faces to while it
//! scans a section. [`CompiledMesh`] is the immutable, exactly-sized result handed to
//! the rendering backend.

use crate::engine_state::rendering::vertex::{Position, TexCoord};
use crate::engine_state::voxels::block::FACE_INDICES;

use super::face::Face;

/// Vertex and index buffers of one render pass of one section.
///
/// Moved into the backend on install; never copied by the runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledMesh {
    /// Vertex positions in world space
    pub positions: Vec<Position>,
    /// Packed RGBA8 colour per vertex
    pub colors: Vec<u32>,
    /// Atlas coordinates per vertex
    pub uvs: Vec<TexCoord>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
}

impl CompiledMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads the mesh was built from.
    pub fn face_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Raw bytes of the position buffer, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the colour buffer.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Raw bytes of the texture coordinate buffer.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw bytes of the index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Reusable scratch buffers for building one pass of a section.
///
/// The allocation survives [`compile`](Self::compile), so a worker that keeps its
/// builder between jobs stops allocating once it has seen its largest section.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    positions: Vec<Position>,
    colors: Vec<u32>,
    uvs: Vec<TexCoord>,
    indices: Vec<u32>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quad as four vertices and two triangles.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&face.positions);
        self.uvs.extend_from_slice(&face.uvs);
        self.colors.extend_from_slice(&[face.color; 4]);
        self.indices.extend(FACE_INDICES.iter().map(|i| base + i));
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Drops any pending geometry, keeping the allocation.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Copies the pending geometry into an exactly-sized mesh and resets the builder.
    ///
    /// # Returns
    /// `None` if no face was pushed since the last reset.
    pub fn compile(&mut self) -> Option<CompiledMesh> {
        if self.is_empty() {
            return None;
        }

        let mesh = CompiledMesh {
            positions: self.positions.to_vec(),
            colors: self.colors.to_vec(),
            uvs: self.uvs.to_vec(),
            indices: self.indices.to_vec(),
        };
        self.clear();
        Some(mesh)
    }
}
