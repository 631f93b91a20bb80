use crate::engine_state::rendering::vertex::{Position, TexCoord};
use crate::engine_state::voxels::block::{block_side::BlockSide, FaceGeometry};

/// A single lit quad placed in world space.
///
/// Corners follow the catalog's order: lower-left, lower-right, upper-left,
/// upper-right as seen from outside the face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Corner positions in world space
    pub positions: [Position; 4],
    /// Atlas coordinates per corner
    pub uvs: [TexCoord; 4],
    /// Packed colour shared by all four corners
    pub color: u32,
    /// Which side of its cell this face covers
    pub block_side: BlockSide,
}

impl Face {
    /// Places a unit-cell quad at a world cell.
    ///
    /// # Arguments
    /// * `cell` - World coordinates of the cell's minimum corner
    /// * `block_side` - Which side of the cell the quad covers
    /// * `geometry` - The catalog's quad for that side, relative to the cell
    /// * `color` - Packed light colour broadcast to all corners
    pub fn new(cell: [i32; 3], block_side: BlockSide, geometry: &FaceGeometry, color: u32) -> Self {
        let origin = cell.map(|v| v as f32);
        Face {
            positions: geometry
                .positions
                .map(|p| [origin[0] + p[0], origin[1] + p[1], origin[2] + p[2]]),
            uvs: geometry.uvs,
            color,
            block_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::cube_face;

    #[test]
    fn face_is_translated_to_its_cell() {
        let geometry = cube_face(BlockSide::Top, 1.0, 0);
        let face = Face::new([-16, 64, 3], BlockSide::Top, &geometry, 0);
        assert!(face.positions.iter().all(|p| p[1] == 65.0));
        assert!(face.positions.iter().all(|p| (-16.0..=-15.0).contains(&p[0])));
        assert!(face.positions.iter().all(|p| (3.0..=4.0).contains(&p[2])));
    }
}
