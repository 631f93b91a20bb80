//! # Block Side Module
//!
//! This module defines the six faces of a voxel cell and the axis offset that leads
//! from a cell to the neighbour sharing that face.

/// Represents the six possible faces of a voxel block.
///
/// The discriminant doubles as the index into per-face tables such as a block's
/// texture indices. The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The face on the negative X side of the cell
    Front = 0,

    /// The face on the positive X side of the cell
    Back = 1,

    /// The face on the negative Y side of the cell
    Bottom = 2,

    /// The face on the positive Y side of the cell
    Top = 3,

    /// The face on the negative Z side of the cell
    Left = 4,

    /// The face on the positive Z side of the cell
    Right = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// Mesh building walks faces in this order, so it is part of the fixed scan
    /// order of a section rebuild.
    pub const fn all() -> [BlockSide; 6] {
        [
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Bottom,
            BlockSide::Top,
            BlockSide::Left,
            BlockSide::Right,
        ]
    }

    /// The `(dx, dy, dz)` step from a cell to the cell across this face.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            BlockSide::Front => (-1, 0, 0),
            BlockSide::Back => (1, 0, 0),
            BlockSide::Bottom => (0, -1, 0),
            BlockSide::Top => (0, 1, 0),
            BlockSide::Left => (0, 0, -1),
            BlockSide::Right => (0, 0, 1),
        }
    }

    /// Index of this face in per-face tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}
