//! # Block Module
//!
//! The block catalog seam. Column storage only ever holds raw block bytes; the mesher
//! asks a [`BlockCatalog`] whether a byte is opaque, which render pass it belongs to,
//! and what quad a given face of it produces.
//!
//! [`ClassicBlockCatalog`] is the built-in table for classic block ids. Embedders with
//! their own block set implement the trait themselves.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// The air block id. Cells outside the world or in unloaded columns read as this.
pub const AIR: BlockTypeSize = 0;

/// Number of tiles along one edge of the terrain texture atlas.
pub const ATLAS_TILES_PER_ROW: u32 = 16;

/// Which of the two per-section batches a block's faces are compiled into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Drawn first, with depth writes.
    Opaque,
    /// Drawn after all opaque geometry.
    Translucent,
}

/// Unit-cell quad for one face of a block.
///
/// Corners are ordered lower-left, lower-right, upper-left, upper-right as seen from
/// outside the face; [`FACE_INDICES`] turns them into two triangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceGeometry {
    /// Corner positions relative to the cell's minimum corner.
    pub positions: [[f32; 3]; 4],
    /// Atlas texture coordinates for each corner.
    pub uvs: [[f32; 2]; 4],
}

/// Triangle indices for one quad, relative to its first vertex.
pub const FACE_INDICES: [u32; 6] = [0, 1, 3, 0, 3, 2];

/// Read-only block properties consumed by lighting and meshing.
///
/// Implementations are shared with the mesh worker, hence `Send + Sync`.
pub trait BlockCatalog: Send + Sync {
    /// Whether the block completely hides the faces of its neighbours.
    fn is_opaque(&self, block: BlockTypeSize) -> bool;

    /// The batch this block's faces are compiled into.
    fn render_pass(&self, block: BlockTypeSize) -> RenderPass;

    /// The quad emitted for `side` of `block`.
    fn face_geometry(&self, block: BlockTypeSize, side: BlockSide) -> FaceGeometry;

    /// Whether face lighting of this block samples one cell above the adjoining cell.
    fn samples_light_above(&self, block: BlockTypeSize) -> bool {
        let _ = block;
        false
    }
}

/// Static properties of one catalog entry.
#[derive(Copy, Clone, Debug)]
struct BlockProperties {
    opaque: bool,
    pass: RenderPass,
    /// Height of the block's top face inside the cell.
    height: f32,
    /// Atlas tile per face, indexed by `BlockSide`.
    tiles: [u32; 6],
}

impl BlockProperties {
    const fn solid(tile: u32) -> Self {
        Self {
            opaque: true,
            pass: RenderPass::Opaque,
            height: 1.0,
            tiles: [tile; 6],
        }
    }

    const fn cutout(tile: u32) -> Self {
        Self {
            opaque: false,
            pass: RenderPass::Opaque,
            height: 1.0,
            tiles: [tile; 6],
        }
    }

    const fn translucent(tile: u32) -> Self {
        Self {
            opaque: false,
            pass: RenderPass::Translucent,
            height: 1.0,
            tiles: [tile; 6],
        }
    }
}

/// Built-in catalog for the classic block ids in [`BlockType`].
///
/// Unknown non-air ids are treated as opaque cubes so that corrupt or newer saves
/// still mesh as closed surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicBlockCatalog;

impl ClassicBlockCatalog {
    /// Creates the catalog.
    pub fn new() -> Self {
        ClassicBlockCatalog
    }

    fn properties(block: BlockTypeSize) -> BlockProperties {
        let Some(block_type) = BlockType::from_id(block) else {
            return BlockProperties::solid(1);
        };

        match block_type {
            BlockType::Air => BlockProperties {
                opaque: false,
                pass: RenderPass::Opaque,
                height: 0.0,
                tiles: [0; 6],
            },
            BlockType::Stone => BlockProperties::solid(1),
            // Side, side, dirt bottom, grass top, side, side.
            BlockType::Grass => BlockProperties {
                tiles: [3, 3, 2, 0, 3, 3],
                ..BlockProperties::solid(3)
            },
            BlockType::Dirt => BlockProperties::solid(2),
            BlockType::Cobblestone => BlockProperties::solid(16),
            BlockType::Planks => BlockProperties::solid(4),
            BlockType::Sapling => BlockProperties::cutout(15),
            BlockType::Bedrock => BlockProperties::solid(17),
            BlockType::FlowingWater | BlockType::Water => BlockProperties::translucent(205),
            BlockType::FlowingLava | BlockType::Lava => BlockProperties::solid(237),
            BlockType::Sand => BlockProperties::solid(18),
            BlockType::Gravel => BlockProperties::solid(19),
            BlockType::GoldOre => BlockProperties::solid(32),
            BlockType::IronOre => BlockProperties::solid(33),
            BlockType::CoalOre => BlockProperties::solid(34),
            BlockType::Log => BlockProperties {
                tiles: [20, 20, 21, 21, 20, 20],
                ..BlockProperties::solid(20)
            },
            BlockType::Leaves => BlockProperties::cutout(52),
            BlockType::Glass => BlockProperties::translucent(49),
            BlockType::Dandelion => BlockProperties::cutout(13),
            BlockType::Rose => BlockProperties::cutout(12),
            BlockType::Slab => BlockProperties {
                opaque: false,
                pass: RenderPass::Opaque,
                height: 0.5,
                tiles: [5, 5, 6, 6, 5, 5],
            },
            BlockType::Bricks => BlockProperties::solid(7),
            BlockType::Torch => BlockProperties::cutout(80),
            BlockType::Snow => BlockProperties::solid(66),
            BlockType::Ice => BlockProperties::translucent(67),
        }
    }
}

impl BlockCatalog for ClassicBlockCatalog {
    fn is_opaque(&self, block: BlockTypeSize) -> bool {
        Self::properties(block).opaque
    }

    fn render_pass(&self, block: BlockTypeSize) -> RenderPass {
        Self::properties(block).pass
    }

    fn face_geometry(&self, block: BlockTypeSize, side: BlockSide) -> FaceGeometry {
        let properties = Self::properties(block);
        cube_face(side, properties.height, properties.tiles[side.index()])
    }

    fn samples_light_above(&self, block: BlockTypeSize) -> bool {
        block == BlockType::Slab.id()
    }
}

/// Builds the quad for one face of a box spanning the full cell footprint and
/// `height` vertically.
///
/// # Arguments
/// * `side` - Which face to build
/// * `height` - Top of the box inside the cell, `1.0` for a full cube
/// * `tile` - Atlas tile index, row-major in a 16x16 atlas
pub fn cube_face(side: BlockSide, height: f32, tile: u32) -> FaceGeometry {
    let h = height;
    let positions = match side {
        BlockSide::Front => [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, h, 0.0], [0.0, h, 1.0]],
        BlockSide::Back => [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, h, 1.0], [1.0, h, 0.0]],
        BlockSide::Bottom => [[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
        BlockSide::Top => [[0.0, h, 0.0], [0.0, h, 1.0], [1.0, h, 0.0], [1.0, h, 1.0]],
        BlockSide::Left => [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, h, 0.0], [0.0, h, 0.0]],
        BlockSide::Right => [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, h, 1.0], [1.0, h, 1.0]],
    };

    let tile_size = 1.0 / ATLAS_TILES_PER_ROW as f32;
    let u0 = (tile % ATLAS_TILES_PER_ROW) as f32 * tile_size;
    let v1 = (tile / ATLAS_TILES_PER_ROW) as f32 * tile_size + tile_size;
    let u1 = u0 + tile_size;
    // Side faces of partial-height boxes only show the lower part of the tile.
    let v0 = match side {
        BlockSide::Top | BlockSide::Bottom => v1 - tile_size,
        _ => v1 - tile_size * h,
    };

    FaceGeometry {
        positions,
        uvs: [[u0, v1], [u1, v1], [u0, v0], [u1, v0]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_not_opaque() {
        let catalog = ClassicBlockCatalog::new();
        assert!(!catalog.is_opaque(AIR));
        assert!(catalog.is_opaque(BlockType::Stone.id()));
    }

    #[test]
    fn water_and_glass_go_to_the_translucent_pass() {
        let catalog = ClassicBlockCatalog::new();
        assert_eq!(catalog.render_pass(BlockType::Water.id()), RenderPass::Translucent);
        assert_eq!(catalog.render_pass(BlockType::Glass.id()), RenderPass::Translucent);
        assert_eq!(catalog.render_pass(BlockType::Leaves.id()), RenderPass::Opaque);
    }

    #[test]
    fn unknown_ids_mesh_as_opaque_cubes() {
        let catalog = ClassicBlockCatalog::new();
        assert!(catalog.is_opaque(200));
        assert_eq!(catalog.render_pass(200), RenderPass::Opaque);
    }

    #[test]
    fn only_the_slab_samples_light_above() {
        let catalog = ClassicBlockCatalog::new();
        assert!(catalog.samples_light_above(BlockType::Slab.id()));
        assert!(!catalog.samples_light_above(BlockType::Stone.id()));
    }

    #[test]
    fn slab_top_face_sits_at_half_height() {
        let catalog = ClassicBlockCatalog::new();
        let top = catalog.face_geometry(BlockType::Slab.id(), BlockSide::Top);
        assert!(top.positions.iter().all(|p| p[1] == 0.5));
    }

    #[test]
    fn face_corners_lie_on_the_face_plane() {
        for side in BlockSide::all() {
            let face = cube_face(side, 1.0, 0);
            let (dx, dy, dz) = side.offset();
            let (axis, value) = match (dx, dy, dz) {
                (-1, _, _) => (0, 0.0),
                (1, _, _) => (0, 1.0),
                (_, -1, _) => (1, 0.0),
                (_, 1, _) => (1, 1.0),
                (_, _, -1) => (2, 0.0),
                _ => (2, 1.0),
            };
            assert!(face.positions.iter().all(|p| p[axis] == value), "{side:?}");
        }
    }
}
