//! # Block Type Module
//!
//! Classic block ids understood by [`ClassicBlockCatalog`](super::ClassicBlockCatalog).
//! Column storage keeps raw bytes; this enum only exists to give the catalog table
//! readable names.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Block ids of the classic column save format.
///
/// The `FromPrimitive` derive allows conversion from the raw storage byte. Ids that
/// are not listed here are still valid cell contents; the catalog falls back to a
/// generic opaque cube for them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty cell. Never meshed, never opaque.
    Air = 0,
    Stone = 1,
    Grass = 2,
    Dirt = 3,
    Cobblestone = 4,
    Planks = 5,
    Sapling = 6,
    Bedrock = 7,
    FlowingWater = 8,
    Water = 9,
    FlowingLava = 10,
    Lava = 11,
    Sand = 12,
    Gravel = 13,
    GoldOre = 14,
    IronOre = 15,
    CoalOre = 16,
    Log = 17,
    Leaves = 18,
    Glass = 20,
    Dandelion = 37,
    Rose = 38,
    /// The half-height slab. Its light is sampled one cell higher than usual.
    Slab = 44,
    Bricks = 45,
    Torch = 50,
    Snow = 78,
    Ice = 79,
}

impl BlockType {
    /// Converts a raw storage byte to a `BlockType`.
    ///
    /// # Returns
    /// `None` for ids without a named entry.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// The raw storage byte of this type.
    pub const fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_id() {
        for t in [BlockType::Air, BlockType::Water, BlockType::Slab, BlockType::Ice] {
            assert_eq!(BlockType::from_id(t.id()), Some(t));
        }
    }

    #[test]
    fn unnamed_ids_are_none() {
        assert_eq!(BlockType::from_id(19), None);
        assert_eq!(BlockType::from_id(255), None);
    }
}
