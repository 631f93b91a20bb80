//! Section mesh generation.
//!
//! Turns the 4096 cells of one section into at most two compiled meshes, one per
//! render pass. The scan visits cells in x, z, y order and, for each non-air cell,
//! the six faces in [`BlockSide::all`] order, so identical input always yields
//! identical buffers.
//!
//! # Face rule
//! A face is emitted when the cell across it is not opaque (air, an unloaded column
//! and outside the world all count) and does not hold the same block type. The
//! second condition hides the inner faces of water bodies and glass panes.
//!
//! # Lighting
//! Each face carries one flat colour, `max(sky, block) / 15` sampled at the cell
//! across the face. Blocks whose catalog entry samples light above (the slab) read
//! one cell higher, since their top face sits inside their own cell.

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, BlockCatalog, RenderPass, AIR},
    column::{ColumnData, ColumnSource, COLUMN_WIDTH, SECTION_HEIGHT},
};

use mesh::{CompiledMesh, Face, GeometryBuilder};

use super::vertex::pack_light_color;

pub mod mesh;

/// The output of one section rebuild.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SectionMeshes {
    /// Faces of opaque and cutout blocks
    pub opaque: Option<CompiledMesh>,
    /// Faces of translucent blocks
    pub translucent: Option<CompiledMesh>,
}

impl SectionMeshes {
    pub fn is_empty(&self) -> bool {
        self.opaque.is_none() && self.translucent.is_none()
    }

    /// Total quads across both passes.
    pub fn face_count(&self) -> usize {
        [&self.opaque, &self.translucent]
            .into_iter()
            .flatten()
            .map(CompiledMesh::face_count)
            .sum()
    }
}

/// Builds section meshes, reusing its scratch buffers between sections.
///
/// One instance belongs to exactly one thread at a time: the mesh service moves one
/// into its load worker, and the owning thread keeps another for rebuilds it must do
/// immediately.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    opaque: GeometryBuilder,
    translucent: GeometryBuilder,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the meshes of section `section` of `column`.
    ///
    /// # Arguments
    /// * `column` - The column being meshed
    /// * `source` - Lookup for neighbouring columns; boundary faces read through it
    /// * `section` - Section index, `0` is the bottom
    /// * `catalog` - Block properties
    pub fn build_section(
        &mut self,
        column: &ColumnData,
        source: &dyn ColumnSource,
        section: usize,
        catalog: &dyn BlockCatalog,
    ) -> SectionMeshes {
        self.opaque.clear();
        self.translucent.clear();

        let coord = column.coord();
        let base_x = coord.x.wrapping_mul(COLUMN_WIDTH as i32);
        let base_z = coord.z.wrapping_mul(COLUMN_WIDTH as i32);
        let bottom = (section * SECTION_HEIGHT) as i32;

        for x in 0..COLUMN_WIDTH {
            for z in 0..COLUMN_WIDTH {
                for y in bottom..bottom + SECTION_HEIGHT as i32 {
                    let block = column.local_block_type(x, y as usize, z);
                    if block == AIR {
                        continue;
                    }

                    let (x, z) = (x as i32, z as i32);
                    let light_lift = i32::from(catalog.samples_light_above(block));
                    let builder = match catalog.render_pass(block) {
                        RenderPass::Opaque => &mut self.opaque,
                        RenderPass::Translucent => &mut self.translucent,
                    };

                    for side in BlockSide::all() {
                        let (dx, dy, dz) = side.offset();
                        let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                        let adjoining = column.block_type_at(source, nx, ny, nz);
                        if catalog.is_opaque(adjoining) || adjoining == block {
                            continue;
                        }

                        let level = column.combined_light_at(source, nx, ny + light_lift, nz);
                        let face = Face::new(
                            [base_x.wrapping_add(x), y, base_z.wrapping_add(z)],
                            side,
                            &catalog.face_geometry(block, side),
                            pack_light_color(level),
                        );
                        builder.push_face(&face);
                    }
                }
            }
        }

        SectionMeshes {
            opaque: self.opaque.compile(),
            translucent: self.translucent.compile(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::vertex::unpack_color;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, ClassicBlockCatalog},
        column::{ChunkCoord, LightChannel, NoColumns},
    };

    fn build(column: &ColumnData, section: usize) -> SectionMeshes {
        MeshBuilder::new().build_section(column, &NoColumns, section, &ClassicBlockCatalog)
    }

    #[test]
    fn isolated_block_has_six_faces() {
        let mut column = ColumnData::empty(ChunkCoord::new(0, 0));
        column.set_local_block_type(8, 40, 8, BlockType::Stone.id());

        let meshes = build(&column, 2);
        let opaque = meshes.opaque.unwrap();
        assert_eq!(opaque.face_count(), 6);
        assert_eq!(opaque.vertex_count(), 24);
        assert_eq!(opaque.triangle_count(), 12);
        assert!(meshes.translucent.is_none());
    }

    #[test]
    fn surrounded_block_has_no_faces() {
        let mut column = ColumnData::empty(ChunkCoord::new(0, 0));
        column.set_local_block_type(8, 40, 8, BlockType::Dirt.id());
        for side in BlockSide::all() {
            let (dx, dy, dz) = side.offset();
            column.set_local_block_type(
                (8 + dx) as usize,
                (40 + dy) as usize,
                (8 + dz) as usize,
                BlockType::Stone.id(),
            );
        }

        let center_only = build(&column, 2);
        // Only the six stone neighbours show faces; the dirt block shows none.
        assert_eq!(center_only.face_count(), 6 * 5);
    }

    #[test]
    fn block_enclosed_by_its_own_type_emits_no_faces() {
        let mut column = ColumnData::empty(ChunkCoord::new(0, 0));
        column.set_local_block_type(8, 40, 8, BlockType::Stone.id());
        for side in BlockSide::all() {
            let (dx, dy, dz) = side.offset();
            column.set_local_block_type(
                (8 + dx) as usize,
                (40 + dy) as usize,
                (8 + dz) as usize,
                BlockType::Stone.id(),
            );
        }

        let opaque = build(&column, 2).opaque.unwrap();
        assert_eq!(opaque.face_count(), 6 * 5);

        let in_center = |p: &[f32; 3]| {
            (8.0..=9.0).contains(&p[0]) && (40.0..=41.0).contains(&p[1]) && (8.0..=9.0).contains(&p[2])
        };
        assert!(opaque
            .positions
            .chunks_exact(4)
            .all(|quad| !quad.iter().all(|p| in_center(p))));
    }

    #[test]
    fn identical_neighbors_hide_shared_faces() {
        let mut column = ColumnData::empty(ChunkCoord::new(0, 0));
        column.set_local_block_type(4, 20, 4, BlockType::Water.id());
        column.set_local_block_type(5, 20, 4, BlockType::Water.id());

        let meshes = build(&column, 1);
        assert!(meshes.opaque.is_none());
        assert_eq!(meshes.translucent.unwrap().face_count(), 10);
    }

    #[test]
    fn empty_section_compiles_to_nothing() {
        let column = ColumnData::empty(ChunkCoord::new(3, 3));
        assert!(build(&column, 0).is_empty());
    }

    #[test]
    fn face_light_is_sampled_across_the_face() {
        let mut column = ColumnData::empty(ChunkCoord::new(0, 0));
        column.set_local_block_type(2, 10, 2, BlockType::Stone.id());
        column.set_local_light(LightChannel::Sky, 2, 11, 2, 15);
        column.set_local_light(LightChannel::Block, 3, 10, 2, 5);

        let opaque = build(&column, 0).opaque.unwrap();
        let colors: Vec<[u8; 4]> = opaque.colors.iter().step_by(4).map(|&c| unpack_color(c)).collect();
        // Face order: Front, Back, Bottom, Top, Left, Right.
        assert_eq!(colors[3], [255, 255, 255, 255]);
        assert_eq!(colors[1], [85, 85, 85, 255]);
        assert_eq!(colors[0], [0, 0, 0, 255]);
    }

    #[test]
    fn slab_samples_light_one_cell_higher() {
        let mut column = ColumnData::empty(ChunkCoord::new(0, 0));
        column.set_local_block_type(2, 10, 2, BlockType::Slab.id());
        column.set_local_light(LightChannel::Block, 2, 12, 2, 15);

        let opaque = build(&column, 0).opaque.unwrap();
        let top = unpack_color(opaque.colors[3 * 4]);
        assert_eq!(top, [255, 255, 255, 255]);
    }

    #[test]
    fn positions_are_in_world_space() {
        let mut column = ColumnData::empty(ChunkCoord::new(-1, 2));
        column.set_local_block_type(15, 0, 0, BlockType::Stone.id());

        let opaque = build(&column, 0).opaque.unwrap();
        assert!(opaque.positions.iter().all(|p| (-1.0..=0.0).contains(&p[0])));
        assert!(opaque.positions.iter().all(|p| (32.0..=33.0).contains(&p[2])));
    }
}
