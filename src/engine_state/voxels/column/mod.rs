//! # Column Module
//!
//! A column is the unit of storage and loading: 16×16 cells across and 128 cells
//! tall, split into eight 16-layer [`Section`]s for rendering.
//!
//! ## Layout
//!
//! Block bytes are stored in one flat array indexed `y + z * 128 + x * 2048`, so a
//! vertical run of cells is contiguous. Sky and block light use the same index into
//! packed [`NibbleArray`]s.
//!
//! ## Sharing
//!
//! The arrays live in [`ColumnData`], held behind an [`MtResource`]. A mesh job clones
//! the handle and reads that snapshot on the worker thread without locking. An edit
//! on the owning thread while a job still holds the snapshot copies the arrays first,
//! so the edit never waits and the job never sees a half-applied change. The column's
//! [`Section`]s (and the backend handles inside them) stay on the owning thread.
//!
//! ## Neighbour delegation
//!
//! Reads with x or z outside `0..16` are forwarded to the neighbouring column found
//! through a [`ColumnSource`], with the coordinate re-based into that column. A missing
//! neighbour reads as air with no light. All coordinate math is total: a rebase that
//! would overflow the chunk coordinate space also reads as "not loaded".

use std::fmt;

use log::trace;

use crate::core::MtResource;
use crate::engine_state::error::ColumnLoadError;

use super::block::{BlockTypeSize, AIR};

pub mod lighting;
pub mod nibble;
pub mod section;

pub use nibble::NibbleArray;
pub use section::{Section, SectionState};

/// Cells along the x and z axes of a column.
pub const COLUMN_WIDTH: usize = 16;
/// Cells along the y axis of a column.
pub const COLUMN_HEIGHT: usize = 128;
/// Layers per section.
pub const SECTION_HEIGHT: usize = 16;
/// Sections per column.
pub const SECTIONS_PER_COLUMN: usize = COLUMN_HEIGHT / SECTION_HEIGHT;
/// Cells per column.
pub const COLUMN_VOLUME: usize = COLUMN_WIDTH * COLUMN_WIDTH * COLUMN_HEIGHT;
/// Cells per section.
pub const SECTION_VOLUME: usize = COLUMN_WIDTH * COLUMN_WIDTH * SECTION_HEIGHT;
/// Brightest light level.
pub const MAX_LIGHT: u8 = 15;

/// Light above the top of the world, loaded column or not: open sky, no block light.
pub const fn above_world_light(channel: LightChannel) -> u8 {
    match channel {
        LightChannel::Sky => MAX_LIGHT,
        LightChannel::Block => 0,
    }
}

/// Horizontal position of a column, in column units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The column containing world cell `(x, z)`.
    pub const fn containing(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(COLUMN_WIDTH as i32),
            z: z.div_euclid(COLUMN_WIDTH as i32),
        }
    }

    /// The column `dx`, `dz` columns away, or `None` if that overflows.
    pub fn offset(self, dx: i32, dz: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            z: self.z.checked_add(dz)?,
        })
    }

    /// The four horizontally adjacent columns: -x, +x, -z, +z.
    pub fn neighbors(self) -> impl Iterator<Item = ChunkCoord> {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dx, dz)| self.offset(dx, dz))
    }

    /// Chebyshev distance between two columns.
    pub fn distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Re-bases a column-local `(x, z)` that may lie outside `0..16`.
    ///
    /// # Returns
    /// The column that actually holds the cell and the cell's local coordinates in it,
    /// or `None` if the column coordinate would overflow.
    pub fn rebase(self, x: i32, z: i32) -> Option<(ChunkCoord, usize, usize)> {
        let width = COLUMN_WIDTH as i32;
        let coord = self.offset(x.div_euclid(width), z.div_euclid(width))?;
        Some((coord, x.rem_euclid(width) as usize, z.rem_euclid(width) as usize))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Identifies one section of one column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId {
    pub column: ChunkCoord,
    pub index: usize,
}

impl SectionId {
    pub const fn new(column: ChunkCoord, index: usize) -> Self {
        Self { column, index }
    }
}

/// Which of the two light fields to read or write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightChannel {
    /// Light from the open sky.
    Sky,
    /// Light emitted by blocks.
    Block,
}

/// Looks up loaded columns by coordinate for neighbour delegation.
///
/// Implemented by the World on the owning thread and by the captured neighbourhood a
/// mesh job carries to its worker.
pub trait ColumnSource {
    fn column_data(&self, coord: ChunkCoord) -> Option<&MtResource<ColumnData>>;
}

/// A source with nothing loaded. Every delegated read sees air and darkness.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoColumns;

impl ColumnSource for NoColumns {
    fn column_data(&self, _coord: ChunkCoord) -> Option<&MtResource<ColumnData>> {
        None
    }
}

/// Flat index of a local cell.
#[inline]
pub const fn cell_index(x: usize, y: usize, z: usize) -> usize {
    y + z * COLUMN_HEIGHT + x * COLUMN_HEIGHT * COLUMN_WIDTH
}

/// Block and light storage of one column.
#[derive(Clone)]
pub struct ColumnData {
    coord: ChunkCoord,
    blocks: Box<[BlockTypeSize]>,
    sky_light: NibbleArray,
    block_light: NibbleArray,
    /// Upper bound on non-air cells per section. Exact after `recompute_occupancy`.
    occupancy: [u16; SECTIONS_PER_COLUMN],
}

impl ColumnData {
    /// Creates an all-air column with no light.
    pub fn empty(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![AIR; COLUMN_VOLUME].into_boxed_slice(),
            sky_light: NibbleArray::zeroed(COLUMN_VOLUME),
            block_light: NibbleArray::zeroed(COLUMN_VOLUME),
            occupancy: [0; SECTIONS_PER_COLUMN],
        }
    }

    /// Creates a column from decoded arrays.
    ///
    /// Occupancy is assumed full until [`recompute_occupancy`](Self::recompute_occupancy)
    /// runs, so no section is skipped by mistake.
    ///
    /// # Arguments
    /// * `blocks` - `COLUMN_VOLUME` block bytes
    /// * `sky_light` / `block_light` - `COLUMN_VOLUME` packed nibbles each
    ///
    /// # Errors
    /// [`ColumnLoadError::WrongLength`] naming the first array with the wrong length.
    pub fn from_parts(
        coord: ChunkCoord,
        blocks: Vec<BlockTypeSize>,
        sky_light: NibbleArray,
        block_light: NibbleArray,
    ) -> Result<Self, ColumnLoadError> {
        let lengths = [
            ("Blocks", blocks.len(), COLUMN_VOLUME),
            ("SkyLight", sky_light.len() / 2, COLUMN_VOLUME / 2),
            ("BlockLight", block_light.len() / 2, COLUMN_VOLUME / 2),
        ];
        if let Some(&(field, actual, expected)) =
            lengths.iter().find(|(_, actual, expected)| actual != expected)
        {
            return Err(ColumnLoadError::WrongLength {
                field,
                expected,
                actual,
            });
        }

        Ok(Self {
            coord,
            blocks: blocks.into_boxed_slice(),
            sky_light,
            block_light,
            occupancy: [SECTION_VOLUME as u16; SECTIONS_PER_COLUMN],
        })
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Raw block bytes in storage order.
    pub fn blocks(&self) -> &[BlockTypeSize] {
        &self.blocks
    }

    /// The packed nibbles of one light channel.
    pub fn light(&self, channel: LightChannel) -> &NibbleArray {
        match channel {
            LightChannel::Sky => &self.sky_light,
            LightChannel::Block => &self.block_light,
        }
    }

    /// Block at a local cell. Coordinates must be in range.
    #[inline]
    pub fn local_block_type(&self, x: usize, y: usize, z: usize) -> BlockTypeSize {
        self.blocks[cell_index(x, y, z)]
    }

    /// Light at a local cell. Coordinates must be in range.
    #[inline]
    pub fn local_light(&self, channel: LightChannel, x: usize, y: usize, z: usize) -> u8 {
        self.light(channel).get(cell_index(x, y, z))
    }

    /// Block at a column-relative cell, delegating x/z outside `0..16` to `source`.
    ///
    /// Total over all inputs: y outside the world, unloaded neighbours and
    /// overflowing rebases all read as air.
    pub fn block_type_at(&self, source: &dyn ColumnSource, x: i32, y: i32, z: i32) -> BlockTypeSize {
        let Some(y) = local_y(y) else {
            return AIR;
        };
        if let (Some(x), Some(z)) = (local_xz(x), local_xz(z)) {
            return self.local_block_type(x, y, z);
        }

        match self.coord.rebase(x, z) {
            Some((coord, x, z)) => source
                .column_data(coord)
                .map_or(AIR, |neighbor| neighbor.get().local_block_type(x, y, z)),
            None => AIR,
        }
    }

    /// Light at a column-relative cell, delegating like [`block_type_at`](Self::block_type_at).
    ///
    /// Below the world reads 0. Above the world the sky channel reads full
    /// brightness and the block channel 0.
    pub fn light_at(
        &self,
        channel: LightChannel,
        source: &dyn ColumnSource,
        x: i32,
        y: i32,
        z: i32,
    ) -> u8 {
        if y >= COLUMN_HEIGHT as i32 {
            return above_world_light(channel);
        }
        let Some(y) = local_y(y) else {
            return 0;
        };
        if let (Some(x), Some(z)) = (local_xz(x), local_xz(z)) {
            return self.local_light(channel, x, y, z);
        }

        match self.coord.rebase(x, z) {
            Some((coord, x, z)) => source
                .column_data(coord)
                .map_or(0, |neighbor| neighbor.get().local_light(channel, x, y, z)),
            None => 0,
        }
    }

    /// `max(sky, block)` at a column-relative cell.
    pub fn combined_light_at(&self, source: &dyn ColumnSource, x: i32, y: i32, z: i32) -> u8 {
        self.light_at(LightChannel::Sky, source, x, y, z)
            .max(self.light_at(LightChannel::Block, source, x, y, z))
    }

    /// Writes a block at a local cell.
    ///
    /// # Returns
    /// The previous block at that cell.
    pub fn set_local_block_type(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block: BlockTypeSize,
    ) -> BlockTypeSize {
        let index = cell_index(x, y, z);
        let previous = std::mem::replace(&mut self.blocks[index], block);

        let count = &mut self.occupancy[y / SECTION_HEIGHT];
        match (previous == AIR, block == AIR) {
            (true, false) => *count = count.saturating_add(1),
            (false, true) => *count = count.saturating_sub(1),
            _ => {}
        }
        previous
    }

    /// Writes one light channel at a local cell.
    pub fn set_local_light(&mut self, channel: LightChannel, x: usize, y: usize, z: usize, level: u8) {
        let index = cell_index(x, y, z);
        match channel {
            LightChannel::Sky => self.sky_light.set(index, level),
            LightChannel::Block => self.block_light.set(index, level),
        }
    }

    /// Counts the non-air cells of every section.
    pub fn recompute_occupancy(&mut self) {
        let mut occupancy = [0u16; SECTIONS_PER_COLUMN];
        for column in self.blocks.chunks_exact(COLUMN_HEIGHT) {
            for (section, layers) in column.chunks_exact(SECTION_HEIGHT).enumerate() {
                occupancy[section] += layers.iter().filter(|&&block| block != AIR).count() as u16;
            }
        }
        self.occupancy = occupancy;
    }

    /// Whether the section is known to hold only air.
    pub fn is_section_empty(&self, section: usize) -> bool {
        self.occupancy[section] == 0
    }
}

impl fmt::Debug for ColumnData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnData")
            .field("coord", &self.coord)
            .field("occupancy", &self.occupancy)
            .finish()
    }
}

#[inline]
fn local_xz(v: i32) -> Option<usize> {
    (0..COLUMN_WIDTH as i32).contains(&v).then_some(v as usize)
}

#[inline]
fn local_y(v: i32) -> Option<usize> {
    (0..COLUMN_HEIGHT as i32).contains(&v).then_some(v as usize)
}

/// A loaded column as the World keeps it: shared cell storage plus the
/// owning-thread-only section state.
///
/// `generation` tells apart successive columns registered at the same coordinate, so
/// a mesh result built for an unloaded column is never installed into its reload.
#[derive(Debug)]
pub struct VoxelColumn {
    coord: ChunkCoord,
    generation: u64,
    data: MtResource<ColumnData>,
    sections: [Section; SECTIONS_PER_COLUMN],
}

impl VoxelColumn {
    /// Wraps loaded data. All sections start unbuilt and clean.
    pub fn new(data: ColumnData, generation: u64) -> Self {
        Self {
            coord: data.coord(),
            generation,
            data: MtResource::new(data),
            sections: std::array::from_fn(Section::new),
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Shared handle to the cell storage.
    pub fn data(&self) -> &MtResource<ColumnData> {
        &self.data
    }

    /// Mutable cell storage. Copies it first if a mesh job still holds a snapshot.
    pub fn data_mut(&mut self) -> &mut ColumnData {
        if self.data.is_shared() {
            trace!("Copying column {} held by an in-flight job", self.coord);
        }
        self.data.get_mut()
    }

    /// See [`ColumnData::block_type_at`].
    pub fn block_type_at(&self, source: &dyn ColumnSource, x: i32, y: i32, z: i32) -> BlockTypeSize {
        self.data.get().block_type_at(source, x, y, z)
    }

    /// See [`ColumnData::light_at`].
    pub fn light_at(&self, channel: LightChannel, source: &dyn ColumnSource, x: i32, y: i32, z: i32) -> u8 {
        self.data.get().light_at(channel, source, x, y, z)
    }

    pub fn sections(&self) -> &[Section; SECTIONS_PER_COLUMN] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// Marks every section dirty.
    pub fn mark_all_dirty(&mut self) {
        self.sections.iter_mut().for_each(Section::mark_dirty);
    }

    /// Marks the sections whose meshes can change after an edit of local cell
    /// `(x, y, z)`: the owning section, plus the vertically adjacent one when the
    /// cell sits on a section boundary.
    ///
    /// # Returns
    /// The neighbouring-column sections that must be marked dirty as well, for cells
    /// on the x or z boundary of the column.
    pub fn mark_edit_dirty(&mut self, x: usize, y: usize, z: usize) -> Vec<SectionId> {
        let section = y / SECTION_HEIGHT;
        self.sections[section].mark_dirty();

        let layer = y % SECTION_HEIGHT;
        if layer == 0 && section > 0 {
            self.sections[section - 1].mark_dirty();
        }
        if layer == SECTION_HEIGHT - 1 && section + 1 < SECTIONS_PER_COLUMN {
            self.sections[section + 1].mark_dirty();
        }

        let last = COLUMN_WIDTH - 1;
        let steps = [
            (x == 0, (-1, 0)),
            (x == last, (1, 0)),
            (z == 0, (0, -1)),
            (z == last, (0, 1)),
        ];
        steps
            .into_iter()
            .filter(|(on_edge, _)| *on_edge)
            .filter_map(|(_, (dx, dz))| self.coord.offset(dx, dz))
            .map(|column| SectionId::new(column, section))
            .collect()
    }

    /// Releases every section's backend meshes.
    pub fn release(&mut self, renderer: &mut dyn crate::engine_state::rendering::RenderBackend) {
        self.sections.iter_mut().for_each(|section| section.release(renderer));
    }

    /// Section ids that wait for a rebuild and have none in flight.
    pub fn dirty_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections
            .iter()
            .filter(|section| section.is_dirty() && !section.is_building())
            .map(move |section| SectionId::new(self.coord, section.index()))
    }
}

/// The column a job works on plus its loaded horizontal neighbours, captured on the
/// owning thread and moved to the worker.
///
/// Holds snapshots: edits made after the capture are not visible through it.
#[derive(Debug, Clone)]
pub struct ColumnNeighborhood {
    center: MtResource<ColumnData>,
    center_coord: ChunkCoord,
    generation: u64,
    neighbors: Vec<(ChunkCoord, MtResource<ColumnData>)>,
}

impl ColumnNeighborhood {
    /// Captures `center` and whatever of its four neighbours `source` has loaded.
    pub fn capture(center: &VoxelColumn, source: &dyn ColumnSource) -> Self {
        let neighbors = center
            .coord()
            .neighbors()
            .filter_map(|coord| source.column_data(coord).map(|data| (coord, data.clone())))
            .collect();
        Self {
            center: center.data().clone(),
            center_coord: center.coord(),
            generation: center.generation(),
            neighbors,
        }
    }

    /// The center column's storage as captured.
    pub fn center(&self) -> &ColumnData {
        self.center.get()
    }

    pub fn center_coord(&self) -> ChunkCoord {
        self.center_coord
    }

    /// Generation of the center column at capture time.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl ColumnSource for ColumnNeighborhood {
    fn column_data(&self, coord: ChunkCoord) -> Option<&MtResource<ColumnData>> {
        if coord == self.center_coord {
            return Some(&self.center);
        }
        self.neighbors
            .iter()
            .find(|(neighbor, _)| *neighbor == coord)
            .map(|(_, data)| data)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Columns(HashMap<ChunkCoord, MtResource<ColumnData>>);

    impl ColumnSource for Columns {
        fn column_data(&self, coord: ChunkCoord) -> Option<&MtResource<ColumnData>> {
            self.0.get(&coord)
        }
    }

    fn with_block(coord: ChunkCoord, x: usize, y: usize, z: usize, block: u8) -> ColumnData {
        let mut data = ColumnData::empty(coord);
        data.set_local_block_type(x, y, z, block);
        data
    }

    #[test]
    fn index_layout_is_y_fastest() {
        assert_eq!(cell_index(0, 1, 0), 1);
        assert_eq!(cell_index(0, 0, 1), 128);
        assert_eq!(cell_index(1, 0, 0), 2048);
        assert_eq!(cell_index(15, 127, 15), COLUMN_VOLUME - 1);
    }

    #[test]
    fn out_of_range_x_delegates_to_neighbor() {
        let origin = ChunkCoord::new(0, 0);
        let east = ChunkCoord::new(1, 0);
        let columns = Columns(HashMap::from([(east, MtResource::new(with_block(east, 0, 64, 3, 1)))]));

        let data = ColumnData::empty(origin);
        assert_eq!(data.block_type_at(&columns, 16, 64, 3), 1);
        assert_eq!(data.block_type_at(&columns, -16, 64, 3), AIR);
    }

    #[test]
    fn negative_coordinates_rebase_into_the_western_column() {
        assert_eq!(
            ChunkCoord::new(0, 0).rebase(-1, 17),
            Some((ChunkCoord::new(-1, 1), 15, 1))
        );
        assert_eq!(ChunkCoord::containing(-1, -17), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn rebase_overflow_reads_as_not_loaded() {
        let data = ColumnData::empty(ChunkCoord::new(i32::MAX, 0));
        assert_eq!(ChunkCoord::new(i32::MAX, 0).rebase(16, 0), None);
        assert_eq!(data.block_type_at(&NoColumns, 16, 0, 0), AIR);
        assert_eq!(data.light_at(LightChannel::Sky, &NoColumns, i32::MAX, 5, 0), 0);
    }

    #[test]
    fn out_of_world_y_reads_air_and_boundary_light() {
        let data = with_block(ChunkCoord::new(0, 0), 0, 0, 0, 1);
        assert_eq!(data.block_type_at(&NoColumns, 0, -1, 0), AIR);
        assert_eq!(data.block_type_at(&NoColumns, 0, 128, 0), AIR);
        assert_eq!(data.light_at(LightChannel::Sky, &NoColumns, 0, 128, 0), MAX_LIGHT);
        assert_eq!(data.light_at(LightChannel::Block, &NoColumns, 0, 128, 0), 0);
        assert_eq!(data.light_at(LightChannel::Sky, &NoColumns, 0, -1, 0), 0);
    }

    #[test]
    fn occupancy_tracks_edits() {
        let mut data = ColumnData::empty(ChunkCoord::new(0, 0));
        assert!(data.is_section_empty(2));
        data.set_local_block_type(3, 40, 3, 1);
        assert!(!data.is_section_empty(2));
        data.set_local_block_type(3, 40, 3, AIR);
        assert!(data.is_section_empty(2));
    }

    #[test]
    fn from_parts_assumes_full_until_recomputed() {
        let coord = ChunkCoord::new(2, 2);
        let mut data = ColumnData::from_parts(
            coord,
            vec![AIR; COLUMN_VOLUME],
            NibbleArray::zeroed(COLUMN_VOLUME),
            NibbleArray::zeroed(COLUMN_VOLUME),
        )
        .unwrap();
        assert!(!data.is_section_empty(0));
        data.recompute_occupancy();
        assert!((0..SECTIONS_PER_COLUMN).all(|i| data.is_section_empty(i)));
    }

    #[test]
    fn from_parts_rejects_short_arrays() {
        let coord = ChunkCoord::new(0, 0);
        let err = ColumnData::from_parts(
            coord,
            vec![AIR; COLUMN_VOLUME],
            NibbleArray::zeroed(COLUMN_VOLUME),
            NibbleArray::zeroed(20),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ColumnLoadError::WrongLength { field: "BlockLight", actual: 10, .. }
        ));
    }

    #[test]
    fn corner_edit_reports_two_neighbor_columns_and_lower_section() {
        let mut column = VoxelColumn::new(ColumnData::empty(ChunkCoord::new(4, -4)), 0);
        let neighbors = column.mark_edit_dirty(0, 16, 15);

        assert!(column.section(1).unwrap().is_dirty());
        assert!(column.section(0).unwrap().is_dirty());
        assert!(!column.section(2).unwrap().is_dirty());
        assert_eq!(
            neighbors,
            vec![
                SectionId::new(ChunkCoord::new(3, -4), 1),
                SectionId::new(ChunkCoord::new(4, -3), 1),
            ]
        );
    }

    #[test]
    fn neighborhood_only_captures_loaded_neighbors() {
        let center = VoxelColumn::new(ColumnData::empty(ChunkCoord::new(0, 0)), 3);
        let north = ChunkCoord::new(0, -1);
        let columns = Columns(HashMap::from([(north, MtResource::new(ColumnData::empty(north)))]));

        let neighborhood = ColumnNeighborhood::capture(&center, &columns);
        assert!(neighborhood.column_data(north).is_some());
        assert!(neighborhood.column_data(ChunkCoord::new(1, 0)).is_none());
        assert!(neighborhood.column_data(ChunkCoord::new(0, 0)).is_some());
        assert_eq!(neighborhood.generation(), 3);
    }

    #[test]
    fn edit_after_capture_copies_instead_of_touching_the_snapshot() {
        let mut column = VoxelColumn::new(ColumnData::empty(ChunkCoord::new(0, 0)), 0);
        let neighborhood = ColumnNeighborhood::capture(&column, &NoColumns);

        column.data_mut().set_local_block_type(1, 2, 3, 7);
        assert_eq!(column.data().get().local_block_type(1, 2, 3), 7);
        assert_eq!(neighborhood.center().local_block_type(1, 2, 3), AIR);
        assert!(!column.data().is_shared());
    }
}
