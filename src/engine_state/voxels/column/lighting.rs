//! # Lighting
//!
//! The only relighting the runtime does is the one-step rule applied when a cell is
//! cleared to air: the new cell may take one level less than its brightest neighbour,
//! written into its block-light channel. No flood fill follows.

use crate::engine_state::voxels::block::block_side::BlockSide;

use super::{ColumnData, ColumnSource};

/// The one-step relight rule.
///
/// # Arguments
/// * `own` - `max(sky, block)` currently stored at the cell
/// * `neighbors` - `max(sky, block)` at each of the six face neighbours
///
/// # Returns
/// The level to write into the cell's block-light channel, or `None` when the
/// candidate does not exceed what the cell already has.
pub fn one_step_relight(own: u8, neighbors: [u8; 6]) -> Option<u8> {
    let brightest = neighbors.into_iter().max().unwrap_or(0);
    let candidate = brightest.saturating_sub(1);
    (candidate > own).then_some(candidate)
}

/// Applies [`one_step_relight`] to local cell `(x, y, z)` of `column`.
///
/// Only reads, so `column` may also be reachable through `source`. The caller writes
/// the returned level into the block-light channel.
///
/// # Returns
/// The level the cell should take, if any.
pub fn relight_cleared_cell(
    column: &ColumnData,
    source: &dyn ColumnSource,
    x: usize,
    y: usize,
    z: usize,
) -> Option<u8> {
    let (cx, cy, cz) = (x as i32, y as i32, z as i32);
    let own = column.combined_light_at(source, cx, cy, cz);
    let neighbors = BlockSide::all().map(|side| {
        let (dx, dy, dz) = side.offset();
        column.combined_light_at(source, cx + dx, cy + dy, cz + dz)
    });
    one_step_relight(own, neighbors)
}
