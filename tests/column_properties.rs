use cgmath::Point3;
use proptest::prelude::*;
use voxel_runtime::engine_state::voxels::column::{
    ChunkCoord, ColumnData, LightChannel, NibbleArray, COLUMN_HEIGHT, COLUMN_VOLUME, COLUMN_WIDTH,
};
use voxel_runtime::engine_state::voxels::world::World;

const WIDTH: i32 = COLUMN_WIDTH as i32;

fn local_cell() -> impl Strategy<Value = (usize, usize, usize)> {
    (0..COLUMN_WIDTH, 0..COLUMN_HEIGHT, 0..COLUMN_WIDTH)
}

/// Origin column plus its four horizontal neighbours, each with a distinct marker
/// block written at `cell`.
fn cross_world(cell: (usize, usize, usize)) -> World {
    let mut world = World::new("unused");
    let coords = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];
    for (marker, &(x, z)) in coords.iter().enumerate() {
        let mut data = ColumnData::empty(ChunkCoord::new(x, z));
        data.set_local_block_type(cell.0, cell.1, cell.2, marker as u8 + 1);
        data.set_local_light(LightChannel::Block, cell.0, cell.1, cell.2, marker as u8 + 3);
        world.insert_column(data);
    }
    world
}

proptest! {
    // Reading 16 cells past an edge lands on the same cell of the neighbour.
    #[test]
    fn neighbor_delegation_by_one_column((x, y, z) in local_cell()) {
        let world = cross_world((x, y, z));
        let origin = world.column_at(ChunkCoord::new(0, 0)).unwrap();
        let (xi, yi, zi) = (x as i32, y as i32, z as i32);

        prop_assert_eq!(origin.block_type_at(&world, xi, yi, zi), 1);
        prop_assert_eq!(origin.block_type_at(&world, xi - WIDTH, yi, zi), 2);
        prop_assert_eq!(origin.block_type_at(&world, xi + WIDTH, yi, zi), 3);
        prop_assert_eq!(origin.block_type_at(&world, xi, yi, zi - WIDTH), 4);
        prop_assert_eq!(origin.block_type_at(&world, xi, yi, zi + WIDTH), 5);
        prop_assert_eq!(origin.light_at(LightChannel::Block, &world, xi + WIDTH, yi, zi), 5);
        prop_assert_eq!(origin.light_at(LightChannel::Block, &world, xi, yi, zi - WIDTH), 6);
    }

    // Diagonal neighbours are not loaded and read as air.
    #[test]
    fn diagonal_neighbor_is_air((x, y, z) in local_cell()) {
        let world = cross_world((x, y, z));
        let origin = world.column_at(ChunkCoord::new(0, 0)).unwrap();
        prop_assert_eq!(origin.block_type_at(&world, x as i32 + WIDTH, y as i32, z as i32 + WIDTH), 0);
    }

    // Light reads stay in range for any input, including wildly out-of-range ones.
    #[test]
    fn light_is_always_a_valid_level(
        level in 0u8..=255,
        x in any::<i32>(),
        y in any::<i32>(),
        z in any::<i32>(),
    ) {
        let mut world = World::new("unused");
        let mut data = ColumnData::empty(ChunkCoord::new(0, 0));
        data.set_local_light(LightChannel::Sky, 3, 3, 3, level);
        world.insert_column(data);

        let origin = world.column_at(ChunkCoord::new(0, 0)).unwrap();
        for channel in [LightChannel::Sky, LightChannel::Block] {
            prop_assert!(origin.light_at(channel, &world, x, y, z) <= 15);
            prop_assert!(world.light_at(channel, Point3::new(x, y, z)) <= 15);
        }
        prop_assert_eq!(origin.light_at(LightChannel::Sky, &world, 3, 3, 3), level & 0x0F);
    }

    // Writing a nibble never disturbs the other nibble of its byte.
    #[test]
    fn nibble_write_keeps_sibling(
        index in 0..COLUMN_VOLUME,
        sibling in 0u8..16,
        value in 0u8..16,
    ) {
        let mut array = NibbleArray::zeroed(COLUMN_VOLUME);
        let other = index ^ 1;
        array.set(other, sibling);
        array.set(index, value);

        prop_assert_eq!(array.get(index), value);
        prop_assert_eq!(array.get(other), sibling);
    }

    // Rebasing is total and always lands inside a column.
    #[test]
    fn rebase_is_total(cx in any::<i32>(), cz in any::<i32>(), x in any::<i32>(), z in any::<i32>()) {
        if let Some((coord, lx, lz)) = ChunkCoord::new(cx, cz).rebase(x, z) {
            prop_assert!(lx < COLUMN_WIDTH && lz < COLUMN_WIDTH);
            prop_assert_eq!(i64::from(coord.x), i64::from(cx) + i64::from(x.div_euclid(WIDTH)));
            prop_assert_eq!(i64::from(coord.z), i64::from(cz) + i64::from(z.div_euclid(WIDTH)));
        }
    }

    // Every world position maps back to the column that contains it.
    #[test]
    fn containing_column_rebases_to_zero(x in any::<i32>(), z in any::<i32>()) {
        let coord = ChunkCoord::containing(x, z);
        let lx = x.rem_euclid(WIDTH);
        let lz = z.rem_euclid(WIDTH);
        prop_assert_eq!(coord.rebase(lx, lz), Some((coord, lx as usize, lz as usize)));
    }
}
