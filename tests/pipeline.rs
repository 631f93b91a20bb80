use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use cgmath::Point3;
use voxel_runtime::engine_state::{
    config::EngineConfig,
    error::ColumnLoadError,
    rendering::HeadlessRenderer,
    voxels::{
        block::{block_type::BlockType, ClassicBlockCatalog},
        column::{ChunkCoord, ColumnData, SectionId, SectionState, SECTIONS_PER_COLUMN},
        storage::{column_path, encode_column},
    },
    EngineState,
};

const TIMEOUT: Duration = Duration::from_secs(10);

fn fixture_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("voxel-runtime-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

fn write_column(root: &Path, data: &ColumnData) {
    let path = column_path(root, data.coord());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, encode_column(data).unwrap()).unwrap();
}

fn engine(root: &Path, view_radius: i32) -> EngineState {
    let config = EngineConfig {
        world_dir: root.to_path_buf(),
        view_radius,
        unload_margin: 0,
        ..EngineConfig::default()
    };
    EngineState::new(config, Arc::new(ClassicBlockCatalog::new()), HeadlessRenderer::new()).unwrap()
}

fn column_with(coord: ChunkCoord, blocks: &[((usize, usize, usize), BlockType)]) -> ColumnData {
    let mut data = ColumnData::empty(coord);
    for &((x, y, z), block) in blocks {
        data.set_local_block_type(x, y, z, block.id());
    }
    data
}

#[test]
fn all_air_column_then_one_edit() {
    let root = fixture_root("all-air");
    let origin = ChunkCoord::new(0, 0);
    write_column(&root, &ColumnData::empty(origin));

    let mut engine = engine(&root, 0);
    assert!(engine.request_load(origin));
    assert!(!engine.request_load(origin));
    assert!(engine.run_until_idle(TIMEOUT));

    let column = engine.world().column_at(origin).unwrap();
    assert_eq!(column.sections().len(), SECTIONS_PER_COLUMN);
    assert!(column.sections().iter().all(|s| s.state() == SectionState::Empty));
    assert_eq!(engine.renderer().live_mesh_count(), 0);

    let id = engine.set_block(Point3::new(8, 64, 8), BlockType::Stone.id());
    assert_eq!(id, Some(SectionId::new(origin, 4)));
    assert!(engine.run_until_idle(TIMEOUT));

    assert_eq!(engine.renderer().live_mesh_count(), 1);
    assert_eq!(engine.renderer().live_face_count(), 6);
    let section = engine.world().column_at(origin).unwrap().section(4).unwrap();
    assert_eq!(section.state(), SectionState::Meshed);

    engine.shutdown();
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn double_dirty_rebuilds_once() {
    let root = fixture_root("double-dirty");
    let origin = ChunkCoord::new(0, 0);
    let mut engine = engine(&root, 0);
    engine.insert_column(column_with(origin, &[((1, 1, 1), BlockType::Stone)]));
    assert!(engine.run_until_idle(TIMEOUT));
    assert_eq!(engine.renderer().created_count(), 1);

    let section = engine
        .world_mut()
        .column_at_mut(origin)
        .and_then(|column| column.section_mut(0))
        .unwrap();
    section.mark_dirty();
    section.mark_dirty();

    let stats = engine.frame();
    assert_eq!(stats.meshes_dispatched, 1);
    assert!(engine.run_until_idle(TIMEOUT));

    assert_eq!(engine.renderer().created_count(), 2);
    assert_eq!(engine.renderer().released_count(), 1);
    assert_eq!(engine.renderer().live_mesh_count(), 1);
}

#[test]
fn faces_between_columns_are_culled() {
    let root = fixture_root("cross-column");
    write_column(&root, &column_with(ChunkCoord::new(0, 0), &[((15, 10, 5), BlockType::Stone)]));
    write_column(&root, &column_with(ChunkCoord::new(1, 0), &[((0, 10, 5), BlockType::Stone)]));

    let mut engine = engine(&root, 0);
    engine.request_load(ChunkCoord::new(0, 0));
    engine.request_load(ChunkCoord::new(1, 0));
    assert!(engine.run_until_idle(TIMEOUT));

    assert_eq!(engine.world().loaded_count(), 2);
    assert_eq!(engine.renderer().live_face_count(), 10);
}

#[test]
fn failed_load_is_recorded_and_retried() {
    let root = fixture_root("failed-load");
    let coord = ChunkCoord::new(-2, 7);

    let mut engine = engine(&root, 0);
    assert!(engine.request_load(coord));
    assert!(engine.run_until_idle(TIMEOUT));
    assert!(!engine.world().is_loaded(coord));
    assert!(matches!(
        engine.world().load_failure(coord),
        Some(ColumnLoadError::Io { .. })
    ));
    assert!(!engine.request_load(coord));

    write_column(&root, &ColumnData::empty(coord));
    assert!(engine.retry_load(coord));
    assert!(engine.run_until_idle(TIMEOUT));
    assert!(engine.world().is_loaded(coord));
    assert!(engine.world().load_failure(coord).is_none());
}

#[test]
fn misplaced_file_is_a_coordinate_mismatch() {
    let root = fixture_root("mismatch");
    let wanted = ChunkCoord::new(3, 3);
    let data = ColumnData::empty(ChunkCoord::new(4, 3));
    let path = column_path(&root, wanted);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, encode_column(&data).unwrap()).unwrap();

    let mut engine = engine(&root, 0);
    engine.request_load(wanted);
    assert!(engine.run_until_idle(TIMEOUT));
    assert!(matches!(
        engine.world().load_failure(wanted),
        Some(ColumnLoadError::CoordinateMismatch { .. })
    ));
}

#[test]
fn unload_releases_section_meshes() {
    let root = fixture_root("unload");
    let origin = ChunkCoord::new(0, 0);
    write_column(
        &root,
        &column_with(origin, &[((2, 2, 2), BlockType::Stone), ((2, 100, 2), BlockType::Water)]),
    );

    let mut engine = engine(&root, 0);
    engine.request_load(origin);
    assert!(engine.run_until_idle(TIMEOUT));
    assert_eq!(engine.renderer().live_mesh_count(), 2);

    assert!(engine.unload(origin));
    assert_eq!(engine.renderer().live_mesh_count(), 0);
    assert_eq!(engine.renderer().released_count(), 2);
    assert!(engine.world().column_at(origin).is_none());
}

#[test]
fn viewer_window_loads_and_unloads() {
    let root = fixture_root("viewer");
    for x in -1..=1 {
        for z in -1..=1 {
            write_column(&root, &ColumnData::empty(ChunkCoord::new(x, z)));
        }
    }

    let mut engine = engine(&root, 1);
    engine.set_viewer_position(Point3::new(8.0, 64.0, 8.0));
    assert!(engine.run_until_idle(TIMEOUT));
    assert_eq!(engine.world().loaded_count(), 9);
    assert_eq!(engine.world().failed_count(), 0);

    engine.set_viewer_position(Point3::new(-4000.0, 64.0, 8.0));
    assert!(engine.run_until_idle(TIMEOUT));
    assert_eq!(engine.world().loaded_count(), 0);
    assert_eq!(engine.world().failed_count(), 9);
}

#[test]
fn viewer_returning_retries_columns_that_failed_while_away() {
    let root = fixture_root("failed-revisit");
    let origin = ChunkCoord::new(0, 0);

    let mut engine = engine(&root, 1);
    engine.set_viewer_position(Point3::new(8.0, 64.0, 8.0));
    assert!(engine.run_until_idle(TIMEOUT));
    assert_eq!(engine.world().failed_count(), 9);
    assert!(!engine.request_load(origin));

    write_column(&root, &ColumnData::empty(origin));
    engine.set_viewer_position(Point3::new(800.0, 64.0, 8.0));
    assert!(engine.run_until_idle(TIMEOUT));
    assert_eq!(engine.world().failed_count(), 9);
    assert!(engine.world().load_failure(origin).is_none());

    engine.set_viewer_position(Point3::new(8.0, 64.0, 8.0));
    assert!(engine.run_until_idle(TIMEOUT));
    assert!(engine.world().is_loaded(origin));
    assert_eq!(engine.world().failed_count(), 8);
}

#[test]
fn load_requested_again_after_unload_is_not_lost() {
    let root = fixture_root("reload-in-flight");
    let coord = ChunkCoord::new(5, -5);
    write_column(&root, &ColumnData::empty(coord));

    let mut engine = engine(&root, 0);
    assert!(engine.request_load(coord));
    assert!(engine.unload(coord));
    assert!(!engine.world().is_load_pending(coord));

    assert!(engine.request_load(coord));
    assert!(engine.world().is_load_pending(coord));
    assert!(engine.run_until_idle(TIMEOUT));
    assert!(engine.world().is_loaded(coord));
}
