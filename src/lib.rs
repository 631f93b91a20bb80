#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Runtime
//!
//! A runtime for column-based voxel worlds: columns are streamed from disk around a
//! viewer, lit, and meshed section by section on background threads, with every
//! result applied on a single owning thread.
//!
//! ## Key Modules
//!
//! * `core` - Shared-state primitives used throughout the runtime
//! * `engine_state` - The runtime itself: world, services, meshing and the
//!   rendering backend seam
//!
//! ## Architecture
//!
//! The runtime keeps a clear split between:
//! * Voxel data (columns, light, sections) and its on-disk format
//! * Background work (one column loader, one mesh builder, each a small pipeline)
//! * The owning thread, the only place where the world and the renderer change
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(err) = voxel_runtime::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! `run()` reads an optional JSON config path from the first command line argument
//! and drives a headless engine for a fixed number of frames.

use std::{sync::Arc, thread, time::Duration};

use cgmath::Point3;
use log::info;

use engine_state::{
    config::EngineConfig,
    error::EngineError,
    rendering::HeadlessRenderer,
    voxels::block::ClassicBlockCatalog,
    EngineState,
    FrameStats,
};

pub mod core;
pub mod engine_state;

/// Runs the headless driver.
///
/// # Errors
/// Returns an [`EngineError`] if the config file cannot be read or the services
/// cannot start.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let frames = config.headless_frames;
    let interval = Duration::from_millis(config.frame_interval_ms);

    let mut engine = EngineState::new(config, Arc::new(ClassicBlockCatalog::new()), HeadlessRenderer::new())?;
    engine.set_viewer_position(Point3::new(0.0, 64.0, 0.0));

    let mut totals = FrameStats::default();
    for _ in 0..frames {
        let stats = engine.frame();
        totals.loads_completed += stats.loads_completed;
        totals.meshes_completed += stats.meshes_completed;
        totals.sections_emptied += stats.sections_emptied;
        thread::sleep(interval);
    }

    let world = engine.world();
    let renderer = engine.renderer();
    info!(
        "{} frames: {} columns loaded, {} failed, {} loads and {} mesh jobs completed, {} empty sections",
        frames,
        world.loaded_count(),
        world.failed_count(),
        totals.loads_completed,
        totals.meshes_completed,
        totals.sections_emptied
    );
    info!(
        "Renderer holds {} meshes with {} faces",
        renderer.live_mesh_count(),
        renderer.live_face_count()
    );

    engine.shutdown();
    Ok(())
}
