//! # Voxel Runtime Entry Point
//!
//! Calls into the library's `run()` function, which drives a headless engine.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- config.json
//! ```

fn main() {
    if let Err(err) = voxel_runtime::run() {
        log::error!("{}", err);
        eprintln!("voxel-runtime: {err}");
        std::process::exit(1);
    }
}
