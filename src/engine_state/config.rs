//! # Engine Configuration
//!
//! Runtime settings read once at start-up from a JSON file. Every field has a
//! default, so a partial file (or no file at all) is valid.
//!
//! ```json
//! {
//!     "world_dir": "saves/World1",
//!     "view_radius": 4,
//!     "max_mesh_dispatch_per_frame": 16
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Settings for an [`EngineState`](super::EngineState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the column save tree.
    pub world_dir: PathBuf,
    /// Columns within this Chebyshev distance of the viewer are loaded.
    pub view_radius: i32,
    /// Extra distance beyond `view_radius` before a column is unloaded.
    pub unload_margin: i32,
    /// Upper bound on mesh jobs queued per frame. Empty sections do not count.
    pub max_mesh_dispatch_per_frame: usize,
    /// Number of frames the headless driver runs before exiting.
    pub headless_frames: u32,
    /// Sleep between headless frames, in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_dir: PathBuf::from("world"),
            view_radius: 3,
            unload_margin: 1,
            max_mesh_dispatch_per_frame: 32,
            headless_frames: 120,
            frame_interval_ms: 16,
        }
    }
}

impl EngineConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`] if its
    /// contents do not match the schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The load radius, never negative.
    pub fn load_radius(&self) -> i32 {
        self.view_radius.max(0)
    }

    /// Distance at which loaded columns are dropped. Always beyond the load radius.
    pub fn unload_radius(&self) -> i32 {
        self.load_radius() + self.unload_margin.max(0)
    }
}
