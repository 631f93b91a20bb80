//! Error types for column loading, configuration and service start-up.

use std::{io, path::PathBuf};

use thiserror::Error;

use super::voxels::column::ChunkCoord;

/// Why a column could not be produced for a coordinate.
///
/// A failed load never publishes a partial column; the World records the error
/// against the coordinate and leaves retrying to the caller.
#[derive(Debug, Error)]
pub enum ColumnLoadError {
    /// The column file could not be opened or read.
    #[error("failed to read column file {}: {source}", .path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file looked gzip-compressed but could not be inflated.
    #[error("failed to decompress column file {}: {source}", .path.display())]
    Decompress {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying inflate error.
        #[source]
        source: io::Error,
    },

    /// The bytes are not a valid named tag tree.
    #[error("malformed tag tree in {}: {source}", .path.display())]
    Decode {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying tag decoder error.
        #[source]
        source: fastnbt::error::Error,
    },

    /// A required named field is absent.
    #[error("column data is missing required field `{field}`")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
    },

    /// A required field exists but holds a different tag type.
    #[error("field `{field}` has the wrong tag type, expected {expected}")]
    WrongType {
        /// Name of the offending field.
        field: &'static str,
        /// Tag type the loader requires.
        expected: &'static str,
    },

    /// A byte-array field has the wrong length.
    #[error("field `{field}` holds {actual} bytes, expected {expected}")]
    WrongLength {
        /// Name of the offending field.
        field: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Length found in the file.
        actual: usize,
    },

    /// The file describes a different column than the one requested.
    #[error("column file for {requested} describes column {found}")]
    CoordinateMismatch {
        /// Coordinate the load was requested for.
        requested: ChunkCoord,
        /// Coordinate stored in the file.
        found: ChunkCoord,
    },

    /// The job completed without its load stage having produced anything.
    #[error("load job for column {0} finished without a result")]
    Incomplete(ChunkCoord),
}

/// Errors raised while reading an [`EngineConfig`](super::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for the config schema.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while constructing or running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A background worker thread could not be started.
    #[error("failed to spawn worker thread `{name}`: {source}")]
    Spawn {
        /// Name of the worker thread.
        name: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
