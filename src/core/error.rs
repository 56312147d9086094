//! Error types for the voxel world core.
//!
//! Each concern gets its own enum so callers can tell a recoverable miss from
//! a hard failure. Most of these never reach the caller of `World`: generation
//! failures fall back to flat terrain and persistence failures are logged.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine_state::voxels::coords::ChunkCoord;

/// Procedural generation failed for a column.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The noise sample for a column was NaN or infinite.
    #[error("noise sample at world column ({world_x}, {world_z}) is not finite")]
    NonFiniteNoise {
        /// World-space X of the failing column.
        world_x: i32,
        /// World-space Z of the failing column.
        world_z: i32,
    },
}

/// A serialized chunk record could not be turned back into a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A block key was not of the form `"lx,ly,lz"`.
    #[error("malformed block key {0:?}")]
    MalformedKey(String),

    /// A block key pointed outside the chunk's local bounds.
    #[error("block key {0:?} is outside the chunk bounds")]
    OutOfBounds(String),
}

/// The persistence collaborator failed to load or save a chunk.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Underlying storage failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The decoded record is not a valid chunk.
    #[error("invalid chunk record: {0}")]
    Record(#[from] ChunkError),

    /// The record stored under a coordinate names another coordinate.
    #[error("record stored at {requested:?} describes chunk {found:?}")]
    CoordinateMismatch {
        /// Coordinate the record was loaded for.
        requested: ChunkCoord,
        /// Coordinate written inside the record.
        found: ChunkCoord,
    },

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("could not read config {path:?}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config is not valid JSON for `WorldConfig`.
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the world cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Hard failures surfaced by `World`.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Every resident chunk holds unsaved edits that could not be persisted,
    /// so nothing can be evicted to make room for `coord`.
    #[error("cache is full of unsaved chunks, cannot make room for {0:?}")]
    EvictionBlocked(ChunkCoord),

    /// The world has been disposed.
    #[error("world has been disposed")]
    Disposed,

    /// An explicit save failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The world was built from an invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
