//! # Core Module
//!
//! Cross-cutting pieces used throughout the world core: the shared resource
//! container, configuration and the error taxonomy.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `WorldConfig`: Serde-backed tunables for generation, caching and workers
//! - `error`: One `thiserror` enum per failure domain

pub mod config;
pub mod error;
pub mod mt_resource;

pub use config::WorldConfig;
pub use error::{ChunkError, ConfigError, GenerationError, PersistenceError, WorldError};
pub use mt_resource::MtResource;
