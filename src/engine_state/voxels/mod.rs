//! # Voxel World Core
//!
//! This module contains the voxel data model and everything that produces,
//! stores and mutates it.
//!
//! ## Architecture
//!
//! * **Block**: Block types, their properties and the six faces of a block
//! * **Coords**: Conversions between world positions and chunk coordinates
//! * **Noise Generator**: Seeded 3D gradient noise
//! * **Terrain**: Heightmap terrain built from the noise
//! * **Chunk**: 16 x 256 x 16 columns of blocks with visibility and mesh state
//! * **Cache**: LRU store of resident chunks
//! * **Persistence**: Chunk records behind a coordinate-keyed blob store
//! * **Tasks**: Chunk generation run on the worker pool
//! * **World**: Owns the cache and coordinates loading, editing and eviction
//!
//! ## Data Flow
//!
//! 1. World receives a request for block access or modification
//! 2. A missing chunk is loaded from persistence or generated on a worker
//! 3. Edits mark the chunk dirty
//! 4. The next tick rebuilds dirty meshes for the renderer
//! 5. Evicted chunks with edits are saved before they leave the cache
//!
//! ## Thread Safety
//!
//! Chunks live on the control thread only. Workers receive a clone of the
//! terrain generator and return plain block placements.

pub mod block;
pub mod cache;
pub mod chunk;
pub mod coords;
pub mod noise_generator;
pub mod persistence;
pub mod tasks;
pub mod terrain;
pub mod world;
