//! Mesh generation for voxel rendering.
//!
//! # Architecture
//! - [`ChunkMesh`]: flat position, UV and index buffers for one chunk
//! - [`Face`]: a single face of a voxel with its corners and texture
//!
//! Every visible face becomes one quad: four vertices and six indices
//! `(0,1,2),(2,3,0)` offset by the running vertex count.

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
