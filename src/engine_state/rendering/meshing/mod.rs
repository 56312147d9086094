//! Mesh generation and instancing for voxel chunks.

pub mod instancing;
pub mod mesh;

pub use instancing::{InstanceBatches, InstanceRaw};
pub use mesh::{ChunkMesh, Face};
