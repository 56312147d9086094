//! Rendering hand-off for the voxel world.
//!
//! The world core never talks to a GPU. Per tick it hands rebuilt chunk
//! meshes, evictions, the visible set and optional instance batches to a
//! [`RenderSink`], and telemetry snapshots to a [`StatsSink`]. A windowed
//! frontend implements these traits over its own device and queue; the
//! logging implementations here drive the headless binary.

use log::{debug, info, trace};

use super::voxels::coords::ChunkCoord;

pub mod meshing;
pub mod stats;
mod vertex;

pub use meshing::{ChunkMesh, InstanceBatches, InstanceRaw};
pub use stats::{LoggingStatsSink, StatsSink, StatsSnapshot};
pub use vertex::Vertex;

/// Geometry of one rebuilt chunk, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMeshUpload {
    /// Chunk the geometry belongs to
    pub coord: ChunkCoord,
    /// Three floats per vertex, chunk-relative
    pub positions: Vec<f32>,
    /// Two floats per vertex
    pub uvs: Vec<f32>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
    /// World-space placement `(cx*16, 0, cz*16)`
    pub origin: [f32; 3],
}

impl ChunkMeshUpload {
    /// Copies a chunk mesh for upload.
    pub fn from_mesh(coord: ChunkCoord, mesh: &ChunkMesh) -> Self {
        ChunkMeshUpload {
            coord,
            positions: mesh.positions.clone(),
            uvs: mesh.uvs.clone(),
            indices: mesh.indices.clone(),
            origin: mesh.origin,
        }
    }

    /// Interleaved vertices for a single vertex buffer.
    pub fn vertices(&self) -> Vec<Vertex> {
        Vertex::interleave(&self.positions, &self.uvs)
    }

    /// Raw bytes of the index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Consumer of render-ready world state.
///
/// Implementations must not call back into the world.
pub trait RenderSink {
    /// Receives the geometry of a chunk whose mesh was rebuilt.
    fn upload_chunk_mesh(&mut self, upload: ChunkMeshUpload);

    /// Releases everything held for an evicted chunk.
    fn unload_chunk(&mut self, coord: ChunkCoord);

    /// Replaces the set of chunks to draw this frame.
    fn set_visible_chunks(&mut self, coords: &[ChunkCoord]);

    /// Receives per-block-type instance transforms of the visible chunks.
    fn set_instances(&mut self, _instances: &InstanceBatches) {}
}

/// Render sink that only logs what it receives.
#[derive(Debug, Default)]
pub struct LoggingRenderSink {
    uploads: usize,
    unloads: usize,
    visible: usize,
}

impl LoggingRenderSink {
    /// Creates a sink with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes received so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Unloads received so far.
    pub fn unloads(&self) -> usize {
        self.unloads
    }

    /// Size of the last visible set.
    pub fn visible(&self) -> usize {
        self.visible
    }
}

impl RenderSink for LoggingRenderSink {
    fn upload_chunk_mesh(&mut self, upload: ChunkMeshUpload) {
        self.uploads += 1;
        debug!(
            "Upload chunk {:?}: {} vertices, {} indices",
            upload.coord,
            upload.positions.len() / 3,
            upload.indices.len()
        );
    }

    fn unload_chunk(&mut self, coord: ChunkCoord) {
        self.unloads += 1;
        debug!("Unload chunk {:?}", coord);
    }

    fn set_visible_chunks(&mut self, coords: &[ChunkCoord]) {
        if coords.len() != self.visible {
            info!("{} chunks visible", coords.len());
        }
        self.visible = coords.len();
    }

    fn set_instances(&mut self, instances: &InstanceBatches) {
        trace!(
            "{} instances over {} block types",
            instances.len(),
            instances.batches.len()
        );
    }
}
