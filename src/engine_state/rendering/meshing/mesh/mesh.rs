//! Mesh data structures and operations for voxel rendering.
//!
//! Converts a chunk's exposed faces into flat position, UV and index buffers.

use crate::engine_state::voxels::{chunk::Chunk, coords::ChunkCoord};

use super::face::Face;

/// Number of vertices emitted per visible face.
pub const VERTICES_PER_FACE: usize = 4;
/// Number of indices emitted per visible face.
pub const INDICES_PER_FACE: usize = 6;

/// Render-ready geometry of one chunk.
///
/// Positions are chunk-relative; the renderer places the chunk at `origin`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    /// Three floats per vertex
    pub positions: Vec<f32>,
    /// Two floats per vertex
    pub uvs: Vec<f32>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
    /// World-space origin `(cx*16, 0, cz*16)`
    pub origin: [f32; 3],
}

impl ChunkMesh {
    /// Creates an empty mesh placed at the origin of `coord`.
    pub fn new(coord: ChunkCoord) -> Self {
        ChunkMesh {
            origin: coord.world_origin(),
            ..Default::default()
        }
    }

    /// Generates the mesh of a chunk: one quad per visible face of every
    /// non-air block.
    pub fn build(chunk: &Chunk) -> Self {
        let mut mesh = ChunkMesh::new(chunk.position);
        for ((x, y, z), block_type) in chunk.blocks_iter() {
            for side in chunk.get_visible_faces(x, y, z).iter() {
                mesh.add_face(&Face::new(x, y, z, block_type, side));
            }
        }
        mesh
    }

    /// Appends one quad.
    pub fn add_face(&mut self, face: &Face) {
        let base = self.vertex_count() as u32;
        for corner in face.corners() {
            self.positions
                .extend_from_slice(&[corner.x as f32, corner.y as f32, corner.z as f32]);
        }
        for uv in face.uvs() {
            self.uvs.extend_from_slice(&uv);
        }
        self.indices.extend_from_slice(&Self::generate_face_indices(base));
    }

    /// Generates the two triangles of a quad whose first vertex is `base`.
    pub fn generate_face_indices(base: u32) -> [u32; INDICES_PER_FACE] {
        [base, base + 1, base + 2, base + 2, base + 3, base]
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of quads.
    pub fn face_count(&self) -> usize {
        self.indices.len() / INDICES_PER_FACE
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
