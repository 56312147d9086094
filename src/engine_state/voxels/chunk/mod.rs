//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x256x16 column of voxel data
//! together with the flags that drive mesh rebuilds and persistence.
//!
//! ## Storage
//!
//! Chunks keep two parallel views of their cells, both pre-allocated and both
//! indexed by `((y * 16) + z) * 16 + x`:
//! - `blocks`: one `BlockTypeSize` per cell, `AIR` by default
//! - `opaque_array`: one bit per cell, set where the block hides its neighbours
//!
//! Face culling only ever reads the bit vector, so deciding whether a face is
//! exposed never decodes a block type.
//!
//! ### Performance Characteristics
//! - **Block Lookup**: O(1)
//! - **Opacity Check**: O(1)
//! - **Memory Usage**: 1 byte + 1 bit per cell

use bitvec::prelude::BitVec;
use log::debug;

use super::block::block_side::{BlockSide, FaceSet};
use super::block::block_type::BlockType;
use super::block::BlockTypeSize;
use super::coords::ChunkCoord;
use crate::engine_state::rendering::meshing::ChunkMesh;

mod chunk_creation;
pub mod chunk_iteration;
pub mod serialization;

pub use chunk_creation::ChunkCreationIterator;
pub use serialization::ChunkRecord;

/// The width and depth of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The height of a chunk in blocks.
pub const CHUNK_HEIGHT: i32 = 256;
/// The number of blocks in a single horizontal plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk.
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_HEIGHT;

/// Represents a 16x256x16 column of voxel blocks in the world.
///
/// Chunks are the unit of generation, caching, meshing and persistence.
/// Mutations mark the chunk dirty; the mesh is rebuilt lazily by the world's
/// tick and never while a mutation is in progress, since both need `&mut`.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkCoord,

    /// Block type of every cell, `AIR` where empty.
    blocks: Vec<BlockTypeSize>,

    /// One bit per cell, set where the block is opaque.
    opaque_array: BitVec,

    /// Number of non-air cells.
    block_count: usize,

    /// The mesh no longer matches the blocks.
    dirty: bool,

    /// The set of exposed blocks may have changed.
    visibility_dirty: bool,

    /// Holds edits the persistence collaborator has not stored yet.
    unsaved: bool,

    /// Geometry from the last rebuild.
    mesh: Option<ChunkMesh>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    ///
    /// The chunk starts dirty so that its first tick produces a mesh.
    pub fn empty(position: ChunkCoord) -> Self {
        Chunk {
            position,
            blocks: vec![BlockType::AIR.as_int(); CHUNK_SIZE as usize],
            opaque_array: BitVec::repeat(false, CHUNK_SIZE as usize),
            block_count: 0,
            dirty: true,
            visibility_dirty: true,
            unsaved: false,
            mesh: None,
        }
    }

    /// Flat index of a local position, or `None` outside the chunk.
    pub fn index_of(x: i32, y: i32, z: i32) -> Option<usize> {
        if (0..CHUNK_DIMENSION).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_DIMENSION).contains(&z)
        {
            Some((((y * CHUNK_DIMENSION) + z) * CHUNK_DIMENSION + x) as usize)
        } else {
            None
        }
    }

    /// Block at a chunk-relative position.
    ///
    /// # Returns
    /// `AIR` for empty cells and for positions outside the chunk, so callers
    /// can probe neighbours across the border without bounds checks.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        Self::index_of(x, y, z)
            .and_then(|index| BlockType::get_block_type_from_int(self.blocks[index]))
            .unwrap_or(BlockType::AIR)
    }

    /// Places a block at a chunk-relative position.
    ///
    /// Setting the type a cell already holds changes nothing. Any real change
    /// marks the mesh and the visibility dirty and flags the chunk as unsaved.
    ///
    /// # Returns
    /// `true` if the cell changed; `false` if it already held `block_type` or
    /// the position is outside the chunk.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> bool {
        let Some(index) = Self::index_of(x, y, z) else {
            debug!(
                "Ignoring set_block outside chunk {:?} at ({}, {}, {})",
                self.position, x, y, z
            );
            return false;
        };

        if !self.write_cell(index, block_type) {
            return false;
        }

        self.dirty = true;
        self.visibility_dirty = true;
        self.unsaved = true;
        true
    }

    /// Clears a chunk-relative position.
    ///
    /// # Returns
    /// `true` if a block was present and is now gone.
    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) -> bool {
        if !self.get_block(x, y, z).is_present() {
            return false;
        }
        self.set_block(x, y, z, BlockType::AIR)
    }

    /// Writes a cell without touching the dirty flags.
    ///
    /// # Returns
    /// `true` if the stored type changed.
    pub(crate) fn write_cell(&mut self, index: usize, block_type: BlockType) -> bool {
        let previous = self.blocks[index];
        if previous == block_type.as_int() {
            return false;
        }

        let was_present = previous != BlockType::AIR.as_int();
        match (was_present, block_type.is_present()) {
            (false, true) => self.block_count += 1,
            (true, false) => self.block_count -= 1,
            _ => {}
        }

        self.blocks[index] = block_type.as_int();
        self.opaque_array.set(index, block_type.is_opaque());
        true
    }

    /// Checks if the block at a chunk-relative position is opaque.
    ///
    /// # Returns
    /// `false` for air, liquids and positions outside the chunk.
    pub fn is_block_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        Self::index_of(x, y, z).is_some_and(|index| self.opaque_array[index])
    }

    /// Determines which faces of the block at (x,y,z) are exposed.
    ///
    /// A face is exposed when the neighbour in that direction lies outside the
    /// chunk or does not hide it. Opaque neighbours hide faces; liquids hide
    /// nothing except the shared face between two cells of the same liquid.
    ///
    /// # Returns
    /// The exposed faces; empty for air cells.
    pub fn get_visible_faces(&self, x: i32, y: i32, z: i32) -> FaceSet {
        let block_type = self.get_block(x, y, z);
        if !block_type.is_present() {
            return FaceSet::EMPTY;
        }

        let mut faces = FaceSet::EMPTY;
        for side in BlockSide::all() {
            let (dx, dy, dz) = side.neighbor_offset();
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);

            let hidden = if self.is_block_opaque(nx, ny, nz) {
                true
            } else {
                block_type.is_liquid() && self.get_block(nx, ny, nz) == block_type
            };

            if !hidden {
                faces.insert(side);
            }
        }
        faces
    }

    /// Regenerates the mesh from the current blocks and clears the dirty flag.
    pub fn rebuild_mesh(&mut self) -> &ChunkMesh {
        let mesh = ChunkMesh::build(self);
        self.dirty = false;
        self.mesh.insert(mesh)
    }

    /// Releases the geometry buffers.
    ///
    /// Called before a chunk leaves the cache. The chunk is marked dirty so a
    /// chunk that is somehow reused rebuilds before rendering.
    pub fn dispose(&mut self) {
        self.mesh = None;
        self.dirty = true;
    }

    /// Geometry from the last rebuild, if any.
    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.as_ref()
    }

    /// Whether the mesh is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether exposed blocks may have changed since the last call to
    /// [`Chunk::take_visibility_dirty`].
    pub fn is_visibility_dirty(&self) -> bool {
        self.visibility_dirty
    }

    /// Returns and clears the visibility-dirty flag.
    pub fn take_visibility_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.visibility_dirty, false)
    }

    /// Whether the chunk holds edits not yet stored by persistence.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Records that persistence holds the current contents.
    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    /// Number of non-air blocks.
    pub fn block_count(&self) -> usize {
        self.block_count
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("position", &self.position)
            .field("block_count", &self.block_count)
            .field("dirty", &self.dirty)
            .field("unsaved", &self.unsaved)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk::empty(ChunkCoord::new(0, 0))
    }

    #[test]
    fn test_set_then_get() {
        let mut chunk = chunk();
        for (x, y, z) in [(0, 0, 0), (15, 255, 15), (3, 128, 9)] {
            for block_type in BlockType::ALL.into_iter().filter(|b| b.is_present()) {
                chunk.set_block(x, y, z, block_type);
                assert_eq!(chunk.get_block(x, y, z), block_type);
            }
            assert!(chunk.remove_block(x, y, z));
            assert_eq!(chunk.get_block(x, y, z), BlockType::AIR);
        }
        assert_eq!(chunk.block_count(), 0);
    }

    #[test]
    fn test_out_of_range_is_air_and_ignored() {
        let mut chunk = chunk();
        assert_eq!(chunk.get_block(-1, 0, 0), BlockType::AIR);
        assert_eq!(chunk.get_block(0, 256, 0), BlockType::AIR);
        assert_eq!(chunk.get_block(0, 0, 16), BlockType::AIR);
        assert_eq!(chunk.get_block(i32::MIN, i32::MAX, 0), BlockType::AIR);

        assert!(!chunk.set_block(16, 0, 0, BlockType::STONE));
        assert!(!chunk.set_block(0, -1, 0, BlockType::STONE));
        assert_eq!(chunk.block_count(), 0);
    }

    #[test]
    fn test_set_block_is_idempotent() {
        let mut chunk = chunk();
        chunk.rebuild_mesh();
        chunk.take_visibility_dirty();
        assert!(!chunk.is_dirty());

        assert!(!chunk.set_block(1, 1, 1, BlockType::AIR));
        assert!(!chunk.is_dirty());
        assert!(!chunk.has_unsaved_changes());

        assert!(chunk.set_block(1, 1, 1, BlockType::DIRT));
        assert!(chunk.is_dirty());
        assert!(chunk.is_visibility_dirty());
        assert!(chunk.has_unsaved_changes());

        chunk.rebuild_mesh();
        assert!(!chunk.set_block(1, 1, 1, BlockType::DIRT));
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.block_count(), 1);
    }

    #[test]
    fn test_remove_block_reports_presence() {
        let mut chunk = chunk();
        assert!(!chunk.remove_block(2, 2, 2));
        chunk.set_block(2, 2, 2, BlockType::GRASS);
        chunk.rebuild_mesh();

        assert!(chunk.remove_block(2, 2, 2));
        assert!(chunk.is_dirty());
        assert!(!chunk.remove_block(2, 2, 2));
    }

    #[test]
    fn test_isolated_block_shows_all_faces() {
        let mut chunk = chunk();
        chunk.set_block(8, 100, 8, BlockType::STONE);
        assert_eq!(chunk.get_visible_faces(8, 100, 8), FaceSet::ALL);
    }

    #[test]
    fn test_enclosed_block_shows_no_faces() {
        let mut chunk = chunk();
        for x in 4..7 {
            for y in 4..7 {
                for z in 4..7 {
                    chunk.set_block(x, y, z, BlockType::STONE);
                }
            }
        }
        assert!(chunk.get_visible_faces(5, 5, 5).is_empty());
        assert_eq!(chunk.get_visible_faces(4, 5, 5).len(), 1);
        assert!(chunk.get_visible_faces(4, 5, 5).contains(BlockSide::FRONT));
        assert_eq!(chunk.get_visible_faces(4, 4, 4).len(), 3);
    }

    #[test]
    fn test_chunk_border_faces_are_exposed() {
        let mut chunk = chunk();
        chunk.set_block(0, 0, 0, BlockType::STONE);
        chunk.set_block(1, 0, 0, BlockType::STONE);
        chunk.set_block(0, 1, 0, BlockType::STONE);
        chunk.set_block(0, 0, 1, BlockType::STONE);

        let faces = chunk.get_visible_faces(0, 0, 0);
        assert_eq!(faces.len(), 3);
        assert!(faces.contains(BlockSide::FRONT));
        assert!(faces.contains(BlockSide::BOTTOM));
        assert!(faces.contains(BlockSide::LEFT));
    }

    #[test]
    fn test_liquid_neighbours_expose_faces() {
        let mut chunk = chunk();
        chunk.set_block(5, 5, 5, BlockType::STONE);
        chunk.set_block(6, 5, 5, BlockType::WATER);
        assert!(chunk.get_visible_faces(5, 5, 5).contains(BlockSide::BACK));

        chunk.set_block(7, 5, 5, BlockType::WATER);
        let water_faces = chunk.get_visible_faces(6, 5, 5);
        assert!(!water_faces.contains(BlockSide::BACK));
        assert!(!water_faces.contains(BlockSide::FRONT));
        assert_eq!(water_faces.len(), 4);

        chunk.set_block(7, 5, 5, BlockType::LAVA);
        assert!(chunk.get_visible_faces(6, 5, 5).contains(BlockSide::BACK));
    }

    #[test]
    fn test_air_has_no_faces() {
        assert!(chunk().get_visible_faces(3, 3, 3).is_empty());
    }

    #[test]
    fn test_dispose_releases_mesh() {
        let mut chunk = chunk();
        chunk.set_block(0, 0, 0, BlockType::DIRT);
        chunk.rebuild_mesh();
        assert!(chunk.mesh().is_some());

        chunk.dispose();
        assert!(chunk.mesh().is_none());
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_index_layout() {
        assert_eq!(Chunk::index_of(0, 0, 0), Some(0));
        assert_eq!(Chunk::index_of(1, 0, 0), Some(1));
        assert_eq!(Chunk::index_of(0, 0, 1), Some(16));
        assert_eq!(Chunk::index_of(0, 1, 0), Some(256));
        assert_eq!(Chunk::index_of(15, 255, 15), Some(CHUNK_SIZE as usize - 1));
        assert_eq!(Chunk::index_of(16, 0, 0), None);
    }
}
