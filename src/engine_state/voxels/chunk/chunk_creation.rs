//! # Chunk Creation Module
//!
//! This module provides a builder that fills a fresh chunk from generated
//! block placements or stored records.
//!
//! Blocks written through the builder are not edits: the resulting chunk is
//! dirty (it has no mesh yet) but carries no unsaved changes, since its
//! contents can be regenerated or were just read back from storage.

use log::trace;

use crate::engine_state::voxels::{
    block::block_type::BlockType, coords::ChunkCoord, terrain::BlockPlacement,
};

use super::Chunk;

/// A builder for creating and populating chunks.
///
/// Wraps an empty chunk and writes cells directly, keeping the opacity bits
/// and block count consistent with the block storage as it goes.
pub struct ChunkCreationIterator {
    /// The chunk being filled
    chunk: Chunk,
    /// Placements that fell outside the chunk and were skipped
    skipped: usize,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    pub fn new(position: ChunkCoord) -> Self {
        ChunkCreationIterator {
            chunk: Chunk::empty(position),
            skipped: 0,
        }
    }

    /// Writes one block at a chunk-relative position.
    ///
    /// Positions outside the chunk are skipped and counted.
    pub fn push_block_type(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        match Chunk::index_of(x, y, z) {
            Some(index) => {
                self.chunk.write_cell(index, block_type);
            }
            None => self.skipped += 1,
        }
    }

    /// Writes one generated placement.
    pub fn push_placement(&mut self, placement: &BlockPlacement) {
        self.push_block_type(
            placement.x as i32,
            placement.y as i32,
            placement.z as i32,
            placement.block_type,
        );
    }

    /// Number of writes skipped because they fell outside the chunk.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    pub fn return_chunk(self) -> Chunk {
        if self.skipped > 0 {
            trace!(
                "Chunk {:?} built with {} out-of-range writes skipped",
                self.chunk.position,
                self.skipped
            );
        }
        self.chunk
    }
}

impl Chunk {
    /// Builds a chunk from generated placements.
    pub fn from_placements(position: ChunkCoord, placements: &[BlockPlacement]) -> Chunk {
        let mut builder = ChunkCreationIterator::new(position);
        for placement in placements {
            builder.push_placement(placement);
        }
        builder.return_chunk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::terrain::TerrainGenerator;

    #[test]
    fn test_flat_chunk_from_placements() {
        let chunk = Chunk::from_placements(ChunkCoord::new(2, -1), &TerrainGenerator::flat_chunk());

        assert_eq!(chunk.position, ChunkCoord::new(2, -1));
        assert_eq!(chunk.block_count(), 16 * 16 * 2);
        assert_eq!(chunk.get_block(7, 0, 7), BlockType::BEDROCK);
        assert_eq!(chunk.get_block(7, 1, 7), BlockType::DIRT);
        assert_eq!(chunk.get_block(7, 2, 7), BlockType::AIR);
        assert!(chunk.is_dirty());
        assert!(!chunk.has_unsaved_changes());
    }

    #[test]
    fn test_out_of_range_writes_are_skipped() {
        let mut builder = ChunkCreationIterator::new(ChunkCoord::new(0, 0));
        builder.push_block_type(16, 0, 0, BlockType::STONE);
        builder.push_block_type(0, 256, 0, BlockType::STONE);
        builder.push_block_type(0, 0, 0, BlockType::STONE);
        assert_eq!(builder.skipped(), 2);

        let chunk = builder.return_chunk();
        assert_eq!(chunk.block_count(), 1);
    }
}
