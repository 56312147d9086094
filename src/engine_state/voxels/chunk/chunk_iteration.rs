//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air blocks of a chunk, in
//! storage order (X fastest, then Z, then Y).

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// An iterator over all non-air blocks in a chunk.
///
/// Yields `((x, y, z), block_type)` with chunk-relative positions.
pub struct ChunkBlockIterator<'a> {
    /// The block storage of the chunk being iterated over
    blocks: &'a [BlockTypeSize],
    /// Next cell to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            blocks: &chunk_ref.blocks,
            current_offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = ((i32, i32, i32), BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_offset < self.blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;

            let raw = self.blocks[offset];
            if raw == BlockType::AIR.as_int() {
                continue;
            }
            let Some(block_type) = BlockType::get_block_type_from_int(raw) else {
                continue;
            };

            let offset = offset as i32;
            let x = offset % CHUNK_DIMENSION;
            let z = (offset / CHUNK_DIMENSION) % CHUNK_DIMENSION;
            let y = offset / CHUNK_PLANE_SIZE;
            return Some(((x, y, z), block_type));
        }
        None
    }
}

impl Chunk {
    /// Iterates over every non-air block.
    pub fn blocks_iter(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }
}
