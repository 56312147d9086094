//! Conversion between chunks and their stored form.
//!
//! A stored chunk lists only populated cells, keyed by `"lx,ly,lz"`:
//!
//! ```json
//! { "x": 1, "z": -2, "blocks": { "0,0,0": "bedrock", "0,1,0": "dirt" } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{chunk_creation::ChunkCreationIterator, Chunk};
use crate::core::error::ChunkError;
use crate::engine_state::voxels::{block::block_type::BlockType, coords::ChunkCoord};

/// Stored form of a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Chunk X coordinate.
    pub x: i32,
    /// Chunk Z coordinate.
    pub z: i32,
    /// Every non-air block, keyed by its local position.
    pub blocks: BTreeMap<String, BlockType>,
}

impl ChunkRecord {
    /// Coordinate the record describes.
    pub fn coord(&self) -> ChunkCoord {
        ChunkCoord::new(self.x, self.z)
    }
}

fn block_key(x: i32, y: i32, z: i32) -> String {
    format!("{x},{y},{z}")
}

fn parse_block_key(key: &str) -> Result<(i32, i32, i32), ChunkError> {
    let mut parts = key.split(',').map(|part| part.trim().parse::<i32>());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok((x, y, z)),
        _ => Err(ChunkError::MalformedKey(key.to_string())),
    }
}

impl Chunk {
    /// Captures every populated block.
    pub fn serialize(&self) -> ChunkRecord {
        ChunkRecord {
            x: self.position.x,
            z: self.position.z,
            blocks: self
                .blocks_iter()
                .map(|((x, y, z), block_type)| (block_key(x, y, z), block_type))
                .collect(),
        }
    }

    /// Rebuilds a chunk from a record.
    ///
    /// The chunk comes back dirty and without unsaved changes.
    ///
    /// # Errors
    /// A key that is not three comma-separated integers, or that lies outside
    /// the chunk, rejects the whole record.
    pub fn deserialize(record: &ChunkRecord) -> Result<Chunk, ChunkError> {
        let mut builder = ChunkCreationIterator::new(record.coord());
        for (key, block_type) in &record.blocks {
            let (x, y, z) = parse_block_key(key)?;
            if Chunk::index_of(x, y, z).is_none() {
                return Err(ChunkError::OutOfBounds(key.clone()));
            }
            builder.push_block_type(x, y, z, *block_type);
        }
        Ok(builder.return_chunk())
    }
}
