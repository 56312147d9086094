//! # Terrain Generation
//!
//! Maps noise samples to columns of blocks. Every column is independent of
//! its neighbours, which is what lets whole chunks be generated on worker
//! threads from nothing but a coordinate and a copy of the generator.
//!
//! ## Stratification
//!
//! For a column of height `h`, block `y` (with `0 <= y < h`) is:
//! - `BEDROCK` at `y == 0`
//! - `STONE` while `y < h - 4`
//! - `DIRT` while `y < h - 1`
//! - `GRASS` on top
//!
//! Everything at or above `h` is air.

use serde::{Deserialize, Serialize};

use super::{
    block::block_type::BlockType,
    chunk::{CHUNK_DIMENSION, CHUNK_HEIGHT},
    coords::ChunkCoord,
    noise_generator::NoiseGenerator,
};
use crate::core::error::GenerationError;

/// Shape parameters of the height field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Surface height where the noise contribution is zero.
    pub base_height: f64,
    /// Height swing for a noise sample of `±1`.
    pub amplitude: f64,
    /// World distance divided out of X and Z before sampling.
    pub scale: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        TerrainParams {
            base_height: 64.0,
            amplitude: 24.0,
            scale: 64.0,
        }
    }
}

/// One generated block in chunk-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlacement {
    /// Local X in `0..16`.
    pub x: u8,
    /// Local Y in `0..256`.
    pub y: u8,
    /// Local Z in `0..16`.
    pub z: u8,
    /// Type placed at the position.
    pub block_type: BlockType,
}

/// Deterministic height-field terrain.
///
/// Cheap to clone: a copy travels with every generation task.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGenerator {
    noise: NoiseGenerator,
    params: TerrainParams,
}

impl TerrainGenerator {
    /// Creates a generator sampling noise seeded with `seed`.
    pub fn new(seed: u64, params: TerrainParams) -> Self {
        TerrainGenerator {
            noise: NoiseGenerator::new(seed),
            params,
        }
    }

    /// Shape parameters in use.
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Block type at height `y` of a column whose surface is `height`.
    ///
    /// Returns `AIR` for `y >= height`.
    pub fn stratum(y: usize, height: usize) -> BlockType {
        if y >= height {
            BlockType::AIR
        } else if y == 0 {
            BlockType::BEDROCK
        } else if y + 4 < height {
            BlockType::STONE
        } else if y + 1 < height {
            BlockType::DIRT
        } else {
            BlockType::GRASS
        }
    }

    /// Number of filled blocks in the column at a world position.
    ///
    /// The raw height is clamped to `1..=256` so every column keeps its
    /// bedrock floor and fits in a chunk.
    pub fn column_height(&self, world_x: i32, world_z: i32) -> Result<usize, GenerationError> {
        let sample = self.noise.noise(
            world_x as f64 / self.params.scale,
            0.0,
            world_z as f64 / self.params.scale,
        );
        let raw = (self.params.base_height + sample * self.params.amplitude).floor();
        if !raw.is_finite() {
            return Err(GenerationError::NonFiniteNoise { world_x, world_z });
        }
        Ok(raw.clamp(1.0, CHUNK_HEIGHT as f64) as usize)
    }

    /// The filled blocks of one column, bottom to top, as `(y, type)`.
    pub fn generate_column(
        &self,
        world_x: i32,
        world_z: i32,
    ) -> Result<Vec<(usize, BlockType)>, GenerationError> {
        let height = self.column_height(world_x, world_z)?;
        Ok((0..height).map(|y| (y, Self::stratum(y, height))).collect())
    }

    /// Generates every column of a chunk.
    ///
    /// Fails as a whole if any column fails; callers never see half a chunk.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> Result<Vec<BlockPlacement>, GenerationError> {
        let mut placements = Vec::new();
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let column = self.generate_column(coord.origin_x() + x, coord.origin_z() + z)?;
                placements.extend(column.into_iter().map(|(y, block_type)| BlockPlacement {
                    x: x as u8,
                    y: y as u8,
                    z: z as u8,
                    block_type,
                }));
            }
        }
        Ok(placements)
    }

    /// Fallback terrain: bedrock at `y == 0` under a single dirt layer.
    ///
    /// Installed when generation fails or a blocking load times out.
    pub fn flat_chunk() -> Vec<BlockPlacement> {
        let mut placements = Vec::with_capacity((CHUNK_DIMENSION * CHUNK_DIMENSION * 2) as usize);
        for z in 0..CHUNK_DIMENSION as u8 {
            for x in 0..CHUNK_DIMENSION as u8 {
                placements.push(BlockPlacement {
                    x,
                    y: 0,
                    z,
                    block_type: BlockType::BEDROCK,
                });
                placements.push(BlockPlacement {
                    x,
                    y: 1,
                    z,
                    block_type: BlockType::DIRT,
                });
            }
        }
        placements
    }
}
