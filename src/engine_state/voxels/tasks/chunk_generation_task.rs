//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates the blocks
//! of one chunk on a worker. The task carries its own copy of the terrain
//! generator, so workers never touch the world.

use crate::{
    core::error::GenerationError,
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::{
            coords::ChunkCoord,
            terrain::{BlockPlacement, TerrainGenerator},
            world::World,
        },
    },
};

/// A task that generates the block placements of one chunk.
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkCoord,
    /// Generator with the world's seed and terrain parameters
    generator: TerrainGenerator,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    pub fn new(position: ChunkCoord, generator: TerrainGenerator) -> Self {
        ChunkGenerationTask {
            position,
            generator,
        }
    }

    /// Generates the chunk on the calling thread.
    pub fn generate(&self) -> ChunkGenerationTaskResult {
        ChunkGenerationTaskResult {
            position: self.position,
            placements: self.generator.generate_chunk(self.position),
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(self.generate())
    }
}

/// The result of a chunk generation task.
///
/// Either every placement of the chunk or the error that stopped generation;
/// never a partial chunk.
pub struct ChunkGenerationTaskResult {
    /// Chunk the placements belong to
    pub position: ChunkCoord,
    /// Generated placements, or why generation failed
    pub placements: Result<Vec<BlockPlacement>, GenerationError>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Hands the generated chunk to the world, which falls back to flat
    /// terrain on failure and inserts it into the cache.
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>> {
        world.complete_generation(self.position, self.placements);
        Vec::new()
    }

    fn describe(&self) -> String {
        match &self.placements {
            Ok(placements) => format!(
                "chunk {:?} generated, {} blocks",
                self.position,
                placements.len()
            ),
            Err(err) => format!("chunk {:?} failed: {}", self.position, err),
        }
    }
}
