//! Per-block-type instance transforms.
//!
//! An alternative to chunk meshes for renderers that draw one cube model per
//! block type: every block with at least one exposed face contributes a
//! translation matrix to the batch of its type.

use std::collections::BTreeMap;

use cgmath::{Matrix4, Vector3};
use log::trace;

use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};

/// GPU layout of one instance transform.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// Instance placing a unit cube with its minimum corner at `position`.
    pub fn at(position: Vector3<f32>) -> Self {
        InstanceRaw {
            model: Matrix4::from_translation(position).into(),
        }
    }

    /// The translation column of the model matrix.
    pub fn translation(&self) -> [f32; 3] {
        let column = self.model[3];
        [column[0], column[1], column[2]]
    }
}

/// Instance transforms grouped by block type.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InstanceBatches {
    /// Transforms per block type, never longer than the cap
    pub batches: BTreeMap<BlockType, Vec<InstanceRaw>>,
    /// Instances dropped because a batch was full
    pub truncated: usize,
}

impl InstanceBatches {
    /// Collects the exposed blocks of `chunks`, keeping at most
    /// `max_per_type` transforms for each block type. Excess blocks are
    /// dropped without error.
    pub fn collect<'a>(chunks: impl IntoIterator<Item = &'a Chunk>, max_per_type: usize) -> Self {
        let mut instances = InstanceBatches::default();
        for chunk in chunks {
            let [origin_x, _, origin_z] = chunk.position.world_origin();
            for ((x, y, z), block_type) in chunk.blocks_iter() {
                if chunk.get_visible_faces(x, y, z).is_empty() {
                    continue;
                }

                let batch = instances.batches.entry(block_type).or_default();
                if batch.len() >= max_per_type {
                    instances.truncated += 1;
                    continue;
                }
                batch.push(InstanceRaw::at(Vector3::new(
                    origin_x + x as f32,
                    y as f32,
                    origin_z + z as f32,
                )));
            }
        }

        if instances.truncated > 0 {
            trace!("Dropped {} instances over the per-type cap", instances.truncated);
        }
        instances
    }

    /// Transforms of one block type.
    pub fn get(&self, block_type: BlockType) -> &[InstanceRaw] {
        self.batches.get(&block_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of transforms across all batches.
    pub fn len(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// Whether no batch holds a transform.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
