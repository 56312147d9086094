//! Vertex data structures for voxel rendering.
//!
//! This module defines the interleaved vertex format handed to GPU-backed
//! render sinks.

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Chunk-relative position
    pub position: [f32; 3],
    /// Atlas texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Interleaves flat position (×3) and UV (×2) buffers.
    ///
    /// Trailing values that do not form a whole vertex are ignored.
    pub fn interleave(positions: &[f32], uvs: &[f32]) -> Vec<Vertex> {
        positions
            .chunks_exact(3)
            .zip(uvs.chunks_exact(2))
            .map(|(position, uv)| Vertex {
                position: [position[0], position[1], position[2]],
                tex_coords: [uv[0], uv[1]],
            })
            .collect()
    }
}
