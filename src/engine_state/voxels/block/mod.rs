//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and the static
//! property table every block type reads from.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// Chunks store one of these per cell.
pub type BlockTypeSize = u8;

/// Static properties of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockProperties {
    /// Entities collide with the block.
    pub solid: bool,
    /// The block is a liquid.
    pub liquid: bool,
    /// The block hides neighbouring faces.
    pub opaque: bool,
    /// The block cannot be removed.
    pub unbreakable: bool,
    /// Material key handed to the renderer.
    pub texture_key: &'static str,
    /// Atlas tile for each face, in `BlockSide` order:
    /// [Front, Back, Bottom, Top, Left, Right]
    pub texture_indices: [usize; 6],
}

const fn solid(texture_key: &'static str, texture_indices: [usize; 6]) -> BlockProperties {
    BlockProperties {
        solid: true,
        liquid: false,
        opaque: true,
        unbreakable: false,
        texture_key,
        texture_indices,
    }
}

const fn liquid(texture_key: &'static str, texture_index: usize) -> BlockProperties {
    BlockProperties {
        solid: false,
        liquid: true,
        opaque: false,
        unbreakable: false,
        texture_key,
        texture_indices: [texture_index; 6],
    }
}

/// Properties of every block type, indexed by `BlockType as usize`.
pub static BLOCK_PROPERTIES: [BlockProperties; 7] = [
    // AIR
    BlockProperties {
        solid: false,
        liquid: false,
        opaque: false,
        unbreakable: false,
        texture_key: "air",
        texture_indices: [0; 6],
    },
    // GRASS (top: 3, bottom: 1, sides: 2)
    solid("grass", [2, 2, 1, 3, 2, 2]),
    // DIRT
    solid("dirt", [1; 6]),
    // STONE
    solid("stone", [4; 6]),
    // BEDROCK
    BlockProperties {
        unbreakable: true,
        ..solid("bedrock", [5; 6])
    },
    // WATER
    liquid("water", 6),
    // LAVA
    liquid("lava", 7),
];

/// Number of tiles along one edge of the square texture atlas.
pub const ATLAS_TILES_PER_ROW: usize = 8;

/// Returns the atlas UV rectangle `(u0, v0, u1, v1)` of a tile.
pub fn atlas_uv_rect(texture_index: usize) -> (f32, f32, f32, f32) {
    let tile = 1.0 / ATLAS_TILES_PER_ROW as f32;
    let column = (texture_index % ATLAS_TILES_PER_ROW) as f32;
    let row = (texture_index / ATLAS_TILES_PER_ROW) as f32;
    (column * tile, row * tile, (column + 1.0) * tile, (row + 1.0) * tile)
}

/// Atlas tile of one face of a block.
pub fn texture_index_for(block_type: BlockType, side: block_side::BlockSide) -> usize {
    block_type.properties().texture_indices[side as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_side::BlockSide;

    #[test]
    fn test_table_matches_enum_order() {
        for block_type in BlockType::ALL {
            let expected = format!("{block_type:?}").to_lowercase();
            assert_eq!(block_type.texture_key(), expected);
        }
    }

    #[test]
    fn test_grass_faces_use_distinct_tiles() {
        assert_eq!(texture_index_for(BlockType::GRASS, BlockSide::TOP), 3);
        assert_eq!(texture_index_for(BlockType::GRASS, BlockSide::BOTTOM), 1);
        assert_eq!(texture_index_for(BlockType::GRASS, BlockSide::FRONT), 2);
    }

    #[test]
    fn test_atlas_uv_rect() {
        let (u0, v0, u1, v1) = atlas_uv_rect(9);
        let tile = 1.0 / ATLAS_TILES_PER_ROW as f32;
        assert_eq!((u0, v0), (tile, tile));
        assert_eq!((u1, v1), (2.0 * tile, 2.0 * tile));
    }
}
