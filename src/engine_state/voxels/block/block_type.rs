//! # Block Type Module
//!
//! This module defines the closed set of block types in the voxel world and
//! their conversion to and from the compact integer form chunks store.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::{BlockProperties, BlockTypeSize, BLOCK_PROPERTIES};

/// Enumerates all possible block types in the voxel world.
///
/// `AIR` is the absence value: chunks are filled with it and it is never
/// serialized. Static properties of each type live in [`BLOCK_PROPERTIES`];
/// nothing about a block type can change at runtime.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BlockType {
    /// Empty space.
    AIR = 0,

    /// Surface block with a grass top and dirt sides.
    GRASS = 1,

    /// The layer just below the surface.
    DIRT = 2,

    /// Bulk of the terrain.
    STONE = 3,

    /// Unbreakable floor of the world at `y == 0`.
    BEDROCK = 4,

    /// Liquid, see-through.
    WATER = 5,

    /// Liquid, see-through.
    LAVA = 6,
}

impl BlockType {
    /// Every block type, in discriminant order.
    pub const ALL: [BlockType; 7] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::BEDROCK,
        BlockType::WATER,
        BlockType::LAVA,
    ];

    /// Converts a stored `BlockTypeSize` back to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value does not name a block type.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// The compact form stored inside chunks.
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Static properties of this block type.
    pub fn properties(self) -> &'static BlockProperties {
        &BLOCK_PROPERTIES[self as usize]
    }

    /// `true` for everything except `AIR`.
    pub fn is_present(self) -> bool {
        self != BlockType::AIR
    }

    /// Whether entities collide with the block.
    pub fn is_solid(self) -> bool {
        self.properties().solid
    }

    /// Whether the block is a liquid.
    pub fn is_liquid(self) -> bool {
        self.properties().liquid
    }

    /// Whether the block hides the faces of its neighbours.
    pub fn is_opaque(self) -> bool {
        self.properties().opaque
    }

    /// Whether players may remove the block.
    pub fn is_unbreakable(self) -> bool {
        self.properties().unbreakable
    }

    /// Material key handed to the renderer.
    pub fn texture_key(self) -> &'static str {
        self.properties().texture_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_round_trip() {
        for block_type in BlockType::ALL {
            assert_eq!(
                BlockType::get_block_type_from_int(block_type.as_int()),
                Some(block_type)
            );
        }
        assert_eq!(BlockType::get_block_type_from_int(200), None);
    }

    #[test]
    fn test_bedrock_is_unbreakable() {
        assert!(BlockType::BEDROCK.is_unbreakable());
        for block_type in BlockType::ALL {
            if block_type != BlockType::BEDROCK {
                assert!(!block_type.is_unbreakable(), "{block_type:?}");
            }
        }
    }

    #[test]
    fn test_liquids_are_not_solid_or_opaque() {
        for liquid in [BlockType::WATER, BlockType::LAVA] {
            assert!(liquid.is_liquid());
            assert!(!liquid.is_solid());
            assert!(!liquid.is_opaque());
        }
        assert!(BlockType::STONE.is_opaque());
        assert!(!BlockType::AIR.is_opaque());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&BlockType::BEDROCK).unwrap(), "\"bedrock\"");
        let parsed: BlockType = serde_json::from_str("\"lava\"").unwrap();
        assert_eq!(parsed, BlockType::LAVA);
    }
}
