//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the neighbour each
//! one looks at during face culling.

/// Represents the six possible faces of a voxel block.
///
/// The discriminants index the per-side texture table and the arrays returned
/// by face queries. The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The face looking towards negative X
    FRONT = 0,

    /// The face looking towards positive X
    BACK = 1,

    /// The face looking towards negative Y
    BOTTOM = 2,

    /// The face looking towards positive Y
    TOP = 3,

    /// The face looking towards negative Z
    LEFT = 4,

    /// The face looking towards positive Z
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Offset from a block to the neighbour this face touches.
    pub fn neighbor_offset(self) -> (i32, i32, i32) {
        match self {
            BlockSide::FRONT => (-1, 0, 0),
            BlockSide::BACK => (1, 0, 0),
            BlockSide::BOTTOM => (0, -1, 0),
            BlockSide::TOP => (0, 1, 0),
            BlockSide::LEFT => (0, 0, -1),
            BlockSide::RIGHT => (0, 0, 1),
        }
    }
}

/// A subset of the six faces of one block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceSet {
    bits: u8,
}

impl FaceSet {
    /// No faces.
    pub const EMPTY: FaceSet = FaceSet { bits: 0 };
    /// All six faces.
    pub const ALL: FaceSet = FaceSet { bits: 0b11_1111 };

    /// Adds a face to the set.
    pub fn insert(&mut self, side: BlockSide) {
        self.bits |= 1 << side as u8;
    }

    /// Whether the set holds `side`.
    pub fn contains(&self, side: BlockSide) -> bool {
        self.bits & (1 << side as u8) != 0
    }

    /// Number of faces in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether the set holds no face.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// The faces in the set, in [`BlockSide::all`] order.
    pub fn iter(&self) -> impl Iterator<Item = BlockSide> + '_ {
        BlockSide::all()
            .into_iter()
            .filter(move |side| self.contains(*side))
    }
}
