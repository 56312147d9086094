use cgmath::Point3;

use crate::engine_state::voxels::block::{
    atlas_uv_rect, block_side::BlockSide, block_type::BlockType, texture_index_for,
};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right, upper-left)
/// and contains information about the block type and which side of the block it represents.
/// Seen from outside the block the corners run counter-clockwise in the order
/// `ll, lr, ur, ul`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<i32>,
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<i32>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<i32>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<i32>,
    /// The block type, used for texture mapping
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the voxel in chunk space
    /// * `block_type` - The type of the block, used for texture mapping
    /// * `block_side` - Which side of the block this face represents
    pub fn new(i: i32, j: i32, k: i32, block_type: BlockType, block_side: BlockSide) -> Self {
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::BACK => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
            BlockSide::BOTTOM => (
                Point3::new(i, j, k + 1),
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
            ),
            BlockSide::TOP => (
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ),
            BlockSide::LEFT => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::RIGHT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            block_type,
            block_side,
        }
    }

    /// Corner positions in emission order `ll, lr, ur, ul`.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        [self.ll, self.lr, self.ur, self.ul]
    }

    /// Atlas UVs matching [`Face::corners`].
    ///
    /// The bottom edge of the face maps to the bottom edge of its tile.
    pub fn uvs(&self) -> [[f32; 2]; 4] {
        let (u0, v0, u1, v1) = atlas_uv_rect(texture_index_for(self.block_type, self.block_side));
        [[u0, v1], [u1, v1], [u1, v0], [u0, v0]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn test_winding_faces_outward() {
        for side in BlockSide::all() {
            let face = Face::new(0, 0, 0, BlockType::STONE, side);
            let [a, b, c, _] = face.corners().map(|p| p.cast::<f32>().unwrap());
            let normal = (b - a).cross(c - a).normalize();

            let (dx, dy, dz) = side.neighbor_offset();
            let expected = Vector3::new(dx as f32, dy as f32, dz as f32);
            assert!((normal - expected).magnitude() < 1e-5, "{side:?}: {normal:?}");
        }
    }

    #[test]
    fn test_corners_lie_on_unit_square() {
        for side in BlockSide::all() {
            let corners = Face::new(3, 4, 5, BlockType::DIRT, side).corners();
            for corner in corners {
                assert!((3..=4).contains(&corner.x));
                assert!((4..=5).contains(&corner.y));
                assert!((5..=6).contains(&corner.z));
            }
        }
    }

    #[test]
    fn test_uvs_cover_the_tile() {
        let face = Face::new(0, 0, 0, BlockType::GRASS, BlockSide::TOP);
        let (u0, v0, u1, v1) = atlas_uv_rect(3);
        assert_eq!(face.uvs(), [[u0, v1], [u1, v1], [u1, v0], [u0, v0]]);
    }
}
