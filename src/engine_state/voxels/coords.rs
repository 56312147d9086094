//! Chunk coordinates and the world ↔ chunk-local mapping.
//!
//! All conversions use floored division so that negative world coordinates
//! land in the chunk to their "left": world X `-1` is local X `15` of chunk
//! `-1`, never local X `-1` of chunk `0`.

use serde::{Deserialize, Serialize};

use super::chunk::{CHUNK_DIMENSION, CHUNK_HEIGHT};

/// Horizontal position of a chunk, in chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk X; covers world X `x*16 .. x*16+16`.
    pub x: i32,
    /// Chunk Z; covers world Z `z*16 .. z*16+16`.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing a world-space block column.
    pub fn from_world(world_x: i32, world_z: i32) -> Self {
        Self {
            x: world_x.div_euclid(CHUNK_DIMENSION),
            z: world_z.div_euclid(CHUNK_DIMENSION),
        }
    }

    /// The chunk containing a floating point world position.
    pub fn from_world_position(x: f32, z: f32) -> Self {
        Self::from_world(x.floor() as i32, z.floor() as i32)
    }

    /// World-space block X of local X `0`.
    pub fn origin_x(&self) -> i32 {
        self.x * CHUNK_DIMENSION
    }

    /// World-space block Z of local Z `0`.
    pub fn origin_z(&self) -> i32 {
        self.z * CHUNK_DIMENSION
    }

    /// World-space origin `(cx*16, 0, cz*16)` handed to the renderer.
    pub fn world_origin(&self) -> [f32; 3] {
        [self.origin_x() as f32, 0.0, self.origin_z() as f32]
    }

    /// Axis-aligned bounds `(min, max)` of the chunk in world space.
    pub fn world_bounds(&self) -> ([f32; 3], [f32; 3]) {
        let min = self.world_origin();
        let max = [
            min[0] + CHUNK_DIMENSION as f32,
            CHUNK_HEIGHT as f32,
            min[2] + CHUNK_DIMENSION as f32,
        ];
        (min, max)
    }

    /// Every coordinate in the square of the given radius around `self`,
    /// row by row.
    pub fn square_around(&self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        let center = *self;
        (-radius..=radius).flat_map(move |dz| {
            (-radius..=radius).map(move |dx| ChunkCoord::new(center.x + dx, center.z + dz))
        })
    }
}

/// Splits a world-space block position into its chunk and local coordinates.
///
/// `y` passes through unchanged; chunks span the full height.
pub fn world_to_local(world_x: i32, world_y: i32, world_z: i32) -> (ChunkCoord, (i32, i32, i32)) {
    let coord = ChunkCoord::from_world(world_x, world_z);
    let local = (
        world_x.rem_euclid(CHUNK_DIMENSION),
        world_y,
        world_z.rem_euclid(CHUNK_DIMENSION),
    );
    (coord, local)
}

/// Inverse of [`world_to_local`].
pub fn local_to_world(coord: ChunkCoord, local_x: i32, local_y: i32, local_z: i32) -> (i32, i32, i32) {
    (coord.origin_x() + local_x, local_y, coord.origin_z() + local_z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floored_mapping_is_an_inverse() {
        for world_x in -100..100 {
            let (coord, (local_x, _, _)) = world_to_local(world_x, 0, 0);
            assert!((0..CHUNK_DIMENSION).contains(&local_x), "{world_x}");
            assert_eq!(coord.x * CHUNK_DIMENSION + local_x, world_x);
            assert_eq!(coord.x, (world_x as f64 / 16.0).floor() as i32);
        }
    }

    #[test]
    fn test_negative_coordinates() {
        let (coord, local) = world_to_local(-1, 10, -16);
        assert_eq!(coord, ChunkCoord::new(-1, -1));
        assert_eq!(local, (15, 10, 0));

        let (coord, local) = world_to_local(-17, 0, 15);
        assert_eq!(coord, ChunkCoord::new(-2, 0));
        assert_eq!(local, (15, 0, 15));
        assert_eq!(local_to_world(coord, local.0, local.1, local.2), (-17, 0, 15));
    }

    #[test]
    fn test_extreme_coordinates() {
        for world_x in [i32::MIN, i32::MIN + 1, i32::MAX - 1, i32::MAX] {
            let (coord, (local_x, _, _)) = world_to_local(world_x, 0, 0);
            assert!((0..CHUNK_DIMENSION).contains(&local_x));
            assert_eq!(
                coord.x as i64 * CHUNK_DIMENSION as i64 + local_x as i64,
                world_x as i64
            );
        }
    }

    #[test]
    fn test_from_world_position_floors() {
        assert_eq!(ChunkCoord::from_world_position(-0.5, 15.9), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world_position(16.0, -16.0), ChunkCoord::new(1, -1));
    }

    #[test]
    fn test_world_bounds() {
        let (min, max) = ChunkCoord::new(-2, 3).world_bounds();
        assert_eq!(min, [-32.0, 0.0, 48.0]);
        assert_eq!(max, [-16.0, 256.0, 64.0]);
    }

    #[test]
    fn test_square_around() {
        let coords: Vec<_> = ChunkCoord::new(5, -5).square_around(1).collect();
        assert_eq!(coords.len(), 9);
        assert!(coords.contains(&ChunkCoord::new(4, -6)));
        assert!(coords.contains(&ChunkCoord::new(6, -4)));
        assert_eq!(ChunkCoord::new(0, 0).square_around(0).count(), 1);
    }
}
