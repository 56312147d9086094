//! # Frustum Culling
//!
//! Extracts the six clip planes of a view-projection matrix and tests chunk
//! bounds against them.
//!
//! Planes follow the wgpu clip convention (depth in `[0, 1]`), which is what
//! [`super::camera::Projection::calc_matrix`] produces. Each plane is stored
//! normalised with its normal pointing into the frustum.
//!
//! The box test is the positive-vertex test: a box is rejected only when the
//! corner furthest along a plane's normal is still behind that plane. This
//! never rejects a box that intersects the frustum, but may accept a box
//! that sits just outside a frustum corner.

use cgmath::{InnerSpace, Matrix, Matrix4, Vector3, Vector4};

use crate::engine_state::voxels::coords::ChunkCoord;

/// A plane `normal · p + distance = 0`; points with a positive signed
/// distance lie inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal pointing into the frustum
    pub normal: Vector3<f32>,
    /// Offset from the origin along the normal
    pub distance: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = row.truncate();
        let length = normal.magnitude();
        if length > f32::EPSILON {
            Plane {
                normal: normal / length,
                distance: row.w / length,
            }
        } else {
            Plane {
                normal,
                distance: row.w,
            }
        }
    }

    /// Signed distance from `point` to the plane.
    pub fn distance_to_point(&self, point: Vector3<f32>) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// The view volume of a camera, as six planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumCuller {
    /// Left, right, bottom, top, near, far
    planes: [Plane; 6],
}

impl FrustumCuller {
    /// Builds the frustum of a view-projection matrix.
    pub fn from_view_projection(view_projection: &Matrix4<f32>) -> Self {
        let mut culler = FrustumCuller {
            planes: [Plane::from_row(Vector4::new(0.0, 0.0, 0.0, 0.0)); 6],
        };
        culler.update(view_projection);
        culler
    }

    /// Re-extracts the planes after the camera moved.
    pub fn update(&mut self, view_projection: &Matrix4<f32>) {
        let m = view_projection;
        let (row0, row1, row2, row3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        self.planes = [
            Plane::from_row(row3 + row0),
            Plane::from_row(row3 - row0),
            Plane::from_row(row3 + row1),
            Plane::from_row(row3 - row1),
            Plane::from_row(row2),
            Plane::from_row(row3 - row2),
        ];
    }

    /// The six planes: left, right, bottom, top, near, far.
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Whether a point lies inside every plane.
    pub fn contains_point(&self, point: Vector3<f32>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Whether the box `[min, max]` may intersect the frustum.
    pub fn is_aabb_visible(&self, min: [f32; 3], max: [f32; 3]) -> bool {
        self.planes.iter().all(|plane| {
            let positive = Vector3::new(
                if plane.normal.x >= 0.0 { max[0] } else { min[0] },
                if plane.normal.y >= 0.0 { max[1] } else { min[1] },
                if plane.normal.z >= 0.0 { max[2] } else { min[2] },
            );
            plane.distance_to_point(positive) >= 0.0
        })
    }

    /// Whether any part of a chunk column may be on screen.
    pub fn is_chunk_visible(&self, coord: ChunkCoord) -> bool {
        let (min, max) = coord.world_bounds();
        self.is_aabb_visible(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::camera_state::camera::{Camera, Projection};
    use cgmath::{Deg, Point3};

    fn culler_looking_along_x() -> FrustumCuller {
        let camera = Camera::new(Point3::new(-10.0, 128.0, 8.0), Deg(0.0), Deg(0.0));
        let projection = Projection::new(800, 800, Deg(90.0), 0.1, 100.0);
        FrustumCuller::from_view_projection(&(projection.calc_matrix() * camera.calc_matrix()))
    }

    #[test]
    fn test_chunk_in_front_is_visible() {
        let culler = culler_looking_along_x();
        assert!(culler.is_chunk_visible(ChunkCoord::new(0, 0)));
        assert!(culler.is_chunk_visible(ChunkCoord::new(2, 0)));
    }

    #[test]
    fn test_chunk_containing_camera_is_visible() {
        assert!(culler_looking_along_x().is_chunk_visible(ChunkCoord::new(-1, 0)));
    }

    #[test]
    fn test_chunk_behind_is_culled() {
        assert!(!culler_looking_along_x().is_chunk_visible(ChunkCoord::new(-3, 0)));
    }

    #[test]
    fn test_chunk_beyond_far_plane_is_culled() {
        assert!(!culler_looking_along_x().is_chunk_visible(ChunkCoord::new(20, 0)));
    }

    #[test]
    fn test_chunk_off_to_the_side_is_culled() {
        let culler = culler_looking_along_x();
        assert!(!culler.is_chunk_visible(ChunkCoord::new(0, 10)));
        assert!(!culler.is_chunk_visible(ChunkCoord::new(0, -10)));
    }

    #[test]
    fn test_planes_are_normalised() {
        for plane in culler_looking_along_x().planes() {
            assert!((plane.normal.magnitude() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_points() {
        let culler = culler_looking_along_x();
        assert!(culler.contains_point(Vector3::new(5.0, 128.0, 8.0)));
        assert!(!culler.contains_point(Vector3::new(-20.0, 128.0, 8.0)));
        assert!(!culler.contains_point(Vector3::new(200.0, 128.0, 8.0)));
    }
}
