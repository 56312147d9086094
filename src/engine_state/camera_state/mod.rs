//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - Chunk-based position tracking that drives proximity loading
//! - The view frustum used to cull chunks
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Accumulates input and updates camera state
//! - `Projection`: Manages the camera's projection matrix
//! - `FrustumCuller`: Rejects chunks outside the view volume

use cgmath::{Deg, Matrix4, Point3};

use super::voxels::coords::ChunkCoord;

pub mod camera;
pub mod frustum;

pub use camera::{Camera, CameraController, CameraInput, Projection};
pub use frustum::FrustumCuller;

/// Manages the camera, its controller and projection.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles pending camera movement
    pub camera_controller: CameraController,
    /// Camera projection settings
    pub projection: Projection,
    /// Chunk the camera was in after the last update
    chunk_position: ChunkCoord,
}

impl CameraState {
    /// Creates a camera at `position`, looking along positive X.
    pub fn new(position: Point3<f32>, projection: Projection) -> Self {
        let camera = Camera::new(position, Deg(0.0), Deg(0.0));
        let chunk_position = ChunkCoord::from_world_position(position.x, position.z);

        CameraState {
            camera,
            camera_controller: CameraController::new(8.0, 1.0),
            projection,
            chunk_position,
        }
    }

    /// Records input to apply on the next update.
    pub fn intake_actions(&mut self, actions: &CameraInput) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending input.
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera moved or turned
    /// - `None` if no input was pending
    pub fn update(&mut self, dt: web_time::Duration) -> Option<CameraUpdates> {
        if !self.camera_controller.has_updates() {
            return None;
        }

        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);

        let position = self.camera.position;
        let new_chunk_position = ChunkCoord::from_world_position(position.x, position.z);
        let changed_chunk = new_chunk_position != self.chunk_position;
        self.chunk_position = new_chunk_position;

        Some(CameraUpdates {
            new_chunk_position,
            changed_chunk,
        })
    }

    /// The chunk the camera is in.
    pub fn chunk_position(&self) -> ChunkCoord {
        self.chunk_position
    }

    /// Combined projection and view matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }
}

/// Result of a camera update that moved the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraUpdates {
    /// The chunk the camera is in now
    pub new_chunk_position: ChunkCoord,
    /// Whether that chunk differs from the one before the update
    pub changed_chunk: bool,
}
