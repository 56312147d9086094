//! # Camera Implementation
//!
//! A first-person camera, its perspective projection and the controller that
//! turns frame input into movement.
//!
//! The camera is a plain value: the world core reads its position for
//! proximity loading and its matrices for culling, and never reads devices.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;
use web_time::Duration;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU clip space has depth in `[0, 1]` instead of `[-1, 1]`; the frustum
/// planes are extracted with that convention.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Pitch stops just short of straight up or down.
const MAX_PITCH: Rad<f32> = Rad(FRAC_PI_2 - 0.0001);

/// Look deltas at or below this magnitude are treated as jitter.
const LOOK_DEADZONE: f64 = 0.5;

/// One frame of movement input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Look delta `(horizontal, vertical)`
    pub rotate_view: Option<(f64, f64)>,
}

/// First-person camera. At zero yaw and pitch it looks along positive X.
#[derive(Debug, Clone)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Rotation around Y
    pub yaw: Rad<f32>,
    /// Rotation around the camera's right axis
    pub pitch: Rad<f32>,
    /// Unit forward vector, kept in sync with yaw and pitch
    pub view_vec: Vector3<f32>,
}

impl Camera {
    /// Creates a camera at `position` with the given orientation.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let yaw = yaw.into();
        let pitch = pitch.into();
        Self {
            position: position.into(),
            yaw,
            pitch,
            view_vec: forward_from(yaw, pitch),
        }
    }

    /// Gets the camera's forward direction vector.
    pub fn get_view_vec(&self) -> Vector3<f32> {
        self.view_vec
    }

    /// World to view space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.view_vec, Vector3::unit_y())
    }

    /// Applies the controller's accumulated input over `dt` and resets it.
    ///
    /// Horizontal movement follows yaw only, so looking down does not slow
    /// walking. Pitch is clamped to [`MAX_PITCH`].
    pub fn get_controller_updates_and_reset_controller(
        &mut self,
        controller: &mut CameraController,
        dt: Duration,
    ) {
        let dt = dt.as_secs_f32();

        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);
        let movement = controller.movement * dt;
        self.position += forward * movement.z + right * movement.x + Vector3::unit_y() * movement.y;

        self.yaw += Rad(controller.rotation.x * dt);
        self.pitch = clamp_pitch(self.pitch - Rad(controller.rotation.y * dt));
        self.view_vec = forward_from(self.yaw, self.pitch);

        controller.reset();
    }
}

fn forward_from(yaw: Rad<f32>, pitch: Rad<f32>) -> Vector3<f32> {
    let (yaw_sin, yaw_cos) = yaw.0.sin_cos();
    let (pitch_sin, pitch_cos) = pitch.0.sin_cos();
    Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
}

fn clamp_pitch(pitch: Rad<f32>) -> Rad<f32> {
    Rad(pitch.0.clamp(-MAX_PITCH.0, MAX_PITCH.0))
}

/// Perspective projection parameters.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Width over height
    aspect: f32,
    /// Vertical field of view
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    /// Creates a projection for a `width` x `height` viewport.
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Far clipping plane distance.
    pub fn zfar(&self) -> f32 {
        self.zfar
    }

    /// View to WGPU clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Movement and rotation pending until the next camera update.
#[derive(Debug, Clone)]
pub struct CameraController {
    /// Camera-relative velocity: x right, y up, z forward
    movement: Vector3<f32>,
    /// Look rate: x horizontal, y vertical
    rotation: Vector2<f32>,
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// Creates a controller moving `speed` units per second.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            movement: Vector3::zero(),
            rotation: Vector2::zero(),
            speed,
            sensitivity,
        }
    }

    /// Records one frame of input. Opposite directions cancel.
    pub fn intake_actions(&mut self, actions: &CameraInput) {
        let axis = |positive: bool, negative: bool| positive as i8 as f32 - negative as i8 as f32;
        self.movement = Vector3::new(
            axis(actions.move_right, actions.move_left),
            axis(actions.move_up, actions.move_down),
            axis(actions.move_forward, actions.move_backward),
        ) * self.speed;

        if let Some((delta_x, delta_y)) = actions.rotate_view {
            if delta_x.abs() > LOOK_DEADZONE {
                self.rotation.x = delta_x as f32 * self.sensitivity;
            }
            if delta_y.abs() > LOOK_DEADZONE {
                self.rotation.y = delta_y as f32 * self.sensitivity;
            }
        }
    }

    /// Whether an update would move or turn the camera.
    pub fn has_updates(&self) -> bool {
        !self.movement.is_zero() || !self.rotation.is_zero()
    }

    fn reset(&mut self) {
        self.movement = Vector3::zero();
        self.rotation = Vector2::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view_is_positive_x() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        assert!((camera.get_view_vec() - Vector3::unit_x()).magnitude() < 1e-6);
    }

    #[test]
    fn test_forward_input_moves_along_view() {
        let mut camera = Camera::new(Point3::new(0.0, 10.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(4.0, 1.0);
        controller.intake_actions(&CameraInput {
            move_forward: true,
            ..Default::default()
        });
        assert!(controller.has_updates());

        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::from_millis(500));
        assert!((camera.position.x - 2.0).abs() < 1e-5);
        assert!((camera.position.y - 10.0).abs() < 1e-5);
        assert!(!controller.has_updates());
    }

    #[test]
    fn test_opposite_inputs_cancel() {
        let mut controller = CameraController::new(4.0, 1.0);
        controller.intake_actions(&CameraInput {
            move_left: true,
            move_right: true,
            rotate_view: Some((0.2, -0.1)),
            ..Default::default()
        });
        assert!(!controller.has_updates());
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(1.0, 1.0);
        controller.intake_actions(&CameraInput {
            rotate_view: Some((0.0, -1_000.0)),
            ..Default::default()
        });
        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::from_secs(1));
        assert_eq!(camera.pitch, MAX_PITCH);
        assert!(camera.view_vec.y > 0.99);
    }
}
