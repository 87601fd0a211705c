//! First-person camera: world position plus yaw/pitch/roll rotation. Blends
//! involving a free camera steer a virtual look target held at a fixed
//! distance in front of the eye.

use nalgebra_glm as glm;
use std::f32::consts::FRAC_PI_2;

use crate::camera::state::{CameraState, Viewport, WorldSize, world_size};
use crate::math::{EPSILON, quat_from_yaw_pitch_roll};

/// Distance of the virtual look target in front of a free camera.
pub const VIRTUAL_TARGET_DISTANCE: f32 = 5.0;

/// Live free camera.
#[derive(Debug, Clone)]
pub struct FreeCamera {
    pub position: glm::Vec3,
    /// Euler rotation, radians: x pitch, y yaw, z roll.
    pub rotation: glm::Vec3,
    pub fov: f32,
    pub min_z: f32,
    pub pseudo_orthogonal_position: Option<glm::Vec3>,
    pub real_state_position: Option<glm::Vec3>,
}

impl FreeCamera {
    pub fn new(position: glm::Vec3, fov: f32, min_z: f32) -> Self {
        Self {
            position,
            rotation: glm::Vec3::zeros(),
            fov,
            min_z,
            pseudo_orthogonal_position: None,
            real_state_position: None,
        }
    }

    /// Unit look direction derived from the Euler rotation.
    pub fn forward(&self) -> glm::Vec3 {
        let orientation =
            quat_from_yaw_pitch_roll(self.rotation.y, self.rotation.x, self.rotation.z);
        glm::quat_rotate_vec3(&orientation, &glm::vec3(0.0, 0.0, 1.0))
    }

    /// Point the camera at a world-space target.
    pub fn set_target(&mut self, target: &glm::Vec3) {
        self.rotation = rotation_from(&self.position, target);
    }

    /// Look target held [`VIRTUAL_TARGET_DISTANCE`] in front of the eye.
    pub fn virtual_target(&self) -> glm::Vec3 {
        self.position + self.forward() * VIRTUAL_TARGET_DISTANCE
    }
}

/// Captured free-camera state.
#[derive(Debug, Clone)]
pub struct FreeState {
    pub position: glm::Vec3,
    pub rotation: glm::Vec3,
    pub target: glm::Vec3,
    pub radius: f32,
    pub fov: f32,
    pub pseudo_orthogonal_position: Option<glm::Vec3>,
    pub view_to_world_scale: Option<f32>,
    pub view_world_size: Option<WorldSize>,
}

impl FreeState {
    pub fn from_camera(camera: &FreeCamera, viewport: &Viewport) -> Self {
        let target = camera.virtual_target();
        let mut state = Self {
            position: camera.position,
            rotation: camera.rotation,
            target,
            radius: glm::distance(&camera.position, &target),
            fov: camera.fov,
            pseudo_orthogonal_position: camera.pseudo_orthogonal_position,
            view_to_world_scale: None,
            view_world_size: None,
        };
        state.setup_world_size(viewport);
        state
    }

    pub(crate) fn from_camera_raw(camera: &FreeCamera) -> Self {
        let target = camera.virtual_target();
        Self {
            position: camera.position,
            rotation: camera.rotation,
            target,
            radius: glm::distance(&camera.position, &target),
            fov: camera.fov,
            pseudo_orthogonal_position: camera.pseudo_orthogonal_position,
            view_to_world_scale: None,
            view_world_size: None,
        }
    }

    /// Convert any snapshot into free-camera parameterization.
    pub fn from_state(state: &CameraState, viewport: &Viewport) -> Self {
        let position = state.position();
        let target = state.target();
        let mut result = Self {
            position,
            rotation: rotation_from(&position, &target),
            target,
            radius: state.radius(),
            fov: state.fov(),
            pseudo_orthogonal_position: None,
            view_to_world_scale: None,
            view_world_size: None,
        };
        result.setup_world_size(viewport);
        result
    }

    /// Commit this state to a live camera.
    pub fn apply_to(&self, camera: &mut FreeCamera) {
        camera.fov = self.fov;
        camera.position = self.position;
        camera.set_target(&self.target);
    }

    pub fn setup_world_size(&mut self, viewport: &Viewport) {
        self.view_world_size = Some(world_size(
            viewport,
            self.view_to_world_scale,
            self.fov,
            &self.position,
            &self.target,
        ));
    }

    pub fn orientation(&self) -> glm::Quat {
        quat_from_yaw_pitch_roll(self.rotation.y, self.rotation.x, self.rotation.z)
    }
}

/// Euler rotation needed for a camera at `position` to face `target`.
/// A zero direction yields the zero rotation.
pub fn rotation_from(position: &glm::Vec3, target: &glm::Vec3) -> glm::Vec3 {
    if glm::length(&(target - position)) == 0.0 {
        return glm::Vec3::zeros();
    }

    // A perfectly z-aligned pair makes the look-at matrix singular.
    let mut position = *position;
    if position.z == target.z {
        position.z += EPSILON;
    }

    let view = glm::look_at_lh(&position, target, &glm::vec3(0.0, 1.0, 0.0));
    let world = glm::inverse(&view);
    let mut pitch = (world[(2, 1)] / world[(2, 2)]).atan();

    let direction = target - position;
    let mut yaw = if direction.x >= 0.0 {
        -(direction.z / direction.x).atan() + FRAC_PI_2
    } else {
        -(direction.z / direction.x).atan() - FRAC_PI_2
    };

    if pitch.is_nan() {
        pitch = 0.0;
    }
    if yaw.is_nan() {
        yaw = 0.0;
    }

    glm::vec3(pitch, yaw, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn zero_direction_yields_zero_rotation() {
        let p = glm::vec3(1.0, 2.0, 3.0);
        assert_eq!(rotation_from(&p, &p), glm::Vec3::zeros());
    }

    #[test]
    fn looking_down_positive_z_is_identity_rotation() {
        let rotation = rotation_from(&glm::Vec3::zeros(), &glm::vec3(0.0, 0.0, 10.0));
        assert!(rotation.x.abs() < 1e-3);
        assert!(rotation.y.abs() < 1e-3);
    }

    #[test]
    fn yaw_quarter_turns() {
        let rotation = rotation_from(&glm::Vec3::zeros(), &glm::vec3(10.0, 0.0, 0.0));
        assert!((rotation.y - FRAC_PI_2).abs() < 1e-3);

        let rotation = rotation_from(&glm::Vec3::zeros(), &glm::vec3(-10.0, 0.0, 0.0));
        assert!((rotation.y + FRAC_PI_2).abs() < 1e-3);

        let rotation = rotation_from(&glm::Vec3::zeros(), &glm::vec3(0.0, 0.0, -10.0));
        assert!((rotation.y.abs() - PI).abs() < 1e-3);
    }

    #[test]
    fn pitch_looks_down_at_lower_target() {
        let rotation = rotation_from(&glm::vec3(0.0, 10.0, 0.0), &glm::vec3(0.0, 0.0, 10.0));
        assert!(rotation.x > 0.0);
        assert!(rotation.x < FRAC_PI_2);
    }

    #[test]
    fn set_target_then_forward_round_trip() {
        let mut camera = FreeCamera::new(glm::vec3(1.0, 2.0, -3.0), 1.75, 0.1);
        let target = glm::vec3(6.0, -1.0, 4.0);
        camera.set_target(&target);

        let expected = glm::normalize(&(target - camera.position));
        let forward = camera.forward();
        assert!(glm::distance(&forward, &expected) < 1e-3);
    }

    #[test]
    fn capture_commit_round_trip() {
        let viewport = Viewport {
            width: 1000.0,
            height: 1000.0,
        };
        let mut camera = FreeCamera::new(glm::vec3(2.0, 5.0, -8.0), 1.75, 0.1);
        camera.set_target(&glm::vec3(10.0, 1.0, 4.0));

        let state = FreeState::from_camera(&camera, &viewport);
        assert!((state.radius - VIRTUAL_TARGET_DISTANCE).abs() < 1e-4);

        let mut other = FreeCamera::new(glm::Vec3::zeros(), 1.0, 0.1);
        state.apply_to(&mut other);

        assert!(glm::distance(&camera.position, &other.position) < 1e-5);
        assert!((camera.fov - other.fov).abs() < 1e-6);
        assert!(glm::distance(&camera.forward(), &other.forward()) < 1e-3);
    }

    #[test]
    fn virtual_target_sits_at_fixed_distance() {
        let camera = FreeCamera::new(glm::vec3(0.0, 1.4, -30.0), 1.75, 0.1);
        let target = camera.virtual_target();
        assert!((glm::distance(&camera.position, &target) - VIRTUAL_TARGET_DISTANCE).abs() < 1e-4);
    }
}
