// Numeric helpers shared by the camera-state code

pub mod bounds;
pub mod easing;

pub use bounds::{BoundingSphere, Ray, signed_distance_to_sphere_surface};
pub use easing::{ease_in, ease_in_quint, ease_out, ease_out_quint, ease_out_sine};

use nalgebra_glm as glm;
use std::f32::consts::TAU;

/// Small offset used to nudge degenerate look directions, matching the
/// engine-side epsilon.
pub const EPSILON: f32 = 0.001;

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut angle = angle % TAU;
    if angle < 0.0 {
        angle += TAU;
    }
    angle
}

/// Linear interpolation for scalars
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation for vectors
pub fn lerp_vec3(a: &glm::Vec3, b: &glm::Vec3, t: f32) -> glm::Vec3 {
    glm::lerp(a, b, t)
}

/// Build a rotation quaternion from yaw (around Y), pitch (around X) and
/// roll (around Z), applied in that order.
pub fn quat_from_yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> glm::Quat {
    let qy = glm::quat_angle_axis(yaw, &glm::vec3(0.0, 1.0, 0.0));
    let qx = glm::quat_angle_axis(pitch, &glm::vec3(1.0, 0.0, 0.0));
    let qz = glm::quat_angle_axis(roll, &glm::vec3(0.0, 0.0, 1.0));
    qy * qx * qz
}
