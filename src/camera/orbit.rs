//! Spherical/target-relative camera: azimuth `alpha`, polar angle `beta` and
//! `radius` around a look-at `target`.

use nalgebra_glm as glm;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::camera::state::{CameraState, Viewport, WorldSize, world_size};
use crate::math::normalize_angle;

/// Radius floor used when position and target coincide.
const RADIUS_FLOOR: f32 = 1e-4;

/// Optional per-camera limits applied by [`OrbitState::check_limits`].
#[derive(Debug, Clone, Default)]
pub struct OrbitLimits {
    pub lower_alpha: Option<f32>,
    pub upper_alpha: Option<f32>,
    pub lower_beta: Option<f32>,
    pub upper_beta: Option<f32>,
    pub lower_radius: Option<f32>,
    pub upper_radius: Option<f32>,
    pub allow_upside_down: bool,
}

/// Live orbit camera. The host mirrors these values into its engine camera
/// every frame; `position` is derived from the spherical parameters.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: glm::Vec3,
    pub fov: f32,
    pub min_z: f32,
    pub limits: OrbitLimits,
    /// Set while the camera operates in pseudo-orthographic mode: the
    /// position reported for rendering differs from the real close-in
    /// position kept in `real_state_position`.
    pub pseudo_orthogonal_position: Option<glm::Vec3>,
    pub real_state_position: Option<glm::Vec3>,
}

impl OrbitCamera {
    pub fn new(fov: f32, min_z: f32) -> Self {
        Self {
            alpha: 0.0,
            beta: -FRAC_PI_2,
            radius: 0.0,
            target: glm::Vec3::zeros(),
            fov,
            min_z,
            limits: OrbitLimits::default(),
            pseudo_orthogonal_position: None,
            real_state_position: None,
        }
    }

    /// World-space eye position derived from the spherical parameters.
    pub fn position(&self) -> glm::Vec3 {
        let sin_beta = self.beta.sin();
        self.target
            + self.radius
                * glm::vec3(
                    sin_beta * self.alpha.cos(),
                    self.beta.cos(),
                    sin_beta * self.alpha.sin(),
                )
    }

    /// Look direction of the live camera (always at the target).
    pub fn forward(&self) -> glm::Vec3 {
        let direction = self.target - self.position();
        let length = glm::length(&direction);
        if length == 0.0 {
            glm::vec3(0.0, 0.0, 1.0)
        } else {
            direction / length
        }
    }
}

/// Captured orbit-camera state.
#[derive(Debug, Clone)]
pub struct OrbitState {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub fov: f32,
    pub position: glm::Vec3,
    pub target: glm::Vec3,
    pub pseudo_orthogonal_position: Option<glm::Vec3>,
    pub view_to_world_scale: Option<f32>,
    pub view_world_size: Option<WorldSize>,
}

impl OrbitState {
    /// Public capture: angles renormalized to `[0, 2π)`, world size refreshed.
    pub fn from_camera(camera: &OrbitCamera, viewport: &Viewport) -> Self {
        let mut state = Self {
            alpha: normalize_angle(camera.alpha),
            beta: normalize_angle(camera.beta),
            radius: camera.radius,
            fov: camera.fov,
            position: camera.position(),
            target: camera.target,
            pseudo_orthogonal_position: camera.pseudo_orthogonal_position,
            view_to_world_scale: None,
            view_world_size: None,
        };
        state.setup_world_size(viewport);
        state
    }

    /// Raw per-frame bookkeeping snapshot. Angles deliberately stay
    /// unnormalized so frame-to-frame deltas never alias across the 2π seam.
    pub(crate) fn from_camera_raw(camera: &OrbitCamera) -> Self {
        Self {
            alpha: camera.alpha,
            beta: camera.beta,
            radius: camera.radius,
            fov: camera.fov,
            position: camera.position(),
            target: camera.target,
            pseudo_orthogonal_position: camera.pseudo_orthogonal_position,
            view_to_world_scale: None,
            view_world_size: None,
        }
    }

    /// Convert any snapshot into orbit parameterization.
    pub fn from_state(state: &CameraState, viewport: &Viewport) -> Self {
        let mut result = Self {
            alpha: 0.0,
            beta: 0.0,
            radius: 0.0,
            fov: state.fov(),
            position: state.position(),
            target: state.target(),
            pseudo_orthogonal_position: None,
            view_to_world_scale: None,
            view_world_size: None,
        };
        result.setup_from_target_position();
        result.setup_world_size(viewport);
        result
    }

    /// Commit this state to a live camera. Angles are normalized on commit.
    pub fn apply_to(&self, camera: &mut OrbitCamera) {
        camera.target = self.target;
        camera.radius = self.radius;
        camera.alpha = normalize_angle(self.alpha);
        camera.beta = normalize_angle(self.beta);
        camera.fov = self.fov;
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

    /// Derive `radius`, `alpha` and `beta` from `position` and `target`.
    pub fn setup_from_target_position(&mut self) {
        let offset = self.position - self.target;

        self.radius = glm::length(&offset);
        if self.radius == 0.0 {
            self.radius = RADIUS_FLOOR;
        }

        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        if offset.x == 0.0 && offset.z == 0.0 {
            // looking along the up axis, acos(0)
            self.alpha = FRAC_PI_2;
        } else {
            self.alpha = (offset.x / horizontal).acos();
        }

        if offset.z < 0.0 {
            self.alpha = TAU - self.alpha;
        }

        self.beta = (offset.y / self.radius).acos();
    }

    /// Look-direction quaternion built from the spherical angles. The basis
    /// construction is unconventional but must match the committed camera
    /// orientation exactly, so it is kept verbatim.
    pub fn orientation(&self) -> glm::Quat {
        let unit = glm::vec3(
            (self.alpha + PI).cos() * (self.beta + TAU).cos(),
            (self.beta + TAU).sin(),
            (self.alpha + PI).sin() * (self.beta + TAU).cos(),
        );

        let forward = -unit;
        let right = glm::normalize(&glm::cross(&forward, &glm::vec3(0.0, -1.0, 0.0)));
        let up = glm::cross(&forward, &right);

        glm::mat3_to_quat(&glm::Mat3::from_columns(&[right, up, forward]))
    }

    /// Clamp or wrap the spherical parameters against camera limits.
    pub fn check_limits(&mut self, limits: &OrbitLimits) {
        match limits.lower_beta {
            None => {
                if limits.allow_upside_down && self.beta > PI {
                    self.beta -= TAU;
                }
            }
            Some(lower) => {
                if self.beta < lower {
                    self.beta = lower;
                }
            }
        }

        match limits.upper_beta {
            None => {
                if limits.allow_upside_down && self.beta < -PI {
                    self.beta += TAU;
                }
            }
            Some(upper) => {
                if self.beta > upper {
                    self.beta = upper;
                }
            }
        }

        if let Some(lower) = limits.lower_alpha
            && self.alpha < lower
        {
            self.alpha = lower;
        }
        if let Some(upper) = limits.upper_alpha
            && self.alpha > upper
        {
            self.alpha = upper;
        }

        if let Some(lower) = limits.lower_radius
            && self.radius < lower
        {
            self.radius = lower;
        }
        if let Some(upper) = limits.upper_radius
            && self.radius > upper
        {
            self.radius = upper;
        }
    }

    /// Adjust `alpha` on whichever endpoint can be corrected so the blend
    /// takes the short way around the circle. Greedy first-match: when both
    /// endpoints would need correction in conflicting directions the path can
    /// stay non-optimal (kept for compatibility with the committed behavior).
    pub fn correct_shortest_alpha(&mut self, target: &mut OrbitState) {
        if (self.alpha - target.alpha).abs() > PI {
            if let Some(corrected) = correct_rotation(self.alpha) {
                self.alpha = corrected;
            } else if let Some(corrected) = correct_rotation(target.alpha) {
                target.alpha = corrected;
            }
        }
    }
}

fn correct_rotation(rotation: f32) -> Option<f32> {
    if rotation < FRAC_PI_2 {
        Some(rotation + TAU)
    } else if rotation > PI + FRAC_PI_2 {
        Some(rotation - TAU)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 1000.0,
    };

    #[test]
    fn capture_commit_round_trip() {
        let mut camera = OrbitCamera::new(1.75, 0.1);
        camera.alpha = 0.7;
        camera.beta = 1.1;
        camera.radius = 25.0;
        camera.target = glm::vec3(3.0, -2.0, 8.0);

        let state = OrbitState::from_camera(&camera, &VIEWPORT);
        let mut other = OrbitCamera::new(1.75, 0.1);
        state.apply_to(&mut other);

        assert!(glm::distance(&camera.position(), &other.position()) < 1e-4);
        assert!(glm::distance(&camera.target, &other.target) < 1e-5);
        assert!((camera.fov - other.fov).abs() < 1e-6);
    }

    #[test]
    fn radius_matches_position_target_distance() {
        let mut state = OrbitState::from_state(
            &CameraState::Orbit(OrbitState {
                alpha: 0.0,
                beta: 0.0,
                radius: 999.0, // stale, must be recomputed
                fov: 1.0,
                position: glm::vec3(0.0, 6.0, 8.0),
                target: glm::Vec3::zeros(),
                pseudo_orthogonal_position: None,
                view_to_world_scale: None,
                view_world_size: None,
            }),
            &VIEWPORT,
        );
        assert!((state.radius - 10.0).abs() < 1e-5);

        state.setup_from_target_position();
        assert!(
            (state.radius - glm::distance(&state.position, &state.target)).abs() < 1e-5
        );
    }

    #[test]
    fn degenerate_straight_up_offset_picks_half_pi_alpha() {
        let mut state = OrbitState {
            alpha: 0.0,
            beta: 0.0,
            radius: 0.0,
            fov: 1.0,
            position: glm::vec3(0.0, 5.0, 0.0),
            target: glm::Vec3::zeros(),
            pseudo_orthogonal_position: None,
            view_to_world_scale: None,
            view_world_size: None,
        };
        state.setup_from_target_position();
        assert!((state.alpha - FRAC_PI_2).abs() < 1e-6);
        assert!(state.beta.abs() < 1e-3);
        assert!((state.radius - 5.0).abs() < 1e-5);
    }

    #[test]
    fn coincident_position_and_target_floors_radius() {
        let mut state = OrbitState {
            alpha: 0.0,
            beta: 0.0,
            radius: 0.0,
            fov: 1.0,
            position: glm::Vec3::zeros(),
            target: glm::Vec3::zeros(),
            pseudo_orthogonal_position: None,
            view_to_world_scale: None,
            view_world_size: None,
        };
        state.setup_from_target_position();
        assert!(state.radius > 0.0);
        assert!(state.alpha.is_finite() && state.beta.is_finite());
    }

    #[test]
    fn shortest_alpha_takes_short_way_around() {
        let mut a = OrbitState {
            alpha: 0.1,
            beta: FRAC_PI_2,
            radius: 10.0,
            fov: 1.0,
            position: glm::Vec3::zeros(),
            target: glm::Vec3::zeros(),
            pseudo_orthogonal_position: None,
            view_to_world_scale: None,
            view_world_size: None,
        };
        let mut b = a.clone();
        b.alpha = TAU - 0.1;

        a.correct_shortest_alpha(&mut b);
        let delta = (a.alpha - b.alpha).abs();
        assert!(delta <= PI, "delta {delta} should rotate the short way");
        assert!((delta - 0.2).abs() < 1e-5);
    }

    #[test]
    fn limits_clamp_and_wrap() {
        let mut limits = OrbitLimits::default();
        limits.allow_upside_down = true;

        let mut state = OrbitState {
            alpha: 0.0,
            beta: PI + 0.5,
            radius: 10.0,
            fov: 1.0,
            position: glm::Vec3::zeros(),
            target: glm::Vec3::zeros(),
            pseudo_orthogonal_position: None,
            view_to_world_scale: None,
            view_world_size: None,
        };
        state.check_limits(&limits);
        assert!((state.beta - (PI + 0.5 - TAU)).abs() < 1e-5);

        limits.allow_upside_down = false;
        limits.lower_radius = Some(20.0);
        limits.upper_alpha = Some(1.0);
        state.alpha = 2.0;
        state.check_limits(&limits);
        assert_eq!(state.alpha, 1.0);
        assert_eq!(state.radius, 20.0);
    }
}
