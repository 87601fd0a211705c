//! Shared camera-state data model.
//!
//! A [`CameraState`] is a value-object snapshot of one of the two live
//! cameras. Snapshots are captured from a camera, blended by the
//! interpolation session and committed back; they never alias live camera
//! storage.

use nalgebra_glm as glm;

use crate::camera::free::FreeState;
use crate::camera::orbit::OrbitState;
use crate::math::lerp;

/// Screen dimensions in pixels, provided by the host window.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Visible world-space extent at the target plane. Only used to keep the
/// apparent object size continuous while the field of view is interpolated,
/// never for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

/// Snapshot of a live camera, tagged by camera paradigm.
#[derive(Debug, Clone)]
pub enum CameraState {
    Orbit(OrbitState),
    Free(FreeState),
}

impl CameraState {
    pub fn position(&self) -> glm::Vec3 {
        match self {
            CameraState::Orbit(s) => s.position,
            CameraState::Free(s) => s.position,
        }
    }

    pub fn target(&self) -> glm::Vec3 {
        match self {
            CameraState::Orbit(s) => s.target,
            CameraState::Free(s) => s.target,
        }
    }

    pub fn fov(&self) -> f32 {
        match self {
            CameraState::Orbit(s) => s.fov,
            CameraState::Free(s) => s.fov,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            CameraState::Orbit(s) => s.radius,
            CameraState::Free(s) => s.radius,
        }
    }

    pub fn pseudo_orthogonal_position(&self) -> Option<glm::Vec3> {
        match self {
            CameraState::Orbit(s) => s.pseudo_orthogonal_position,
            CameraState::Free(s) => s.pseudo_orthogonal_position,
        }
    }

    pub fn set_position(&mut self, position: glm::Vec3) {
        match self {
            CameraState::Orbit(s) => s.position = position,
            CameraState::Free(s) => s.position = position,
        }
    }

    pub fn set_target(&mut self, target: glm::Vec3) {
        match self {
            CameraState::Orbit(s) => s.target = target,
            CameraState::Free(s) => s.target = target,
        }
    }

    pub fn set_fov(&mut self, fov: f32) {
        match self {
            CameraState::Orbit(s) => s.fov = fov,
            CameraState::Free(s) => s.fov = fov,
        }
    }

    pub fn set_radius(&mut self, radius: f32) {
        match self {
            CameraState::Orbit(s) => s.radius = radius,
            CameraState::Free(s) => s.radius = radius,
        }
    }

    pub(crate) fn clear_pseudo_orthogonal(&mut self) {
        match self {
            CameraState::Orbit(s) => s.pseudo_orthogonal_position = None,
            CameraState::Free(s) => s.pseudo_orthogonal_position = None,
        }
    }

    /// Look orientation of the snapshot.
    pub fn orientation(&self) -> glm::Quat {
        match self {
            CameraState::Orbit(s) => s.orientation(),
            CameraState::Free(s) => s.orientation(),
        }
    }

    /// Recompute `view_world_size` from either the pseudo-orthographic scale
    /// or from the fov and the distance to the target.
    pub fn setup_world_size(&mut self, viewport: &Viewport) {
        match self {
            CameraState::Orbit(s) => s.setup_world_size(viewport),
            CameraState::Free(s) => s.setup_world_size(viewport),
        }
    }
}

/// Requested destination for [`crate::camera::CameraRig::interpolate_to`].
/// Exactly one of the fields should be set; an empty descriptor is rejected.
#[derive(Debug, Clone, Default)]
pub struct CameraTarget {
    pub fov: Option<f32>,
    pub position: Option<glm::Vec3>,
    pub camera_state: Option<CameraState>,
}

impl CameraTarget {
    /// Zoom to a field of view, keeping the visual framing via dolly-zoom.
    pub fn fov(fov: f32) -> Self {
        Self {
            fov: Some(fov),
            ..Self::default()
        }
    }

    /// Move to a point, keeping the current orientation.
    pub fn position(position: glm::Vec3) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Transition to an explicit captured or constructed state.
    pub fn state(state: CameraState) -> Self {
        Self {
            camera_state: Some(state),
            ..Self::default()
        }
    }

    /// True when no destination field is set.
    pub fn is_empty(&self) -> bool {
        self.fov.is_none() && self.position.is_none() && self.camera_state.is_none()
    }
}

/// World size computation shared by both state variants.
pub(crate) fn world_size(
    viewport: &Viewport,
    view_to_world_scale: Option<f32>,
    fov: f32,
    position: &glm::Vec3,
    target: &glm::Vec3,
) -> WorldSize {
    let screen_aspect = viewport.aspect();

    if let Some(scale) = view_to_world_scale {
        if screen_aspect > 1.0 {
            let height = scale * screen_aspect;
            WorldSize {
                width: height * screen_aspect,
                height,
            }
        } else {
            let width = scale / screen_aspect;
            WorldSize {
                width,
                height: width / screen_aspect,
            }
        }
    } else {
        let width = (fov / 2.0).tan() * glm::distance(position, target) * 2.0;
        WorldSize {
            width,
            height: width / screen_aspect,
        }
    }
}

/// Blend two world-size snapshots; `None` when either endpoint has no size
/// bookkeeping yet.
pub(crate) fn interpolate_world_size(
    a: Option<WorldSize>,
    b: Option<WorldSize>,
    t: f32,
) -> Option<WorldSize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(WorldSize {
            width: lerp(a.width, b.width, t),
            height: lerp(a.height, b.height, t),
        }),
        _ => None,
    }
}

/// Recover a field of view that frames `world` at distance `adjacent`,
/// matched against the current screen aspect. This is what makes a
/// pseudo-orthographic zoom look rectilinear instead of a plain fov lerp.
pub(crate) fn fov_from_screen_aspect(
    viewport: &Viewport,
    adjacent: f32,
    world: &WorldSize,
) -> f32 {
    let snapshot_aspect = world.width / world.height;
    let snapshot_screen_height = viewport.width / snapshot_aspect;
    let screen_aspect = viewport.aspect();

    let opposite = if snapshot_screen_height > viewport.height {
        world.height * screen_aspect * 0.5
    } else {
        world.width * 0.5
    };

    opposite.atan2(adjacent) * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 1000.0,
    };

    #[test]
    fn world_size_from_fov_and_distance() {
        let size = world_size(
            &VIEWPORT,
            None,
            1.0,
            &glm::vec3(0.0, 0.0, -10.0),
            &glm::Vec3::zeros(),
        );
        assert!((size.width - (0.5f32.tan() * 20.0)).abs() < 1e-4);
        assert_eq!(size.width, size.height);
    }

    #[test]
    fn world_size_from_view_to_world_scale() {
        let size = world_size(
            &VIEWPORT,
            Some(4.0),
            1.0,
            &glm::Vec3::zeros(),
            &glm::Vec3::zeros(),
        );
        // square screen: aspect is exactly 1, either branch degenerates to scale
        assert!((size.width - 4.0).abs() < 1e-5);
        assert!((size.height - 4.0).abs() < 1e-5);
    }

    #[test]
    fn fov_recovery_inverts_world_size() {
        // width computed for fov 1.0 at distance 10 must map back to fov 1.0
        let size = WorldSize {
            width: 0.5f32.tan() * 20.0,
            height: 0.5f32.tan() * 20.0,
        };
        let fov = fov_from_screen_aspect(&VIEWPORT, 10.0, &size);
        assert!((fov - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_target_descriptor_is_default() {
        let t = CameraTarget::default();
        assert!(t.fov.is_none() && t.position.is_none() && t.camera_state.is_none());
    }
}
