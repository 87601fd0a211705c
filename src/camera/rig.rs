//! Owns the orbit and free cameras and drives timed blends between captured
//! states. One blend runs at a time; starting a new one interrupts the old.

use nalgebra_glm as glm;
use std::f32::consts::PI;
use tokio::sync::oneshot;

use crate::camera::free::{FreeCamera, FreeState, VIRTUAL_TARGET_DISTANCE, rotation_from};
use crate::camera::orbit::{OrbitCamera, OrbitState};
use crate::camera::state::{
    CameraState, CameraTarget, Viewport, fov_from_screen_aspect, interpolate_world_size,
};
use crate::error::ViewerError;
use crate::math::bounds::{BoundingSphere, Ray, signed_distance_to_sphere_surface};
use crate::math::easing::{ease_in, ease_in_quint, ease_out_quint, ease_out_sine};
use crate::math::{lerp, lerp_vec3};
use crate::settings::CameraSettings;

/// Blend duration in seconds.
pub const INTERPOLATION_DURATION: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Orbit,
    Free,
}

/// How a blend ended. A superseded blend resolves `Interrupted`; the camera
/// stays wherever the last frame left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationOutcome {
    Completed,
    Interrupted,
}

/// Handle returned by [`CameraRig::interpolate_to`]. Await [`wait`] for the
/// outcome, or poll [`try_outcome`] from a frame loop.
///
/// [`wait`]: InterpolationTicket::wait
/// [`try_outcome`]: InterpolationTicket::try_outcome
#[derive(Debug)]
pub struct InterpolationTicket {
    generation: u64,
    rx: oneshot::Receiver<InterpolationOutcome>,
}

impl InterpolationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn wait(self) -> InterpolationOutcome {
        self.rx.await.unwrap_or(InterpolationOutcome::Interrupted)
    }

    pub fn try_outcome(&mut self) -> Option<InterpolationOutcome> {
        self.rx.try_recv().ok()
    }
}

/// User input applied while a blend runs, folded additively into the blend
/// output so external movement survives the whole transition.
#[derive(Debug, Default)]
struct OrbitScratch {
    alpha: f32,
    beta: f32,
    radius: f32,
    target: glm::Vec3,
}

#[derive(Debug, Default)]
struct FreeScratch {
    position: glm::Vec3,
    rotation: glm::Vec3,
}

enum SessionBlend {
    Orbit {
        source: OrbitState,
        target: OrbitState,
        scratch: OrbitScratch,
        last: Option<OrbitState>,
    },
    Free {
        source: FreeState,
        target: FreeState,
        scratch: FreeScratch,
        last: Option<FreeState>,
    },
}

struct InterpolationSession {
    elapsed: f32,
    blend: SessionBlend,
    done: Option<oneshot::Sender<InterpolationOutcome>>,
}

impl Drop for InterpolationSession {
    fn drop(&mut self) {
        if let Some(tx) = self.done.take() {
            let _ = tx.send(InterpolationOutcome::Interrupted);
        }
    }
}

pub struct CameraRig {
    orbit: OrbitCamera,
    free: FreeCamera,
    active: CameraKind,
    viewport: Viewport,
    bounds: BoundingSphere,
    pseudo_orthogonal_distance_multiplier: f32,
    settings: CameraSettings,
    session: Option<InterpolationSession>,
    generation: u64,
}

impl CameraRig {
    /// `min`/`max` are the world extents of the loaded model.
    pub fn new(
        min: &glm::Vec3,
        max: &glm::Vec3,
        viewport: Viewport,
        settings: CameraSettings,
    ) -> Self {
        let bounds = BoundingSphere::from_extents(min, max);
        let pseudo_orthogonal_distance_multiplier = bounds.radius * 2.0 * 10.0;

        Self {
            orbit: OrbitCamera::new(settings.orbit_fov, settings.min_z),
            free: FreeCamera::new(glm::vec3(0.0, 1.4, -30.0), settings.free_fov, settings.min_z),
            active: CameraKind::Orbit,
            viewport,
            bounds,
            pseudo_orthogonal_distance_multiplier,
            settings,
            session: None,
            generation: 0,
        }
    }

    pub fn active(&self) -> CameraKind {
        self.active
    }

    pub fn set_active(&mut self, kind: CameraKind) {
        self.active = kind;
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitCamera {
        &mut self.orbit
    }

    pub fn free(&self) -> &FreeCamera {
        &self.free
    }

    pub fn free_mut(&mut self) -> &mut FreeCamera {
        &mut self.free
    }

    pub fn bounds(&self) -> &BoundingSphere {
        &self.bounds
    }

    pub fn is_interpolating(&self) -> bool {
        self.session.is_some()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Snapshot the active camera.
    pub fn capture(&self) -> CameraState {
        match self.active {
            CameraKind::Orbit => {
                CameraState::Orbit(OrbitState::from_camera(&self.orbit, &self.viewport))
            }
            CameraKind::Free => {
                CameraState::Free(FreeState::from_camera(&self.free, &self.viewport))
            }
        }
    }

    /// Commit a snapshot instantly, switching the active camera to match.
    /// Orbit snapshots are clamped against the camera's limits first.
    pub fn apply(&mut self, state: &CameraState) {
        match state {
            CameraState::Orbit(s) => {
                let mut s = s.clone();
                s.check_limits(&self.orbit.limits);
                s.apply_to(&mut self.orbit);
                self.active = CameraKind::Orbit;
            }
            CameraState::Free(s) => {
                s.apply_to(&mut self.free);
                self.active = CameraKind::Free;
            }
        }
    }

    /// Start a two-second blend from the active camera toward `target`.
    pub fn interpolate_to(
        &mut self,
        target: CameraTarget,
    ) -> Result<InterpolationTicket, ViewerError> {
        self.interpolate_from(self.active, target)
    }

    /// Like [`interpolate_to`], but the caller names the camera they believe
    /// is active. A mismatch is a host bug; the rig recovers by switching.
    ///
    /// [`interpolate_to`]: CameraRig::interpolate_to
    pub fn interpolate_from(
        &mut self,
        kind: CameraKind,
        target: CameraTarget,
    ) -> Result<InterpolationTicket, ViewerError> {
        // An empty descriptor rejects before anything is touched; a running
        // blend must survive the bad call.
        if target.is_empty() {
            return Err(ViewerError::NoInterpolationTarget);
        }

        if kind != self.active {
            log::error!("attempting to interpolate inactive camera");
            self.active = kind;
        }

        self.orbit.min_z = self.settings.min_z;
        self.free.min_z = self.settings.min_z;

        // Supersede any running blend before touching the cameras.
        self.session = None;

        let source = self.capture();
        let mut target_state = self.build_target_state(&source, target)?;

        let mut source = source;
        source.setup_world_size(&self.viewport);
        target_state.setup_world_size(&self.viewport);

        let (tx, rx) = oneshot::channel();
        let blend = self.make_blend(source, target_state);
        self.session = Some(InterpolationSession {
            elapsed: 0.0,
            blend,
            done: Some(tx),
        });

        self.generation += 1;
        Ok(InterpolationTicket {
            generation: self.generation,
            rx,
        })
    }

    /// Shorthand blend back to the default field of view of the active camera.
    pub fn reset_fov(&mut self) -> Result<InterpolationTicket, ViewerError> {
        let fov = match self.active {
            CameraKind::Orbit => self.settings.orbit_fov,
            CameraKind::Free => self.settings.free_fov,
        };
        self.interpolate_to(CameraTarget::fov(fov))
    }

    /// Drop out of orbit mode into a first-person camera standing at
    /// `position`, facing away from the orbit azimuth. Only meaningful while
    /// the orbit camera drives the view; a no-op (`None`) otherwise.
    pub fn change_to_free_mode(&mut self, position: glm::Vec3) -> Option<InterpolationTicket> {
        if self.active != CameraKind::Orbit {
            return None;
        }

        let offset = glm::vec3(
            (self.orbit.alpha + PI).cos(),
            0.0,
            (self.orbit.alpha + PI).sin(),
        ) * VIRTUAL_TARGET_DISTANCE;

        let mut state = FreeState::from_camera(&self.free, &self.viewport);
        state.position = position;
        state.target = position + offset;
        state.fov = self.settings.free_fov;

        self.interpolate_to(CameraTarget::state(CameraState::Free(state)))
            .ok()
    }

    /// Far-position orbit state that renders a nearly orthographic view of
    /// `target`, as restored from an orthographic viewpoint snapshot.
    pub fn pseudo_orthogonal_orbit_state(
        &self,
        position: glm::Vec3,
        target: glm::Vec3,
        view_to_world_scale: f32,
    ) -> OrbitState {
        let mut state = OrbitState {
            alpha: 0.0,
            beta: 0.0,
            radius: 0.0,
            fov: self.settings.orbit_fov,
            position,
            target,
            pseudo_orthogonal_position: None,
            view_to_world_scale: Some(view_to_world_scale),
            view_world_size: None,
        };
        state.setup_from_target_position();

        let direction = target - position;
        let length = glm::length(&direction);
        if length > 0.0 {
            let pseudo = position + direction / length * self.pseudo_orthogonal_distance_multiplier;
            state.pseudo_orthogonal_position = Some(pseudo);
            state.radius = glm::distance(&pseudo, &target);
        }

        state.setup_world_size(&self.viewport);
        state
    }

    /// Advance the running blend by `dt` seconds. No-op when idle.
    pub fn update(&mut self, dt: f32) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        session.elapsed += dt;
        let raw = session.elapsed / INTERPOLATION_DURATION;
        let eased_in = ease_in(raw);
        let t = raw.min(1.0);

        match &mut session.blend {
            SessionBlend::Orbit {
                source,
                target,
                scratch,
                last,
            } => {
                step_orbit(
                    &mut self.orbit,
                    &self.viewport,
                    t,
                    eased_in,
                    source,
                    target,
                    scratch,
                    last,
                );
            }
            SessionBlend::Free {
                source,
                target,
                scratch,
                last,
            } => {
                step_free(
                    &mut self.free,
                    &self.viewport,
                    t,
                    eased_in,
                    source,
                    target,
                    scratch,
                    last,
                );
            }
        }

        self.fix_pseudo_ortho_clipping();

        if t >= 1.0 {
            self.end_session(session);
        } else {
            self.session = Some(session);
        }
    }

    fn build_target_state(
        &mut self,
        source: &CameraState,
        target: CameraTarget,
    ) -> Result<CameraState, ViewerError> {
        if let Some(fov) = target.fov {
            let mut state = source.clone();

            let (pseudo, real, live_fov, forward) = match self.active {
                CameraKind::Orbit => (
                    self.orbit.pseudo_orthogonal_position,
                    self.orbit.real_state_position,
                    self.orbit.fov,
                    self.orbit.forward(),
                ),
                CameraKind::Free => (
                    self.free.pseudo_orthogonal_position,
                    self.free.real_state_position,
                    self.free.fov,
                    self.free.forward(),
                ),
            };

            if pseudo.is_some() {
                if let Some(real) = real {
                    state.set_position(real);
                    self.setup_conformal_dolly_zoom_position(live_fov, &forward, &mut state);
                    state.set_radius(glm::distance(&state.target(), &state.position()));
                }
                self.reset_cameras();
                state.clear_pseudo_orthogonal();
            }

            state.set_fov(fov);
            Ok(state)
        } else if let Some(position) = target.position {
            let mut state = source.clone();
            state.set_position(position);

            let direction =
                glm::quat_rotate_vec3(&source.orientation(), &glm::vec3(0.0, 0.0, 1.0));
            state.set_target(position + direction * VIRTUAL_TARGET_DISTANCE);
            Ok(state)
        } else if let Some(state) = target.camera_state {
            Ok(state)
        } else {
            Err(ViewerError::NoInterpolationTarget)
        }
    }

    fn make_blend(&mut self, source: CameraState, target: CameraState) -> SessionBlend {
        match (source, target) {
            // Cross-type blends convert the source into the destination
            // parameterization, commit it, and switch active early so the
            // rest of the blend runs same-type.
            (CameraState::Orbit(source), CameraState::Free(target)) => {
                self.active = CameraKind::Free;
                let converted = FreeState::from_state(&CameraState::Orbit(source), &self.viewport);
                converted.apply_to(&mut self.free);
                self.make_blend(CameraState::Free(converted), CameraState::Free(target))
            }
            (CameraState::Free(source), CameraState::Orbit(target)) => {
                self.active = CameraKind::Orbit;
                let converted = OrbitState::from_state(&CameraState::Free(source), &self.viewport);
                converted.apply_to(&mut self.orbit);
                self.make_blend(CameraState::Orbit(converted), CameraState::Orbit(target))
            }
            (CameraState::Orbit(mut source), CameraState::Orbit(mut target)) => {
                let pseudo = source
                    .pseudo_orthogonal_position
                    .or(target.pseudo_orthogonal_position);
                let real = if source.pseudo_orthogonal_position.is_some() {
                    source.position
                } else {
                    target.position
                };
                self.orbit.pseudo_orthogonal_position = pseudo;
                self.orbit.real_state_position = pseudo.map(|_| real);

                source.correct_shortest_alpha(&mut target);

                SessionBlend::Orbit {
                    source,
                    target,
                    scratch: OrbitScratch::default(),
                    last: None,
                }
            }
            (CameraState::Free(source), CameraState::Free(target)) => {
                let pseudo = source
                    .pseudo_orthogonal_position
                    .or(target.pseudo_orthogonal_position);
                let real = if source.pseudo_orthogonal_position.is_some() {
                    source.position
                } else {
                    target.position
                };
                self.free.pseudo_orthogonal_position = pseudo;
                self.free.real_state_position = pseudo.map(|_| real);

                SessionBlend::Free {
                    source,
                    target,
                    scratch: FreeScratch::default(),
                    last: None,
                }
            }
        }
    }

    fn end_session(&mut self, mut session: InterpolationSession) {
        match &session.blend {
            SessionBlend::Orbit { target, .. } => {
                if target.pseudo_orthogonal_position.is_none() {
                    self.reset_cameras();
                }
                target.apply_to(&mut self.orbit);
                self.active = CameraKind::Orbit;
            }
            SessionBlend::Free { target, .. } => {
                if target.pseudo_orthogonal_position.is_none() {
                    self.reset_cameras();
                }
                target.apply_to(&mut self.free);
                self.active = CameraKind::Free;
            }
        }

        if let Some(tx) = session.done.take() {
            let _ = tx.send(InterpolationOutcome::Completed);
        }
    }

    fn reset_cameras(&mut self) {
        if self.orbit.pseudo_orthogonal_position.is_some() {
            self.orbit.min_z = self.settings.min_z;
        }
        if self.free.pseudo_orthogonal_position.is_some() {
            self.free.min_z = self.settings.min_z;
        }

        self.orbit.pseudo_orthogonal_position = None;
        self.free.pseudo_orthogonal_position = None;
        self.orbit.real_state_position = None;
        self.free.real_state_position = None;
    }

    /// A pseudo-orthographic camera sits far outside the model; push the near
    /// plane out to the bounds so depth precision is spent where the model is.
    fn fix_pseudo_ortho_clipping(&mut self) {
        if self.orbit.pseudo_orthogonal_position.is_some() {
            self.orbit.min_z =
                glm::distance(&self.orbit.position(), &self.bounds.center) - self.bounds.radius;
        }
        if self.free.pseudo_orthogonal_position.is_some() {
            self.free.min_z =
                glm::distance(&self.free.position, &self.bounds.center) - self.bounds.radius;
        }
    }

    /// Move the target state's eye so the framed extent at the new fov matches
    /// what the pseudo-orthographic view showed, then pull it out of the
    /// bounds sphere if it landed inside.
    fn setup_conformal_dolly_zoom_position(
        &self,
        fov: f32,
        forward: &glm::Vec3,
        state: &mut CameraState,
    ) {
        let opposite = self.viewport.width / 2.0;
        let adjacent = (fov / 2.0).tan() / opposite;

        let mut position = (state.target() - forward) * adjacent;

        let ray = Ray {
            origin: position,
            direction: *forward,
        };
        if let Some(signed_distance) = signed_distance_to_sphere_surface(&ray, &self.bounds)
            && signed_distance < 0.0
        {
            position += forward * signed_distance;
        }

        state.set_position(position);
    }
}

#[allow(clippy::too_many_arguments)]
fn step_orbit(
    camera: &mut OrbitCamera,
    viewport: &Viewport,
    t: f32,
    eased_in: f32,
    source: &OrbitState,
    target: &OrbitState,
    scratch: &mut OrbitScratch,
    last: &mut Option<OrbitState>,
) {
    // Fold in whatever the user moved since the previous frame.
    if let Some(last) = last {
        scratch.alpha += camera.alpha - last.alpha;
        scratch.beta += camera.beta - last.beta;
        scratch.radius += camera.radius - last.radius;
        scratch.target += camera.target - last.target;
    }

    let fov_weight = fov_lerp_weight(source, target, t, eased_in);
    let ease_out_sine = ease_out_sine(t);

    let lerp_radius = lerp(source.radius, target.radius, fov_weight);
    camera.radius = lerp_radius + scratch.radius;
    camera.target = lerp_vec3(&source.target, &target.target, eased_in) + scratch.target;
    camera.alpha = lerp(source.alpha, target.alpha, ease_out_sine) + scratch.alpha;
    camera.beta = lerp(source.beta, target.beta, ease_out_sine) + scratch.beta;

    match interpolate_world_size(source.view_world_size, target.view_world_size, fov_weight) {
        Some(size) => camera.fov = fov_from_screen_aspect(viewport, lerp_radius, &size),
        None => camera.fov = lerp(source.fov, target.fov, fov_weight),
    }

    *last = Some(OrbitState::from_camera_raw(camera));
}

#[allow(clippy::too_many_arguments)]
fn step_free(
    camera: &mut FreeCamera,
    viewport: &Viewport,
    t: f32,
    eased_in: f32,
    source: &FreeState,
    target: &FreeState,
    scratch: &mut FreeScratch,
    last: &mut Option<FreeState>,
) {
    if let Some(last) = last {
        scratch.position += camera.position - last.position;
        scratch.rotation += camera.rotation - last.rotation;
    }

    let fov_weight = fov_lerp_weight_free(source, target, t, eased_in);

    let lerp_radius = lerp(source.radius, target.radius, fov_weight);
    camera.position = lerp_vec3(&source.position, &target.position, eased_in) + scratch.position;
    let current_target = lerp_vec3(&source.target, &target.target, eased_in);

    correct_camera_close_target(camera, &current_target, source, target);

    camera.rotation = rotation_from(&camera.position, &current_target) + scratch.rotation;

    match interpolate_world_size(source.view_world_size, target.view_world_size, fov_weight) {
        Some(size) => camera.fov = fov_from_screen_aspect(viewport, lerp_radius, &size),
        None => camera.fov = lerp(source.fov, target.fov, fov_weight),
    }

    *last = Some(FreeState::from_camera_raw(camera));
}

/// The fov/radius channel uses a quintic weight when either endpoint is
/// pseudo-orthographic, so the dolly-zoom spends most of its motion near the
/// perspective end of the blend.
fn fov_lerp_weight(source: &OrbitState, target: &OrbitState, t: f32, eased_in: f32) -> f32 {
    if source.pseudo_orthogonal_position.is_some() {
        ease_out_quint(t)
    } else if target.pseudo_orthogonal_position.is_some() {
        ease_in_quint(t)
    } else {
        eased_in
    }
}

fn fov_lerp_weight_free(source: &FreeState, target: &FreeState, t: f32, eased_in: f32) -> f32 {
    if source.pseudo_orthogonal_position.is_some() {
        ease_out_quint(t)
    } else if target.pseudo_orthogonal_position.is_some() {
        ease_in_quint(t)
    } else {
        eased_in
    }
}

/// Keep the eye from passing through the look target mid-blend, which would
/// whip the view direction around in a single frame. The eye is pushed
/// sideways, perpendicular to the overall travel direction.
fn correct_camera_close_target(
    camera: &mut FreeCamera,
    current_target: &glm::Vec3,
    source: &FreeState,
    target: &FreeState,
) {
    let distance = glm::distance(&camera.position, current_target);
    if distance >= VIRTUAL_TARGET_DISTANCE {
        return;
    }

    let movement = source.position - target.position;
    let length = glm::length(&movement);
    if length == 0.0 {
        return;
    }

    let sideways = glm::cross(&(movement / length), &glm::vec3(0.0, -1.0, 0.0));
    let sideways_length = glm::length(&sideways);
    if sideways_length == 0.0 {
        return;
    }

    camera.position += sideways / sideways_length * (VIRTUAL_TARGET_DISTANCE - distance);
}
