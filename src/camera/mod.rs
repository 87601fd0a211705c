pub mod free;
pub mod orbit;
pub mod rig;
pub mod state;

pub use free::{FreeCamera, FreeState, VIRTUAL_TARGET_DISTANCE};
pub use orbit::{OrbitCamera, OrbitLimits, OrbitState};
pub use rig::{
    CameraKind, CameraRig, INTERPOLATION_DURATION, InterpolationOutcome, InterpolationTicket,
};
pub use state::{CameraState, CameraTarget, Viewport, WorldSize};
