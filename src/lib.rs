//! Visualization add-on for building models: downloads post-processed
//! conversions, stitches IFC metadata onto imported meshes and drives smooth
//! transitions between an orbit camera and a first-person free camera.
//!
//! The rendering engine itself stays on the host side. The host owns the
//! scene graph and the render loop; this crate owns the camera-state model
//! ([`camera::CameraRig`]), the fetch client ([`api::ApiClient`]) and the
//! metadata stitching ([`loader`]). The host calls
//! [`camera::CameraRig::update`] once per rendered frame with the elapsed
//! delta time and mirrors the live camera values into its engine.

pub mod api;
pub mod camera;
pub mod dto;
pub mod error;
pub mod loader;
pub mod math;
pub mod settings;

pub use camera::{CameraKind, CameraRig, CameraState, CameraTarget, InterpolationOutcome};
pub use error::ViewerError;

pub const CONFY_APP_NAME: &str = "bimvis";
