use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};

/// Camera tuning. `max_z`, `free_camera_speed`, `run_multiplier` and
/// `pinch_multiplier` are consumed by the host's input and projection setup;
/// the rig itself only reads the fov and near-plane values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub orbit_fov: f32,
    pub free_fov: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub free_camera_speed: f32,
    pub run_multiplier: f32,
    pub pinch_multiplier: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            orbit_fov: 1.75,
            free_fov: 1.75,
            min_z: 0.1,
            max_z: 10000.0,
            free_camera_speed: 0.1,
            run_multiplier: 10.0,
            pinch_multiplier: 0.01,
        }
    }
}

impl CameraSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "camera").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "camera", self);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://ws.tridify.com/api".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "api").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "api", self);
    }
}

// Aggregate struct for convenience
pub struct Settings {
    pub camera: CameraSettings,
    pub api: ApiSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            camera: CameraSettings::load(),
            api: ApiSettings::load(),
        }
    }
}
