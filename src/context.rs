use crate::{
    config::Settings,
    detection::{CameraMode, DetectionState},
    render::CameraHandle,
    tracking::{CaptureSize, InitSpec},
};

/// Shared, mostly read-only state of one overlay run.
///
/// Components get what they need from here at construction. Only the frame
/// callback writes `detection`, only readiness writes `camera` and `init`.
#[derive(Debug, Default)]
pub struct Context {
    pub settings: Settings,
    pub detection: DetectionState,
    pub camera: Option<CameraHandle>,
    pub capture: Option<CaptureSize>,
    pub init: Option<InitSpec>,
}

impl Context {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.settings.camera_mode
    }

    /// Whether swarm ticks and clip advances should run right now.
    pub fn motion_enabled(&self) -> bool {
        !self.settings.pause_when_face_lost || self.detection.is_present()
    }
}
