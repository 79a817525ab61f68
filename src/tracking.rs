//! Contracts with the face-tracking and video-capture collaborators.
//!
//! The tracker runs on its own cadence and reports back through a channel of
//! [`TrackingEvent`]s: one `Ready` once initialization finished, then one
//! `FrameProcessed` per analysed video frame. The overlay never polls it.

use futures::channel::mpsc;

use crate::{config::Settings, detection::CameraMode};

/// Capture dimensions negotiated with the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureSize {
    pub width: u32,
    pub height: u32,
}

/// Negotiates the best capture resolution for a facing mode.
pub trait VideoCapture {
    fn negotiate(&mut self, mode: CameraMode) -> anyhow::Result<CaptureSize>;
}

/// Everything the tracker needs to start, derived from [`Settings`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerSettings {
    pub capture: CaptureSize,
    pub facing: CameraMode,
    pub flip_x: bool,
    pub model_path: String,
    pub follow_z_rot: bool,
    pub max_faces_detected: u32,
}

impl TrackerSettings {
    pub fn new(settings: &Settings, capture: CaptureSize) -> Self {
        Self {
            capture,
            facing: settings.camera_mode,
            flip_x: settings.flip_x,
            model_path: settings.tracker_model.clone(),
            follow_z_rot: true,
            max_faces_detected: settings.max_faces_detected,
        }
    }
}

/// Returned by a tracker that is up and running.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InitSpec {
    pub canvas_width: u32,
    pub canvas_height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("tracker error {code}")]
pub struct TrackingError {
    pub code: String,
}

impl TrackingError {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Per-frame detection result.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DetectState {
    pub detected: bool,
}

#[derive(Debug)]
pub enum TrackingEvent {
    Ready(Result<InitSpec, TrackingError>),
    FrameProcessed(DetectState),
}

pub type TrackingSender = mpsc::UnboundedSender<TrackingEvent>;
pub type TrackingReceiver = mpsc::UnboundedReceiver<TrackingEvent>;

pub fn tracking_channel() -> (TrackingSender, TrackingReceiver) {
    mpsc::unbounded()
}

/// The face-tracking collaborator.
///
/// `init` returns once tracking was requested; readiness and frames arrive
/// later through `events`. Dropping every sender ends the overlay's run loop.
pub trait Tracker {
    fn init(&mut self, settings: TrackerSettings, events: TrackingSender) -> anyhow::Result<()>;
}
