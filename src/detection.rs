//! Camera-facing mode and face presence.

/// Which camera the video-capture collaborator should open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    Front,
    Back,
}

impl CameraMode {
    /// The facing-mode constraint understood by media-capture APIs.
    pub fn facing_mode(&self) -> &'static str {
        match self {
            CameraMode::Front => "user",
            CameraMode::Back => "environment",
        }
    }
}

/// Last known face presence as reported by the tracker.
///
/// Written only from the frame callback; everything else reads it.
#[derive(Clone, Debug, Default)]
pub struct DetectionState {
    present: bool,
    flips: u32,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the presence reported for the current frame.
    ///
    /// Returns `true` if presence flipped. Only flips are logged.
    pub fn on_detection_changed(&mut self, present: bool) -> bool {
        if present == self.present {
            return false;
        }
        self.present = present;
        self.flips += 1;
        if present {
            log::info!("face detected");
        } else {
            log::info!("face lost");
        }
        true
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn flips(&self) -> u32 {
        self.flips
    }
}
