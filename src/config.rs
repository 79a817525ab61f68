//! Startup configuration.
//!
//! All knobs of the overlay live in [`Settings`]. The defaults reproduce the
//! look of the glasses-and-bees filter; everything can be changed
//! through the `with_*` builders before the overlay is created.

use instant::Duration;

use crate::{detection::CameraMode, resources::join::FailurePolicy};

/// Nominal clip advance per processed frame, in seconds.
pub const NOMINAL_FRAME_DELTA: f32 = 0.16;

/// How much clip time passes per processed frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AdvanceDelta {
    /// The same fixed step every frame, independent of the real frame rate.
    Nominal(f32),
    /// Wall-clock time since the previous processed frame. Clips play at
    /// real speed, which is noticeably slower than the nominal step at
    /// typical tracking rates.
    Measured,
}

impl Default for AdvanceDelta {
    fn default() -> Self {
        AdvanceDelta::Nominal(NOMINAL_FRAME_DELTA)
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub camera_mode: CameraMode,
    /// Number of swarm agents created at assembly.
    pub agent_count: usize,
    /// Interval of the fixed-rate swarm tick.
    pub tick_interval: Duration,
    /// Delay between the starts of consecutive clip players.
    pub stagger: Duration,
    pub advance_delta: AdvanceDelta,
    pub failure_policy: FailurePolicy,
    /// Mirror the video horizontally (selfie view).
    pub flip_x: bool,
    /// Seed for the initial swarm placement, random when unset.
    pub seed: Option<u64>,
    /// Skip swarm ticks and clip advances while no face is tracked.
    pub pause_when_face_lost: bool,
    /// Path of the tracker's neural network, forwarded verbatim.
    pub tracker_model: String,
    pub max_faces_detected: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::Front,
            agent_count: 8,
            tick_interval: Duration::from_millis(16),
            stagger: Duration::from_millis(33),
            advance_delta: AdvanceDelta::default(),
            failure_policy: FailurePolicy::Exclude,
            flip_x: true,
            seed: None,
            pause_when_face_lost: false,
            tracker_model: "neuralNets/NN_LIGHT_1.json".to_string(),
            max_faces_detected: 1,
        }
    }
}

impl Settings {
    pub fn with_camera_mode(mut self, mode: CameraMode) -> Self {
        self.camera_mode = mode;
        self
    }

    pub fn with_agent_count(mut self, count: usize) -> Self {
        self.agent_count = count;
        self
    }

    /// Must be non-zero; the run loop rejects a zero interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_advance_delta(mut self, delta: AdvanceDelta) -> Self {
        self.advance_delta = delta;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_pause_when_face_lost(mut self, pause: bool) -> Self {
        self.pause_when_face_lost = pause;
        self
    }
}
