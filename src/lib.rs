//! face-ngin
//!
//! A small engine core for face-anchored AR overlays. A face tracker supplies
//! per-frame head pose; this crate assembles the props (glasses, a swarm of
//! animated creatures, a screen overlay) once all their assets have loaded,
//! moves the swarm on a fixed-rate tick and plays the creatures' clips in a
//! staggered cascade on the tracker's frame callback. Tracking, rendering,
//! video capture and asset fetching are collaborators behind traits.
//!
//! High-level modules
//! - `config`: startup settings
//! - `context`: state shared by all components of one overlay run
//! - `data_structures`: transforms, scene graph and typed props
//! - `detection`: camera-facing mode and face presence
//! - `flow`: the composition root and the native run loop
//! - `playback`: clip players and their staggered-start scheduler
//! - `render`: contract with the rendering collaborator
//! - `resources`: asset fetching, the join barrier and animation clips
//! - `swarm`: per-agent procedural motion
//! - `tracking`: contract with the tracking and video-capture collaborators
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod detection;
pub mod error;
pub mod flow;
pub mod playback;
pub mod render;
pub mod resources;
pub mod swarm;
pub mod tracking;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Quaternion, Vector3};
pub use error::OverlayError;
pub use instant::Duration;

/// Installs the platform logger: `env_logger` natively, the browser console on wasm.
///
/// Safe to call more than once; later calls only print a warning.
pub fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
        }
    }
}
