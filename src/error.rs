use crate::{resources::ResourceKey, tracking::TrackingError};

/// Errors surfaced by scene assembly and the overlay run loop.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("`{0}` was never registered with the join barrier")]
    UnknownResource(ResourceKey),
    #[error("`{0}` is already registered with the join barrier")]
    DuplicateResource(ResourceKey),
    #[error("cannot register `{0}`, the join barrier has already settled")]
    BarrierSettled(ResourceKey),
    #[error("scene assembly aborted because `{key}` failed to load: {reason}")]
    AssemblyAborted { key: ResourceKey, reason: String },
    #[error("the face tracker is not ready: {0}")]
    TrackerNotReady(#[from] TrackingError),
    #[error("the tracker reported ready more than once")]
    AlreadyInitialized,
    #[error("video capture negotiation failed: {0}")]
    CaptureFailed(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
