//! Scene data handed to the renderer.
//!
//! - `instance` holds per-node transformation data
//! - `scene_graph` is the hierarchical node tree attached to renderer anchors
//! - `prop` contains the typed visuals and the factory building the overlay

pub mod instance;
pub mod prop;
pub mod scene_graph;
