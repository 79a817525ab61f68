//! Composition root and run loop.
//!
//! [`Overlay`] wires the join barrier, the swarm and the playback scheduler
//! to the tracking and rendering collaborators. It is driven entirely from
//! outside through its lifecycle hooks, each of which receives the current
//! time as a [`Duration`] since the run started:
//!
//! 1. `on_ready()` once the tracker is initialized; registers the loads
//! 2. `on_asset()` for every finished load, in any order; the last one assembles the scene
//! 3. `on_tick()` every `tick_interval`; moves the swarm
//! 4. `poll_starts()` whenever a staggered clip start is due
//! 5. `on_frame_processed()` per tracked video frame; advances clips and renders
//! 6. `shutdown()` detaches everything
//!
//! [`run`] drives these hooks natively from a single tokio task.

use instant::Duration;
use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    config::{AdvanceDelta, Settings},
    context::Context,
    data_structures::{
        prop::{CREATURE_MODEL, PropFactory, scene_keys},
        scene_graph::{NodeId, SceneNode},
    },
    error::OverlayError,
    playback::PlaybackScheduler,
    render::{Anchor, AgentPose, ClipPose, Frame, Renderer},
    resources::{
        AssetHandle, ResourceKey,
        join::{JoinBarrier, JoinStatus, LoadedSet},
    },
    swarm::Swarm,
    tracking::{CaptureSize, DetectState, InitSpec, TrackerSettings, TrackingError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the tracker.
    Idle,
    /// Tracker ready, assets in flight.
    Loading,
    /// Scene assembled.
    Running,
    /// Tracker or assembly failed; nothing will be assembled.
    Failed,
    Shutdown,
}

pub struct Overlay<R> {
    ctx: Context,
    renderer: R,
    factory: PropFactory,
    barrier: JoinBarrier<AssetHandle>,
    swarm: Swarm,
    scheduler: PlaybackScheduler,
    attached: Vec<(Anchor, NodeId)>,
    rng: SmallRng,
    phase: Phase,
    last_frame: Option<Duration>,
    frames: u64,
}

impl<R: Renderer> Overlay<R> {
    pub fn new(settings: Settings, renderer: R) -> Self {
        let rng = match settings.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let barrier = JoinBarrier::new(settings.failure_policy);
        let scheduler = PlaybackScheduler::from_settings(&settings);
        Self {
            ctx: Context::new(settings),
            renderer,
            factory: PropFactory::new(),
            barrier,
            swarm: Swarm::new(),
            scheduler,
            attached: Vec::new(),
            rng,
            phase: Phase::Idle,
            last_frame: None,
            frames: 0,
        }
    }

    /// Settings for the tracker, given the negotiated capture size.
    pub fn tracker_settings(&mut self, capture: CaptureSize) -> TrackerSettings {
        self.ctx.capture = Some(capture);
        TrackerSettings::new(&self.ctx.settings, capture)
    }

    /// Handles the tracker's readiness report.
    ///
    /// On success the screen overlay, lights and camera are set up right
    /// away and the keys that must be fetched before assembly are returned.
    /// A tracker error is fatal: the overlay moves to [`Phase::Failed`].
    pub fn on_ready(
        &mut self,
        result: Result<InitSpec, TrackingError>,
    ) -> Result<Vec<ResourceKey>, OverlayError> {
        if self.phase != Phase::Idle {
            return Err(OverlayError::AlreadyInitialized);
        }
        let init = match result {
            Ok(init) => init,
            Err(e) => {
                log::error!("The face tracker is not ready: {}", e);
                self.phase = Phase::Failed;
                return Err(e.into());
            }
        };
        log::info!(
            "Face tracker ready ({}x{}).",
            init.canvas_width,
            init.canvas_height
        );
        self.ctx.init = Some(init);

        let keys = scene_keys();
        for key in &keys {
            self.barrier.register(key.clone())?;
        }

        let overlay = self.factory.screen_overlay();
        self.attach(Anchor::Scene, overlay);
        for light in self.factory.lights() {
            self.attach(Anchor::Scene, light);
        }
        self.ctx.camera = Some(self.renderer.create_camera());

        self.phase = Phase::Loading;
        Ok(keys)
    }

    /// Feeds one finished load into the join barrier.
    pub fn on_asset(
        &mut self,
        key: ResourceKey,
        result: anyhow::Result<AssetHandle>,
        now: Duration,
    ) -> Result<(), OverlayError> {
        let status = match result {
            Ok(asset) => self.barrier.on_loaded(&key, asset),
            Err(e) => self.barrier.on_load_failed(&key, e),
        };
        match status {
            Ok(JoinStatus::Ready(set)) => {
                self.assemble(set, now);
                Ok(())
            }
            Ok(JoinStatus::Waiting { remaining }) => {
                log::debug!("{} settled, {} loads remaining.", key, remaining);
                Ok(())
            }
            Ok(JoinStatus::Settled) => Ok(()),
            Err(e) => {
                if let OverlayError::AssemblyAborted { .. } = e {
                    self.phase = Phase::Failed;
                }
                Err(e)
            }
        }
    }

    fn assemble(&mut self, set: LoadedSet<AssetHandle>, now: Duration) {
        if let Some(glasses) = self.factory.glasses(&set) {
            self.attach(Anchor::Face, glasses);
        }

        match set.get(&ResourceKey::new(CREATURE_MODEL)) {
            Some(creature) => {
                let count = self.ctx.settings.agent_count;
                let (node, creatures) = self.factory.swarm(creature, count, &mut self.rng);
                let clip = creature.clips().first().cloned();
                if clip.is_none() {
                    log::warn!("The creature model has no clip, the swarm flies without animation.");
                }
                for (node_id, position) in creatures {
                    let agent = self.swarm.spawn(node_id, position);
                    if let Some(clip) = &clip {
                        let player = self.scheduler.register_player(agent, clip.clone());
                        self.swarm.bind_player(agent, player);
                    }
                }
                self.attach(Anchor::Face, node);
                self.scheduler.start_all(now);
            }
            None => log::warn!("The creature model is missing, the scene has no swarm."),
        }

        log::info!(
            "Scene assembled: {} nodes attached, {} agents, {} players.",
            self.attached.len(),
            self.swarm.len(),
            self.scheduler.len()
        );
        self.phase = Phase::Running;
    }

    fn attach(&mut self, anchor: Anchor, node: SceneNode) {
        self.attached.push((anchor, node.id()));
        self.renderer.attach(anchor, node);
    }

    /// The fixed-rate timer hook.
    pub fn on_tick(&mut self) {
        if self.phase != Phase::Running || !self.ctx.motion_enabled() {
            return;
        }
        self.swarm.tick();
    }

    /// Fires clip starts that are due. Returns how many players started.
    pub fn poll_starts(&mut self, now: Duration) -> usize {
        self.scheduler.poll(now)
    }

    pub fn next_start_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// The per-frame tracking hook: the sole driver of clip time and rendering.
    pub fn on_frame_processed(&mut self, detect: DetectState, now: Duration) {
        if self.phase == Phase::Shutdown {
            return;
        }
        self.ctx.detection.on_detection_changed(detect.detected);
        self.scheduler.poll(now);

        let dt = match self.ctx.settings.advance_delta {
            AdvanceDelta::Nominal(dt) => dt,
            AdvanceDelta::Measured => self
                .last_frame
                .map(|last| now.saturating_sub(last).as_secs_f32())
                .unwrap_or(0.0),
        };
        self.last_frame = Some(now);
        if self.ctx.motion_enabled() {
            self.scheduler.advance(dt);
        }

        let frame = self.frame(detect);
        self.renderer.render(&frame);
        self.frames += 1;
    }

    /// Snapshot of the current agent transforms and started clips.
    pub fn frame(&self, detect: DetectState) -> Frame {
        Frame {
            detect,
            camera: self.ctx.camera,
            agents: self.swarm.agents().iter().map(AgentPose::from).collect(),
            clips: self
                .scheduler
                .players()
                .iter()
                .filter(|player| player.is_playing())
                .map(ClipPose::from)
                .collect(),
        }
    }

    /// Stops all motion, drops pending starts, detaches players and nodes.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Shutdown {
            return;
        }
        let players = self.scheduler.teardown();
        let agents = self.swarm.len();
        self.swarm.clear();
        for (anchor, node) in self.attached.drain(..) {
            self.renderer.detach(anchor, node);
        }
        log::info!(
            "Overlay shut down after {} frames ({} agents, {} players detached).",
            self.frames,
            agents,
            players
        );
        self.phase = Phase::Shutdown;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    /// Node ids currently attached, with their anchor.
    pub fn attached(&self) -> &[(Anchor, NodeId)] {
        &self.attached
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Runs an overlay until the tracker's event stream closes.
///
/// A zero `tick_interval` is rejected before anything starts. Capture
/// negotiation happens next; failing it is fatal. A tracker whose
/// `init` fails is logged and the loop keeps running without frames until
/// its stream closes. Swarm ticks, tracking events, finished loads and due
/// clip starts are multiplexed on the calling task, so no state is shared
/// across threads. Returns the shut-down overlay.
#[cfg(not(target_arch = "wasm32"))]
pub async fn run<R, T, V, F>(
    settings: Settings,
    renderer: R,
    tracker: &mut T,
    capture: &mut V,
    fetcher: &F,
) -> Result<Overlay<R>, OverlayError>
where
    R: Renderer,
    T: crate::tracking::Tracker + ?Sized,
    V: crate::tracking::VideoCapture + ?Sized,
    F: crate::resources::AssetFetcher + ?Sized,
{
    use futures::StreamExt;

    use crate::{
        resources::{PendingLoads, load_all},
        tracking::{TrackingEvent, tracking_channel},
    };

    if settings.tick_interval.is_zero() {
        log::error!("The swarm tick interval must be non-zero.");
        return Err(OverlayError::InvalidSettings(
            "tick_interval is zero".to_string(),
        ));
    }

    let start = instant::Instant::now();
    let mut overlay = Overlay::new(settings, renderer);

    let size = match capture.negotiate(overlay.context().camera_mode()) {
        Ok(size) => size,
        Err(e) => {
            log::error!("Could not negotiate the video capture: {:#}", e);
            return Err(OverlayError::CaptureFailed(format!("{:#}", e)));
        }
    };

    let (sender, mut events) = tracking_channel();
    if let Err(e) = tracker.init(overlay.tracker_settings(size), sender) {
        log::error!("Setting up the face tracker failed: {:#}", e);
    }

    let mut ticker = tokio::time::interval(overlay.context().settings.tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut loads = PendingLoads::new();

    loop {
        let deadline = overlay.next_start_deadline();
        let wake = tokio::time::Instant::from_std(start + deadline.unwrap_or_default());
        tokio::select! {
            _ = ticker.tick() => overlay.on_tick(),
            event = events.next() => match event {
                Some(TrackingEvent::Ready(result)) => match overlay.on_ready(result) {
                    Ok(keys) => loads = load_all(fetcher, &keys),
                    Err(OverlayError::AlreadyInitialized) => {
                        log::warn!("Ignoring a repeated ready report from the tracker.");
                    }
                    Err(e) => {
                        overlay.shutdown();
                        return Err(e);
                    }
                },
                Some(TrackingEvent::FrameProcessed(detect)) => {
                    overlay.on_frame_processed(detect, start.elapsed());
                }
                None => {
                    log::info!("Tracking stream closed.");
                    break;
                }
            },
            Some((key, result)) = loads.next(), if !loads.is_empty() => {
                match overlay.on_asset(key, result, start.elapsed()) {
                    Ok(()) => (),
                    Err(e @ OverlayError::AssemblyAborted { .. }) => {
                        overlay.shutdown();
                        return Err(e);
                    }
                    Err(e) => log::warn!("{}", e),
                }
            }
            _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                overlay.poll_starts(start.elapsed());
            }
        }
    }

    overlay.shutdown();
    Ok(overlay)
}
