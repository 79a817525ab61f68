#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use face_ngin::{
    Duration,
    data_structures::{
        prop::{CREATURE_MODEL, GlassesPart},
        scene_graph::{NodeId, SceneNode},
    },
    detection::CameraMode,
    render::{Anchor, CameraHandle, Frame, Renderer},
    resources::{
        Asset, AssetFetcher, AssetHandle, ResourceKey,
        animation::{AnimationClip, Keyframes},
    },
    tracking::{CaptureSize, Tracker, TrackerSettings, TrackingEvent, TrackingSender},
};
use futures::{FutureExt, future::LocalBoxFuture};

/// Stand-in for a parsed model.
#[derive(Debug)]
pub struct FakeAsset {
    pub name: String,
    pub clips: Vec<AnimationClip>,
}

impl Asset for FakeAsset {
    fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }
}

pub fn asset(name: &str) -> AssetHandle {
    Arc::new(FakeAsset {
        name: name.to_string(),
        clips: Vec::new(),
    })
}

pub fn creature_asset() -> AssetHandle {
    Arc::new(FakeAsset {
        name: "bee".to_string(),
        clips: vec![wing_clip()],
    })
}

/// A 0.2 s wing-beat: wings up, down, up.
pub fn wing_clip() -> AnimationClip {
    AnimationClip::new(
        "flap",
        Keyframes::Weights(vec![vec![0.0], vec![1.0], vec![0.0]]),
        vec![0.0, 0.1, 0.2],
    )
}

pub fn glasses_keys() -> Vec<ResourceKey> {
    GlassesPart::ALL.iter().map(GlassesPart::key).collect()
}

pub fn creature_key() -> ResourceKey {
    ResourceKey::new(CREATURE_MODEL)
}

/// Every asset the overlay requests, creature clip included.
pub fn scene_assets() -> HashMap<ResourceKey, AssetHandle> {
    let mut assets: HashMap<ResourceKey, AssetHandle> = glasses_keys()
        .into_iter()
        .map(|key| {
            let handle = asset(key.as_str());
            (key, handle)
        })
        .collect();
    assets.insert(creature_key(), creature_asset());
    assets
}

/// All orderings of `0..n`.
pub fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn permute(prefix: &mut Vec<usize>, rest: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if rest.is_empty() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..rest.len() {
            let item = rest.remove(i);
            prefix.push(item);
            permute(prefix, rest, out);
            prefix.pop();
            rest.insert(i, item);
        }
    }
    let mut out = Vec::new();
    permute(&mut Vec::new(), &mut (0..n).collect(), &mut out);
    out
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Renderer that records everything it is asked to do.
#[derive(Default)]
pub struct RecordingRenderer {
    pub attached: Vec<(Anchor, SceneNode)>,
    pub detached: Vec<(Anchor, NodeId)>,
    pub cameras: u32,
    pub frames: Vec<Frame>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all prop nodes attached to `anchor`, depth-first.
    pub fn prop_names(&self, anchor: Anchor) -> Vec<String> {
        self.attached
            .iter()
            .filter(|(a, _)| *a == anchor)
            .flat_map(|(_, node)| node.prop_names())
            .collect()
    }

    pub fn attached_names(&self, anchor: Anchor) -> Vec<String> {
        self.attached
            .iter()
            .filter(|(a, _)| *a == anchor)
            .map(|(_, node)| node.name().to_string())
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn attach(&mut self, anchor: Anchor, node: SceneNode) {
        self.attached.push((anchor, node));
    }

    fn detach(&mut self, anchor: Anchor, node: NodeId) {
        self.detached.push((anchor, node));
    }

    fn create_camera(&mut self) -> CameraHandle {
        self.cameras += 1;
        CameraHandle(self.cameras)
    }

    fn render(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

/// Serves assets from memory; unknown keys fail like a missing file.
pub struct MemoryFetcher {
    pub assets: HashMap<ResourceKey, AssetHandle>,
    pub failing: HashSet<ResourceKey>,
}

impl MemoryFetcher {
    pub fn new(assets: HashMap<ResourceKey, AssetHandle>) -> Self {
        Self {
            assets,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, key: ResourceKey) -> Self {
        self.failing.insert(key);
        self
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, key: &ResourceKey) -> LocalBoxFuture<'static, anyhow::Result<AssetHandle>> {
        let result = if self.failing.contains(key) {
            Err(anyhow::anyhow!("could not fetch {}", key))
        } else {
            self.assets
                .get(key)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no such asset {}", key))
        };
        async move { result }.boxed_local()
    }
}

pub struct FixedCapture(pub Option<CaptureSize>);

impl face_ngin::tracking::VideoCapture for FixedCapture {
    fn negotiate(&mut self, _mode: CameraMode) -> anyhow::Result<CaptureSize> {
        self.0.ok_or_else(|| anyhow::anyhow!("no camera"))
    }
}

/// Replays a script of events, each after its delay, then closes the stream.
pub struct ScriptedTracker {
    pub script: Vec<(Duration, TrackingEvent)>,
    pub settings: Option<TrackerSettings>,
    pub fail_init: bool,
}

impl ScriptedTracker {
    pub fn new(script: Vec<(Duration, TrackingEvent)>) -> Self {
        Self {
            script,
            settings: None,
            fail_init: false,
        }
    }
}

impl Tracker for ScriptedTracker {
    fn init(&mut self, settings: TrackerSettings, events: TrackingSender) -> anyhow::Result<()> {
        self.settings = Some(settings);
        if self.fail_init {
            anyhow::bail!("tracker canvas missing");
        }
        let script = std::mem::take(&mut self.script);
        tokio::spawn(async move {
            for (delay, event) in script {
                tokio::time::sleep(delay).await;
                if events.unbounded_send(event).is_err() {
                    return;
                }
            }
        });
        Ok(())
    }
}
