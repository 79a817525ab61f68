//! Typed visual props and the factory that builds the overlay's scene.
//!
//! Rather than handing arbitrary materials to the renderer, every visual is
//! one of a small set of [`Visual`] variants. The renderer maps each variant
//! to whatever material system it has.

use cgmath::Vector3;
use rand::Rng;

use crate::{
    data_structures::{
        instance::Instance,
        scene_graph::{NodeId, NodeIds, SceneNode},
    },
    resources::{AssetHandle, ResourceKey, join::LoadedSet},
};

/// Scale applied to every glasses mesh; the models are authored in millimetres.
pub const PROP_SCALE: f32 = 0.0067;
pub const GLASSES_SCALE: f32 = 1.1;
/// Glasses sit slightly above and in front of the face anchor.
pub const GLASSES_OFFSET: [f32; 3] = [0.0, 0.05, 0.25];
pub const AGENT_SCALE: f32 = 0.1;
/// Props are drawn after the video so they are never hidden by it.
pub const PROP_RENDER_ORDER: i32 = 10_000;
pub const OVERLAY_RENDER_ORDER: i32 = 999;

pub const CREATURE_MODEL: &str = "models/bee/bee.json";
pub const CREATURE_TEXTURE: &str = "models/bee/texture_bee.jpg";
pub const OVERLAY_TEXTURE: &str = "images/new_year_frame_2.png";

/// RGBA colour with components in `0.0..=1.0`.
pub type Colour = [f32; 4];

pub const BLACK: Colour = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: Colour = [1.0, 1.0, 1.0, 1.0];

#[derive(Clone, Debug)]
pub enum Visual {
    /// Flat colour, no lighting.
    Opaque { geometry: AssetHandle, colour: Colour },
    /// Unlit texture, optionally with a separate alpha mask.
    Textured {
        geometry: AssetHandle,
        map: ResourceKey,
        alpha_map: Option<ResourceKey>,
    },
    /// Lit with specular highlights.
    Shaded {
        geometry: AssetHandle,
        colour: Colour,
        specular: Colour,
        shininess: f32,
    },
    /// Lit, textured and driven by the morph targets of an animation clip.
    Skinned { geometry: AssetHandle, map: ResourceKey },
    /// Full-frame quad sharing the geometry of the video underlay.
    ScreenOverlay { map: ResourceKey },
    AmbientLight { colour: Colour, intensity: f32 },
    DirectionalLight { colour: Colour, intensity: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderHints {
    pub transparent: bool,
    pub render_order: i32,
    pub frustum_culled: bool,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            transparent: false,
            render_order: 0,
            frustum_culled: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Prop {
    pub visual: Visual,
    pub hints: RenderHints,
}

/// The four meshes making up the glasses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlassesPart {
    Branches,
    Frame,
    Lenses,
    Deco,
}

impl GlassesPart {
    /// Fixed stacking order of the parts below the glasses node.
    pub const ALL: [GlassesPart; 4] = [
        GlassesPart::Branches,
        GlassesPart::Frame,
        GlassesPart::Lenses,
        GlassesPart::Deco,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GlassesPart::Branches => "branches",
            GlassesPart::Frame => "frame",
            GlassesPart::Lenses => "lenses",
            GlassesPart::Deco => "deco",
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(format!("models/glasses/{}.json", self.name()))
    }

    fn visual(&self, geometry: AssetHandle) -> Visual {
        match self {
            GlassesPart::Frame => Visual::Shaded {
                geometry,
                colour: BLACK,
                specular: WHITE,
                shininess: 2.0,
            },
            GlassesPart::Lenses => Visual::Textured {
                geometry,
                map: "models/glasses/texture_mp.jpg".into(),
                alpha_map: None,
            },
            GlassesPart::Branches => Visual::Textured {
                geometry,
                map: "models/glasses/textureBlack.jpg".into(),
                alpha_map: Some("models/glasses/alpha_branches.jpg".into()),
            },
            GlassesPart::Deco => Visual::Opaque {
                geometry,
                colour: WHITE,
            },
        }
    }

    fn is_transparent(&self) -> bool {
        !matches!(self, GlassesPart::Deco)
    }
}

/// Every key the overlay loads before assembling, in slot order.
pub fn scene_keys() -> Vec<ResourceKey> {
    GlassesPart::ALL
        .iter()
        .map(GlassesPart::key)
        .chain([ResourceKey::new(CREATURE_MODEL)])
        .collect()
}

/// Builds the overlay's nodes with fresh ids.
#[derive(Debug, Default)]
pub struct PropFactory {
    ids: NodeIds,
}

impl PropFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    /**
     * Assembles the glasses from whatever parts are present in `set`.
     *
     * Parts are always added in [`GlassesPart::ALL`] order, so the result is
     * the same no matter in which order the loads completed. Returns `None`
     * when no part loaded at all.
     */
    pub fn glasses(&mut self, set: &LoadedSet<AssetHandle>) -> Option<SceneNode> {
        let mut glasses = SceneNode::container(self.next_id(), "glasses");
        glasses.set_local_transform(
            Instance::default()
                .with_uniform_scale(GLASSES_SCALE)
                .with_position(GLASSES_OFFSET.into()),
        );
        let mut parts = 0;
        for part in GlassesPart::ALL {
            let Some(geometry) = set.get(&part.key()) else {
                log::warn!("Glasses are assembled without their {}.", part.name());
                continue;
            };
            let prop = Prop {
                visual: part.visual(geometry.clone()),
                hints: RenderHints {
                    transparent: part.is_transparent(),
                    render_order: PROP_RENDER_ORDER,
                    frustum_culled: false,
                },
            };
            let mut node = SceneNode::with_prop(self.next_id(), part.name(), prop);
            node.set_local_transform(Instance::default().with_uniform_scale(PROP_SCALE));
            glasses.add_child(node);
            parts += 1;
        }
        if parts == 0 {
            return None;
        }
        glasses.update_world_transform_all();
        Some(glasses)
    }

    /**
     * Builds `count` creature nodes below one swarm container.
     *
     * Each creature gets its own wrapper node (so the renderer can move the
     * creature without touching siblings) and a random start position.
     * Returns the container and, per creature, the id of the moving node and
     * its start position.
     */
    pub fn swarm<R: Rng + ?Sized>(
        &mut self,
        geometry: &AssetHandle,
        count: usize,
        rng: &mut R,
    ) -> (SceneNode, Vec<(NodeId, Vector3<f32>)>) {
        let mut swarm = SceneNode::container(self.next_id(), "swarm");
        let mut creatures = Vec::with_capacity(count);
        for i in 0..count {
            let position = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(0.0..2.0),
                rng.gen_range(-0.25..0.25),
            );
            let prop = Prop {
                visual: Visual::Skinned {
                    geometry: geometry.clone(),
                    map: CREATURE_TEXTURE.into(),
                },
                hints: RenderHints {
                    transparent: true,
                    ..Default::default()
                },
            };
            let mut creature = SceneNode::with_prop(self.next_id(), format!("creature-{}", i), prop);
            creature.set_local_transform(Instance::from(position).with_uniform_scale(AGENT_SCALE));
            let mut wrapper = SceneNode::container(self.next_id(), format!("creature-{}-root", i));
            creatures.push((creature.id(), position));
            wrapper.add_child(creature);
            swarm.add_child(wrapper);
        }
        swarm.update_world_transform_all();
        (swarm, creatures)
    }

    /// The decorative full-frame image drawn on top of the video.
    pub fn screen_overlay(&mut self) -> SceneNode {
        let prop = Prop {
            visual: Visual::ScreenOverlay {
                map: OVERLAY_TEXTURE.into(),
            },
            hints: RenderHints {
                transparent: true,
                render_order: OVERLAY_RENDER_ORDER,
                frustum_culled: false,
            },
        };
        SceneNode::with_prop(self.next_id(), "screen-overlay", prop)
    }

    pub fn lights(&mut self) -> Vec<SceneNode> {
        let ambient = SceneNode::with_prop(
            self.next_id(),
            "ambient-light",
            Prop {
                visual: Visual::AmbientLight {
                    colour: WHITE,
                    intensity: 1.0,
                },
                hints: RenderHints::default(),
            },
        );
        let mut directional = SceneNode::with_prop(
            self.next_id(),
            "directional-light",
            Prop {
                visual: Visual::DirectionalLight {
                    colour: WHITE,
                    intensity: 1.0,
                },
                hints: RenderHints::default(),
            },
        );
        directional.set_local_transform(Instance::from(Vector3::new(100.0, 1000.0, 100.0)));
        directional.update_world_transform_all();
        vec![ambient, directional]
    }
}
