//! Contract with the rendering collaborator.
//!
//! The overlay never looks inside the renderer. It attaches finished
//! [`SceneNode`] trees to one of two [`Anchor`]s, asks for a camera once, and
//! on every processed tracking frame hands over a [`Frame`]: a consistent
//! snapshot of the agent transforms and clip poses at that moment.

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        scene_graph::{NodeId, SceneNode},
    },
    playback::{AnimationPlayer, PlayerId},
    resources::animation::Pose,
    swarm::{Agent, AgentId},
    tracking::DetectState,
};

/// Where a node tree is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Follows the tracked head pose.
    Face,
    /// Fixed in screen space, next to the video.
    Scene,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct AgentPose {
    pub node: NodeId,
    pub instance: Instance,
}

impl From<&Agent> for AgentPose {
    fn from(agent: &Agent) -> Self {
        Self {
            node: agent.node,
            instance: agent.instance(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClipPose {
    pub player: PlayerId,
    pub agent: AgentId,
    pub time: f32,
    pub pose: Option<Pose>,
}

impl From<&AnimationPlayer> for ClipPose {
    fn from(player: &AnimationPlayer) -> Self {
        Self {
            player: player.id(),
            agent: player.agent(),
            time: player.time(),
            pose: player.pose(),
        }
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct Frame {
    pub detect: DetectState,
    pub camera: Option<CameraHandle>,
    pub agents: Vec<AgentPose>,
    /// Only players that already started.
    pub clips: Vec<ClipPose>,
}

impl Frame {
    /// Agent transforms packed for an instance buffer, in agent order.
    pub fn instance_data(&self) -> Vec<InstanceRaw> {
        self.agents
            .iter()
            .map(|pose| pose.instance.to_raw())
            .collect()
    }

    pub fn instance_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.instance_data()).to_vec()
    }
}

/// The rendering collaborator.
pub trait Renderer {
    fn attach(&mut self, anchor: Anchor, node: SceneNode);

    fn detach(&mut self, anchor: Anchor, node: NodeId);

    fn create_camera(&mut self) -> CameraHandle;

    fn render(&mut self, frame: &Frame);
}
