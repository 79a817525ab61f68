//! Swarm motion.
//!
//! Each agent follows a closed-form rotational recurrence: a rotation in the
//! XZ plane by its rate θ, combined with a damped vertical term and a small
//! constant lift. The lift keeps the resulting spiral from collapsing into
//! the origin. An update only reads the agent's own previous transform, so
//! agents can be ticked in any order or individually.

use cgmath::Vector3;

use crate::{
    data_structures::{instance::Instance, prop::AGENT_SCALE, scene_graph::NodeId},
    playback::PlayerId,
};

/// Vertical damping applied every tick.
pub const DAMPING: f32 = 0.96;
/// Constant upward bias added every tick.
pub const LIFT: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// Mirrors the flight path of every other agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Even indices fly `Positive`, odd ones `Negative`.
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    pub fn value(&self) -> f32 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Signed motion rate of the agent at `index`; later agents orbit faster.
pub fn rate_for(index: usize) -> f32 {
    Sign::from_index(index).value() * ((index + 1) as f32 * 0.005 + 0.01)
}

/**
 * One step of the recurrence. Returns the new position and orientation.
 *
 * ```text
 * x' = x cos θ + z sin θ
 * y' = (y cos θ + x sin θ) * DAMPING + LIFT
 * z' = z cos θ - x sin θ
 * orientation = -(x', y', z') * sign
 * ```
 */
pub fn step(position: Vector3<f32>, theta: f32, sign: Sign) -> (Vector3<f32>, Vector3<f32>) {
    let (sin, cos) = theta.sin_cos();
    let Vector3 { x, y, z } = position;
    let next = Vector3::new(
        x * cos + z * sin,
        (y * cos + x * sin) * DAMPING + LIFT,
        z * cos - x * sin,
    );
    let s = sign.value();
    let orientation = Vector3::new(-next.x * s, -next.y * s, -next.z * s);
    (next, orientation)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vector3<f32>,
    /// XYZ Euler angles in radians.
    pub orientation: Vector3<f32>,
    pub scale: f32,
    pub theta: f32,
    pub sign: Sign,
    /// The scene node this agent moves.
    pub node: NodeId,
    pub player: Option<PlayerId>,
}

impl Agent {
    /// An agent at `index` with the rate and sign that index implies.
    pub fn new(index: usize, node: NodeId, position: Vector3<f32>) -> Self {
        Self {
            id: AgentId(index),
            position,
            orientation: Vector3::new(0.0, 0.0, 0.0),
            scale: AGENT_SCALE,
            theta: rate_for(index),
            sign: Sign::from_index(index),
            node,
            player: None,
        }
    }

    pub fn tick(&mut self) {
        let (position, orientation) = step(self.position, self.theta, self.sign);
        self.position = position;
        self.orientation = orientation;
    }

    pub fn instance(&self) -> Instance {
        Instance::from_euler(self.position, self.orientation, self.scale)
    }
}

/// Owns every agent's transform. Nothing else writes to them.
#[derive(Debug, Default)]
pub struct Swarm {
    agents: Vec<Agent>,
    ticks: u64,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an agent and returns its id.
    pub fn spawn(&mut self, node: NodeId, position: Vector3<f32>) -> AgentId {
        let agent = Agent::new(self.agents.len(), node, position);
        let id = agent.id;
        self.agents.push(agent);
        id
    }

    /// Advances every agent by one tick.
    pub fn tick(&mut self) {
        self.agents.iter_mut().for_each(Agent::tick);
        self.ticks += 1;
    }

    /// Advances a single agent; the others are left untouched.
    pub fn tick_agent(&mut self, id: AgentId) {
        match self.agents.get_mut(id.0) {
            Some(agent) => agent.tick(),
            None => log::warn!("Tried to tick unknown agent {:?}.", id),
        }
    }

    pub(crate) fn bind_player(&mut self, id: AgentId, player: PlayerId) {
        if let Some(agent) = self.agents.get_mut(id.0) {
            agent.player = Some(player);
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of whole-swarm ticks performed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }
}
