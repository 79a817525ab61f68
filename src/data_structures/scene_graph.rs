//! Scene graph handed to the renderer.
//!
//! A [`SceneNode`] is a local transform, an optional [`Prop`] and any number
//! of children. The overlay builds small trees (the glasses, the swarm, the
//! screen overlay, the lights) and attaches them to an anchor of the
//! renderer. After attaching, only agent transforms keep changing and those
//! are sent by node id with every frame.

use log::warn;

use crate::data_structures::{instance::Instance, prop::Prop};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Hands out unique node ids for one overlay.
#[derive(Debug, Default)]
pub struct NodeIds {
    next: u32,
}

impl NodeIds {
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    local: Instance,
    world: Instance,
    prop: Option<Prop>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// A node that only groups and transforms its children.
    pub fn container(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            local: Instance::default(),
            world: Instance::default(),
            prop: None,
            children: Vec::new(),
        }
    }

    pub fn with_prop(id: NodeId, name: impl Into<String>, prop: Prop) -> Self {
        Self {
            prop: Some(prop),
            ..Self::container(id, name)
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop(&self) -> Option<&Prop> {
        self.prop.as_ref()
    }

    pub fn add_child(&mut self, child: SceneNode) {
        if self.find(child.id).is_some() {
            warn!("Node {:?} is already part of {}, not adding it twice.", child.id, self.name);
            return;
        }
        self.children.push(child);
    }

    pub fn get_children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    pub fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    pub fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    /// Depth-first search for `id`, including `self`.
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Recomputes world transforms of the subtree below a parent transform.
    pub fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        let world = self.world.clone();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    /// Recomputes world transforms treating `self` as a root.
    pub fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Instance::default());
    }

    /// Visits every node of the subtree in depth-first order.
    pub fn visit(&self, f: &mut dyn FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Names of all nodes carrying a prop, depth-first.
    pub fn prop_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.visit(&mut |node| {
            if node.prop.is_some() {
                names.push(node.name.clone());
            }
        });
        names
    }
}
