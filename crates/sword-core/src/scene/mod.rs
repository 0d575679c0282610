//! Scene object service
//!
//! The core never owns engine objects directly. Everything it needs from the
//! host scene (instancing, destruction, child lookup by name, transforms) goes
//! through [`SceneService`]. [`SceneGraph`] is the in-memory arena
//! implementation used by the tools and the tests.

mod graph;
mod transforms;

use std::collections::HashMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Pose;

/// Identifier of a node in the scene
pub type NodeId = Uuid;

/// Scene-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Re-parenting {0} would create a cycle")]
    WouldCreateCycle(NodeId),
}

/// Capabilities the assembly core needs from a scene
pub trait SceneService {
    /// Create an empty node, optionally under `parent`
    fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, SceneError>;

    /// Deep-copy the subtree rooted at `source`, attaching the copy under `parent`
    fn instantiate(
        &mut self,
        source: NodeId,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError>;

    /// Remove a node and all of its descendants
    fn destroy(&mut self, node: NodeId) -> Result<(), SceneError>;

    fn contains(&self, node: NodeId) -> bool;

    fn name(&self, node: NodeId) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Look up a direct child by name
    fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId>;

    /// Move `node` under `parent`, keeping its local pose
    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), SceneError>;

    fn local_pose(&self, node: NodeId) -> Result<Pose, SceneError>;

    fn set_local_pose(&mut self, node: NodeId, pose: Pose) -> Result<(), SceneError>;

    fn world_pose(&self, node: NodeId) -> Result<Pose, SceneError>;

    fn world_position(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_pose(node)?.position)
    }

    /// World-space +Z axis of the node
    fn forward(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.world_pose(node)?.forward())
    }

    /// Place a node at a world pose by rewriting its local pose
    fn set_world_pose(&mut self, node: NodeId, pose: Pose) -> Result<(), SceneError> {
        let parent_world = match self.parent(node) {
            Some(parent) => self.world_pose(parent)?,
            None => Pose::IDENTITY,
        };
        self.set_local_pose(node, parent_world.inverse().compose(&pose))
    }

    fn set_world_position(&mut self, node: NodeId, position: Vec3) -> Result<(), SceneError> {
        let mut world = self.world_pose(node)?;
        world.position = position;
        self.set_world_pose(node, world)
    }

    fn set_world_orientation(&mut self, node: NodeId, orientation: Quat) -> Result<(), SceneError> {
        let mut world = self.world_pose(node)?;
        world.orientation = orientation;
        self.set_world_pose(node, world)
    }
}

/// A named node with a local transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    /// Transform relative to the parent node
    pub local: Pose,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            local: Pose::IDENTITY,
        }
    }
}

/// Arena-backed scene hierarchy
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    /// Parent -> ordered children
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Child -> parent
    parent: HashMap<NodeId, NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| !self.parent.contains_key(id))
            .copied()
            .collect()
    }
}

impl SceneService for SceneGraph {
    fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        self.add_node(SceneNode::new(name), parent)
    }

    fn instantiate(
        &mut self,
        source: NodeId,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        self.clone_subtree(source, parent)
    }

    fn destroy(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.remove_node(node)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent.get(&node).copied()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.children.get(&node).cloned().unwrap_or_default()
    }

    fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children.get(&node)?.iter().copied().find(|child| {
            self.nodes
                .get(child)
                .is_some_and(|n| n.name == name)
        })
    }

    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        self.reparent(node, parent)
    }

    fn local_pose(&self, node: NodeId) -> Result<Pose, SceneError> {
        self.nodes
            .get(&node)
            .map(|n| n.local)
            .ok_or(SceneError::NodeNotFound(node))
    }

    fn set_local_pose(&mut self, node: NodeId, pose: Pose) -> Result<(), SceneError> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(SceneError::NodeNotFound(node))?;
        n.local = pose;
        Ok(())
    }

    fn world_pose(&self, node: NodeId) -> Result<Pose, SceneError> {
        self.get_world_pose(node)
    }
}
