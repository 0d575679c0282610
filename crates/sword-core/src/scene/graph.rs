//! Graph operations for SceneGraph (add, remove, reparent, clone)

use std::collections::HashMap;

use uuid::Uuid;

use super::{NodeId, SceneError, SceneGraph, SceneNode};

impl SceneGraph {
    /// Add a node, optionally attaching it under `parent`
    pub fn add_node(
        &mut self,
        node: SceneNode,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent_id) = parent
            && !self.nodes.contains_key(&parent_id)
        {
            return Err(SceneError::NodeNotFound(parent_id));
        }

        let id = node.id;
        self.nodes.insert(id, node);
        if let Some(parent_id) = parent {
            self.attach(id, parent_id);
        }
        Ok(id)
    }

    /// Remove a node and all its descendants
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }

        self.detach(id);

        // Collect all descendants
        let to_remove = self.subtree(id);
        for node_id in &to_remove {
            self.nodes.remove(node_id);
            self.children.remove(node_id);
            self.parent.remove(node_id);
        }

        Ok(())
    }

    /// Move a node under a new parent (or to the top level)
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }
        if let Some(parent_id) = parent {
            if !self.nodes.contains_key(&parent_id) {
                return Err(SceneError::NodeNotFound(parent_id));
            }
            if self.would_create_cycle(parent_id, id) {
                return Err(SceneError::WouldCreateCycle(id));
            }
        }

        self.detach(id);
        if let Some(parent_id) = parent {
            self.attach(id, parent_id);
        }
        Ok(())
    }

    /// Deep-copy the subtree rooted at `source` under `parent`
    ///
    /// Every copied node gets a fresh id; local poses and child order are kept.
    pub fn clone_subtree(
        &mut self,
        source: NodeId,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&source) {
            return Err(SceneError::NodeNotFound(source));
        }
        if let Some(parent_id) = parent
            && !self.nodes.contains_key(&parent_id)
        {
            return Err(SceneError::NodeNotFound(parent_id));
        }

        // Snapshot the original subtree first so copies attached under one of
        // its own descendants are never revisited.
        let originals = self.subtree(source);
        let mut copies: HashMap<NodeId, NodeId> = HashMap::with_capacity(originals.len());

        for original_id in originals {
            let Some(original) = self.nodes.get(&original_id) else {
                continue;
            };
            let copy = SceneNode {
                id: Uuid::new_v4(),
                name: original.name.clone(),
                local: original.local,
            };
            let copy_id = copy.id;
            let copy_parent = if original_id == source {
                parent
            } else {
                self.parent
                    .get(&original_id)
                    .and_then(|p| copies.get(p))
                    .copied()
            };

            self.nodes.insert(copy_id, copy);
            if let Some(parent_id) = copy_parent {
                self.attach(copy_id, parent_id);
            }
            copies.insert(original_id, copy_id);
        }

        copies
            .get(&source)
            .copied()
            .ok_or(SceneError::NodeNotFound(source))
    }

    /// The node and all of its descendants, parents before children
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut collected = vec![id];
        let mut i = 0;
        while i < collected.len() {
            if let Some(children) = self.children.get(&collected[i]) {
                collected.extend(children.iter().copied());
            }
            i += 1;
        }
        collected
    }

    /// Check if placing `child_id` under `parent_id` would create a cycle
    pub(crate) fn would_create_cycle(&self, parent_id: NodeId, child_id: NodeId) -> bool {
        // Check if child is an ancestor of parent
        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == child_id {
                return true;
            }
            current = self.parent.get(&id).copied();
        }
        false
    }

    fn attach(&mut self, id: NodeId, parent_id: NodeId) {
        self.children.entry(parent_id).or_default().push(id);
        self.parent.insert(id, parent_id);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent_id) = self.parent.remove(&id)
            && let Some(siblings) = self.children.get_mut(&parent_id)
        {
            siblings.retain(|child| *child != id);
        }
    }
}
