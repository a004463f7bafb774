//! Tree structure: attach, detach, destroy, ordering.

use tracing::debug;

use crate::error::{SceneError, SceneResult};
use crate::event::EventKind;
use crate::node::{NodeId, NodeKind};

use super::Scene;

impl Scene {
    /// Attaches `child` to `parent`.
    ///
    /// Visual children are kept sorted by z-order, stable for equal z.
    /// Animators go to the parent's animator list and read their starting
    /// value from the parent when they inherit it.
    ///
    /// # Errors
    ///
    /// - `ObjectHasParent` if `child` already has a parent (the tree is unchanged)
    /// - `InvalidChild` if `parent` is an animator
    /// - `WouldCreateCycle` if `child` is `parent` or one of its ancestors
    /// - `NodeNotFound` for stale ids
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let child_node = self.node(child).ok_or_else(|| self.not_found(child))?;
        let parent_node = self.node(parent).ok_or_else(|| self.not_found(parent))?;

        if let Some(current) = child_node.parent {
            return Err(SceneError::ObjectHasParent {
                child: child_node.name.clone(),
                parent: self.name_of(current).to_owned(),
            });
        }
        if parent_node.visual().is_none() {
            return Err(SceneError::InvalidChild {
                child: child_node.name.clone(),
                parent: parent_node.name.clone(),
                reason: "animators cannot own nodes",
            });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle {
                child: child_node.name.clone(),
                parent: parent_node.name.clone(),
            });
        }

        let is_animator = matches!(child_node.kind, NodeKind::Animator(_));
        self.roots.retain(|&r| r != child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if is_animator {
            if let Some(node) = self.node_mut(parent) {
                node.animators.push(child);
            }
            self.attach_animator(child);
        } else {
            if let Some(node) = self.node_mut(parent) {
                node.children.push(child);
            }
            self.sort_children(parent);
        }

        debug!(parent = %parent, child = %child, "Node attached");
        Ok(())
    }

    /// Detaches `child` from `parent`.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotChild` if `child` is not attached to `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let child_node = self.node(child).ok_or_else(|| self.not_found(child))?;
        if child_node.parent != Some(parent) {
            return Err(SceneError::ObjectNotChild {
                child: child_node.name.clone(),
                parent: self.name_of(parent).to_owned(),
            });
        }
        self.unlink(parent, child);
        debug!(parent = %parent, child = %child, "Node detached");
        Ok(())
    }

    /// Detaches a node from its parent.
    ///
    /// # Errors
    ///
    /// Returns `ObjectWithoutParent` if the node has no parent.
    pub fn detach(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.node(id).ok_or_else(|| self.not_found(id))?;
        let parent = node
            .parent
            .ok_or_else(|| SceneError::ObjectWithoutParent(node.name.clone()))?;
        self.remove_child(parent, id)
    }

    /// Makes a detached node a root.
    ///
    /// # Errors
    ///
    /// Returns `ObjectHasParent` if the node is attached, `InvalidChild` for animators.
    pub fn add_root(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.node(id).ok_or_else(|| self.not_found(id))?;
        if let Some(parent) = node.parent {
            return Err(SceneError::ObjectHasParent {
                child: node.name.clone(),
                parent: self.name_of(parent).to_owned(),
            });
        }
        if node.visual().is_none() {
            return Err(SceneError::InvalidChild {
                child: node.name.clone(),
                parent: "<root>".to_owned(),
                reason: "animators need a visual parent",
            });
        }
        if !self.roots.contains(&id) {
            self.roots.push(id);
            self.sort_roots();
        }
        Ok(())
    }

    /// Removes a node from the roots. Returns false if it was not a root.
    pub fn remove_root(&mut self, id: NodeId) -> bool {
        let before = self.roots.len();
        self.roots.retain(|&r| r != id);
        self.roots.len() != before
    }

    /// Destroys a node and its whole subtree, animators included.
    ///
    /// The node is detached first. Returns false for a stale id.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).map(|node| node.parent) else {
            return false;
        };
        if let Some(parent) = parent {
            self.unlink(parent, id);
        }
        self.roots.retain(|&r| r != id);
        self.destroy_subtree(id);
        true
    }

    fn destroy_subtree(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let mut owned = std::mem::take(&mut node.children);
        owned.append(&mut node.animators);
        if let Some(visual) = node.kind.visual_mut() {
            owned.extend(visual.dynamic.take_all());
        }
        for child in owned {
            self.destroy_subtree(child);
        }

        if self.container.focused() == Some(id) {
            self.container.clear_focus();
        }
        if let Some(node) = self.nodes.remove(id.0) {
            self.names.remove(&node.name);
            debug!(node = %id, name = %node.name, "Node destroyed");
        }
    }

    /// Removes `child` from every list of `parent` and clears its back link.
    pub(crate) fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
            node.animators.retain(|&c| c != child);
            if let Some(visual) = node.kind.visual_mut() {
                visual.dynamic.remove(child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Visual children of a node, sorted by z-order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Sets a node's z-order and re-sorts its siblings.
    pub fn set_z_order(&mut self, id: NodeId, z_order: i32) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if node.z_order == z_order {
            return true;
        }
        node.z_order = z_order;
        match node.parent {
            Some(parent) => self.sort_children(parent),
            None => self.sort_roots(),
        }
        true
    }

    /// Enables or disables a node. Disabled nodes and their subtrees ignore input.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> bool {
        self.node_mut(id).map(|node| node.enabled = enabled).is_some()
    }

    /// Wakes or pauses a node's update recursion.
    pub fn set_awake(&mut self, id: NodeId, awake: bool) -> bool {
        self.node_mut(id).map(|node| node.awake = awake).is_some()
    }

    /// Depth-first iterator over a subtree's visual nodes, `id` first.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            scene: self,
            stack: if self.contains(id) { vec![id] } else { Vec::new() },
        }
    }

    fn sort_children(&mut self, parent: NodeId) {
        let Some(node) = self.nodes.get(parent.0) else {
            return;
        };
        let mut children = node.children.clone();
        children.sort_by_key(|&c| self.nodes.get(c.0).map_or(0, |n| n.z_order));
        if let Some(node) = self.node_mut(parent) {
            node.children = children;
        }
    }

    fn sort_roots(&mut self) {
        let nodes = &self.nodes;
        self.roots
            .sort_by_key(|&r| nodes.get(r.0).map_or(0, |n| n.z_order));
    }

    pub(crate) fn not_found(&self, id: NodeId) -> SceneError {
        SceneError::NodeNotFound(id.to_string())
    }

    /// Fires a lifecycle event on an animator node.
    pub(crate) fn fire_lifecycle(&mut self, id: NodeId, kind: EventKind) {
        self.fire(&crate::event::EventArgs::new(id, kind));
    }
}

/// Depth-first iterator over visual nodes. See [`Scene::descendants`].
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Push in reverse so the lowest z-order child comes out first
        self.stack.extend(self.scene.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Rect;

    fn scene_with(names: &[&str]) -> (Scene, Vec<NodeId>) {
        let mut scene = Scene::new();
        let ids = names
            .iter()
            .map(|name| scene.create_container(*name, Rect::ZERO).expect("create"))
            .collect();
        (scene, ids)
    }

    #[test]
    fn test_add_and_remove_child() {
        let (mut scene, ids) = scene_with(&["root", "a"]);
        scene.add_child(ids[0], ids[1]).expect("attach");

        assert_eq!(scene.parent(ids[1]), Some(ids[0]));
        assert_eq!(scene.children(ids[0]), &[ids[1]]);

        scene.remove_child(ids[0], ids[1]).expect("detach");
        assert_eq!(scene.parent(ids[1]), None);
        assert!(scene.children(ids[0]).is_empty());
    }

    #[test]
    fn test_remove_non_child_fails() {
        let (mut scene, ids) = scene_with(&["root", "a"]);
        let err = scene.remove_child(ids[0], ids[1]).unwrap_err();
        assert!(matches!(err, SceneError::ObjectNotChild { .. }));

        let err = scene.detach(ids[1]).unwrap_err();
        assert_eq!(err, SceneError::ObjectWithoutParent("a".into()));
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut scene, ids) = scene_with(&["a", "b", "c"]);
        scene.add_child(ids[0], ids[1]).expect("attach");
        scene.add_child(ids[1], ids[2]).expect("attach");

        let err = scene.add_child(ids[2], ids[0]).unwrap_err();
        assert!(matches!(err, SceneError::WouldCreateCycle { .. }));
        assert!(matches!(
            scene.add_child(ids[0], ids[0]).unwrap_err(),
            SceneError::WouldCreateCycle { .. }
        ));
    }

    #[test]
    fn test_children_sorted_by_z_stable() {
        let (mut scene, ids) = scene_with(&["root", "a", "b", "c"]);
        scene.set_z_order(ids[1], 5);
        for &child in &ids[1..] {
            scene.add_child(ids[0], child).expect("attach");
        }
        assert_eq!(scene.children(ids[0]), &[ids[2], ids[3], ids[1]]);

        scene.set_z_order(ids[3], 9);
        assert_eq!(scene.children(ids[0]), &[ids[2], ids[1], ids[3]]);
    }

    #[test]
    fn test_destroy_cascades() {
        let (mut scene, ids) = scene_with(&["root", "a", "b"]);
        scene.add_root(ids[0]).expect("root");
        scene.add_child(ids[0], ids[1]).expect("attach");
        scene.add_child(ids[1], ids[2]).expect("attach");

        assert!(scene.destroy(ids[1]));
        assert!(!scene.contains(ids[1]));
        assert!(!scene.contains(ids[2]));
        assert!(scene.find("b").is_none());
        assert!(scene.children(ids[0]).is_empty());
        assert!(!scene.destroy(ids[1]));
    }

    #[test]
    fn test_descendants_depth_first() {
        let (mut scene, ids) = scene_with(&["root", "a", "b", "a1"]);
        scene.add_child(ids[0], ids[1]).expect("attach");
        scene.add_child(ids[0], ids[2]).expect("attach");
        scene.add_child(ids[1], ids[3]).expect("attach");

        let order: Vec<_> = scene.descendants(ids[0]).collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[3], ids[2]]);
    }

    #[test]
    fn test_animator_cannot_own_children() {
        let mut scene = Scene::new();
        let animator = scene.create("MoverX", "mover").expect("create");
        let node = scene.create_container("n", Rect::ZERO).expect("create");
        assert!(matches!(
            scene.add_child(animator, node).unwrap_err(),
            SceneError::InvalidChild { .. }
        ));
    }
}
