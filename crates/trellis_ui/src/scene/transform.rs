//! Coordinate spaces and derived values.
//!
//! Every node defines a local space with its origin at the rect's top-left.
//! "Derived" values fold local values up the ancestor chain, either to the
//! scene or to an `override_root` ancestor whose space is used instead.

use trellis_core::{Rect, Vec2};

use crate::node::{NodeId, VisualNode};

use super::Scene;

impl Scene {
    /// Visual nodes from `id` up to, but excluding, `override_root`.
    ///
    /// Empty if `id` is not a visual node.
    fn chain(&self, id: NodeId, override_root: Option<NodeId>) -> Vec<&VisualNode> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if Some(node_id) == override_root {
                break;
            }
            let Some(node) = self.node(node_id) else {
                break;
            };
            let Some(visual) = node.visual() else {
                return Vec::new();
            };
            chain.push(visual);
            current = node.parent;
        }
        chain
    }

    /// Converts a point in `override_root` space (scene space if None) to
    /// the local space of `id`.
    ///
    /// Returns None if any scale on the chain is degenerate, or `id` is not visual.
    #[must_use]
    pub fn transform_to_local_space(
        &self,
        id: NodeId,
        point: Vec2,
        override_root: Option<NodeId>,
    ) -> Option<Vec2> {
        let chain = self.chain(id, override_root);
        if chain.is_empty() && Some(id) != override_root {
            return None;
        }
        let epsilon = self.config.scale_epsilon;
        chain
            .iter()
            .rev()
            .try_fold(point, |point, visual| visual.to_local(point, epsilon))
    }

    /// Converts a local point of `id` to `override_root` space (scene space if None).
    #[must_use]
    pub fn derived_point(&self, id: NodeId, point: Vec2, override_root: Option<NodeId>) -> Option<Vec2> {
        let chain = self.chain(id, override_root);
        if chain.is_empty() && Some(id) != override_root {
            return None;
        }
        Some(chain.iter().fold(point, |point, visual| visual.to_parent(point)))
    }

    /// Converts several local points of `id` at once.
    #[must_use]
    pub fn derived_points<const N: usize>(
        &self,
        id: NodeId,
        points: [Vec2; N],
        override_root: Option<NodeId>,
    ) -> Option<[Vec2; N]> {
        let chain = self.chain(id, override_root);
        if chain.is_empty() && Some(id) != override_root {
            return None;
        }
        Some(points.map(|point| chain.iter().fold(point, |point, visual| visual.to_parent(point))))
    }

    /// Axis-aligned bounds of a node in `override_root` space.
    #[must_use]
    pub fn bounding_rect(&self, id: NodeId, override_root: Option<NodeId>) -> Option<Rect> {
        let corners = self.visual(id)?.local_rect().corners();
        self.derived_points(id, corners, override_root)
            .map(|corners| Rect::envelope(&corners))
    }

    /// Position of a node's top-left corner in `override_root` space.
    #[must_use]
    pub fn derived_position(&self, id: NodeId, override_root: Option<NodeId>) -> Option<Vec2> {
        self.derived_point(id, Vec2::ZERO, override_root)
    }

    /// Product of scales from `id` up to `override_root`.
    #[must_use]
    pub fn derived_scale(&self, id: NodeId, override_root: Option<NodeId>) -> Option<Vec2> {
        self.visual(id)?;
        Some(
            self.chain(id, override_root)
                .iter()
                .fold(Vec2::ONE, |scale, visual| scale.mul_elem(visual.scale())),
        )
    }

    /// Sum of angles from `id` up to `override_root`, in degrees.
    #[must_use]
    pub fn derived_angle(&self, id: NodeId, override_root: Option<NodeId>) -> Option<f32> {
        self.visual(id)?;
        Some(self.chain(id, override_root).iter().map(|visual| visual.angle()).sum())
    }

    /// Effective alpha of a node.
    ///
    /// The own alpha is used when `id == override_root`, when alpha
    /// inheritance is off, or at the root. Otherwise it is multiplied by the
    /// parent's derived alpha, truncating at every level. Stale ids give 0.
    #[must_use]
    pub fn derived_alpha(&self, id: NodeId, override_root: Option<NodeId>) -> u8 {
        let Some(node) = self.node(id) else {
            return 0;
        };
        let Some(visual) = node.visual() else {
            return 0;
        };
        let alpha = visual.alpha();
        if Some(id) == override_root || !visual.inherits_alpha() {
            return alpha;
        }
        match node.parent {
            None => alpha,
            Some(parent) => {
                let inherited = self.derived_alpha(parent, override_root);
                (f32::from(alpha) * f32::from(inherited) / 255.0) as u8
            }
        }
    }

    /// Returns true if the node and every ancestor are enabled.
    #[must_use]
    pub fn is_derived_enabled(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                return false;
            };
            if !node.enabled {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Returns true if the node and every ancestor are visible, opaque
    /// enough to draw and not degenerately scaled.
    #[must_use]
    pub fn is_derived_visible(&self, id: NodeId) -> bool {
        let epsilon = self.config.scale_epsilon;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                return false;
            };
            let Some(visual) = node.visual() else {
                return false;
            };
            if !visual.is_visible() || visual.is_degenerate(epsilon) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Returns true if a scene-space point lies inside the node's rect.
    #[must_use]
    pub fn is_point_inside(&self, id: NodeId, point: Vec2) -> bool {
        let Some(visual) = self.visual(id) else {
            return false;
        };
        let local_rect = visual.local_rect();
        self.transform_to_local_space(id, point, None)
            .is_some_and(|local| local_rect.contains(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let parent = scene
            .create_container("parent", Rect::new(100.0, 50.0, 200.0, 200.0))
            .expect("create");
        let child = scene
            .create_container("child", Rect::new(10.0, 20.0, 40.0, 40.0))
            .expect("create");
        scene.add_child(parent, child).expect("attach");
        (scene, parent, child)
    }

    #[test]
    fn test_translation_chain() {
        let (scene, parent, child) = nested();
        let scene_point = scene.derived_point(child, Vec2::new(5.0, 5.0), None).expect("visual");
        assert!(scene_point.approx_eq(Vec2::new(115.0, 75.0), 1e-4));

        let in_parent = scene.derived_point(child, Vec2::ZERO, Some(parent)).expect("visual");
        assert!(in_parent.approx_eq(Vec2::new(10.0, 20.0), 1e-4));

        let local = scene.transform_to_local_space(child, scene_point, None).expect("invertible");
        assert!(local.approx_eq(Vec2::new(5.0, 5.0), 1e-4));
    }

    #[test]
    fn test_rotated_parent_round_trip() {
        let (mut scene, parent, child) = nested();
        {
            let visual = scene.visual_mut(parent).expect("visual");
            visual.set_angle(90.0);
            visual.set_scale(Vec2::new(2.0, 0.5));
        }
        let point = Vec2::new(3.0, 7.0);
        let derived = scene.derived_point(child, point, None).expect("visual");
        let back = scene.transform_to_local_space(child, derived, None).expect("invertible");
        assert!(back.approx_eq(point, 1e-3), "{back:?}");

        assert_eq!(scene.derived_scale(child, None), Some(Vec2::new(2.0, 0.5)));
        assert_eq!(scene.derived_angle(child, None), Some(90.0));
    }

    #[test]
    fn test_degenerate_scale_has_no_local_point() {
        let (mut scene, parent, child) = nested();
        scene.visual_mut(parent).expect("visual").set_scale(Vec2::new(0.0, 1.0));
        assert!(scene.transform_to_local_space(child, Vec2::ZERO, None).is_none());
        assert!(!scene.is_derived_visible(child));
        assert!(!scene.is_point_inside(child, Vec2::new(115.0, 75.0)));
    }

    #[test]
    fn test_derived_alpha_truncates() {
        let (mut scene, parent, child) = nested();
        scene.visual_mut(parent).expect("visual").set_alpha(128);
        scene.visual_mut(child).expect("visual").set_alpha(128);

        // 128 * 128 / 255 = 64.25
        assert_eq!(scene.derived_alpha(child, None), 64);
        assert_eq!(scene.derived_alpha(child, Some(child)), 128);

        scene.visual_mut(child).expect("visual").set_inherit_alpha(false);
        assert_eq!(scene.derived_alpha(child, None), 128);
    }

    #[test]
    fn test_bounding_rect_of_rotated_node() {
        let mut scene = Scene::new();
        let node = scene
            .create_container("n", Rect::new(0.0, 0.0, 20.0, 10.0))
            .expect("create");
        scene.visual_mut(node).expect("visual").set_angle(90.0);

        // Rotates around the centre (10, 5)
        let bounds = scene.bounding_rect(node, None).expect("visual");
        assert!(bounds.approx_eq(&Rect::new(5.0, -5.0, 10.0, 20.0), 1e-3), "{bounds:?}");
    }

    #[test]
    fn test_derived_enabled() {
        let (mut scene, parent, child) = nested();
        assert!(scene.is_derived_enabled(child));
        scene.set_enabled(parent, false);
        assert!(!scene.is_derived_enabled(child));
    }
}
