//! Resizing and the anchor cascade.

use tracing::warn;
use trellis_core::{Rect, Vec2};

use crate::layout::{plan_child, Axis};
use crate::node::NodeId;

use super::Scene;

impl Scene {
    /// Resizes a visual node, cascading the change to its children.
    ///
    /// Returns false if `id` is not a visual node.
    pub fn set_size(&mut self, id: NodeId, size: Vec2) -> bool {
        self.resize_axis(id, Axis::Horizontal, size.x, false)
            && self.resize_axis(id, Axis::Vertical, size.y, false)
    }

    /// Changes the width of a visual node, cascading to its children.
    pub fn set_width(&mut self, id: NodeId, width: f32) -> bool {
        self.resize_axis(id, Axis::Horizontal, width, false)
    }

    /// Changes the height of a visual node, cascading to its children.
    pub fn set_height(&mut self, id: NodeId, height: f32) -> bool {
        self.resize_axis(id, Axis::Vertical, height, false)
    }

    /// Moves and resizes a visual node.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> bool {
        let Some(visual) = self.visual_mut(id) else {
            return false;
        };
        visual.set_position(rect.position());
        self.set_size(id, rect.size())
    }

    /// Applies a new size on one axis and plans every visual child's reaction.
    ///
    /// A pivot that was never set explicitly follows the rect centre. During
    /// a cascade an explicit pivot is rescaled with the size.
    pub(crate) fn resize_axis(&mut self, id: NodeId, axis: Axis, size: f32, cascading: bool) -> bool {
        let epsilon = self.config.epsilon;
        let Some(visual) = self.visual_mut(id) else {
            return false;
        };

        let old = visual.size_on(axis);
        let difference = size - old;
        if difference.abs() < epsilon {
            return true;
        }

        visual.set_size_on(axis, size);
        if !visual.is_pivot_explicit(axis) {
            visual.write_pivot_on(axis, size * 0.5);
        } else if cascading && old != 0.0 {
            let pivot = visual.pivot_on(axis) * size / old;
            visual.write_pivot_on(axis, pivot);
        }

        let children = self.children(id).to_vec();
        for child in children {
            let Some(child_visual) = self.visual_mut(child) else {
                continue;
            };
            let step = plan_child(child_visual, axis, difference);
            if step.is_noop() {
                continue;
            }
            child_visual.shift_on(axis, step.shift);
            if step.aspect_skipped {
                warn!(
                    node = %child,
                    "Max size set on a node retaining anchor aspect, aspect not kept"
                );
            }
            if let Some(cross) = step.cross {
                child_visual.shift_on(axis.cross(), cross.shift);
            }

            if let Some(resize) = step.resize {
                self.resize_axis(child, axis, resize, true);
            }
            if let Some(cross) = step.cross {
                self.resize_axis(child, axis.cross(), cross.size, true);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Anchors;

    fn parent_with_child(anchors: Anchors) -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let parent = scene
            .create_container("parent", Rect::new(0.0, 0.0, 100.0, 100.0))
            .expect("create");
        let child = scene
            .create_container("child", Rect::new(10.0, 10.0, 80.0, 80.0))
            .expect("create");
        scene.visual_mut(child).expect("visual").set_anchors(anchors);
        scene.add_child(parent, child).expect("attach");
        (scene, parent, child)
    }

    #[test]
    fn test_far_anchor_slides() {
        let (mut scene, parent, child) = parent_with_child(Anchors::new(false, true, true, false));
        scene.set_width(parent, 150.0);
        assert!(scene.visual(child).expect("visual").rect().approx_eq(&Rect::new(60.0, 10.0, 80.0, 80.0), 1e-4));
    }

    #[test]
    fn test_unanchored_recentres() {
        let (mut scene, parent, child) = parent_with_child(Anchors::NONE);
        scene.set_size(parent, Vec2::new(120.0, 80.0));
        assert!(scene.visual(child).expect("visual").rect().approx_eq(&Rect::new(20.0, 0.0, 80.0, 80.0), 1e-4));
    }

    #[test]
    fn test_parent_pivot_follows_centre() {
        let (mut scene, parent, _) = parent_with_child(Anchors::ALL);
        scene.set_size(parent, Vec2::new(200.0, 50.0));
        assert_eq!(scene.visual(parent).expect("visual").pivot(), Vec2::new(100.0, 25.0));
    }

    #[test]
    fn test_stretch_rescales_explicit_pivot() {
        let (mut scene, parent, child) = parent_with_child(Anchors::ALL);
        scene.visual_mut(child).expect("visual").set_pivot(Vec2::new(20.0, 0.0));
        scene.set_width(parent, 180.0);

        let visual = scene.visual(child).expect("visual");
        assert!((visual.size().x - 160.0).abs() < 1e-4);
        assert!((visual.pivot().x - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_max_width_clamps_and_recentres() {
        let (mut scene, parent, child) = parent_with_child(Anchors::ALL);
        scene.visual_mut(child).expect("visual").set_max_width(Some(100.0));
        scene.set_width(parent, 140.0);
        // Requested 120, clamped to 100, shifted by half the remainder
        assert!(scene.visual(child).expect("visual").rect().approx_eq(&Rect::new(20.0, 10.0, 100.0, 80.0), 1e-4));
    }

    #[test]
    fn test_aspect_retained_on_cross_axis() {
        let (mut scene, parent, child) = parent_with_child(Anchors::new(true, true, true, false));
        scene.visual_mut(child).expect("visual").set_retain_anchor_aspect(true);
        scene.set_width(parent, 140.0);

        let rect = scene.visual(child).expect("visual").rect();
        assert!(rect.approx_eq(&Rect::new(10.0, 10.0, 120.0, 120.0), 1e-4), "{rect:?}");
    }

    #[test]
    fn test_aspect_with_all_anchors_stays_inside_parent() {
        let (mut scene, parent, child) = parent_with_child(Anchors::ALL);
        scene.visual_mut(child).expect("visual").set_retain_anchor_aspect(true);
        scene.set_size(parent, Vec2::new(200.0, 200.0));

        let rect = scene.visual(child).expect("visual").rect();
        assert!(rect.approx_eq(&Rect::new(10.0, 10.0, 180.0, 180.0), 1e-4), "{rect:?}");
    }

    #[test]
    fn test_collapsed_stretch_keeps_anchored_edge() {
        let (mut scene, parent, child) = parent_with_child(Anchors::ALL);
        scene.set_width(parent, 0.0);
        let rect = scene.visual(child).expect("visual").rect();
        assert!(rect.approx_eq(&Rect::new(10.0, 10.0, 0.0, 80.0), 1e-4), "{rect:?}");

        // The floored amount is not recovered on the way back
        scene.set_width(parent, 100.0);
        let rect = scene.visual(child).expect("visual").rect();
        assert!(rect.approx_eq(&Rect::new(10.0, 10.0, 100.0, 80.0), 1e-4), "{rect:?}");
    }

    #[test]
    fn test_first_resize_centres_pivot() {
        let mut scene = Scene::new();
        let panel = scene.create_container("panel", Rect::ZERO).expect("create");
        scene.set_size(panel, Vec2::new(100.0, 60.0));
        assert_eq!(scene.visual(panel).expect("visual").pivot(), Vec2::new(50.0, 30.0));
    }

    #[test]
    fn test_grandchildren_cascade() {
        let (mut scene, parent, child) = parent_with_child(Anchors::ALL);
        let grandchild = scene
            .create_container("grandchild", Rect::new(0.0, 0.0, 80.0, 10.0))
            .expect("create");
        scene.visual_mut(grandchild).expect("visual").set_anchors(Anchors::new(true, true, true, false));
        scene.add_child(child, grandchild).expect("attach");

        scene.set_width(parent, 110.0);
        assert!((scene.visual(grandchild).expect("visual").size().x - 90.0).abs() < 1e-4);
    }
}
