//! Draw pass.

use trellis_core::{Affine2, Rect};

use crate::node::{NodeId, NodeKind};
use crate::render::{DrawFrame, DrawList};

use super::Scene;

impl Scene {
    /// Records the scene into `out`, roots in z-order.
    ///
    /// Invisible and degenerately scaled nodes are skipped with their subtrees.
    pub fn draw(&self, out: &mut DrawList) {
        for &root in &self.roots {
            self.draw_node(root, Affine2::IDENTITY, None, out);
        }
    }

    fn draw_node(&self, id: NodeId, parent: Affine2, parent_alpha: Option<u8>, out: &mut DrawList) {
        let Some(node) = self.node(id) else {
            return;
        };
        let Some(visual) = node.visual() else {
            return;
        };
        if !visual.is_visible() || visual.is_degenerate(self.config.scale_epsilon) {
            return;
        }

        let alpha = match parent_alpha {
            Some(inherited) if visual.inherits_alpha() => {
                (f32::from(visual.alpha()) * f32::from(inherited) / 255.0) as u8
            }
            _ => visual.alpha(),
        };
        let frame = DrawFrame {
            transform: parent * visual.local_transform(),
            alpha,
        };

        if let NodeKind::Widget(visual, behavior) = &node.kind {
            behavior.draw(visual, &frame, out);
        }

        if visual.clips() {
            out.push_clip(Rect::envelope(&frame.corners(visual.local_rect())));
        }
        for &child in &node.children {
            self.draw_node(child, frame.transform, Some(alpha), out);
        }
        if visual.clips() {
            out.pop_clip();
        }
    }
}
