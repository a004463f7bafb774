//! Input dispatch.
//!
//! Events walk the tree topmost first: roots and children in reverse
//! z-order. The first node that handles an event stops the walk, and a
//! node only tries itself after all of its children declined. Pointer
//! points are converted into each node's local space one level at a time.

use trellis_core::Vec2;

use crate::event::{EventArgs, EventKind};
use crate::input::{GamepadButton, InputEvent, Key, MouseButton};
use crate::node::{HitTest, NodeId, NodeKind};

use super::Scene;

/// Outcome of the pre-checks every pointer walk runs on a node.
struct PointerVisit {
    hit_test: HitTest,
    local: Vec2,
    inside: bool,
    descend: bool,
}

impl Scene {
    /// Dispatches a queued input event. Returns true if a node handled it.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::MouseDown { point, button } => self.mouse_down(*point, *button),
            InputEvent::MouseUp { point, button } => self.mouse_up(*point, *button),
            InputEvent::MouseMove { point } => {
                self.mouse_move(*point);
                false
            }
            other => {
                let roots = self.roots.clone();
                roots.iter().rev().any(|&root| self.input_node(root, other))
            }
        }
    }

    /// Pointer pressed at a scene-space point.
    pub fn mouse_down(&mut self, point: Vec2, button: MouseButton) -> bool {
        let roots = self.roots.clone();
        roots
            .iter()
            .rev()
            .any(|&root| self.mouse_down_node(root, point, button))
    }

    /// Pointer released at a scene-space point.
    ///
    /// After the winner is known, every visible node off the path from
    /// its root to the winner receives one cancel, parents before children.
    pub fn mouse_up(&mut self, point: Vec2, button: MouseButton) -> bool {
        let roots = self.roots.clone();
        let mut path = Vec::new();
        let handled = roots
            .iter()
            .rev()
            .any(|&root| self.mouse_up_node(root, point, button, &mut path));
        for root in roots {
            self.cancel_off_path(root, &path);
        }
        handled
    }

    /// Pointer moved. Broadcast to every visible, enabled node.
    pub fn mouse_move(&mut self, point: Vec2) {
        let roots = self.roots.clone();
        for root in roots {
            self.mouse_move_node(root, point);
        }
    }

    /// Key pressed.
    pub fn key_down(&mut self, key: Key) -> bool {
        self.dispatch(&InputEvent::KeyDown(key))
    }

    /// Key released.
    pub fn key_up(&mut self, key: Key) -> bool {
        self.dispatch(&InputEvent::KeyUp(key))
    }

    /// Character typed.
    pub fn char_input(&mut self, character: char) -> bool {
        self.dispatch(&InputEvent::Char(character))
    }

    /// Touch points changed. Points are scene-space.
    pub fn touch(&mut self, touches: &[Vec2]) -> bool {
        self.dispatch(&InputEvent::Touch(touches.to_vec()))
    }

    /// Gamepad button pressed.
    pub fn button_down(&mut self, button: GamepadButton) -> bool {
        self.dispatch(&InputEvent::ButtonDown(button))
    }

    /// Gamepad button released.
    pub fn button_up(&mut self, button: GamepadButton) -> bool {
        self.dispatch(&InputEvent::ButtonUp(button))
    }

    /// Topmost hit-testable node under a scene-space point, searching the
    /// subtree of `id`, `id` included.
    #[must_use]
    pub fn child_under_point(&self, id: NodeId, point: Vec2) -> Option<NodeId> {
        let parent_point = match self.parent(id) {
            Some(parent) => self.transform_to_local_space(parent, point, None)?,
            None => point,
        };
        self.topmost_under(id, parent_point)
    }

    /// Topmost hit-testable node under a scene-space point.
    #[must_use]
    pub fn node_under_point(&self, point: Vec2) -> Option<NodeId> {
        self.roots
            .iter()
            .rev()
            .find_map(|&root| self.topmost_under(root, point))
    }

    fn topmost_under(&self, id: NodeId, parent_point: Vec2) -> Option<NodeId> {
        let visit = self.visit_pointer(id, parent_point)?;
        if visit.descend {
            let hit = self
                .children(id)
                .iter()
                .rev()
                .find_map(|&child| self.topmost_under(child, visit.local));
            if hit.is_some() {
                return hit;
            }
        }
        (visit.inside && visit.hit_test == HitTest::Enabled).then_some(id)
    }

    /// Shared pre-checks: None if the node and its subtree take no pointer input.
    fn visit_pointer(&self, id: NodeId, parent_point: Vec2) -> Option<PointerVisit> {
        let node = self.node(id)?;
        let visual = node.visual()?;
        if visual.hit_test == HitTest::DisabledRecursive || !node.enabled || !visual.is_visible() {
            return None;
        }
        let local = visual.to_local(parent_point, self.config.scale_epsilon)?;
        let inside = visual.local_rect().contains(local);
        Some(PointerVisit {
            hit_test: visual.hit_test,
            local,
            inside,
            descend: inside || !visual.clip,
        })
    }

    fn mouse_down_node(&mut self, id: NodeId, parent_point: Vec2, button: MouseButton) -> bool {
        let Some(visit) = self.visit_pointer(id, parent_point) else {
            return false;
        };
        if visit.hit_test == HitTest::Enabled {
            self.container.clear_focus();
        }
        if visit.descend {
            let children = self.children(id).to_vec();
            if children
                .iter()
                .rev()
                .any(|&child| self.mouse_down_node(child, visit.local, button))
            {
                return true;
            }
        }
        visit.hit_test == HitTest::Enabled
            && visit.inside
            && self.handle_pointer(id, EventKind::MouseDown, visit.local, button)
    }

    fn mouse_up_node(&mut self, id: NodeId, parent_point: Vec2, button: MouseButton, path: &mut Vec<NodeId>) -> bool {
        let Some(visit) = self.visit_pointer(id, parent_point) else {
            return false;
        };
        path.push(id);
        if visit.descend {
            let children = self.children(id).to_vec();
            if children
                .iter()
                .rev()
                .any(|&child| self.mouse_up_node(child, visit.local, button, path))
            {
                return true;
            }
        }
        if visit.hit_test == HitTest::Enabled
            && visit.inside
            && self.handle_pointer(id, EventKind::MouseUp, visit.local, button)
        {
            return true;
        }
        path.pop();
        false
    }

    fn handle_pointer(&mut self, id: NodeId, kind: EventKind, local: Vec2, button: MouseButton) -> bool {
        let claimed = match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Widget(visual, behavior)) => match kind {
                EventKind::MouseDown => behavior.on_mouse_down(visual, local, button),
                EventKind::MouseUp => behavior.on_mouse_up(visual, local, button),
                _ => false,
            },
            _ => false,
        };
        let mut args = EventArgs::new(id, kind);
        args.local = Some(local);
        args.button = Some(button);
        let fired = self.fire(&args);
        claimed || fired
    }

    fn cancel_off_path(&mut self, id: NodeId, path: &[NodeId]) {
        let Some(visual) = self.visual(id) else {
            return;
        };
        if !visual.is_visible() {
            return;
        }
        if !path.contains(&id) {
            if let Some(NodeKind::Widget(visual, behavior)) = self.node_mut(id).map(|node| &mut node.kind) {
                behavior.on_mouse_cancel(visual);
            }
            self.fire(&EventArgs::new(id, EventKind::MouseCancel));
        }
        let children = self.children(id).to_vec();
        for child in children {
            self.cancel_off_path(child, path);
        }
    }

    fn mouse_move_node(&mut self, id: NodeId, parent_point: Vec2) {
        let epsilon = self.config.scale_epsilon;
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if !node.enabled {
            return;
        }
        let Some(visual) = node.kind.visual() else {
            return;
        };
        if !visual.is_visible() {
            return;
        }
        let Some(local) = visual.to_local(parent_point, epsilon) else {
            return;
        };
        if let NodeKind::Widget(visual, behavior) = &mut node.kind {
            behavior.on_mouse_move(visual, local);
        }

        let mut args = EventArgs::new(id, EventKind::MouseMove);
        args.local = Some(local);
        self.fire(&args);

        let children = self.children(id).to_vec();
        for child in children {
            self.mouse_move_node(child, local);
        }
    }

    fn input_node(&mut self, id: NodeId, event: &InputEvent) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let Some(visual) = node.visual() else {
            return false;
        };
        let hit_test = visual.hit_test;
        if hit_test == HitTest::DisabledRecursive || !node.enabled || !visual.is_visible() {
            return false;
        }
        let children = node.children.clone();
        if children.iter().rev().any(|&child| self.input_node(child, event)) {
            return true;
        }
        hit_test == HitTest::Enabled && self.handle_input(id, event)
    }

    fn handle_input(&mut self, id: NodeId, event: &InputEvent) -> bool {
        let args = match event {
            InputEvent::KeyDown(key) | InputEvent::KeyUp(key) => {
                let kind = if matches!(event, InputEvent::KeyDown(_)) {
                    EventKind::KeyDown
                } else {
                    EventKind::KeyUp
                };
                let mut args = EventArgs::new(id, kind);
                args.key = Some(*key);
                args
            }
            InputEvent::Char(character) => {
                let mut args = EventArgs::new(id, EventKind::Char);
                args.character = Some(*character);
                args
            }
            InputEvent::Touch(touches) => {
                let mut args = EventArgs::new(id, EventKind::Touch);
                args.touches.clone_from(touches);
                args
            }
            InputEvent::ButtonDown(button) | InputEvent::ButtonUp(button) => {
                let kind = if matches!(event, InputEvent::ButtonDown(_)) {
                    EventKind::ButtonDown
                } else {
                    EventKind::ButtonUp
                };
                let mut args = EventArgs::new(id, kind);
                args.gamepad = Some(*button);
                args
            }
            InputEvent::MouseDown { .. } | InputEvent::MouseUp { .. } | InputEvent::MouseMove { .. } => {
                return false;
            }
        };

        let claimed = match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Widget(visual, behavior)) => match event {
                InputEvent::KeyDown(key) => behavior.on_key_down(visual, *key),
                InputEvent::KeyUp(key) => behavior.on_key_up(visual, *key),
                InputEvent::Char(character) => behavior.on_char(visual, *character),
                InputEvent::Touch(touches) => behavior.on_touch(visual, touches),
                InputEvent::ButtonDown(button) => behavior.on_button_down(visual, *button),
                InputEvent::ButtonUp(button) => behavior.on_button_up(visual, *button),
                _ => false,
            },
            _ => false,
        };
        claimed || self.fire(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_core::Rect;

    type Log = Rc<RefCell<Vec<(String, EventKind)>>>;

    fn record(scene: &mut Scene, id: NodeId, kind: EventKind, log: &Log) {
        let log = Rc::clone(log);
        let name = scene.name_of(id).to_owned();
        scene.on(id, kind, move |_, args| log.borrow_mut().push((name.clone(), args.kind)));
    }

    fn panel_with_children(count: usize) -> (Scene, NodeId, Vec<NodeId>) {
        let mut scene = Scene::new();
        let root = scene
            .create_container("root", Rect::new(0.0, 0.0, 100.0, 100.0))
            .expect("create");
        scene.add_root(root).expect("root");
        let children = (0..count)
            .map(|i| {
                let id = scene
                    .create_container(format!("child{i}"), Rect::new(10.0, 10.0, 50.0, 50.0))
                    .expect("create");
                scene.add_child(root, id).expect("attach");
                id
            })
            .collect();
        (scene, root, children)
    }

    #[test]
    fn test_key_goes_to_topmost_handler() {
        let (mut scene, root, children) = panel_with_children(2);
        let log = Log::default();
        record(&mut scene, root, EventKind::KeyDown, &log);
        record(&mut scene, children[0], EventKind::KeyDown, &log);

        assert!(scene.key_down(Key::Enter));
        assert_eq!(*log.borrow(), vec![("child0".to_owned(), EventKind::KeyDown)]);

        scene.set_enabled(children[0], false);
        assert!(scene.key_down(Key::Enter));
        assert_eq!(log.borrow().last().map(|(name, _)| name.as_str()), Some("root"));
    }

    #[test]
    fn test_clip_hides_children_outside() {
        let (mut scene, root, children) = panel_with_children(1);
        scene.visual_mut(children[0]).expect("visual").set_position(Vec2::new(80.0, 80.0));
        assert_eq!(scene.node_under_point(Vec2::new(120.0, 120.0)), Some(children[0]));

        scene.visual_mut(root).expect("visual").set_clip(true);
        assert_eq!(scene.node_under_point(Vec2::new(120.0, 120.0)), None);
        assert_eq!(scene.node_under_point(Vec2::new(90.0, 90.0)), Some(children[0]));
    }

    #[test]
    fn test_hit_test_modes() {
        let (mut scene, root, children) = panel_with_children(1);
        let point = Vec2::new(20.0, 20.0);
        scene.visual_mut(children[0]).expect("visual").set_hit_test(HitTest::Disabled);
        assert_eq!(scene.child_under_point(root, point), Some(root));

        scene.visual_mut(root).expect("visual").set_hit_test(HitTest::DisabledRecursive);
        assert_eq!(scene.child_under_point(root, point), None);
    }

    #[test]
    fn test_mouse_down_clears_focus() {
        let (mut scene, _, children) = panel_with_children(1);
        scene.set_focus(Some(children[0]));
        assert!(!scene.mouse_down(Vec2::new(20.0, 20.0), MouseButton::Left));
        assert_eq!(scene.focused(), None);
    }

    #[test]
    fn test_mouse_move_reaches_everyone() {
        let (mut scene, root, children) = panel_with_children(2);
        let log = Log::default();
        for &id in [root].iter().chain(&children) {
            record(&mut scene, id, EventKind::MouseMove, &log);
        }
        scene.mouse_move(Vec2::new(500.0, 500.0));
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_local_point_passed_to_handler() {
        let (mut scene, _, children) = panel_with_children(1);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        scene.on(children[0], EventKind::MouseDown, move |_, args| {
            *sink.borrow_mut() = args.local;
        });
        assert!(scene.mouse_down(Vec2::new(15.0, 30.0), MouseButton::Left));
        assert_eq!(*seen.borrow(), Some(Vec2::new(5.0, 20.0)));
    }
}
