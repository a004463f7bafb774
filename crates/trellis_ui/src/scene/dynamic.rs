//! Programmatic animations.
//!
//! Dynamic animators are owned by a visual node but live outside its
//! animator list. An immediate animation replaces every dynamic animator
//! of the same property. A queued one waits out its delay behind them and
//! supersedes them once it starts.

use tracing::debug;
use trellis_core::Vec2;

use crate::animation::{AnimatedProperty, AnimationFunction, Animator};
use crate::error::{SceneError, SceneResult};
use crate::node::{Node, NodeId, NodeKind};
use crate::style::Color;

use super::Scene;

/// How to reach a target value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// Value reached at the end.
    pub target: f32,
    /// Periods per second. One period covers the whole transition.
    pub speed: f32,
    /// Seconds to wait before starting. Zero starts immediately.
    pub delay: f32,
    /// Waveform.
    pub function: AnimationFunction,
}

impl AnimationSpec {
    /// Linear transition to `target` at `speed` periods per second.
    #[must_use]
    pub const fn to(target: f32, speed: f32) -> Self {
        Self {
            target,
            speed,
            delay: 0.0,
            function: AnimationFunction::Linear,
        }
    }

    /// Linear transition to `target` lasting `seconds`.
    #[must_use]
    pub fn over(target: f32, seconds: f32) -> Self {
        let speed = if seconds > f32::EPSILON { 1.0 / seconds } else { f32::MAX };
        Self::to(target, speed)
    }

    /// Starts after `delay` seconds, from the value live at that moment.
    #[must_use]
    pub const fn queued(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Uses another waveform.
    #[must_use]
    pub const fn with_function(mut self, function: AnimationFunction) -> Self {
        self.function = function;
        self
    }

    /// Returns true if the animation waits before starting.
    #[must_use]
    pub fn is_queued(&self) -> bool {
        self.delay > 0.0
    }

    fn build(&self, property: AnimatedProperty) -> Animator {
        let mut animator = Animator::new(property)
            .function(self.function)
            .speed(self.speed)
            .periods(1.0)
            .toward(self.target);
        if self.is_queued() {
            animator.set_delay(self.delay);
        }
        animator
    }
}

impl Scene {
    /// Animates one property of a visual node.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for a stale id and `InvalidChild` if `id` is
    /// not a visual node.
    pub fn animate(&mut self, id: NodeId, property: AnimatedProperty, spec: AnimationSpec) -> SceneResult<NodeId> {
        let node = self.node(id).ok_or_else(|| self.not_found(id))?;
        if node.visual().is_none() {
            return Err(SceneError::InvalidChild {
                child: property.key().into_owned(),
                parent: node.name.clone(),
                reason: "only visual nodes can be animated",
            });
        }

        if !spec.is_queued() {
            self.stop(id, &property);
        }

        let name = self.generate_name("dynamic");
        let animator_id = self.insert(Node::new(name, NodeKind::Animator(spec.build(property.clone()))))?;
        if let Some(node) = self.node_mut(animator_id) {
            node.parent = Some(id);
        }
        if let Some(visual) = self.visual_mut(id) {
            visual.dynamic.push(property, animator_id);
        }
        self.attach_animator(animator_id);

        debug!(node = %id, animator = %animator_id, delay = spec.delay, "Dynamic animation started");
        Ok(animator_id)
    }

    fn animate_all(
        &mut self,
        id: NodeId,
        targets: &[(AnimatedProperty, f32)],
        speed: f32,
        delay: f32,
    ) -> SceneResult<Vec<NodeId>> {
        targets
            .iter()
            .map(|(property, target)| {
                self.animate(id, property.clone(), AnimationSpec::to(*target, speed).queued(delay))
            })
            .collect()
    }

    /// Moves a node to `position`.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn move_to(&mut self, id: NodeId, position: Vec2, speed: f32) -> SceneResult<Vec<NodeId>> {
        self.move_to_queued(id, position, speed, 0.0)
    }

    /// Moves a node to `position` after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn move_to_queued(&mut self, id: NodeId, position: Vec2, speed: f32, delay: f32) -> SceneResult<Vec<NodeId>> {
        self.animate_all(
            id,
            &[(AnimatedProperty::X, position.x), (AnimatedProperty::Y, position.y)],
            speed,
            delay,
        )
    }

    /// Moves a node horizontally.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn move_x(&mut self, id: NodeId, x: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::X, AnimationSpec::to(x, speed))
    }

    /// Moves a node horizontally after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn move_x_queued(&mut self, id: NodeId, x: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::X, AnimationSpec::to(x, speed).queued(delay))
    }

    /// Moves a node vertically.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn move_y(&mut self, id: NodeId, y: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Y, AnimationSpec::to(y, speed))
    }

    /// Moves a node vertically after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn move_y_queued(&mut self, id: NodeId, y: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Y, AnimationSpec::to(y, speed).queued(delay))
    }

    /// Scales a node to `scale`.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn scale_to(&mut self, id: NodeId, scale: Vec2, speed: f32) -> SceneResult<Vec<NodeId>> {
        self.scale_to_queued(id, scale, speed, 0.0)
    }

    /// Scales a node to `scale` after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn scale_to_queued(&mut self, id: NodeId, scale: Vec2, speed: f32, delay: f32) -> SceneResult<Vec<NodeId>> {
        self.animate_all(
            id,
            &[(AnimatedProperty::ScaleX, scale.x), (AnimatedProperty::ScaleY, scale.y)],
            speed,
            delay,
        )
    }

    /// Scales a node horizontally.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn scale_x(&mut self, id: NodeId, scale: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::ScaleX, AnimationSpec::to(scale, speed))
    }

    /// Scales a node horizontally after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn scale_x_queued(&mut self, id: NodeId, scale: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::ScaleX, AnimationSpec::to(scale, speed).queued(delay))
    }

    /// Scales a node vertically.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn scale_y(&mut self, id: NodeId, scale: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::ScaleY, AnimationSpec::to(scale, speed))
    }

    /// Scales a node vertically after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn scale_y_queued(&mut self, id: NodeId, scale: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::ScaleY, AnimationSpec::to(scale, speed).queued(delay))
    }

    /// Resizes a node to `size`. Every step cascades to the children.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn resize_to(&mut self, id: NodeId, size: Vec2, speed: f32) -> SceneResult<Vec<NodeId>> {
        self.resize_to_queued(id, size, speed, 0.0)
    }

    /// Resizes a node to `size` after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn resize_to_queued(&mut self, id: NodeId, size: Vec2, speed: f32, delay: f32) -> SceneResult<Vec<NodeId>> {
        self.animate_all(
            id,
            &[(AnimatedProperty::Width, size.x), (AnimatedProperty::Height, size.y)],
            speed,
            delay,
        )
    }

    /// Resizes a node horizontally.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn resize_x(&mut self, id: NodeId, width: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Width, AnimationSpec::to(width, speed))
    }

    /// Resizes a node horizontally after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn resize_x_queued(&mut self, id: NodeId, width: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Width, AnimationSpec::to(width, speed).queued(delay))
    }

    /// Resizes a node vertically.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn resize_y(&mut self, id: NodeId, height: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Height, AnimationSpec::to(height, speed))
    }

    /// Resizes a node vertically after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn resize_y_queued(&mut self, id: NodeId, height: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Height, AnimationSpec::to(height, speed).queued(delay))
    }

    /// Rotates a node to `degrees`.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn rotate_to(&mut self, id: NodeId, degrees: f32, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Angle, AnimationSpec::to(degrees, speed))
    }

    /// Rotates a node to `degrees` after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn rotate_to_queued(&mut self, id: NodeId, degrees: f32, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Angle, AnimationSpec::to(degrees, speed).queued(delay))
    }

    /// Fades the color channels to `color`. Alpha is left alone.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn fade_color_to(&mut self, id: NodeId, color: Color, speed: f32) -> SceneResult<Vec<NodeId>> {
        self.fade_color_to_queued(id, color, speed, 0.0)
    }

    /// Fades the color channels to `color` after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn fade_color_to_queued(&mut self, id: NodeId, color: Color, speed: f32, delay: f32) -> SceneResult<Vec<NodeId>> {
        self.animate_all(
            id,
            &[
                (AnimatedProperty::Red, f32::from(color.r)),
                (AnimatedProperty::Green, f32::from(color.g)),
                (AnimatedProperty::Blue, f32::from(color.b)),
            ],
            speed,
            delay,
        )
    }

    /// Fades the alpha to `alpha`.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn fade_alpha_to(&mut self, id: NodeId, alpha: u8, speed: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Alpha, AnimationSpec::to(f32::from(alpha), speed))
    }

    /// Fades the alpha to `alpha` after `delay` seconds.
    ///
    /// # Errors
    ///
    /// See [`Scene::animate`].
    pub fn fade_alpha_to_queued(&mut self, id: NodeId, alpha: u8, speed: f32, delay: f32) -> SceneResult<NodeId> {
        self.animate(id, AnimatedProperty::Alpha, AnimationSpec::to(f32::from(alpha), speed).queued(delay))
    }

    /// Stops every dynamic animation of `property`. Returns how many were removed.
    pub fn stop(&mut self, id: NodeId, property: &AnimatedProperty) -> usize {
        let Some(visual) = self.visual_mut(id) else {
            return 0;
        };
        let removed = visual.dynamic.take_property(property);
        for &animator in &removed {
            self.destroy(animator);
        }
        removed.len()
    }

    /// Stops every dynamic animation of a node.
    pub fn stop_all(&mut self, id: NodeId) -> usize {
        let Some(visual) = self.visual_mut(id) else {
            return 0;
        };
        let removed = visual.dynamic.take_all();
        for &animator in &removed {
            self.destroy(animator);
        }
        removed.len()
    }

    /// Returns true if the node has any dynamic animator, running or queued.
    #[must_use]
    pub fn has_dynamic_animation(&self, id: NodeId) -> bool {
        self.visual(id).is_some_and(|visual| !visual.dynamic.is_empty())
    }

    /// Returns true if any dynamic or static animator of the node is active.
    #[must_use]
    pub fn is_animated(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let dynamic = node.visual().map(|visual| visual.dynamic.ids()).unwrap_or_default();
        dynamic
            .iter()
            .chain(node.animators.iter())
            .any(|&animator| self.animator(animator).is_some_and(Animator::is_animated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Rect;

    fn scene_with_node() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let id = scene
            .create_container("n", Rect::new(0.0, 0.0, 10.0, 10.0))
            .expect("create");
        scene.add_root(id).expect("root");
        (scene, id)
    }

    #[test]
    fn test_animation_replaces_same_property() {
        let (mut scene, id) = scene_with_node();
        let first = scene.move_x(id, 100.0, 1.0).expect("animate");
        let second = scene.move_x(id, 50.0, 1.0).expect("animate");

        assert!(!scene.contains(first));
        let visual = scene.visual(id).expect("visual");
        assert_eq!(visual.dynamic_animators().get(&AnimatedProperty::X), Some(second));
        assert_eq!(visual.dynamic_animators().len(), 1);
        assert_eq!(scene.parent(second), Some(id));
    }

    #[test]
    fn test_move_to_reaches_target() {
        let (mut scene, id) = scene_with_node();
        scene.set_rect(id, Rect::new(10.0, 20.0, 10.0, 10.0));
        scene.move_to(id, Vec2::new(110.0, 0.0), 2.0).expect("animate");

        scene.update(0.25);
        let position = scene.visual(id).expect("visual").position();
        assert!(position.approx_eq(Vec2::new(60.0, 10.0), 1e-3), "{position:?}");

        scene.update(0.25);
        scene.update(0.25);
        let position = scene.visual(id).expect("visual").position();
        assert!(position.approx_eq(Vec2::new(110.0, 0.0), 1e-3), "{position:?}");
        assert!(!scene.has_dynamic_animation(id));
    }

    #[test]
    fn test_queued_animation_starts_from_live_value() {
        let (mut scene, id) = scene_with_node();
        scene.fade_alpha_to(id, 0, 1.0).expect("animate");
        scene.fade_alpha_to_queued(id, 200, 1.0, 0.5).expect("animate");
        assert_eq!(scene.visual(id).expect("visual").dynamic_animators().len(), 2);

        // Halfway through the fade out the queued fade in takes over
        scene.update(0.5);
        let alpha = scene.visual(id).expect("visual").alpha();
        assert_eq!(scene.visual(id).expect("visual").dynamic_animators().len(), 1);
        assert!((126..=128).contains(&alpha), "{alpha}");

        scene.update(1.0);
        assert_eq!(scene.visual(id).expect("visual").alpha(), 200);
    }

    #[test]
    fn test_stop_and_is_animated() {
        let (mut scene, id) = scene_with_node();
        scene.rotate_to(id, 90.0, 1.0).expect("animate");
        assert!(scene.is_animated(id));
        assert_eq!(scene.stop(id, &AnimatedProperty::Angle), 1);
        assert!(!scene.is_animated(id));
        assert_eq!(scene.stop_all(id), 0);
    }

    #[test]
    fn test_animators_cannot_be_animated() {
        let mut scene = Scene::new();
        let animator = scene.create("MoverX", "m").expect("create");
        assert!(scene.move_x(animator, 1.0, 1.0).is_err());
    }
}
