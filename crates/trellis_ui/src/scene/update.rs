//! Per-frame stepping.
//!
//! Order per node: widget behaviour, dynamic animators, static animators,
//! children. Every list is snapshotted before it is walked, so handlers and
//! animators may restructure the tree mid-pass.

use tracing::warn;

use crate::animation::{Animator, AnimatorState, Tick};
use crate::event::EventKind;
use crate::node::{NodeId, NodeKind};

use super::Scene;

impl Scene {
    /// Advances the scene by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let roots = self.roots.clone();
        for root in roots {
            self.update_node(root, dt);
        }
    }

    fn update_node(&mut self, id: NodeId, dt: f32) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if !node.awake {
            return;
        }
        if let NodeKind::Widget(visual, behavior) = &mut node.kind {
            behavior.update(visual, dt);
        }

        self.purge_expired(id);
        let dynamic = self
            .visual(id)
            .map(|visual| visual.dynamic.ids())
            .unwrap_or_default();
        for animator in dynamic {
            if !self.contains(animator) {
                continue;
            }
            let tick = self.update_animator(id, animator, dt);
            if tick.is_some_and(|tick| tick.delay_ended) {
                self.supersede(id, animator);
            }
        }

        let (animators, children) = match self.node(id) {
            Some(node) => (node.animators.clone(), node.children.clone()),
            None => return,
        };
        for animator in animators {
            self.update_animator(id, animator, dt);
        }
        for child in children {
            self.update_node(child, dt);
        }
    }

    /// Removes dynamic animators that expired on an earlier pass.
    fn purge_expired(&mut self, id: NodeId) {
        let Some(visual) = self.visual(id) else {
            return;
        };
        let expired: Vec<NodeId> = visual
            .dynamic
            .ids()
            .into_iter()
            .filter(|&animator| self.animator(animator).map_or(true, Animator::is_expired))
            .collect();
        for animator in expired {
            if let Some(visual) = self.visual_mut(id) {
                visual.dynamic.remove(animator);
            }
            self.destroy(animator);
        }
    }

    /// Drops the other running animators of the property `started` animates.
    fn supersede(&mut self, owner: NodeId, started: NodeId) {
        let Some(visual) = self.visual(owner) else {
            return;
        };
        let Some(property) = visual.dynamic.property_of(started) else {
            return;
        };
        let running: Vec<NodeId> = visual
            .dynamic
            .all_for(property)
            .into_iter()
            .filter(|&other| {
                other != started
                    && self
                        .animator(other)
                        .is_some_and(|a| a.state() != AnimatorState::Delayed)
            })
            .collect();
        for other in running {
            self.destroy(other);
        }
    }

    /// Ticks one animator and writes its value to `owner`.
    ///
    /// Returns None if the animator did not run: it is asleep, disabled,
    /// or its property cannot be resolved on the owner. The owner's value is
    /// not read while the animator is still delayed.
    fn update_animator(&mut self, owner: NodeId, id: NodeId, dt: f32) -> Option<Tick> {
        let node = self.node(id)?;
        if !node.awake || !node.enabled {
            return None;
        }
        let animator = node.animator()?;
        let property = animator.property().clone();

        let mut pending = None;
        if animator.state() == AnimatorState::Delayed {
            let tick = self.animator_mut(id)?.advance(dt);
            if !tick.delay_ended {
                return Some(tick);
            }
            pending = Some(tick);
        }

        let Some(live) = self.animated_value(owner, &property) else {
            let warn_unresolved = self.config.warn_unresolved;
            let owner_name = self.name_of(owner).to_owned();
            let animator = self.animator_mut(id)?;
            if warn_unresolved && !animator.warned {
                animator.warned = true;
                warn!(
                    animator = %id,
                    owner = %owner_name,
                    property = %property.key(),
                    "Animated property not found on owner"
                );
            }
            return None;
        };

        let Some(NodeKind::Animator(animator)) = self.nodes.get_mut(id.0).map(|node| &mut node.kind) else {
            return None;
        };
        let tick = pending.unwrap_or_else(|| animator.advance(dt));
        if tick.delay_ended && animator.inherit_value {
            animator.inherit(live);
        }
        let value = (tick.completed || animator.state() == AnimatorState::Active)
            .then(|| animator.evaluate(&mut self.rng));

        if let Some(value) = value {
            self.set_animated_value(owner, &property, value);
        }
        if tick.delay_ended {
            self.fire_lifecycle(id, EventKind::DelayEnd);
        }
        if tick.completed {
            self.fire_lifecycle(id, EventKind::AnimationEnd);
        }
        Some(tick)
    }

    /// Takes the starting value from the owner for animators that inherit it.
    pub(crate) fn attach_animator(&mut self, id: NodeId) {
        let Some(owner) = self.parent(id) else {
            return;
        };
        let Some(animator) = self.animator(id) else {
            return;
        };
        if !(animator.use_target || animator.inherit_value) {
            return;
        }
        let property = animator.property().clone();
        if let Some(live) = self.animated_value(owner, &property) {
            if let Some(animator) = self.animator_mut(id) {
                animator.inherit(live);
            }
        }
    }
}
