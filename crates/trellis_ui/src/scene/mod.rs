//! The scene: node arena, roots and the per-frame entry points.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          SCENE                           │
//! ├──────────────────────────────────────────────────────────┤
//! │  input ──► dispatch ──► handlers / behaviours            │
//! │  update(dt) ──► behaviours ──► animators ──► children    │
//! │  draw ──► DrawList (scene-space quads + clips)           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! One thread owns a scene. Loader threads hand over blueprints through
//! [`blueprint::handoff`](crate::blueprint::handoff) instead of touching it.

mod dispatch;
mod draw;
mod dynamic;
mod property;
mod resize;
mod transform;
mod tree;
mod update;

use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use trellis_core::{Rect, SlotArena};

use crate::animation::Animator;
use crate::config::SceneConfig;
use crate::container::{BasicContainer, Container};
use crate::error::{SceneError, SceneResult};
use crate::event::{EventArgs, EventHandler, EventKind};
use crate::factory::{NodeFactory, SharedFactory};
use crate::node::{Node, NodeId, NodeKind, VisualNode};
use crate::widget::WidgetBehavior;

pub use dynamic::AnimationSpec;
pub use tree::Descendants;

/// A retained-mode scene graph.
pub struct Scene {
    nodes: SlotArena<Node>,
    names: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    container: Box<dyn Container>,
    factory: SharedFactory,
    config: SceneConfig,
    rng: ChaCha8Rng,
    serial: u64,
}

impl Scene {
    /// Creates a scene with default config, a [`BasicContainer`] and the built-in factory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Creates a scene with the given config.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self::with_parts(
            config,
            Box::new(BasicContainer::new()),
            NodeFactory::with_builtins().into_shared(),
        )
    }

    /// Creates a scene from its collaborators.
    #[must_use]
    pub fn with_parts(config: SceneConfig, container: Box<dyn Container>, factory: SharedFactory) -> Self {
        let seed = config.noise_seed.unwrap_or_else(clock_seed);
        Self {
            nodes: SlotArena::with_capacity(256),
            names: HashMap::with_capacity(256),
            roots: Vec::new(),
            container,
            factory,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            serial: 0,
        }
    }

    /// Active config.
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The container collaborator.
    #[must_use]
    pub fn container(&self) -> &dyn Container {
        self.container.as_ref()
    }

    /// Mutable container collaborator.
    pub fn container_mut(&mut self) -> &mut dyn Container {
        self.container.as_mut()
    }

    /// The shared factory.
    #[must_use]
    pub const fn factory(&self) -> &SharedFactory {
        &self.factory
    }

    /// Number of live nodes, animators included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the scene holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// Looks a node up.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Looks a node up by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Name of a node, or `"<stale>"`.
    #[must_use]
    pub fn name_of(&self, id: NodeId) -> &str {
        self.node(id).map_or("<stale>", Node::name)
    }

    /// Geometry of a visual node.
    #[must_use]
    pub fn visual(&self, id: NodeId) -> Option<&VisualNode> {
        self.node(id).and_then(Node::visual)
    }

    /// Mutable geometry of a visual node.
    ///
    /// Size changes made here do not cascade. Use [`Scene::set_size`] for that.
    pub fn visual_mut(&mut self, id: NodeId) -> Option<&mut VisualNode> {
        self.node_mut(id).and_then(|node| node.kind.visual_mut())
    }

    /// Animator state of an animator node.
    #[must_use]
    pub fn animator(&self, id: NodeId) -> Option<&Animator> {
        self.node(id).and_then(Node::animator)
    }

    /// Mutable animator state of an animator node.
    pub fn animator_mut(&mut self, id: NodeId) -> Option<&mut Animator> {
        self.node_mut(id).and_then(|node| node.kind.animator_mut())
    }

    /// Top-level nodes, sorted by z-order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Inserts a detached node.
    ///
    /// An empty name is replaced by a generated one.
    ///
    /// # Errors
    ///
    /// Returns `ObjectExists` if the name is taken.
    pub fn insert(&mut self, mut node: Node) -> SceneResult<NodeId> {
        if node.name.is_empty() {
            node.name = self.generate_name("node");
        }
        if self.names.contains_key(&node.name) {
            return Err(SceneError::ObjectExists(node.name));
        }
        node.parent = None;
        let name = node.name.clone();
        let id = NodeId(self.nodes.insert(node));
        self.names.insert(name, id);
        debug!(node = %id, "Node created");
        Ok(id)
    }

    /// Creates a node through the factory. Animators get the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` or `ObjectExists`.
    pub fn create(&mut self, type_name: &str, name: impl Into<String>) -> SceneResult<NodeId> {
        let mut kind = self.factory.read().create_kind(type_name)?;
        if let NodeKind::Animator(animator) = &mut kind {
            let defaults = &self.config.animator;
            animator.periods = defaults.periods;
            animator.amplitude = defaults.amplitude;
            animator.speed = defaults.speed;
        }
        self.insert(Node::new(name, kind))
    }

    /// Creates a detached container node.
    ///
    /// # Errors
    ///
    /// Returns `ObjectExists` if the name is taken.
    pub fn create_container(&mut self, name: impl Into<String>, rect: Rect) -> SceneResult<NodeId> {
        self.insert(Node::new(name, NodeKind::Container(VisualNode::new(rect))))
    }

    /// Creates a detached widget node.
    ///
    /// # Errors
    ///
    /// Returns `ObjectExists` if the name is taken.
    pub fn create_widget(
        &mut self,
        name: impl Into<String>,
        rect: Rect,
        behavior: Box<dyn WidgetBehavior>,
    ) -> SceneResult<NodeId> {
        self.insert(Node::new(name, NodeKind::Widget(VisualNode::new(rect), behavior)))
    }

    /// Creates a detached animator node.
    ///
    /// # Errors
    ///
    /// Returns `ObjectExists` if the name is taken.
    pub fn create_animator(&mut self, name: impl Into<String>, animator: Animator) -> SceneResult<NodeId> {
        self.insert(Node::new(name, NodeKind::Animator(animator)))
    }

    /// Registers a handler for `kind` on a node. Returns false for a stale id.
    pub fn on(
        &mut self,
        id: NodeId,
        kind: EventKind,
        handler: impl FnMut(&mut Self, &EventArgs) + 'static,
    ) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.handlers.push((kind, Box::new(handler)));
        true
    }

    /// Removes every handler for `kind` on a node.
    pub fn clear_handlers(&mut self, id: NodeId, kind: EventKind) {
        if let Some(node) = self.node_mut(id) {
            node.handlers.retain(|(k, _)| *k != kind);
        }
    }

    /// Runs the handlers registered for `args.kind` on `args.node`.
    ///
    /// Handlers are taken out of the node while they run, so they may
    /// mutate the scene freely. Returns true if any handler ran.
    pub(crate) fn fire(&mut self, args: &EventArgs) -> bool {
        let Some(node) = self.node_mut(args.node) else {
            return false;
        };
        if !node.handles(args.kind) {
            return false;
        }
        let mut taken: Vec<(EventKind, EventHandler)> = std::mem::take(&mut node.handlers);
        for (kind, handler) in &mut taken {
            if *kind == args.kind {
                handler(self, args);
            }
        }
        // Handlers registered while running go after the existing ones
        if let Some(node) = self.node_mut(args.node) {
            let added = std::mem::take(&mut node.handlers);
            taken.extend(added);
            node.handlers = taken;
        }
        true
    }

    /// Gives pointer focus to a node.
    pub fn set_focus(&mut self, id: Option<NodeId>) {
        self.container.set_focus(id);
    }

    /// Currently focused node.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.container.focused()
    }

    fn generate_name(&mut self, prefix: &str) -> String {
        loop {
            self.serial += 1;
            let name = format!("{prefix}_{}", self.serial);
            if !self.names.contains_key(&name) {
                return name;
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}
