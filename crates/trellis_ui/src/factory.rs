//! Node factory.
//!
//! Maps type names to constructors of default nodes. The registry is owned
//! by the caller and injected into scenes as a [`SharedFactory`], so loader
//! threads can validate blueprints against the same registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use trellis_core::Rect;

use crate::animation::{AnimatedProperty, Animator};
use crate::container::Image;
use crate::error::{SceneError, SceneResult};
use crate::node::{NodeKind, VisualNode};
use crate::widget::{ColoredQuad, ImageBox};

/// Builds a default node kind.
pub type NodeConstructor = fn() -> NodeKind;

/// Factory shared between the update thread and loader threads.
pub type SharedFactory = Arc<RwLock<NodeFactory>>;

/// Type name registry.
#[derive(Debug, Clone, Default)]
pub struct NodeFactory {
    constructors: HashMap<String, NodeConstructor>,
}

macro_rules! animator_constructor {
    ($property:expr) => {{
        fn construct() -> NodeKind {
            NodeKind::Animator(Animator::new($property))
        }
        construct as NodeConstructor
    }};
}

impl NodeFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with every built-in type registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("Container", || NodeKind::Container(VisualNode::new(Rect::ZERO)));
        factory.register("ColoredQuad", || {
            NodeKind::Widget(VisualNode::new(Rect::ZERO), Box::new(ColoredQuad))
        });
        factory.register("ImageBox", || {
            NodeKind::Widget(VisualNode::new(Rect::ZERO), Box::<ImageBox>::default())
        });

        factory.register("MoverX", animator_constructor!(AnimatedProperty::X));
        factory.register("MoverY", animator_constructor!(AnimatedProperty::Y));
        factory.register("ResizerX", animator_constructor!(AnimatedProperty::Width));
        factory.register("ResizerY", animator_constructor!(AnimatedProperty::Height));
        factory.register("ScalerX", animator_constructor!(AnimatedProperty::ScaleX));
        factory.register("ScalerY", animator_constructor!(AnimatedProperty::ScaleY));
        factory.register("PivotMoverX", animator_constructor!(AnimatedProperty::PivotX));
        factory.register("PivotMoverY", animator_constructor!(AnimatedProperty::PivotY));
        factory.register("Rotator", animator_constructor!(AnimatedProperty::Angle));
        factory.register("RedChanger", animator_constructor!(AnimatedProperty::Red));
        factory.register("GreenChanger", animator_constructor!(AnimatedProperty::Green));
        factory.register("BlueChanger", animator_constructor!(AnimatedProperty::Blue));
        factory.register("AlphaChanger", animator_constructor!(AnimatedProperty::Alpha));
        factory.register("ZOrderChanger", animator_constructor!(AnimatedProperty::ZOrder));
        // Generic animator; its property is set by name
        factory.register(
            "Animator",
            animator_constructor!(AnimatedProperty::Named(String::new())),
        );
        factory
    }

    /// Wraps the factory for sharing.
    #[must_use]
    pub fn into_shared(self) -> SharedFactory {
        Arc::new(RwLock::new(self))
    }

    /// Registers a constructor. Returns the one it replaced.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        constructor: NodeConstructor,
    ) -> Option<NodeConstructor> {
        self.constructors.insert(type_name.into(), constructor)
    }

    /// Removes a constructor.
    pub fn unregister(&mut self, type_name: &str) -> Option<NodeConstructor> {
        self.constructors.remove(type_name)
    }

    /// Returns true if `type_name` is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a default node kind.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if nothing is registered under `type_name`.
    pub fn create_kind(&self, type_name: &str) -> SceneResult<NodeKind> {
        self.constructors
            .get(type_name)
            .map(|construct| construct())
            .ok_or_else(|| SceneError::UnknownType(type_name.to_owned()))
    }

    /// Creates an image resource. The container binds its texture.
    #[must_use]
    pub fn create_image(&self, name: impl Into<String>, source: Rect) -> Image {
        Image::new(name, source)
    }
}
