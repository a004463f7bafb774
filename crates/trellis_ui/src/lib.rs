//! # Trellis UI
//!
//! Retained-mode scene graph for game and tool interfaces:
//! - Node tree in a generational arena, addressed by [`NodeId`]
//! - Anchored layout that cascades size changes to children
//! - Property animators stepped by caller-supplied frame time
//! - Topmost-first input dispatch with mouse-up cancellation
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    SCENE PIPELINE                      │
//! ├────────────────────────────────────────────────────────┤
//! │  Input Events → Dispatch → Handlers / Behaviours       │
//! │  update(dt)   → Animators → Property writes → Cascade  │
//! │  draw()       → DrawList  → QuadVertex batches         │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use trellis_core::{Rect, Vec2};
//! use trellis_ui::{Scene, SceneConfig};
//!
//! let mut scene = Scene::with_config(SceneConfig::deterministic(7));
//! let panel = scene.create_container("panel", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
//! scene.add_root(panel).unwrap();
//!
//! scene.move_to(panel, Vec2::new(50.0, 0.0), 2.0).unwrap();
//! scene.update(0.5);
//! assert_eq!(scene.visual(panel).unwrap().position(), Vec2::new(50.0, 0.0));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod blueprint;
pub mod config;
pub mod container;
pub mod error;
pub mod event;
pub mod factory;
pub mod input;
pub mod layout;
pub mod node;
pub mod render;
pub mod scene;
pub mod style;
pub mod widget;

pub use animation::{AnimatedProperty, AnimationFunction, Animator, AnimatorState};
pub use blueprint::{handoff, NodeBlueprint, PropertyValue, SubtreeInbox, SubtreeSender};
pub use config::{AnimatorDefaults, SceneConfig};
pub use container::{BasicContainer, Container, Image, ImageHandle};
pub use error::{SceneError, SceneResult};
pub use event::{EventArgs, EventKind};
pub use factory::{NodeFactory, SharedFactory};
pub use input::{GamepadButton, InputEvent, Key, MouseButton};
pub use layout::{Anchors, Axis};
pub use node::{HitTest, Node, NodeId, NodeKind, VisualNode};
pub use render::{DrawCommand, DrawList, QuadVertex};
pub use scene::{AnimationSpec, Scene};
pub use style::Color;
pub use widget::{ColoredQuad, ImageBox, PropertyStatus, WidgetBehavior};
