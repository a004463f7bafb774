//! Event handlers attached to nodes.

use trellis_core::Vec2;

use crate::input::{GamepadButton, Key, MouseButton};
use crate::node::NodeId;
use crate::scene::Scene;

/// Kinds of events a handler can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer pressed over the node.
    MouseDown,
    /// Pointer released over the node.
    MouseUp,
    /// A release was handled elsewhere. Sent to every node off the winning path.
    MouseCancel,
    /// Pointer moved. Broadcast to every visible, enabled node.
    MouseMove,
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
    /// Character typed.
    Char,
    /// Touch points changed.
    Touch,
    /// Gamepad button pressed.
    ButtonDown,
    /// Gamepad button released.
    ButtonUp,
    /// An animator's delay ran out.
    DelayEnd,
    /// An animator used up its periods.
    AnimationEnd,
}

/// Data passed to a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArgs {
    /// Node the handler is registered on.
    pub node: NodeId,
    /// Event kind.
    pub kind: EventKind,
    /// Pointer position in the node's local space, for pointer events.
    pub local: Option<Vec2>,
    /// Mouse button, for mouse down/up.
    pub button: Option<MouseButton>,
    /// Key, for key events.
    pub key: Option<Key>,
    /// Character, for char events.
    pub character: Option<char>,
    /// Gamepad button, for button events.
    pub gamepad: Option<GamepadButton>,
    /// Touch points, scene-space.
    pub touches: Vec<Vec2>,
}

impl EventArgs {
    /// Arguments with only node and kind set.
    #[must_use]
    pub const fn new(node: NodeId, kind: EventKind) -> Self {
        Self {
            node,
            kind,
            local: None,
            button: None,
            key: None,
            character: None,
            gamepad: None,
            touches: Vec::new(),
        }
    }
}

/// A handler. Runs on the update thread with full access to the scene.
///
/// Structural changes made by a handler are safe: traversals iterate over
/// snapshots of child lists.
pub type EventHandler = Box<dyn FnMut(&mut Scene, &EventArgs)>;
