//! Widget behaviour trait.

use std::fmt;

use trellis_core::Vec2;

use crate::container::Container;
use crate::input::{GamepadButton, Key, MouseButton};
use crate::node::VisualNode;
use crate::render::{DrawFrame, DrawList};

/// Outcome of setting a property by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyStatus {
    /// The value was applied.
    Applied,
    /// The name is known but the value did not parse.
    InvalidValue,
    /// The name is not known here.
    Unknown,
}

impl PropertyStatus {
    /// From a parse result: applied if `Some`.
    #[must_use]
    pub fn applied_if<T>(value: Option<T>, apply: impl FnOnce(T)) -> Self {
        match value {
            Some(v) => {
                apply(v);
                Self::Applied
            }
            None => Self::InvalidValue,
        }
    }
}

/// Behaviour of a widget node.
///
/// Every hook receives the node's geometry. Event hooks return true to
/// claim the event. A node also handles an event when a handler is
/// registered for it, so the defaults claim nothing.
pub trait WidgetBehavior: fmt::Debug {
    /// Factory type name.
    fn type_name(&self) -> &'static str;

    /// Pointer pressed inside the node.
    fn on_mouse_down(&mut self, _visual: &mut VisualNode, _local: Vec2, _button: MouseButton) -> bool {
        false
    }

    /// Pointer released inside the node.
    fn on_mouse_up(&mut self, _visual: &mut VisualNode, _local: Vec2, _button: MouseButton) -> bool {
        false
    }

    /// The release was handled by another node.
    fn on_mouse_cancel(&mut self, _visual: &mut VisualNode) {}

    /// Pointer moved, anywhere.
    fn on_mouse_move(&mut self, _visual: &mut VisualNode, _local: Vec2) {}

    /// Key pressed.
    fn on_key_down(&mut self, _visual: &mut VisualNode, _key: Key) -> bool {
        false
    }

    /// Key released.
    fn on_key_up(&mut self, _visual: &mut VisualNode, _key: Key) -> bool {
        false
    }

    /// Character typed.
    fn on_char(&mut self, _visual: &mut VisualNode, _character: char) -> bool {
        false
    }

    /// Touch points changed. Points are scene-space.
    fn on_touch(&mut self, _visual: &mut VisualNode, _touches: &[Vec2]) -> bool {
        false
    }

    /// Gamepad button pressed.
    fn on_button_down(&mut self, _visual: &mut VisualNode, _button: GamepadButton) -> bool {
        false
    }

    /// Gamepad button released.
    fn on_button_up(&mut self, _visual: &mut VisualNode, _button: GamepadButton) -> bool {
        false
    }

    /// Per-frame self update. Runs before the node's animators.
    fn update(&mut self, _visual: &mut VisualNode, _dt: f32) {}

    /// Emits draw commands. The frame maps local space to scene space.
    fn draw(&self, visual: &VisualNode, frame: &DrawFrame, out: &mut DrawList);

    /// Reads a widget-specific property.
    fn property(&self, _name: &str) -> Option<String> {
        None
    }

    /// Writes a widget-specific property.
    fn set_property(
        &mut self,
        _visual: &mut VisualNode,
        _name: &str,
        _value: &str,
        _container: &dyn Container,
    ) -> PropertyStatus {
        PropertyStatus::Unknown
    }

    /// Reads a numeric property for animators.
    fn numeric_property(&self, _name: &str) -> Option<f32> {
        None
    }

    /// Writes a numeric property for animators. Returns false if unknown.
    fn set_numeric_property(&mut self, _name: &str, _value: f32) -> bool {
        false
    }
}
