//! Input events delivered to the scene.
//!
//! Pointer coordinates are scene-space. The dispatcher converts them into
//! each node's local space on the way down.

#![allow(missing_docs)]

use trellis_core::Vec2;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left mouse button.
    #[default]
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    /// Any other key, by platform key code.
    Code(u32),
}

/// Gamepad button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    Start,
    Back,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftShoulder,
    RightShoulder,
}

/// A queued input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown { point: Vec2, button: MouseButton },
    MouseUp { point: Vec2, button: MouseButton },
    MouseMove { point: Vec2 },
    KeyDown(Key),
    KeyUp(Key),
    Char(char),
    /// Touch points, scene-space.
    Touch(Vec<Vec2>),
    ButtonDown(GamepadButton),
    ButtonUp(GamepadButton),
}
