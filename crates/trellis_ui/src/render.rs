//! Draw list produced by the scene.
//!
//! The scene emits backend-neutral commands in scene space. A renderer
//! consumes them or flattens the quads to [`QuadVertex`] data.

use bytemuck::{Pod, Zeroable};
use trellis_core::{Affine2, Rect, Vec2};

use crate::container::ImageHandle;
use crate::style::Color;

/// A backend-neutral draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A transformed quad.
    Quad {
        /// Scene-space corners, clockwise from the local top-left.
        corners: [Vec2; 4],
        /// Tint, alpha already derived.
        color: Color,
        /// Texture, if any.
        image: Option<ImageHandle>,
        /// Texture region in texels.
        source: Rect,
    },
    /// Clip following commands to a scene-space rect.
    PushClip {
        /// Effective clip, intersected with the enclosing one.
        bounds: Rect,
    },
    /// Pop the last clip.
    PopClip,
}

/// Per-node state handed to a widget's draw hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawFrame {
    /// Local-to-scene transform.
    pub transform: Affine2,
    /// Derived alpha.
    pub alpha: u8,
}

impl DrawFrame {
    /// Maps a local rect to scene-space corners.
    #[must_use]
    pub fn corners(&self, rect: Rect) -> [Vec2; 4] {
        rect.corners().map(|corner| self.transform.apply(corner))
    }
}

/// Vertex of a flattened quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Scene-space position.
    pub position: [f32; 2],
    /// Texel coordinates.
    pub uv: [f32; 2],
    /// Normalised RGBA.
    pub color: [f32; 4],
    /// Texture id. `u32::MAX` means untextured.
    pub texture: u32,
}

impl QuadVertex {
    /// Texture id of untextured quads.
    pub const NO_TEXTURE: u32 = u32::MAX;
}

/// Commands collected during one draw pass.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    clip_stack: Vec<Rect>,
}

impl DrawList {
    /// Creates an empty draw list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
            clip_stack: Vec::with_capacity(8),
        }
    }

    /// Clears the list for a new frame.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.clip_stack.clear();
    }

    /// Adds a quad.
    pub fn push_quad(&mut self, corners: [Vec2; 4], color: Color, image: Option<ImageHandle>, source: Rect) {
        self.commands.push(DrawCommand::Quad {
            corners,
            color,
            image,
            source,
        });
    }

    /// Pushes a clip rect, intersected with the current one.
    pub fn push_clip(&mut self, bounds: Rect) {
        let effective = match self.clip_stack.last() {
            Some(current) => current.intersection(&bounds).unwrap_or(Rect::ZERO),
            None => bounds,
        };
        self.clip_stack.push(effective);
        self.commands.push(DrawCommand::PushClip { bounds: effective });
    }

    /// Pops the current clip rect.
    pub fn pop_clip(&mut self) {
        if self.clip_stack.pop().is_some() {
            self.commands.push(DrawCommand::PopClip);
        }
    }

    /// Current clip, if any.
    #[must_use]
    pub fn current_clip(&self) -> Option<Rect> {
        self.clip_stack.last().copied()
    }

    /// Recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of quads.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Quad { .. }))
            .count()
    }

    /// Flattens every quad to two triangles.
    #[must_use]
    pub fn vertices(&self) -> Vec<QuadVertex> {
        let mut out = Vec::with_capacity(self.quad_count() * 6);
        for command in &self.commands {
            let DrawCommand::Quad {
                corners,
                color,
                image,
                source,
            } = command
            else {
                continue;
            };
            let uv = source.corners();
            let texture = image.map_or(QuadVertex::NO_TEXTURE, |h| h.0);
            let color = color.to_array();
            for i in [0, 1, 2, 0, 2, 3] {
                out.push(QuadVertex {
                    position: corners[i].to_array(),
                    uv: uv[i].to_array(),
                    color,
                    texture,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_clips_intersect() {
        let mut list = DrawList::new();
        list.push_clip(Rect::new(0.0, 0.0, 100.0, 100.0));
        list.push_clip(Rect::new(50.0, 50.0, 100.0, 100.0));

        assert_eq!(list.current_clip(), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        list.pop_clip();
        list.pop_clip();
        list.pop_clip();
        assert_eq!(list.current_clip(), None);
        // Unbalanced pops are ignored
        assert_eq!(list.commands().len(), 4);
    }

    #[test]
    fn test_vertices_flatten_quads() {
        let mut list = DrawList::new();
        let corners = Rect::new(0.0, 0.0, 10.0, 10.0).corners();
        list.push_quad(corners, Color::WHITE, None, Rect::ZERO);
        list.push_clip(Rect::new(0.0, 0.0, 5.0, 5.0));

        let vertices = list.vertices();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[2].position, [10.0, 10.0]);
        assert_eq!(vertices[0].texture, QuadVertex::NO_TEXTURE);

        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 6 * std::mem::size_of::<QuadVertex>());
    }
}
