//! The container collaborator.
//!
//! A container owns pointer focus and image resources on behalf of the
//! scene. The scene calls into it and never looks resources up itself.

use std::collections::HashMap;

use trellis_core::Rect;

use crate::node::NodeId;

/// Opaque texture handle issued by the resource layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// A named region of a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Resource name.
    pub name: String,
    /// Region of the texture, in texels.
    pub source: Rect,
    /// Texture, once loaded.
    pub texture: Option<ImageHandle>,
}

impl Image {
    /// Creates an image without a texture.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Rect) -> Self {
        Self {
            name: name.into(),
            source,
            texture: None,
        }
    }

    /// Binds a texture.
    #[must_use]
    pub fn with_texture(mut self, texture: ImageHandle) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// What the scene needs from its owner.
pub trait Container {
    /// Drops pointer focus. Called on pointer-down hit testing.
    fn clear_focus(&mut self);

    /// Gives pointer focus to a node.
    fn set_focus(&mut self, node: Option<NodeId>);

    /// Currently focused node.
    fn focused(&self) -> Option<NodeId>;

    /// Resolves an image by name.
    fn resolve_image(&self, name: &str) -> Option<Image>;
}

/// In-memory container: a focus slot and an image table.
#[derive(Debug, Default)]
pub struct BasicContainer {
    focus: Option<NodeId>,
    images: HashMap<String, Image>,
}

impl BasicContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image under its name, replacing any previous one.
    pub fn register_image(&mut self, image: Image) -> Option<Image> {
        self.images.insert(image.name.clone(), image)
    }

    /// Number of registered images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl Container for BasicContainer {
    fn clear_focus(&mut self) {
        self.focus = None;
    }

    fn set_focus(&mut self, node: Option<NodeId>) {
        self.focus = node;
    }

    fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    fn resolve_image(&self, name: &str) -> Option<Image> {
        self.images.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Handle;

    #[test]
    fn test_focus_and_images() {
        let mut container = BasicContainer::new();
        let node = NodeId(Handle::new(3, 1));

        container.set_focus(Some(node));
        assert_eq!(container.focused(), Some(node));
        container.clear_focus();
        assert_eq!(container.focused(), None);

        container.register_image(Image::new("icon", Rect::new(0.0, 0.0, 16.0, 16.0)).with_texture(ImageHandle(9)));
        let image = container.resolve_image("icon").expect("registered");
        assert_eq!(image.texture, Some(ImageHandle(9)));
        assert!(container.resolve_image("missing").is_none());
    }
}
