//! Built-in drawable widgets.

use tracing::warn;
use trellis_core::Rect;

use crate::container::{Container, Image};
use crate::node::VisualNode;
use crate::render::{DrawFrame, DrawList};

use super::core::{PropertyStatus, WidgetBehavior};

/// A solid quad in the node's color.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColoredQuad;

impl WidgetBehavior for ColoredQuad {
    fn type_name(&self) -> &'static str {
        "ColoredQuad"
    }

    fn draw(&self, visual: &VisualNode, frame: &DrawFrame, out: &mut DrawList) {
        out.push_quad(
            frame.corners(visual.local_rect()),
            visual.color().with_alpha(frame.alpha),
            None,
            Rect::ZERO,
        );
    }
}

/// An image stretched over the node, tinted by the node's color.
#[derive(Debug, Clone, Default)]
pub struct ImageBox {
    image_name: String,
    image: Option<Image>,
}

impl ImageBox {
    /// Creates an image box showing `image`.
    #[must_use]
    pub fn new(image: Image) -> Self {
        Self {
            image_name: image.name.clone(),
            image: Some(image),
        }
    }

    /// Resolved image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }
}

impl WidgetBehavior for ImageBox {
    fn type_name(&self) -> &'static str {
        "ImageBox"
    }

    fn draw(&self, visual: &VisualNode, frame: &DrawFrame, out: &mut DrawList) {
        let Some(image) = &self.image else {
            return;
        };
        out.push_quad(
            frame.corners(visual.local_rect()),
            visual.color().with_alpha(frame.alpha),
            image.texture,
            image.source,
        );
    }

    fn property(&self, name: &str) -> Option<String> {
        match name {
            "image" => Some(self.image_name.clone()),
            _ => None,
        }
    }

    fn set_property(
        &mut self,
        visual: &mut VisualNode,
        name: &str,
        value: &str,
        container: &dyn Container,
    ) -> PropertyStatus {
        if name != "image" {
            return PropertyStatus::Unknown;
        }
        self.image_name = value.to_owned();
        self.image = container.resolve_image(value);
        match &self.image {
            Some(image) => {
                // An unsized box takes the image's size
                if visual.size() == trellis_core::Vec2::ZERO {
                    visual.rect.width = image.source.width;
                    visual.rect.height = image.source.height;
                    visual.pivot = visual.rect.size() * 0.5;
                }
                PropertyStatus::Applied
            }
            None => {
                warn!(image = value, "Image not found");
                PropertyStatus::InvalidValue
            }
        }
    }
}
