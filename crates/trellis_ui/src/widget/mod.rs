//! Widget behaviours.

mod core;
mod image;

pub use self::core::{PropertyStatus, WidgetBehavior};
pub use self::image::{ColoredQuad, ImageBox};
