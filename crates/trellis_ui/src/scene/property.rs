//! Property access: typed animated values and the string protocol.
//!
//! The string protocol lets declarative layers apply a flat key/value bag
//! without knowing node types. Unknown names and unparseable values are
//! logged and reported, never fatal.

use tracing::warn;
use trellis_core::Vec2;

use crate::animation::{AnimatedProperty, AnimationFunction, Animator};
use crate::layout::{Anchors, Axis};
use crate::node::{HitTest, NodeId, NodeKind, VisualNode};
use crate::style::Color;
use crate::widget::PropertyStatus;

use super::Scene;

impl Scene {
    /// Live value of an animatable property.
    ///
    /// None if `id` is not visual or a named property is not exposed by its widget.
    #[must_use]
    pub fn animated_value(&self, id: NodeId, property: &AnimatedProperty) -> Option<f32> {
        let node = self.node(id)?;
        let visual = node.visual()?;
        let value = match property {
            AnimatedProperty::X => visual.rect.x,
            AnimatedProperty::Y => visual.rect.y,
            AnimatedProperty::Width => visual.rect.width,
            AnimatedProperty::Height => visual.rect.height,
            AnimatedProperty::ScaleX => visual.scale.x,
            AnimatedProperty::ScaleY => visual.scale.y,
            AnimatedProperty::PivotX => visual.pivot.x,
            AnimatedProperty::PivotY => visual.pivot.y,
            AnimatedProperty::Angle => visual.angle,
            AnimatedProperty::Red => f32::from(visual.color.r),
            AnimatedProperty::Green => f32::from(visual.color.g),
            AnimatedProperty::Blue => f32::from(visual.color.b),
            AnimatedProperty::Alpha => f32::from(visual.color.a),
            AnimatedProperty::ZOrder => node.z_order as f32,
            AnimatedProperty::Named(name) => return node.kind.behavior()?.numeric_property(name),
        };
        Some(value)
    }

    /// Writes an animatable property.
    ///
    /// Width and height go through the anchor cascade. Channels clamp to
    /// `0..=255`. Returns false if the property cannot be resolved on `id`.
    pub fn set_animated_value(&mut self, id: NodeId, property: &AnimatedProperty, value: f32) -> bool {
        match property {
            AnimatedProperty::Width => return self.resize_axis(id, Axis::Horizontal, value, false),
            AnimatedProperty::Height => return self.resize_axis(id, Axis::Vertical, value, false),
            AnimatedProperty::ZOrder => {
                if self.visual(id).is_none() {
                    return false;
                }
                return self.set_z_order(id, value.round() as i32);
            }
            AnimatedProperty::Named(name) => {
                return match self.node_mut(id).map(|node| &mut node.kind) {
                    Some(NodeKind::Widget(_, behavior)) => behavior.set_numeric_property(name, value),
                    _ => false,
                };
            }
            _ => {}
        }

        let Some(visual) = self.visual_mut(id) else {
            return false;
        };
        if property.is_byte() {
            let byte = value.clamp(0.0, 255.0) as u8;
            let channel = match property {
                AnimatedProperty::Red => &mut visual.color.r,
                AnimatedProperty::Green => &mut visual.color.g,
                AnimatedProperty::Blue => &mut visual.color.b,
                _ => &mut visual.color.a,
            };
            if *channel != byte {
                *channel = byte;
            }
            return true;
        }

        let slot = match property {
            AnimatedProperty::X => &mut visual.rect.x,
            AnimatedProperty::Y => &mut visual.rect.y,
            AnimatedProperty::ScaleX => &mut visual.scale.x,
            AnimatedProperty::ScaleY => &mut visual.scale.y,
            AnimatedProperty::Angle => &mut visual.angle,
            AnimatedProperty::PivotX => {
                visual.pivot_explicit[0] = true;
                &mut visual.pivot.x
            }
            AnimatedProperty::PivotY => {
                visual.pivot_explicit[1] = true;
                &mut visual.pivot.y
            }
            _ => return false,
        };
        if (*slot - value).abs() > f32::EPSILON {
            *slot = value;
        }
        true
    }

    /// Reads a property by name.
    #[must_use]
    pub fn get_property(&self, id: NodeId, name: &str) -> Option<String> {
        let node = self.node(id)?;
        let value = match name {
            "name" => Some(node.name.clone()),
            "enabled" => Some(node.enabled.to_string()),
            "awake" => Some(node.awake.to_string()),
            "zorder" => Some(node.z_order.to_string()),
            _ => match &node.kind {
                NodeKind::Animator(animator) => read_animator(animator, name),
                NodeKind::Container(visual) => read_visual(visual, name),
                NodeKind::Widget(visual, behavior) => {
                    read_visual(visual, name).or_else(|| behavior.property(name))
                }
            },
        };
        if value.is_none() {
            warn!(node = %id, property = name, "Unknown property");
        }
        value
    }

    /// Writes a property by name. Returns false, with a warning, if the
    /// name is unknown or the value does not parse.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        if !self.contains(id) {
            warn!(node = %id, property = name, "Property set on a stale node");
            return false;
        }
        match self.write_property(id, name, value) {
            PropertyStatus::Applied => true,
            PropertyStatus::InvalidValue => {
                warn!(node = %id, property = name, value, "Invalid property value");
                false
            }
            PropertyStatus::Unknown => {
                warn!(node = %id, property = name, "Unknown property");
                false
            }
        }
    }

    /// Applies a property bag. Returns how many entries were applied.
    pub fn apply_properties<'a, I>(&mut self, id: NodeId, properties: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        properties
            .into_iter()
            .filter(|&(name, value)| self.set_property(id, name, value))
            .count()
    }

    fn write_property(&mut self, id: NodeId, name: &str, value: &str) -> PropertyStatus {
        let is_visual = self.visual(id).is_some();
        match name {
            "name" => return PropertyStatus::InvalidValue,
            "enabled" => {
                return PropertyStatus::applied_if(parse_bool(value), |v| {
                    self.set_enabled(id, v);
                })
            }
            "awake" => {
                return PropertyStatus::applied_if(parse_bool(value), |v| {
                    self.set_awake(id, v);
                })
            }
            "zorder" => {
                return PropertyStatus::applied_if(value.trim().parse().ok(), |z| {
                    self.set_z_order(id, z);
                })
            }
            "w" | "width" if is_visual => {
                return PropertyStatus::applied_if(parse_f32(value), |w| {
                    self.set_width(id, w);
                })
            }
            "h" | "height" if is_visual => {
                return PropertyStatus::applied_if(parse_f32(value), |h| {
                    self.set_height(id, h);
                })
            }
            _ => {}
        }

        let container = self.container.as_ref();
        let Some(node) = self.nodes.get_mut(id.0) else {
            return PropertyStatus::Unknown;
        };
        match &mut node.kind {
            NodeKind::Animator(animator) => write_animator(animator, name, value),
            NodeKind::Container(visual) => write_visual(visual, name, value),
            NodeKind::Widget(visual, behavior) => match write_visual(visual, name, value) {
                PropertyStatus::Unknown => behavior.set_property(visual, name, value, container),
                status => status,
            },
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_f32(text: &str) -> Option<f32> {
    text.trim().parse().ok().filter(|v: &f32| v.is_finite())
}

fn parse_u8(text: &str) -> Option<u8> {
    text.trim().parse().ok()
}

fn parse_max(text: &str) -> Option<Option<f32>> {
    if text.trim() == "none" {
        Some(None)
    } else {
        parse_f32(text).map(Some)
    }
}

fn format_max(max: Option<f32>) -> String {
    max.map_or_else(|| "none".to_owned(), |v| v.to_string())
}

fn read_visual(visual: &VisualNode, name: &str) -> Option<String> {
    let anchors = visual.anchors;
    let value = match name {
        "x" => visual.rect.x.to_string(),
        "y" => visual.rect.y.to_string(),
        "w" | "width" => visual.rect.width.to_string(),
        "h" | "height" => visual.rect.height.to_string(),
        "pivot_x" => visual.pivot.x.to_string(),
        "pivot_y" => visual.pivot.y.to_string(),
        "scale_x" => visual.scale.x.to_string(),
        "scale_y" => visual.scale.y.to_string(),
        "scale" => visual.scale.x.to_string(),
        "angle" => visual.angle.to_string(),
        "color" => visual.color.to_hex(),
        "red" => visual.color.r.to_string(),
        "green" => visual.color.g.to_string(),
        "blue" => visual.color.b.to_string(),
        "alpha" => visual.color.a.to_string(),
        "visible" => visual.visible.to_string(),
        "inherit_alpha" => visual.inherit_alpha.to_string(),
        "anchor_left" => anchors.left.to_string(),
        "anchor_right" => anchors.right.to_string(),
        "anchor_top" => anchors.top.to_string(),
        "anchor_bottom" => anchors.bottom.to_string(),
        "anchors" => anchors.to_string(),
        "retain_anchor_aspect" => visual.retain_anchor_aspect.to_string(),
        "max_width" => format_max(visual.max_width),
        "max_height" => format_max(visual.max_height),
        "hit_test" => visual.hit_test.as_str().to_owned(),
        "clip" => visual.clip.to_string(),
        _ => return None,
    };
    Some(value)
}

fn write_visual(visual: &mut VisualNode, name: &str, value: &str) -> PropertyStatus {
    match name {
        "x" => PropertyStatus::applied_if(parse_f32(value), |v| visual.rect.x = v),
        "y" => PropertyStatus::applied_if(parse_f32(value), |v| visual.rect.y = v),
        "pivot_x" => PropertyStatus::applied_if(parse_f32(value), |v| visual.set_pivot_on(Axis::Horizontal, v)),
        "pivot_y" => PropertyStatus::applied_if(parse_f32(value), |v| visual.set_pivot_on(Axis::Vertical, v)),
        "scale_x" => PropertyStatus::applied_if(parse_f32(value), |v| visual.scale.x = v),
        "scale_y" => PropertyStatus::applied_if(parse_f32(value), |v| visual.scale.y = v),
        "scale" => PropertyStatus::applied_if(parse_f32(value), |v| visual.scale = Vec2::splat(v)),
        "angle" => PropertyStatus::applied_if(parse_f32(value), |v| visual.angle = v),
        "color" => PropertyStatus::applied_if(Color::parse_hex(value), |c| visual.color = c),
        "red" => PropertyStatus::applied_if(parse_u8(value), |v| visual.color.r = v),
        "green" => PropertyStatus::applied_if(parse_u8(value), |v| visual.color.g = v),
        "blue" => PropertyStatus::applied_if(parse_u8(value), |v| visual.color.b = v),
        "alpha" => PropertyStatus::applied_if(parse_u8(value), |v| visual.color.a = v),
        "visible" => PropertyStatus::applied_if(parse_bool(value), |v| visual.visible = v),
        "inherit_alpha" => PropertyStatus::applied_if(parse_bool(value), |v| visual.inherit_alpha = v),
        "anchor_left" => PropertyStatus::applied_if(parse_bool(value), |v| visual.anchors.left = v),
        "anchor_right" => PropertyStatus::applied_if(parse_bool(value), |v| visual.anchors.right = v),
        "anchor_top" => PropertyStatus::applied_if(parse_bool(value), |v| visual.anchors.top = v),
        "anchor_bottom" => PropertyStatus::applied_if(parse_bool(value), |v| visual.anchors.bottom = v),
        "anchors" => PropertyStatus::applied_if(Anchors::parse(value), |a| visual.anchors = a),
        "retain_anchor_aspect" => {
            PropertyStatus::applied_if(parse_bool(value), |v| visual.retain_anchor_aspect = v)
        }
        "max_width" => PropertyStatus::applied_if(parse_max(value), |v| visual.max_width = v),
        "max_height" => PropertyStatus::applied_if(parse_max(value), |v| visual.max_height = v),
        "hit_test" => PropertyStatus::applied_if(HitTest::parse(value), |h| visual.hit_test = h),
        "clip" => PropertyStatus::applied_if(parse_bool(value), |v| visual.clip = v),
        _ => PropertyStatus::Unknown,
    }
}

fn read_animator(animator: &Animator, name: &str) -> Option<String> {
    let value = match name {
        "function" | "func" => animator.function.as_str().to_owned(),
        "timer" => animator.timer().to_string(),
        "delay" => animator.delay().to_string(),
        "periods" => animator.periods.to_string(),
        "amplitude" | "amp" => animator.amplitude.to_string(),
        "peak_to_peak" => (animator.amplitude * 2.0).to_string(),
        "speed" => animator.speed.to_string(),
        "offset" => animator.offset.to_string(),
        "multiplier" => animator.multiplier.to_string(),
        "acceleration" => animator.acceleration.to_string(),
        "discrete_step" => animator.discrete_step.to_string(),
        "reset" => animator.reset_on_expire.to_string(),
        "inherit_value" => animator.inherit_value.to_string(),
        "target" => animator.target.to_string(),
        "use_target" => animator.use_target.to_string(),
        "time" => {
            if animator.speed.abs() > f32::EPSILON {
                (1.0 / animator.speed).to_string()
            } else {
                "0".to_owned()
            }
        }
        "property" => animator.property().key().into_owned(),
        "value" => animator.value().to_string(),
        _ => return None,
    };
    Some(value)
}

fn write_animator(animator: &mut Animator, name: &str, value: &str) -> PropertyStatus {
    match name {
        "function" | "func" => PropertyStatus::applied_if(AnimationFunction::parse(value), |f| animator.function = f),
        "timer" => PropertyStatus::applied_if(parse_f32(value), |v| animator.set_timer(v)),
        "delay" => PropertyStatus::applied_if(parse_f32(value), |v| animator.set_delay(v)),
        "periods" => PropertyStatus::applied_if(parse_f32(value), |v| animator.periods = v),
        "amplitude" | "amp" => PropertyStatus::applied_if(parse_f32(value), |v| animator.amplitude = v),
        "peak_to_peak" => PropertyStatus::applied_if(parse_f32(value), |v| animator.set_peak_to_peak(v)),
        "speed" => PropertyStatus::applied_if(parse_f32(value), |v| animator.speed = v),
        "offset" => PropertyStatus::applied_if(parse_f32(value), |v| animator.offset = v),
        "multiplier" => PropertyStatus::applied_if(parse_f32(value), |v| animator.multiplier = v),
        "acceleration" => PropertyStatus::applied_if(parse_f32(value), |v| animator.acceleration = v),
        "discrete_step" => PropertyStatus::applied_if(parse_f32(value), |v| animator.discrete_step = v),
        "reset" => PropertyStatus::applied_if(parse_bool(value), |v| animator.reset_on_expire = v),
        "inherit_value" => PropertyStatus::applied_if(parse_bool(value), |v| animator.inherit_value = v),
        "target" => PropertyStatus::applied_if(parse_f32(value), |v| animator.set_target(v)),
        "use_target" => PropertyStatus::applied_if(parse_bool(value), |v| animator.use_target = v),
        "time" => PropertyStatus::applied_if(parse_f32(value), |v| animator.set_time(v)),
        "property" => {
            animator.set_property_key(AnimatedProperty::parse(value));
            PropertyStatus::Applied
        }
        _ => PropertyStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Rect;

    #[test]
    fn test_visual_properties_round_trip() {
        let mut scene = Scene::new();
        let id = scene.create_container("panel", Rect::ZERO).expect("create");

        let applied = scene.apply_properties(
            id,
            [
                ("x", "12"),
                ("w", "40"),
                ("color", "#ff000080"),
                ("anchors", "left,right"),
                ("max_width", "300"),
                ("hit_test", "disabled"),
                ("zorder", "3"),
            ],
        );
        assert_eq!(applied, 7);

        let visual = scene.visual(id).expect("visual");
        assert_eq!(visual.position(), Vec2::new(12.0, 0.0));
        assert_eq!(visual.pivot(), Vec2::new(20.0, 0.0));
        assert_eq!(visual.color(), Color::rgba(255, 0, 0, 128));
        assert_eq!(visual.anchors(), Anchors::new(true, true, false, false));
        assert_eq!(scene.get_property(id, "anchors").as_deref(), Some("left,right"));
        assert_eq!(scene.get_property(id, "max_width").as_deref(), Some("300"));
        assert_eq!(scene.get_property(id, "zorder").as_deref(), Some("3"));
        assert_eq!(scene.get_property(id, "hit_test").as_deref(), Some("disabled"));
    }

    #[test]
    fn test_unknown_and_invalid_are_reported() {
        let mut scene = Scene::new();
        let id = scene.create_container("panel", Rect::ZERO).expect("create");

        assert!(!scene.set_property(id, "frobnicate", "1"));
        assert!(!scene.set_property(id, "x", "left"));
        assert!(!scene.set_property(id, "name", "other"));
        assert!(scene.get_property(id, "frobnicate").is_none());
        assert_eq!(scene.get_property(id, "name").as_deref(), Some("panel"));
    }

    #[test]
    fn test_animator_properties() {
        let mut scene = Scene::new();
        let id = scene.create("Animator", "a").expect("create");

        assert!(scene.set_property(id, "property", "alpha"));
        assert!(scene.set_property(id, "func", "sine_abs"));
        assert!(scene.set_property(id, "time", "0.5"));
        assert!(scene.set_property(id, "peak_to_peak", "10"));
        assert!(scene.set_property(id, "reset", "yes"));

        let animator = scene.animator(id).expect("animator");
        assert_eq!(animator.property(), &AnimatedProperty::Alpha);
        assert_eq!(animator.function, AnimationFunction::SineAbs);
        assert!((animator.speed - 2.0).abs() < f32::EPSILON);
        assert!((animator.amplitude - 5.0).abs() < f32::EPSILON);
        assert!(animator.reset_on_expire);
        assert!(!scene.set_property(id, "x", "1"));
    }

    #[test]
    fn test_byte_values_clamp() {
        let mut scene = Scene::new();
        let id = scene.create_container("n", Rect::ZERO).expect("create");

        assert!(scene.set_animated_value(id, &AnimatedProperty::Alpha, 300.0));
        assert_eq!(scene.visual(id).expect("visual").alpha(), 255);
        assert!(scene.set_animated_value(id, &AnimatedProperty::Red, -4.0));
        assert_eq!(scene.visual(id).expect("visual").color().r, 0);
        assert_eq!(scene.animated_value(id, &AnimatedProperty::Alpha), Some(255.0));
    }

    #[test]
    fn test_named_value_needs_widget() {
        let mut scene = Scene::new();
        let id = scene.create_container("n", Rect::ZERO).expect("create");
        let named = AnimatedProperty::Named("progress".into());
        assert!(!scene.set_animated_value(id, &named, 1.0));
        assert!(scene.animated_value(id, &named).is_none());
    }
}
