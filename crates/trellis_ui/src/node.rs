//! Scene nodes.
//!
//! Every node lives in the scene's arena and is addressed by a [`NodeId`].
//! Tree links are ids, so a stale link fails to resolve instead of dangling.

use std::fmt;

use trellis_core::{Affine2, Handle, Rect, Vec2};

use crate::animation::{AnimatedProperty, Animator};
use crate::event::{EventHandler, EventKind};
use crate::layout::{Anchors, Axis};
use crate::style::Color;
use crate::widget::WidgetBehavior;

/// Handle to a node in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) Handle);

impl NodeId {
    /// Returns the underlying arena handle.
    #[must_use]
    pub const fn handle(self) -> Handle {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0.index(), self.0.generation())
    }
}

/// Hit-testing policy of a visual node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitTest {
    /// The node and its descendants take part in hit testing.
    #[default]
    Enabled,
    /// The node is transparent to the pointer, its descendants are not.
    Disabled,
    /// The node and all its descendants are transparent to the pointer.
    DisabledRecursive,
}

impl HitTest {
    /// Parses `enabled`, `disabled` or `disabled_recursive`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            "disabled_recursive" => Some(Self::DisabledRecursive),
            _ => None,
        }
    }

    /// The name accepted by [`HitTest::parse`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::DisabledRecursive => "disabled_recursive",
        }
    }
}

/// Programmatically created animators of one visual node, keyed by property.
///
/// At most one entry per property is running at a time. Queued entries for
/// the same property wait out their delay behind it.
#[derive(Debug, Clone, Default)]
pub struct DynamicAnimators {
    entries: Vec<(AnimatedProperty, NodeId)>,
}

impl DynamicAnimators {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First animator registered for `property`.
    #[must_use]
    pub fn get(&self, property: &AnimatedProperty) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|&(_, id)| id)
    }

    /// Every animator registered for `property`.
    #[must_use]
    pub fn all_for(&self, property: &AnimatedProperty) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(p, _)| p == property)
            .map(|&(_, id)| id)
            .collect()
    }

    /// Snapshot of every animator id, in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        self.entries.iter().map(|&(_, id)| id).collect()
    }

    /// Property animated by `id`, if registered.
    #[must_use]
    pub fn property_of(&self, id: NodeId) -> Option<&AnimatedProperty> {
        self.entries
            .iter()
            .find(|&&(_, entry)| entry == id)
            .map(|(p, _)| p)
    }

    pub(crate) fn push(&mut self, property: AnimatedProperty, id: NodeId) {
        self.entries.push((property, id));
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|&(_, entry)| entry != id);
        self.entries.len() != before
    }

    pub(crate) fn take_property(&mut self, property: &AnimatedProperty) -> Vec<NodeId> {
        let taken = self.all_for(property);
        self.entries.retain(|(p, _)| p != property);
        taken
    }

    pub(crate) fn take_all(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, id)| id)
            .collect()
    }
}

/// Geometry and appearance of a drawable node.
///
/// Local space has its origin at the rect's top-left corner. The pivot is
/// the origin for rotation and scale, in local space.
///
/// Size changes that must cascade to children go through the scene
/// ([`Scene::set_size`](crate::Scene::set_size)). Everything else can be
/// set here directly.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct VisualNode {
    pub(crate) rect: Rect,
    pub(crate) pivot: Vec2,
    pub(crate) pivot_explicit: [bool; 2],
    pub(crate) scale: Vec2,
    pub(crate) angle: f32,
    pub(crate) color: Color,
    pub(crate) visible: bool,
    pub(crate) inherit_alpha: bool,
    pub(crate) anchors: Anchors,
    pub(crate) retain_anchor_aspect: bool,
    pub(crate) max_width: Option<f32>,
    pub(crate) max_height: Option<f32>,
    pub(crate) hit_test: HitTest,
    pub(crate) clip: bool,
    pub(crate) dynamic: DynamicAnimators,
}

impl VisualNode {
    /// Creates a visual node with its pivot at the rect centre.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            pivot: rect.size() * 0.5,
            pivot_explicit: [false; 2],
            scale: Vec2::ONE,
            angle: 0.0,
            color: Color::WHITE,
            visible: true,
            inherit_alpha: true,
            anchors: Anchors::default(),
            retain_anchor_aspect: false,
            max_width: None,
            max_height: None,
            hit_test: HitTest::Enabled,
            clip: false,
            dynamic: DynamicAnimators::default(),
        }
    }

    /// Rectangle in parent space.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Top-left corner in parent space.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.rect.position()
    }

    /// Moves the node. Position changes never cascade.
    pub fn set_position(&mut self, position: Vec2) {
        self.rect.x = position.x;
        self.rect.y = position.y;
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.rect.size()
    }

    /// Rectangle in local space: `(0, 0, width, height)`.
    #[must_use]
    pub const fn local_rect(&self) -> Rect {
        Rect::from_pos_size(Vec2::ZERO, self.rect.size())
    }

    /// Rotation and scale origin in local space.
    #[must_use]
    pub const fn pivot(&self) -> Vec2 {
        self.pivot
    }

    /// Sets the pivot. An explicit pivot no longer follows the rect centre.
    pub fn set_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
        self.pivot_explicit = [true; 2];
    }

    /// Sets the pivot on one axis.
    pub fn set_pivot_on(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.pivot.x = value,
            Axis::Vertical => self.pivot.y = value,
        }
        self.pivot_explicit[axis_index(axis)] = true;
    }

    /// Returns true once the pivot has been set explicitly on `axis`.
    #[must_use]
    pub const fn is_pivot_explicit(&self, axis: Axis) -> bool {
        self.pivot_explicit[axis_index(axis)]
    }

    /// Scale factor.
    #[must_use]
    pub const fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Sets the scale factor.
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// Rotation in degrees, clockwise.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Sets the rotation in degrees.
    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = degrees;
    }

    /// Color. Alpha is the node's own opacity.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Sets the color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Own opacity.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.color.a
    }

    /// Sets the own opacity.
    pub fn set_alpha(&mut self, alpha: u8) {
        self.color.a = alpha;
    }

    /// Visible flag and non-zero alpha.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible && self.color.a > 0
    }

    /// Sets the visible flag.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Raw visible flag.
    #[must_use]
    pub const fn visible_flag(&self) -> bool {
        self.visible
    }

    /// Alpha is multiplied by the parent's derived alpha.
    #[must_use]
    pub const fn inherits_alpha(&self) -> bool {
        self.inherit_alpha
    }

    /// Sets alpha inheritance.
    pub fn set_inherit_alpha(&mut self, inherit: bool) {
        self.inherit_alpha = inherit;
    }

    /// Anchor flags.
    #[must_use]
    pub const fn anchors(&self) -> Anchors {
        self.anchors
    }

    /// Sets the anchor flags.
    pub fn set_anchors(&mut self, anchors: Anchors) {
        self.anchors = anchors;
    }

    /// Grows the cross axis in proportion when stretched by anchors.
    #[must_use]
    pub const fn retains_anchor_aspect(&self) -> bool {
        self.retain_anchor_aspect
    }

    /// Sets aspect retention.
    pub fn set_retain_anchor_aspect(&mut self, retain: bool) {
        self.retain_anchor_aspect = retain;
    }

    /// Cap on anchor-driven width.
    #[must_use]
    pub const fn max_width(&self) -> Option<f32> {
        self.max_width
    }

    /// Sets the width cap.
    pub fn set_max_width(&mut self, max: Option<f32>) {
        self.max_width = max;
    }

    /// Cap on anchor-driven height.
    #[must_use]
    pub const fn max_height(&self) -> Option<f32> {
        self.max_height
    }

    /// Sets the height cap.
    pub fn set_max_height(&mut self, max: Option<f32>) {
        self.max_height = max;
    }

    /// Hit-testing policy.
    #[must_use]
    pub const fn hit_test(&self) -> HitTest {
        self.hit_test
    }

    /// Sets the hit-testing policy.
    pub fn set_hit_test(&mut self, hit_test: HitTest) {
        self.hit_test = hit_test;
    }

    /// Children are clipped to this node's bounds.
    #[must_use]
    pub const fn clips(&self) -> bool {
        self.clip
    }

    /// Sets clipping.
    pub fn set_clip(&mut self, clip: bool) {
        self.clip = clip;
    }

    /// Programmatically created animators.
    #[must_use]
    pub const fn dynamic_animators(&self) -> &DynamicAnimators {
        &self.dynamic
    }

    /// True if either scale component is below `epsilon`.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f32) -> bool {
        self.scale.x.abs() < epsilon || self.scale.y.abs() < epsilon
    }

    /// Maps a local point into parent space.
    #[must_use]
    pub fn to_parent(&self, point: Vec2) -> Vec2 {
        (point - self.pivot).mul_elem(self.scale).rotated(self.angle) + self.pivot + self.position()
    }

    /// Maps a parent-space point into local space.
    ///
    /// Returns None if the scale is degenerate.
    #[must_use]
    pub fn to_local(&self, point: Vec2, epsilon: f32) -> Option<Vec2> {
        if self.is_degenerate(epsilon) {
            return None;
        }
        Some((point - self.position() - self.pivot).rotated(-self.angle).div_elem(self.scale) + self.pivot)
    }

    /// Local-to-parent transform.
    #[must_use]
    pub fn local_transform(&self) -> Affine2 {
        Affine2::translation(self.position() + self.pivot)
            * Affine2::rotation(self.angle)
            * Affine2::scale(self.scale)
            * Affine2::translation(-self.pivot)
    }

    pub(crate) fn size_on(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.rect.width,
            Axis::Vertical => self.rect.height,
        }
    }

    pub(crate) fn set_size_on(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.rect.width = value,
            Axis::Vertical => self.rect.height = value,
        }
    }

    pub(crate) fn shift_on(&mut self, axis: Axis, delta: f32) {
        match axis {
            Axis::Horizontal => self.rect.x += delta,
            Axis::Vertical => self.rect.y += delta,
        }
    }

    pub(crate) fn pivot_on(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.pivot.x,
            Axis::Vertical => self.pivot.y,
        }
    }

    pub(crate) fn write_pivot_on(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.pivot.x = value,
            Axis::Vertical => self.pivot.y = value,
        }
    }

    pub(crate) fn max_on(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Horizontal => self.max_width,
            Axis::Vertical => self.max_height,
        }
    }
}

const fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical => 1,
    }
}

/// The closed set of node kinds.
pub enum NodeKind {
    /// A visual node with no behaviour of its own. Groups children.
    Container(VisualNode),
    /// Mutates one property of its parent over time.
    Animator(Animator),
    /// A visual node with widget behaviour.
    Widget(VisualNode, Box<dyn WidgetBehavior>),
}

impl NodeKind {
    /// Type name, as registered in the factory.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Container(_) => "Container",
            Self::Animator(animator) => animator.property().animator_type_name(),
            Self::Widget(_, behavior) => behavior.type_name(),
        }
    }

    /// Geometry, for visual kinds.
    #[must_use]
    pub const fn visual(&self) -> Option<&VisualNode> {
        match self {
            Self::Container(visual) | Self::Widget(visual, _) => Some(visual),
            Self::Animator(_) => None,
        }
    }

    /// Mutable geometry, for visual kinds.
    pub fn visual_mut(&mut self) -> Option<&mut VisualNode> {
        match self {
            Self::Container(visual) | Self::Widget(visual, _) => Some(visual),
            Self::Animator(_) => None,
        }
    }

    /// Animator state, for animator kinds.
    #[must_use]
    pub const fn animator(&self) -> Option<&Animator> {
        match self {
            Self::Animator(animator) => Some(animator),
            _ => None,
        }
    }

    /// Mutable animator state, for animator kinds.
    pub fn animator_mut(&mut self) -> Option<&mut Animator> {
        match self {
            Self::Animator(animator) => Some(animator),
            _ => None,
        }
    }

    /// Widget behaviour, for widget kinds.
    #[must_use]
    pub fn behavior(&self) -> Option<&dyn WidgetBehavior> {
        match self {
            Self::Widget(_, behavior) => Some(behavior.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(visual) => f.debug_tuple("Container").field(visual).finish(),
            Self::Animator(animator) => f.debug_tuple("Animator").field(animator).finish(),
            Self::Widget(visual, behavior) => f
                .debug_tuple("Widget")
                .field(visual)
                .field(&behavior.type_name())
                .finish(),
        }
    }
}

/// A tree element.
pub struct Node {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) awake: bool,
    pub(crate) z_order: i32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) animators: Vec<NodeId>,
    pub(crate) handlers: Vec<(EventKind, EventHandler)>,
    pub(crate) kind: NodeKind,
}

impl Node {
    /// Creates a detached node.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            awake: true,
            z_order: 0,
            parent: None,
            children: Vec::new(),
            animators: Vec::new(),
            handlers: Vec::new(),
            kind,
        }
    }

    /// Unique name within the scene.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own enabled flag. See [`Scene::is_derived_enabled`](crate::Scene::is_derived_enabled).
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Awake nodes are updated. A sleeping node pauses its whole subtree.
    #[must_use]
    pub const fn is_awake(&self) -> bool {
        self.awake
    }

    /// Sibling draw and update order. Higher is drawn later (on top).
    #[must_use]
    pub const fn z_order(&self) -> i32 {
        self.z_order
    }

    /// Parent node.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Visual children, sorted by z-order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Statically attached animators.
    #[must_use]
    pub fn animators(&self) -> &[NodeId] {
        &self.animators
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Geometry, for visual kinds.
    #[must_use]
    pub const fn visual(&self) -> Option<&VisualNode> {
        self.kind.visual()
    }

    /// Animator state, for animator kinds.
    #[must_use]
    pub const fn animator(&self) -> Option<&Animator> {
        self.kind.animator()
    }

    /// Returns true if a handler is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.iter().any(|(k, _)| *k == kind)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("awake", &self.awake)
            .field("z_order", &self.z_order)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("animators", &self.animators)
            .field("handlers", &self.handlers.len())
            .field("kind", &self.kind)
            .finish()
    }
}
