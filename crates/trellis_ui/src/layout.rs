//! Anchored layout.
//!
//! When a visual node resizes, each visual child reacts to the size delta
//! according to its anchor flags. This module plans one child's reaction on
//! one axis. [`Scene`](crate::Scene) applies the plan and recurses.

use std::fmt;

use crate::node::VisualNode;

/// A layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X / width.
    Horizontal,
    /// Y / height.
    Vertical,
}

impl Axis {
    /// The other axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Per-edge anchor flags.
///
/// An edge flag pins the child's distance to that edge of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct Anchors {
    /// Pinned to the left edge.
    pub left: bool,
    /// Pinned to the right edge.
    pub right: bool,
    /// Pinned to the top edge.
    pub top: bool,
    /// Pinned to the bottom edge.
    pub bottom: bool,
}

impl Anchors {
    /// Pinned to every edge.
    pub const ALL: Self = Self::new(true, true, true, true);
    /// Pinned to no edge. The child keeps its position relative to the parent centre.
    pub const NONE: Self = Self::new(false, false, false, false);

    /// Creates anchors from edge flags.
    #[must_use]
    pub const fn new(left: bool, right: bool, top: bool, bottom: bool) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Near edge flag (left or top).
    #[must_use]
    pub const fn near(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    /// Far edge flag (right or bottom).
    #[must_use]
    pub const fn far(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.right,
            Axis::Vertical => self.bottom,
        }
    }

    /// Parses `all`, `none`, or a comma-separated list of edge names.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "all" => return Some(Self::ALL),
            "none" | "" => return Some(Self::NONE),
            _ => {}
        }
        let mut anchors = Self::NONE;
        for edge in text.split(',') {
            match edge.trim() {
                "left" => anchors.left = true,
                "right" => anchors.right = true,
                "top" => anchors.top = true,
                "bottom" => anchors.bottom = true,
                _ => return None,
            }
        }
        Some(anchors)
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Self::new(true, false, true, false)
    }
}

impl fmt::Display for Anchors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edges: Vec<&str> = [
            (self.left, "left"),
            (self.right, "right"),
            (self.top, "top"),
            (self.bottom, "bottom"),
        ]
        .iter()
        .filter_map(|&(set, name)| set.then_some(name))
        .collect();
        if edges.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&edges.join(","))
        }
    }
}

/// Cross-axis adjustment for a child that retains its aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossStep {
    /// New cross-axis size.
    pub size: f32,
    /// Cross-axis position shift.
    pub shift: f32,
}

/// How one child reacts to its parent's resize on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CascadeStep {
    /// Position shift along the resized axis.
    pub shift: f32,
    /// New size along the resized axis, for stretching children.
    pub resize: Option<f32>,
    /// Cross-axis adjustment from aspect retention.
    pub cross: Option<CrossStep>,
    /// Aspect retention was requested but skipped because a max size is set.
    pub aspect_skipped: bool,
}

impl CascadeStep {
    /// Returns true if the step changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.shift == 0.0 && self.resize.is_none() && self.cross.is_none()
    }
}

/// Plans how `child` reacts to its parent growing by `difference` on `axis`.
///
/// - far edge only: slide by `difference`
/// - neither edge: slide by half of `difference`
/// - both edges: stretch, clamped by the child's max size, re-centred by
///   half of the clamped-away remainder
/// - near edge only: unchanged
///
/// A stretch never goes below zero size; that floor does not move the child.
///
/// A stretching child that retains its aspect grows on the cross axis in
/// proportion, unless it has a max size on either axis (max size wins) or
/// is anchored on both cross edges, where the cross axis follows the parent.
#[must_use]
pub fn plan_child(child: &VisualNode, axis: Axis, difference: f32) -> CascadeStep {
    let anchors = child.anchors();
    let near = anchors.near(axis);
    let far = anchors.far(axis);

    match (near, far) {
        (true, false) => CascadeStep::default(),
        (false, true) => CascadeStep {
            shift: difference,
            ..CascadeStep::default()
        },
        (false, false) => CascadeStep {
            shift: difference * 0.5,
            ..CascadeStep::default()
        },
        (true, true) => plan_stretch(child, axis, difference),
    }
}

fn plan_stretch(child: &VisualNode, axis: Axis, difference: f32) -> CascadeStep {
    let old = child.size_on(axis);
    let requested = old + difference;
    let mut shift = 0.0;
    let mut clamped = requested;
    if let Some(max) = child.max_on(axis) {
        if requested > max {
            clamped = max;
            shift = (requested - max) * 0.5;
        }
    }
    let clamped = clamped.max(0.0);

    let mut step = CascadeStep {
        shift,
        resize: Some(clamped),
        cross: None,
        aspect_skipped: false,
    };

    if !child.retains_anchor_aspect() {
        return step;
    }
    if child.max_width().is_some() || child.max_height().is_some() {
        step.aspect_skipped = true;
        return step;
    }
    if old == 0.0 {
        return step;
    }

    let cross = axis.cross();
    let anchors = child.anchors();
    let factor = match (anchors.near(cross), anchors.far(cross)) {
        // The parent's own pass on the cross axis stretches this child
        (true, true) => return step,
        (true, false) => 0.0,
        (false, true) => -1.0,
        (false, false) => -0.5,
    };
    let cross_old = child.size_on(cross);
    let cross_delta = (clamped - old) * cross_old / old;
    step.cross = Some(CrossStep {
        size: cross_old + cross_delta,
        shift: factor * cross_delta,
    });
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Rect;

    fn child(anchors: Anchors) -> VisualNode {
        let mut visual = VisualNode::new(Rect::new(10.0, 10.0, 80.0, 40.0));
        visual.set_anchors(anchors);
        visual
    }

    #[test]
    fn test_near_anchor_is_unchanged() {
        let step = plan_child(&child(Anchors::default()), Axis::Horizontal, 50.0);
        assert!(step.is_noop());
    }

    #[test]
    fn test_far_anchor_slides() {
        let step = plan_child(&child(Anchors::new(false, true, true, false)), Axis::Horizontal, 50.0);
        assert_eq!(step.shift, 50.0);
        assert_eq!(step.resize, None);
    }

    #[test]
    fn test_unanchored_slides_half() {
        let step = plan_child(&child(Anchors::NONE), Axis::Vertical, 30.0);
        assert_eq!(step.shift, 15.0);
    }

    #[test]
    fn test_both_edges_stretch() {
        let step = plan_child(&child(Anchors::ALL), Axis::Horizontal, 100.0);
        assert_eq!(step.resize, Some(180.0));
        assert_eq!(step.shift, 0.0);
    }

    #[test]
    fn test_max_size_clamps_and_recentres() {
        let mut c = child(Anchors::ALL);
        c.set_max_width(Some(100.0));
        let step = plan_child(&c, Axis::Horizontal, 100.0);
        assert_eq!(step.resize, Some(100.0));
        // 80 of the requested 180 were clamped away; half goes to the position
        assert_eq!(step.shift, 40.0);
    }

    #[test]
    fn test_aspect_retention_grows_cross_axis() {
        let mut c = child(Anchors::new(true, true, true, false));
        c.set_retain_anchor_aspect(true);
        let step = plan_child(&c, Axis::Horizontal, 80.0);
        let cross = step.cross.expect("cross step");
        // 80x40 doubled in width doubles in height, top edge stays put
        assert_eq!(cross.size, 80.0);
        assert_eq!(cross.shift, 0.0);
    }

    #[test]
    fn test_aspect_skips_cross_axis_anchored_both_ways() {
        let mut c = child(Anchors::ALL);
        c.set_retain_anchor_aspect(true);
        let step = plan_child(&c, Axis::Horizontal, 80.0);
        assert!(step.cross.is_none());
        assert_eq!(step.shift, 0.0);
        assert_eq!(step.resize, Some(160.0));
    }

    #[test]
    fn test_shrink_below_zero_keeps_position() {
        let step = plan_child(&child(Anchors::ALL), Axis::Horizontal, -100.0);
        assert_eq!(step.resize, Some(0.0));
        assert_eq!(step.shift, 0.0);
    }

    #[test]
    fn test_max_size_wins_over_aspect() {
        let mut c = child(Anchors::ALL);
        c.set_retain_anchor_aspect(true);
        c.set_max_height(Some(60.0));
        let step = plan_child(&c, Axis::Horizontal, 80.0);
        assert!(step.aspect_skipped);
        assert!(step.cross.is_none());
        assert_eq!(step.resize, Some(160.0));
    }

    #[test]
    fn test_anchor_parse_and_display() {
        assert_eq!(Anchors::parse("all"), Some(Anchors::ALL));
        assert_eq!(Anchors::parse("right, bottom"), Some(Anchors::new(false, true, false, true)));
        assert_eq!(Anchors::parse("middle"), None);
        assert_eq!(Anchors::default().to_string(), "left,top");
        assert_eq!(Anchors::NONE.to_string(), "none");
    }
}
