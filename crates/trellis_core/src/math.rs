//! 2D math for the scene graph.
//!
//! Angles are in degrees and turn clockwise on a y-down screen.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - positions, sizes, pivots and scale factors
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit vector (identity scale)
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a Vec2 with both components set to `v`
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Component-wise minimum
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise product
    #[must_use]
    pub fn mul_elem(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise quotient
    #[must_use]
    pub fn div_elem(self, other: Self) -> Self {
        Self::new(self.x / other.x, self.y / other.y)
    }

    /// Rotates the vector around the origin by `degrees`.
    #[must_use]
    pub fn rotated(self, degrees: f32) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Returns true if every component is within `tolerance` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle from position and size.
    #[must_use]
    pub const fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Corners in clockwise order starting top-left.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ]
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The top and left edges are inclusive, the bottom and right exclusive.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns true if two rectangles intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Returns the intersection of two rectangles, or None if they don't intersect.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Self::new(x, y, right - x, bottom - y))
    }

    /// Smallest rectangle enclosing every point. Empty input yields [`Rect::ZERO`].
    #[must_use]
    pub fn envelope(points: &[Vec2]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::ZERO;
        };
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self::from_pos_size(min, max - min)
    }

    /// Returns true if position and size are within `tolerance` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.position().approx_eq(other.position(), tolerance)
            && self.size().approx_eq(other.size(), tolerance)
    }
}

/// A 2D affine transform.
///
/// Stored column-major as `[a, b, c, d, e, f]`, mapping
/// `x' = a*x + c*y + e` and `y' = b*x + d*y + f`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Affine2(pub [f32; 6]);

impl Affine2 {
    /// The identity transform.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Pure translation.
    #[must_use]
    pub const fn translation(offset: Vec2) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, offset.x, offset.y])
    }

    /// Pure rotation by `degrees` around the origin.
    #[must_use]
    pub fn rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// Pure scale around the origin.
    #[must_use]
    pub const fn scale(factor: Vec2) -> Self {
        Self([factor.x, 0.0, 0.0, factor.y, 0.0, 0.0])
    }

    /// Composes two transforms. `rhs` is applied first.
    #[must_use]
    pub fn then_apply(self, rhs: Self) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let [ra, rb, rc, rd, re, rf] = rhs.0;
        Self([
            a * ra + c * rb,
            b * ra + d * rb,
            a * rc + c * rd,
            b * rc + d * rd,
            a * re + c * rf + e,
            b * re + d * rf + f,
        ])
    }

    /// Transforms a point.
    #[must_use]
    pub fn apply(&self, point: Vec2) -> Vec2 {
        let [a, b, c, d, e, f] = self.0;
        Vec2::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
    }

    /// Determinant of the linear part.
    #[must_use]
    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, ..] = self.0;
        a * d - b * c
    }

    /// Inverse transform, or None if the transform is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f32::EPSILON {
            return None;
        }
        let [a, b, c, d, e, f] = self.0;
        let inv = 1.0 / det;
        Some(Self([
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * f - d * e) * inv,
            (b * e - a * f) * inv,
        ]))
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Affine2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.then_apply(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 5.0);

        assert_eq!(a + b, Vec2::new(4.0, 7.0));
        assert_eq!(b - a, Vec2::new(2.0, 3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert!((Vec2::new(3.0, 4.0).length() - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rotation_is_clockwise_on_y_down() {
        // +x rotated by 90 degrees points down the screen
        let r = Vec2::new(1.0, 0.0).rotated(90.0);
        assert!(r.approx_eq(Vec2::new(0.0, 1.0), TOLERANCE));

        let back = r.rotated(-90.0);
        assert!(back.approx_eq(Vec2::new(1.0, 0.0), TOLERANCE));
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);

        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(9.9, 9.9)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
        assert!(!r.contains(Vec2::new(-0.1, 5.0)));
    }

    #[test]
    fn test_envelope() {
        let points = [
            Vec2::new(5.0, -1.0),
            Vec2::new(-2.0, 3.0),
            Vec2::new(1.0, 8.0),
        ];
        assert_eq!(Rect::envelope(&points), Rect::new(-2.0, -1.0, 7.0, 9.0));
        assert_eq!(Rect::envelope(&[]), Rect::ZERO);
    }

    #[test]
    fn test_affine_compose_and_invert() {
        let t = Affine2::translation(Vec2::new(10.0, 20.0))
            * Affine2::rotation(30.0)
            * Affine2::scale(Vec2::new(2.0, 0.5));

        let p = Vec2::new(3.0, -4.0);
        let q = t.apply(p);
        let expected = Vec2::new(6.0, -2.0).rotated(30.0) + Vec2::new(10.0, 20.0);
        assert!(q.approx_eq(expected, TOLERANCE));

        let inv = t.inverse().expect("non-singular");
        assert!(inv.apply(q).approx_eq(p, TOLERANCE));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine2::scale(Vec2::new(0.0, 1.0)).inverse().is_none());
    }

    #[test]
    fn test_vec2_is_pod() {
        let v = Vec2::new(1.5, -2.5);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 8);
    }
}
