//! Collision geometry carried by every entity.
//!
//! The pool does not own the intersection maths. It hands two [`ShapeView`]s
//! to whatever [`Geometry`] implementation was injected at construction.
//! [`AabbGeometry`] is a reference predicate that compares the shapes'
//! world-space bounding boxes and ignores rotation; hosts that need exact
//! circle/ellipse/oriented-box tests supply their own.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Shape tag of a collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColliderShape {
    /// A single point; half extents are ignored.
    Point,
    /// Axis-aligned box before rotation.
    Rect,
    /// Ellipse (a circle when both half extents match).
    #[default]
    Ellipse,
}

impl ColliderShape {
    pub fn code(self) -> i64 {
        match self {
            ColliderShape::Point => 0,
            ColliderShape::Rect => 1,
            ColliderShape::Ellipse => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ColliderShape::Point),
            1 => Some(ColliderShape::Rect),
            2 => Some(ColliderShape::Ellipse),
            _ => None,
        }
    }
}

/// Shape, half extents and rotation (radians).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub half_extents: DVec2,
    pub rotation: f64,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            shape: ColliderShape::Ellipse,
            half_extents: DVec2::ZERO,
            rotation: 0.0,
        }
    }
}

impl Collider {
    pub fn point() -> Self {
        Self {
            shape: ColliderShape::Point,
            ..Self::default()
        }
    }

    pub fn circle(radius: f64) -> Self {
        Self {
            shape: ColliderShape::Ellipse,
            half_extents: DVec2::splat(radius),
            rotation: 0.0,
        }
    }

    pub fn rect(half_w: f64, half_h: f64) -> Self {
        Self {
            shape: ColliderShape::Rect,
            half_extents: DVec2::new(half_w, half_h),
            rotation: 0.0,
        }
    }

    /// Returns (min, max) of the unrotated bounding box centred on `position`.
    /// Negative extents are normalised.
    pub fn aabb(&self, position: DVec2) -> (DVec2, DVec2) {
        if self.shape == ColliderShape::Point {
            return (position, position);
        }
        let half = self.half_extents.abs();
        (position - half, position + half)
    }
}

/// A collider placed in the world, as handed to a [`Geometry`] predicate.
#[derive(Clone, Copy, Debug)]
pub struct ShapeView {
    pub position: DVec2,
    pub previous_position: DVec2,
    pub collider: Collider,
}

/// Shape-versus-shape intersection predicate injected into the pool.
pub trait Geometry {
    fn intersects(&self, a: &ShapeView, b: &ShapeView) -> bool;
}

/// Bounding-box predicate. Touching edges count as overlap so that two
/// points at the same position collide.
#[derive(Clone, Copy, Debug, Default)]
pub struct AabbGeometry;

impl Geometry for AabbGeometry {
    fn intersects(&self, a: &ShapeView, b: &ShapeView) -> bool {
        let (min_a, max_a) = a.collider.aabb(a.position);
        let (min_b, max_b) = b.collider.aabb(b.position);
        min_a.x <= max_b.x && max_a.x >= min_b.x && min_a.y <= max_b.y && max_a.y >= min_b.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(x: f64, y: f64, collider: Collider) -> ShapeView {
        ShapeView {
            position: DVec2::new(x, y),
            previous_position: DVec2::new(x, y),
            collider,
        }
    }

    #[test]
    fn aabb_normalises_negative_extents() {
        let c = Collider::rect(-2.0, 3.0);
        let (min, max) = c.aabb(DVec2::new(10.0, 10.0));
        assert_eq!(min, DVec2::new(8.0, 7.0));
        assert_eq!(max, DVec2::new(12.0, 13.0));
    }

    #[test]
    fn circles_overlap_when_boxes_touch() {
        let g = AabbGeometry;
        let a = view(0.0, 0.0, Collider::circle(1.0));
        let b = view(2.0, 0.0, Collider::circle(1.0));
        let c = view(2.5, 0.0, Collider::circle(1.0));
        assert!(g.intersects(&a, &b));
        assert!(!g.intersects(&a, &c));
    }

    #[test]
    fn point_inside_rect() {
        let g = AabbGeometry;
        let p = view(1.0, 1.0, Collider::point());
        let r = view(0.0, 0.0, Collider::rect(2.0, 2.0));
        assert!(g.intersects(&p, &r));
        assert!(g.intersects(&r, &p));
    }

    #[test]
    fn shape_codes_round_trip() {
        for shape in [ColliderShape::Point, ColliderShape::Rect, ColliderShape::Ellipse] {
            assert_eq!(ColliderShape::from_code(shape.code()), Some(shape));
        }
        assert_eq!(ColliderShape::from_code(7), None);
    }
}
