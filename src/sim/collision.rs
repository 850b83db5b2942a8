//! Playfield bounds and box overlap tests
//!
//! Every game here uses axis-aligned boxes: an entity is a centre point plus a
//! size, and hits are strict half-extent comparisons on both axes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A bounded logical playfield anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Strictly inside the playfield (edges are outside)
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x > 0.0 && pos.x < self.width && pos.y > 0.0 && pos.y < self.height
    }

    /// Clamp a centre point so a body of `half` extent stays on the field
    ///
    /// Acts as a wall with zero bounce: the body stops at the edge.
    pub fn clamp(&self, pos: Vec2, half: Vec2) -> Vec2 {
        let min = half.min(Vec2::new(self.width, self.height) * 0.5);
        let max = Vec2::new(self.width, self.height) - min;
        pos.clamp(min, max)
    }
}

/// True if `point` lies strictly within `half` of `centre` on both axes
#[inline]
pub fn within_half_extent(point: Vec2, centre: Vec2, half: Vec2) -> bool {
    let d = (point - centre).abs();
    d.x < half.x && d.y < half.y
}

/// True if two boxes (centre + full size) overlap
#[inline]
pub fn boxes_overlap(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> bool {
    within_half_extent(a, b, (a_size + b_size) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_keeps_body_inside() {
        let field = Playfield::new(400.0, 600.0);
        let half = Vec2::new(15.0, 25.0);

        let clamped = field.clamp(Vec2::new(-50.0, 700.0), half);
        assert_eq!(clamped, Vec2::new(15.0, 575.0));

        let inside = Vec2::new(200.0, 300.0);
        assert_eq!(field.clamp(inside, half), inside);
    }

    #[test]
    fn test_within_half_extent_is_strict() {
        let centre = Vec2::new(200.0, -30.0);
        let half = Vec2::new(14.0, 22.5);
        assert!(within_half_extent(Vec2::new(200.0, -30.0), centre, half));
        assert!(within_half_extent(Vec2::new(213.9, -8.0), centre, half));
        assert!(!within_half_extent(Vec2::new(214.0, -30.0), centre, half));
    }

    #[test]
    fn test_boxes_overlap_uses_combined_extent() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(28.0, 0.0);
        assert!(boxes_overlap(a, Vec2::new(30.0, 50.0), b, Vec2::new(28.0, 45.0)));
        let c = Vec2::new(29.0, 48.0);
        assert!(!boxes_overlap(a, Vec2::new(30.0, 50.0), c, Vec2::new(28.0, 45.0)));
    }

    #[test]
    fn test_contains_excludes_edges() {
        let field = Playfield::new(100.0, 100.0);
        assert!(field.contains(Vec2::new(50.0, 50.0)));
        assert!(!field.contains(Vec2::new(0.0, 50.0)));
        assert!(!field.contains(Vec2::new(50.0, 100.0)));
    }
}
