//! Math utilities and types
//!
//! Provides the 2D vector type and bounding boxes used by simulants and the
//! spatial index.

pub use nalgebra::Vector2;

use nalgebra::Rotation2;
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned bounding box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner of the bounding box
    pub min: Vec2,
    /// Maximum corner of the bounding box
    pub max: Vec2,
}

impl Bounds {
    /// Create a new box from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a box from a bottom-left position and a size
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// Create a box centered at a point with given half extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the box
    pub fn extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the box
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if this box contains a point (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if the box, rotated by `rotation` radians about its center,
    /// contains a point
    pub fn contains_point_rotated(&self, point: Vec2, rotation: f32) -> bool {
        if rotation == 0.0 {
            return self.contains_point(point);
        }
        let center = self.center();
        let local = Rotation2::new(-rotation) * (point - center) + center;
        self.contains_point(local)
    }

    /// Check if this box entirely contains another box
    pub fn contains_bounds(&self, other: &Self) -> bool {
        other.min.x >= self.min.x && other.max.x <= self.max.x &&
        other.min.y >= self.min.y && other.max.y <= self.max.y
    }

    /// Check if this box intersects another box (touching edges intersect)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Grow the box about its center by `overflow` times its size on each axis
    ///
    /// An overflow of zero yields the box unchanged; an overflow of one doubles it.
    pub fn with_overflow(&self, overflow: f32) -> Self {
        Self::from_center_extents(self.center(), self.extents() * (overflow + 1.0))
    }

    /// Conservative box enclosing this box under any rotation about its center
    ///
    /// Uses the corner-to-corner extent so the result covers every rotated pose.
    pub fn rotated_max(&self) -> Self {
        let half_diagonal = self.extents().magnitude();
        Self::from_center_extents(self.center(), Vec2::new(half_diagonal, half_diagonal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_contains_point() {
        let bounds = Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));

        assert!(bounds.contains_point(Vec2::zeros()));
        assert!(bounds.contains_point(Vec2::new(1.0, 0.5)));
        assert!(!bounds.contains_point(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        let b = Bounds::new(Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0));
        let c = Bounds::new(Vec2::new(5.0, 5.0), Vec2::new(7.0, 7.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains_bounds(&Bounds::new(Vec2::new(0.5, 0.5), Vec2::new(1.0, 1.0))));
        assert!(!a.contains_bounds(&b));
    }

    #[test]
    fn test_overflow_grows_about_center() {
        let bounds = Bounds::from_position_size(Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0));
        let grown = bounds.with_overflow(1.0);
        assert_relative_eq!(grown.min.x, -1.0);
        assert_relative_eq!(grown.min.y, -2.0);
        assert_relative_eq!(grown.max.x, 3.0);
        assert_relative_eq!(grown.max.y, 6.0);
    }

    #[test]
    fn test_rotated_max_encloses_diagonal() {
        let bounds = Bounds::from_position_size(Vec2::new(0.0, 0.0), Vec2::new(6.0, 8.0));
        let rotated = bounds.rotated_max();
        // half diagonal of a 6x8 box is 5
        assert_relative_eq!(rotated.min.x, -2.0);
        assert_relative_eq!(rotated.max.x, 8.0);
        assert_relative_eq!(rotated.min.y, -1.0);
        assert_relative_eq!(rotated.max.y, 9.0);
        assert!(rotated.contains_bounds(&bounds));
    }

    #[test]
    fn test_rotated_point_test_follows_the_turned_box() {
        let bounds = Bounds::from_position_size(Vec2::new(0.0, 0.0), Vec2::new(10.0, 2.0));
        let quarter = std::f32::consts::FRAC_PI_2;

        // standing upright the box spans x 4..6, y -4..6
        assert!(bounds.contains_point_rotated(Vec2::new(5.0, 5.0), quarter));
        assert!(!bounds.contains_point_rotated(Vec2::new(9.0, 1.0), quarter));
        assert!(bounds.contains_point_rotated(Vec2::new(9.0, 1.0), 0.0));
        assert!(!bounds.contains_point(Vec2::new(5.0, 5.0)));
    }
}
