//! Static world geometry the range sensor is cast against.

use crate::map::WorldPoint;

/// An axis-aligned solid rectangle in world coordinates.
///
/// `(x, y)` is the corner with the smallest coordinates. Containment is
/// half-open: the far edges at `x + width` and `y + height` are outside.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    /// Left edge.
    pub x: f64,
    /// Top edge (smallest y).
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Obstacle {
    /// Creates a new `Obstacle`.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Returns `true` if the rectangle covers no area. Empty rectangles never
    /// contain a point.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }

    /// Point-in-rectangle test.
    pub fn contains(&self, p: WorldPoint) -> bool {
        !self.is_empty()
            && p.x >= self.x
            && p.x < self.x + self.width
            && p.y >= self.y
            && p.y < self.y + self.height
    }
}

/// The obstacles of a simulation session. Static for the session's lifetime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    /// Obstacles in the order the sensor tests them.
    pub obstacles: Vec<Obstacle>,
}

impl World {
    /// Creates a world from a list of obstacles.
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// A world with no obstacles.
    pub fn empty() -> Self {
        Self { obstacles: Vec::new() }
    }
}

impl Default for World {
    /// Two 50x50 blocks on an 800x600 field.
    fn default() -> Self {
        Self::new(vec![
            Obstacle::new(200.0, 200.0, 50.0, 50.0),
            Obstacle::new(500.0, 400.0, 50.0, 50.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = Obstacle::new(450.0, 290.0, 50.0, 50.0);
        assert!(rect.contains(WorldPoint::new(450.0, 290.0)));
        assert!(rect.contains(WorldPoint::new(499.9, 339.9)));
        assert!(!rect.contains(WorldPoint::new(500.0, 300.0)));
        assert!(!rect.contains(WorldPoint::new(460.0, 340.0)));
        assert!(!rect.contains(WorldPoint::new(449.9, 300.0)));
    }

    #[test]
    fn test_degenerate_rectangles_are_empty() {
        let p = WorldPoint::new(0.0, 0.0);
        for rect in [
            Obstacle::new(0.0, 0.0, 0.0, 10.0),
            Obstacle::new(0.0, 0.0, 10.0, 0.0),
            Obstacle::new(5.0, 5.0, -10.0, -10.0),
            Obstacle::new(0.0, 0.0, f64::NAN, 10.0),
            Obstacle::new(0.0, 0.0, f64::INFINITY, 10.0),
        ] {
            assert!(rect.is_empty(), "{rect:?}");
            assert!(!rect.contains(p), "{rect:?}");
        }
    }

    #[test]
    fn test_nan_point_is_outside() {
        let rect = Obstacle::new(0.0, 0.0, 10.0, 10.0);
        assert!(!rect.contains(WorldPoint::new(f64::NAN, 5.0)));
    }

    #[test]
    fn test_default_world() {
        let world = World::default();
        assert_eq!(world.obstacles.len(), 2);
        assert_eq!(world.obstacles[0], Obstacle::new(200.0, 200.0, 50.0, 50.0));
        assert!(World::empty().obstacles.is_empty());
    }
}
