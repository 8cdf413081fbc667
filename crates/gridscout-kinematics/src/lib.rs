#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for 2D unicycle robot motion."]
#![doc = ""]
#![doc = "This crate provides the robot pose and velocity command types, and"]
#![doc = "integrates a pose forward in time from a velocity command."]

use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Degrees in a full turn.
pub const FULL_TURN_DEG: f64 = 360.0;

/// A 2‑D pose `(x, y, heading)` in world units and degrees.
///
/// The heading is measured from the world x‑axis towards the world y‑axis. In
/// screen coordinates (y pointing down) a positive heading therefore turns
/// clockwise.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position.
    pub x: f64,
    /// World‑frame y position.
    pub y: f64,
    /// Heading (degrees), normalized to `[0, 360)` by [`Pose::advance`].
    pub heading_deg: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position.
    /// * `y`: World-frame y position.
    /// * `heading_deg`: Heading in degrees. Not normalized.
    pub const fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Pose { x, y, heading_deg }
    }

    /// Normalize a heading to be within `[0, 360)`.
    ///
    /// NaN passes through unchanged.
    ///
    /// # Arguments
    ///
    /// * `heading_deg`: The heading in degrees to normalize.
    ///
    /// # Returns
    ///
    /// The normalized heading in degrees.
    pub fn normalize_heading(heading_deg: f64) -> f64 {
        let a = heading_deg % FULL_TURN_DEG;
        let a = if a < 0.0 { a + FULL_TURN_DEG } else { a };
        // Tiny negative remainders round up to exactly 360.0.
        if a >= FULL_TURN_DEG { 0.0 } else { a }
    }

    /// Heading in radians.
    pub fn heading_rad(&self) -> f64 {
        self.heading_deg.to_radians()
    }

    /// Unit vector `(cos h, sin h)` along the heading.
    pub fn direction(&self) -> (f64, f64) {
        let rad = self.heading_rad();
        (cos(rad), sin(rad))
    }

    /// The point `distance` units ahead of the pose along its heading.
    pub fn point_ahead(&self, distance: f64) -> (f64, f64) {
        let (dx, dy) = self.direction();
        (self.x + distance * dx, self.y + distance * dy)
    }

    /// Integrates a velocity command over `dt` seconds.
    ///
    /// Translation is applied along the heading held at the start of the
    /// interval, then the heading is rotated and normalized to `[0, 360)`.
    ///
    /// # Arguments
    ///
    /// * `twist`: The commanded forward and turn rates.
    /// * `dt`: The time delta in seconds over which the command is applied.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
    /// Returns `Err(KinematicsError::InvalidTwist)` if a twist component is not finite.
    ///
    /// # Returns
    ///
    /// The robot's new pose.
    pub fn advance(&self, twist: Twist, dt: f64) -> Result<Pose, KinematicsError> {
        if dt < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta("must be non-negative"));
        }
        if !twist.forward.is_finite() || !twist.turn_deg.is_finite() {
            return Err(KinematicsError::InvalidTwist("rates must be finite"));
        }

        let (x, y) = self.point_ahead(twist.forward * dt);
        Ok(Pose {
            x,
            y,
            heading_deg: Pose::normalize_heading(self.heading_deg + twist.turn_deg * dt),
        })
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.1}, y: {:.1}, θ: {:.1}°)", self.x, self.y, self.heading_deg)
    }
}

/// A velocity command expressed in the robot base frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist {
    /// Forward speed along the heading (world units per second). Negative drives backwards.
    pub forward: f64,
    /// Turn rate (degrees per second). Positive increases the heading.
    pub turn_deg: f64,
}

impl Twist {
    /// Construct a new twist.
    ///
    /// # Arguments
    ///
    /// * `forward`: Forward speed (world units per second).
    /// * `turn_deg`: Turn rate (degrees per second).
    pub const fn new(forward: f64, turn_deg: f64) -> Self {
        Twist { forward, turn_deg }
    }

    /// A command that holds the robot still.
    pub const fn stop() -> Self {
        Twist { forward: 0.0, turn_deg: 0.0 }
    }

    /// Returns `true` if the command moves or turns the robot.
    pub fn is_moving(&self) -> bool {
        self.forward != 0.0 || self.turn_deg != 0.0
    }
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.1} u/s, ω: {:.1} °/s)", self.forward, self.turn_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_heading_normalization() {
        assert!((Pose::normalize_heading(0.0) - 0.0).abs() < EPSILON);
        assert!((Pose::normalize_heading(360.0) - 0.0).abs() < EPSILON);
        assert!((Pose::normalize_heading(359.5) - 359.5).abs() < EPSILON);
        assert!((Pose::normalize_heading(-2.0) - 358.0).abs() < EPSILON);
        assert!((Pose::normalize_heading(722.0) - 2.0).abs() < EPSILON);
        assert!((Pose::normalize_heading(-720.0) - 0.0).abs() < EPSILON);
        assert_eq!(Pose::normalize_heading(-1e-20), 0.0); // would otherwise round to 360.0
        assert!(Pose::normalize_heading(f64::NAN).is_nan());
    }

    #[test]
    fn test_direction() {
        let (dx, dy) = Pose::new(0.0, 0.0, 0.0).direction();
        assert!((dx - 1.0).abs() < EPSILON);
        assert!(dy.abs() < EPSILON);

        let (dx, dy) = Pose::new(0.0, 0.0, 90.0).direction();
        assert!(dx.abs() < EPSILON);
        assert!((dy - 1.0).abs() < EPSILON);

        let (dx, dy) = Pose::new(0.0, 0.0, 180.0).direction();
        assert!((dx + 1.0).abs() < EPSILON);
        assert!(dy.abs() < EPSILON);
    }

    #[test]
    fn test_point_ahead() {
        let pose = Pose::new(400.0, 300.0, 0.0);
        let (x, y) = pose.point_ahead(50.0);
        assert!((x - 450.0).abs() < EPSILON);
        assert!((y - 300.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_straight() {
        let pose = Pose::new(400.0, 300.0, 0.0);
        // 60 u/s for half a second
        let new_pose = pose.advance(Twist::new(60.0, 0.0), 0.5).unwrap();
        assert!((new_pose.x - 430.0).abs() < EPSILON);
        assert!((new_pose.y - 300.0).abs() < EPSILON);
        assert!((new_pose.heading_deg - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_backwards_along_y() {
        let pose = Pose::new(0.0, 0.0, 90.0);
        let new_pose = pose.advance(Twist::new(-10.0, 0.0), 1.0).unwrap();
        assert!(new_pose.x.abs() < EPSILON);
        assert!((new_pose.y - (-10.0)).abs() < EPSILON);
    }

    #[test]
    fn test_advance_turn_wraps_heading() {
        let pose = Pose::new(0.0, 0.0, 350.0);
        let new_pose = pose.advance(Twist::new(0.0, 30.0), 1.0).unwrap();
        assert!((new_pose.heading_deg - 20.0).abs() < EPSILON);

        let new_pose = Pose::new(0.0, 0.0, 10.0).advance(Twist::new(0.0, -30.0), 1.0).unwrap();
        assert!((new_pose.heading_deg - 340.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_translates_before_rotating() {
        // The whole step uses the starting heading of 0°.
        let pose = Pose::new(0.0, 0.0, 0.0);
        let new_pose = pose.advance(Twist::new(10.0, 90.0), 1.0).unwrap();
        assert!((new_pose.x - 10.0).abs() < EPSILON);
        assert!(new_pose.y.abs() < EPSILON);
        assert!((new_pose.heading_deg - 90.0).abs() < EPSILON);
    }

    #[test]
    fn test_advance_zero_dt_is_identity() {
        let pose = Pose::new(12.5, -3.0, 45.0);
        let new_pose = pose.advance(Twist::new(100.0, 100.0), 0.0).unwrap();
        assert_eq!(new_pose, pose);
    }

    #[test]
    fn test_advance_negative_dt() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        let result = pose.advance(Twist::new(1.0, 0.0), -0.1);
        assert!(matches!(result, Err(KinematicsError::NegativeTimeDelta("must be non-negative"))));
    }

    #[test]
    fn test_advance_non_finite_twist() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        let result = pose.advance(Twist::new(f64::NAN, 0.0), 0.1);
        assert!(matches!(result, Err(KinematicsError::InvalidTwist(_))));
        let result = pose.advance(Twist::new(0.0, f64::INFINITY), 0.1);
        assert!(matches!(result, Err(KinematicsError::InvalidTwist(_))));
    }

    #[test]
    fn test_twist_is_moving() {
        assert!(!Twist::stop().is_moving());
        assert!(!Twist::default().is_moving());
        assert!(Twist::new(0.0, -1.0).is_moving());
    }

    #[test]
    fn test_display() {
        let pose = Pose::new(1.0, 2.0, 90.0);
        assert_eq!(format!("{}", pose), "(x: 1.0, y: 2.0, θ: 90.0°)");
        assert_eq!(format!("{}", Twist::new(60.0, -2.0)), "(v: 60.0 u/s, ω: -2.0 °/s)");
    }
}
